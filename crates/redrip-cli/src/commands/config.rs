use clap::Subcommand;
use redrip_core::config::{Config, ProfileConfig};
use redrip_core::profile::{self, ProfileSource, ResolvedProfile, PROFILE_ENV_VAR};
use std::fmt::Write as _;
use std::path::Path;

use super::Context;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show configuration settings for every profile
    List,
}

pub fn run(action: ConfigAction, ctx: &Context) -> anyhow::Result<()> {
    match action {
        ConfigAction::List => {
            tracing::info!(profile = ?ctx.requested_profile, "starting config list command");
            let path = &ctx.config_path;

            if Config::ensure_file(path)? {
                println!("Default config file created at {}", path.display());
                println!("Please edit it to set your Redash URL and API Key");
                return Ok(());
            }

            let config = ctx.load_config()?;
            let requested = ctx.requested_profile.as_deref();
            let active = profile::resolve(&config, requested);
            print!("{}", render_list(path, &config, requested, &active));
            Ok(())
        }
    }
}

/// Text shown by `config list`.
fn render_list(
    path: &Path,
    config: &Config,
    requested: Option<&str>,
    active: &ResolvedProfile,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Configuration file: {}\n", path.display());

    if let Some(name) = requested.filter(|n| !n.is_empty()) {
        match config.get(name) {
            Some(profile) => out.push_str(&describe_profile(profile)),
            None => {
                let _ = writeln!(out, "Profile '{}' does not exist", name);
            }
        }
        return out;
    }

    let _ = write!(out, "Active profile: {}", active.name);
    if active.source == ProfileSource::Environment {
        let _ = write!(out, " (from {} environment variable)", PROFILE_ENV_VAR);
    }
    out.push('\n');
    out.push_str(&describe_profile(&active.config));
    out.push('\n');

    out.push_str("Available profiles:\n------------------\n");
    for (name, profile) in &config.profiles {
        if *name == active.name {
            continue;
        }
        let _ = writeln!(out, "[{}]", name);
        out.push_str(&describe_profile(profile));
        out.push('\n');
    }
    out
}

/// One profile's settings with the API key redacted.
fn describe_profile(profile: &ProfileConfig) -> String {
    let url = if profile.redash_url.is_empty() {
        "[NOT SET]"
    } else {
        profile.redash_url.as_str()
    };
    let key = if profile.api_key.is_empty() {
        "[NOT SET]"
    } else {
        "[REDACTED]"
    };
    let dir = if profile.sql_dir.is_empty() {
        "[NOT SET - using current directory]".to_string()
    } else if !Path::new(&profile.sql_dir).is_dir() {
        format!(
            "{} [DIRECTORY DOES NOT EXIST - will use current directory]",
            profile.sql_dir
        )
    } else {
        profile.sql_dir.clone()
    };

    format!(
        "  redash_url = {}\n  api_key = {}\n  sql_dir = {}\n",
        url, key, dir
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample(dir: &Path) -> Config {
        Config::parse(&format!(
            "[default]\nredash_url = https://x/api\napi_key = secret\nsql_dir = {}\n\
             [profile stg]\nredash_url = https://stg/api\nsql_dir = /does/not/exist\n",
            dir.display()
        ))
    }

    #[test]
    fn test_describe_redacts_key() {
        let dir = TempDir::new().unwrap();
        let config = sample(dir.path());

        let default = describe_profile(config.get("default").unwrap());
        assert!(default.contains("api_key = [REDACTED]"));
        assert!(!default.contains("secret"));
        assert!(default.contains(&format!("sql_dir = {}\n", dir.path().display())));

        let stg = describe_profile(config.get("stg").unwrap());
        assert!(stg.contains("api_key = [NOT SET]"));
        assert!(stg.contains("/does/not/exist [DIRECTORY DOES NOT EXIST"));

        let empty = describe_profile(&ProfileConfig::default());
        assert!(empty.contains("redash_url = [NOT SET]"));
        assert!(empty.contains("sql_dir = [NOT SET - using current directory]"));
    }

    #[test]
    fn test_list_shows_active_first_then_others() {
        let dir = TempDir::new().unwrap();
        let config = sample(dir.path());
        let active = profile::resolve_with_env(&config, None, Some("stg"));

        let out = render_list(Path::new("/home/u/.redrip/config.conf"), &config, None, &active);
        assert!(out.starts_with("Configuration file: /home/u/.redrip/config.conf\n\n"));
        assert!(out.contains("Active profile: stg (from REDRIP_PROFILE environment variable)\n"));
        assert!(out.contains("[default]\n"));
        assert!(!out.contains("[stg]"));
        let active_pos = out.find("https://stg/api").unwrap();
        let others_pos = out.find("Available profiles:").unwrap();
        assert!(active_pos < others_pos);
    }

    #[test]
    fn test_list_with_explicit_profile() {
        let dir = TempDir::new().unwrap();
        let config = sample(dir.path());
        let active = profile::resolve_with_env(&config, Some("stg"), None);

        let out = render_list(Path::new("c.conf"), &config, Some("stg"), &active);
        assert!(out.contains("https://stg/api"));
        assert!(!out.contains("Available profiles"));

        let active = profile::resolve_with_env(&config, Some("prd"), None);
        let out = render_list(Path::new("c.conf"), &config, Some("prd"), &active);
        assert!(out.contains("Profile 'prd' does not exist"));
    }
}
