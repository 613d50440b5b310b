use std::path::{Path, PathBuf};

use crate::config::{Config, ProfileConfig, DEFAULT_PROFILE};
use crate::error::{RedripError, Result};

/// Environment variable consulted when no profile is passed explicitly.
pub const PROFILE_ENV_VAR: &str = "REDRIP_PROFILE";

/// Where the active profile name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileSource {
    /// `--profile` on the command line.
    Flag,
    /// The `REDRIP_PROFILE` environment variable.
    Environment,
    /// Nothing requested, so `default`.
    Default,
    /// The requested profile does not exist; `default` was used instead.
    Fallback,
}

impl std::fmt::Display for ProfileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProfileSource::Flag => write!(f, "flag"),
            ProfileSource::Environment => write!(f, "environment"),
            ProfileSource::Default => write!(f, "default"),
            ProfileSource::Fallback => write!(f, "fallback"),
        }
    }
}

/// The profile a command runs against, passed explicitly to everything
/// that needs to know it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProfile {
    pub name: String,
    pub source: ProfileSource,
    pub config: ProfileConfig,
}

/// Pick the active profile: explicit request, then `REDRIP_PROFILE`, then
/// `default`.
pub fn resolve(config: &Config, requested: Option<&str>) -> ResolvedProfile {
    let env = std::env::var(PROFILE_ENV_VAR).ok();
    resolve_with_env(config, requested, env.as_deref())
}

/// Same as [`resolve`] with the environment value supplied by the caller.
pub fn resolve_with_env(
    config: &Config,
    requested: Option<&str>,
    env: Option<&str>,
) -> ResolvedProfile {
    let requested = requested.map(str::trim).filter(|s| !s.is_empty());
    let env = env.map(str::trim).filter(|s| !s.is_empty());

    let (name, source) = match (requested, env) {
        (Some(name), _) => (name, ProfileSource::Flag),
        (None, Some(name)) => {
            tracing::debug!(profile = name, "using profile from {}", PROFILE_ENV_VAR);
            (name, ProfileSource::Environment)
        }
        (None, None) => (DEFAULT_PROFILE, ProfileSource::Default),
    };

    match config.get(name) {
        Some(profile) => {
            tracing::debug!(profile = name, %source, "using profile");
            ResolvedProfile {
                name: name.to_string(),
                source,
                config: profile.clone(),
            }
        }
        None => {
            tracing::warn!(requested_profile = name, "profile does not exist, using default");
            ResolvedProfile {
                name: DEFAULT_PROFILE.to_string(),
                source: ProfileSource::Fallback,
                config: config.get(DEFAULT_PROFILE).cloned().unwrap_or_default(),
            }
        }
    }
}

/// Fail if the profile lacks what a network call needs.
pub fn validate(profile: &ResolvedProfile) -> Result<()> {
    let mut missing = Vec::new();
    if profile.config.redash_url.is_empty() {
        missing.push("redash_url");
    }
    if profile.config.api_key.is_empty() {
        missing.push("api_key");
    }
    if missing.is_empty() {
        return Ok(());
    }

    let fields = missing.join(", ");
    tracing::error!(
        profile = %profile.name,
        missing = %fields,
        "required configuration values missing; edit the config file for this profile"
    );
    Err(RedripError::MissingRequiredFields {
        profile: profile.name.clone(),
        fields,
    })
}

/// The profile's `sql_dir` if it is set and is an existing directory,
/// otherwise the current directory.
pub fn resolve_directory(profile: &ProfileConfig) -> PathBuf {
    if profile.sql_dir.is_empty() {
        tracing::info!("sql_dir not set, using current directory");
        return PathBuf::from(".");
    }

    let dir = Path::new(&profile.sql_dir);
    if !dir.is_dir() {
        tracing::warn!(
            configured_dir = %profile.sql_dir,
            "sql_dir does not exist, using current directory"
        );
        return PathBuf::from(".");
    }

    tracing::debug!(dir = %profile.sql_dir, "using configured sql_dir");
    dir.to_path_buf()
}
