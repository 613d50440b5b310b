use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{RedripError, Result};

/// Name of the profile that always exists after parsing.
pub const DEFAULT_PROFILE: &str = "default";

/// Template written when no config file exists yet.
pub const DEFAULT_CONFIG_CONTENT: &str = "\
# Default profile (used when no profile is specified)
[default]
# Redash API URL (required)
redash_url =
# Redash API Key (required)
api_key =
# Directory to save SQL files (optional, defaults to current directory)
sql_dir =

# Example staging profile
# [profile stg]
# redash_url = https://redash-staging.example.com/api
# api_key = your_staging_api_key
# sql_dir = /path/to/staging/sql/dir

# Example production profile
# [profile prd]
# redash_url = https://redash-production.example.com/api
# api_key = your_production_api_key
# sql_dir = /path/to/production/sql/dir
";

/// Settings for a single named profile. Empty strings mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileConfig {
    pub redash_url: String,
    pub api_key: String,
    pub sql_dir: String,
}

/// All profiles from `~/.redrip/config.conf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub profiles: BTreeMap<String, ProfileConfig>,
}

impl Default for Config {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(DEFAULT_PROFILE.to_string(), ProfileConfig::default());
        Self { profiles }
    }
}

impl Config {
    /// Returns the redrip home directory (`~/.redrip/`).
    pub fn home_dir() -> Result<PathBuf> {
        let base = dirs::home_dir().ok_or(RedripError::HomeDirUnavailable)?;
        Ok(base.join(".redrip"))
    }

    /// Returns the path to the config file.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::home_dir()?.join("config.conf"))
    }

    /// Create the config file from the template if it is absent.
    ///
    /// Returns `true` when a new file was written. An existing file is never
    /// touched.
    pub fn ensure_file(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }

        tracing::info!(path = %path.display(), "config file does not exist, creating it");
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| RedripError::ConfigIo {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, DEFAULT_CONFIG_CONTENT).map_err(|source| RedripError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::warn!(
            path = %path.display(),
            "created default config file; edit it to set your Redash URL and API key"
        );
        Ok(true)
    }

    /// Ensure the file exists, then read and parse it.
    pub fn load(path: &Path) -> Result<Self> {
        Self::ensure_file(path)?;
        let content = std::fs::read_to_string(path).map_err(|source| RedripError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content);
        tracing::info!(
            path = %path.display(),
            profiles = config.profiles.len(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Parse the sectioned config format. Malformed lines are skipped, so
    /// this never fails.
    pub fn parse(content: &str) -> Self {
        let mut config = Self::default();
        let mut current = DEFAULT_PROFILE.to_string();

        for raw in content.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if line.starts_with('[') && line.ends_with(']') {
                match section_name(&line[1..line.len() - 1]) {
                    Some(name) => {
                        config.profiles.entry(name.to_string()).or_default();
                        current = name.to_string();
                    }
                    None => {
                        tracing::warn!(
                            section = line,
                            "invalid profile section; use [default] or [profile <name>]"
                        );
                    }
                }
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim().to_string();

            let profile = config.profiles.entry(current.clone()).or_default();
            match key {
                "redash_url" => {
                    tracing::debug!(profile = %current, key, value = %value, "config value");
                    profile.redash_url = value;
                }
                "api_key" => {
                    tracing::debug!(profile = %current, key, value = "[REDACTED]", "config value");
                    profile.api_key = value;
                }
                "sql_dir" => {
                    tracing::debug!(profile = %current, key, value = %value, "config value");
                    profile.sql_dir = value;
                }
                _ => {}
            }
        }

        config
    }

    pub fn get(&self, name: &str) -> Option<&ProfileConfig> {
        self.profiles.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }
}

/// Map the inside of a `[...]` header to a profile name.
fn section_name(inner: &str) -> Option<&str> {
    let inner = inner.trim();
    if inner == DEFAULT_PROFILE {
        return Some(DEFAULT_PROFILE);
    }
    let name = inner.strip_prefix("profile ")?.trim();
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MULTI: &str = "\
# comment
[default]
redash_url = https://x/api
api_key = K

[profile stg]
redash_url = https://stg/api
api_key = S
sql_dir = /tmp/stg

[weird]
sql_dir = /ignored/by/section/but/applies/to/stg
not a key value line
colour = blue
";

    #[test]
    fn test_parse_profiles() {
        let config = Config::parse(MULTI);
        let default = config.get("default").unwrap();
        assert_eq!(default.redash_url, "https://x/api");
        assert_eq!(default.api_key, "K");
        assert_eq!(default.sql_dir, "");

        let stg = config.get("stg").unwrap();
        assert_eq!(stg.redash_url, "https://stg/api");
        // the invalid header leaves the current section on `stg`
        assert_eq!(stg.sql_dir, "/ignored/by/section/but/applies/to/stg");
        assert!(!config.contains("weird"));
        assert_eq!(config.profiles.len(), 2);
    }

    #[test]
    fn test_default_always_present() {
        let config = Config::parse("[profile only]\napi_key = a\n");
        assert!(config.contains("default"));
        assert_eq!(config.get("default").unwrap(), &ProfileConfig::default());

        let empty = Config::parse("");
        assert_eq!(empty.profiles.len(), 1);
        assert!(empty.contains("default"));
    }

    #[test]
    fn test_values_before_header_go_to_default() {
        let config = Config::parse("redash_url = https://early/api\n[profile p]\n");
        assert_eq!(config.get("default").unwrap().redash_url, "https://early/api");
    }

    #[test]
    fn test_value_split_at_first_equals() {
        let config = Config::parse("[default]\nredash_url = https://h/api?x=1\n");
        assert_eq!(config.get("default").unwrap().redash_url, "https://h/api?x=1");
    }

    #[test]
    fn test_empty_profile_name_is_invalid() {
        let config = Config::parse("[profile ]\napi_key = k\n");
        assert!(!config.contains(""));
        assert_eq!(config.get("default").unwrap().api_key, "k");
    }

    #[test]
    fn test_parse_is_idempotent() {
        assert_eq!(Config::parse(MULTI), Config::parse(MULTI));
    }

    #[test]
    fn test_default_template_parses_to_empty_default() {
        let config = Config::parse(DEFAULT_CONFIG_CONTENT);
        assert_eq!(config.profiles.len(), 1);
        assert_eq!(config.get("default").unwrap(), &ProfileConfig::default());
    }

    #[test]
    fn test_load_creates_template_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.conf");

        assert!(Config::ensure_file(&path).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG_CONTENT);

        std::fs::write(&path, "[default]\napi_key = mine\n").unwrap();
        assert!(!Config::ensure_file(&path).unwrap());

        let config = Config::load(&path).unwrap();
        assert_eq!(config.get("default").unwrap().api_key, "mine");
        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
