//! Tool-wide configuration.
//!
//! Read once at startup from a JSON file and passed explicitly to the
//! commands that need it.
//!
//! ```json
//! { "connection": { "serverUrl": "https://logs.example.com" } }
//! ```

use crate::error::{CliError, CliResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Server URL used when no configuration file sets one.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5341";

/// Root of the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
    #[serde(default)]
    pub connection: ConnectionConfig,
}

/// Connection details for the server apps report to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
        }
    }
}

impl CliConfig {
    /// Platform location of the configuration file, e.g.
    /// `~/.config/appctl/config.json` on Linux.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("appctl").join("config.json"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. When no path is given the default
    /// location is used, and a missing file there yields defaults.
    pub fn load(explicit: Option<&Path>) -> CliResult<Self> {
        match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(CliError::InvalidArgument {
                        arg: "--config".to_string(),
                        reason: format!("Config file not found: {}", path.display()),
                    });
                }
                Self::from_file(path)
            }
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => {
                    tracing::debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    /// Read and parse a configuration file.
    pub fn from_file(path: &Path) -> CliResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_json::from_str(&text).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.connection.server_url, DEFAULT_SERVER_URL);
    }

    #[test]
    fn test_from_file_reads_server_url() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(
            &path,
            r#"{"connection": {"serverUrl": "https://logs.example.com"}, "output": {}}"#,
        )
        .unwrap();

        let config = CliConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(config.connection.server_url, "https://logs.example.com");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{"connection": {}}"#).unwrap();

        let config = CliConfig::from_file(&path).unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_malformed_file_is_system_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = CliConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, CliError::ConfigParse { .. }));
        assert_eq!(err.exit_code(), crate::error::SYSTEM_EXIT_CODE);
    }

    #[test]
    fn test_missing_explicit_file_is_usage_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.json");
        let err = CliConfig::load(Some(missing.as_path())).unwrap_err();

        assert!(matches!(err, CliError::InvalidArgument { .. }));
        assert_eq!(err.exit_code(), crate::error::USAGE_EXIT_CODE);
    }
}
