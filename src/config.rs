//! CLI configuration, persisted as TOML in `$XDG_CONFIG_HOME/sentiment-lens/`.

use std::path::Path;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::report::Workflow;

/// Environment variable that overrides the configured backend URL.
pub const API_URL_ENV: &str = "SENTIMENT_LENS_API_URL";

/// Errors from configuration loading and saving.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(lens::config::read),
        help("Ensure the config file exists and is readable, or create one with `sentiment-lens config init`.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(lens::config::parse),
        help("Check the TOML syntax in the config file.")
    )]
    Parse { path: String, message: String },

    #[error("failed to write config: {path}")]
    #[diagnostic(
        code(lens::config::write),
        help("Ensure you have write permissions to the config directory.")
    )]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LensConfig {
    /// Base URL of the analysis backend.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Per-request timeout. Deep analyses take a while.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Saved analyses kept in history.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default)]
    pub default_workflow: Workflow,
}

fn default_api_base_url() -> String {
    "http://localhost:8000".into()
}
fn default_timeout_secs() -> u64 {
    120
}
fn default_history_limit() -> usize {
    10
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            timeout_secs: default_timeout_secs(),
            history_limit: default_history_limit(),
            default_workflow: Workflow::default(),
        }
    }
}

impl LensConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load from `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
        std::fs::write(path, content).map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Apply the environment override, then an explicit one (CLI flag).
    pub fn with_overrides(mut self, api_url: Option<&str>) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                self.api_base_url = url;
            }
        }
        if let Some(url) = api_url {
            self.api_base_url = url.to_string();
        }
        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = LensConfig::default();
        assert_eq!(config.api_base_url, "http://localhost:8000");
        assert_eq!(config.timeout_secs, 120);
        assert_eq!(config.history_limit, 10);
        assert_eq!(config.default_workflow, Workflow::Fast);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config: LensConfig = toml::from_str("default_workflow = \"deep\"\n").unwrap();
        assert_eq!(config.default_workflow, Workflow::Deep);
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn save_and_load_round_trip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("config.toml");
        let config = LensConfig {
            api_base_url: "http://backend:9000".into(),
            timeout_secs: 30,
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(LensConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = LensConfig::load_or_default(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(config, LensConfig::default());
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "timeout_secs = \"soon\"").unwrap();
        assert!(matches!(
            LensConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn explicit_override_wins_and_trailing_slash_is_dropped() {
        let config = LensConfig::default().with_overrides(Some("http://10.0.0.2:8000/"));
        assert_eq!(config.api_base_url, "http://10.0.0.2:8000");
    }
}
