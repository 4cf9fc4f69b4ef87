//! # CLI Configuration
//!
//! Resolution order, later wins:
//!
//! 1. Built-in defaults.
//! 2. YAML file given by `--config` / `CREDREG_CONFIG`.
//! 3. Environment: `CREDREG_LEDGER`, `CREDREG_ISSUER`, `CREDREG_LOG_LEVEL`,
//!    `CREDREG_LOG_FORMAT`.
//! 4. Command-line flags (applied by the caller).
//!
//! ```yaml
//! ledger_path: /var/lib/credreg/ledger.json
//! issuer: dmv-lagos
//! log_level: info
//! log_format: json
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read config file {path}: {source}")]
    Io {
        /// The config file path.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// The config file is not valid YAML for [`CliConfig`].
    #[error("invalid config file {path}: {source}")]
    Parse {
        /// The config file path.
        path: String,
        /// The YAML error.
        source: serde_yaml::Error,
    },

    /// An environment override has an unusable value.
    #[error("invalid value {value:?} for {var}")]
    InvalidEnv {
        /// The environment variable.
        var: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format {other:?}")),
        }
    }
}

/// Resolved CLI configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Ledger file holding the registry's committed writes.
    pub ledger_path: PathBuf,
    /// The one issuer authorized to issue and renew.
    pub issuer: String,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from("credreg-ledger.json"),
            issuer: "registry-issuer".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl CliConfig {
    /// Load defaults, then the optional YAML file, then process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Parse a YAML config file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        Self::from_yaml_str(&text).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    /// Parse YAML text. An empty document yields the defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Apply `CREDREG_*` overrides read through `lookup`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(path) = lookup("CREDREG_LEDGER") {
            self.ledger_path = PathBuf::from(path);
        }
        if let Some(issuer) = lookup("CREDREG_ISSUER") {
            self.issuer = issuer;
        }
        if let Some(level) = lookup("CREDREG_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(format) = lookup("CREDREG_LOG_FORMAT") {
            self.log_format = format.parse().map_err(|_| ConfigError::InvalidEnv {
                var: "CREDREG_LOG_FORMAT",
                value: format,
            })?;
        }
        Ok(())
    }
}
