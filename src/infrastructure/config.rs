//! Application configuration
//!
//! Layered loading with the `config` crate: built-in defaults, then
//! `config/default.toml` (or an explicit file), then the per-user config
//! directory, then `ML_EXTRACTOR__*` environment variables.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::infrastructure::parsing::config::ParsingConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config from file: {source}")]
    FileLoad {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

/// Top-level configuration of the extractor
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub parsing: ParsingConfig,
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted file logs
    pub json_format: bool,

    /// Enable console output (stderr)
    pub console_output: bool,

    /// Enable file output
    pub file_output: bool,

    /// Directory for log files; defaults to `logs/` next to the executable
    pub log_dir: Option<PathBuf>,

    /// Log file name
    pub file_name: String,

    /// Number of log files to keep (older files are deleted on startup)
    pub max_files: u32,

    /// Module-specific log level filters (e.g., "scraper": "warn")
    pub module_filters: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: defaults::LOG_JSON_FORMAT,
            console_output: defaults::LOG_CONSOLE_OUTPUT,
            file_output: defaults::LOG_FILE_OUTPUT,
            log_dir: None,
            file_name: defaults::LOG_FILE_NAME.to_string(),
            max_files: defaults::LOG_MAX_FILES,
            module_filters: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an explicit file plus environment overrides
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(environment())
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load the default layered configuration. Missing files are skipped.
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(defaults::CONFIG_FILE_STEM).required(false));

        if let Some(user_file) = user_config_file() {
            debug!("Looking for user configuration at {:?}", user_file);
            builder = builder.add_source(config::File::from(user_file).required(false));
        }

        let settings = builder.add_source(environment()).build()?;
        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let listing = &self.parsing.listing;
        for (name, chain) in [
            ("listing.title", &listing.title),
            ("listing.price", &listing.price),
            ("listing.subtitle", &listing.subtitle),
            ("spec_table.container", &self.parsing.spec_table.container),
        ] {
            if chain.iter().all(|selector| selector.trim().is_empty()) {
                return Err(ConfigError::Validation {
                    message: format!("{name} needs at least one selector"),
                });
            }
        }

        for (name, delay) in [
            ("parsing.spec_settle_ms", self.parsing.spec_settle_ms),
            ("parsing.expansion.settle_ms", self.parsing.expansion.settle_ms),
        ] {
            if delay > defaults::MAX_SETTLE_MS {
                return Err(ConfigError::Validation {
                    message: format!("{name} cannot exceed {}ms", defaults::MAX_SETTLE_MS),
                });
            }
        }

        if !["error", "warn", "info", "debug", "trace"]
            .contains(&self.logging.level.to_lowercase().as_str())
        {
            return Err(ConfigError::Validation {
                message: format!("Unknown log level '{}'", self.logging.level),
            });
        }

        if !self.logging.console_output && !self.logging.file_output {
            return Err(ConfigError::Validation {
                message: "At least one logging output must be enabled".to_string(),
            });
        }

        if self.logging.max_files == 0 {
            return Err(ConfigError::Validation {
                message: "logging.max_files must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(defaults::ENV_PREFIX).separator("__")
}

fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(defaults::APP_DIR_NAME).join("config.toml"))
}

/// Default configuration values
pub mod defaults {
    /// Application directory name under the user's config directory
    pub const APP_DIR_NAME: &str = "ml-listing-extractor";

    /// Base configuration file, extension resolved by the config crate
    pub const CONFIG_FILE_STEM: &str = "config/default";

    /// Environment variable prefix (`ML_EXTRACTOR__LOGGING__LEVEL=debug`)
    pub const ENV_PREFIX: &str = "ML_EXTRACTOR";

    /// Delay before reading attribute tables
    pub const SPEC_SETTLE_MS: u64 = 1000;

    /// Delay after clicking the attribute panel expansion control
    pub const EXPANSION_SETTLE_MS: u64 = 3000;

    /// Upper bound accepted for any settle delay
    pub const MAX_SETTLE_MS: u64 = 60_000;

    /// Cap on page text fed to the general regex tier
    pub const BACKUP_TEXT_MAX_CHARS: usize = 2000;

    pub const LOG_LEVEL: &str = "info";
    pub const LOG_JSON_FORMAT: bool = false;
    pub const LOG_CONSOLE_OUTPUT: bool = true;
    pub const LOG_FILE_OUTPUT: bool = false;
    pub const LOG_FILE_NAME: &str = "ml-listing-extractor.log";
    pub const LOG_MAX_FILES: u32 = 5;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.parsing.spec_settle_ms, defaults::SPEC_SETTLE_MS);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[parsing]
spec_settle_ms = 250

[parsing.listing]
price = [".precio-principal"]

[logging]
level = "debug"
json_format = true
"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.parsing.spec_settle_ms, 250);
        assert_eq!(config.parsing.listing.price, vec![".precio-principal".to_string()]);
        assert_eq!(config.parsing.listing.seller.len(), 4);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json_format);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.parsing.listing.price.clear();
        assert!(matches!(config.validate(), Err(ConfigError::Validation { .. })));

        let mut config = AppConfig::default();
        config.parsing.expansion.settle_ms = defaults::MAX_SETTLE_MS + 1;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.logging.console_output = false;
        config.logging.file_output = false;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(matches!(
            AppConfig::from_file(&missing),
            Err(ConfigError::FileLoad { .. })
        ));
    }
}
