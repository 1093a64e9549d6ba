//! Runtime configuration for the core.
//!
//! # Responsibility
//! - Collect logging, storage and session policy settings in one place.
//! - Read overrides from `TASKFLOW_*` environment variables.
//!
//! # Invariants
//! - Defaults are always valid; only explicit overrides can fail.

use crate::logging::default_log_level;
use std::path::PathBuf;
use thiserror::Error;

pub const ENV_LOG_LEVEL: &str = "TASKFLOW_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TASKFLOW_LOG_DIR";
pub const ENV_DB_PATH: &str = "TASKFLOW_DB_PATH";
pub const ENV_MIN_PASSWORD_LEN: &str = "TASKFLOW_MIN_PASSWORD_LEN";

/// Minimum sign-up password length enforced before contacting the auth service.
pub const DEFAULT_MIN_PASSWORD_LEN: usize = 6;
/// Password length as the auth service counts it, in UTF-16 code units.
pub fn password_len(password: &str) -> usize {
    password.encode_utf16().count()
}

const DEFAULT_DB_FILE_NAME: &str = "taskflow.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got `{value}`")]
    InvalidNumber { name: &'static str, value: String },
}

/// Core settings shared by the CLI and embedding hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub log_level: String,
    /// Logging stays disabled when unset.
    pub log_dir: Option<PathBuf>,
    pub db_path: PathBuf,
    pub min_password_len: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            min_password_len: DEFAULT_MIN_PASSWORD_LEN,
        }
    }
}

impl CoreConfig {
    /// Defaults overlaid with process environment overrides.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overlaid with values from `lookup`; blank values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(raw) = read(ENV_MIN_PASSWORD_LEN) {
            config.min_password_len = match raw.parse::<usize>() {
                Ok(value) if value > 0 => value,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        name: ENV_MIN_PASSWORD_LEN,
                        value: raw,
                    })
                }
            };
        }

        Ok(config)
    }
}
