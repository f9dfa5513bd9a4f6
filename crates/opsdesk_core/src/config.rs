//! Runtime configuration for the core storage stack.
//!
//! # Responsibility
//! - Resolve database, pool and logging settings from the environment.
//! - Reject malformed values instead of silently falling back.
//!
//! # Invariants
//! - `pool_size` is at least 1.
//! - Unset variables take documented defaults; set-but-invalid ones are errors.

use crate::logging::default_log_level;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const ENV_DB_PATH: &str = "OPSDESK_DB_PATH";
pub const ENV_POOL_SIZE: &str = "OPSDESK_POOL_SIZE";
pub const ENV_BUSY_TIMEOUT_MS: &str = "OPSDESK_BUSY_TIMEOUT_MS";
pub const ENV_LOG_LEVEL: &str = "OPSDESK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "OPSDESK_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "opsdesk.sqlite3";
const DEFAULT_POOL_SIZE: u32 = 8;
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got `{value}`")]
    InvalidValue {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Core storage and logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub pool_size: u32,
    pub busy_timeout: Duration,
    pub log_level: String,
    /// Logging stays disabled when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            pool_size: DEFAULT_POOL_SIZE,
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through an arbitrary variable lookup.
    ///
    /// Blank values are treated the same as unset ones.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(raw) = read(ENV_POOL_SIZE) {
            config.pool_size = match raw.parse::<u32>() {
                Ok(size) if size >= 1 => size,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        name: ENV_POOL_SIZE,
                        value: raw,
                        expected: "a positive integer",
                    })
                }
            };
        }
        if let Some(raw) = read(ENV_BUSY_TIMEOUT_MS) {
            let millis = raw.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                name: ENV_BUSY_TIMEOUT_MS,
                value: raw.clone(),
                expected: "a non-negative integer of milliseconds",
            })?;
            config.busy_timeout = Duration::from_millis(millis);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        config.log_dir = read(ENV_LOG_DIR).map(PathBuf::from);

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, ENV_BUSY_TIMEOUT_MS, ENV_DB_PATH, ENV_POOL_SIZE};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = CoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CoreConfig::default());
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn overrides_are_applied() {
        let config = CoreConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, "/var/lib/opsdesk/db.sqlite3"),
            (ENV_POOL_SIZE, "3"),
            (ENV_BUSY_TIMEOUT_MS, "250"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/var/lib/opsdesk/db.sqlite3"));
        assert_eq!(config.pool_size, 3);
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = CoreConfig::from_lookup(lookup(&[(ENV_POOL_SIZE, "   ")])).unwrap();
        assert_eq!(config.pool_size, CoreConfig::default().pool_size);
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        let err = CoreConfig::from_lookup(lookup(&[(ENV_POOL_SIZE, "0")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { name, .. } if name == ENV_POOL_SIZE
        ));
    }

    #[test]
    fn non_numeric_busy_timeout_is_rejected() {
        let err = CoreConfig::from_lookup(lookup(&[(ENV_BUSY_TIMEOUT_MS, "soon")])).unwrap_err();
        assert!(err.to_string().contains(ENV_BUSY_TIMEOUT_MS));
    }
}
