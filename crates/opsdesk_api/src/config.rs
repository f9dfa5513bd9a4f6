//! Endpoint configuration layered over [`CoreConfig`].

use crate::auth::StaticTokenAuthenticator;
use opsdesk_core::{ConfigError, CoreConfig};
use thiserror::Error;

/// Comma-separated list of accepted bearer tokens.
pub const ENV_API_TOKENS: &str = "OPSDESK_API_TOKENS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiConfigError {
    #[error(transparent)]
    Core(#[from] ConfigError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub core: CoreConfig,
    pub tokens: Vec<String>,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ApiConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiConfigError> {
        let core = CoreConfig::from_lookup(&lookup)?;
        let tokens = lookup(ENV_API_TOKENS)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Ok(Self { core, tokens })
    }

    pub fn authenticator(&self) -> StaticTokenAuthenticator {
        StaticTokenAuthenticator::new(self.tokens.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiConfig, ApiConfigError, ENV_API_TOKENS};
    use opsdesk_core::config::ENV_POOL_SIZE;
    use opsdesk_core::CoreConfig;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn tokens_are_split_and_trimmed() {
        let config =
            ApiConfig::from_lookup(lookup(&[(ENV_API_TOKENS, " one, two ,,three ")])).unwrap();
        assert_eq!(config.tokens, vec!["one", "two", "three"]);
        assert_eq!(config.authenticator().token_count(), 3);
        assert_eq!(config.core, CoreConfig::default());
    }

    #[test]
    fn missing_tokens_yield_empty_set() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.tokens.is_empty());
    }

    #[test]
    fn core_errors_are_propagated() {
        let err = ApiConfig::from_lookup(lookup(&[(ENV_POOL_SIZE, "zero")])).unwrap_err();
        assert!(matches!(err, ApiConfigError::Core(_)));
    }
}
