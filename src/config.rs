//! Factory-wide defaults.

use crate::client::DEFAULT_MAX_REDIRECTS;
use std::time::Duration;
use tracing::warn;

/// Environment variable overriding the default timeout, in seconds.
pub const ENV_TIMEOUT_SECONDS: &str = "SESSIONNET_TIMEOUT_SECONDS";
/// Environment variable overriding the redirect limit.
pub const ENV_MAX_REDIRECTS: &str = "SESSIONNET_MAX_REDIRECTS";

/// Defaults applied to clients created by a registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryConfig {
    /// Used when a request carries no (or a zero) timeout.
    pub default_timeout: Duration,
    pub max_redirects: usize,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(30),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

impl FactoryConfig {
    pub fn builder() -> FactoryConfigBuilder {
        FactoryConfigBuilder::default()
    }

    /// Defaults overridden by `SESSIONNET_*` variables. Unparsable values are
    /// ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_TIMEOUT_SECONDS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.default_timeout = Duration::from_secs(secs),
                _ => warn!(var = ENV_TIMEOUT_SECONDS, value = %raw, "ignoring invalid value"),
            }
        }
        if let Some(raw) = lookup(ENV_MAX_REDIRECTS) {
            match raw.trim().parse::<usize>() {
                Ok(n) => config.max_redirects = n,
                Err(_) => warn!(var = ENV_MAX_REDIRECTS, value = %raw, "ignoring invalid value"),
            }
        }
        config
    }

    /// Timeout for a request that asked for `seconds`.
    pub fn timeout_for(&self, seconds: Option<u64>) -> Duration {
        match seconds {
            Some(s) if s > 0 => Duration::from_secs(s),
            _ => self.default_timeout,
        }
    }
}

/// Builder for [`FactoryConfig`].
#[must_use]
#[derive(Debug, Clone, Default)]
pub struct FactoryConfigBuilder {
    config: FactoryConfig,
}

impl FactoryConfigBuilder {
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.config.default_timeout = timeout;
        self
    }

    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config.max_redirects = max;
        self
    }

    pub fn build(self) -> FactoryConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = FactoryConfig::default();
        assert_eq!(config.default_timeout, Duration::from_secs(30));
        assert_eq!(config.max_redirects, 10);
    }

    #[test]
    fn test_timeout_for() {
        let config = FactoryConfig::default();
        assert_eq!(config.timeout_for(None), Duration::from_secs(30));
        assert_eq!(config.timeout_for(Some(0)), Duration::from_secs(30));
        assert_eq!(config.timeout_for(Some(5)), Duration::from_secs(5));
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> =
            [(ENV_TIMEOUT_SECONDS, "12"), (ENV_MAX_REDIRECTS, "3")].into();
        let config = FactoryConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.default_timeout, Duration::from_secs(12));
        assert_eq!(config.max_redirects, 3);
    }

    #[test]
    fn test_from_lookup_ignores_garbage() {
        let config = FactoryConfig::from_lookup(|_| Some("soon".to_string()));
        assert_eq!(config, FactoryConfig::default());
    }

    #[test]
    fn test_builder() {
        let config = FactoryConfig::builder()
            .default_timeout(Duration::from_secs(1))
            .max_redirects(0)
            .build();
        assert_eq!(config.default_timeout, Duration::from_secs(1));
        assert_eq!(config.max_redirects, 0);
    }
}
