//! Seeder configuration
//!
//! ```toml
//! max_concurrent_reconciles = 1
//!
//! [cache]
//! default_ttl_secs = 604800
//! sweep_interval_secs = 1800
//!
//! [requeue]
//! incomplete_secs = 600
//! complete_secs = 86400
//!
//! [remote]
//! call_timeout_ms = 30000
//! ```
//!
//! Every field is optional; missing fields keep their defaults.

use seeder_cache::CacheConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Errors loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error during file read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax or shape error
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Value out of range
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Top-level seeder configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeederConfig {
    /// Identifier cache settings
    pub cache: CacheSettings,
    /// Requeue intervals
    pub requeue: RequeuePolicy,
    /// Remote API call settings
    pub remote: RemoteSettings,
    /// Seed documents reconciled at the same time
    pub max_concurrent_reconciles: usize,
}

impl SeederConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With remote call timeout
    #[inline]
    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.remote.call_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// With cache settings
    #[inline]
    #[must_use]
    pub fn with_cache(mut self, cache: CacheSettings) -> Self {
        self.cache = cache;
        self
    }

    /// Parse TOML configuration
    ///
    /// # Errors
    /// - `ConfigError::Parse` on syntax or shape errors
    /// - `ConfigError::Invalid` when a value is out of range
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load TOML configuration from a file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - `ConfigError::Parse` / `ConfigError::Invalid` as for [`Self::from_toml_str`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// - `ConfigError::Invalid` naming the first offending field
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("remote.call_timeout_ms", self.remote.call_timeout_ms),
            ("cache.sweep_interval_secs", self.cache.sweep_interval_secs),
            ("cache.default_ttl_secs", self.cache.default_ttl_secs),
            ("max_concurrent_reconciles", self.max_concurrent_reconciles as u64),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Default for SeederConfig {
    fn default() -> Self {
        Self {
            cache: CacheSettings::default(),
            requeue: RequeuePolicy::default(),
            remote: RemoteSettings::default(),
            max_concurrent_reconciles: 1,
        }
    }
}

/// Identifier cache settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// TTL of resolved identifiers in seconds
    pub default_ttl_secs: u64,
    /// Interval between expiry sweeps in seconds
    pub sweep_interval_secs: u64,
    /// Maximum number of cached identifiers; a full cache may evict before the TTL
    pub max_capacity: u64,
}

impl CacheSettings {
    /// Settings in the form the cache takes them
    #[must_use]
    pub fn to_cache_config(self) -> CacheConfig {
        CacheConfig {
            default_ttl: Duration::from_secs(self.default_ttl_secs),
            sweep_interval: Duration::from_secs(self.sweep_interval_secs),
            max_capacity: self.max_capacity,
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        let defaults = CacheConfig::default();
        Self {
            default_ttl_secs: defaults.default_ttl.as_secs(),
            sweep_interval_secs: defaults.sweep_interval.as_secs(),
            max_capacity: defaults.max_capacity,
        }
    }
}

/// When a seed document is reconciled again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequeuePolicy {
    /// Delay after a pass with failures, in seconds
    pub incomplete_secs: u64,
    /// Delay after a complete pass, in seconds
    pub complete_secs: u64,
}

impl RequeuePolicy {
    /// Delay after a pass with failures
    #[inline]
    #[must_use]
    pub fn incomplete(&self) -> Duration {
        Duration::from_secs(self.incomplete_secs)
    }

    /// Delay after a complete pass
    #[inline]
    #[must_use]
    pub fn complete(&self) -> Duration {
        Duration::from_secs(self.complete_secs)
    }

    /// Delay for a pass outcome
    #[inline]
    #[must_use]
    pub fn after(&self, complete: bool) -> Duration {
        if complete {
            self.complete()
        } else {
            self.incomplete()
        }
    }
}

impl Default for RequeuePolicy {
    fn default() -> Self {
        Self {
            incomplete_secs: 10 * 60,
            complete_secs: 24 * 60 * 60,
        }
    }
}

/// Remote API call settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteSettings {
    /// Deadline for a single remote call in milliseconds
    pub call_timeout_ms: u64,
}

impl RemoteSettings {
    /// Deadline for a single remote call
    #[inline]
    #[must_use]
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            call_timeout_ms: 30_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = SeederConfig::default();
        assert_eq!(config.requeue.incomplete(), Duration::from_secs(600));
        assert_eq!(config.requeue.complete(), Duration::from_secs(86_400));
        assert_eq!(config.remote.call_timeout(), Duration::from_secs(30));
        assert_eq!(config.cache.to_cache_config(), CacheConfig::default());
        assert_eq!(config.max_concurrent_reconciles, 1);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = SeederConfig::from_toml_str(
            r#"
[requeue]
incomplete_secs = 60

[remote]
call_timeout_ms = 500
"#,
        )
        .unwrap();

        assert_eq!(config.requeue.incomplete(), Duration::from_secs(60));
        assert_eq!(config.requeue.complete(), Duration::from_secs(86_400));
        assert_eq!(config.remote.call_timeout(), Duration::from_millis(500));
        assert_eq!(config.cache, CacheSettings::default());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = SeederConfig::from_toml_str("[remote]\ncall_timeout_ms = 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "remote.call_timeout_ms",
                ..
            }
        ));
    }

    #[test]
    fn unknown_shape_is_parse_error() {
        let err = SeederConfig::from_toml_str("requeue = 5").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_concurrent_reconciles = 4").unwrap();

        let config = SeederConfig::load(file.path()).unwrap();
        assert_eq!(config.max_concurrent_reconciles, 4);
    }

    #[test]
    fn requeue_after_outcome() {
        let policy = RequeuePolicy::default();
        assert_eq!(policy.after(true), Duration::from_secs(86_400));
        assert_eq!(policy.after(false), Duration::from_secs(600));
    }
}
