//! Cache configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for the on-disk query result cache.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether read results are cached at all. Default: true.
    pub enabled: Option<bool>,
    /// Entry time-to-live in hours. Values below 1 are clamped to 1.
    /// Default: 1.
    pub ttl_hours: Option<u64>,
    /// Base directory for the cache tree.
    /// Default: `<system temp dir>/crudkit-cache`.
    pub base_dir: Option<PathBuf>,
}

impl CacheConfig {
    /// Returns whether caching is enabled, defaulting to true.
    pub fn effective_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }

    /// Returns the entry TTL in hours, defaulting to 1 and clamped to >= 1.
    pub fn effective_ttl_hours(&self) -> u64 {
        self.ttl_hours.unwrap_or(1).max(1)
    }

    /// Returns the cache base directory, defaulting under the system temp dir.
    pub fn effective_base_dir(&self) -> PathBuf {
        self.base_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("crudkit-cache"))
    }

    /// A disabled cache, for callers that want reads to always hit the store.
    pub fn disabled() -> Self {
        Self {
            enabled: Some(false),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_is_clamped_to_at_least_one_hour() {
        let config = CacheConfig {
            ttl_hours: Some(0),
            ..CacheConfig::default()
        };
        assert_eq!(config.effective_ttl_hours(), 1);
    }

    #[test]
    fn defaults_are_enabled_one_hour_temp_dir() {
        let config = CacheConfig::default();
        assert!(config.effective_enabled());
        assert_eq!(config.effective_ttl_hours(), 1);
        assert!(config.effective_base_dir().ends_with("crudkit-cache"));
    }
}
