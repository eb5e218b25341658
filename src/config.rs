//! Configuration Module
//!
//! Handles loading the demo cache settings from environment variables.

use std::env;

use serde::Deserialize;

use crate::cache::CachePolicy;

/// Demo cache configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    /// Eviction engine to build
    pub policy: CachePolicy,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 3)
    /// - `CACHE_POLICY` - One of `lru`, `ordered-lru`, `lfu`, `bucketed-lfu` (default: lru)
    ///
    /// Values that fail to parse fall back to their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity: env::var("CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.capacity),
            policy: env::var("CACHE_POLICY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.policy),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 3,
            policy: CachePolicy::Lru,
        }
    }
}
