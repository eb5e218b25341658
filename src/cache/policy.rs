//! Eviction policy selector.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Names the engine a cache is built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CachePolicy {
    /// Linked-list LRU
    #[default]
    Lru,
    /// LRU over an access-ordered map
    OrderedLru,
    /// LFU with a linear minimum scan
    Lfu,
    /// LFU with frequency buckets
    BucketedLfu,
}

impl CachePolicy {
    pub const ALL: [CachePolicy; 4] = [
        CachePolicy::Lru,
        CachePolicy::OrderedLru,
        CachePolicy::Lfu,
        CachePolicy::BucketedLfu,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CachePolicy::Lru => "lru",
            CachePolicy::OrderedLru => "ordered-lru",
            CachePolicy::Lfu => "lfu",
            CachePolicy::BucketedLfu => "bucketed-lfu",
        }
    }
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CachePolicy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        CachePolicy::ALL
            .into_iter()
            .find(|policy| policy.as_str() == name)
            .ok_or_else(|| CacheError::UnknownPolicy(s.to_string()))
    }
}
