//! Evict Cache - Bounded in-memory caches
//!
//! Provides LRU and LFU eviction engines behind a single `BoundedCache` contract.

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{build_cache, BoundedCache, CachePolicy, CacheStats};
pub use config::Config;
pub use error::{CacheError, Result};
