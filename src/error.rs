//! Error types for the cache engines
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache construction and configuration.
///
/// A missing key is not an error: lookups return `None`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Capacity must be at least one entry
    #[error("Invalid capacity: {0} (a cache must hold at least one entry)")]
    InvalidCapacity(usize),

    /// Policy name did not match any known engine
    #[error("Unknown cache policy: {0}")]
    UnknownPolicy(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache crate.
pub type Result<T> = std::result::Result<T, CacheError>;
