//! Error types for the evictkit library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: returned by `try_*` constructors and builder methods when
//!   a construction parameter is invalid.
//! - [`InvariantError`]: returned by `check_invariants` when the internal
//!   structures of a cache disagree with each other.
//!
//! Cache misses are never errors; they surface as `None`, `false` or
//! `V::default()`.
//!
//! ## Example Usage
//!
//! ```
//! use evictkit::error::ConfigError;
//! use evictkit::policy::lru_k::LrukCache;
//!
//! let bad = LrukCache::<u64, u64>::try_new(16, 16, 0);
//! assert_eq!(bad.unwrap_err(), ConfigError::ZeroK);
//! ```

use thiserror::Error;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A sharded cache needs at least one shard.
    #[error("shard count must be > 0")]
    ZeroShards,
    /// LRU-K needs at least one access before promotion.
    #[error("LRU-K promotion threshold k must be > 0")]
    ZeroK,
    /// A zero aging threshold would rescale on every access.
    #[error("LFU aging threshold must be > 0")]
    ZeroAgingThreshold,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
