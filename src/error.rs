//! Error types for the samplecache library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when cache construction parameters are
//!   invalid (e.g. zero shards).
//! - [`InvariantError`]: Returned when internal accounting invariants are
//!   violated (`check_invariants` methods).
//!
//! Lookup misses are not errors: `get` returns `None` for an absent or
//! expired key. `set`, `del`, and `clear` never fail.
//!
//! ## Example Usage
//!
//! ```
//! use samplecache::error::ConfigError;
//! use samplecache::store::bounded::LruCache;
//!
//! // Fallible constructor for user-configurable parameters
//! let cache: Result<LruCache, ConfigError> = LruCache::new(8, 1 << 20, 0, 16);
//! assert!(cache.is_ok());
//!
//! // Zero shards is caught without panicking
//! let bad = LruCache::new(0, 1 << 20, 0, 16);
//! assert!(bad.is_err());
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache construction parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`LruCache::new`](crate::store::bounded::ShardedCache::new) and
/// [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build).
/// Carries a human-readable description of which parameter failed
/// validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
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

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by `check_invariants` methods on the shard and cache types.
/// A violation indicates a programming error in the accounting paths, not
/// a recoverable runtime condition.
#[derive(Debug, Clone, PartialEq, Eq)]
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

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
