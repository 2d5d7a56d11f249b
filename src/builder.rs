//! Unified cache builder for the bounded eviction policies.
//!
//! Hides the worth-policy type parameter behind a policy enum so callers
//! can pick a variant at runtime.
//!
//! ## Example
//!
//! ```
//! use samplecache::builder::{CacheBuilder, EvictionPolicy};
//!
//! let cache = CacheBuilder::new()
//!     .shards(8)
//!     .max_bytes(16 << 20)
//!     .probe_depth(16)
//!     .try_build(EvictionPolicy::Lru)
//!     .unwrap();
//!
//! cache.set(b"key", b"value", 60);
//! assert_eq!(cache.get(b"key"), Some(b"value".to_vec()));
//! ```

use std::time::Duration;

use crate::error::ConfigError;
use crate::store::bounded::{LfuCache, LruCache};
use crate::store::counters::CacheMetrics;
use crate::store::ttl::TtlCache;
use crate::traits::ByteCache;

/// Available bounded eviction policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// Sampled eviction by last-touch recency.
    Lru,
    /// Sampled eviction by hit frequency.
    Lfu,
}

/// Unified wrapper over the bounded variants.
///
/// Dispatches each operation to the concrete cache; also implements
/// [`ByteCache`].
pub struct Cache {
    inner: CacheInner,
}

enum CacheInner {
    Lru(LruCache),
    Lfu(LfuCache),
}

impl Cache {
    /// Stores `value` under `key` with a TTL in whole seconds.
    pub fn set(&self, key: &[u8], value: &[u8], ttl_secs: u64) {
        match &self.inner {
            CacheInner::Lru(lru) => lru.set(key, value, ttl_secs),
            CacheInner::Lfu(lfu) => lfu.set(key, value, ttl_secs),
        }
    }

    /// Returns a copy of the value, or `None` when absent or expired.
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match &self.inner {
            CacheInner::Lru(lru) => lru.get(key),
            CacheInner::Lfu(lfu) => lfu.get(key),
        }
    }

    /// Like [`get`](Self::get), plus the remaining TTL in whole seconds.
    pub fn get_with_ttl(&self, key: &[u8]) -> Option<(Vec<u8>, u64)> {
        match &self.inner {
            CacheInner::Lru(lru) => lru.get_with_ttl(key),
            CacheInner::Lfu(lfu) => lfu.get_with_ttl(key),
        }
    }

    /// Removes `key`; returns whether it was present.
    pub fn del(&self, key: &[u8]) -> bool {
        match &self.inner {
            CacheInner::Lru(lru) => lru.del(key),
            CacheInner::Lfu(lfu) => lfu.del(key),
        }
    }

    /// Drops every entry.
    pub fn clear(&self) {
        match &self.inner {
            CacheInner::Lru(lru) => lru.clear(),
            CacheInner::Lfu(lfu) => lfu.clear(),
        }
    }

    /// Approximate total of encoded entry bytes.
    pub fn size_bytes(&self) -> usize {
        match &self.inner {
            CacheInner::Lru(lru) => lru.size_bytes(),
            CacheInner::Lfu(lfu) => lfu.size_bytes(),
        }
    }

    /// Approximate number of resident entries.
    pub fn len(&self) -> usize {
        match &self.inner {
            CacheInner::Lru(lru) => lru.len(),
            CacheInner::Lfu(lfu) => lfu.len(),
        }
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the operation counters.
    pub fn metrics(&self) -> CacheMetrics {
        match &self.inner {
            CacheInner::Lru(lru) => lru.metrics(),
            CacheInner::Lfu(lfu) => lfu.metrics(),
        }
    }

    /// Writes an occupancy diagnostic to stdout.
    pub fn print_info(&self) {
        match &self.inner {
            CacheInner::Lru(lru) => lru.print_info(),
            CacheInner::Lfu(lfu) => lfu.print_info(),
        }
    }
}

impl ByteCache for Cache {
    fn set(&self, key: &[u8], value: &[u8], ttl_secs: u64) {
        Cache::set(self, key, value, ttl_secs);
    }

    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        Cache::get(self, key)
    }

    fn get_with_ttl(&self, key: &[u8]) -> Option<(Vec<u8>, u64)> {
        Cache::get_with_ttl(self, key)
    }

    fn del(&self, key: &[u8]) -> bool {
        Cache::del(self, key)
    }

    fn clear(&self) {
        Cache::clear(self);
    }

    fn size_bytes(&self) -> usize {
        Cache::size_bytes(self)
    }

    fn print_info(&self) {
        Cache::print_info(self);
    }
}

/// Builder for cache instances.
///
/// Defaults: 64 shards, 64 MiB budget, critical line equal to the budget,
/// probe depth 16.
#[derive(Debug, Clone, Copy)]
pub struct CacheBuilder {
    shards: usize,
    max_bytes: usize,
    crit_bytes: usize,
    probe_depth: u32,
}

impl CacheBuilder {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        Self {
            shards: 64,
            max_bytes: 64 << 20,
            crit_bytes: 0,
            probe_depth: 16,
        }
    }

    /// Sets the shard count. Must be non-zero at build time.
    pub fn shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }

    /// Sets the total byte budget. Zero disables the budget.
    pub fn max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Sets the critical byte ceiling. Zero means "same as the budget".
    pub fn crit_bytes(mut self, crit_bytes: usize) -> Self {
        self.crit_bytes = crit_bytes;
        self
    }

    /// Sets the per-admission sampling budget.
    pub fn probe_depth(mut self, probe_depth: u32) -> Self {
        self.probe_depth = probe_depth;
        self
    }

    /// Builds a bounded cache with the given policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the shard count is zero.
    pub fn try_build(self, policy: EvictionPolicy) -> Result<Cache, ConfigError> {
        let inner = match policy {
            EvictionPolicy::Lru => CacheInner::Lru(LruCache::new(
                self.shards,
                self.max_bytes,
                self.crit_bytes,
                self.probe_depth,
            )?),
            EvictionPolicy::Lfu => CacheInner::Lfu(LfuCache::new(
                self.shards,
                self.max_bytes,
                self.crit_bytes,
                self.probe_depth,
            )?),
        };
        Ok(Cache { inner })
    }

    /// Builds a TTL cache sharing the builder's shard count. Byte budgets
    /// and probe depth do not apply to this variant.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the shard count is zero.
    pub fn try_build_ttl(self, clean_period: Duration) -> Result<TtlCache, ConfigError> {
        TtlCache::new(self.shards, clean_period)
    }
}

impl Default for CacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}
