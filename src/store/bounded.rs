//! Bounded sharded cache façade.
//!
//! [`ShardedCache`] hashes keys, routes operations to the owning
//! [`ProbeShard`], and aggregates size and metrics reporting. It holds no
//! locks of its own: the shard vector is immutable after construction and
//! all mutable state is shard-local, so operations on different shards
//! never contend.
//!
//! The two bounded variants differ only in their worth policy:
//!
//! - [`LruCache`]: sampled eviction by last-touch recency.
//! - [`LfuCache`]: sampled eviction by hit frequency.
//!
//! ## Example Usage
//!
//! ```
//! use samplecache::store::bounded::LruCache;
//!
//! let cache = LruCache::new(4, 1 << 20, 0, 16).unwrap();
//!
//! cache.set(b"session:1", b"payload", 60);
//! assert_eq!(cache.get(b"session:1"), Some(b"payload".to_vec()));
//!
//! let (value, remaining) = cache.get_with_ttl(b"session:1").unwrap();
//! assert_eq!(value, b"payload");
//! assert!(remaining <= 60);
//!
//! cache.del(b"session:1");
//! assert_eq!(cache.get(b"session:1"), None);
//! ```
//!
//! ## Consistency
//!
//! Operations on the same key are serialized by the owning shard's mutex.
//! [`ShardedCache::size_bytes`] sums per-shard sizes without a global
//! lock, so a concurrent mutation may be half-reflected in the total.

use crate::ds::entry::HEADER_LEN;
use crate::ds::hash::{fnv1a_64, unix_now, ShardRouter};
use crate::error::{ConfigError, InvariantError};
use crate::policy::worth::{HitCount, LastTouch, WorthPolicy};
use crate::store::counters::{CacheCounters, CacheMetrics};
use crate::store::shard::{Lookup, ProbeShard};

/// Bounded cache evicting by sampled last-touch recency.
pub type LruCache = ShardedCache<LastTouch>;

/// Bounded cache evicting by sampled hit frequency.
pub type LfuCache = ShardedCache<HitCount>;

/// Sharded byte cache with a sampled eviction policy.
///
/// Keys are arbitrary byte strings; values are opaque byte buffers with a
/// TTL in whole seconds. The byte budget is enforced per shard at
/// admission time; there is no background eviction task.
#[derive(Debug)]
pub struct ShardedCache<P: WorthPolicy> {
    shards: Box<[ProbeShard<P>]>,
    router: ShardRouter,
    max_total_bytes: usize,
    crit_total_bytes: usize,
    counters: CacheCounters,
}

impl<P: WorthPolicy + Default> ShardedCache<P> {
    /// Creates a cache with `num_shards` shards and byte budgets split
    /// evenly across them (integer division).
    ///
    /// `max_total_bytes == 0` disables the budget. `crit_total_bytes == 0`
    /// means "same as max". `probe_depth` is the per-admission sampling
    /// budget; past it, up to two more forced evictions keep a shard at or
    /// above its critical line shrinking.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `num_shards` is zero.
    pub fn new(
        num_shards: usize,
        max_total_bytes: usize,
        crit_total_bytes: usize,
        probe_depth: u32,
    ) -> Result<Self, ConfigError> {
        if num_shards == 0 {
            return Err(ConfigError::new("num_shards must be > 0"));
        }
        let max_per_shard = max_total_bytes / num_shards;
        let crit_per_shard = crit_total_bytes / num_shards;
        let shards = (0..num_shards)
            .map(|i| ProbeShard::new(max_per_shard, crit_per_shard, probe_depth, i as u64))
            .collect();
        Ok(Self {
            shards,
            router: ShardRouter::new(num_shards),
            max_total_bytes,
            crit_total_bytes,
            counters: CacheCounters::default(),
        })
    }
}

impl<P: WorthPolicy> ShardedCache<P> {
    #[inline]
    fn shard_for(&self, hash: u64) -> &ProbeShard<P> {
        &self.shards[self.router.route(hash)]
    }

    /// Stores `value` under `key` with a TTL in whole seconds.
    ///
    /// Overwriting a key keeps its accumulated worth; a fresh key may
    /// trigger the owning shard's eviction pass first. Never fails.
    pub fn set(&self, key: &[u8], value: &[u8], ttl_secs: u64) {
        let hash = fnv1a_64(key);
        let admission = self.shard_for(hash).set(hash, value, ttl_secs, unix_now());
        if admission.updated {
            self.counters.inc_update();
        } else {
            self.counters.inc_insert();
        }
        self.counters.add_evictions(admission.evicted);
    }

    /// Returns a copy of the value for `key`, or `None` if absent or
    /// expired.
    ///
    /// A hit counts toward the entry's worth. An expired entry is
    /// reclaimed on the spot.
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.get_with_ttl(key).map(|(payload, _)| payload)
    }

    /// Like [`get`](Self::get), additionally returning the remaining TTL
    /// in whole seconds.
    pub fn get_with_ttl(&self, key: &[u8]) -> Option<(Vec<u8>, u64)> {
        let hash = fnv1a_64(key);
        match self.shard_for(hash).get(hash, unix_now()) {
            Lookup::Hit { payload, remaining } => {
                self.counters.inc_hit();
                Some((payload, remaining))
            },
            Lookup::Expired => {
                self.counters.inc_expiration();
                self.counters.inc_miss();
                None
            },
            Lookup::Miss => {
                self.counters.inc_miss();
                None
            },
        }
    }

    /// Removes `key`, returning whether it was present. Removing an
    /// absent key is a no-op.
    pub fn del(&self, key: &[u8]) -> bool {
        let hash = fnv1a_64(key);
        let removed = self.shard_for(hash).del(hash);
        if removed {
            self.counters.inc_remove();
        }
        removed
    }

    /// Drops every entry in every shard and resets the recency epochs.
    pub fn clear(&self) {
        for shard in self.shards.iter() {
            shard.clear();
        }
    }

    /// Approximate total byte size: encoded entry lengths summed across
    /// shards without a global lock.
    pub fn size_bytes(&self) -> usize {
        self.shards.iter().map(|s| s.size_bytes()).sum()
    }

    /// Approximate number of resident entries across all shards.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.len()).sum()
    }

    /// Returns `true` if no shard holds an entry.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|s| s.is_empty())
    }

    /// Number of shards, fixed at construction.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Snapshot of the operation counters.
    pub fn metrics(&self) -> CacheMetrics {
        self.counters.snapshot()
    }

    /// Prints occupancy against the configured budgets to stdout.
    pub fn print_info(&self) {
        println!(
            "Cache size: {}kb / {}kb / {}kb across {} shards",
            self.size_bytes() / 1024,
            self.max_total_bytes / 1024,
            self.crit_total_bytes / 1024,
            self.shards.len(),
        );
    }

    /// Verifies every shard's accounting invariants.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        for (i, shard) in self.shards.iter().enumerate() {
            shard
                .check_invariants()
                .map_err(|e| InvariantError::new(format!("shard {i}: {e}")))?;
        }
        Ok(())
    }

    /// Fixed per-entry header overhead included in the size accounting.
    pub const fn entry_overhead() -> usize {
        HEADER_LEN
    }
}
