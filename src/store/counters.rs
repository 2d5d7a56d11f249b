//! Operation counters shared by the cache façades.
//!
//! All counters use `Ordering::Relaxed`: they are observational and never
//! gate correctness, so the cheapest ordering is the right one.

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time snapshot of cache activity.
///
/// All fields are cumulative since construction (or the last process
/// restart; counters are never persisted).
///
/// # Example
///
/// ```
/// use samplecache::store::counters::CacheMetrics;
///
/// let metrics = CacheMetrics {
///     hits: 150,
///     misses: 50,
///     ..Default::default()
/// };
///
/// let hit_rate = metrics.hits as f64 / (metrics.hits + metrics.misses) as f64;
/// assert!((hit_rate - 0.75).abs() < f64::EPSILON);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheMetrics {
    /// Successful lookups.
    pub hits: u64,
    /// Failed lookups (absent key).
    pub misses: u64,
    /// Lookups that found an entry past its expiry. Also counted as misses.
    pub expirations: u64,
    /// New key insertions.
    pub inserts: u64,
    /// Payload overwrites of existing keys.
    pub updates: u64,
    /// Explicit removals that found a key.
    pub removes: u64,
    /// Entries dropped by the eviction pass or the expiry sweeper.
    pub evictions: u64,
}

/// Atomic counter block backing [`CacheMetrics`].
#[derive(Debug, Default)]
pub struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    expirations: AtomicU64,
    inserts: AtomicU64,
    updates: AtomicU64,
    removes: AtomicU64,
    evictions: AtomicU64,
}

impl CacheCounters {
    pub fn snapshot(&self) -> CacheMetrics {
        CacheMetrics {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            removes: self.removes.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    #[inline]
    pub fn inc_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_expiration(&self) {
        self.expirations.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_update(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_remove(&self) {
        self.removes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_evictions(&self, n: u64) {
        if n > 0 {
            self.evictions.fetch_add(n, Ordering::Relaxed);
        }
    }
}
