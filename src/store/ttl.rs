//! Unbounded TTL cache with a periodic expiry sweeper.
//!
//! [`TtlCache`] keeps no byte budget and no worth metadata: entries live
//! until their TTL lapses. Expired entries are reclaimed two ways:
//!
//! - **Lazily**, when a lookup finds them past expiry.
//! - **Periodically**, by a background sweeper thread that write-locks
//!   each shard in turn and drops everything expired.
//!
//! Because lookups never mutate entries here, each shard is guarded by a
//! `parking_lot::RwLock`: reads share the lock, writes and the sweeper
//! take it exclusively.
//!
//! The sweeper is owned by the cache. [`TtlCache::close`] stops and joins
//! it; dropping the cache closes it as a fallback. A `clean_period` of
//! zero disables the sweeper entirely, in which case expired entries are
//! reclaimed only when touched.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::ds::entry::TtlEntry;
use crate::ds::hash::{fnv1a_64, unix_now, ShardRouter};
use crate::error::ConfigError;
use crate::store::counters::{CacheCounters, CacheMetrics};

struct TtlShardInner {
    map: FxHashMap<u64, TtlEntry>,
    size: usize,
}

struct TtlShard {
    inner: RwLock<TtlShardInner>,
}

impl TtlShard {
    fn new() -> Self {
        Self {
            inner: RwLock::new(TtlShardInner {
                map: FxHashMap::default(),
                size: 0,
            }),
        }
    }

    fn set(&self, hash: u64, payload: &[u8], ttl_secs: u64, now: u64) -> bool {
        let entry = TtlEntry::pack(payload, now.saturating_add(ttl_secs));
        let added = entry.len();
        let mut inner = self.inner.write();
        let previous = inner.map.insert(hash, entry);
        inner.size += added;
        match previous {
            Some(old) => {
                inner.size = inner.size.saturating_sub(old.len());
                true
            },
            None => false,
        }
    }

    fn get(&self, hash: u64, now: u64) -> TtlLookup {
        {
            let inner = self.inner.read();
            match inner.map.get(&hash) {
                None => return TtlLookup::Miss,
                Some(entry) => {
                    let expires_at = entry.expires_at();
                    if expires_at > now {
                        return TtlLookup::Hit {
                            payload: entry.payload().to_vec(),
                            remaining: expires_at - now,
                        };
                    }
                },
            }
        }
        // Expired under the read lock: upgrade and re-check, since
        // another writer may have replaced the entry in between.
        let mut inner = self.inner.write();
        if let Some(entry) = inner.map.get(&hash) {
            if entry.expires_at() <= now {
                let len = entry.len();
                inner.map.remove(&hash);
                inner.size = inner.size.saturating_sub(len);
                return TtlLookup::Expired;
            }
        }
        TtlLookup::Miss
    }

    fn del(&self, hash: u64) -> bool {
        let mut inner = self.inner.write();
        match inner.map.remove(&hash) {
            Some(entry) => {
                inner.size = inner.size.saturating_sub(entry.len());
                true
            },
            None => false,
        }
    }

    fn clear(&self) {
        let mut inner = self.inner.write();
        inner.map.clear();
        inner.size = 0;
    }

    fn size_bytes(&self) -> usize {
        self.inner.read().size
    }

    fn len(&self) -> usize {
        self.inner.read().map.len()
    }

    /// Drops every expired entry; returns how many were reclaimed.
    fn sweep(&self, now: u64) -> u64 {
        let mut inner = self.inner.write();
        let mut reclaimed_bytes = 0usize;
        let mut reclaimed = 0u64;
        inner.map.retain(|_, entry| {
            if entry.expires_at() <= now {
                reclaimed_bytes += entry.len();
                reclaimed += 1;
                false
            } else {
                true
            }
        });
        inner.size = inner.size.saturating_sub(reclaimed_bytes);
        reclaimed
    }
}

enum TtlLookup {
    Hit { payload: Vec<u8>, remaining: u64 },
    Expired,
    Miss,
}

struct Sweeper {
    stop_tx: mpsc::Sender<()>,
    handle: thread::JoinHandle<()>,
}

/// Shared state between the cache handle and the sweeper thread.
struct TtlShared {
    shards: Box<[TtlShard]>,
    counters: CacheCounters,
}

/// Unbounded sharded TTL cache.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use samplecache::store::ttl::TtlCache;
///
/// // Sweep expired entries every 30 seconds.
/// let mut cache = TtlCache::new(4, Duration::from_secs(30)).unwrap();
///
/// cache.set(b"token", b"abc123", 300);
/// assert_eq!(cache.get(b"token"), Some(b"abc123".to_vec()));
///
/// cache.close();
/// ```
pub struct TtlCache {
    shared: Arc<TtlShared>,
    router: ShardRouter,
    clean_period: Duration,
    sweeper: Option<Sweeper>,
}

impl TtlCache {
    /// Creates a TTL cache with `num_shards` shards.
    ///
    /// A non-zero `clean_period` starts a background sweeper waking at
    /// that interval; a zero period disables it, leaving expired entries
    /// resident until the next lookup touches them.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when `num_shards` is zero.
    pub fn new(num_shards: usize, clean_period: Duration) -> Result<Self, ConfigError> {
        if num_shards == 0 {
            return Err(ConfigError::new("num_shards must be > 0"));
        }
        let shared = Arc::new(TtlShared {
            shards: (0..num_shards).map(|_| TtlShard::new()).collect(),
            counters: CacheCounters::default(),
        });
        let sweeper = if clean_period > Duration::ZERO {
            Some(Self::spawn_sweeper(Arc::clone(&shared), clean_period))
        } else {
            None
        };
        Ok(Self {
            shared,
            router: ShardRouter::new(num_shards),
            clean_period,
            sweeper,
        })
    }

    fn spawn_sweeper(shared: Arc<TtlShared>, period: Duration) -> Sweeper {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name("samplecache-ttl-sweeper".into())
            .spawn(move || loop {
                match stop_rx.recv_timeout(period) {
                    Err(RecvTimeoutError::Timeout) => {
                        let now = unix_now();
                        let mut reclaimed = 0u64;
                        for shard in shared.shards.iter() {
                            reclaimed += shard.sweep(now);
                        }
                        shared.counters.add_evictions(reclaimed);
                    },
                    // A stop signal, or the cache handle is gone.
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => return,
                }
            })
            .expect("failed to spawn ttl sweeper thread");
        Sweeper { stop_tx, handle }
    }

    #[inline]
    fn shard_for(&self, hash: u64) -> &TtlShard {
        &self.shared.shards[self.router.route(hash)]
    }

    /// Stores `value` under `key` with a TTL in whole seconds. Never fails.
    pub fn set(&self, key: &[u8], value: &[u8], ttl_secs: u64) {
        let hash = fnv1a_64(key);
        let updated = self.shard_for(hash).set(hash, value, ttl_secs, unix_now());
        if updated {
            self.shared.counters.inc_update();
        } else {
            self.shared.counters.inc_insert();
        }
    }

    /// Returns a copy of the value for `key`, or `None` if absent or
    /// expired.
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.get_with_ttl(key).map(|(payload, _)| payload)
    }

    /// Like [`get`](Self::get), additionally returning the remaining TTL
    /// in whole seconds.
    pub fn get_with_ttl(&self, key: &[u8]) -> Option<(Vec<u8>, u64)> {
        let hash = fnv1a_64(key);
        match self.shard_for(hash).get(hash, unix_now()) {
            TtlLookup::Hit { payload, remaining } => {
                self.shared.counters.inc_hit();
                Some((payload, remaining))
            },
            TtlLookup::Expired => {
                self.shared.counters.inc_expiration();
                self.shared.counters.inc_miss();
                None
            },
            TtlLookup::Miss => {
                self.shared.counters.inc_miss();
                None
            },
        }
    }

    /// Removes `key`, returning whether it was present.
    pub fn del(&self, key: &[u8]) -> bool {
        let hash = fnv1a_64(key);
        let removed = self.shard_for(hash).del(hash);
        if removed {
            self.shared.counters.inc_remove();
        }
        removed
    }

    /// Drops every entry in every shard.
    pub fn clear(&self) {
        for shard in self.shared.shards.iter() {
            shard.clear();
        }
    }

    /// Approximate total byte size across shards.
    pub fn size_bytes(&self) -> usize {
        self.shared.shards.iter().map(|s| s.size_bytes()).sum()
    }

    /// Approximate number of resident entries across shards.
    pub fn len(&self) -> usize {
        self.shared.shards.iter().map(|s| s.len()).sum()
    }

    /// Returns `true` if no shard holds an entry.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the operation counters. Sweeper reclaims count as
    /// evictions.
    pub fn metrics(&self) -> CacheMetrics {
        self.shared.counters.snapshot()
    }

    /// Prints per-shard occupancy to stdout.
    pub fn print_info(&self) {
        println!(
            "TTL cache: {} entries, {}kb, sweep every {:?}",
            self.len(),
            self.size_bytes() / 1024,
            self.clean_period,
        );
        for (i, shard) in self.shared.shards.iter().enumerate() {
            println!("  shard #{i}: len={}, size={}b", shard.len(), shard.size_bytes());
        }
    }

    /// Stops and joins the sweeper thread. Idempotent; a no-op when the
    /// sweeper was never started.
    pub fn close(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            // Send failure means the thread already exited.
            let _ = sweeper.stop_tx.send(());
            let _ = sweeper.handle.join();
        }
    }
}

impl Drop for TtlCache {
    fn drop(&mut self) {
        self.close();
    }
}
