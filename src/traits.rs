//! The uniform cache contract.
//!
//! All three cache variants expose the same keyed byte operations, so
//! code that populates or queries a cache can stay agnostic of the
//! eviction strategy behind it.
//!
//! ## Contract Summary
//!
//! | Operation | Behavior | Can fail? |
//! |---|---|---|
//! | `set` | store bytes under a key with a TTL in whole seconds | never |
//! | `get` | copy of the value, `None` when absent or expired | never |
//! | `get_with_ttl` | value plus remaining whole seconds | never |
//! | `del` | remove; absent key is a no-op | never |
//! | `clear` | drop everything | never |
//! | `size_bytes` | approximate encoded byte total | never |
//! | `print_info` | occupancy diagnostic to stdout | never |
//!
//! A missing key is an expected outcome, not an error: it is encoded as
//! `None`. Construction is the only fallible step
//! ([`ConfigError`](crate::error::ConfigError)).
//!
//! ## Semantics Shared by All Variants
//!
//! - Operations on the same key are linearizable (serialized by the
//!   owning shard's lock). Operations on different shards are unordered.
//! - `size_bytes` sums per-shard sizes without a global lock and may
//!   observe a mid-mutation total.
//! - Returned values are defensive copies; the cache's internal buffers
//!   are never handed out.
//!
//! ## Example
//!
//! ```
//! use samplecache::prelude::*;
//!
//! fn warm<C: ByteCache + ?Sized>(cache: &C, items: &[(&[u8], &[u8])]) {
//!     for (key, value) in items {
//!         cache.set(key, value, 300);
//!     }
//! }
//!
//! let cache = LfuCache::new(4, 1 << 20, 0, 16).unwrap();
//! warm(&cache, &[(b"a".as_slice(), b"1".as_slice())]);
//! assert_eq!(cache.get(b"a"), Some(b"1".to_vec()));
//! ```

use crate::policy::worth::WorthPolicy;
use crate::store::bounded::ShardedCache;
use crate::store::ttl::TtlCache;

/// Keyed byte-cache operations shared by every variant.
///
/// Object-safe: `Box<dyn ByteCache>` works when the concrete variant is
/// chosen at runtime.
pub trait ByteCache: Send + Sync {
    /// Stores `value` under `key` with a TTL in whole seconds.
    fn set(&self, key: &[u8], value: &[u8], ttl_secs: u64);

    /// Returns a copy of the value, or `None` when absent or expired.
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    /// Like [`get`](Self::get), plus the remaining TTL in whole seconds.
    fn get_with_ttl(&self, key: &[u8]) -> Option<(Vec<u8>, u64)>;

    /// Removes `key`; returns whether it was present.
    fn del(&self, key: &[u8]) -> bool;

    /// Drops every entry.
    fn clear(&self);

    /// Approximate total of encoded entry bytes.
    fn size_bytes(&self) -> usize;

    /// Writes an occupancy diagnostic to stdout.
    fn print_info(&self);
}

impl<P: WorthPolicy> ByteCache for ShardedCache<P> {
    fn set(&self, key: &[u8], value: &[u8], ttl_secs: u64) {
        ShardedCache::set(self, key, value, ttl_secs);
    }

    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        ShardedCache::get(self, key)
    }

    fn get_with_ttl(&self, key: &[u8]) -> Option<(Vec<u8>, u64)> {
        ShardedCache::get_with_ttl(self, key)
    }

    fn del(&self, key: &[u8]) -> bool {
        ShardedCache::del(self, key)
    }

    fn clear(&self) {
        ShardedCache::clear(self);
    }

    fn size_bytes(&self) -> usize {
        ShardedCache::size_bytes(self)
    }

    fn print_info(&self) {
        ShardedCache::print_info(self);
    }
}

impl ByteCache for TtlCache {
    fn set(&self, key: &[u8], value: &[u8], ttl_secs: u64) {
        TtlCache::set(self, key, value, ttl_secs);
    }

    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        TtlCache::get(self, key)
    }

    fn get_with_ttl(&self, key: &[u8]) -> Option<(Vec<u8>, u64)> {
        TtlCache::get_with_ttl(self, key)
    }

    fn del(&self, key: &[u8]) -> bool {
        TtlCache::del(self, key)
    }

    fn clear(&self) {
        TtlCache::clear(self);
    }

    fn size_bytes(&self) -> usize {
        TtlCache::size_bytes(self)
    }

    fn print_info(&self) {
        TtlCache::print_info(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::bounded::{LfuCache, LruCache};
    use std::time::Duration;

    fn exercise(cache: &dyn ByteCache) {
        cache.set(b"key", b"value", 60);
        assert_eq!(cache.get(b"key"), Some(b"value".to_vec()));

        let (payload, remaining) = cache.get_with_ttl(b"key").unwrap();
        assert_eq!(payload, b"value");
        assert!(remaining <= 60);

        assert!(cache.del(b"key"));
        assert_eq!(cache.get(b"key"), None);

        cache.set(b"other", b"x", 60);
        cache.clear();
        assert_eq!(cache.size_bytes(), 0);
    }

    #[test]
    fn all_variants_honor_the_contract() {
        let lru = LruCache::new(2, 0, 0, 4).unwrap();
        let lfu = LfuCache::new(2, 0, 0, 4).unwrap();
        let ttl = TtlCache::new(2, Duration::ZERO).unwrap();

        exercise(&lru);
        exercise(&lfu);
        exercise(&ttl);
    }

    #[test]
    fn variants_are_boxable() {
        let caches: Vec<Box<dyn ByteCache>> = vec![
            Box::new(LruCache::new(1, 0, 0, 4).unwrap()),
            Box::new(LfuCache::new(1, 0, 0, 4).unwrap()),
            Box::new(TtlCache::new(1, Duration::ZERO).unwrap()),
        ];

        for cache in &caches {
            cache.set(b"k", b"v", 10);
            assert_eq!(cache.get(b"k"), Some(b"v".to_vec()));
        }
    }
}
