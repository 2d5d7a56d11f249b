//! Key hashing and shard routing.
//!
//! Every public cache operation hashes the raw key bytes once with FNV-1a
//! and routes the hash to a shard. The hash doubles as the map key inside
//! the shard, so a key's bytes are never stored.
//!
//! ## Key Concepts
//!
//! - **Deterministic mapping**: the same `(key, num_shards)` pair always
//!   selects the same shard
//! - **Modulo routing**: shard index is `hash % num_shards`; the shard
//!   count does not have to be a power of two
//! - **Uniform distribution**: relies on FNV-1a spreading key bytes evenly
//!
//! ## Example Usage
//!
//! ```
//! use samplecache::ds::{fnv1a_64, ShardRouter};
//!
//! let router = ShardRouter::new(4);
//!
//! let shard = router.route(fnv1a_64(b"user:123"));
//! assert!(shard < 4);
//!
//! // Same key always maps to the same shard
//! assert_eq!(router.route(fnv1a_64(b"user:123")), shard);
//! ```

use std::time::{SystemTime, UNIX_EPOCH};

/// FNV-1a 64-bit offset basis.
pub const FNV_OFFSET_BASIS: u64 = 14_695_981_039_346_656_037;
/// FNV-1a 64-bit prime.
pub const FNV_PRIME: u64 = 1_099_511_628_211;

/// Hashes raw key bytes with 64-bit FNV-1a.
///
/// # Example
///
/// ```
/// use samplecache::ds::fnv1a_64;
///
/// assert_eq!(fnv1a_64(b""), 14_695_981_039_346_656_037);
/// assert_ne!(fnv1a_64(b"a"), fnv1a_64(b"b"));
/// ```
#[inline]
pub fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Current wall-clock time in whole unix seconds.
///
/// Expiry timestamps are absolute unix seconds, so second granularity is
/// the finest TTL the cache supports.
#[inline]
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Deterministic hash-to-shard router.
///
/// Maps a 64-bit key hash to a shard index in `[0, shards)`. Immutable
/// after construction; the shard count cannot change at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardRouter {
    shards: usize,
}

impl ShardRouter {
    /// Creates a router for `shards` shards.
    ///
    /// The shard count is clamped to at least 1 so routing can never
    /// divide by zero; public constructors reject zero before this point.
    pub fn new(shards: usize) -> Self {
        Self {
            shards: shards.max(1),
        }
    }

    /// Returns the number of shards.
    #[inline]
    pub fn shard_count(&self) -> usize {
        self.shards
    }

    /// Maps a key hash to a shard index in `[0, shards)`.
    #[inline]
    pub fn route(&self, hash: u64) -> usize {
        (hash % self.shards as u64) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv1a_matches_reference_vectors() {
        // Published FNV-1a test vectors.
        assert_eq!(fnv1a_64(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a_64(b"a"), 0xaf63_dc4c_8601_ec8c);
        assert_eq!(fnv1a_64(b"foobar"), 0x8594_4171_f739_67e8);
    }

    #[test]
    fn router_is_deterministic() {
        let router = ShardRouter::new(8);

        let a = router.route(fnv1a_64(b"key"));
        let b = router.route(fnv1a_64(b"key"));
        assert_eq!(a, b);
        assert!(a < router.shard_count());
    }

    #[test]
    fn router_clamps_zero_shards() {
        let router = ShardRouter::new(0);
        assert_eq!(router.shard_count(), 1);
        assert_eq!(router.route(u64::MAX), 0);
    }

    #[test]
    fn router_handles_non_power_of_two_counts() {
        let router = ShardRouter::new(7);
        for i in 0..1000u64 {
            assert!(router.route(fnv1a_64(&i.to_be_bytes())) < 7);
        }
    }
}
