// ==============================================
// CONCURRENCY TESTS (integration)
// ==============================================
//
// Multi-threaded mixed workloads over overlapping keys. After every run
// the shard accounting invariants must hold exactly: size equals the sum
// of encoded entry lengths, worth totals equal the sum of entry worths,
// and the sampling order stays in sync with the slot map.

use std::sync::Arc;
use std::thread;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use samplecache::prelude::*;

const THREADS: usize = 8;
const OPS_PER_THREAD: usize = 50_000;
const KEY_SPACE: u32 = 2_000;

fn hammer<C: ByteCache + 'static>(cache: Arc<C>) {
    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let mut rng = SmallRng::seed_from_u64(t as u64 + 1);
                for _ in 0..OPS_PER_THREAD {
                    let key = (rng.random::<u32>() % KEY_SPACE).to_be_bytes();
                    match rng.random::<u32>() % 10 {
                        0..=4 => {
                            let len = (rng.random::<u32>() % 256) as usize;
                            cache.set(&key, &vec![0u8; len], 600);
                        },
                        5..=8 => {
                            let _ = cache.get(&key);
                        },
                        _ => {
                            cache.del(&key);
                        },
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn lru_invariants_survive_concurrent_mixed_ops() {
    let cache = Arc::new(LruCache::new(8, 256 * 1024, 0, 8).unwrap());

    hammer(Arc::clone(&cache));

    cache.check_invariants().unwrap();
    assert!(cache.size_bytes() <= 256 * 1024 + 8 * (256 + 16));
}

#[test]
fn lfu_invariants_survive_concurrent_mixed_ops() {
    let cache = Arc::new(LfuCache::new(8, 256 * 1024, 0, 8).unwrap());

    hammer(Arc::clone(&cache));

    cache.check_invariants().unwrap();
}

#[test]
fn ttl_cache_survives_concurrent_mixed_ops() {
    let cache = Arc::new(TtlCache::new(8, std::time::Duration::ZERO).unwrap());

    hammer(Arc::clone(&cache));

    // Unbounded variant: everything set and not deleted is resident.
    assert!(cache.len() <= KEY_SPACE as usize);
}

#[test]
fn clear_races_with_writers_without_corruption() {
    let cache = Arc::new(LfuCache::new(4, 64 * 1024, 0, 4).unwrap());

    let writers: Vec<_> = (0..4u64)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let mut rng = SmallRng::seed_from_u64(t + 100);
                for _ in 0..20_000 {
                    let key = (rng.random::<u32>() % 512).to_be_bytes();
                    cache.set(&key, &[0u8; 64], 600);
                }
            })
        })
        .collect();

    let clearer = {
        let cache = Arc::clone(&cache);
        thread::spawn(move || {
            for _ in 0..50 {
                cache.clear();
                thread::yield_now();
            }
        })
    };

    for w in writers {
        w.join().unwrap();
    }
    clearer.join().unwrap();

    cache.check_invariants().unwrap();
}

#[test]
fn same_key_operations_are_serialized() {
    // All threads fight over one key; the final state must be one of the
    // written values, never a torn or stale mix.
    let cache = Arc::new(LruCache::new(1, 0, 0, 4).unwrap());

    let handles: Vec<_> = (0..THREADS as u8)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..10_000u32 {
                    cache.set(b"contended", &[t; 32], 600);
                    if let Some(value) = cache.get(b"contended") {
                        assert_eq!(value.len(), 32);
                        let first = value[0];
                        assert!(value.iter().all(|&b| b == first), "torn read at op {i}");
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    cache.check_invariants().unwrap();
}
