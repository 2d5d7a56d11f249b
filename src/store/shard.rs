//! Probe shard: the sampled-eviction core of the bounded caches.
//!
//! Each shard independently enforces a byte budget with no background
//! task, no linked list, no heap, and no frequency sketch. Admission of a
//! new key samples a handful of random residents and deletes those whose
//! worth sits at or below the shard average.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────────┐
//! │                       ProbeShard<P> Layout                             │
//! │                                                                        │
//! │   Mutex<ShardInner>                                                    │
//! │   ┌────────────────────────────────────────────────────────────────┐   │
//! │   │  slots: FxHashMap<u64, SlotEntry>   probe_order: Vec<u64>      │   │
//! │   │         hash → (pos, entry)          dense array of hashes     │   │
//! │   │                                                                │   │
//! │   │  ┌─────────┬─────────────┐          ┌─────┬─────┬─────┬─────┐  │   │
//! │   │  │  hash   │ (pos,entry) │          │  0  │  1  │  2  │  3  │  │   │
//! │   │  ├─────────┼─────────────┤          ├─────┼─────┼─────┼─────┤  │   │
//! │   │  │  h1     │ (0, e1)     │────┐     │ h1  │ h2  │ h3  │ h4  │  │   │
//! │   │  │  h2     │ (1, e2)     │────┼────►└─────┴─────┴─────┴─────┘  │   │
//! │   │  │  h3     │ (2, e3)     │────┘                                │   │
//! │   │  └─────────┴─────────────┘                                     │   │
//! │   │                                                                │   │
//! │   │  size: Σ entry.len()      total_worth: Σ decoded worth         │   │
//! │   └────────────────────────────────────────────────────────────────┘   │
//! │                                                                        │
//! │   Admission of a fresh key (size > max_bytes):                         │
//! │     1. threshold = total_worth / population   (computed once)          │
//! │     2. budget = probe_depth                                            │
//! │     3. sample a random resident via XorShift64 % probe_order.len()     │
//! │     4. evict it if worth <= threshold, or expired, or budget <= 0      │
//! │     5. budget -= 1; stop at size <= max_bytes, budget == -2, or        │
//! │        (budget <= 0 and size < crit_bytes)                             │
//! └────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why sampling works
//!
//! Under skewed access (the usual 80/20 shape) a uniform sample is far
//! more likely to land on a cold entry than a hot one, and the
//! at-or-below-average filter drops it. The average `total_worth /
//! population` is a cheap stand-in for the median that costs no sorting
//! and no auxiliary structure. Under uniform access the filter rarely
//! fires within the budget, so once the budget is spent and the shard is
//! still at or above `crit_bytes`, the pass force-evicts whatever it
//! samples — at most two entries past the budget — guaranteeing the shard
//! shrinks faster than it grows.
//!
//! Rust's `HashMap` iterates in a per-map fixed order, so random sampling
//! needs its own source: `probe_order` is a dense vector of resident
//! hashes kept in sync with the map by swap-remove, and an XorShift64
//! state picks indices into it. Sampling is O(1) per probe.
//!
//! ## Locking
//!
//! One `parking_lot::Mutex` per shard, held for the whole of every
//! operation — including reads, because a hit rewrites the entry's worth
//! field and the running total. Shards never take each other's locks.
//!
//! ## Invariants
//!
//! 1. `size` equals the sum of encoded entry lengths in `slots`.
//! 2. `total_worth` equals the sum of decoded worth fields (float
//!    tolerance for the recency policy).
//! 3. `probe_order` holds exactly the hashes in `slots`, and each
//!    `SlotEntry::pos` points back at its own hash.
//! 4. After `set` returns, `size <= crit_bytes` unless the probe budget
//!    was exhausted while a single oversized entry remained.
//!
//! [`ProbeShard::check_invariants`] verifies all of these.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::ds::entry::PackedEntry;
use crate::error::InvariantError;
use crate::policy::worth::WorthPolicy;

/// Resident entry plus its position in the dense sampling vector.
#[derive(Debug)]
struct SlotEntry {
    pos: usize,
    entry: PackedEntry,
}

/// Outcome of a shard-level lookup.
#[derive(Debug, PartialEq, Eq)]
pub enum Lookup {
    /// Entry found and fresh; payload copy plus remaining whole seconds.
    Hit { payload: Vec<u8>, remaining: u64 },
    /// Entry found but past expiry; it has been reclaimed.
    Expired,
    /// No entry for this hash.
    Miss,
}

/// Outcome of a shard-level insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    /// `true` when an existing key's payload was replaced.
    pub updated: bool,
    /// Entries dropped by the clean pass ahead of this insert.
    pub evicted: u64,
}

/// One independently locked partition of a bounded cache.
#[derive(Debug)]
pub struct ProbeShard<P: WorthPolicy> {
    inner: Mutex<ShardInner<P>>,
}

#[derive(Debug)]
struct ShardInner<P: WorthPolicy> {
    slots: FxHashMap<u64, SlotEntry>,
    /// Dense resident hashes for O(1) uniform sampling.
    probe_order: Vec<u64>,
    size: usize,
    total_worth: P::Worth,
    max_bytes: usize,
    crit_bytes: usize,
    probe_depth: i64,
    rng_state: u64,
    policy: P,
}

impl<P: WorthPolicy + Default> ProbeShard<P> {
    /// Creates a shard with byte budgets and a probe budget.
    ///
    /// `max_bytes == 0` disables the budget entirely. `crit_bytes == 0`
    /// is treated as equal to `max_bytes`. `seed` differentiates the
    /// sampling streams of sibling shards.
    pub fn new(max_bytes: usize, crit_bytes: usize, probe_depth: u32, seed: u64) -> Self {
        let crit_bytes = if crit_bytes == 0 { max_bytes } else { crit_bytes };
        Self {
            inner: Mutex::new(ShardInner {
                slots: FxHashMap::default(),
                probe_order: Vec::new(),
                size: 0,
                total_worth: P::ZERO,
                max_bytes,
                crit_bytes,
                probe_depth: i64::from(probe_depth),
                // XorShift state must be non-zero.
                rng_state: seed.wrapping_add(0x9e37_79b9_7f4a_7c15) | 1,
                policy: P::default(),
            }),
        }
    }
}

impl<P: WorthPolicy> ProbeShard<P> {
    /// Inserts or overwrites the entry for `hash`.
    ///
    /// An overwrite carries the old entry's worth forward and skips the
    /// clean pass; a fresh insert runs the clean pass first and starts at
    /// worth zero. Never fails.
    pub fn set(&self, hash: u64, payload: &[u8], ttl_secs: u64, now: u64) -> Admission {
        let mut inner = self.inner.lock();
        inner.set(hash, payload, ttl_secs, now)
    }

    /// Looks up `hash`, bumping worth on a hit and reclaiming on expiry.
    pub fn get(&self, hash: u64, now: u64) -> Lookup {
        let mut inner = self.inner.lock();
        inner.get(hash, now)
    }

    /// Removes the entry for `hash` if present.
    pub fn del(&self, hash: u64) -> bool {
        let mut inner = self.inner.lock();
        inner.remove_slot(hash).is_some()
    }

    /// Drops every entry and resets accounting and the policy epoch.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.slots.clear();
        inner.probe_order.clear();
        inner.size = 0;
        inner.total_worth = P::ZERO;
        inner.policy.reset();
    }

    /// Current byte size (encoded entry lengths).
    pub fn size_bytes(&self) -> usize {
        self.inner.lock().size
    }

    /// Current number of resident entries.
    pub fn len(&self) -> usize {
        self.inner.lock().slots.len()
    }

    /// Returns `true` if the shard holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Verifies the shard's accounting invariants.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let inner = self.inner.lock();

        if inner.slots.len() != inner.probe_order.len() {
            return Err(InvariantError::new(format!(
                "slot map holds {} entries but probe order holds {}",
                inner.slots.len(),
                inner.probe_order.len()
            )));
        }

        let mut size = 0usize;
        let mut total = P::ZERO;
        for (hash, slot) in &inner.slots {
            size += slot.entry.len();
            total = P::accumulate(total, P::decode(slot.entry.worth_bits()));
            if inner.probe_order.get(slot.pos) != Some(hash) {
                return Err(InvariantError::new(format!(
                    "slot for hash {hash:#x} points at probe position {} holding a different hash",
                    slot.pos
                )));
            }
        }

        if size != inner.size {
            return Err(InvariantError::new(format!(
                "size counter is {} but entries sum to {}",
                inner.size, size
            )));
        }
        if !P::worth_eq(inner.total_worth, total) {
            return Err(InvariantError::new(format!(
                "worth counter is {:?} but entries sum to {:?}",
                inner.total_worth, total
            )));
        }
        Ok(())
    }
}

impl<P: WorthPolicy> ShardInner<P> {
    fn set(&mut self, hash: u64, payload: &[u8], ttl_secs: u64, now: u64) -> Admission {
        let expires_at = now.saturating_add(ttl_secs);

        if let Some(slot) = self.slots.get_mut(&hash) {
            // Overwrite: the worth survives the payload swap, so the
            // running total needs no adjustment.
            let carried = slot.entry.worth_bits();
            self.size = self.size.saturating_sub(slot.entry.len());
            slot.entry = PackedEntry::pack(payload, expires_at, carried);
            self.size += slot.entry.len();
            return Admission {
                updated: true,
                evicted: 0,
            };
        }

        let evicted = self.clean(now);

        let entry = PackedEntry::pack(payload, expires_at, P::encode(P::ZERO));
        self.size += entry.len();
        let pos = self.probe_order.len();
        self.probe_order.push(hash);
        self.slots.insert(hash, SlotEntry { pos, entry });
        Admission {
            updated: false,
            evicted,
        }
    }

    fn get(&mut self, hash: u64, now: u64) -> Lookup {
        match self.slots.get_mut(&hash) {
            None => return Lookup::Miss,
            Some(slot) => {
                let expires_at = slot.entry.expires_at();
                if expires_at > now {
                    let previous = P::decode(slot.entry.worth_bits());
                    let bumped = self.policy.bump(&mut self.total_worth, previous);
                    slot.entry.set_worth_bits(P::encode(bumped));
                    return Lookup::Hit {
                        payload: slot.entry.payload().to_vec(),
                        remaining: expires_at - now,
                    };
                }
            },
        }
        // Lazy expiry: reclaim on touch.
        self.remove_slot(hash);
        Lookup::Expired
    }

    /// Removes an entry, keeping size, worth, and sampling order in sync.
    fn remove_slot(&mut self, hash: u64) -> Option<()> {
        let slot = self.slots.remove(&hash)?;
        self.size = self.size.saturating_sub(slot.entry.len());
        self.total_worth = P::deduct(self.total_worth, P::decode(slot.entry.worth_bits()));

        self.probe_order.swap_remove(slot.pos);
        if slot.pos < self.probe_order.len() {
            let moved = self.probe_order[slot.pos];
            if let Some(m) = self.slots.get_mut(&moved) {
                m.pos = slot.pos;
            }
        }
        Some(())
    }

    /// Sampled eviction pass, run before admitting a fresh key.
    ///
    /// Returns the number of entries evicted.
    fn clean(&mut self, now: u64) -> u64 {
        if self.max_bytes == 0 || self.size <= self.max_bytes {
            return 0;
        }

        // Average worth at entry into the pass; not recomputed as
        // eviction shifts the total.
        let threshold = P::threshold(self.total_worth, self.slots.len());
        let mut budget = self.probe_depth;
        let mut evicted = 0u64;

        loop {
            if self.size <= self.max_bytes
                || budget == -2
                || (budget <= 0 && self.size < self.crit_bytes)
            {
                break;
            }
            let population = self.probe_order.len();
            if population == 0 {
                break;
            }

            let pick = (self.next_random() as usize) % population;
            let hash = self.probe_order[pick];
            let (worth, expires_at) = {
                let slot = &self.slots[&hash];
                (P::decode(slot.entry.worth_bits()), slot.entry.expires_at())
            };

            // Past the budget every sampled key goes, worth regardless:
            // the shard is at or above crit_bytes and must shrink.
            if worth <= threshold || expires_at <= now || budget <= 0 {
                self.remove_slot(hash);
                evicted += 1;
            }
            budget -= 1;
        }
        evicted
    }

    /// XorShift64 step; cheap, stateful, and independent per shard.
    #[inline]
    fn next_random(&mut self) -> u64 {
        let mut x = self.rng_state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.rng_state = x;
        x
    }
}
