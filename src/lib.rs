//! samplecache: sharded byte caches with sampled LRU/LFU eviction.
//!
//! Three cache variants share one contract ([`traits::ByteCache`]):
//!
//! - [`LruCache`](store::bounded::LruCache) — bounded, evicts by sampled
//!   last-touch recency.
//! - [`LfuCache`](store::bounded::LfuCache) — bounded, evicts by sampled
//!   hit frequency.
//! - [`TtlCache`](store::ttl::TtlCache) — unbounded, periodic expiry sweep.
//!
//! The bounded variants enforce a byte budget with no background task and
//! no ordering index: each admission samples a handful of random residents
//! and drops those with below-average worth.

pub mod ds;
pub mod policy;
pub mod store;

pub mod builder;
pub mod error;
pub mod prelude;
pub mod traits;
