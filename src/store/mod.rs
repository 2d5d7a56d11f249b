pub mod bounded;
pub mod counters;
pub mod shard;
pub mod ttl;

pub use bounded::{LfuCache, LruCache, ShardedCache};
pub use counters::CacheMetrics;
pub use ttl::TtlCache;
