pub use crate::builder::{Cache, CacheBuilder, EvictionPolicy};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::store::bounded::{LfuCache, LruCache, ShardedCache};
pub use crate::store::counters::CacheMetrics;
pub use crate::store::ttl::TtlCache;
pub use crate::traits::ByteCache;
