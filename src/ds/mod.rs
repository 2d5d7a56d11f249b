pub mod entry;
pub mod hash;

pub use entry::{PackedEntry, TtlEntry, HEADER_LEN, TTL_HEADER_LEN};
pub use hash::{fnv1a_64, unix_now, ShardRouter};
