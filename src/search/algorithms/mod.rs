mod dynamic_bitset;
mod max_cliques;
mod priority_queues;

pub use dynamic_bitset::DynamicBitset;
pub use max_cliques::compute_max_cliques;
pub use priority_queues::{AdaptiveQueue, BucketQueue, HeapQueue};
