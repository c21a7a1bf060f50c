use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

/// Specification for the count synchronization server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSpec {
    /// Amount of partitions that take part in every barrier.
    pub partitions: NonZeroUsize,
    /// Number of topics.
    pub topics: NonZeroUsize,
    /// Size of the shared vocabulary.
    pub vocab_size: usize,
    /// Number of resample rounds after the initial reduction.
    pub rounds: NonZeroUsize,
    /// The maximum amount of table cells per storage shard.
    pub shard_size: NonZeroUsize,
}

impl ServerSpec {
    /// Number of cells of the flattened word-topic table.
    pub fn cells(&self) -> usize {
        self.vocab_size * self.topics.get()
    }
}
