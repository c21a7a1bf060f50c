use std::num::NonZeroUsize;

/// Immutable execution bounds for a partition worker.
#[derive(Debug, Clone, Copy)]
pub struct WorkerConfig {
    partition: usize,
    rounds: NonZeroUsize,
    verify_counts: bool,
}

impl WorkerConfig {
    /// Creates a new worker configuration.
    ///
    /// # Args
    /// * `partition` - Identifier used for observability.
    /// * `rounds` - Number of resample rounds after initialization.
    /// * `verify_counts` - Recheck every broadcast against the partition's own labels.
    pub fn new(partition: usize, rounds: NonZeroUsize, verify_counts: bool) -> Self {
        Self {
            partition,
            rounds,
            verify_counts,
        }
    }

    #[inline]
    pub fn partition(&self) -> usize {
        self.partition
    }

    #[inline]
    pub fn rounds(&self) -> usize {
        self.rounds.get()
    }

    #[inline]
    pub fn verify_counts(&self) -> bool {
        self.verify_counts
    }
}
