use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

/// The Dirichlet priors shared by every partition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HyperSpec {
    /// Document-topic smoothing.
    pub alpha: f64,
    /// Word-topic smoothing.
    pub beta: f64,
}

/// Bootstrap specification for a partition worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerSpec {
    /// Partition identifier assigned by the orchestrator.
    pub partition: usize,
    /// Number of topics.
    pub topics: NonZeroUsize,
    /// Size of the shared vocabulary.
    pub vocab_size: usize,
    /// Number of resample rounds to run after initialization.
    pub rounds: NonZeroUsize,
    pub hyper: HyperSpec,
    /// Recheck the broadcast table against the partition's own labels.
    pub verify_counts: bool,
    /// Optional seed for a reproducible trajectory.
    pub seed: Option<u64>,
}
