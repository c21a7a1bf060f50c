use std::{fs::File, io::BufReader, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::OrchestratorError;

/// How documents are spread among partitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitioningConfig {
    /// Balanced contiguous document ranges.
    #[default]
    Contiguous,
    /// Document character length modulo the amount of partitions.
    ByLength,
}

/// The user facing configuration of an LDA job.
///
/// Every field is optional in JSON, missing ones take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LdaConfig {
    pub topics: usize,
    pub partitions: usize,
    pub iterations: usize,
    pub alpha: f64,
    pub beta: f64,
    /// Minimum amount of distinct documents a word must appear in.
    pub min_doc_freq: usize,
    /// Words reported per topic.
    pub top_words: usize,
    pub seed: Option<u64>,
    pub partitioning: PartitioningConfig,
    /// Maximum amount of table cells per storage shard on the server.
    pub shard_size: usize,
    /// Recheck every broadcast against each partition's own labels.
    pub verify_counts: bool,
}

impl Default for LdaConfig {
    fn default() -> Self {
        Self {
            topics: 10,
            partitions: 5,
            iterations: 500,
            alpha: 0.001,
            beta: 0.01,
            min_doc_freq: topic_model::corpus::DEFAULT_MIN_DOC_FREQ,
            top_words: 10,
            seed: None,
            partitioning: PartitioningConfig::Contiguous,
            shard_size: 4096,
            verify_counts: false,
        }
    }
}

impl LdaConfig {
    /// Reads a configuration from a JSON file.
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the file can't be opened or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, OrchestratorError> {
        let path = path.as_ref();
        let invalid = |e: &dyn std::error::Error| {
            OrchestratorError::InvalidConfig(format!("{}: {e}", path.display()))
        };

        let file = File::open(path).map_err(|e| invalid(&e))?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| invalid(&e))
    }
}
