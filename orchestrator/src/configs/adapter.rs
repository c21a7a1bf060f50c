use std::num::NonZeroUsize;

use comms::specs::{HyperSpec, SamplerSpec, ServerSpec};
use topic_model::corpus::PartitionStrategy;

use super::{LdaConfig, PartitioningConfig};
use crate::error::OrchestratorError;

/// Validates user configs and turns them into the specs every node is built from.
#[derive(Debug, Default)]
pub struct Adapter;

impl Adapter {
    pub fn new() -> Self {
        Self
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    /// Rejects configurations the job can't start with.
    pub fn validate(&self, config: &LdaConfig) -> Result<(), OrchestratorError> {
        let nonzero = [
            ("topics", config.topics),
            ("partitions", config.partitions),
            ("iterations", config.iterations),
            ("top_words", config.top_words),
            ("shard_size", config.shard_size),
        ];

        if let Some((name, _)) = nonzero.iter().find(|(_, v)| *v == 0) {
            return Err(OrchestratorError::InvalidConfig(format!(
                "{name} must be greater than 0"
            )));
        }

        for (name, prior) in [("alpha", config.alpha), ("beta", config.beta)] {
            if !prior.is_finite() || prior <= 0. {
                return Err(OrchestratorError::InvalidConfig(format!(
                    "{name} must be a positive finite number, got {prior}"
                )));
            }
        }

        if config.partitions > u32::MAX as usize {
            return Err(OrchestratorError::InvalidConfig(format!(
                "partitions ({}) is too large",
                config.partitions
            )));
        }

        Ok(())
    }

    // -------------------------------------------------------------------------
    // Adaptation
    // -------------------------------------------------------------------------

    pub fn strategy(&self, config: &LdaConfig) -> PartitionStrategy {
        match config.partitioning {
            PartitioningConfig::Contiguous => PartitionStrategy::Contiguous,
            PartitioningConfig::ByLength => PartitionStrategy::ByLength,
        }
    }

    /// Builds the server spec and one sampler spec per partition.
    ///
    /// # Arguments
    /// * `config` - The job configuration.
    /// * `vocab_size` - Size of the vocabulary shared by every partition.
    pub fn adapt(
        &self,
        config: &LdaConfig,
        vocab_size: usize,
    ) -> Result<(ServerSpec, Vec<SamplerSpec>), OrchestratorError> {
        self.validate(config)?;

        let topics = nonzero("topics", config.topics)?;
        let partitions = nonzero("partitions", config.partitions)?;
        let rounds = nonzero("iterations", config.iterations)?;

        let server = ServerSpec {
            partitions,
            topics,
            vocab_size,
            rounds,
            shard_size: nonzero("shard_size", config.shard_size)?,
        };

        let hyper = HyperSpec {
            alpha: config.alpha,
            beta: config.beta,
        };

        let samplers = (0..partitions.get())
            .map(|partition| SamplerSpec {
                partition,
                topics,
                vocab_size,
                rounds,
                hyper,
                verify_counts: config.verify_counts,
                seed: config.seed,
            })
            .collect();

        Ok((server, samplers))
    }
}

fn nonzero(name: &str, value: usize) -> Result<NonZeroUsize, OrchestratorError> {
    NonZeroUsize::new(value)
        .ok_or_else(|| OrchestratorError::InvalidConfig(format!("{name} must be greater than 0")))
}
