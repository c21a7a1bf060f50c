use comms::specs::SamplerSpec;
use rand::{SeedableRng, rngs::StdRng};
use topic_model::{ModelErr, PartitionState, Sampler, corpus::PartitionData};

use crate::{PartitionWorker, Result, WorkerConfig};

pub struct WorkerBuilder;

impl WorkerBuilder {
    /// Builds a `PartitionWorker` from a `SamplerSpec`.
    ///
    /// The random number generator is seeded with `seed + partition` so every
    /// partition follows its own reproducible stream, or from the OS when there's
    /// no seed.
    ///
    /// # Args
    /// * `spec` - Bootstrap specification received from the orchestrator.
    /// * `data` - The partition's tokens.
    ///
    /// # Returns
    /// A worker with zeroed counters, or a configuration error if `data` holds
    /// words outside the vocabulary.
    pub fn build(spec: SamplerSpec, data: PartitionData) -> Result<PartitionWorker<StdRng>> {
        if let Some(&w) = data.words.iter().find(|&&w| w >= spec.vocab_size) {
            let msg = format!(
                "partition {} holds word id {w} outside a vocabulary of {}",
                spec.partition, spec.vocab_size
            );
            return Err(ModelErr::Configuration(msg).into());
        }

        let rng = match spec.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(spec.partition as u64)),
            None => StdRng::from_os_rng(),
        };

        let cfg = WorkerConfig::new(spec.partition, spec.rounds, spec.verify_counts);
        let state = PartitionState::new(data, spec.vocab_size, spec.topics.get());
        let sampler = Sampler::new(spec.hyper, rng);

        Ok(PartitionWorker::new(cfg, state, sampler))
    }
}
