pub mod configs;
pub mod error;
mod session;

use std::time::Duration;

use log::{info, warn};
use ndarray::Array2;
use topic_model::{
    GlobalCounts,
    corpus::{Partitioner, StopWords, Tokenizer, Vocabulary},
    summary,
};

use configs::{Adapter, LdaConfig};
use session::Session;

pub use error::OrchestratorError;

/// Everything an LDA job produces.
#[derive(Debug)]
pub struct LdaOutput {
    pub vocabulary: Vocabulary,
    /// Surviving tokens in the whole corpus.
    pub tokens: usize,
    /// A `2 * iterations x partitions` matrix, row `2r` holds each partition's
    /// likelihood before round `r` and row `2r + 1` the one after it.
    pub log_likelihood: Array2<f64>,
    /// The most probable words of every topic with their phi value.
    pub top_words: Vec<Vec<(String, f64)>>,
    /// Final global word-topic and topic counts.
    pub counts: GlobalCounts,
    /// Topic-word distributions, `topics x vocabulary`.
    pub phi: Array2<f64>,
    /// Document-topic distributions, `documents x topics`.
    pub theta: Array2<f64>,
    /// Wall time of every synchronization step, the initial reduction first.
    pub round_times: Vec<Duration>,
}

/// Fits an LDA model over `docs` with distributed collapsed Gibbs sampling.
///
/// # Arguments
/// * `docs` - The raw documents, in corpus order.
/// * `stop_words` - Words to drop before sampling.
/// * `config` - The job configuration.
///
/// # Errors
/// Returns an `OrchestratorError` if the configuration is invalid, any
/// partition or the server fails, or the final counts break an invariant.
pub fn fit<S: AsRef<str>>(
    docs: &[S],
    stop_words: StopWords,
    config: &LdaConfig,
) -> Result<LdaOutput, OrchestratorError> {
    let adapter = Adapter::new();
    adapter.validate(config)?;

    let corpus = Tokenizer::new(stop_words, config.min_doc_freq).tokenize(docs);
    if corpus.is_empty() {
        warn!("no token survived filtering, the model will be uniform");
    }

    let (server_spec, sampler_specs) = adapter.adapt(config, corpus.vocabulary.len())?;
    let partitions = Partitioner::new(adapter.strategy(config), server_spec.partitions)
        .split(&corpus);

    info!(
        docs = corpus.num_docs(), vocab = corpus.vocabulary.len(), tokens = corpus.len(),
        partitions = partitions.len(), iterations = config.iterations;
        "starting job"
    );

    let session = Session::new()?;
    let jobs = sampler_specs.into_iter().zip(partitions).collect();
    let (server, outcomes) = session.run(server_spec, jobs)?;

    let totals = server.counts.word_totals();
    if let Some(w) = (0..totals.len()).find(|&w| totals[w] as usize != corpus.occurrences[w]) {
        return Err(OrchestratorError::ConsistencyViolation(format!(
            "word {:?} holds {} tokens globally but occurs {} times",
            corpus.vocabulary.word(w),
            totals[w],
            corpus.occurrences[w]
        )));
    }

    let phi = summary::phi(&server.counts, config.beta);
    let top_words = summary::top_words(&phi, &corpus.vocabulary, config.top_words);
    let theta = summary::theta(
        corpus.num_docs(),
        config.topics,
        outcomes.iter().map(|o| (o.docs.as_slice(), &o.theta)),
    );

    info!(rounds = server.round_times.len(); "job finished");

    Ok(LdaOutput {
        tokens: corpus.len(),
        vocabulary: corpus.vocabulary,
        log_likelihood: server.log_likelihood,
        top_words,
        counts: server.counts,
        phi,
        theta,
        round_times: server.round_times,
    })
}
