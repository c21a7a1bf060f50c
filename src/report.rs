use orchestrator::LdaOutput;
use serde::Serialize;

/// The JSON document printed once a job finishes.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    documents: usize,
    vocabulary: usize,
    tokens: usize,
    /// One row per likelihood measurement, one column per partition.
    log_likelihood: Vec<Vec<f64>>,
    topics: Vec<Topic<'a>>,
    /// Milliseconds per synchronization step, the initial reduction first.
    round_millis: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct Topic<'a> {
    id: usize,
    tokens: u32,
    words: Vec<Word<'a>>,
}

#[derive(Debug, Serialize)]
struct Word<'a> {
    word: &'a str,
    phi: f64,
}

impl<'a> Report<'a> {
    pub fn new(output: &'a LdaOutput, documents: usize) -> Self {
        let topics = output
            .top_words
            .iter()
            .zip(output.counts.topic_counts())
            .enumerate()
            .map(|(id, (words, &tokens))| Topic {
                id,
                tokens,
                words: words
                    .iter()
                    .map(|(word, phi)| Word { word, phi: *phi })
                    .collect(),
            })
            .collect();

        Self {
            documents,
            vocabulary: output.vocabulary.len(),
            tokens: output.tokens,
            log_likelihood: output.log_likelihood.rows().into_iter().map(|r| r.to_vec()).collect(),
            topics,
            round_millis: output
                .round_times
                .iter()
                .map(|d| d.as_secs_f64() * 1e3)
                .collect(),
        }
    }
}
