use ndarray::{Array1, Array2, Axis};

use crate::{ModelErr, Result, likelihood};

/// The reconciled word-topic and topic count tables.
///
/// This is the only state that crosses partition boundaries. Topic counts are
/// always derived as column sums of the word-topic table.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalCounts {
    word_topic: Array2<u32>,
    topic: Array1<u32>,
}

impl GlobalCounts {
    /// Builds the tables from a flattened row-major `vocab_size x topics` buffer.
    ///
    /// # Returns
    /// A `SizeMismatch` error if `flat` doesn't hold exactly `vocab_size * topics` cells.
    pub fn from_flat(vocab_size: usize, topics: usize, flat: Vec<u32>) -> Result<Self> {
        let got = flat.len();
        let word_topic = Array2::from_shape_vec((vocab_size, topics), flat).map_err(|_| {
            ModelErr::SizeMismatch {
                a: "flat counts",
                b: "vocabulary x topics",
                got,
                expected: vocab_size * topics,
            }
        })?;

        Ok(Self::from_word_topic(word_topic))
    }

    /// Wraps a word-topic table, deriving the topic counts from it.
    pub fn from_word_topic(word_topic: Array2<u32>) -> Self {
        let topic = word_topic.sum_axis(Axis(0));
        Self { word_topic, topic }
    }

    /// The `vocab_size x topics` word-topic table.
    #[inline]
    pub fn word_topic(&self) -> &Array2<u32> {
        &self.word_topic
    }

    #[inline]
    pub fn topic_counts(&self) -> &Array1<u32> {
        &self.topic
    }

    #[inline]
    pub fn vocab_size(&self) -> usize {
        self.word_topic.nrows()
    }

    #[inline]
    pub fn topics(&self) -> usize {
        self.word_topic.ncols()
    }

    /// Total tokens per word across all topics.
    pub fn word_totals(&self) -> Array1<u32> {
        self.word_topic.sum_axis(Axis(1))
    }

    pub fn log_likelihood(&self, beta: f64) -> f64 {
        likelihood::log_likelihood(self.word_topic.view(), self.topic.view(), beta)
    }

    /// Total tokens in the table.
    pub fn total(&self) -> u64 {
        self.topic.iter().map(|&c| c as u64).sum()
    }
}
