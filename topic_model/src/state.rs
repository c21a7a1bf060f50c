use log::warn;
use ndarray::{Array1, Array2, Axis};

use crate::{ModelErr, Result, corpus::PartitionData, likelihood};

/// One shard's private token arrays and counters.
///
/// The word-topic and topic counters are overwritten at every synchronization
/// boundary, the document counters are strictly local and survive every
/// boundary untouched.
#[derive(Debug, Clone)]
pub struct PartitionState {
    id: usize,
    docs: Vec<usize>,
    pub(crate) words: Vec<usize>,
    pub(crate) doc_labels: Vec<usize>,
    pub(crate) topic_labels: Vec<usize>,
    pub(crate) word_topic: Array2<u32>,
    pub(crate) doc_topic: Array2<u32>,
    pub(crate) topic: Array1<u32>,
    pub(crate) doc: Array1<u32>,
}

impl PartitionState {
    /// Creates a new `PartitionState` with zeroed counters.
    ///
    /// # Arguments
    /// * `data` - The partition's tokens.
    /// * `vocab_size` - Size of the vocabulary shared by every partition.
    /// * `topics` - Number of topics.
    pub fn new(data: PartitionData, vocab_size: usize, topics: usize) -> Self {
        let PartitionData {
            id,
            docs,
            words,
            doc_labels,
        } = data;

        Self {
            id,
            topic_labels: vec![0; words.len()],
            word_topic: Array2::zeros((vocab_size, topics)),
            doc_topic: Array2::zeros((docs.len(), topics)),
            topic: Array1::zeros(topics),
            doc: Array1::zeros(docs.len()),
            docs,
            words,
            doc_labels,
        }
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Corpus level ids of the documents owned by this partition.
    #[inline]
    pub fn docs(&self) -> &[usize] {
        &self.docs
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    #[inline]
    pub fn topics(&self) -> usize {
        self.topic.len()
    }

    #[inline]
    pub fn vocab_size(&self) -> usize {
        self.word_topic.nrows()
    }

    #[inline]
    pub fn topic_labels(&self) -> &[usize] {
        &self.topic_labels
    }

    #[inline]
    pub fn word_topic(&self) -> &Array2<u32> {
        &self.word_topic
    }

    #[inline]
    pub fn doc_topic(&self) -> &Array2<u32> {
        &self.doc_topic
    }

    #[inline]
    pub fn topic_counts(&self) -> &Array1<u32> {
        &self.topic
    }

    #[inline]
    pub fn doc_counts(&self) -> &Array1<u32> {
        &self.doc
    }

    /// The word-topic table flattened in row-major order, as sent to the server.
    pub fn word_topic_flat(&self) -> &[u32] {
        self.word_topic
            .as_slice()
            .expect("word-topic table is always in standard layout")
    }

    /// Overwrites the word-topic counters with a broadcast table and recomputes
    /// the topic counters as its column sums. Document counters are left untouched.
    ///
    /// # Arguments
    /// * `global` - A flattened row-major `vocab_size x topics` table.
    ///
    /// # Returns
    /// A `SizeMismatch` error if `global` has the wrong length.
    pub fn apply_broadcast(&mut self, global: &[u32]) -> Result<()> {
        let table = self
            .word_topic
            .as_slice_mut()
            .expect("word-topic table is always in standard layout");

        if table.len() != global.len() {
            return Err(ModelErr::SizeMismatch {
                a: "broadcast table",
                b: "local word-topic table",
                got: global.len(),
                expected: table.len(),
            });
        }

        table.copy_from_slice(global);
        self.topic = self.word_topic.sum_axis(Axis(0));
        Ok(())
    }

    /// Adds token `i` to the counters of `topic`.
    pub(crate) fn assign(&mut self, i: usize, topic: usize) {
        let (w, d) = (self.words[i], self.doc_labels[i]);

        self.word_topic[[w, topic]] += 1;
        self.doc_topic[[d, topic]] += 1;
        self.topic[topic] += 1;
        self.doc[d] += 1;
    }

    /// Removes token `i` from the counters of `topic`.
    ///
    /// # Returns
    /// A `ConsistencyViolation` if any of the four counters would become negative,
    /// in which case nothing is modified.
    pub(crate) fn unassign(&mut self, i: usize, topic: usize) -> Result<()> {
        self.check_owned(i, topic)?;
        let (w, d) = (self.words[i], self.doc_labels[i]);

        self.word_topic[[w, topic]] -= 1;
        self.doc_topic[[d, topic]] -= 1;
        self.topic[topic] -= 1;
        self.doc[d] -= 1;
        Ok(())
    }

    /// Checks that token `i` is accounted for in every counter of `topic`.
    pub(crate) fn check_owned(&self, i: usize, topic: usize) -> Result<()> {
        let (w, d) = (self.words[i], self.doc_labels[i]);
        let topics = self.topics();

        if self.word_topic[[w, topic]] == 0 {
            return Err(ModelErr::negative("word-topic", w * topics + topic, -1));
        }
        if self.doc_topic[[d, topic]] == 0 {
            return Err(ModelErr::negative("doc-topic", d * topics + topic, -1));
        }
        if self.topic[topic] == 0 {
            return Err(ModelErr::negative("topic", topic, -1));
        }
        if self.doc[d] == 0 {
            return Err(ModelErr::negative("doc", d, -1));
        }

        Ok(())
    }

    /// Checks that every global word-topic cell covers at least the tokens this
    /// partition itself labels with that (word, topic) pair.
    ///
    /// # Returns
    /// A `ConsistencyViolation` pointing at the first cell that falls short.
    pub fn verify_against_labels(&self) -> Result<()> {
        let mut own = Array2::<u32>::zeros(self.word_topic.raw_dim());
        for (&w, &k) in self.words.iter().zip(&self.topic_labels) {
            own[[w, k]] += 1;
        }

        let topics = self.topics();
        for ((idx, &global), &local) in self.word_topic.indexed_iter().zip(own.iter()) {
            if global < local {
                let cell = idx.0 * topics + idx.1;
                return Err(ModelErr::negative("word-topic", cell, global as i64 - local as i64));
            }
        }

        Ok(())
    }

    /// Checks the document invariants: every document row sums to its length and
    /// every length matches the tokens labelled with that document.
    pub fn verify_documents(&self) -> Result<()> {
        let mut lengths = vec![0u32; self.docs.len()];
        for &d in &self.doc_labels {
            lengths[d] += 1;
        }

        let rows = self.doc_topic.sum_axis(Axis(1));
        for (d, ((&row, &count), &len)) in rows.iter().zip(&self.doc).zip(&lengths).enumerate() {
            if row != count || count != len {
                warn!(partition = self.id, doc = d; "document counters drifted");

                return Err(ModelErr::SizeMismatch {
                    a: "document-topic row",
                    b: "document length",
                    got: row as usize,
                    expected: len as usize,
                });
            }
        }

        Ok(())
    }

    /// Log-likelihood of the current word-topic and topic counters.
    pub fn log_likelihood(&self, beta: f64) -> f64 {
        likelihood::log_likelihood(self.word_topic.view(), self.topic.view(), beta)
    }

    /// Checks every local invariant: document rows, document lengths and topic
    /// counts being the column sums of the word-topic table.
    pub fn check_consistency(&self) -> Result<()> {
        self.verify_documents()?;

        let sums = self.word_topic.sum_axis(Axis(0));
        for (k, (&sum, &count)) in sums.iter().zip(&self.topic).enumerate() {
            if sum != count {
                return Err(ModelErr::negative("topic", k, count as i64 - sum as i64));
            }
        }

        Ok(())
    }

    /// The document-topic proportions of every owned document, in `docs()` order.
    ///
    /// `theta[d][k] = (doc_topic[d][k] + alpha) / (doc[d] + topics * alpha)`.
    pub fn theta(&self, alpha: f64) -> Array2<f64> {
        let topics = self.topics() as f64;
        let mut theta = self.doc_topic.mapv(|c| c as f64 + alpha);

        for (mut row, &len) in theta.axis_iter_mut(Axis(0)).zip(&self.doc) {
            row /= len as f64 + topics * alpha;
        }

        theta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_doc_state() -> PartitionState {
        let data = PartitionData {
            id: 0,
            docs: vec![4, 7],
            words: vec![0, 1, 1, 2],
            doc_labels: vec![0, 0, 1, 1],
        };

        PartitionState::new(data, 3, 2)
    }

    #[test]
    fn assign_and_unassign_round_trip() {
        let mut state = two_doc_state();
        state.assign(1, 1);
        let before = state.clone();

        state.assign(2, 0);
        state.unassign(2, 0).unwrap();

        assert_eq!(state.word_topic, before.word_topic);
        assert_eq!(state.doc_topic, before.doc_topic);
        assert_eq!(state.topic, before.topic);
        assert_eq!(state.doc, before.doc);
    }

    #[test]
    fn unassign_never_goes_negative() {
        let mut state = two_doc_state();
        let err = state.unassign(0, 1).unwrap_err();

        assert!(matches!(err, ModelErr::ConsistencyViolation { counter: "word-topic", .. }));
        assert!(state.word_topic.iter().all(|&c| c == 0));
    }

    #[test]
    fn broadcast_replaces_word_counts_only() {
        let mut state = two_doc_state();
        for i in 0..state.len() {
            state.assign(i, 0);
        }

        state.apply_broadcast(&[1, 1, 0, 2, 3, 0]).unwrap();

        assert_eq!(state.topic.to_vec(), [4, 3]);
        assert_eq!(state.doc.to_vec(), [2, 2]);
        assert_eq!(state.doc_topic.column(0).to_vec(), [2, 2]);
        assert!(state.apply_broadcast(&[0; 5]).is_err());
    }

    #[test]
    fn label_verification_spots_short_cells() {
        let mut state = two_doc_state();
        for i in 0..state.len() {
            state.topic_labels[i] = 1;
            state.assign(i, 1);
        }
        state.verify_against_labels().unwrap();
        state.check_consistency().unwrap();

        state.apply_broadcast(&[0, 1, 0, 1, 0, 1]).unwrap();
        let err = state.verify_against_labels().unwrap_err();
        assert!(matches!(
            err,
            ModelErr::ConsistencyViolation { index: 3, value: -1, .. }
        ));
    }

    #[test]
    fn theta_rows_are_distributions() {
        let mut state = two_doc_state();
        state.assign(0, 0);
        state.assign(1, 1);
        state.assign(2, 1);
        state.assign(3, 1);

        let theta = state.theta(0.1);
        for row in theta.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-12);
        }
        assert!(theta[[1, 1]] > theta[[1, 0]]);
    }
}
