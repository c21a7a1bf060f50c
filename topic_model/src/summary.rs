use ndarray::{Array2, Axis, parallel::prelude::*};

use crate::{GlobalCounts, corpus::Vocabulary};

/// The topic-word distributions, a row-stochastic `topics x vocab_size` matrix.
///
/// `phi[k][w] = (word_topic[w][k] + beta) / (topic[k] + vocab_size * beta)`.
pub fn phi(counts: &GlobalCounts, beta: f64) -> Array2<f64> {
    let v_beta = counts.vocab_size() as f64 * beta;
    let mut phi = counts.word_topic().t().mapv(|c| c as f64 + beta);

    for (mut row, &total) in phi.axis_iter_mut(Axis(0)).zip(counts.topic_counts()) {
        row /= total as f64 + v_beta;
    }

    phi
}

/// The `n` most probable words of every topic, in descending order of phi.
///
/// Words with equal probability keep vocabulary order.
pub fn top_words(phi: &Array2<f64>, vocabulary: &Vocabulary, n: usize) -> Vec<Vec<(String, f64)>> {
    phi.axis_iter(Axis(0))
        .into_par_iter()
        .map(|row| {
            let mut ids: Vec<usize> = (0..row.len()).collect();
            ids.sort_by(|&a, &b| row[b].total_cmp(&row[a]));

            ids.into_iter()
                .take(n)
                .map(|w| (vocabulary.word(w).to_string(), row[w]))
                .collect()
        })
        .collect()
}

/// Assembles the document-topic matrix of the whole corpus from per-partition rows.
///
/// # Arguments
/// * `num_docs` - Number of documents in the corpus.
/// * `topics` - Number of topics.
/// * `parts` - Pairs of corpus level document ids and their theta rows.
///
/// # Returns
/// A `num_docs x topics` matrix. Rows of documents no partition reports are uniform.
pub fn theta<'a, I>(num_docs: usize, topics: usize, parts: I) -> Array2<f64>
where
    I: IntoIterator<Item = (&'a [usize], &'a Array2<f64>)>,
{
    let mut theta = Array2::from_elem((num_docs, topics), 1. / topics as f64);

    for (docs, rows) in parts {
        for (&doc, row) in docs.iter().zip(rows.rows()) {
            theta.row_mut(doc).assign(&row);
        }
    }

    theta
}

#[cfg(test)]
mod tests {
    use comms::specs::HyperSpec;
    use ndarray::array;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{
        PartitionState, Sampler,
        corpus::{PartitionData, StopWords, Tokenizer},
    };

    #[test]
    fn phi_rows_sum_to_one() {
        let counts = GlobalCounts::from_word_topic(array![[3, 0], [1, 2], [0, 4]]);
        let phi = phi(&counts, 0.01);

        assert_eq!(phi.dim(), (2, 3));
        for row in phi.rows() {
            assert!((row.sum() - 1.).abs() < 1e-12);
        }
        assert!(phi[[0, 0]] > phi[[0, 1]]);
    }

    #[test]
    fn top_words_are_sorted_and_ties_keep_order() {
        let vocabulary: Vocabulary = ["a", "b", "c", "d"].into_iter().collect();
        let phi = array![[0.1, 0.4, 0.1, 0.4], [0.7, 0.1, 0.1, 0.1]];

        let top = top_words(&phi, &vocabulary, 3);

        let names: Vec<_> = top[0].iter().map(|(w, _)| w.as_str()).collect();
        assert_eq!(names, ["b", "d", "a"]);
        assert_eq!(top[1][0].0, "a");
        assert_eq!(top_words(&phi, &vocabulary, 10)[0].len(), 4);
    }

    #[test]
    fn theta_fills_missing_documents_uniformly() {
        let part = array![[0.9, 0.1]];
        let docs = [2];

        let theta = theta(3, 2, [(&docs[..], &part)]);

        assert_eq!(theta.row(2).to_vec(), [0.9, 0.1]);
        assert_eq!(theta.row(0).to_vec(), [0.5, 0.5]);
    }

    #[test]
    fn pets_single_partition_summary() {
        let docs = [
            "the cat sat",
            "the dog sat",
            "the cat ran",
            "a dog ran",
            "a cat sat",
        ];
        let corpus = Tokenizer::new(StopWords::from_text("the\na"), 1).tokenize(&docs);
        assert_eq!(corpus.vocabulary.words(), ["cat", "dog", "ran", "sat"]);
        assert_eq!(corpus.occurrences, [3, 2, 2, 3]);

        let data = PartitionData {
            id: 0,
            docs: (0..corpus.num_docs()).collect(),
            words: corpus.words.clone(),
            doc_labels: corpus.doc_labels.clone(),
        };
        let mut state = PartitionState::new(data, corpus.vocabulary.len(), 2);
        let hyper = HyperSpec {
            alpha: 0.1,
            beta: 0.1,
        };
        Sampler::new(hyper, StdRng::seed_from_u64(0)).initialize(&mut state);
        assert_eq!(state.topic_counts().sum(), 10);

        let counts = GlobalCounts::from_word_topic(state.word_topic().clone());
        let phi = phi(&counts, hyper.beta);
        assert_eq!(phi.dim(), (2, 4));
        for row in phi.rows() {
            assert!((row.sum() - 1.).abs() < 1e-12);
        }

        let top = top_words(&phi, &corpus.vocabulary, 10);
        assert_eq!(top.len(), 2);
        assert!(top.iter().all(|t| t.len() == 4));
    }
}
