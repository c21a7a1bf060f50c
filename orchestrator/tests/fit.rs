use orchestrator::{
    OrchestratorError, fit,
    configs::{LdaConfig, PartitioningConfig},
};
use topic_model::corpus::{StopWords, Tokenizer};

const PETS: [&str; 5] = [
    "the cat sat",
    "the dog sat",
    "the cat ran",
    "a dog ran",
    "a cat sat",
];

fn pets_config() -> LdaConfig {
    LdaConfig {
        topics: 2,
        partitions: 1,
        iterations: 1,
        alpha: 0.1,
        beta: 0.1,
        min_doc_freq: 1,
        seed: Some(3),
        ..Default::default()
    }
}

/// Two clearly separated themes, repeated enough to survive filtering.
fn themed_corpus() -> Vec<String> {
    let animals = ["cat dog bird", "dog fish cat", "bird cat fish", "fish dog bird"];
    let finance = ["bank loan rate", "rate stock bank", "loan stock rate", "stock bank loan"];

    (0..10)
        .flat_map(|i| [animals[i % 4], finance[(i + 1) % 4]])
        .enumerate()
        .map(|(i, doc)| format!("{doc} the{}", if i % 3 == 0 { "." } else { "" }))
        .collect()
}

fn assert_row_stochastic(m: &ndarray::Array2<f64>) {
    for row in m.rows() {
        assert!((row.sum() - 1.).abs() < 1e-9, "row sums to {}", row.sum());
    }
}

#[test]
fn pets_end_to_end() {
    let _ = env_logger::builder().is_test(true).try_init();

    let output = fit(&PETS, StopWords::from_text("the\na"), &pets_config()).unwrap();

    assert_eq!(output.vocabulary.words(), ["cat", "dog", "ran", "sat"]);
    assert_eq!(output.tokens, 10);
    assert_eq!(output.counts.total(), 10);
    assert_eq!(output.counts.word_totals().to_vec(), [3, 2, 2, 3]);

    assert_eq!(output.phi.dim(), (2, 4));
    assert_row_stochastic(&output.phi);
    assert_eq!(output.theta.dim(), (5, 2));
    assert_row_stochastic(&output.theta);

    assert_eq!(output.log_likelihood.dim(), (2, 1));
    assert!(output.log_likelihood.iter().all(|v| v.is_finite()));
    assert_eq!(output.top_words.len(), 2);
    assert!(output.top_words.iter().all(|t| t.len() == 4));
    assert_eq!(output.round_times.len(), 2);
}

#[test]
fn many_partitions_keep_every_invariant() {
    let docs = themed_corpus();
    let config = LdaConfig {
        topics: 2,
        partitions: 3,
        iterations: 8,
        alpha: 0.1,
        beta: 0.01,
        min_doc_freq: 2,
        seed: Some(11),
        shard_size: 3,
        verify_counts: true,
        ..Default::default()
    };

    let output = fit(&docs, StopWords::from_text("the"), &config).unwrap();

    assert_eq!(output.vocabulary.len(), 8);
    assert_eq!(output.tokens, 60);
    assert_eq!(output.counts.word_totals().iter().sum::<u32>(), 60);
    assert_eq!(output.log_likelihood.dim(), (16, 3));
    assert!(output.log_likelihood.iter().all(|v| v.is_finite()));
    assert_row_stochastic(&output.phi);
    assert_row_stochastic(&output.theta);
}

#[test]
fn word_totals_match_occurrences_after_every_round_count() {
    let docs = themed_corpus();
    let occurrences = Tokenizer::new(StopWords::from_text("the"), 1)
        .tokenize(&docs)
        .occurrences;

    for partitioning in [PartitioningConfig::Contiguous, PartitioningConfig::ByLength] {
        for partitions in [1, 2, 3, 7, 16] {
            for iterations in 1..=4 {
                let config = LdaConfig {
                    topics: 3,
                    partitions,
                    iterations,
                    min_doc_freq: 1,
                    seed: Some(partitions as u64 * 31 + iterations as u64),
                    partitioning,
                    shard_size: 7,
                    verify_counts: true,
                    ..Default::default()
                };

                let output = fit(&docs, StopWords::from_text("the"), &config).unwrap();
                let totals: Vec<usize> =
                    output.counts.word_totals().iter().map(|&t| t as usize).collect();

                assert_eq!(
                    totals, occurrences,
                    "{partitioning:?} with {partitions} partitions after {iterations} rounds"
                );
            }
        }
    }
}

#[test]
fn by_length_partitioning() {
    let docs = themed_corpus();
    let config = LdaConfig {
        topics: 3,
        partitions: 4,
        iterations: 3,
        min_doc_freq: 1,
        seed: Some(5),
        partitioning: PartitioningConfig::ByLength,
        verify_counts: true,
        ..Default::default()
    };

    let output = fit(&docs, StopWords::default(), &config).unwrap();
    assert_eq!(output.counts.total() as usize, output.tokens);
    assert_eq!(output.theta.nrows(), docs.len());
}

#[test]
fn same_seed_same_model() {
    let docs = themed_corpus();
    let config = LdaConfig {
        topics: 2,
        partitions: 2,
        iterations: 5,
        min_doc_freq: 1,
        seed: Some(99),
        ..Default::default()
    };

    let a = fit(&docs, StopWords::default(), &config).unwrap();
    let b = fit(&docs, StopWords::default(), &config).unwrap();

    assert_eq!(a.counts, b.counts);
    assert_eq!(a.log_likelihood, b.log_likelihood);
}

#[test]
fn more_partitions_than_documents() {
    let config = LdaConfig {
        partitions: 8,
        ..pets_config()
    };

    let output = fit(&PETS, StopWords::from_text("the a"), &config).unwrap();
    assert_eq!(output.counts.total(), 10);
    assert_eq!(output.log_likelihood.dim(), (2, 8));
}

#[test]
fn empty_corpus_is_not_an_error() {
    let docs: [&str; 2] = ["", "   "];
    let output = fit(&docs, StopWords::default(), &pets_config()).unwrap();

    assert_eq!(output.tokens, 0);
    assert!(output.vocabulary.is_empty());
    assert_eq!(output.theta.row(0).to_vec(), [0.5, 0.5]);
}

#[test]
fn invalid_config_never_starts() {
    let config = LdaConfig {
        topics: 0,
        ..pets_config()
    };

    let err = fit(&PETS, StopWords::default(), &config).unwrap_err();
    assert!(matches!(err, OrchestratorError::InvalidConfig(_)));
}
