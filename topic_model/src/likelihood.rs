use std::f64::consts::{E, PI};

use ndarray::{ArrayView1, ArrayView2};

/// Above this point the exact gamma function overflows, Stirling takes over.
pub const STIRLING_THRESHOLD: f64 = 170.;

const LANCZOS_G: f64 = 7.;
const LANCZOS_COEFFS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Natural logarithm of the gamma function for `x > 0`.
///
/// Below `STIRLING_THRESHOLD` it's evaluated with the Lanczos approximation,
/// at or above it with `ln(sqrt(2pi(x - 1))) + (x - 1) ln((x - 1) / e)`.
pub fn ln_gamma(x: f64) -> f64 {
    if x >= STIRLING_THRESHOLD {
        let n = x - 1.;
        return (2. * PI * n).sqrt().ln() + n * (n / E).ln();
    }

    lanczos(x)
}

fn lanczos(x: f64) -> f64 {
    if x < 0.5 {
        // reflection
        return (PI / (PI * x).sin()).ln() - lanczos(1. - x);
    }

    let x = x - 1.;
    let t = x + LANCZOS_G + 0.5;
    let series = LANCZOS_COEFFS[1..]
        .iter()
        .enumerate()
        .fold(LANCZOS_COEFFS[0], |acc, (i, c)| acc + c / (x + i as f64 + 1.));

    0.5 * (2. * PI).ln() + (x + 0.5) * t.ln() - t + series.ln()
}

/// Collapsed LDA log marginal likelihood of the words given the topic labels.
///
/// # Arguments
/// * `word_topic` - The `vocab_size x topics` count table.
/// * `topic` - The per-topic totals, the column sums of `word_topic`.
/// * `beta` - The topic-word prior.
pub fn log_likelihood(word_topic: ArrayView2<u32>, topic: ArrayView1<u32>, beta: f64) -> f64 {
    let (vocab, topics) = word_topic.dim();
    if vocab == 0 {
        return 0.;
    }

    let v_beta = vocab as f64 * beta;
    let ln_beta = ln_gamma(beta);

    let prior = topics as f64 * (ln_gamma(v_beta) - vocab as f64 * ln_beta);
    let norm: f64 = topic.iter().map(|&c| ln_gamma(c as f64 + v_beta)).sum();

    // empty cells are by far the common case
    let cells: f64 = word_topic
        .iter()
        .map(|&c| if c == 0 { ln_beta } else { ln_gamma(c as f64 + beta) })
        .sum();

    prior - norm + cells
}

#[cfg(test)]
mod tests {
    use ndarray::{Array1, array};

    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn known_values() {
        assert!(close(ln_gamma(1.), 0., 1e-12));
        assert!(close(ln_gamma(2.), 0., 1e-12));
        assert!(close(ln_gamma(5.), 24f64.ln(), 1e-12));
        assert!(close(ln_gamma(0.5), PI.sqrt().ln(), 1e-12));
        assert!(close(ln_gamma(0.01), 4.599_479_878_042_022, 1e-9));
    }

    #[test]
    fn stirling_switch_is_continuous() {
        let below = ln_gamma(STIRLING_THRESHOLD - 1e-9);
        let above = ln_gamma(STIRLING_THRESHOLD);

        assert!(below.is_finite() && above.is_finite());
        assert!(close(above, lanczos(STIRLING_THRESHOLD), 1e-2));
        assert!(close(below, above, 1e-2));
    }

    #[test]
    fn large_arguments_stay_finite() {
        for x in [170., 1e3, 1e6, 1e9] {
            assert!(ln_gamma(x).is_finite());
        }
    }

    #[test]
    fn single_cell_likelihood_is_zero() {
        let word_topic = array![[7u32]];
        let topic = Array1::from(vec![7u32]);

        assert!(close(log_likelihood(word_topic.view(), topic.view(), 1.), 0., 1e-9));
    }

    #[test]
    fn two_words_one_topic() {
        let word_topic = array![[1u32], [0]];
        let topic = Array1::from(vec![1u32]);

        let ll = log_likelihood(word_topic.view(), topic.view(), 1.);
        assert!(close(ll, -(2f64.ln()), 1e-9));
    }

    #[test]
    fn empty_vocabulary() {
        let word_topic = ndarray::Array2::<u32>::zeros((0, 3));
        let topic = Array1::zeros(3);

        assert_eq!(log_likelihood(word_topic.view(), topic.view(), 0.01), 0.);
    }

    #[test]
    fn huge_counts_stay_finite() {
        let word_topic = array![[1_000_000u32, 3], [0, 2_500_000]];
        let topic = word_topic.sum_axis(ndarray::Axis(0));

        assert!(log_likelihood(word_topic.view(), topic.view(), 0.01).is_finite());
    }
}
