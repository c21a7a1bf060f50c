use comms::specs::HyperSpec;
use log::debug;
use rand::Rng;

use crate::{PartitionState, Result};

/// Picks a bin from unnormalized `weights` given a uniform draw `u` in `[0, 1)`.
///
/// The weights are normalized and the chosen index is the amount of cumulative
/// bins strictly below `u`. A draw equal to a cumulative boundary therefore stays
/// in the bin that the boundary closes. Rounding that leaves the last cumulative
/// value below `u` is clamped into the last bin.
pub fn inverse_cdf(weights: &[f64], u: f64) -> usize {
    let total: f64 = weights.iter().sum();
    let mut cumulative = 0.;

    let below = weights
        .iter()
        .take_while(|&&w| {
            cumulative += w / total;
            cumulative < u
        })
        .count();

    below.min(weights.len().saturating_sub(1))
}

/// Collapsed Gibbs sampler operating on a single `PartitionState`.
///
/// Every draw comes from the injected random number generator, so a seeded
/// generator gives a reproducible trajectory.
pub struct Sampler<R: Rng> {
    hyper: HyperSpec,
    rng: R,
    weights: Vec<f64>,
}

impl<R: Rng> Sampler<R> {
    /// Creates a new `Sampler`.
    ///
    /// # Arguments
    /// * `hyper` - The Dirichlet priors.
    /// * `rng` - A random number generator.
    pub fn new(hyper: HyperSpec, rng: R) -> Self {
        Self {
            hyper,
            rng,
            weights: Vec::new(),
        }
    }

    #[inline]
    pub fn hyper(&self) -> HyperSpec {
        self.hyper
    }

    /// Draws an initial topic for every token, sequentially in token order.
    ///
    /// Each draw is conditioned on the tokens initialized before it. `state` is
    /// expected to hold zeroed counters.
    pub fn initialize(&mut self, state: &mut PartitionState) {
        for i in 0..state.len() {
            self.fill_weights(state, i, None);
            let topic = self.draw();

            state.topic_labels[i] = topic;
            state.assign(i, topic);
        }

        debug!(partition = state.id(), tokens = state.len(); "initialized topic labels");
    }

    /// Visits every token exactly once, in index order, and resamples its topic.
    ///
    /// # Returns
    /// The amount of tokens whose topic changed, or a `ConsistencyViolation`.
    pub fn resample_pass(&mut self, state: &mut PartitionState) -> Result<usize> {
        let mut moved = 0;

        for i in 0..state.len() {
            let current = state.topic_labels[i];
            if self.resample_token(state, i)? != current {
                moved += 1;
            }
        }

        debug!(partition = state.id(), moved = moved; "finished resample pass");
        Ok(moved)
    }

    /// Resamples the topic of token `i` from its full conditional.
    ///
    /// The current topic is weighted with leave-one-out counts, every other topic
    /// with the counts as they are.
    ///
    /// # Returns
    /// The new topic, or a `ConsistencyViolation` if the token isn't accounted for
    /// in the counters of its current topic.
    pub fn resample_token(&mut self, state: &mut PartitionState, i: usize) -> Result<usize> {
        let current = state.topic_labels[i];
        state.check_owned(i, current)?;

        self.fill_weights(state, i, Some(current));
        let topic = self.draw();

        move_token(state, i, current, topic)?;
        Ok(topic)
    }

    fn fill_weights(&mut self, state: &PartitionState, i: usize, current: Option<usize>) {
        let HyperSpec { alpha, beta } = self.hyper;
        let (w, d) = (state.words[i], state.doc_labels[i]);
        let vocab = state.vocab_size() as f64;
        let topics = state.topics() as f64;
        let doc_len = state.doc[d] as f64;

        self.weights.clear();
        self.weights.extend((0..state.topics()).map(|k| {
            let own = if current == Some(k) { 1. } else { 0. };

            let word = (state.word_topic[[w, k]] as f64 - own + beta)
                / (state.topic[k] as f64 - own + vocab * beta);
            let doc = (state.doc_topic[[d, k]] as f64 - own + alpha)
                / (doc_len - own + topics * alpha);

            word * doc
        }));
    }

    fn draw(&mut self) -> usize {
        let u: f64 = self.rng.random();
        inverse_cdf(&self.weights, u)
    }
}

/// Moves token `i` from topic `from` to topic `to`.
///
/// Counters are only touched when the topic actually changes, the label is
/// always written.
pub(crate) fn move_token(
    state: &mut PartitionState,
    i: usize,
    from: usize,
    to: usize,
) -> Result<()> {
    if from != to {
        state.unassign(i, from)?;
        state.assign(i, to);
    }

    state.topic_labels[i] = to;
    Ok(())
}
