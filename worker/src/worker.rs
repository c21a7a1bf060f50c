use std::time::Instant;

use comms::{
    OnoReceiver, OnoSender,
    msg::{Command, Msg, Payload},
    specs::HyperSpec,
};
use log::{debug, info, warn};
use ndarray::Array2;
use rand::Rng;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    task,
};
use topic_model::{PartitionState, Sampler};

use crate::{Result, WorkerConfig, WorkerErr, WorkerMetrics};

/// What a partition hands back once every round is done.
#[derive(Debug)]
pub struct PartitionOutcome {
    pub partition: usize,
    /// Corpus level ids of the partition's documents.
    pub docs: Vec<usize>,
    /// Document-topic proportions, one row per entry of `docs`.
    pub theta: Array2<f64>,
    /// Log-likelihood before and after every round.
    pub log_likelihood: Vec<(f64, f64)>,
    pub metrics: WorkerMetrics,
}

/// Runs the collapsed Gibbs sampler over one partition and keeps it in sync
/// with the rest through the server.
///
/// Every round is a local pass, a report of the local word-topic table and the
/// wait for the reconciled broadcast.
pub struct PartitionWorker<R: Rng> {
    cfg: WorkerConfig,
    state: PartitionState,
    sampler: Sampler<R>,
    metrics: WorkerMetrics,
}

impl<R: Rng + Send + 'static> PartitionWorker<R> {
    /// Creates a new `PartitionWorker`.
    ///
    /// # Args
    /// * `cfg` - Execution bounds.
    /// * `state` - The partition's tokens with zeroed counters.
    /// * `sampler` - The sampler to drive the partition with.
    pub fn new(cfg: WorkerConfig, state: PartitionState, sampler: Sampler<R>) -> Self {
        Self {
            cfg,
            state,
            sampler,
            metrics: WorkerMetrics::default(),
        }
    }

    /// Runs initialization and every round against the server.
    ///
    /// Sampling runs on tokio's blocking pool. Any local failure is reported to
    /// the server before returning, so the whole job stops.
    ///
    /// # Args
    /// * `rx` - Receiving end of the server channel.
    /// * `tx` - Sending end of the server channel.
    ///
    /// # Returns
    /// The partition's outcome on graceful completion.
    ///
    /// # Errors
    /// Returns `WorkerErr` on I/O failures, consistency violations or protocol violations.
    pub async fn run<Rd, Wr>(
        self,
        mut rx: OnoReceiver<Rd>,
        mut tx: OnoSender<Wr>,
    ) -> Result<PartitionOutcome>
    where
        Rd: AsyncRead + Unpin + Send,
        Wr: AsyncWrite + Unpin + Send,
    {
        let partition = self.cfg.partition();
        let HyperSpec { alpha, beta } = self.sampler.hyper();
        let mut rx_buf = Vec::new();
        let mut log_likelihood = Vec::with_capacity(self.cfg.rounds());

        let (mut worker, ()) = self
            .offload(|state, sampler| {
                sampler.initialize(state);
                Ok(())
            })
            .await?;
        info!(partition = partition, tokens = worker.state.len(); "partition initialized");

        worker.synchronize(&mut rx, &mut tx, &mut rx_buf, 0).await?;

        for round in 0..worker.cfg.rounds() {
            let res = worker
                .offload(move |state, sampler| {
                    let before = state.log_likelihood(beta);
                    let moved = sampler.resample_pass(state)?;
                    Ok((before, moved, state.log_likelihood(beta)))
                })
                .await;

            let (next, (before, moved, after)) = match res {
                Ok(res) => res,
                Err(err) => {
                    tx.send(&Msg::Err(err.to_string().into())).await?;
                    return Err(err);
                }
            };
            worker = next;
            worker.metrics.add_moved(moved);

            debug!(
                partition = partition, round = round, moved = moved, before = before, after = after;
                "finished local pass"
            );
            log_likelihood.push((before, after));

            let msg = Msg::Control(Command::Likelihood {
                round,
                before,
                after,
            });
            tx.send(&msg).await?;

            worker.synchronize(&mut rx, &mut tx, &mut rx_buf, round).await?;
            worker.metrics.bump_round();
        }

        tx.send(&Msg::Control(Command::Disconnect)).await?;
        info!(partition = partition, moved = worker.metrics.moved; "partition finished");

        Ok(PartitionOutcome {
            partition,
            theta: worker.state.theta(alpha),
            docs: worker.state.docs().to_vec(),
            log_likelihood,
            metrics: worker.metrics,
        })
    }

    /// Runs `f` over the state and sampler on tokio's blocking pool.
    ///
    /// Both are moved out and handed back once the blocking task joins.
    async fn offload<T, F>(self, f: F) -> Result<(Self, T)>
    where
        F: FnOnce(&mut PartitionState, &mut Sampler<R>) -> topic_model::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let Self {
            cfg,
            mut state,
            mut sampler,
            mut metrics,
        } = self;
        let start = Instant::now();

        let (state, sampler, res) = task::spawn_blocking(move || {
            let res = f(&mut state, &mut sampler);
            (state, sampler, res)
        })
        .await?;

        metrics.compute_time += start.elapsed();
        let out = res?;

        let worker = Self {
            cfg,
            state,
            sampler,
            metrics,
        };
        Ok((worker, out))
    }

    /// Sends the local table and applies the broadcast that comes back.
    async fn synchronize<Rd, Wr>(
        &mut self,
        rx: &mut OnoReceiver<Rd>,
        tx: &mut OnoSender<Wr>,
        rx_buf: &mut Vec<u32>,
        round: usize,
    ) -> Result<()>
    where
        Rd: AsyncRead + Unpin + Send,
        Wr: AsyncWrite + Unpin + Send,
    {
        let start = Instant::now();
        tx.send(&Msg::Data(Payload::Counts(self.state.word_topic_flat())))
            .await?;
        self.metrics.send_time += start.elapsed();

        let start = Instant::now();
        let msg = rx.recv_into(rx_buf).await?;
        self.metrics.recv_time += start.elapsed();

        let global = match msg {
            Msg::Data(Payload::Counts(global)) => global,
            Msg::Err(reason) => {
                warn!(partition = self.cfg.partition(), round = round; "server aborted the job");
                return Err(WorkerErr::Aborted {
                    round,
                    reason: reason.into_owned(),
                });
            }
            other => {
                return Err(WorkerErr::UnexpectedMessage {
                    round,
                    got: other.kind(),
                });
            }
        };

        let expected = self.state.word_topic_flat().len();
        if global.len() != expected {
            return Err(WorkerErr::CountsLengthMismatch {
                round,
                got: global.len(),
                expected,
            });
        }

        let checked = self.state.apply_broadcast(global).and_then(|()| {
            if self.cfg.verify_counts() {
                self.state.check_consistency()?;
                self.state.verify_against_labels()?;
            }
            Ok(())
        });

        if let Err(err) = checked {
            let err = WorkerErr::from(err);
            tx.send(&Msg::Err(err.to_string().into())).await?;
            return Err(err);
        }

        Ok(())
    }
}
