use std::{sync::Arc, time::Duration};

use comms::{
    OnoReceiver, OnoSender,
    msg::{Command, Msg, Payload},
    specs::ServerSpec,
};
use log::{debug, info, warn};
use ndarray::Array2;
use parking_lot::Mutex;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    task::JoinSet,
};
use topic_model::GlobalCounts;

use crate::{
    Result, ServerErr,
    storage::{CountStore, StoreHandle},
    synchronization::BarrierSync,
};

/// Everything the server knows once every partition is done.
#[derive(Debug)]
pub struct ServerOutcome {
    /// The final global word-topic and topic tables.
    pub counts: GlobalCounts,
    /// A `2 * rounds x partitions` matrix, row `2r` holds the likelihood before
    /// round `r` and row `2r + 1` the one after it.
    pub log_likelihood: Array2<f64>,
    /// Wall time of every synchronization step, the initial reduction first.
    pub round_times: Vec<Duration>,
}

/// The central synchronization structure, it owns one task per partition connection.
pub struct ParameterServer {
    tasks: JoinSet<Result<()>>,
    spec: ServerSpec,
    handle: StoreHandle,
    sync: BarrierSync,
    likelihood: Arc<Mutex<Array2<f64>>>,
}

impl ParameterServer {
    /// Creates a new `ParameterServer`.
    ///
    /// # Arguments
    /// * `spec` - The specification of the server.
    pub fn new(spec: ServerSpec) -> Self {
        let store = CountStore::new(spec.cells(), spec.shard_size);
        let rows = 2 * spec.rounds.get();

        Self {
            tasks: JoinSet::new(),
            handle: StoreHandle::new(store),
            sync: BarrierSync::new(spec.partitions.get()),
            likelihood: Arc::new(Mutex::new(Array2::from_elem(
                (rows, spec.partitions.get()),
                f64::NAN,
            ))),
            spec,
        }
    }

    /// Waits for every partition task to finish.
    ///
    /// The first failing task aborts the rest, there's no partial recovery.
    ///
    /// # Returns
    /// The final counts and diagnostics, or the first error found.
    pub async fn run(&mut self) -> Result<ServerOutcome> {
        while let Some(res) = self.tasks.join_next().await {
            if let Err(err) = res.map_err(ServerErr::from).and_then(|res| res) {
                warn!("aborting synchronization: {err}");
                self.tasks.abort_all();
                return Err(err);
            }
        }

        let counts = GlobalCounts::from_flat(
            self.spec.vocab_size,
            self.spec.topics.get(),
            self.handle.snapshot()?,
        )?;

        info!(tokens = counts.total(); "synchronization finished");

        Ok(ServerOutcome {
            counts,
            log_likelihood: self.likelihood.lock().clone(),
            round_times: self.sync.round_times(),
        })
    }

    /// Binds a new partition to this server and spawns its synchronization task.
    ///
    /// # Arguments
    /// * `partition` - The partition's id, its column in the likelihood matrix.
    /// * `rx` - The receiving end of the communication.
    /// * `tx` - The sending end of the communication.
    pub fn spawn<R, W>(&mut self, partition: usize, rx: OnoReceiver<R>, tx: OnoSender<W>)
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let link = Link {
            partition,
            cells: self.spec.cells(),
            rounds: self.spec.rounds.get(),
            correction: self.spec.partitions.get() as u32 - 1,
            handle: self.handle.clone(),
            sync: self.sync.clone(),
            likelihood: Arc::clone(&self.likelihood),
        };

        self.tasks.spawn(link.serve(rx, tx));
    }
}

/// The server side of a single partition connection.
struct Link {
    partition: usize,
    cells: usize,
    rounds: usize,
    correction: u32,
    handle: StoreHandle,
    sync: BarrierSync,
    likelihood: Arc<Mutex<Array2<f64>>>,
}

impl Link {
    async fn serve<R, W>(self, mut rx: OnoReceiver<R>, mut tx: OnoSender<W>) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut rx_buf = Vec::new();
        let mut global = vec![0; self.cells];

        // the reduction right after initialization has nothing to correct
        self.synchronize(&mut rx, &mut tx, &mut rx_buf, &mut global, 0)
            .await?;

        for round in 0..self.rounds {
            self.record_likelihood(&mut rx, &mut rx_buf, round).await?;
            self.synchronize(&mut rx, &mut tx, &mut rx_buf, &mut global, self.correction)
                .await?;
        }

        match rx.recv_into(&mut rx_buf).await? {
            Msg::Control(Command::Disconnect) => {
                debug!(partition = self.partition; "partition disconnected");
                Ok(())
            }
            msg => Err(self.unexpected("disconnect", msg)),
        }
    }

    async fn synchronize<R, W>(
        &self,
        rx: &mut OnoReceiver<R>,
        tx: &mut OnoSender<W>,
        rx_buf: &mut Vec<u32>,
        global: &mut [u32],
        correction: u32,
    ) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let local = match rx.recv_into(rx_buf).await? {
            Msg::Data(Payload::Counts(local)) => local,
            msg => return Err(self.unexpected("data/counts", msg)),
        };

        if let Err(err) = self.sync.step(&self.handle, local, global, correction).await {
            let reason = err.to_string();
            tx.send(&Msg::Err(reason.into())).await?;
            return Err(err.into());
        }

        tx.send(&Msg::Data(Payload::Counts(global))).await?;
        Ok(())
    }

    async fn record_likelihood<R>(
        &self,
        rx: &mut OnoReceiver<R>,
        rx_buf: &mut Vec<u32>,
        round: usize,
    ) -> Result<()>
    where
        R: AsyncRead + Unpin,
    {
        match rx.recv_into(rx_buf).await? {
            Msg::Control(Command::Likelihood {
                round: r,
                before,
                after,
            }) if r == round => {
                let mut likelihood = self.likelihood.lock();
                likelihood[[2 * round, self.partition]] = before;
                likelihood[[2 * round + 1, self.partition]] = after;
                Ok(())
            }
            msg => Err(self.unexpected("control/likelihood", msg)),
        }
    }

    fn unexpected(&self, expected: &'static str, msg: Msg) -> ServerErr {
        match msg {
            Msg::Err(reason) => ServerErr::PartitionAborted {
                partition: self.partition,
                reason: reason.into_owned(),
            },
            msg => ServerErr::UnexpectedMessage {
                partition: self.partition,
                expected,
                got: msg.kind().to_string(),
            },
        }
    }
}
