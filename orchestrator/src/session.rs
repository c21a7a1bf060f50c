use comms::specs::{SamplerSpec, ServerSpec};
use log::{debug, error};
use parameter_server::{ParameterServer, ServerErr, ServerOutcome, storage::StoreErr};
use tokio::{io, runtime::Runtime, task::JoinSet};
use topic_model::{ModelErr, corpus::PartitionData};
use worker::{PartitionOutcome, WorkerBuilder, WorkerErr};

use crate::error::OrchestratorError;

/// Capacity of every in-memory partition link, big enough for a few frames.
const LINK_CAPACITY: usize = 1 << 16;

/// Owns the runtime one LDA job runs on.
///
/// Every partition talks to the server through its own in-memory duplex link,
/// exactly like it would through a socket.
pub struct Session {
    runtime: Runtime,
}

impl Session {
    /// Creates a new `Session` backed by a multi-threaded runtime.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            runtime: Runtime::new()?,
        })
    }

    /// Runs the server and every partition until all of them finish.
    ///
    /// # Arguments
    /// * `server_spec` - The specification of the synchronization server.
    /// * `partitions` - Every partition's spec along with its tokens.
    ///
    /// # Returns
    /// The server's outcome and the partitions' outcomes ordered by partition id,
    /// or the most descriptive error if anything failed.
    pub fn run(
        self,
        server_spec: ServerSpec,
        partitions: Vec<(SamplerSpec, PartitionData)>,
    ) -> Result<(ServerOutcome, Vec<PartitionOutcome>), OrchestratorError> {
        self.runtime.block_on(async move {
            let mut server = ParameterServer::new(server_spec);
            let mut workers = JoinSet::new();

            for (spec, data) in partitions {
                let partition = spec.partition;
                let worker = WorkerBuilder::build(spec, data).map_err(|e| match e {
                    WorkerErr::Model(ModelErr::Configuration(msg)) => {
                        OrchestratorError::InvalidConfig(msg)
                    }
                    other => OrchestratorError::PartitionFailed {
                        partition,
                        msg: other.to_string(),
                    },
                })?;

                let (sv_stream, wk_stream) = io::duplex(LINK_CAPACITY);
                let (sv_rx, sv_tx) = io::split(sv_stream);
                let (sv_rx, sv_tx) = comms::channel(sv_rx, sv_tx);
                server.spawn(partition, sv_rx, sv_tx);

                let (wk_rx, wk_tx) = io::split(wk_stream);
                let (wk_rx, wk_tx) = comms::channel(wk_rx, wk_tx);
                workers.spawn(async move { (partition, worker.run(wk_rx, wk_tx).await) });

                debug!(partition = partition; "partition spawned");
            }

            let collect = async {
                let mut outcomes = Vec::new();
                while let Some(joined) = workers.join_next().await {
                    outcomes.push(joined);
                }
                outcomes
            };

            let (server, joined) = tokio::join!(server.run(), collect);

            let mut outcomes = Vec::with_capacity(joined.len());
            let mut failures = Vec::new();
            for res in joined {
                match res {
                    Ok((_, Ok(outcome))) => outcomes.push(outcome),
                    Ok((partition, Err(err))) => failures.push((partition, err)),
                    Err(join) => return Err(OrchestratorError::ServerError(join.to_string())),
                }
            }

            match server {
                Ok(server) if failures.is_empty() => {
                    outcomes.sort_by_key(|o| o.partition);
                    Ok((server, outcomes))
                }
                server => Err(classify(server.err(), failures)),
            }
        })
    }
}

/// Picks the error that best explains a failed job.
///
/// A consistency violation beats any other failure since every other partition
/// only fails as a consequence of it.
fn classify(server: Option<ServerErr>, failures: Vec<(usize, WorkerErr)>) -> OrchestratorError {
    for (partition, err) in &failures {
        error!(partition = *partition; "partition failed: {err}");
    }
    if let Some(err) = &server {
        error!("server failed: {err}");
    }

    let local = failures
        .iter()
        .find(|(_, err)| matches!(err, WorkerErr::Model(ModelErr::ConsistencyViolation { .. })));
    if let Some((partition, err)) = local {
        return OrchestratorError::ConsistencyViolation(format!("partition {partition}: {err}"));
    }

    match server {
        Some(err @ ServerErr::Store(StoreErr::NegativeCount { .. })) => {
            OrchestratorError::ConsistencyViolation(err.to_string())
        }
        Some(err) if failures.is_empty() => OrchestratorError::ServerError(err.to_string()),
        server => {
            // the partition that failed on its own, not the ones told to stop
            let own = failures
                .iter()
                .position(|(_, err)| !matches!(err, WorkerErr::Aborted { .. } | WorkerErr::Io(_)))
                .unwrap_or(0);

            match failures.into_iter().nth(own) {
                Some((partition, err)) => OrchestratorError::PartitionFailed {
                    partition,
                    msg: err.to_string(),
                },
                None => OrchestratorError::ServerError(
                    server.map(|e| e.to_string()).unwrap_or_default(),
                ),
            }
        }
    }
}
