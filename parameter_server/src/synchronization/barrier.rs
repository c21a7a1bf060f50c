use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use log::{error, info};
use parking_lot::Mutex;
use tokio::sync::Barrier;

use crate::storage::{Result, StoreHandle};

/// Runs the reduce, correct and broadcast step across every partition connection.
///
/// Each connection accumulates its partition's table and waits. The leader then
/// reconciles the store, and once everybody passes the second wait they pull the
/// same global table.
#[derive(Debug, Clone)]
pub struct BarrierSync {
    barrier: Arc<Barrier>,
    clock: Arc<Mutex<RoundClock>>,
}

#[derive(Debug)]
struct RoundClock {
    last: Instant,
    rounds: Vec<Duration>,
}

impl BarrierSync {
    /// Creates a new `BarrierSync` synchronizer.
    ///
    /// # Arguments
    /// * `barrier_size` - The amount of partitions to wait on before reconciling.
    pub fn new(barrier_size: usize) -> Self {
        Self {
            barrier: Arc::new(Barrier::new(barrier_size)),
            clock: Arc::new(Mutex::new(RoundClock {
                last: Instant::now(),
                rounds: Vec::new(),
            })),
        }
    }

    /// Synchronizes one partition's local table with the rest.
    ///
    /// # Arguments
    /// * `handle` - The store holding the global table.
    /// * `local` - This partition's local word-topic table.
    /// * `out` - Where the new global table will be written to.
    /// * `correction` - The multiplier of the previous global table to subtract.
    ///
    /// # Returns
    /// A `StoreErr` if the sizes don't match or the reconciliation failed.
    pub async fn step(
        &self,
        handle: &StoreHandle,
        local: &[u32],
        out: &mut [u32],
        correction: u32,
    ) -> Result<()> {
        handle.accumulate(local).await?;

        if self.barrier.wait().await.is_leader() {
            match handle.reconcile(correction).await {
                Ok(()) => self.tick(),
                Err(err) => error!("leader failed to reconcile: {err}"),
            }
        }

        self.barrier.wait().await;
        handle.pull(out).await
    }

    /// Wall time of every reconciled step, the initial reduction included.
    pub fn round_times(&self) -> Vec<Duration> {
        self.clock.lock().rounds.clone()
    }

    fn tick(&self) {
        let mut clock = self.clock.lock();
        let now = Instant::now();
        let elapsed = now - clock.last;

        clock.last = now;
        clock.rounds.push(elapsed);

        info!(
            step = clock.rounds.len() - 1, millis = elapsed.as_millis() as u64;
            "global counts reconciled"
        );
    }
}
