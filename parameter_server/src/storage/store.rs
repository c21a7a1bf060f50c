use std::{num::NonZeroUsize, sync::Arc};

use log::{debug, error};
use parking_lot::Mutex;
use rayon::prelude::*;

use super::{CountShard, Result, StoreErr};

/// The sharded home of the global word-topic table.
///
/// Clones share the same shards, every partition connection holds one.
#[derive(Debug, Clone)]
pub struct CountStore {
    cells: usize,
    shard_size: NonZeroUsize,
    shards: Arc<[CountShard]>,
    failure: Arc<Mutex<Option<StoreErr>>>,
}

impl CountStore {
    /// Creates a new zeroed `CountStore`.
    ///
    /// # Arguments
    /// * `cells` - Size of the flattened word-topic table.
    /// * `shard_size` - The maximum amount of cells per shard.
    pub fn new(cells: usize, shard_size: NonZeroUsize) -> Self {
        let size = shard_size.get();
        let shards: Vec<_> = (0..cells.div_ceil(size))
            .map(|i| CountShard::new(size.min(cells - i * size)))
            .collect();

        Self {
            cells,
            shard_size,
            shards: Arc::from(shards),
            failure: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the amount of cells in the table.
    pub fn len(&self) -> usize {
        self.cells
    }

    pub fn is_empty(&self) -> bool {
        self.cells == 0
    }

    fn check_len(&self, len: usize) -> Result<()> {
        if len != self.cells {
            return Err(StoreErr::SizeMismatch {
                got: len,
                expected: self.cells,
            });
        }

        Ok(())
    }

    /// Adds a partition's local word-topic table into the accumulator.
    ///
    /// # Arguments
    /// * `local` - A flattened row-major table.
    pub fn accumulate(&self, local: &[u32]) -> Result<()> {
        self.check_len(local.len())?;

        self.shards
            .par_iter()
            .zip(local.par_chunks(self.shard_size.get()))
            .try_for_each(|(shard, chunk)| shard.accumulate(chunk))
    }

    /// Turns the accumulated tables into the new global table.
    ///
    /// Every cell becomes `sum - correction * previous`, where `correction` is
    /// zero for the reduction right after initialization and `partitions - 1`
    /// afterwards, since every partition started its pass from the same table.
    ///
    /// A negative cell poisons the store, later pulls keep failing with it.
    pub fn reconcile(&self, correction: u32) -> Result<()> {
        let size = self.shard_size.get();

        let res = self
            .shards
            .par_iter()
            .enumerate()
            .try_for_each(|(i, shard)| {
                shard.reconcile(correction).map_err(|err| match err {
                    StoreErr::NegativeCount { cell, value } => StoreErr::NegativeCount {
                        cell: i * size + cell,
                        value,
                    },
                    other => other,
                })
            });

        match res {
            Ok(()) => debug!(correction = correction; "reconciled global counts"),
            Err(err) => {
                error!("failed to reconcile global counts: {err}");
                self.failure.lock().get_or_insert(err);
            }
        }

        res
    }

    /// Copies the global table into `out`.
    ///
    /// # Returns
    /// The poisoning error if a reconciliation failed, or a `SizeMismatch`.
    pub fn pull(&self, out: &mut [u32]) -> Result<()> {
        if let Some(err) = *self.failure.lock() {
            return Err(err);
        }
        self.check_len(out.len())?;

        self.shards
            .par_iter()
            .zip(out.par_chunks_mut(self.shard_size.get()))
            .try_for_each(|(shard, chunk)| shard.pull(chunk))
    }

    /// Returns a copy of the whole global table.
    pub fn snapshot(&self) -> Result<Vec<u32>> {
        let mut out = vec![0; self.cells];
        self.pull(&mut out)?;
        Ok(out)
    }
}
