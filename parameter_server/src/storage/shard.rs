use parking_lot::{Mutex, RwLock};

use super::{Result, StoreErr};

/// A contiguous slice of the word-topic table.
///
/// Local tables are summed into `acc` while the previous global state stays
/// readable in `global` until the leader reconciles.
#[derive(Debug)]
pub struct CountShard {
    cells: usize,
    acc: Mutex<Box<[i64]>>,
    global: RwLock<Box<[u32]>>,
}

impl CountShard {
    /// Creates a new zeroed `CountShard` of `cells` cells.
    pub fn new(cells: usize) -> Self {
        Self {
            cells,
            acc: Mutex::new(vec![0; cells].into_boxed_slice()),
            global: RwLock::new(vec![0; cells].into_boxed_slice()),
        }
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

    /// Adds a partition's local counts into the accumulator.
    pub fn accumulate(&self, local: &[u32]) -> Result<()> {
        self.check_len(local.len())?;
        let mut acc = self.acc.lock();

        acc.iter_mut()
            .zip(local)
            .for_each(|(acc, &c)| *acc += c as i64);

        Ok(())
    }

    /// Replaces the global counts with `acc - correction * global` and clears the accumulator.
    ///
    /// # Returns
    /// The shard local index and value of the first negative cell. Nothing is
    /// written in that case.
    pub fn reconcile(&self, correction: u32) -> Result<()> {
        let mut acc = self.acc.lock();
        let mut global = self.global.write();
        let correction = correction as i64;

        for (cell, (&sum, &prev)) in acc.iter().zip(global.iter()).enumerate() {
            let value = sum - correction * prev as i64;
            if value < 0 {
                return Err(StoreErr::NegativeCount { cell, value });
            }
        }

        global
            .iter_mut()
            .zip(acc.iter())
            .for_each(|(g, &sum)| *g = (sum - correction * *g as i64) as u32);

        acc.fill(0);
        Ok(())
    }

    /// Copies the global counts into `out`.
    pub fn pull(&self, out: &mut [u32]) -> Result<()> {
        self.check_len(out.len())?;
        out.copy_from_slice(&self.global.read());
        Ok(())
    }
}
