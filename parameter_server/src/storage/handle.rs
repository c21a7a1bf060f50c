use std::ops::Deref;

use tokio::task;

use super::{CountStore, Result};

/// The async interface to a `CountStore`.
///
/// It bridges the async runtime with the blocking, rayon backed store.
#[derive(Debug, Clone)]
pub struct StoreHandle(CountStore);

impl Deref for StoreHandle {
    type Target = CountStore;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl StoreHandle {
    pub fn new(store: CountStore) -> Self {
        Self(store)
    }

    /// Async call to `CountStore::accumulate`.
    pub async fn accumulate(&self, local: &[u32]) -> Result<()> {
        task::block_in_place(|| self.0.accumulate(local))
    }

    /// Async call to `CountStore::reconcile`.
    pub async fn reconcile(&self, correction: u32) -> Result<()> {
        task::block_in_place(|| self.0.reconcile(correction))
    }

    /// Async call to `CountStore::pull`.
    pub async fn pull(&self, out: &mut [u32]) -> Result<()> {
        task::block_in_place(|| self.0.pull(out))
    }
}
