mod error;
mod handle;
mod shard;
mod store;

pub use error::{Result, StoreErr};
pub use handle::StoreHandle;
pub(super) use shard::CountShard;
pub use store::CountStore;
