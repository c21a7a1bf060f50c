mod adapter;
mod lda;

pub use adapter::Adapter;
pub use lda::{LdaConfig, PartitioningConfig};
