pub mod builder;
pub mod config;
pub mod error;
pub mod metrics;
pub mod worker;

pub use builder::WorkerBuilder;
pub use config::WorkerConfig;
pub use error::{Result, WorkerErr};
pub use metrics::WorkerMetrics;
pub use worker::{PartitionOutcome, PartitionWorker};
