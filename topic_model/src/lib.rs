pub mod corpus;
pub mod counts;
pub mod error;
pub mod likelihood;
pub mod sampler;
pub mod state;
pub mod summary;

pub use counts::GlobalCounts;
pub use error::{ModelErr, Result};
pub use sampler::Sampler;
pub use state::PartitionState;
