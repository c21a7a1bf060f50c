mod error;
pub mod service;
pub mod storage;
pub mod synchronization;

pub use error::{Result, ServerErr};
pub use service::{ParameterServer, ServerOutcome};
