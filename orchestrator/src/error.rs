use std::fmt;

/// All errors that can occur in the orchestrator.
#[derive(Debug)]
pub enum OrchestratorError {
    /// Invalid configuration, caught before any partition starts.
    InvalidConfig(String),
    /// A counter went negative, either locally or while reconciling.
    ConsistencyViolation(String),
    /// A partition produced an unrecoverable error.
    PartitionFailed { partition: usize, msg: String },
    /// The synchronization server produced an unrecoverable error.
    ServerError(String),
    /// An underlying I/O error not covered by the above variants.
    Io(std::io::Error),
}

impl fmt::Display for OrchestratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::ConsistencyViolation(msg) => write!(f, "{msg}"),
            Self::PartitionFailed { partition, msg } => {
                write!(f, "partition {partition} error: {msg}")
            }
            Self::ServerError(msg) => write!(f, "server error: {msg}"),
            Self::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::error::Error for OrchestratorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for OrchestratorError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
