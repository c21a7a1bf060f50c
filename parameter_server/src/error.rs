use std::{
    error::Error,
    fmt::{self, Display},
    io,
};

use tokio::task::JoinError;
use topic_model::ModelErr;

use crate::storage::StoreErr;

/// The result type of the parameter server.
pub type Result<T> = std::result::Result<T, ServerErr>;

/// Errors that end the synchronization of the whole job.
#[derive(Debug)]
pub enum ServerErr {
    Io(io::Error),
    Store(StoreErr),
    /// The final table couldn't be turned into `GlobalCounts`.
    Model(ModelErr),
    /// A partition sent something out of protocol.
    UnexpectedMessage {
        partition: usize,
        expected: &'static str,
        got: String,
    },
    /// A partition reported a failure of its own.
    PartitionAborted { partition: usize, reason: String },
    Join(JoinError),
}

impl Display for ServerErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerErr::Io(e) => write!(f, "io error: {e}"),
            ServerErr::Store(e) => write!(f, "{e}"),
            ServerErr::Model(e) => write!(f, "{e}"),
            ServerErr::UnexpectedMessage {
                partition,
                expected,
                got,
            } => write!(
                f,
                "partition {partition} sent an unexpected message, \
                 expected {expected} and got {got}"
            ),
            ServerErr::PartitionAborted { partition, reason } => {
                write!(f, "partition {partition} aborted: {reason}")
            }
            ServerErr::Join(e) => write!(f, "server task failed: {e}"),
        }
    }
}

impl Error for ServerErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ServerErr::Io(e) => Some(e),
            ServerErr::Store(e) => Some(e),
            ServerErr::Model(e) => Some(e),
            ServerErr::Join(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ServerErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<StoreErr> for ServerErr {
    fn from(value: StoreErr) -> Self {
        Self::Store(value)
    }
}

impl From<ModelErr> for ServerErr {
    fn from(value: ModelErr) -> Self {
        Self::Model(value)
    }
}

impl From<JoinError> for ServerErr {
    fn from(value: JoinError) -> Self {
        Self::Join(value)
    }
}
