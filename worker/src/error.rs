use std::{error::Error, fmt, io};

use tokio::task::JoinError;
use topic_model::ModelErr;

/// The worker module's result type.
pub type Result<T> = std::result::Result<T, WorkerErr>;

/// Partition worker failures.
#[derive(Debug)]
pub enum WorkerErr {
    Io(io::Error),
    /// The sampler or a counter check failed.
    Model(ModelErr),
    UnexpectedMessage {
        round: usize,
        got: &'static str,
    },
    CountsLengthMismatch {
        round: usize,
        got: usize,
        expected: usize,
    },
    /// The server gave up on the job.
    Aborted {
        round: usize,
        reason: String,
    },
    Join(JoinError),
}

impl fmt::Display for WorkerErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerErr::Io(e) => write!(f, "io error: {e}"),
            WorkerErr::Model(e) => write!(f, "{e}"),
            WorkerErr::UnexpectedMessage { round, got } => {
                write!(f, "unexpected message at round {round}: got {got}")
            }
            WorkerErr::CountsLengthMismatch {
                round,
                got,
                expected,
            } => write!(
                f,
                "counts length mismatch at round {round}: got {got}, expected {expected}"
            ),
            WorkerErr::Aborted { round, reason } => {
                write!(f, "server aborted at round {round}: {reason}")
            }
            WorkerErr::Join(e) => write!(f, "sampling task failed: {e}"),
        }
    }
}

impl Error for WorkerErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WorkerErr::Io(e) => Some(e),
            WorkerErr::Model(e) => Some(e),
            WorkerErr::Join(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for WorkerErr {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ModelErr> for WorkerErr {
    fn from(value: ModelErr) -> Self {
        Self::Model(value)
    }
}

impl From<JoinError> for WorkerErr {
    fn from(value: JoinError) -> Self {
        Self::Join(value)
    }
}

/// Boundary conversion for binaries / I/O APIs.
impl From<WorkerErr> for io::Error {
    fn from(value: WorkerErr) -> Self {
        match value {
            WorkerErr::Io(e) => e,
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
