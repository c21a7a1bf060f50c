use std::{
    error::Error,
    fmt::{self, Display},
};

/// The specific result type for the storage module.
pub type Result<T> = std::result::Result<T, StoreErr>;

/// Errors raised by the `CountStore` and its shards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErr {
    /// The provided buffer length doesn't match the table size.
    SizeMismatch { got: usize, expected: usize },
    /// A reconciled cell came out negative, the store keeps reporting it afterwards.
    NegativeCount { cell: usize, value: i64 },
}

impl Display for StoreErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreErr::SizeMismatch { got, expected } => write!(
                f,
                "CountStore error: the provided buffer holds {got} cells, expected {expected}"
            ),
            StoreErr::NegativeCount { cell, value } => write!(
                f,
                "CountStore error: reconciled cell {cell} is negative ({value})"
            ),
        }
    }
}

impl Error for StoreErr {}
