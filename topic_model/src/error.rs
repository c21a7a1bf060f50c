use std::{
    error::Error,
    fmt::{self, Display},
};

/// The result type used in the entire topic model module.
pub type Result<T> = std::result::Result<T, ModelErr>;

/// The topic model module's error type.
#[derive(Debug)]
pub enum ModelErr {
    /// The job cannot start with the given resources or parameters.
    Configuration(String),
    /// A counter was observed, or would have become, negative.
    ConsistencyViolation {
        counter: &'static str,
        index: usize,
        value: i64,
    },
    SizeMismatch {
        a: &'static str,
        b: &'static str,
        got: usize,
        expected: usize,
    },
}

impl ModelErr {
    pub(crate) fn negative(counter: &'static str, index: usize, value: i64) -> Self {
        Self::ConsistencyViolation {
            counter,
            index,
            value,
        }
    }
}

impl Display for ModelErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelErr::Configuration(msg) => write!(f, "configuration error: {msg}"),
            ModelErr::ConsistencyViolation {
                counter,
                index,
                value,
            } => write!(
                f,
                "consistency violation: {counter} at index {index} would hold {value}"
            ),
            ModelErr::SizeMismatch {
                a,
                b,
                got,
                expected,
            } => write!(
                f,
                "There's a size mismatch between {a} and {b}, got {got} and expected {expected}"
            ),
        }
    }
}

impl Error for ModelErr {}
