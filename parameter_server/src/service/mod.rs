mod server;

pub use server::{ParameterServer, ServerOutcome};
