pub mod sampler;
pub mod server;

pub use sampler::{HyperSpec, SamplerSpec};
pub use server::ServerSpec;
