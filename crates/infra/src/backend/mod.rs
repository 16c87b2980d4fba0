//! Remote product and material backends.
//!
//! - `trait`: the async collaborator contracts plus transport-level errors
//! - `in_memory`: a process-local backend for tests and local runs

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryBackend;
pub use r#trait::{MaterialSource, ProductBackend, RemoteError, RemoteFailure};
