//! Shared utilities and types used across inferentia crates.

pub mod error;
pub mod tracing_setup;
pub mod types;

pub use error::CommonError;
pub use tracing_setup::init_tracing;
pub use types::Metadata;
