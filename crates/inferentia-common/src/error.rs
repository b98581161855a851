//! Error helpers shared across crates.
//!
//! Each crate defines its own `thiserror`-derived error enum at its own
//! boundary (see `inferentia_engine::EngineError` and
//! `inferentia_storage::StorageError`); this type exists only for the small
//! amount of glue code (the demo binary, shared test helpers) that doesn't
//! belong to either.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommonError {
    #[error("environment variable {0} had an invalid value: {1}")]
    InvalidEnvVar(&'static str, String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
