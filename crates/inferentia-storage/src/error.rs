//! Storage-level error taxonomy, kept separate from `inferentia-engine`'s
//! `EngineError` so a caller can distinguish "the proof search went wrong"
//! from "the backing store went wrong".

use thiserror::Error;

use crate::TransactionId;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("transaction {0:?} is unknown or already finished")]
    UnknownTransaction(TransactionId),

    #[error("backend does not support transactions")]
    TransactionsUnsupported,

    #[error("backend error: {0}")]
    Backend(String),

    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;
