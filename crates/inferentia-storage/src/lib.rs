//! Pluggable storage for formulas: the [`StorageBackend`] trait, its RAII
//! [`Transaction`] guard, and two implementations — [`InMemoryBackend`] and,
//! behind the `sqlite` feature, [`SqliteBackend`].

pub mod error;
mod key_text;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod traits;

pub use error::{Result, StorageError};
pub use key_text::keys_compatible;
pub use memory::InMemoryBackend;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteBackend;
pub use traits::{StorageBackend, StoredRecord, Transaction, TransactionId};
