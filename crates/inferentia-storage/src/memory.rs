//! A `StorageBackend` that keeps everything in a `Vec` behind a lock.
//!
//! It does not support real transactions: `begin_transaction` hands out an
//! id but `commit_transaction`/`rollback_transaction` are no-ops beyond
//! bookkeeping, since there is no underlying engine to roll anything back in.
//! This mirrors the bootstrap-quality storage the reference implementation
//! shipped before a real database backend existed.

use std::collections::HashSet;

use async_trait::async_trait;
use parking_lot::RwLock;

use inferentia_common::Metadata;

use crate::error::StorageError;
use crate::key_text::keys_compatible;
use crate::traits::{StorageBackend, StoredRecord, TransactionId};

struct Entry {
    term_text: String,
    key_text: String,
    metadata: Metadata,
}

#[derive(Default)]
pub struct InMemoryBackend {
    entries: RwLock<Vec<Entry>>,
    open_transactions: RwLock<HashSet<TransactionId>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for InMemoryBackend {
    async fn add(&self, term_text: String, key_text: String) -> Result<Metadata, StorageError> {
        let mut entries = self.entries.write();
        let metadata = Metadata::new(entries.len() as u64);
        entries.push(Entry {
            term_text,
            key_text,
            metadata,
        });
        Ok(metadata)
    }

    async fn search_unifiable(&self, key_text: &str) -> Result<Vec<StoredRecord>, StorageError> {
        Ok(self
            .entries
            .read()
            .iter()
            .filter(|entry| keys_compatible(key_text, &entry.key_text))
            .map(|entry| StoredRecord {
                term_text: entry.term_text.clone(),
                metadata: entry.metadata,
            })
            .collect())
    }

    async fn len(&self) -> usize {
        self.entries.read().len()
    }

    fn supports_transactions(&self) -> bool {
        false
    }

    async fn begin_transaction(&self) -> Result<TransactionId, StorageError> {
        let id = TransactionId::fresh();
        self.open_transactions.write().insert(id);
        Ok(id)
    }

    async fn commit_transaction(&self, id: TransactionId) -> Result<(), StorageError> {
        if !self.open_transactions.write().remove(&id) {
            return Err(StorageError::UnknownTransaction(id));
        }
        Ok(())
    }

    async fn rollback_transaction(&self, id: TransactionId) -> Result<(), StorageError> {
        if !self.open_transactions.write().remove(&id) {
            return Err(StorageError::UnknownTransaction(id));
        }
        tracing::debug!(?id, "in-memory backend has nothing to roll back");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn add_then_search_round_trips() {
        let backend = InMemoryBackend::new();
        backend.add("(is dylan cat)".into(), "(is dylan cat)".into()).await.unwrap();
        let hits = backend.search_unifiable("(is * cat)").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].term_text, "(is dylan cat)");
    }

    #[tokio::test]
    async fn unknown_transaction_is_rejected() {
        let backend = InMemoryBackend::new();
        let err = backend.commit_transaction(TransactionId::fresh()).await.unwrap_err();
        assert!(matches!(err, StorageError::UnknownTransaction(_)));
    }
}
