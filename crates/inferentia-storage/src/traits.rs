//! The `StorageBackend` trait and its RAII transaction guard.
//!
//! Formulas are passed across this boundary as their canonical text
//! encoding rather than as `inferentia_engine::Term` directly, so this crate
//! has no dependency on the term model (which in turn depends on storage for
//! its knowledge base glue) — `inferentia-engine` is the only place that
//! knows how to parse a formula back out of `term_text`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use inferentia_common::Metadata;

use crate::error::StorageError;

static NEXT_TRANSACTION_ID: AtomicU64 = AtomicU64::new(0);

/// Opaque handle to an open transaction. Only meaningful to the backend that
/// issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId(u64);

impl TransactionId {
    pub(crate) fn fresh() -> Self {
        Self(NEXT_TRANSACTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// One stored formula: its canonical text encoding, the text encoding of its
/// abstruse-index key (used for the coarse `*`-wildcard compatibility check),
/// and the metadata it was stored with.
#[derive(Debug, Clone)]
pub struct StoredRecord {
    pub term_text: String,
    pub metadata: Metadata,
}

/// A pluggable place to durably keep formulas.
///
/// Implementors only need to get `add`/`search_unifiable`/transactions right;
/// `inferentia-engine`'s `KnowledgeBase` is responsible for everything
/// term-shaped (encoding, decoding, and running real unification against the
/// candidates this returns).
#[async_trait]
pub trait StorageBackend: Send + Sync + 'static {
    /// Stores `term_text` (a term's canonical encoding) under `key_text` (its
    /// abstruse-index key's canonical encoding, `*` standing for a wildcard)
    /// and returns the metadata it was assigned.
    async fn add(&self, term_text: String, key_text: String) -> Result<Metadata, StorageError>;

    /// Returns every stored record whose key is compatible with `key_text`.
    async fn search_unifiable(&self, key_text: &str) -> Result<Vec<StoredRecord>, StorageError>;

    /// Number of stored formulas.
    async fn len(&self) -> usize;

    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Whether this backend's `begin_transaction`/`commit_transaction`/
    /// `rollback_transaction` are real (atomic, isolated) or best-effort.
    fn supports_transactions(&self) -> bool;

    async fn begin_transaction(&self) -> Result<TransactionId, StorageError>;
    async fn commit_transaction(&self, id: TransactionId) -> Result<(), StorageError>;
    async fn rollback_transaction(&self, id: TransactionId) -> Result<(), StorageError>;
}

/// RAII guard over an open transaction. Dropping it without calling
/// [`Transaction::commit`] or [`Transaction::rollback`] rolls the
/// transaction back (best-effort, on a spawned task, since `Drop` can't be
/// async) and logs a warning — a transaction left unresolved is a bug in the
/// caller, not a silent no-op.
pub struct Transaction {
    backend: Arc<dyn StorageBackend>,
    id: TransactionId,
    finished: bool,
}

impl Transaction {
    fn new(backend: Arc<dyn StorageBackend>, id: TransactionId) -> Self {
        Self {
            backend,
            id,
            finished: false,
        }
    }

    /// Begins a transaction on `backend` and wraps it in a guard.
    pub async fn begin(backend: Arc<dyn StorageBackend>) -> Result<Transaction, StorageError> {
        let id = backend.begin_transaction().await?;
        Ok(Transaction::new(backend, id))
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub async fn commit(mut self) -> Result<(), StorageError> {
        self.finished = true;
        self.backend.commit_transaction(self.id).await
    }

    pub async fn rollback(mut self) -> Result<(), StorageError> {
        self.finished = true;
        self.backend.rollback_transaction(self.id).await
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let backend = self.backend.clone();
        let id = self.id;
        tracing::warn!(?id, "transaction dropped without commit or rollback; rolling back");
        tokio::spawn(async move {
            if let Err(err) = backend.rollback_transaction(id).await {
                tracing::error!(%err, "failed to roll back abandoned transaction");
            }
        });
    }
}
