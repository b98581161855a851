//! A `StorageBackend` over a single SQLite connection, with real
//! `BEGIN`/`COMMIT`/`ROLLBACK` transactions.
//!
//! Candidate filtering is still done in Rust (fetch every row, then run
//! [`keys_compatible`]) rather than pushed into SQL — the abstruse index's
//! wildcard matching doesn't map onto a `WHERE` clause without a lot more
//! machinery than a bootstrap backend warrants. A single connection means at
//! most one transaction is ever open at a time; `begin_transaction` blocks
//! out further transactions until it's resolved.

use rusqlite::{params, Connection};
use tokio::sync::Mutex;

use async_trait::async_trait;
use inferentia_common::Metadata;

use crate::error::StorageError;
use crate::key_text::keys_compatible;
use crate::traits::{StorageBackend, StoredRecord, TransactionId};

struct Inner {
    conn: Connection,
    open_transaction: Option<TransactionId>,
}

pub struct SqliteBackend {
    inner: Mutex<Inner>,
}

impl SqliteBackend {
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS formulas (
                id INTEGER PRIMARY KEY,
                term_text TEXT NOT NULL,
                key_text TEXT NOT NULL,
                sequence INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            inner: Mutex::new(Inner {
                conn,
                open_transaction: None,
            }),
        })
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        conn.execute(
            "CREATE TABLE formulas (
                id INTEGER PRIMARY KEY,
                term_text TEXT NOT NULL,
                key_text TEXT NOT NULL,
                sequence INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(Self {
            inner: Mutex::new(Inner {
                conn,
                open_transaction: None,
            }),
        })
    }
}

#[async_trait]
impl StorageBackend for SqliteBackend {
    async fn add(&self, term_text: String, key_text: String) -> Result<Metadata, StorageError> {
        let mut inner = self.inner.lock().await;
        let sequence: i64 = inner
            .conn
            .query_row("SELECT COUNT(*) FROM formulas", [], |row| row.get(0))?;
        inner.conn.execute(
            "INSERT INTO formulas (term_text, key_text, sequence) VALUES (?1, ?2, ?3)",
            params![term_text, key_text, sequence],
        )?;
        Ok(Metadata::new(sequence as u64))
    }

    async fn search_unifiable(&self, key_text: &str) -> Result<Vec<StoredRecord>, StorageError> {
        let inner = self.inner.lock().await;
        let mut stmt = inner.conn.prepare("SELECT term_text, key_text, sequence FROM formulas")?;
        let rows = stmt.query_map([], |row| {
            let term_text: String = row.get(0)?;
            let key: String = row.get(1)?;
            let sequence: i64 = row.get(2)?;
            Ok((term_text, key, sequence))
        })?;

        let mut results = Vec::new();
        for row in rows {
            let (term_text, key, sequence) = row?;
            if keys_compatible(key_text, &key) {
                results.push(StoredRecord {
                    term_text,
                    metadata: Metadata::new(sequence as u64),
                });
            }
        }
        Ok(results)
    }

    async fn len(&self) -> usize {
        let inner = self.inner.lock().await;
        inner
            .conn
            .query_row("SELECT COUNT(*) FROM formulas", [], |row| row.get::<_, i64>(0))
            .unwrap_or(0) as usize
    }

    fn supports_transactions(&self) -> bool {
        true
    }

    async fn begin_transaction(&self) -> Result<TransactionId, StorageError> {
        let mut inner = self.inner.lock().await;
        if inner.open_transaction.is_some() {
            return Err(StorageError::Backend("a transaction is already open".into()));
        }
        inner.conn.execute_batch("BEGIN")?;
        let id = TransactionId::fresh();
        inner.open_transaction = Some(id);
        Ok(id)
    }

    async fn commit_transaction(&self, id: TransactionId) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().await;
        if inner.open_transaction != Some(id) {
            return Err(StorageError::UnknownTransaction(id));
        }
        inner.conn.execute_batch("COMMIT")?;
        inner.open_transaction = None;
        Ok(())
    }

    async fn rollback_transaction(&self, id: TransactionId) -> Result<(), StorageError> {
        let mut inner = self.inner.lock().await;
        if inner.open_transaction != Some(id) {
            return Err(StorageError::UnknownTransaction(id));
        }
        inner.conn.execute_batch("ROLLBACK")?;
        inner.open_transaction = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rollback_discards_inserts() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        let tx = backend.begin_transaction().await.unwrap();
        backend.add("(is dylan cat)".into(), "(is dylan cat)".into()).await.unwrap();
        backend.rollback_transaction(tx).await.unwrap();
        assert_eq!(backend.len().await, 0);
    }

    #[tokio::test]
    async fn commit_keeps_inserts() {
        let backend = SqliteBackend::open_in_memory().unwrap();
        let tx = backend.begin_transaction().await.unwrap();
        backend.add("(is dylan cat)".into(), "(is dylan cat)".into()).await.unwrap();
        backend.commit_transaction(tx).await.unwrap();
        assert_eq!(backend.len().await, 1);
    }
}
