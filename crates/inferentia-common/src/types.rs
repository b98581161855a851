//! Common types shared between the engine and storage crates.

use serde::{Deserialize, Serialize};

/// Metadata attached to a stored formula, returned alongside candidate
/// matches by a storage backend's `search_unifiable`.
///
/// Backends are free to enrich this further (a `SqliteBackend` might attach a
/// row id), but every backend can at least report the insertion sequence
/// number, which lets callers reason about recency without peeking at the
/// term itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Monotonically increasing sequence number assigned at insertion time.
    pub sequence: u64,
}

impl Metadata {
    pub fn new(sequence: u64) -> Self {
        Self { sequence }
    }
}
