//! The context threaded explicitly through every prover and listener call.
//!
//! The reference implementation this crate is modeled on stashes the current
//! knowledge base and fresh-symbol sources in thread-locals, saving and
//! restoring them around each call. Thread-locals don't play well with a
//! work-stealing-free-but-still-task-based scheduler where the "current"
//! task can move between calls, so `Context` is an explicit value instead:
//! every `Prover`/`Listener` handler receives one as an argument.

use crate::logic::term::{constant, Language, Term};
use crate::proofs::kb::KnowledgeBase;

/// Everything a prover or listener handler needs beyond its own arguments:
/// a handle back to the knowledge base it's running against, and the
/// language fresh variables and constants should be minted in.
#[derive(Clone)]
pub struct Context {
    kb: KnowledgeBase,
}

impl Context {
    pub fn new(kb: KnowledgeBase) -> Self {
        Self { kb }
    }

    pub fn kb(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn language(&self) -> Language {
        self.kb.language()
    }

    pub fn fresh_variable(&self) -> Term {
        self.kb.language().fresh_variable()
    }

    pub fn fresh_constant(&self, name: impl AsRef<str>) -> Term {
        constant(name)
    }
}
