//! First-order-logic knowledge base: terms, unification, proof search, and
//! forward chaining over a pluggable storage backend.
//!
//! The crate is split into two layers:
//! - [`logic`] is pure and synchronous — terms, substitutions, unification,
//!   the abstruse index, and the `implies`/`not` connectives.
//! - [`proofs`] is where async I/O and the scheduler live — provers,
//!   listeners, and the [`proofs::KnowledgeBase`] facade tying everything
//!   together.

pub mod error;
pub mod logic;
pub mod proofs;

pub use error::{EngineError, Result};

/// Re-exports the pieces most callers need, so `use inferentia_engine::prelude::*;`
/// is enough for anything short of implementing a custom prover or backend.
pub mod prelude {
    pub use crate::error::{EngineError, Result};
    pub use crate::logic::{constant, implies, not, Language, Substitution, Term};
    pub use crate::proofs::{
        ArgumentMode, Context, HandlerItem, InferenceRule, KnowledgeBase, Listener, Ponder, Proof, Safety,
    };
}
