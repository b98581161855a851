//! Proof search, forward chaining, and the concurrency harness that drives
//! both: everything that depends on async I/O or the scheduler lives here,
//! layered on top of the pure `logic` module.

pub mod builtin_provers;
pub mod context;
pub mod kb;
pub mod listener;
pub mod proof;
pub mod prover;
pub mod scheduler;

pub use builtin_provers::{KnowledgeRetrieverProver, NegationProver, RestrictedModusPonens};
pub use context::Context;
pub use kb::{KnowledgeBase, Ponder};
pub use listener::{ArgumentMode, Handler, HandlerItem, Listener, Safety};
pub use proof::{InferenceRule, Proof};
pub use prover::{ProofStream, Prover};
pub use scheduler::{multiplex, Scheduler};
