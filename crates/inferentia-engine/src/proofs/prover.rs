//! The prover contract: `(goal, previous substitution, context) -> stream of
//! proofs`.

use std::sync::Arc;

use futures::stream::BoxStream;

use crate::logic::{Substitution, Term};
use crate::proofs::context::Context;
use crate::proofs::proof::Proof;

/// A stream of proofs, each independently valid, in the order the prover
/// found them. Never assumed to be finite by callers other than
/// `NegationProver`, which restricts itself to goals it can afford to
/// exhaust.
pub type ProofStream = BoxStream<'static, Arc<Proof>>;

/// Something that can attempt to prove a goal.
///
/// Implementations may be pure (derive proofs only from `goal` and `ctx`) or
/// impure (e.g. the built-in knowledge retriever, which depends on whatever
/// happens to be stored). Purity isn't tracked in the type system here —
/// it's a property callers reason about informally, same as the reference
/// implementation's `pure` flag on its retriever.
pub trait Prover: Send + Sync {
    fn name(&self) -> &str;

    /// Attempts to prove `goal`, extending `previous` with whatever
    /// bindings each candidate proof's substitution adds.
    fn prove(&self, goal: Term, previous: Substitution, ctx: Context) -> ProofStream;
}
