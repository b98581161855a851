//! Concrete provers shipped with the engine: retrieval from storage,
//! negation-as-failure, and a restricted form of backward-chaining modus
//! ponens.

use futures::StreamExt;

use crate::logic::{as_implies, as_not, normalize_variables, unify, Substitution, Term};
use crate::proofs::context::Context;
use crate::proofs::proof::{InferenceRule, Proof};
use crate::proofs::prover::{ProofStream, Prover};

/// Retrieves stored formulas that unify with the goal. This is the only
/// built-in prover that isn't pure: its answers depend on whatever has been
/// added to the knowledge base.
pub struct KnowledgeRetrieverProver;

impl Prover for KnowledgeRetrieverProver {
    fn name(&self) -> &str {
        "knowledge_retriever"
    }

    fn prove(&self, goal: Term, previous: Substitution, ctx: Context) -> ProofStream {
        Box::pin(async_stream::stream! {
            let kb = ctx.kb().clone();
            let language = kb.language();
            let candidates = kb.search_unifiable(&goal).await;
            for candidate in candidates {
                let (fresh, _mapping) = normalize_variables(&candidate, &language);
                if let Some(subst) = unify(&goal, &fresh, &previous) {
                    let conclusion = subst.apply(&goal);
                    yield Proof::new(InferenceRule::KnowledgeRetriever, conclusion, subst, Vec::new());
                }
            }
        })
    }
}

/// Proves `not(p)` by negation as failure: `p` is attempted and, if its
/// proof search terminates with no results, `not(p)` is concluded.
///
/// This assumes `p`'s search actually terminates. For goals built only from
/// the built-in provers and a finite knowledge base that holds; a prover
/// registered by a caller that searches forever under `not(...)` will make
/// this prover hang along with it.
pub struct NegationProver;

impl Prover for NegationProver {
    fn name(&self) -> &str {
        "negation"
    }

    fn prove(&self, goal: Term, previous: Substitution, ctx: Context) -> ProofStream {
        Box::pin(async_stream::stream! {
            let Some(inner) = as_not(&goal) else { return };
            let mut inner_proofs = ctx.kb().async_prove(inner, previous.clone());
            if inner_proofs.next().await.is_none() {
                yield Proof::new(InferenceRule::Negation, goal, previous, Vec::new());
            }
        })
    }
}

/// Backward-chains `goal` through a provable `premise -> goal`: finds some
/// implication concluding `goal`, then tries to prove its premise.
///
/// Refuses goals that are themselves implications, so this prover can't
/// chain into building an infinite tower of `Implies` terms while searching
/// for an implication whose conclusion is another implication.
pub struct RestrictedModusPonens;

impl Prover for RestrictedModusPonens {
    fn name(&self) -> &str {
        "restricted_modus_ponens"
    }

    fn prove(&self, goal: Term, previous: Substitution, ctx: Context) -> ProofStream {
        Box::pin(async_stream::stream! {
            if as_implies(&goal).is_some() {
                return;
            }
            let premise_var = ctx.fresh_variable();
            let implication_goal = crate::logic::implies(premise_var.clone(), goal.clone());
            let mut implication_proofs = ctx.kb().async_prove(implication_goal, previous);
            while let Some(implication_proof) = implication_proofs.next().await {
                let premise = implication_proof.substitution.apply(&premise_var);
                let mut premise_proofs = ctx.kb().async_prove(premise, implication_proof.substitution.clone());
                while let Some(premise_proof) = premise_proofs.next().await {
                    let subst = premise_proof.substitution.clone();
                    yield Proof::new(
                        InferenceRule::RestrictedModusPonens,
                        subst.apply(&goal),
                        subst,
                        vec![implication_proof.clone(), premise_proof],
                    );
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::Language;
    use crate::proofs::kb::KnowledgeBase;

    #[tokio::test]
    async fn retriever_finds_stored_fact() {
        let kb = KnowledgeBase::in_memory(Language::new());
        let cat = kb.language().constant("cat");
        kb.add_formula(cat.clone()).await;

        let mut proofs = kb.async_prove(cat.clone(), Substitution::empty());
        let proof = proofs.next().await.expect("should retrieve the stored fact");
        assert_eq!(proof.conclusion, cat);
    }

    #[tokio::test]
    async fn negation_succeeds_when_nothing_is_provable() {
        let kb = KnowledgeBase::in_memory(Language::new());
        let goal = crate::logic::not(kb.language().constant("raining"));
        let mut proofs = kb.async_prove(goal.clone(), Substitution::empty());
        let proof = proofs.next().await.expect("negation as failure should succeed");
        assert_eq!(proof.conclusion, goal);
    }

    #[tokio::test]
    async fn negation_fails_when_the_inner_goal_is_provable() {
        let kb = KnowledgeBase::in_memory(Language::new());
        let raining = kb.language().constant("raining");
        kb.add_formula(raining.clone()).await;
        let goal = crate::logic::not(raining);
        let mut proofs = kb.async_prove(goal, Substitution::empty());
        assert!(proofs.next().await.is_none());
    }

    #[tokio::test]
    async fn modus_ponens_chains_through_a_stored_implication() {
        let kb = KnowledgeBase::in_memory(Language::new());
        let raining = kb.language().constant("raining");
        let wet = kb.language().constant("wet");
        kb.add_formula(raining.clone()).await;
        kb.add_formula(crate::logic::implies(raining, wet.clone())).await;

        let mut proofs = kb.async_prove(wet.clone(), Substitution::empty());
        let proof = proofs.next().await.expect("should chain through the implication");
        assert_eq!(proof.conclusion, wet);
    }
}
