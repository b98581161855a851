//! Proofs: immutable records of how a conclusion was derived.

use std::sync::Arc;

use crate::logic::{Substitution, Term};

/// Which mechanism produced a [`Proof`].
#[derive(Debug, Clone)]
pub enum InferenceRule {
    /// The conclusion was asserted directly (no derivation).
    Given,
    /// Retrieved from stored formulas via the abstruse index.
    KnowledgeRetriever,
    /// Concluded `not(p)` because `p` could not be proven.
    Negation,
    /// Backward-chained through a provable `premise -> conclusion`.
    RestrictedModusPonens,
    /// Forward-chained: `listener` fired because `triggering_formula`
    /// unified with its `listened_formula`.
    Pondering { listener: String, triggering_formula: Term },
}

/// An immutable derivation: a conclusion, the substitution that produced it,
/// and the proofs it depends on. Premises form a DAG via `Arc` sharing —
/// never a cycle, since a proof can only reference proofs that already
/// existed when it was built.
#[derive(Debug, Clone)]
pub struct Proof {
    pub inference_rule: InferenceRule,
    pub conclusion: Term,
    pub substitution: Substitution,
    pub premises: Vec<Arc<Proof>>,
}

impl Proof {
    pub fn new(
        inference_rule: InferenceRule,
        conclusion: Term,
        substitution: Substitution,
        premises: Vec<Arc<Proof>>,
    ) -> Arc<Proof> {
        Arc::new(Proof {
            inference_rule,
            conclusion,
            substitution,
            premises,
        })
    }

    /// A proof with no premises and no inference, as if `conclusion` were
    /// simply given.
    pub fn given(conclusion: Term, substitution: Substitution) -> Arc<Proof> {
        Proof::new(InferenceRule::Given, conclusion, substitution, Vec::new())
    }

    /// Depth-first text explanation, one line per premise, indented by
    /// derivation depth. Meant for the CLI demo and test assertions, not for
    /// machine consumption.
    pub fn explain(&self) -> String {
        let mut lines = Vec::new();
        self.explain_into(0, &mut lines);
        lines.join("\n")
    }

    fn explain_into(&self, depth: usize, lines: &mut Vec<String>) {
        let indent = "  ".repeat(depth);
        let rule = match &self.inference_rule {
            InferenceRule::Given => "given".to_string(),
            InferenceRule::KnowledgeRetriever => "retrieved".to_string(),
            InferenceRule::Negation => "negation-as-failure".to_string(),
            InferenceRule::RestrictedModusPonens => "modus-ponens".to_string(),
            InferenceRule::Pondering { listener, .. } => format!("listener:{listener}"),
        };
        lines.push(format!("{indent}{} [{rule}]", self.conclusion));
        for premise in &self.premises {
            premise.explain_into(depth + 1, lines);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::term::Language;

    #[test]
    fn explain_nests_premises_by_depth() {
        let lang = Language::new();
        let p = lang.constant("raining");
        let q = lang.constant("wet");
        let premise = Proof::given(p, Substitution::empty());
        let conclusion = Proof::new(
            InferenceRule::RestrictedModusPonens,
            q,
            Substitution::empty(),
            vec![premise],
        );
        let text = conclusion.explain();
        assert!(text.contains("modus-ponens"));
        assert!(text.contains("given"));
    }
}
