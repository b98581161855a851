//! Listeners: forward-chaining reactions to newly derived proofs.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::{EngineError, Result};
use crate::logic::{unify, Substitution, Term};
use crate::proofs::context::Context;
use crate::proofs::proof::Proof;

/// Whether a listener's handler is trusted to only ever raise ground
/// conclusions (`Safe`), or may raise conclusions carrying free variables
/// (`TotallyUnsafe`). `ArgumentMode`'s `*NoVariables` variants are enforced
/// against this: a `Safe` listener that receives a non-ground argument under
/// a `*NoVariables` mode fails with [`EngineError::UnsafeOperation`] instead
/// of silently proceeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Safety {
    Safe,
    TotallyUnsafe,
}

/// Controls what a listener's handler actually receives once its
/// `listened_formula` unifies with a proof's conclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentMode {
    /// The conclusion exactly as it appears in the triggering proof.
    Raw,
    /// The conclusion with the triggering substitution applied.
    Map,
    /// `Map`, then unwrapped: if the result is a single-child expression,
    /// the handler receives that child instead.
    MapUnwrapped,
    /// Like `MapUnwrapped`, but it is an error for the result not to be a
    /// single-child expression.
    MapUnwrappedRequired,
    /// `Map`, but it is an unsafe operation (for `Safety::Safe` listeners)
    /// for the result to contain a free variable.
    MapNoVariables,
    /// `MapUnwrapped`, with the same ground-ness requirement as
    /// `MapNoVariables`.
    MapUnwrappedNoVariables,
}

/// The shape of what a listener's handler produced for one triggering proof.
#[derive(Debug, Clone)]
pub enum HandlerItem {
    /// Just a new conclusion; its substitution is the triggering proof's.
    Conclusion(Term),
    /// A conclusion together with the substitution that should be recorded
    /// on the resulting proof.
    WithSubstitution(Term, Substitution),
    /// A conclusion together with extra premises beyond the triggering
    /// proof itself.
    WithPremises(Term, Vec<Arc<Proof>>),
}

impl From<Term> for HandlerItem {
    fn from(term: Term) -> Self {
        HandlerItem::Conclusion(term)
    }
}

impl From<(Term, Substitution)> for HandlerItem {
    fn from((term, subst): (Term, Substitution)) -> Self {
        HandlerItem::WithSubstitution(term, subst)
    }
}

impl From<(Term, Vec<Arc<Proof>>)> for HandlerItem {
    fn from((term, premises): (Term, Vec<Arc<Proof>>)) -> Self {
        HandlerItem::WithPremises(term, premises)
    }
}

type HandlerFuture = Pin<Box<dyn Future<Output = Result<Vec<HandlerItem>>> + Send>>;

/// A listener's handler: given the argument computed per its `ArgumentMode`
/// and the context it's running in, produces zero or more new conclusions.
pub trait Handler: Send + Sync {
    fn call(&self, argument: Term, ctx: Context) -> HandlerFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(Term, Context) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<HandlerItem>>> + Send + 'static,
{
    fn call(&self, argument: Term, ctx: Context) -> HandlerFuture {
        Box::pin((self)(argument, ctx))
    }
}

/// A registered forward-chaining reaction: whenever a proof's conclusion
/// unifies with `listened_formula`, `handler` runs and whatever it returns
/// becomes new proofs tagged [`crate::proofs::proof::InferenceRule::Pondering`].
#[derive(Clone)]
pub struct Listener {
    pub name: String,
    pub listened_formula: Term,
    pub safety: Safety,
    pub argument_mode: ArgumentMode,
    pub handler: Arc<dyn Handler>,
}

impl Listener {
    pub fn new(
        name: impl Into<String>,
        listened_formula: Term,
        safety: Safety,
        argument_mode: ArgumentMode,
        handler: impl Handler + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            listened_formula,
            safety,
            argument_mode,
            handler: Arc::new(handler),
        }
    }

    /// If `conclusion` unifies with this listener's `listened_formula`,
    /// computes the argument the handler should receive. Returns `Ok(None)`
    /// when it simply doesn't match, and `Err` when it matches but the
    /// configured `ArgumentMode`/`Safety` reject the resulting argument.
    pub fn matches(&self, conclusion: &Term) -> Result<Option<Term>> {
        let Some(subst) = unify(&self.listened_formula, conclusion, &Substitution::empty()) else {
            return Ok(None);
        };
        self.compute_argument(conclusion, &subst).map(Some)
    }

    fn compute_argument(&self, raw: &Term, subst: &Substitution) -> Result<Term> {
        use ArgumentMode::*;

        let resolved = subst.apply(raw);
        let base = match self.argument_mode {
            Raw => raw.clone(),
            Map | MapNoVariables => resolved.clone(),
            MapUnwrapped | MapUnwrappedRequired | MapUnwrappedNoVariables => match resolved.as_expression() {
                Some(children) if children.len() == 1 => children[0].clone(),
                _ if self.argument_mode == MapUnwrappedRequired => {
                    return Err(EngineError::InvalidHandlerShape {
                        listener: self.name.clone(),
                        reason: "expected a single-child expression to unwrap".into(),
                    })
                }
                _ => resolved.clone(),
            },
        };

        let requires_ground = matches!(self.argument_mode, MapNoVariables | MapUnwrappedNoVariables);
        if requires_ground && contains_free_variable(&base) && self.safety == Safety::Safe {
            return Err(EngineError::UnsafeOperation {
                listener: self.name.clone(),
                reason: "handler requires a ground term but received one with free variables".into(),
            });
        }

        Ok(base)
    }
}

fn contains_free_variable(term: &Term) -> bool {
    if term.is_variable() {
        return true;
    }
    match term.as_expression() {
        Some(children) => children.iter().any(contains_free_variable),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::term::Language;

    #[test]
    fn raw_mode_passes_through_unapplied() {
        let lang = Language::new();
        let var = lang.fresh_variable();
        let listener = Listener::new(
            "test",
            Term::expression([lang.constant("is"), var.clone(), lang.constant("cat")]),
            Safety::Safe,
            ArgumentMode::Raw,
            |_arg: Term, _ctx: Context| async { Ok(Vec::new()) },
        );
        let conclusion = Term::expression([lang.constant("is"), lang.constant("dylan"), lang.constant("cat")]);
        let matched = listener.matches(&conclusion).expect("should not error").expect("should unify");
        assert_eq!(matched, conclusion);
    }

    #[test]
    fn map_unwrapped_required_rejects_non_singleton() {
        let lang = Language::new();
        let listener = Listener::new(
            "test",
            lang.fresh_variable(),
            Safety::Safe,
            ArgumentMode::MapUnwrappedRequired,
            |_arg: Term, _ctx: Context| async { Ok(Vec::new()) },
        );
        let conclusion = Term::expression([lang.constant("a"), lang.constant("b")]);
        assert!(listener.matches(&conclusion).is_err());
    }

    #[test]
    fn non_matching_conclusion_is_none() {
        let lang = Language::new();
        let listener = Listener::new(
            "test",
            lang.constant("foo"),
            Safety::Safe,
            ArgumentMode::Raw,
            |_arg: Term, _ctx: Context| async { Ok(Vec::new()) },
        );
        assert!(listener.matches(&lang.constant("bar")).unwrap().is_none());
    }
}
