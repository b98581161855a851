//! Variable bindings and the unification algorithm.

use std::collections::HashMap;

use super::term::Term;

/// An immutable mapping from variables to the terms they are bound to.
///
/// Bindings chase transitively: if `?x` is bound to `?y` and `?y` is bound to
/// `cat`, [`Substitution::resolve`] on `?x` returns `cat`. Two substitutions
/// compare equal when they induce the same resolved mapping, regardless of
/// how each was built up.
#[derive(Debug, Clone, Default)]
pub struct Substitution {
    bindings: HashMap<Term, Term>,
}

impl Substitution {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Chases `term` through the binding chain until it reaches a variable
    /// with no binding, or a non-variable term.
    pub fn resolve(&self, term: &Term) -> Term {
        let mut current = term.clone();
        while current.is_variable() {
            match self.bindings.get(&current) {
                Some(next) if next != &current => current = next.clone(),
                _ => break,
            }
        }
        current
    }

    /// Returns a new substitution extending `self` with `variable -> value`.
    /// Does not remove or overwrite any existing binding (`with_bindings` is
    /// monotone): rebinding an already-bound variable is a logic error in the
    /// unifier and is rejected by `unify` before this is ever called with a
    /// conflicting pair.
    pub fn with_binding(&self, variable: Term, value: Term) -> Substitution {
        let mut bindings = self.bindings.clone();
        bindings.insert(variable, value);
        Substitution { bindings }
    }

    /// Applies every binding to `term`, recursively, to a fixpoint. The
    /// result contains no variable that has a binding in `self`.
    pub fn apply(&self, term: &Term) -> Term {
        let resolved = self.resolve(term);
        match resolved.as_expression() {
            Some(children) => Term::expression(children.iter().map(|c| self.apply(c))),
            None => resolved,
        }
    }
}

impl PartialEq for Substitution {
    fn eq(&self, other: &Self) -> bool {
        let variables = self.bindings.keys().chain(other.bindings.keys());
        variables.map(|v| (self.resolve(v), other.resolve(v))).all(|(a, b)| a == b)
    }
}

/// Computes a most general unifier for `a` and `b`, extending `previous`.
///
/// Returns `None` if no unifier exists. `previous` lets callers thread a
/// substitution accumulated from earlier goals through further unification
/// without losing its bindings; pass [`Substitution::empty`] to unify from
/// scratch.
pub fn unify(a: &Term, b: &Term, previous: &Substitution) -> Option<Substitution> {
    let ra = previous.resolve(a);
    let rb = previous.resolve(b);

    if ra.is_variable() && rb.is_variable() && ra == rb {
        return Some(previous.clone());
    }

    if ra.is_variable() {
        return bind_variable(&ra, &rb, previous);
    }
    if rb.is_variable() {
        return bind_variable(&rb, &ra, previous);
    }

    match (ra.as_expression(), rb.as_expression()) {
        (Some(ca), Some(cb)) => {
            if ca.len() != cb.len() {
                return None;
            }
            let mut subst = previous.clone();
            for (x, y) in ca.iter().zip(cb.iter()) {
                subst = unify(x, y, &subst)?;
            }
            return Some(subst);
        }
        (Some(_), None) | (None, Some(_)) => return None,
        (None, None) => {}
    }

    if ra == rb {
        Some(previous.clone())
    } else {
        None
    }
}

fn bind_variable(variable: &Term, value: &Term, previous: &Substitution) -> Option<Substitution> {
    if variable == value {
        return Some(previous.clone());
    }
    if value.contains_variable(variable) {
        return None;
    }
    Some(previous.with_binding(variable.clone(), value.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::term::Language;

    #[test]
    fn unifies_variable_with_constant() {
        let lang = Language::new();
        let x = lang.fresh_variable();
        let cat = lang.constant("cat");
        let subst = unify(&x, &cat, &Substitution::empty()).expect("should unify");
        assert_eq!(subst.apply(&x), cat);
    }

    #[test]
    fn fails_occurs_check() {
        let lang = Language::new();
        let x = lang.fresh_variable();
        let wrapping = Term::expression([lang.constant("f"), x.clone()]);
        assert!(unify(&x, &wrapping, &Substitution::empty()).is_none());
    }

    #[test]
    fn fails_on_arity_mismatch() {
        let lang = Language::new();
        let f = lang.constant("f");
        let a = Term::expression([f.clone(), lang.constant("x")]);
        let b = Term::expression([f, lang.constant("x"), lang.constant("y")]);
        assert!(unify(&a, &b, &Substitution::empty()).is_none());
    }

    #[test]
    fn unifies_nested_expressions() {
        let lang = Language::new();
        let f = lang.constant("f");
        let x = lang.fresh_variable();
        let y = lang.fresh_variable();
        let a = Term::expression([f.clone(), x.clone(), lang.constant("b")]);
        let b = Term::expression([f, lang.constant("a"), y.clone()]);
        let subst = unify(&a, &b, &Substitution::empty()).expect("should unify");
        assert_eq!(subst.apply(&x), lang.constant("a"));
        assert_eq!(subst.apply(&y), lang.constant("b"));
    }

    #[test]
    fn rejects_conflicting_constants() {
        let lang = Language::new();
        assert!(unify(&lang.constant("a"), &lang.constant("b"), &Substitution::empty()).is_none());
    }

    #[test]
    fn equality_is_by_induced_mapping() {
        let lang = Language::new();
        let x = lang.fresh_variable();
        let y = lang.fresh_variable();
        let cat = lang.constant("cat");

        let direct = Substitution::empty().with_binding(x.clone(), cat.clone());
        let indirect = Substitution::empty()
            .with_binding(x.clone(), y.clone())
            .with_binding(y, cat);

        assert_eq!(direct, indirect);
    }
}
