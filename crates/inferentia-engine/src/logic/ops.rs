//! Logical connectives built on top of the bare term model, plus `>>`/`<<`
//! sugar so formulas read close to their logical notation.

use std::ops::{Shl, Shr};

use super::term::{constant, Term};

const IMPLIES_HEAD: &str = "implies";
const NOT_HEAD: &str = "not";

/// Builds `premise -> conclusion`.
pub fn implies(premise: Term, conclusion: Term) -> Term {
    Term::expression([constant(IMPLIES_HEAD), premise, conclusion])
}

/// Builds `not(term)`.
pub fn not(term: Term) -> Term {
    Term::expression([constant(NOT_HEAD), term])
}

/// If `term` is `premise -> conclusion`, returns `(premise, conclusion)`.
pub fn as_implies(term: &Term) -> Option<(Term, Term)> {
    let children = term.as_expression()?;
    if children.len() == 3 && children[0].as_constant_name() == Some(IMPLIES_HEAD) {
        Some((children[1].clone(), children[2].clone()))
    } else {
        None
    }
}

/// If `term` is `not(inner)`, returns `inner`.
pub fn as_not(term: &Term) -> Option<Term> {
    let children = term.as_expression()?;
    if children.len() == 2 && children[0].as_constant_name() == Some(NOT_HEAD) {
        Some(children[1].clone())
    } else {
        None
    }
}

/// `premise >> conclusion` builds `implies(premise, conclusion)`.
impl Shr for Term {
    type Output = Term;
    fn shr(self, conclusion: Term) -> Term {
        implies(self, conclusion)
    }
}

/// `conclusion << premise` builds `implies(premise, conclusion)`, the mirror
/// image of [`Shr`] for call sites that read more naturally right-to-left.
impl Shl for Term {
    type Output = Term;
    fn shl(self, premise: Term) -> Term {
        implies(premise, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::term::Language;

    #[test]
    fn implies_round_trips_through_as_implies() {
        let lang = Language::new();
        let p = lang.constant("raining");
        let q = lang.constant("wet");
        let formula = implies(p.clone(), q.clone());
        assert_eq!(as_implies(&formula), Some((p, q)));
    }

    #[test]
    fn not_round_trips_through_as_not() {
        let lang = Language::new();
        let p = lang.constant("raining");
        assert_eq!(as_not(&not(p.clone())), Some(p));
    }

    #[test]
    fn shr_and_shl_build_the_same_formula() {
        let lang = Language::new();
        let p = lang.constant("p");
        let q = lang.constant("q");
        assert_eq!(p.clone() >> q.clone(), q << p);
    }

    #[test]
    fn non_implies_expressions_are_rejected() {
        let lang = Language::new();
        let other = Term::expression([lang.constant("and"), lang.constant("p"), lang.constant("q")]);
        assert_eq!(as_implies(&other), None);
    }
}
