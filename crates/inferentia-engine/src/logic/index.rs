//! The abstruse index: a cheap pre-filter over stored terms keyed on their
//! coarse shape, so retrieval doesn't have to attempt unification against
//! every formula in the knowledge base.

use parking_lot::RwLock;

use inferentia_common::Metadata;

use super::term::{Term, Wrapped};

/// The coarse shape of a term, used to quickly rule out non-unifiable
/// candidates without running the full unification algorithm.
///
/// Variables collapse to [`Key::Wildcard`]; everything else keeps its shape
/// down to the index's configured depth, beyond which children also collapse
/// to a wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Wildcard,
    Constant(String),
    Wrapped(Wrapped),
    Expr(Vec<Key>),
}

impl Key {
    /// True if a term keyed `self` could possibly unify with a term keyed
    /// `other`. This is a sound but incomplete test: a `true` result does
    /// not guarantee unification succeeds, but `false` guarantees it can't.
    pub fn compatible(&self, other: &Key) -> bool {
        match (self, other) {
            (Key::Wildcard, _) | (_, Key::Wildcard) => true,
            (Key::Constant(a), Key::Constant(b)) => a == b,
            (Key::Wrapped(a), Key::Wrapped(b)) => a == b,
            (Key::Expr(a), Key::Expr(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.compatible(y))
            }
            _ => false,
        }
    }
}

/// Builds the index key for `term`, recursing into expression children up to
/// `depth` levels before degrading the remainder to a wildcard.
pub fn make_key(term: &Term, depth: usize) -> Key {
    if term.is_variable() {
        return Key::Wildcard;
    }
    if let Some(name) = term.as_constant_name() {
        return Key::Constant(name.to_string());
    }
    if let Some(wrapped) = term.as_wrapped() {
        return Key::Wrapped(wrapped.clone());
    }
    if let Some(children) = term.as_expression() {
        return if depth == 0 {
            Key::Wildcard
        } else {
            Key::Expr(children.iter().map(|c| make_key(c, depth - 1)).collect())
        };
    }
    unreachable!("term is one of variable, constant, wrapper or expression")
}

/// A store of `(term, metadata)` pairs, queryable by shape.
///
/// This is the bootstrap implementation: a flat `Vec` scanned linearly on
/// retrieval, filtered by key compatibility before anything attempts real
/// unification. It trades index-build sophistication for simplicity, mirroring
/// the reference implementation's own placeholder index.
pub struct VecAbstruseIndex {
    depth: usize,
    entries: RwLock<Vec<(Key, Term, Metadata)>>,
}

impl VecAbstruseIndex {
    pub fn new(depth: usize) -> Self {
        Self {
            depth,
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn add(&self, term: Term, metadata: Metadata) {
        let key = make_key(&term, self.depth);
        self.entries.write().push((key, term, metadata));
    }

    /// Returns every stored term whose key is compatible with `query`'s key,
    /// alongside the metadata it was stored with.
    pub fn retrieve(&self, query: &Term) -> Vec<(Term, Metadata)> {
        let query_key = make_key(query, self.depth);
        self.entries
            .read()
            .iter()
            .filter(|(key, _, _)| key.compatible(&query_key))
            .map(|(_, term, metadata)| (term.clone(), *metadata))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::term::Language;

    #[test]
    fn wildcard_is_compatible_with_anything() {
        assert!(Key::Wildcard.compatible(&Key::Constant("cat".into())));
        assert!(Key::Constant("cat".into()).compatible(&Key::Wildcard));
    }

    #[test]
    fn mismatched_constants_are_incompatible() {
        assert!(!Key::Constant("cat".into()).compatible(&Key::Constant("dog".into())));
    }

    #[test]
    fn retrieve_filters_by_shape() {
        let lang = Language::new();
        let index = VecAbstruseIndex::new(2);
        let is_cat = Term::expression([lang.constant("is"), lang.constant("dylan"), lang.constant("cat")]);
        let is_dog = Term::expression([lang.constant("is"), lang.constant("rex"), lang.constant("dog")]);
        index.add(is_cat.clone(), Metadata::new(0));
        index.add(is_dog, Metadata::new(1));

        let query = Term::expression([lang.constant("is"), lang.fresh_variable(), lang.constant("cat")]);
        let hits = index.retrieve(&query);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, is_cat);
    }

    #[test]
    fn retrieve_degrades_past_depth() {
        let lang = Language::new();
        let index = VecAbstruseIndex::new(0);
        let nested = Term::expression([lang.constant("f"), lang.constant("g")]);
        index.add(nested, Metadata::new(0));
        let query = Term::expression([lang.constant("f"), lang.constant("h")]);
        assert_eq!(index.retrieve(&query).len(), 1, "depth 0 collapses expressions to a wildcard");
    }
}
