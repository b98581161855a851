//! The term model: variables, constants, wrapped host values and compound
//! expressions, plus the `Language` namespace that scopes identity.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::Mutex;

/// Global constant interner. Constants are symbols shared across the whole
/// universe of discourse (e.g. the `implies`/`not` operator heads), unlike
/// variables, which are scoped to the [`Language`] that minted them.
static CONSTANTS: Lazy<Mutex<HashMap<String, Arc<str>>>> = Lazy::new(|| Mutex::new(HashMap::new()));

fn intern_constant(name: &str) -> Arc<str> {
    let mut table = CONSTANTS.lock();
    table.entry(name.to_string()).or_insert_with(|| Arc::from(name)).clone()
}

/// Interns `name` and returns the canonical constant term for it. Two calls
/// with the same name, anywhere in the process, return terms that compare
/// equal.
pub fn constant(name: impl AsRef<str>) -> Term {
    Term::from_kind(TermKind::Constant(ConstantData {
        name: intern_constant(name.as_ref()),
    }))
}

/// A namespace for variable and constant identity.
///
/// Two [`Variable`]s are equal only if they were minted by the same
/// `Language` and share an id; two [`Constant`]s are equal only if they share
/// a `Language` and a name. Distinct `Language`s never collide, which is what
/// lets [`normalize_variables`] freshen a formula without risking capture.
#[derive(Clone)]
pub struct Language(Arc<LanguageInner>);

struct LanguageInner {
    id: u64,
    next_var_id: AtomicU64,
}

static NEXT_LANGUAGE_ID: AtomicU64 = AtomicU64::new(0);

impl Language {
    pub fn new() -> Self {
        Self(Arc::new(LanguageInner {
            id: NEXT_LANGUAGE_ID.fetch_add(1, Ordering::Relaxed),
            next_var_id: AtomicU64::new(0),
        }))
    }

    fn id(&self) -> u64 {
        self.0.id
    }

    /// Mints a fresh, never-before-seen variable in this language.
    pub fn fresh_variable(&self) -> Term {
        let id = self.0.next_var_id.fetch_add(1, Ordering::Relaxed);
        Term::from_kind(TermKind::Variable(VariableData {
            id,
            language: self.clone(),
        }))
    }

    /// Interns `name` globally and returns the canonical constant term for
    /// it. Equivalent to the free function [`constant`]; kept as a method so
    /// callers holding a `Language` don't need an extra import.
    pub fn constant(&self, name: impl AsRef<str>) -> Term {
        constant(name)
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Language {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
impl Eq for Language {}

impl std::hash::Hash for Language {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Language({})", self.id())
    }
}

#[derive(Clone)]
struct VariableData {
    id: u64,
    language: Language,
}

impl PartialEq for VariableData {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.language == other.language
    }
}
impl Eq for VariableData {}
impl std::hash::Hash for VariableData {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.language.hash(state);
    }
}
impl fmt::Debug for VariableData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "?v{}@{}", self.id, self.language.id())
    }
}

#[derive(Clone)]
struct ConstantData {
    name: Arc<str>,
}

impl PartialEq for ConstantData {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.name, &other.name)
    }
}
impl Eq for ConstantData {}
impl std::hash::Hash for ConstantData {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}
impl fmt::Debug for ConstantData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A host value lifted into term space.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Wrapped {
    Int(i64),
    Bool(bool),
    Str(String),
}

impl fmt::Display for Wrapped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Wrapped::Int(i) => write!(f, "{i}"),
            Wrapped::Bool(b) => write!(f, "{b}"),
            Wrapped::Str(s) => write!(f, "{s:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum TermKind {
    Variable(VariableData),
    Constant(ConstantData),
    Wrapper(Wrapped),
    Expression(Arc<[Term]>),
}

/// Element of the logic universe: a variable, a constant, a wrapped host
/// value, or a compound expression over further terms.
///
/// `Term` is cheap to clone (an `Arc` internally); expressions never share
/// mutable state and are never mutated once built.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Term(Arc<TermKind>);

impl Term {
    fn from_kind(kind: TermKind) -> Self {
        Term(Arc::new(kind))
    }

    pub fn expression(children: impl IntoIterator<Item = Term>) -> Term {
        Term::from_kind(TermKind::Expression(children.into_iter().collect()))
    }

    pub fn wrap(value: Wrapped) -> Term {
        Term::from_kind(TermKind::Wrapper(value))
    }

    pub fn int(value: i64) -> Term {
        Term::wrap(Wrapped::Int(value))
    }

    pub fn string(value: impl Into<String>) -> Term {
        Term::wrap(Wrapped::Str(value.into()))
    }

    pub fn as_variable(&self) -> Option<VariableRef<'_>> {
        match &*self.0 {
            TermKind::Variable(v) => Some(VariableRef(v)),
            _ => None,
        }
    }

    pub fn is_variable(&self) -> bool {
        matches!(&*self.0, TermKind::Variable(_))
    }

    pub fn as_constant_name(&self) -> Option<&str> {
        match &*self.0 {
            TermKind::Constant(c) => Some(&c.name),
            _ => None,
        }
    }

    pub fn as_wrapped(&self) -> Option<&Wrapped> {
        match &*self.0 {
            TermKind::Wrapper(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_expression(&self) -> Option<&[Term]> {
        match &*self.0 {
            TermKind::Expression(children) => Some(children),
            _ => None,
        }
    }

    /// The language a variable belongs to, if this term is a variable.
    pub fn variable_language(&self) -> Option<Language> {
        match &*self.0 {
            TermKind::Variable(v) => Some(v.language.clone()),
            _ => None,
        }
    }

    /// True if `needle` occurs (structurally, by identity for variables)
    /// anywhere inside `self`. Used by the occurs check.
    pub fn contains_variable(&self, needle: &Term) -> bool {
        if self == needle {
            return true;
        }
        match &*self.0 {
            TermKind::Expression(children) => children.iter().any(|c| c.contains_variable(needle)),
            _ => false,
        }
    }
}

/// Borrowed view of a variable, exposing its language without cloning it.
pub struct VariableRef<'a>(&'a VariableData);

impl<'a> VariableRef<'a> {
    pub fn language(&self) -> Language {
        self.0.language.clone()
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            TermKind::Variable(v) => write!(f, "?v{}", v.id),
            TermKind::Constant(c) => write!(f, "{}", c.name),
            TermKind::Wrapper(w) => write!(f, "{w}"),
            TermKind::Expression(children) => {
                write!(f, "(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{child}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Maps each distinct source variable encountered during a normalization to
/// the fresh variable that replaced it.
pub type NormalizationMapping = HashMap<Term, Term>;

/// Produces a structurally identical copy of `term` in which every variable
/// has been replaced by a fresh variable of `language`; the same source
/// variable always maps to the same fresh variable within one call.
pub fn normalize_variables(term: &Term, language: &Language) -> (Term, NormalizationMapping) {
    let mut mapping = NormalizationMapping::new();
    let normalized = normalize_into(term, language, &mut mapping);
    (normalized, mapping)
}

fn normalize_into(term: &Term, language: &Language, mapping: &mut NormalizationMapping) -> Term {
    match &*term.0 {
        TermKind::Variable(_) => mapping
            .entry(term.clone())
            .or_insert_with(|| language.fresh_variable())
            .clone(),
        TermKind::Expression(children) => {
            Term::expression(children.iter().map(|c| normalize_into(c, language, mapping)))
        }
        _ => term.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constants_are_interned_globally() {
        let a = Language::new();
        let b = Language::new();
        assert_eq!(a.constant("cat-term-test"), b.constant("cat-term-test"));
    }

    #[test]
    fn constants_with_different_names_are_distinct() {
        assert_ne!(constant("cat-term-test-a"), constant("cat-term-test-b"));
    }

    #[test]
    fn fresh_variables_are_pairwise_distinct() {
        let lang = Language::new();
        let v1 = lang.fresh_variable();
        let v2 = lang.fresh_variable();
        assert_ne!(v1, v2);
        assert_eq!(v1, v1.clone());
    }

    #[test]
    fn normalize_variables_is_a_consistent_bijection() {
        let lang = Language::new();
        let target = Language::new();
        let v1 = lang.fresh_variable();
        let v2 = lang.fresh_variable();
        let cat = lang.constant("cat");
        let term = Term::expression([v1.clone(), cat.clone(), v1.clone(), v2]);

        let (normalized, mapping) = normalize_variables(&term, &target);
        let children = normalized.as_expression().unwrap();
        assert_eq!(children[0], children[2], "same source variable maps consistently");
        assert_ne!(children[0], children[3], "distinct source variables stay distinct");
        assert_eq!(children[1], cat, "non-variables pass through unchanged");
        assert_eq!(mapping.len(), 2);
    }

    #[test]
    fn contains_variable_is_structural() {
        let lang = Language::new();
        let v = lang.fresh_variable();
        let cat = lang.constant("cat");
        let expr = Term::expression([cat.clone(), Term::expression([v.clone()])]);
        assert!(expr.contains_variable(&v));
        assert!(!expr.contains_variable(&lang.fresh_variable()));
    }
}
