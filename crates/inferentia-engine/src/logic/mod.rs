//! Pure, deterministic term-rewriting layer: the term model, substitutions,
//! unification, the abstruse index and logical connectives. Nothing in this
//! module talks to I/O, async runtimes or storage.

pub mod codec;
pub mod index;
pub mod ops;
pub mod substitution;
pub mod term;

pub use codec::{decode_term, encode_key, encode_term};
pub use index::{make_key, Key, VecAbstruseIndex};
pub use ops::{as_implies, as_not, implies, not};
pub use substitution::{unify, Substitution};
pub use term::{constant, normalize_variables, Language, NormalizationMapping, Term, Wrapped};
