#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

pub mod constraint;
pub mod engine;
pub mod multiset;
pub mod polynomial;
#[cfg(feature = "serde")]
pub mod query;

pub use constraint::{
    compile, AtomicConstraint, CmpOp, CompileError, ConstraintError, ConstraintSet,
    UnsupportedFeature,
};
pub use engine::{ConstraintEngine, EngineError};
pub use multiset::{count_collections, CountError, InvalidMultiset, Multiset};
pub use polynomial::{CoefficientMask, Polynomial};
#[cfg(feature = "serde")]
pub use query::{CountQuery, QueryError};

pub(crate) type HashMap<K, V> = rustc_hash::FxHashMap<K, V>;
