//! Constraints on the number of copies of an item in a collection.
//!
//! A constraint string such as `"red % 2 == 0 and blue >= 2"` is compiled into
//! a [ConstraintSet]: an ordered list of [AtomicConstraint]s, each restricting
//! the count of exactly one named item. Three shapes are recognised:
//!
//! 1. Orderings, `item op n` or `n op item`, with `op` one of `==`, `!=`, `<`,
//!    `<=`, `>`, `>=`. The second form is normalised to the first by flipping
//!    the operator, so `3 < x` is stored as `x > 3`.
//! 2. Memberships, `item in [a, b, ...]` and `item not in (a, b, ...)`.
//! 3. Residues, `item % m op r`, comparing the count modulo `m` against `r`.
//!
//! Only conjunctions (`and`) of such constraints are accepted. Disjunctions and
//! chained comparisons are reported as [UnsupportedFeature]s, anything else as a
//! [ConstraintError].

mod lexer;
mod parser;
#[cfg(any(test, feature = "proptest"))]
pub mod proptest;

use std::fmt;

use derive_more::Display;
use itertools::Itertools;
use smallvec::SmallVec;
use thiserror::Error;

/// Compile a constraint string into a set of atomic constraints.
///
/// An empty (or whitespace-only) string compiles to the empty set. Newlines
/// are treated like any other whitespace.
///
/// Fails with [CompileError::Unsupported] for constructs that are recognised
/// but not implemented (disjunction, operator chaining) and with
/// [CompileError::Malformed] for anything that cannot be understood.
pub fn compile(text: &str) -> Result<ConstraintSet, CompileError> {
    parser::parse(text)
}

/// A relational operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CmpOp {
    /// `==`
    #[display(fmt = "==")]
    Eq,
    /// `!=`
    #[display(fmt = "!=")]
    NotEq,
    /// `<`
    #[display(fmt = "<")]
    Lt,
    /// `<=`
    #[display(fmt = "<=")]
    LtE,
    /// `>`
    #[display(fmt = ">")]
    Gt,
    /// `>=`
    #[display(fmt = ">=")]
    GtE,
}

impl CmpOp {
    /// All six operators.
    pub const ALL: [CmpOp; 6] = [
        CmpOp::Eq,
        CmpOp::NotEq,
        CmpOp::Lt,
        CmpOp::LtE,
        CmpOp::Gt,
        CmpOp::GtE,
    ];

    /// The operator obtained by swapping the operands.
    ///
    /// `a op b` holds if and only if `b op.flip() a` holds.
    pub fn flip(self) -> Self {
        use CmpOp::*;

        match self {
            Eq => Eq,
            NotEq => NotEq,
            Lt => Gt,
            LtE => GtE,
            Gt => Lt,
            GtE => LtE,
        }
    }

    /// Evaluate `lhs op rhs`.
    pub fn holds(self, lhs: usize, rhs: usize) -> bool {
        use CmpOp::*;

        match self {
            Eq => lhs == rhs,
            NotEq => lhs != rhs,
            Lt => lhs < rhs,
            LtE => lhs <= rhs,
            Gt => lhs > rhs,
            GtE => lhs >= rhs,
        }
    }
}

/// A single constraint on the number of copies of one item.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AtomicConstraint {
    /// `item op bound`
    Ordering {
        /// The constrained item
        item: String,
        /// The comparison, with the item on the left-hand side
        op: CmpOp,
        /// The right-hand side
        bound: usize,
    },
    /// `item in values` if `positive`, else `item not in values`.
    Membership {
        /// The constrained item
        item: String,
        /// Whether the count must be in (true) or outside (false) of `values`
        positive: bool,
        /// The listed counts, in the order they were written
        values: SmallVec<[usize; 4]>,
    },
    /// `item % modulus op remainder`
    Modulo {
        /// The constrained item
        item: String,
        /// Non-zero modulus
        modulus: usize,
        /// The comparison applied to the residue
        op: CmpOp,
        /// The right-hand side
        remainder: usize,
    },
}

impl AtomicConstraint {
    /// The item whose count is constrained.
    pub fn item(&self) -> &str {
        match self {
            AtomicConstraint::Ordering { item, .. }
            | AtomicConstraint::Membership { item, .. }
            | AtomicConstraint::Modulo { item, .. } => item,
        }
    }

    /// Whether a count of `n` copies satisfies the constraint.
    pub fn allows(&self, n: usize) -> bool {
        match self {
            &AtomicConstraint::Ordering { op, bound, .. } => op.holds(n, bound),
            AtomicConstraint::Membership {
                positive, values, ..
            } => values.contains(&n) == *positive,
            &AtomicConstraint::Modulo {
                modulus,
                op,
                remainder,
                ..
            } => op.holds(n % modulus, remainder),
        }
    }
}

impl fmt::Display for AtomicConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtomicConstraint::Ordering { item, op, bound } => write!(f, "{item} {op} {bound}"),
            AtomicConstraint::Membership {
                item,
                positive,
                values,
            } => {
                let keyword = if *positive { "in" } else { "not in" };
                write!(f, "{item} {keyword} [{}]", values.iter().join(", "))
            }
            AtomicConstraint::Modulo {
                item,
                modulus,
                op,
                remainder,
            } => write!(f, "{item} % {modulus} {op} {remainder}"),
        }
    }
}

/// An ordered conjunction of atomic constraints.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintSet(Vec<AtomicConstraint>);

impl ConstraintSet {
    /// Create a constraint set from its atomic constraints.
    pub fn new(constraints: Vec<AtomicConstraint>) -> Self {
        Self(constraints)
    }

    /// The number of atomic constraints.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set imposes no constraint at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the atomic constraints, in the order they were written.
    pub fn iter(&self) -> std::slice::Iter<'_, AtomicConstraint> {
        self.0.iter()
    }

    /// The names of all constrained items, without repetition.
    pub fn items(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(|c| c.item()).unique()
    }
}

impl FromIterator<AtomicConstraint> for ConstraintSet {
    fn from_iter<I: IntoIterator<Item = AtomicConstraint>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ConstraintSet {
    type Item = AtomicConstraint;
    type IntoIter = std::vec::IntoIter<AtomicConstraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ConstraintSet {
    type Item = &'a AtomicConstraint;
    type IntoIter = std::slice::Iter<'a, AtomicConstraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(" and "))
    }
}

/// Constructs that are understood but intentionally not implemented.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum UnsupportedFeature {
    /// `a == 1 or b == 2`
    #[error("Disjunction is not yet supported")]
    Disjunction,
    /// `3 < a <= 10`
    #[error("Operator chaining is not yet supported")]
    OperatorChaining,
    /// Counting ordered arrangements
    #[error("Counting sequences is not yet supported")]
    SequenceCounting,
    /// Counting splits into groups
    #[error("Counting partitions is not yet supported")]
    PartitionCounting,
}

/// Errors for constraint strings that cannot be understood.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConstraintError {
    /// A character outside of the constraint language
    #[error("Unexpected character {found:?} at offset {offset}")]
    UnexpectedChar {
        /// The offending character
        found: char,
        /// Byte offset in the constraint string
        offset: usize,
    },
    /// An integer literal that does not fit a `usize`
    #[error("Integer literal {0} is too large")]
    IntegerTooLarge(String),
    /// A token in a position where it makes no sense
    #[error("Unexpected {found} at offset {offset}")]
    UnexpectedToken {
        /// Description of the token
        found: String,
        /// Byte offset in the constraint string
        offset: usize,
    },
    /// The string ended in the middle of a constraint
    #[error("Unexpected end of constraint string")]
    UnexpectedEnd,
    /// A well-formed comparison that is not one of the supported shapes
    #[error("Constraint not understood: {0}")]
    NotUnderstood(String),
    /// A residue constraint modulo zero
    #[error("Modulus must be non-zero: {0}")]
    ZeroModulus(String),
}

/// Errors returned by [compile].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum CompileError {
    /// The constraint uses a feature that is not yet supported.
    #[error(transparent)]
    Unsupported(#[from] UnsupportedFeature),
    /// The constraint could not be understood.
    #[error(transparent)]
    Malformed(#[from] ConstraintError),
}
