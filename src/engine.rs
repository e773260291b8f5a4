//! Turn atomic constraints into per-item coefficient masks and multiply them.
//!
//! The engine keeps one [CoefficientMask] per item. Every constraint is
//! compiled into a fresh mask of the same length that allows exactly the
//! counts satisfying it, which is then intersected into the item's running
//! mask. Constraints only ever remove allowed counts, so for a given item the
//! final mask does not depend on the order in which its constraints were
//! applied, and applying a constraint twice is the same as applying it once:
//!
//! ```text
//!     [1, 1, 1, 1, 1, 1]   initial mask, 5 copies available
//!     [1, 1, 1, 0, 0, 1]   item not in [3, 4]
//!     [1, 1, 0, 0, 0, 0]   item < 2
//!     [0, 1, 0, 0, 0, 0]   item != 0
//! ```

use itertools::Itertools;
use thiserror::Error;
use tracing::trace;

use crate::{
    constraint::{AtomicConstraint, CmpOp, ConstraintSet},
    polynomial::{CoefficientMask, Polynomial, MAX_LEN},
    HashMap,
};

/// Errors raised by the [ConstraintEngine].
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum EngineError {
    /// The collection size does not leave room for a coefficient array
    #[error("Collection size {0} is too large")]
    SizeTooLarge(usize),
    /// The number of collections does not fit in a `u64`
    #[error("The number of collections of size {0} does not fit in 64 bits")]
    Overflow(usize),
}

/// Builds the generating function of the collections satisfying a set of
/// constraints.
///
/// ## Example
///
/// ```
/// use molloy::{compile, ConstraintEngine};
///
/// let mut engine = ConstraintEngine::new([("red", 5), ("blue", 5)], 6)?;
/// engine.apply_all(&compile("red != 3").unwrap());
/// assert_eq!(engine.solution()?, 4);
/// # Ok::<(), molloy::EngineError>(())
/// ```
#[derive(Clone, Debug)]
pub struct ConstraintEngine {
    masks: HashMap<String, CoefficientMask>,
    max_degree: usize,
}

impl ConstraintEngine {
    /// Create an engine for items with the given maximum counts, counting
    /// collections of size `max_degree`.
    ///
    /// Every item starts with all counts from zero up to its maximum allowed.
    /// Counts above `max_degree` can never be part of a collection, so masks
    /// stop at `max_degree`.
    ///
    /// Fails if `max_degree + 1` coefficients cannot be stored.
    pub fn new<S: Into<String>>(
        items: impl IntoIterator<Item = (S, usize)>,
        max_degree: usize,
    ) -> Result<Self, EngineError> {
        if max_degree >= MAX_LEN {
            return Err(EngineError::SizeTooLarge(max_degree));
        }
        let masks = items
            .into_iter()
            .map(|(item, count)| {
                let len = count.min(max_degree) + 1;
                (item.into(), CoefficientMask::full(len))
            })
            .collect();
        Ok(Self { masks, max_degree })
    }

    /// The size of the collections being counted.
    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    /// The current mask of allowed counts for `item`, if it is known.
    pub fn mask(&self, item: &str) -> Option<&CoefficientMask> {
        self.masks.get(item)
    }

    /// Restrict the allowed counts of the constrained item.
    ///
    /// An item that was not part of the initial table is added on the fly,
    /// with every count up to `max_degree` allowed.
    pub fn apply(&mut self, constraint: &AtomicConstraint) {
        let item = constraint.item();
        let len = self.max_degree + 1;
        let mask = self.masks.entry(item.to_string()).or_insert_with(|| {
            trace!(item = %item, len, "adding item from constraints");
            CoefficientMask::full(len)
        });
        mask.intersect(&constraint_mask(constraint, mask.len()));
        trace!(%constraint, ?mask, "applied constraint");
    }

    /// Apply every constraint of the set, in order.
    pub fn apply_all(&mut self, constraints: &ConstraintSet) {
        for constraint in constraints {
            self.apply(constraint);
        }
    }

    /// Multiply the polynomials of all items, up to degree `max_degree`.
    ///
    /// The coefficient of degree `d` is the number of collections of size `d`
    /// satisfying all applied constraints, saturated at `u64::MAX`. For an
    /// empty engine this is the constant polynomial 1: there is exactly one
    /// empty collection.
    pub fn power_series(&self) -> Polynomial {
        let polynomials = self
            .masks
            .iter()
            .sorted_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(item, mask)| {
                trace!(item = %item, ?mask, "multiplying");
                mask.to_polynomial()
            })
            .collect_vec();
        Polynomial::product_truncated(&polynomials, self.max_degree + 1)
    }

    /// The number of collections of size `max_degree` satisfying all applied
    /// constraints.
    ///
    /// Zero if no collection can be that large. Fails with
    /// [EngineError::Overflow] if the count is `u64::MAX` or more.
    pub fn solution(&self) -> Result<u64, EngineError> {
        let series = self.power_series();
        if series.is_saturated(self.max_degree) {
            return Err(EngineError::Overflow(self.max_degree));
        }
        Ok(series.coefficient(self.max_degree))
    }
}

/// The mask of length `len` allowing exactly the counts that satisfy
/// `constraint`.
fn constraint_mask(constraint: &AtomicConstraint, len: usize) -> CoefficientMask {
    let mut mask = CoefficientMask::full(len);
    match constraint {
        &AtomicConstraint::Ordering { op, bound, .. } => match op {
            CmpOp::Eq => mask.keep_only([bound]),
            CmpOp::NotEq => mask.forbid_one(bound),
            CmpOp::Gt => mask.forbid(0..bound.saturating_add(1)),
            CmpOp::GtE => mask.forbid(0..bound),
            CmpOp::Lt => mask.forbid(bound..len),
            CmpOp::LtE => mask.forbid(bound.saturating_add(1)..len),
        },
        AtomicConstraint::Membership {
            positive: true,
            values,
            ..
        } => mask.keep_only(values.iter().copied()),
        AtomicConstraint::Membership {
            positive: false,
            values,
            ..
        } => {
            for &value in values {
                mask.forbid_one(value);
            }
        }
        &AtomicConstraint::Modulo {
            modulus,
            op,
            remainder,
            ..
        } => mask = CoefficientMask::from_fn(len, |p| op.holds(p % modulus, remainder)),
    }
    mask
}
