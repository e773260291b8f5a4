//! Truncated polynomials and the 0/1 coefficient masks they are built from.
//!
//! The coefficient of degree `d` of an item's polynomial is the number of ways
//! of picking exactly `d` copies of that item. Copies of an item are
//! indistinguishable, so this is 1 if `d` copies are allowed and 0 otherwise,
//! i.e. the polynomial of a single item is fully described by a
//! [CoefficientMask]. Multiplying the polynomials of all items gives the
//! generating function of the whole collection.
//!
//! Coefficients saturate at `u64::MAX` instead of wrapping. All coefficients
//! are non-negative, so a saturated product still holds `min(exact, u64::MAX)`
//! at every degree.

use std::{fmt, ops::Range};

use bitvec::prelude::*;
use itertools::Itertools;

/// The largest number of coefficients a [Polynomial] or [CoefficientMask] can
/// hold.
pub const MAX_LEN: usize = isize::MAX as usize / std::mem::size_of::<u64>();

/// The set of allowed counts `0..len` for one item.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CoefficientMask {
    bits: BitVec,
}

impl CoefficientMask {
    /// A mask of length `len` allowing every count.
    pub fn full(len: usize) -> Self {
        Self {
            bits: BitVec::repeat(true, len),
        }
    }

    /// A mask of length `len` allowing the counts `p` for which `pred(p)` holds.
    pub fn from_fn(len: usize, pred: impl Fn(usize) -> bool) -> Self {
        Self {
            bits: (0..len).map(pred).collect(),
        }
    }

    /// The number of counts covered by the mask, i.e. the largest count plus one.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether the mask covers no count at all.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Whether `count` copies are allowed. False beyond the mask length.
    pub fn allows(&self, count: usize) -> bool {
        self.bits.get(count).map_or(false, |b| *b)
    }

    /// Iterate over the allowed counts in increasing order.
    pub fn allowed(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    /// Disallow every count in `range`.
    ///
    /// The range is clamped to the mask: positions past the end are ignored.
    pub fn forbid(&mut self, range: Range<usize>) {
        let end = range.end.min(self.len());
        let start = range.start.min(end);
        self.bits[start..end].fill(false);
    }

    /// Disallow a single count, if within the mask.
    pub fn forbid_one(&mut self, count: usize) {
        if count < self.len() {
            self.bits.set(count, false);
        }
    }

    /// Disallow every count except the listed ones.
    pub fn keep_only(&mut self, counts: impl IntoIterator<Item = usize>) {
        let mut keep = BitVec::<usize, Lsb0>::repeat(false, self.len());
        for count in counts.into_iter().filter(|&c| c < self.len()) {
            keep.set(count, true);
        }
        self.bits &= keep.as_bitslice();
    }

    /// Restrict to counts allowed by both masks.
    ///
    /// Positions of `self` past the end of `other` are left unchanged; masks
    /// intersected by the engine always have equal lengths.
    pub fn intersect(&mut self, other: &CoefficientMask) {
        let len = self.len().min(other.len());
        self.bits[..len] &= &other.bits[..len];
    }

    /// The polynomial with a coefficient 1 at every allowed count.
    pub fn to_polynomial(&self) -> Polynomial {
        Polynomial::new(self.bits.iter().by_vals().map(u64::from).collect())
    }
}

impl fmt::Debug for CoefficientMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bits = self.bits.iter().by_vals().map(u8::from).join("");
        write!(f, "Mask[{bits}]")
    }
}

/// A polynomial with non-negative integer coefficients, stored densely by
/// increasing degree.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polynomial(Vec<u64>);

impl Polynomial {
    /// Create a polynomial from its coefficients, by increasing degree.
    pub fn new(coefficients: Vec<u64>) -> Self {
        Self(coefficients)
    }

    /// The constant polynomial 1, neutral for [Polynomial::convolve].
    pub fn one() -> Self {
        Self(vec![1])
    }

    /// The polynomial `1 + x + ... + x^(len - 1)`.
    pub fn ones(len: usize) -> Self {
        Self(vec![1; len])
    }

    /// The coefficients, by increasing degree.
    pub fn coefficients(&self) -> &[u64] {
        &self.0
    }

    /// The number of stored coefficients.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no coefficient is stored (the zero polynomial).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The coefficient of `x^degree`; zero past the stored coefficients.
    pub fn coefficient(&self, degree: usize) -> u64 {
        self.0.get(degree).copied().unwrap_or(0)
    }

    /// Multiply two polynomials.
    ///
    /// The result has `self.len() + other.len() - 1` coefficients, with
    /// `c[d] = sum(a[i] * b[d - i])`.
    pub fn convolve(&self, other: &Polynomial) -> Polynomial {
        self.convolve_truncated(other, usize::MAX)
    }

    /// Multiply two polynomials, keeping only the coefficients of degree
    /// below `len`.
    pub fn convolve_truncated(&self, other: &Polynomial, len: usize) -> Polynomial {
        if self.is_empty() || other.is_empty() {
            return Polynomial::new(Vec::new());
        }
        let len = (self.len() + other.len() - 1).min(len);
        let mut product = vec![0u64; len];
        for (i, &a) in self.0.iter().enumerate().take(len) {
            if a == 0 {
                continue;
            }
            for (j, &b) in other.0.iter().enumerate().take(len - i) {
                product[i + j] = product[i + j].saturating_add(a.saturating_mul(b));
            }
        }
        Polynomial(product)
    }

    /// Multiply a sequence of polynomials, starting from [Polynomial::one].
    pub fn product<'a>(polynomials: impl IntoIterator<Item = &'a Polynomial>) -> Polynomial {
        Self::product_truncated(polynomials, usize::MAX)
    }

    /// Multiply a sequence of polynomials, keeping only the coefficients of
    /// degree below `len`.
    pub fn product_truncated<'a>(
        polynomials: impl IntoIterator<Item = &'a Polynomial>,
        len: usize,
    ) -> Polynomial {
        let mut one = Polynomial::one();
        one.0.truncate(len);
        polynomials
            .into_iter()
            .fold(one, |acc, p| acc.convolve_truncated(p, len))
    }

    /// Whether the coefficient of `x^degree` reached `u64::MAX`, and so may
    /// stand for a larger value.
    pub fn is_saturated(&self, degree: usize) -> bool {
        self.coefficient(degree) == u64::MAX
    }
}

impl From<Vec<u64>> for Polynomial {
    fn from(coefficients: Vec<u64>) -> Self {
        Self::new(coefficients)
    }
}
