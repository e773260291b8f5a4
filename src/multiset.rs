//! A multiset of named items, and the counting queries it answers.

use std::collections::{btree_map, BTreeMap};

use thiserror::Error;
use tracing::debug;

use crate::{
    constraint::{compile, CompileError, ConstraintError, UnsupportedFeature},
    engine::{ConstraintEngine, EngineError},
};

/// A collection of items, each available in a bounded number of copies.
///
/// Copies of the same item are indistinguishable. Every item present has a
/// positive count, and the total number of copies fits in a `usize`.
///
/// ## Example
///
/// ```
/// use molloy::Multiset;
///
/// let bag: Multiset = "aabbbc".chars().map(String::from).collect();
/// assert_eq!(bag.get("b"), 3);
/// assert_eq!(bag.total(), 6);
/// // Collections of 3 items with no `b`: only {a, a, c}
/// assert_eq!(bag.count_collections(Some(3), Some("b == 0")).unwrap(), 1);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Multiset {
    counts: BTreeMap<String, usize>,
}

/// The multiplicity table of a [Multiset] is invalid.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidMultiset {
    /// Counts must be positive integers
    #[error("Item {0} has count zero, counts must be positive integers")]
    ZeroCount(String),
    /// The total number of copies must fit in a `usize`
    #[error("Total number of items is too large")]
    TotalTooLarge,
}

/// Errors returned by counting queries.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum CountError {
    /// The query uses a feature that is not yet supported
    #[error(transparent)]
    Unsupported(#[from] UnsupportedFeature),
    /// The constraints could not be understood
    #[error(transparent)]
    Constraint(#[from] ConstraintError),
    /// The item table is invalid
    #[error(transparent)]
    InvalidMultiset(#[from] InvalidMultiset),
    /// The collection size is too large to count collections of that size
    #[error("Collection size {0} is too large")]
    SizeTooLarge(usize),
    /// The number of collections does not fit in a `u64`
    #[error("The number of collections of size {0} does not fit in 64 bits")]
    Overflow(usize),
}

impl From<EngineError> for CountError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::SizeTooLarge(size) => CountError::SizeTooLarge(size),
            EngineError::Overflow(size) => CountError::Overflow(size),
        }
    }
}

impl From<CompileError> for CountError {
    fn from(e: CompileError) -> Self {
        match e {
            CompileError::Unsupported(feature) => CountError::Unsupported(feature),
            CompileError::Malformed(error) => CountError::Constraint(error),
        }
    }
}

impl CountError {
    /// Whether the error signals a missing feature rather than a bad input.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, CountError::Unsupported(_))
    }
}

impl Multiset {
    /// An empty multiset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a multiset from `(item, count)` pairs.
    ///
    /// Counts of repeated items are added up. Fails if any count is zero, or
    /// if the counts add up to more than `usize::MAX`.
    pub fn from_counts<S: Into<String>>(
        counts: impl IntoIterator<Item = (S, usize)>,
    ) -> Result<Self, InvalidMultiset> {
        let mut multiset = Self::new();
        let mut total = 0usize;
        for (item, count) in counts {
            let item = item.into();
            if count == 0 {
                return Err(InvalidMultiset::ZeroCount(item));
            }
            total = total
                .checked_add(count)
                .ok_or(InvalidMultiset::TotalTooLarge)?;
            // bounded by `total`
            *multiset.counts.entry(item).or_default() += count;
        }
        Ok(multiset)
    }

    /// The number of copies of `item`, zero if absent.
    pub fn get(&self, item: &str) -> usize {
        self.counts.get(item).copied().unwrap_or(0)
    }

    /// The number of distinct items.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether there are no items.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The total number of copies of all items.
    pub fn total(&self) -> usize {
        self.counts
            .values()
            .fold(0, |total, &count| total.saturating_add(count))
    }

    /// Iterate over `(item, count)` pairs, ordered by item name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.counts.iter().map(|(item, &count)| (item.as_str(), count))
    }

    /// Count the sub-collections of a given size that satisfy the constraints.
    ///
    /// `size` defaults to [Multiset::total]. `constraints` is a conjunction of
    /// constraints on item counts, such as `"red % 2 == 0 and blue >= 2"`; see
    /// [crate::constraint] for the supported syntax. Newlines in `constraints`
    /// are treated as spaces.
    ///
    /// Items mentioned in the constraints but absent from the multiset are
    /// treated as available in any number of copies.
    ///
    /// Fails with [CountError::Overflow] if the count does not fit in a `u64`,
    /// and with [CountError::SizeTooLarge] if `size` is too large to allocate
    /// the coefficients of the constrained items absent from the multiset.
    pub fn count_collections(
        &self,
        size: Option<usize>,
        constraints: Option<&str>,
    ) -> Result<u64, CountError> {
        let size = size.unwrap_or_else(|| self.total());
        let constraints = compile(constraints.unwrap_or_default())?;
        debug!(
            items = self.len(),
            size,
            constraints = %constraints,
            "counting collections"
        );

        let total = self.total();
        if size > total && constraints.items().all(|item| self.counts.contains_key(item)) {
            debug!(size, total, "collections larger than the multiset");
            return Ok(0);
        }

        let mut engine = ConstraintEngine::new(self.iter(), size)?;
        engine.apply_all(&constraints);
        let count = engine.solution()?;

        debug!(count, "counted collections");
        Ok(count)
    }

    /// Count the sequences of a given size. Not yet supported.
    pub fn count_sequences(&self, _size: usize) -> Result<u64, CountError> {
        Err(UnsupportedFeature::SequenceCounting.into())
    }

    /// Count the partitions into groups of a given size. Not yet supported.
    pub fn count_partitions(&self, _size: usize) -> Result<u64, CountError> {
        Err(UnsupportedFeature::PartitionCounting.into())
    }
}

/// Count the collections of `size` items satisfying `constraints`, given the
/// maximum count of every item.
///
/// Shorthand for building a [Multiset] and calling
/// [Multiset::count_collections].
pub fn count_collections<S: Into<String>>(
    items: impl IntoIterator<Item = (S, usize)>,
    size: usize,
    constraints: &str,
) -> Result<u64, CountError> {
    Multiset::from_counts(items)?.count_collections(Some(size), Some(constraints))
}

impl<S: Into<String>> FromIterator<S> for Multiset {
    /// Count the occurrences of every item.
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut multiset = Self::new();
        for item in iter {
            *multiset.counts.entry(item.into()).or_default() += 1;
        }
        multiset
    }
}

impl<'a> IntoIterator for &'a Multiset {
    type Item = (&'a String, &'a usize);
    type IntoIter = btree_map::Iter<'a, String, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.iter()
    }
}

impl TryFrom<BTreeMap<String, usize>> for Multiset {
    type Error = InvalidMultiset;

    fn try_from(counts: BTreeMap<String, usize>) -> Result<Self, Self::Error> {
        Self::from_counts(counts)
    }
}
