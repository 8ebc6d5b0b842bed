//! Error type shared by the sorter, the permutation applier and the matched sort entry points.

use std::convert::Infallible;
use thiserror::Error;

/// Errors reported by matched sorting.
///
/// `E` is the error type of a fallible comparator. Infallible entry points use the
/// default `Infallible`, so `Comparator` can never be constructed for them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatchError<E = Infallible> {
    /// The data and order sequences (or the data and the permutation) differ in length.
    #[error("length mismatch: data has {data} elements but order has {order}")]
    LengthMismatch { data: usize, order: usize },

    /// A caller supplied permutation is not a bijection on `0..n`.
    #[error("invalid permutation at position {index}: {reason}")]
    InvalidPermutation { index: usize, reason: &'static str },

    /// An [`IndexSortConfig`](crate::timsort::IndexSortConfig) value is out of range.
    #[error("invalid sort configuration: {0}")]
    InvalidConfig(&'static str),

    /// The comparator failed. The data sequence has not been touched.
    #[error("comparator failed: {0}")]
    Comparator(E),
}

/// Result alias used throughout the crate.
pub type MatchResult<T, E = Infallible> = Result<T, MatchError<E>>;

impl MatchError<Infallible> {
    /// Widens an infallible error into one carrying a comparator error type.
    pub fn widen<E>(self) -> MatchError<E> {
        match self {
            MatchError::LengthMismatch { data, order } => MatchError::LengthMismatch { data, order },
            MatchError::InvalidPermutation { index, reason } => {
                MatchError::InvalidPermutation { index, reason }
            }
            MatchError::InvalidConfig(msg) => MatchError::InvalidConfig(msg),
            MatchError::Comparator(never) => match never {},
        }
    }
}
