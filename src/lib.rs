//! # Matchsort
//!
//! `matchsort` reorders one sequence by the sorted order of another. Given a `data` sequence and
//! a same-length `order` sequence, it computes the stable permutation that sorts `order` and
//! applies exactly that permutation to `data`, in place. The elements of `data` are only moved:
//! they need not be comparable, cloneable or defaultable.
//!
//! ## Key Features
//!
//! - **Stable**: positions whose keys compare equal keep their original relative order. Keys
//!   are sorted with a TimSort over positions, which is O(n) on presorted input and
//!   O(n log n) in the worst case.
//! - **Comparator-driven**: order by natural key order, by a key comparator, by a fallible key
//!   comparator, or by a comparator over positions ([`sort_matched_by_index`]).
//! - **In-place application**: small inputs are permuted through bounded recursion without any
//!   heap buffer, large inputs through a single scratch buffer (see [`permute`]).
//! - **Fail-fast**: length mismatches and comparator errors are reported before `data` is
//!   touched.
//!
//! ## Usage
//!
//! ### Basic Usage
//!
//! ```rust
//! use matchsort::sort_matched;
//!
//! let mut data = vec!['g', 'i', 'j', 'h', 'e', 'a', 'c', 'd', 'b', 'f'];
//! let order = [6, 8, 9, 7, 4, 0, 2, 3, 1, 5];
//! sort_matched(&mut data, &order).unwrap();
//!
//! assert_eq!(data, vec!['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j']);
//! ```
//!
//! ### Custom Orders
//!
//! To order by keys that live somewhere else, implement the [`OrderSource`] trait.
//!
//! ```rust
//! use matchsort::{sort_matched, OrderSource};
//! use std::cmp::Ordering;
//!
//! // Keys are the lengths of the names, longest first.
//! struct ByLengthDesc<'a>(&'a [&'a str]);
//!
//! impl OrderSource for ByLengthDesc<'_> {
//!     fn compare(&self, i: usize, j: usize) -> Ordering {
//!         self.0[j].len().cmp(&self.0[i].len())
//!     }
//!
//!     fn len(&self) -> usize {
//!         self.0.len()
//!     }
//! }
//!
//! let names = ["ann", "beatrice", "cy"];
//! let mut ids = vec![1, 2, 3];
//! sort_matched(&mut ids, &ByLengthDesc(&names)).unwrap();
//!
//! assert_eq!(ids, vec![2, 1, 3]);
//! ```
//!
//! ## Performance Characteristics
//!
//! - **Best Case**: O(N) comparisons when the order sequence is already sorted or consists of a
//!   few runs.
//! - **Worst Case**: O(N log N) comparisons.
//! - **Memory Overhead**: one `usize` per element for the permutation, up to half that again for
//!   merging, plus either bounded stack frames or one element buffer when applying.

pub mod algo;
pub mod core;
pub mod error;
pub mod permute;
pub mod timsort;

pub use crate::algo::{
    MatchedSort, sort_both, sort_matched, sort_matched_by, sort_matched_by_index,
    sort_matched_f32, sort_matched_f64, sorted_indices, try_sort_matched_by,
};
pub use crate::core::{MatchedData, OrderSource};
pub use crate::error::{MatchError, MatchResult};
pub use crate::permute::{PermuteStrategy, apply_permutation, apply_permutation_with};
pub use crate::timsort::{
    IndexSortConfig, stable_sort_indices, stable_sort_indices_with, try_stable_sort_indices,
    try_stable_sort_indices_with,
};

pub mod prelude {
    pub use crate::algo::{MatchedSort, sort_both, sort_matched, sort_matched_by};
    pub use crate::core::{MatchedData, OrderSource};
    pub use crate::error::{MatchError, MatchResult};
    pub use crate::permute::apply_permutation;
    pub use crate::timsort::stable_sort_indices;
}
