//! Matched sort entry points.
//!
//! Every entry point follows the same three steps:
//! 1. Check that the data and order sequences have the same length. Nothing is mutated if not.
//! 2. Stable-sort the positions `0..n` by the order sequence ([`crate::timsort`]).
//! 3. Apply the resulting permutation to the data sequence ([`crate::permute`]).
//!
//! Because the permutation is computed on its own buffer before step 3 starts, a comparator
//! that fails or panics leaves the data sequence exactly as it was.
//!
//! The free functions use default settings. [`MatchedSort`] carries an explicit
//! [`IndexSortConfig`] and [`PermuteStrategy`].

use crate::core::{MatchedData, OrderSource, compare_f32, compare_f64};
use crate::error::{MatchError, MatchResult};
use crate::permute::{PermuteStrategy, apply_unchecked};
use crate::timsort::{IndexSortConfig, stable_sort_indices, timsort};
use std::cmp::Ordering;
use std::convert::Infallible;
use tracing::{debug, trace};

/// Sorts `data` by the natural order of the keys in `order`.
///
/// `order` is only read. After the call, `data[i]` holds the element whose key ranks `i`;
/// elements with equal keys keep their relative order. `Option` keys place `None` before
/// every `Some`.
///
/// # Errors
///
/// [`MatchError::LengthMismatch`] if `data` and `order` differ in length. `data` is left
/// untouched.
///
/// # Examples
///
/// ```
/// use matchsort::sort_matched;
///
/// let mut data = vec!['g', 'i', 'j', 'h', 'e', 'a', 'c', 'd', 'b', 'f'];
/// let order = [6, 8, 9, 7, 4, 0, 2, 3, 1, 5];
/// sort_matched(&mut data, &order).unwrap();
///
/// assert_eq!(data, vec!['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j']);
/// ```
pub fn sort_matched<D, O>(data: &mut D, order: &O) -> MatchResult<()>
where
    D: MatchedData + ?Sized,
    O: OrderSource + ?Sized,
{
    MatchedSort::new().sort(data, order)
}

/// Sorts `data` by the keys in `order`, compared with `cmp`.
pub fn sort_matched_by<D, K, F>(data: &mut D, order: &[K], cmp: F) -> MatchResult<()>
where
    D: MatchedData + ?Sized,
    F: FnMut(&K, &K) -> Ordering,
{
    MatchedSort::new().sort_by(data, order, cmp)
}

/// Sorts `data` by the keys in `order` with a comparator that may fail.
///
/// The first comparator error is returned as [`MatchError::Comparator`] and `data` is left
/// untouched.
pub fn try_sort_matched_by<D, K, E, F>(data: &mut D, order: &[K], cmp: F) -> MatchResult<(), E>
where
    D: MatchedData + ?Sized,
    F: FnMut(&K, &K) -> Result<Ordering, E>,
{
    MatchedSort::new().try_sort_by(data, order, cmp)
}

/// Sorts `data` with a comparator over positions.
///
/// `cmp(i, j)` decides whether the element originally at position `i` goes before the one
/// originally at position `j`.
///
/// Unlike the other entry points this cannot fail: there is no separate order sequence whose
/// length could disagree, and the default [`IndexSortConfig`] is always valid. Use
/// [`MatchedSort::sort_by_index`] for a custom configuration, which is validated.
///
/// ```
/// use matchsort::sort_matched_by_index;
///
/// let priority = [2, 0, 1];
/// let mut jobs = vec!["backup", "deploy", "test"];
/// sort_matched_by_index(&mut jobs, |i, j| priority[i].cmp(&priority[j]));
///
/// assert_eq!(jobs, vec!["deploy", "test", "backup"]);
/// ```
pub fn sort_matched_by_index<D, F>(data: &mut D, mut cmp: F)
where
    D: MatchedData + ?Sized,
    F: FnMut(usize, usize) -> Ordering,
{
    let idx = stable_sort_indices(data.item_count(), |i, j| cmp(i, j));
    // SAFETY: the sorter always returns a permutation of `0..data.item_count()`.
    unsafe { apply_unchecked(data.as_mut_items(), &idx, PermuteStrategy::Auto) };
}

/// Sorts `data` by `f64` keys. See [`compare_f64`] for the treatment of `-0.0` and NaN.
pub fn sort_matched_f64<D>(data: &mut D, order: &[f64]) -> MatchResult<()>
where
    D: MatchedData + ?Sized,
{
    sort_matched_by(data, order, |a, b| compare_f64(*a, *b))
}

/// Sorts `data` by `f32` keys. See [`compare_f32`].
pub fn sort_matched_f32<D>(data: &mut D, order: &[f32]) -> MatchResult<()>
where
    D: MatchedData + ?Sized,
{
    sort_matched_by(data, order, |a, b| compare_f32(*a, *b))
}

/// Sorts `order` and moves the elements of `data` along with their keys.
///
/// ```
/// use matchsort::sort_both;
///
/// let mut names = vec!["carol", "alice", "bob"];
/// let mut ages = vec![41, 29, 35];
/// sort_both(&mut names, &mut ages).unwrap();
///
/// assert_eq!(names, vec!["alice", "bob", "carol"]);
/// assert_eq!(ages, vec![29, 35, 41]);
/// ```
pub fn sort_both<T, K: Ord>(data: &mut [T], order: &mut [K]) -> MatchResult<()> {
    MatchedSort::new().sort_both(data, order)
}

/// Returns the stable permutation that sorts `order`, without moving anything.
///
/// ```
/// use matchsort::sorted_indices;
///
/// assert_eq!(sorted_indices(&["pear", "fig", "apple"]), vec![2, 1, 0]);
/// ```
pub fn sorted_indices<O>(order: &O) -> Vec<usize>
where
    O: OrderSource + ?Sized,
{
    stable_sort_indices(order.len(), |i, j| order.compare(i, j))
}

/// A configured matched sorter.
///
/// ```
/// use matchsort::{IndexSortConfig, MatchedSort, PermuteStrategy};
///
/// let sorter = MatchedSort::new()
///     .with_config(IndexSortConfig::new().with_min_merge(16))
///     .with_strategy(PermuteStrategy::Scratch);
///
/// let mut data = vec!["b", "c", "a"];
/// sorter.sort(&mut data, &[2, 3, 1]).unwrap();
/// assert_eq!(data, vec!["a", "b", "c"]);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchedSort {
    config: IndexSortConfig,
    strategy: PermuteStrategy,
}

impl MatchedSort {
    pub const fn new() -> Self {
        Self {
            config: IndexSortConfig::new(),
            strategy: PermuteStrategy::Auto,
        }
    }

    pub const fn with_config(mut self, config: IndexSortConfig) -> Self {
        self.config = config;
        self
    }

    pub const fn with_strategy(mut self, strategy: PermuteStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub const fn config(&self) -> &IndexSortConfig {
        &self.config
    }

    pub const fn strategy(&self) -> PermuteStrategy {
        self.strategy
    }

    /// See [`sort_matched`].
    pub fn sort<D, O>(&self, data: &mut D, order: &O) -> MatchResult<()>
    where
        D: MatchedData + ?Sized,
        O: OrderSource + ?Sized,
    {
        self.run(data, order.len(), |i, j| {
            Ok::<_, Infallible>(order.compare(i, j))
        })
    }

    /// See [`sort_matched_by`].
    pub fn sort_by<D, K, F>(&self, data: &mut D, order: &[K], mut cmp: F) -> MatchResult<()>
    where
        D: MatchedData + ?Sized,
        F: FnMut(&K, &K) -> Ordering,
    {
        self.run(data, order.len(), |i, j| {
            Ok::<_, Infallible>(cmp(&order[i], &order[j]))
        })
    }

    /// See [`try_sort_matched_by`].
    pub fn try_sort_by<D, K, E, F>(&self, data: &mut D, order: &[K], mut cmp: F) -> MatchResult<(), E>
    where
        D: MatchedData + ?Sized,
        F: FnMut(&K, &K) -> Result<Ordering, E>,
    {
        self.run(data, order.len(), |i, j| cmp(&order[i], &order[j]))
    }

    /// See [`sort_matched_by_index`]. Fails only on an invalid configuration.
    pub fn sort_by_index<D, F>(&self, data: &mut D, mut cmp: F) -> MatchResult<()>
    where
        D: MatchedData + ?Sized,
        F: FnMut(usize, usize) -> Ordering,
    {
        let len = data.item_count();
        self.run(data, len, |i, j| Ok::<_, Infallible>(cmp(i, j)))
    }

    /// See [`sort_both`].
    pub fn sort_both<T, K: Ord>(&self, data: &mut [T], order: &mut [K]) -> MatchResult<()> {
        let idx = {
            let keys = &*order;
            self.permutation(data.len(), keys.len(), |i, j| {
                Ok::<_, Infallible>(keys[i].cmp(&keys[j]))
            })?
        };
        // SAFETY: `permutation` returns a permutation of `0..data.len()`, and `order` has the
        // same length.
        unsafe {
            apply_unchecked(data, &idx, self.strategy);
            apply_unchecked(order, &idx, self.strategy);
        }
        Ok(())
    }

    /// See [`sorted_indices`]. Fails only on an invalid configuration.
    pub fn indices<O>(&self, order: &O) -> MatchResult<Vec<usize>>
    where
        O: OrderSource + ?Sized,
    {
        let len = order.len();
        self.permutation(len, len, |i, j| Ok::<_, Infallible>(order.compare(i, j)))
    }

    fn run<D, E, F>(&self, data: &mut D, order_len: usize, cmp: F) -> MatchResult<(), E>
    where
        D: MatchedData + ?Sized,
        F: FnMut(usize, usize) -> Result<Ordering, E>,
    {
        let idx = self.permutation(data.item_count(), order_len, cmp)?;
        // SAFETY: `permutation` returns a permutation of `0..data.item_count()`.
        unsafe { apply_unchecked(data.as_mut_items(), &idx, self.strategy) };
        Ok(())
    }

    /// Validates lengths and configuration, then computes the sorting permutation.
    fn permutation<E, F>(&self, len: usize, order_len: usize, mut cmp: F) -> MatchResult<Vec<usize>, E>
    where
        F: FnMut(usize, usize) -> Result<Ordering, E>,
    {
        if len != order_len {
            debug!(data = len, order = order_len, "rejecting matched sort");
            return Err(MatchError::LengthMismatch {
                data: len,
                order: order_len,
            });
        }
        self.config.validate().map_err(MatchError::widen)?;

        trace!(len, strategy = ?self.strategy, "matched sort");
        let mut idx: Vec<usize> = (0..len).collect();
        timsort(&mut idx, &self.config, &mut cmp).map_err(MatchError::Comparator)?;
        Ok(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::nulls_first;
    use std::collections::VecDeque;

    #[test]
    fn test_documented_example() {
        let mut data = vec!['g', 'i', 'j', 'h', 'e', 'a', 'c', 'd', 'b', 'f'];
        let mut order = vec![6, 8, 9, 7, 4, 0, 2, 3, 1, 5];
        sort_both(&mut data, &mut order).unwrap();
        assert_eq!(data, vec!['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j']);
        assert_eq!(order, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_length_mismatch_leaves_data_untouched() {
        let mut data = vec![3, 1, 2];
        let err = sort_matched(&mut data, &[1, 2]).unwrap_err();
        assert_eq!(err, MatchError::LengthMismatch { data: 3, order: 2 });
        assert_eq!(data, vec![3, 1, 2]);

        let mut keys = vec![1];
        assert!(sort_both(&mut data, &mut keys).is_err());
        assert_eq!(keys, vec![1]);
    }

    #[test]
    fn test_comparator_error_leaves_data_untouched() {
        let mut data = vec!["a", "b", "c", "d"];
        let order = ["3", "x", "1", "2"];
        let res = try_sort_matched_by(&mut data, &order, |a, b| {
            let a: u32 = a.parse().map_err(|_| format!("bad key {a}"))?;
            let b: u32 = b.parse().map_err(|_| format!("bad key {b}"))?;
            Ok::<_, String>(a.cmp(&b))
        });
        assert!(matches!(res, Err(MatchError::Comparator(ref msg)) if msg == "bad key x"));
        assert_eq!(data, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_nulls_sort_first() {
        let mut data = vec!["two", "none", "one", "none again"];
        let order = [Some(2), None, Some(1), None];
        sort_matched(&mut data, &order).unwrap();
        assert_eq!(data, vec!["none", "none again", "one", "two"]);
    }

    #[test]
    fn test_nulls_first_with_custom_comparator() {
        let mut data = vec!['a', 'b', 'c', 'd'];
        let order = [Some(2), None, Some(1), None];
        sort_matched_by(&mut data, &order, nulls_first(|a: &i32, b: &i32| b.cmp(a))).unwrap();
        assert_eq!(data, vec!['b', 'd', 'a', 'c']);
    }

    #[test]
    fn test_float_keys() {
        let mut data = vec!["nan", "pos", "negzero", "zero", "neg"];
        let order = [f64::NAN, 2.5, -0.0, 0.0, -1.0];
        sort_matched_f64(&mut data, &order).unwrap();
        assert_eq!(data, vec!["neg", "negzero", "zero", "pos", "nan"]);

        let mut data = vec![1, 2, 3];
        sort_matched_f32(&mut data, &[0.5f32, -0.5, f32::NAN]).unwrap();
        assert_eq!(data, vec![2, 1, 3]);
    }

    #[test]
    fn test_custom_comparator_descending() {
        let mut data = vec!['a', 'b', 'c'];
        sort_matched_by(&mut data, &[1, 3, 2], |a, b| b.cmp(a)).unwrap();
        assert_eq!(data, vec!['b', 'c', 'a']);
    }

    #[test]
    fn test_vecdeque_data_and_keys() {
        let mut data: VecDeque<&str> = VecDeque::new();
        data.push_back("y");
        data.push_back("z");
        data.push_front("x");
        let mut order: VecDeque<u8> = VecDeque::new();
        order.push_back(1);
        order.push_back(0);
        order.push_front(2);
        sort_matched(&mut data, &order).unwrap();
        assert_eq!(data, VecDeque::from(vec!["z", "y", "x"]));
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let sorter = MatchedSort::new().with_config(IndexSortConfig::new().with_min_gallop(0));
        let mut data = vec![1, 2];
        assert_eq!(
            sorter.sort(&mut data, &[2, 1]),
            Err(MatchError::InvalidConfig("min_gallop must be at least 1"))
        );
        assert_eq!(data, vec![1, 2]);

        let sorter = MatchedSort::new().with_config(IndexSortConfig::new().with_min_merge(0));
        let res = sorter.try_sort_by(&mut data, &[2, 1], |a, b| Ok::<_, String>(a.cmp(b)));
        assert_eq!(res, Err(MatchError::InvalidConfig("min_merge must be at least 2")));
        assert_eq!(data, vec![1, 2]);
    }

    #[test]
    fn test_index_comparator_matches_configured_sorter() {
        let keys = [4, 2, 4, 1, 2, 0];
        let mut free: Vec<usize> = (0..keys.len()).collect();
        sort_matched_by_index(&mut free, |i, j| keys[i].cmp(&keys[j]));

        let mut configured: Vec<usize> = (0..keys.len()).collect();
        MatchedSort::new()
            .sort_by_index(&mut configured, |i, j| keys[i].cmp(&keys[j]))
            .unwrap();

        assert_eq!(free, configured);
        assert_eq!(free, vec![5, 3, 1, 4, 0, 2]);
    }

    #[test]
    fn test_indices_match_free_function() {
        let order = [5, 3, 5, 1, 3];
        let sorter = MatchedSort::new().with_config(IndexSortConfig::new().with_min_merge(2));
        assert_eq!(sorter.indices(&order).unwrap(), sorted_indices(&order));
        assert_eq!(sorted_indices(&order), vec![3, 1, 4, 0, 2]);
    }

    #[test]
    fn test_non_clone_data() {
        struct Opaque(u32);
        let mut data = vec![Opaque(30), Opaque(10), Opaque(20)];
        sort_matched(&mut data, &[3, 1, 2]).unwrap();
        let got: Vec<u32> = data.iter().map(|o| o.0).collect();
        assert_eq!(got, vec![10, 20, 30]);
    }
}
