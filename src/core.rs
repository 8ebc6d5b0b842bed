//! Core traits and ordering helpers for matched sorting.
//!
//! This module defines:
//! - [`OrderSource`]: read-only access to the order sequence, compared by position.
//! - [`MatchedData`]: mutable random access to the data sequence being rearranged.
//! - Natural-order comparators for keys without a total order: [`compare_f64`],
//!   [`compare_f32`] and [`nulls_first`].

use std::cmp::Ordering;
use std::collections::VecDeque;

/// A trait for comparing entries of an order sequence by position.
///
/// `matchsort` never looks at the keys directly; it only asks whether the key at position `i`
/// sorts before the key at position `j`. This allows columnar or computed keys to drive a
/// matched sort without materializing them.
///
/// # Examples
///
/// Ordering rows by a column stored in a separate buffer:
///
/// ```
/// use matchsort::core::OrderSource;
///
/// struct Column {
///     values: Vec<u32>,
/// }
///
/// impl OrderSource for Column {
///     fn compare(&self, i: usize, j: usize) -> std::cmp::Ordering {
///         self.values[i].cmp(&self.values[j])
///     }
///
///     fn len(&self) -> usize {
///         self.values.len()
///     }
/// }
/// ```
pub trait OrderSource {
    /// Compares the key at position `i` with the key at position `j`.
    fn compare(&self, i: usize, j: usize) -> Ordering;

    /// Returns the number of keys.
    fn len(&self) -> usize;

    /// Returns `true` if there are no keys.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Natural ordering for slices of totally ordered keys. `Option<K>` keys put `None` first.
impl<K: Ord> OrderSource for [K] {
    fn compare(&self, i: usize, j: usize) -> Ordering {
        self[i].cmp(&self[j])
    }

    fn len(&self) -> usize {
        self.len()
    }
}

impl<K: Ord> OrderSource for Vec<K> {
    fn compare(&self, i: usize, j: usize) -> Ordering {
        self[i].cmp(&self[j])
    }

    fn len(&self) -> usize {
        self.len()
    }
}

impl<K: Ord, const N: usize> OrderSource for [K; N] {
    fn compare(&self, i: usize, j: usize) -> Ordering {
        self[i].cmp(&self[j])
    }

    fn len(&self) -> usize {
        N
    }
}

// VecDeque indexing is O(1), so it can drive a sort without being made contiguous.
impl<K: Ord> OrderSource for VecDeque<K> {
    fn compare(&self, i: usize, j: usize) -> Ordering {
        self[i].cmp(&self[j])
    }

    fn len(&self) -> usize {
        self.len()
    }
}

/// A mutable, random access sequence that can be rearranged by a matched sort.
///
/// Elements need no trait bounds at all: they are only moved.
pub trait MatchedData {
    type Item;

    /// Returns the elements as one contiguous mutable slice.
    fn as_mut_items(&mut self) -> &mut [Self::Item];

    /// Returns the number of elements.
    fn item_count(&self) -> usize;
}

impl<T> MatchedData for [T] {
    type Item = T;

    fn as_mut_items(&mut self) -> &mut [T] {
        self
    }

    fn item_count(&self) -> usize {
        self.len()
    }
}

impl<T> MatchedData for Vec<T> {
    type Item = T;

    fn as_mut_items(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }

    fn item_count(&self) -> usize {
        self.len()
    }
}

impl<T, const N: usize> MatchedData for [T; N] {
    type Item = T;

    fn as_mut_items(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }

    fn item_count(&self) -> usize {
        N
    }
}

// The ring buffer is rotated into a single slice first; element order is unchanged.
impl<T> MatchedData for VecDeque<T> {
    type Item = T;

    fn as_mut_items(&mut self) -> &mut [T] {
        self.make_contiguous()
    }

    fn item_count(&self) -> usize {
        self.len()
    }
}

/// Natural order for `f64` keys.
///
/// Extends IEEE comparison to a total order: `-0.0` sorts before `0.0`, and every NaN is equal
/// to every other NaN and greater than all other values, including positive infinity.
///
/// ```
/// use matchsort::core::compare_f64;
/// use std::cmp::Ordering;
///
/// assert_eq!(compare_f64(-0.0, 0.0), Ordering::Less);
/// assert_eq!(compare_f64(f64::NAN, f64::INFINITY), Ordering::Greater);
/// assert_eq!(compare_f64(f64::NAN, -f64::NAN), Ordering::Equal);
/// ```
pub fn compare_f64(a: f64, b: f64) -> Ordering {
    match a.partial_cmp(&b) {
        Some(Ordering::Equal) if a == 0.0 => b.is_sign_negative().cmp(&a.is_sign_negative()),
        Some(ord) => ord,
        None => a.is_nan().cmp(&b.is_nan()),
    }
}

/// Natural order for `f32` keys. Same rules as [`compare_f64`].
pub fn compare_f32(a: f32, b: f32) -> Ordering {
    match a.partial_cmp(&b) {
        Some(Ordering::Equal) if a == 0.0 => b.is_sign_negative().cmp(&a.is_sign_negative()),
        Some(ord) => ord,
        None => a.is_nan().cmp(&b.is_nan()),
    }
}

/// Lifts a key comparator to optional keys, placing `None` before every `Some`.
///
/// ```
/// use matchsort::core::nulls_first;
/// use std::cmp::Ordering;
///
/// let mut cmp = nulls_first(|a: &i32, b: &i32| b.cmp(a));
/// assert_eq!(cmp(&None, &Some(1)), Ordering::Less);
/// assert_eq!(cmp(&Some(1), &Some(2)), Ordering::Greater);
/// ```
pub fn nulls_first<K, F>(mut cmp: F) -> impl FnMut(&Option<K>, &Option<K>) -> Ordering
where
    F: FnMut(&K, &K) -> Ordering,
{
    move |a, b| match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => cmp(a, b),
    }
}
