//! Stable index sorter.
//!
//! Sorts the identity permutation `0..n` with a comparator that compares *positions*, not
//! values. The algorithm is TimSort:
//! - **Run detection**: ascending runs are kept, strictly descending runs are reversed in place
//!   (strictness keeps the reversal stable).
//! - **Binary insertion sort**: extends short runs up to the computed minimum run length.
//!   Inputs shorter than `min_merge` are handled by a single binary insertion pass.
//! - **Run stack**: pending runs are merged while the invariants on the top four runs are
//!   violated, which bounds the stack depth logarithmically.
//! - **Galloping merge**: once one run keeps winning, exponential search skips whole blocks.
//!
//! All work happens on `usize` values, so the sorter never touches the caller's data. A
//! comparator that panics or returns an error simply abandons the permutation.

use crate::error::{MatchError, MatchResult};
use cuneiform::cuneiform;
use std::cmp::Ordering;
use std::convert::Infallible;
use tracing::trace;

/// Default minimum merge length. Inputs shorter than this are sorted by binary insertion alone.
pub const DEFAULT_MIN_MERGE: usize = 32;

/// Default number of consecutive wins before a merge switches to galloping mode.
pub const DEFAULT_MIN_GALLOP: usize = 7;

/// Capacity of the pending run stack.
///
/// Run lengths on the stack grow at least as fast as the Fibonacci numbers, so 96 entries cover
/// any slice addressable with a 64-bit `usize`.
const MAX_RUNS: usize = 96;

/// Tuning knobs for [`stable_sort_indices_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexSortConfig {
    min_merge: usize,
    min_gallop: usize,
}

impl Default for IndexSortConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexSortConfig {
    /// Configuration with [`DEFAULT_MIN_MERGE`] and [`DEFAULT_MIN_GALLOP`].
    pub const fn new() -> Self {
        Self {
            min_merge: DEFAULT_MIN_MERGE,
            min_gallop: DEFAULT_MIN_GALLOP,
        }
    }

    /// Sets the minimum merge length. Must be at least 2.
    pub const fn with_min_merge(mut self, min_merge: usize) -> Self {
        self.min_merge = min_merge;
        self
    }

    /// Sets the initial galloping threshold. Must be at least 1.
    pub const fn with_min_gallop(mut self, min_gallop: usize) -> Self {
        self.min_gallop = min_gallop;
        self
    }

    pub const fn min_merge(&self) -> usize {
        self.min_merge
    }

    pub const fn min_gallop(&self) -> usize {
        self.min_gallop
    }

    /// Checks that every knob is in range.
    pub fn validate(&self) -> MatchResult<()> {
        if self.min_merge < 2 {
            return Err(MatchError::InvalidConfig("min_merge must be at least 2"));
        }
        if self.min_gallop < 1 {
            return Err(MatchError::InvalidConfig("min_gallop must be at least 1"));
        }
        Ok(())
    }
}

/// Returns the stable permutation of `0..n` ordered by `cmp`.
///
/// `cmp(i, j)` compares the element at position `i` with the element at position `j`. The
/// result `idx` satisfies `cmp(idx[k], idx[k + 1]) != Ordering::Greater`, and positions that
/// compare equal keep their original relative order.
///
/// # Examples
///
/// ```
/// use matchsort::stable_sort_indices;
///
/// let keys = [30, 10, 20, 10];
/// let idx = stable_sort_indices(keys.len(), |i, j| keys[i].cmp(&keys[j]));
///
/// assert_eq!(idx, vec![1, 3, 2, 0]);
/// ```
pub fn stable_sort_indices<F>(n: usize, mut cmp: F) -> Vec<usize>
where
    F: FnMut(usize, usize) -> Ordering,
{
    let mut idx: Vec<usize> = (0..n).collect();
    let mut cmp = |a: usize, b: usize| Ok::<_, Infallible>(cmp(a, b));
    match timsort(&mut idx, &IndexSortConfig::new(), &mut cmp) {
        Ok(()) => idx,
        Err(never) => match never {},
    }
}

/// Like [`stable_sort_indices`], with explicit tuning.
pub fn stable_sort_indices_with<F>(
    n: usize,
    config: &IndexSortConfig,
    mut cmp: F,
) -> MatchResult<Vec<usize>>
where
    F: FnMut(usize, usize) -> Ordering,
{
    try_stable_sort_indices_with(n, config, |a, b| Ok::<_, Infallible>(cmp(a, b)))
}

/// Fallible variant of [`stable_sort_indices`].
///
/// The first error returned by `cmp` aborts the sort and is handed back unchanged.
pub fn try_stable_sort_indices<E, F>(n: usize, mut cmp: F) -> Result<Vec<usize>, E>
where
    F: FnMut(usize, usize) -> Result<Ordering, E>,
{
    let mut idx: Vec<usize> = (0..n).collect();
    timsort(&mut idx, &IndexSortConfig::new(), &mut cmp)?;
    Ok(idx)
}

/// Fallible variant of [`stable_sort_indices_with`].
pub fn try_stable_sort_indices_with<E, F>(
    n: usize,
    config: &IndexSortConfig,
    mut cmp: F,
) -> MatchResult<Vec<usize>, E>
where
    F: FnMut(usize, usize) -> Result<Ordering, E>,
{
    config.validate().map_err(MatchError::widen)?;
    let mut idx: Vec<usize> = (0..n).collect();
    timsort(&mut idx, config, &mut cmp).map_err(MatchError::Comparator)?;
    Ok(idx)
}

/// Sorts `v` (a slice of positions) in place.
pub(crate) fn timsort<E, F>(v: &mut [usize], config: &IndexSortConfig, cmp: &mut F) -> Result<(), E>
where
    F: FnMut(usize, usize) -> Result<Ordering, E>,
{
    let len = v.len();
    if len < 2 {
        return Ok(());
    }

    if len < config.min_merge {
        trace!(len, "mini timsort");
        let run = count_run_and_make_ascending(v, 0, cmp)?;
        return binary_insertion_sort(v, run, cmp);
    }

    let min_run = min_run_length(len, config.min_merge);
    trace!(len, min_run, "timsort");

    let mut state = MergeState::new(config.min_gallop);
    let mut lo = 0;
    while lo < len {
        let mut run = count_run_and_make_ascending(v, lo, cmp)?;

        if run < min_run {
            let force = (len - lo).min(min_run);
            binary_insertion_sort(&mut v[lo..lo + force], run, cmp)?;
            run = force;
        }

        state.runs.push(lo, run);
        state.merge_collapse(v, cmp)?;
        lo += run;
    }

    state.merge_force_collapse(v, cmp)?;
    debug_assert!(state.runs.size == 1 && state.runs.len[0] == len);
    Ok(())
}

#[inline(always)]
fn is_less<E, F>(cmp: &mut F, a: usize, b: usize) -> Result<bool, E>
where
    F: FnMut(usize, usize) -> Result<Ordering, E>,
{
    Ok(cmp(a, b)? == Ordering::Less)
}

/// Computes the minimum run length for a slice of `n` elements.
///
/// The result is `n` itself below `min_merge`. Otherwise it lies in `[min_merge / 2,
/// min_merge]` and is chosen so that `n / min_run` is close to, but no larger than, a power of
/// two, which keeps the final merges balanced.
fn min_run_length(mut n: usize, min_merge: usize) -> usize {
    let mut r = 0;
    while n >= min_merge {
        r |= n & 1;
        n >>= 1;
    }
    n + r
}

/// Returns the length of the run starting at `lo`, reversing it first if it is strictly
/// descending.
fn count_run_and_make_ascending<E, F>(v: &mut [usize], lo: usize, cmp: &mut F) -> Result<usize, E>
where
    F: FnMut(usize, usize) -> Result<Ordering, E>,
{
    let len = v.len();
    let mut hi = lo + 1;
    if hi == len {
        return Ok(1);
    }

    if is_less(cmp, v[hi], v[lo])? {
        hi += 1;
        while hi < len && is_less(cmp, v[hi], v[hi - 1])? {
            hi += 1;
        }
        v[lo..hi].reverse();
    } else {
        hi += 1;
        while hi < len && !is_less(cmp, v[hi], v[hi - 1])? {
            hi += 1;
        }
    }

    Ok(hi - lo)
}

/// Sorts `v` assuming `v[..sorted]` is already in order.
///
/// Each new element is placed with a binary search, inserting after any equal elements to stay
/// stable, then the tail is shifted one slot to the right.
fn binary_insertion_sort<E, F>(v: &mut [usize], sorted: usize, cmp: &mut F) -> Result<(), E>
where
    F: FnMut(usize, usize) -> Result<Ordering, E>,
{
    for start in sorted.max(1)..v.len() {
        let pivot = v[start];
        let mut left = 0;
        let mut right = start;
        while left < right {
            let mid = left + (right - left) / 2;
            if is_less(cmp, pivot, v[mid])? {
                right = mid;
            } else {
                left = mid + 1;
            }
        }
        v.copy_within(left..start, left + 1);
        v[left] = pivot;
    }
    Ok(())
}

/// Locates the leftmost insertion point of `key` in the sorted `run`, starting the search
/// near `hint`. Returns `k` such that `run[..k] < key <= run[k..]`.
fn gallop_left<E, F>(key: usize, run: &[usize], hint: usize, cmp: &mut F) -> Result<usize, E>
where
    F: FnMut(usize, usize) -> Result<Ordering, E>,
{
    debug_assert!(hint < run.len());
    let mut last_ofs = 0;
    let mut ofs = 1;

    let (mut lo, mut hi) = if cmp(key, run[hint])? == Ordering::Greater {
        // Gallop right until run[hint + last_ofs] < key <= run[hint + ofs].
        let max_ofs = run.len() - hint;
        while ofs < max_ofs && cmp(key, run[hint + ofs])? == Ordering::Greater {
            last_ofs = ofs;
            ofs = (ofs << 1) + 1;
        }
        ofs = ofs.min(max_ofs);
        (hint + last_ofs + 1, hint + ofs)
    } else {
        // Gallop left until run[hint - ofs] < key <= run[hint - last_ofs].
        let max_ofs = hint + 1;
        while ofs < max_ofs && cmp(key, run[hint - ofs])? != Ordering::Greater {
            last_ofs = ofs;
            ofs = (ofs << 1) + 1;
        }
        ofs = ofs.min(max_ofs);
        (hint + 1 - ofs, hint - last_ofs)
    };

    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if cmp(key, run[mid])? == Ordering::Greater {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    Ok(hi)
}

/// Locates the rightmost insertion point of `key` in the sorted `run`, starting the search
/// near `hint`. Returns `k` such that `run[..k] <= key < run[k..]`.
fn gallop_right<E, F>(key: usize, run: &[usize], hint: usize, cmp: &mut F) -> Result<usize, E>
where
    F: FnMut(usize, usize) -> Result<Ordering, E>,
{
    debug_assert!(hint < run.len());
    let mut last_ofs = 0;
    let mut ofs = 1;

    let (mut lo, mut hi) = if cmp(key, run[hint])? == Ordering::Less {
        // Gallop left until run[hint - ofs] <= key < run[hint - last_ofs].
        let max_ofs = hint + 1;
        while ofs < max_ofs && cmp(key, run[hint - ofs])? == Ordering::Less {
            last_ofs = ofs;
            ofs = (ofs << 1) + 1;
        }
        ofs = ofs.min(max_ofs);
        (hint + 1 - ofs, hint - last_ofs)
    } else {
        // Gallop right until run[hint + last_ofs] <= key < run[hint + ofs].
        let max_ofs = run.len() - hint;
        while ofs < max_ofs && cmp(key, run[hint + ofs])? != Ordering::Less {
            last_ofs = ofs;
            ofs = (ofs << 1) + 1;
        }
        ofs = ofs.min(max_ofs);
        (hint + last_ofs + 1, hint + ofs)
    };

    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if cmp(key, run[mid])? == Ordering::Less {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    Ok(hi)
}

// Cache-aligned stack of pending runs.
#[cuneiform]
struct RunStack {
    base: [usize; MAX_RUNS],
    len: [usize; MAX_RUNS],
    size: usize,
}

impl RunStack {
    fn new() -> Self {
        RunStack {
            base: [0; MAX_RUNS],
            len: [0; MAX_RUNS],
            size: 0,
        }
    }

    fn push(&mut self, base: usize, len: usize) {
        self.base[self.size] = base;
        self.len[self.size] = len;
        self.size += 1;
    }
}

/// Merge bookkeeping for one sort call: the run stack, the adaptive galloping threshold and
/// the scratch buffer (at most `n / 2` positions).
struct MergeState {
    runs: RunStack,
    min_gallop: usize,
    initial_gallop: usize,
    tmp: Vec<usize>,
}

impl MergeState {
    fn new(min_gallop: usize) -> Self {
        Self {
            runs: RunStack::new(),
            min_gallop,
            initial_gallop: min_gallop,
            tmp: Vec::new(),
        }
    }

    /// Merges runs until the stack invariants hold again:
    /// 1. `len[i - 3] > len[i - 2] + len[i - 1]`
    /// 2. `len[i - 2] > len[i - 1]`
    ///
    /// Both are checked on the top four runs, since checking only the top three lets the
    /// invariant break further down the stack.
    fn merge_collapse<E, F>(&mut self, v: &mut [usize], cmp: &mut F) -> Result<(), E>
    where
        F: FnMut(usize, usize) -> Result<Ordering, E>,
    {
        while self.runs.size > 1 {
            let len = &self.runs.len;
            let mut n = self.runs.size - 2;
            if (n > 0 && len[n - 1] <= len[n] + len[n + 1])
                || (n > 1 && len[n - 2] <= len[n] + len[n - 1])
            {
                if len[n - 1] < len[n + 1] {
                    n -= 1;
                }
            } else if len[n] > len[n + 1] {
                break;
            }
            self.merge_at(v, n, cmp)?;
        }
        Ok(())
    }

    /// Merges every remaining run into one.
    fn merge_force_collapse<E, F>(&mut self, v: &mut [usize], cmp: &mut F) -> Result<(), E>
    where
        F: FnMut(usize, usize) -> Result<Ordering, E>,
    {
        while self.runs.size > 1 {
            let mut n = self.runs.size - 2;
            if n > 0 && self.runs.len[n - 1] < self.runs.len[n + 1] {
                n -= 1;
            }
            self.merge_at(v, n, cmp)?;
        }
        Ok(())
    }

    /// Merges stack runs `i` and `i + 1`, which must be adjacent in `v`.
    fn merge_at<E, F>(&mut self, v: &mut [usize], i: usize, cmp: &mut F) -> Result<(), E>
    where
        F: FnMut(usize, usize) -> Result<Ordering, E>,
    {
        let base1 = self.runs.base[i];
        let mut len1 = self.runs.len[i];
        let base2 = self.runs.base[i + 1];
        let mut len2 = self.runs.len[i + 1];
        debug_assert!(len1 > 0 && len2 > 0);
        debug_assert_eq!(base1 + len1, base2);

        self.runs.len[i] = len1 + len2;
        if i + 3 == self.runs.size {
            self.runs.base[i + 1] = self.runs.base[i + 2];
            self.runs.len[i + 1] = self.runs.len[i + 2];
        }
        self.runs.size -= 1;

        // Elements of run1 not greater than run2's head are already in place.
        let k = gallop_right(v[base2], &v[base1..base1 + len1], 0, cmp)?;
        let base1 = base1 + k;
        len1 -= k;
        if len1 == 0 {
            return Ok(());
        }

        // Elements of run2 not less than run1's tail are already in place.
        len2 = gallop_left(v[base1 + len1 - 1], &v[base2..base2 + len2], len2 - 1, cmp)?;
        if len2 == 0 {
            return Ok(());
        }

        if len1 <= len2 {
            self.merge_lo(v, base1, len1, base2, len2, cmp)
        } else {
            self.merge_hi(v, base1, len1, base2, len2, cmp)
        }
    }

    fn ensure_tmp(&mut self, len: usize) {
        if self.tmp.len() < len {
            self.tmp.resize(len, 0);
        }
    }

    /// Merges with run1 copied to the scratch buffer, filling `v` left to right.
    /// Requires `len1 <= len2`, `v[base1] > v[base2]` and run1's tail greater than every
    /// element of run2.
    fn merge_lo<E, F>(
        &mut self,
        v: &mut [usize],
        base1: usize,
        mut len1: usize,
        base2: usize,
        mut len2: usize,
        cmp: &mut F,
    ) -> Result<(), E>
    where
        F: FnMut(usize, usize) -> Result<Ordering, E>,
    {
        self.ensure_tmp(len1);
        let tmp = &mut self.tmp;
        tmp[..len1].copy_from_slice(&v[base1..base1 + len1]);

        let mut cursor1 = 0;
        let mut cursor2 = base2;
        let mut dest = base1;

        v[dest] = v[cursor2];
        dest += 1;
        cursor2 += 1;
        len2 -= 1;
        if len2 == 0 {
            v[dest..dest + len1].copy_from_slice(&tmp[cursor1..cursor1 + len1]);
            return Ok(());
        }
        if len1 == 1 {
            v.copy_within(cursor2..cursor2 + len2, dest);
            v[dest + len2] = tmp[cursor1];
            return Ok(());
        }

        let mut min_gallop = self.min_gallop;
        'outer: loop {
            let mut count1 = 0;
            let mut count2 = 0;

            // One at a time until one run starts winning consistently.
            loop {
                if is_less(cmp, v[cursor2], tmp[cursor1])? {
                    v[dest] = v[cursor2];
                    dest += 1;
                    cursor2 += 1;
                    count2 += 1;
                    count1 = 0;
                    len2 -= 1;
                    if len2 == 0 {
                        break 'outer;
                    }
                } else {
                    v[dest] = tmp[cursor1];
                    dest += 1;
                    cursor1 += 1;
                    count1 += 1;
                    count2 = 0;
                    len1 -= 1;
                    if len1 == 1 {
                        break 'outer;
                    }
                }
                if (count1 | count2) >= min_gallop {
                    break;
                }
            }

            // Gallop until neither run wins by a large margin.
            loop {
                count1 = gallop_right(v[cursor2], &tmp[cursor1..cursor1 + len1], 0, cmp)?;
                if count1 != 0 {
                    v[dest..dest + count1].copy_from_slice(&tmp[cursor1..cursor1 + count1]);
                    dest += count1;
                    cursor1 += count1;
                    len1 -= count1;
                    if len1 <= 1 {
                        break 'outer;
                    }
                }
                v[dest] = v[cursor2];
                dest += 1;
                cursor2 += 1;
                len2 -= 1;
                if len2 == 0 {
                    break 'outer;
                }

                count2 = gallop_left(tmp[cursor1], &v[cursor2..cursor2 + len2], 0, cmp)?;
                if count2 != 0 {
                    v.copy_within(cursor2..cursor2 + count2, dest);
                    dest += count2;
                    cursor2 += count2;
                    len2 -= count2;
                    if len2 == 0 {
                        break 'outer;
                    }
                }
                v[dest] = tmp[cursor1];
                dest += 1;
                cursor1 += 1;
                len1 -= 1;
                if len1 == 1 {
                    break 'outer;
                }

                min_gallop = min_gallop.saturating_sub(1);
                if count1 < self.initial_gallop && count2 < self.initial_gallop {
                    break;
                }
            }
            // Penalize leaving gallop mode.
            min_gallop += 2;
        }
        self.min_gallop = min_gallop.max(1);

        if len1 == 1 {
            v.copy_within(cursor2..cursor2 + len2, dest);
            v[dest + len2] = tmp[cursor1];
        } else if len1 > 0 {
            debug_assert_eq!(len2, 0);
            v[dest..dest + len1].copy_from_slice(&tmp[cursor1..cursor1 + len1]);
        }
        // len1 == 0 only happens with an inconsistent comparator. run2's remainder is
        // already in place, so `v` is still a permutation.
        Ok(())
    }

    /// Merges with run2 copied to the scratch buffer, filling `v` right to left.
    /// Requires `len1 >= len2`, `v[base1] > v[base2]` and run1's tail greater than every
    /// element of run2.
    ///
    /// Positions are derived from the remaining lengths: run1's remainder is
    /// `v[base1..base1 + len1]` and the next free slot is `base1 + len1 + len2 - 1`.
    fn merge_hi<E, F>(
        &mut self,
        v: &mut [usize],
        base1: usize,
        mut len1: usize,
        base2: usize,
        mut len2: usize,
        cmp: &mut F,
    ) -> Result<(), E>
    where
        F: FnMut(usize, usize) -> Result<Ordering, E>,
    {
        self.ensure_tmp(len2);
        let tmp = &mut self.tmp;
        tmp[..len2].copy_from_slice(&v[base2..base2 + len2]);

        v[base1 + len1 + len2 - 1] = v[base1 + len1 - 1];
        len1 -= 1;
        if len1 == 0 {
            v[base1..base1 + len2].copy_from_slice(&tmp[..len2]);
            return Ok(());
        }
        if len2 == 1 {
            v.copy_within(base1..base1 + len1, base1 + 1);
            v[base1] = tmp[0];
            return Ok(());
        }

        let mut min_gallop = self.min_gallop;
        'outer: loop {
            let mut count1 = 0;
            let mut count2 = 0;

            loop {
                let dest = base1 + len1 + len2 - 1;
                if is_less(cmp, tmp[len2 - 1], v[base1 + len1 - 1])? {
                    v[dest] = v[base1 + len1 - 1];
                    count1 += 1;
                    count2 = 0;
                    len1 -= 1;
                    if len1 == 0 {
                        break 'outer;
                    }
                } else {
                    v[dest] = tmp[len2 - 1];
                    count2 += 1;
                    count1 = 0;
                    len2 -= 1;
                    if len2 == 1 {
                        break 'outer;
                    }
                }
                if (count1 | count2) >= min_gallop {
                    break;
                }
            }

            loop {
                count1 = len1 - gallop_right(tmp[len2 - 1], &v[base1..base1 + len1], len1 - 1, cmp)?;
                if count1 != 0 {
                    let src = base1 + len1 - count1;
                    v.copy_within(src..base1 + len1, src + len2);
                    len1 -= count1;
                    if len1 == 0 {
                        break 'outer;
                    }
                }
                v[base1 + len1 + len2 - 1] = tmp[len2 - 1];
                len2 -= 1;
                if len2 == 1 {
                    break 'outer;
                }

                count2 = len2 - gallop_left(v[base1 + len1 - 1], &tmp[..len2], len2 - 1, cmp)?;
                if count2 != 0 {
                    let dest = base1 + len1 + len2 - count2;
                    v[dest..dest + count2].copy_from_slice(&tmp[len2 - count2..len2]);
                    len2 -= count2;
                    if len2 <= 1 {
                        break 'outer;
                    }
                }
                v[base1 + len1 + len2 - 1] = v[base1 + len1 - 1];
                len1 -= 1;
                if len1 == 0 {
                    break 'outer;
                }

                min_gallop = min_gallop.saturating_sub(1);
                if count1 < self.initial_gallop && count2 < self.initial_gallop {
                    break;
                }
            }
            min_gallop += 2;
        }
        self.min_gallop = min_gallop.max(1);

        if len2 == 1 {
            v.copy_within(base1..base1 + len1, base1 + 1);
            v[base1] = tmp[0];
        } else if len2 > 0 {
            debug_assert_eq!(len1, 0);
            v[base1..base1 + len2].copy_from_slice(&tmp[..len2]);
        }
        // len2 == 0 only happens with an inconsistent comparator; run1's remainder is in place.
        Ok(())
    }
}
