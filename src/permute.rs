//! Permutation applier.
//!
//! Rearranges a slice so that `data[i]` becomes the original `data[idx[i]]`. Elements are
//! moved, never cloned or compared. Every original element is read exactly once and every
//! position is written exactly once.
//!
//! Two strategies are available:
//! - **Peel**: recursion reads `data[idx[i]]` into a frame-local value for increasing `i`, then
//!   writes `data[i]` while unwinding from the last index to the first. All reads happen before
//!   any write, so no extra heap buffer is needed, at the cost of one stack frame per element.
//! - **Scratch**: moves every `data[idx[i]]` into a heap buffer, then moves the buffer back.
//!
//! Peel is bounded by [`PEEL_MAX_LEN`] frames and by [`PEEL_STACK_BUDGET`] bytes of stack,
//! where each frame is charged its element plus [`PEEL_FRAME_OVERHEAD`]. Anything larger always
//! uses the scratch buffer. The limits keep the deepest peel well inside a 1 MiB thread stack
//! in unoptimized builds.

use crate::error::{MatchError, MatchResult};
use std::mem::size_of;
use std::ptr;
use tracing::trace;

/// Maximum number of elements handled by the peel strategy.
pub const PEEL_MAX_LEN: usize = 1024;

/// Maximum stack bytes charged to the peel strategy at once.
pub const PEEL_STACK_BUDGET: usize = 128 * 1024;

/// Bytes charged per peel frame on top of the element it holds.
pub const PEEL_FRAME_OVERHEAD: usize = 64;

/// How a permutation is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermuteStrategy {
    /// Peel when the input fits the recursion limits, scratch buffer otherwise.
    #[default]
    Auto,
    /// Prefer the peel strategy. Inputs beyond the recursion limits still use the scratch
    /// buffer.
    Peel,
    /// Always use a scratch buffer.
    Scratch,
}

impl PermuteStrategy {
    /// Returns the concrete strategy ([`Peel`](Self::Peel) or [`Scratch`](Self::Scratch)) used
    /// for `len` elements of type `T`.
    pub fn resolve<T>(self, len: usize) -> PermuteStrategy {
        match self {
            PermuteStrategy::Scratch => PermuteStrategy::Scratch,
            PermuteStrategy::Auto | PermuteStrategy::Peel if peel_fits::<T>(len) => {
                PermuteStrategy::Peel
            }
            PermuteStrategy::Auto | PermuteStrategy::Peel => PermuteStrategy::Scratch,
        }
    }
}

#[inline]
fn peel_fits<T>(len: usize) -> bool {
    let frame = size_of::<T>().saturating_add(PEEL_FRAME_OVERHEAD);
    len <= PEEL_MAX_LEN && len.saturating_mul(frame) <= PEEL_STACK_BUDGET
}

/// Applies the permutation `idx` to `data` in place.
///
/// After return, `data[i]` holds the element previously at `data[idx[i]]`.
///
/// # Errors
///
/// - [`MatchError::LengthMismatch`] if `idx` and `data` differ in length.
/// - [`MatchError::InvalidPermutation`] if `idx` is not a bijection on `0..data.len()`.
///
/// `data` is untouched on error.
///
/// # Examples
///
/// ```
/// use matchsort::apply_permutation;
///
/// let mut data = vec!["c", "a", "b"];
/// apply_permutation(&mut data, &[1, 2, 0]).unwrap();
///
/// assert_eq!(data, vec!["a", "b", "c"]);
/// ```
pub fn apply_permutation<T>(data: &mut [T], idx: &[usize]) -> MatchResult<()> {
    apply_permutation_with(data, idx, PermuteStrategy::Auto)
}

/// Like [`apply_permutation`], with an explicit strategy.
pub fn apply_permutation_with<T>(
    data: &mut [T],
    idx: &[usize],
    strategy: PermuteStrategy,
) -> MatchResult<()> {
    validate_permutation(idx, data.len())?;
    // SAFETY: `idx` was just checked to be a bijection on `0..data.len()`.
    unsafe { apply_unchecked(data, idx, strategy) };
    Ok(())
}

/// Checks that `idx` is a permutation of `0..len`.
pub fn validate_permutation(idx: &[usize], len: usize) -> MatchResult<()> {
    if idx.len() != len {
        return Err(MatchError::LengthMismatch {
            data: len,
            order: idx.len(),
        });
    }

    let mut seen = vec![false; len];
    for (pos, &i) in idx.iter().enumerate() {
        let Some(slot) = seen.get_mut(i) else {
            return Err(MatchError::InvalidPermutation {
                index: pos,
                reason: "index out of range",
            });
        };
        if std::mem::replace(slot, true) {
            return Err(MatchError::InvalidPermutation {
                index: pos,
                reason: "duplicate index",
            });
        }
    }
    Ok(())
}

/// Applies `idx` to `data` without validating it.
///
/// # Safety
///
/// `idx` must be a permutation of `0..data.len()`. Any duplicate or missing index duplicates
/// or leaks an element, which is undefined behavior for types with drop glue.
pub(crate) unsafe fn apply_unchecked<T>(data: &mut [T], idx: &[usize], strategy: PermuteStrategy) {
    debug_assert_eq!(data.len(), idx.len());
    debug_assert!(validate_permutation(idx, data.len()).is_ok());

    let len = data.len();
    if len < 2 || size_of::<T>() == 0 {
        // Nothing observable can move.
        return;
    }

    match strategy.resolve::<T>(len) {
        PermuteStrategy::Peel => {
            trace!(len, "applying permutation by peeling");
            // SAFETY: forwarded from the caller.
            unsafe { peel(data.as_mut_ptr(), idx, 0) };
        }
        _ => {
            trace!(len, "applying permutation through scratch buffer");
            // SAFETY: forwarded from the caller.
            unsafe { scratch(data, idx) };
        }
    }
}

/// Reads `data[idx[i]]`, recurses on `i + 1`, then writes `data[i]`.
///
/// Nothing between the first read and the last write can panic, so every element is moved out
/// and back exactly once.
///
/// # Safety
///
/// `data` must point to `idx.len()` initialized elements and `idx` must be a permutation of
/// `0..idx.len()`.
unsafe fn peel<T>(data: *mut T, idx: &[usize], i: usize) {
    if let Some(&src) = idx.get(i) {
        // SAFETY: `src < idx.len()` and each source is read once.
        let value = unsafe { ptr::read(data.add(src)) };
        unsafe { peel(data, idx, i + 1) };
        // SAFETY: every read for positions `>= i` has happened above, so slot `i` is free.
        unsafe { ptr::write(data.add(i), value) };
    }
}

/// Moves `data[idx[i]]` into `tmp[i]`, then moves `tmp` back over `data`.
///
/// # Safety
///
/// `idx` must be a permutation of `0..data.len()`.
unsafe fn scratch<T>(data: &mut [T], idx: &[usize]) {
    let len = data.len();
    let mut tmp: Vec<T> = Vec::with_capacity(len);
    let dst = tmp.as_mut_ptr();
    let base = data.as_mut_ptr();

    for (i, &src) in idx.iter().enumerate() {
        // SAFETY: `src < len`, `i < len`, and the buffers do not overlap.
        unsafe { ptr::copy_nonoverlapping(base.add(src), dst.add(i), 1) };
    }
    // SAFETY: `tmp[..len]` now holds every element exactly once.
    unsafe { ptr::copy_nonoverlapping(dst, base, len) };

    // `tmp` still has length 0, so dropping it only frees the allocation.
}
