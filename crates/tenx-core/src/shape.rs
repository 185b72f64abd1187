//! Shape and index arithmetic
//!
//! Conversions between flat offsets and coordinates under a [`Layout`],
//! stride construction, and the small validation helpers every other module
//! builds on.
//!
//! - Row-major: the last axis has stride 1 and `stride[i] = stride[i+1] * shape[i+1]`.
//! - Column-major: the first axis has stride 1 and strides grow towards the last axis.

use crate::error::{Result, TensorError};
use crate::types::{Index, Layout, Shape, Strides};

/// Number of elements described by `shape` (product of all axes).
///
/// An empty shape describes a single element.
///
/// # Examples
///
/// ```
/// use tenx_core::size_of;
///
/// assert_eq!(size_of(&[2, 3, 4]), 24);
/// assert_eq!(size_of(&[2, 0, 4]), 0);
/// ```
#[inline]
pub fn size_of(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Flat-offset multiplier of each axis for a contiguous buffer in `layout`.
///
/// # Examples
///
/// ```
/// use tenx_core::{make_strides, Layout};
///
/// assert_eq!(make_strides(&[2, 3, 4], Layout::RowMajor).as_slice(), &[12, 4, 1]);
/// assert_eq!(make_strides(&[2, 3, 4], Layout::ColumnMajor).as_slice(), &[1, 2, 6]);
/// ```
pub fn make_strides(shape: &[usize], layout: Layout) -> Strides {
    let rank = shape.len();
    let mut strides: Strides = smallvec::smallvec![0; rank];
    let mut acc: isize = 1;
    match layout {
        Layout::RowMajor => {
            for i in (0..rank).rev() {
                strides[i] = acc;
                acc *= shape[i] as isize;
            }
        }
        Layout::ColumnMajor => {
            for i in 0..rank {
                strides[i] = acc;
                acc *= shape[i] as isize;
            }
        }
    }
    strides
}

/// Verify that `index` is a valid coordinate for `shape`.
///
/// # Errors
///
/// `RankMismatch` if the ranks differ, `IndexOutOfRange` if any component
/// reaches its axis extent.
pub fn check_index(index: &[usize], shape: &[usize]) -> Result<()> {
    if index.len() != shape.len() {
        return Err(TensorError::RankMismatch {
            expected: shape.len(),
            actual: index.len(),
        });
    }
    if index.iter().zip(shape).any(|(&i, &n)| i >= n) {
        return Err(TensorError::index_out_of_range(index, shape));
    }
    Ok(())
}

/// Flat position of `index` in a contiguous buffer of `shape` ordered by `layout`.
///
/// # Errors
///
/// Fails when `index` is not a valid coordinate for `shape`.
///
/// # Examples
///
/// ```
/// use tenx_core::{ravel_index, Layout};
///
/// assert_eq!(ravel_index(&[1, 2], &[2, 3], Layout::RowMajor).unwrap(), 5);
/// assert_eq!(ravel_index(&[1, 2], &[2, 3], Layout::ColumnMajor).unwrap(), 5);
/// assert_eq!(ravel_index(&[1, 0], &[2, 3], Layout::ColumnMajor).unwrap(), 1);
/// assert!(ravel_index(&[2, 0], &[2, 3], Layout::RowMajor).is_err());
/// ```
pub fn ravel_index(index: &[usize], shape: &[usize], layout: Layout) -> Result<usize> {
    check_index(index, shape)?;
    Ok(ravel_index_unchecked(index, shape, layout))
}

/// [`ravel_index`] without bounds checking.
///
/// The caller guarantees that `index` is valid for `shape`; otherwise the
/// result is an unspecified position.
#[inline]
pub fn ravel_index_unchecked(index: &[usize], shape: &[usize], layout: Layout) -> usize {
    match layout {
        Layout::RowMajor => index
            .iter()
            .zip(shape)
            .fold(0, |acc, (&i, &n)| acc * n + i),
        Layout::ColumnMajor => index
            .iter()
            .zip(shape)
            .rev()
            .fold(0, |acc, (&i, &n)| acc * n + i),
    }
}

/// Coordinate of flat position `flat` in `shape` ordered by `layout`.
///
/// # Errors
///
/// `FlatIndexOutOfRange` if `flat >= size_of(shape)`.
///
/// # Examples
///
/// ```
/// use tenx_core::{unravel_index, Layout};
///
/// let idx = unravel_index(5, &[2, 3], Layout::RowMajor).unwrap();
/// assert_eq!(idx.as_slice(), &[1, 2]);
///
/// let idx = unravel_index(1, &[2, 3], Layout::ColumnMajor).unwrap();
/// assert_eq!(idx.as_slice(), &[1, 0]);
/// ```
pub fn unravel_index(flat: usize, shape: &[usize], layout: Layout) -> Result<Index> {
    let size = size_of(shape);
    if flat >= size {
        return Err(TensorError::FlatIndexOutOfRange { index: flat, size });
    }
    let mut out = Index::new();
    unravel_index_into(flat, shape, layout, &mut out);
    Ok(out)
}

/// [`unravel_index`] into a caller-provided buffer, without bounds checking.
///
/// `out` is resized to the rank of `shape`. Row-major peels axes from last to
/// first, column-major from first to last.
#[inline]
pub fn unravel_index_into(mut flat: usize, shape: &[usize], layout: Layout, out: &mut Index) {
    let rank = shape.len();
    out.clear();
    out.resize(rank, 0);
    let mut peel = |axis: usize| {
        let n = shape[axis];
        if n != 0 {
            out[axis] = flat % n;
            flat /= n;
        }
    };
    match layout {
        Layout::RowMajor => (0..rank).rev().for_each(&mut peel),
        Layout::ColumnMajor => (0..rank).for_each(&mut peel),
    }
}

/// Concatenate two shapes (rank of an outer product).
///
/// # Examples
///
/// ```
/// use tenx_core::shape_cat;
///
/// assert_eq!(shape_cat(&[2, 3], &[4]).as_slice(), &[2, 3, 4]);
/// ```
pub fn shape_cat(a: &[usize], b: &[usize]) -> Shape {
    a.iter().chain(b).copied().collect()
}

/// Resolve a possibly negative axis against `rank`.
///
/// # Examples
///
/// ```
/// use tenx_core::normalize_axis;
///
/// assert_eq!(normalize_axis(-1, 3).unwrap(), 2);
/// assert_eq!(normalize_axis(1, 3).unwrap(), 1);
/// assert!(normalize_axis(3, 3).is_err());
/// ```
pub fn normalize_axis(axis: isize, rank: usize) -> Result<usize> {
    let resolved = if axis < 0 {
        axis + rank as isize
    } else {
        axis
    };
    if resolved < 0 || resolved as usize >= rank {
        return Err(TensorError::AxisOutOfRange { axis, rank });
    }
    Ok(resolved as usize)
}

/// Check that `perm` is a permutation of `0..rank`.
pub fn validate_permutation(perm: &[usize], rank: usize) -> Result<()> {
    let invalid = || TensorError::InvalidPermutation {
        perm: perm.to_vec(),
        rank,
    };
    if perm.len() != rank {
        return Err(invalid());
    }
    let mut seen: SmallSeen = smallvec::smallvec![false; rank];
    for &axis in perm {
        if axis >= rank || seen[axis] {
            return Err(invalid());
        }
        seen[axis] = true;
    }
    Ok(())
}

type SmallSeen = smallvec::SmallVec<[bool; 6]>;

/// Inverse of a valid permutation: `inv[perm[i]] == i`.
pub fn invert_permutation(perm: &[usize]) -> Index {
    let mut inv: Index = smallvec::smallvec![0; perm.len()];
    for (i, &p) in perm.iter().enumerate() {
        inv[p] = i;
    }
    inv
}

/// Whether `strides` describe a gap-free buffer for `shape` in `layout`.
///
/// Axes of extent 1 may carry any stride.
pub fn is_contiguous_for(shape: &[usize], strides: &[isize], layout: Layout) -> bool {
    if size_of(shape) == 0 {
        return true;
    }
    let expected = make_strides(shape, layout);
    shape
        .iter()
        .zip(strides.iter().zip(expected.iter()))
        .all(|(&n, (&s, &e))| n == 1 || s == e)
}

/// Advance `index` to the next coordinate of `shape` in `layout` order.
///
/// Returns `false` once the walk wraps around past the last coordinate.
#[inline]
pub(crate) fn increment_index(index: &mut [usize], shape: &[usize], layout: Layout) -> bool {
    let mut step = |axis: usize| {
        index[axis] += 1;
        if index[axis] < shape[axis] {
            return true;
        }
        index[axis] = 0;
        false
    };
    match layout {
        Layout::RowMajor => (0..shape.len()).rev().any(&mut step),
        Layout::ColumnMajor => (0..shape.len()).any(&mut step),
    }
}

/// Visit every coordinate of `shape` once, in `layout` order.
pub(crate) fn for_each_index<F: FnMut(&[usize])>(shape: &[usize], layout: Layout, mut f: F) {
    if size_of(shape) == 0 {
        return;
    }
    let mut index: Index = smallvec::smallvec![0; shape.len()];
    loop {
        f(&index);
        if !increment_index(&mut index, shape, layout) {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_strides_both_layouts() {
        assert_eq!(make_strides(&[5], Layout::RowMajor).as_slice(), &[1]);
        assert_eq!(make_strides(&[2, 3], Layout::RowMajor).as_slice(), &[3, 1]);
        assert_eq!(make_strides(&[2, 3], Layout::ColumnMajor).as_slice(), &[1, 2]);
        assert_eq!(
            make_strides(&[2, 0, 3], Layout::RowMajor).as_slice(),
            &[0, 3, 1]
        );
    }

    #[test]
    fn test_ravel_matches_strides() {
        let shape = [3, 4, 5];
        for layout in [Layout::RowMajor, Layout::ColumnMajor] {
            let strides = make_strides(&shape, layout);
            for i in 0..3 {
                for j in 0..4 {
                    for k in 0..5 {
                        let expected =
                            i as isize * strides[0] + j as isize * strides[1] + k as isize * strides[2];
                        let flat = ravel_index(&[i, j, k], &shape, layout).unwrap();
                        assert_eq!(flat as isize, expected);
                    }
                }
            }
        }
    }

    #[test]
    fn test_ravel_out_of_range() {
        let err = ravel_index(&[0, 3], &[2, 3], Layout::RowMajor).unwrap_err();
        assert!(matches!(err, TensorError::IndexOutOfRange { .. }));

        let err = ravel_index(&[0], &[2, 3], Layout::RowMajor).unwrap_err();
        assert!(matches!(
            err,
            TensorError::RankMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_unravel_round_trip() {
        let shape = [2, 3, 4];
        for layout in [Layout::RowMajor, Layout::ColumnMajor] {
            for flat in 0..24 {
                let idx = unravel_index(flat, &shape, layout).unwrap();
                assert_eq!(ravel_index(&idx, &shape, layout).unwrap(), flat);
            }
        }
    }

    #[test]
    fn test_unravel_out_of_range() {
        let err = unravel_index(6, &[2, 3], Layout::RowMajor).unwrap_err();
        assert_eq!(err, TensorError::FlatIndexOutOfRange { index: 6, size: 6 });
        assert!(unravel_index(0, &[2, 0], Layout::RowMajor).is_err());
    }

    #[test]
    fn test_unravel_orders() {
        let row = unravel_index(1, &[2, 3], Layout::RowMajor).unwrap();
        assert_eq!(row.as_slice(), &[0, 1]);
        let col = unravel_index(1, &[2, 3], Layout::ColumnMajor).unwrap();
        assert_eq!(col.as_slice(), &[1, 0]);
    }

    #[test]
    fn test_permutation_helpers() {
        assert!(validate_permutation(&[2, 0, 1], 3).is_ok());
        assert!(validate_permutation(&[0, 0, 1], 3).is_err());
        assert!(validate_permutation(&[0, 1], 3).is_err());
        assert!(validate_permutation(&[0, 1, 3], 3).is_err());
        assert_eq!(invert_permutation(&[2, 0, 1]).as_slice(), &[1, 2, 0]);
    }

    #[test]
    fn test_contiguity() {
        assert!(is_contiguous_for(&[2, 3], &[3, 1], Layout::RowMajor));
        assert!(!is_contiguous_for(&[2, 3], &[1, 2], Layout::RowMajor));
        assert!(is_contiguous_for(&[2, 3], &[1, 2], Layout::ColumnMajor));
        assert!(is_contiguous_for(&[1, 3], &[99, 1], Layout::RowMajor));
    }

    #[test]
    fn test_for_each_index_orders() {
        for layout in [Layout::RowMajor, Layout::ColumnMajor] {
            let mut visited = Vec::new();
            for_each_index(&[2, 3], layout, |idx| visited.push(idx.to_vec()));
            assert_eq!(visited.len(), 6);
            for (flat, idx) in visited.iter().enumerate() {
                assert_eq!(unravel_index(flat, &[2, 3], layout).unwrap().as_slice(), idx.as_slice());
            }
        }

        let mut count = 0;
        for_each_index(&[], Layout::RowMajor, |_| count += 1);
        assert_eq!(count, 1);
        for_each_index(&[4, 0], Layout::RowMajor, |_| count += 1);
        assert_eq!(count, 1);
    }
}
