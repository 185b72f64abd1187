//! Slice arguments and their NumPy-style resolution
//!
//! A slice request is a list of [`SliceArg`]s, one per source axis, plus
//! optional [`NewAxis`] insertions. Missing trailing arguments select the
//! whole axis.
//!
//! - `Index(i)`: select one position and drop the axis; negative `i` counts
//!   from the end; out of range is an error.
//! - `Range(Slice { start, end, step })`: negative bounds wrap once, then
//!   bounds are clamped to the axis; negative steps walk backwards; a zero
//!   step is an error.
//! - `NewAxis`: insert an axis of extent 1.
//!
//! Use the [`s!`](crate::s) macro to build argument lists:
//!
//! ```
//! use tenx_core::{s, Expression, NewAxis, Tensor};
//!
//! let t = Tensor::from_vec((0..12).collect::<Vec<i32>>(), &[3, 4]).unwrap();
//!
//! let row = t.slice(&s![1, ..]).unwrap();
//! assert_eq!(row.shape(), &[4]);
//! assert_eq!(row.iter().collect::<Vec<_>>(), vec![4, 5, 6, 7]);
//!
//! let rev = t.slice(&s![..;-1, 1..3]).unwrap();
//! assert_eq!(rev.iter().collect::<Vec<_>>(), vec![9, 10, 5, 6, 1, 2]);
//!
//! let col = t.slice(&s![.., NewAxis, 0]).unwrap();
//! assert_eq!(col.shape(), &[3, 1]);
//! ```

use std::ops::{Range, RangeFrom, RangeFull, RangeInclusive, RangeTo, RangeToInclusive};

use crate::error::{Result, TensorError};
use crate::types::{Shape, Strides};

/// A `start:end:step` range along one axis; `None` bounds are open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Slice {
    pub start: Option<isize>,
    pub end: Option<isize>,
    pub step: isize,
}

impl Slice {
    pub fn new(start: Option<isize>, end: Option<isize>, step: isize) -> Self {
        Slice { start, end, step }
    }

    /// The whole axis
    pub fn full() -> Self {
        Slice::new(None, None, 1)
    }

    pub fn step_by(self, step: isize) -> Self {
        Slice { step, ..self }
    }

    /// Resolve against an axis of extent `n`: `(first position, count)`.
    pub fn resolve(&self, n: usize) -> Result<(isize, usize)> {
        if self.step == 0 {
            return Err(TensorError::invalid_argument("slice step must be non-zero"));
        }
        let n = n as isize;
        let wrap = |v: isize| if v < 0 { v + n } else { v };
        if self.step > 0 {
            let start = self.start.map(wrap).unwrap_or(0).clamp(0, n);
            let end = self.end.map(wrap).unwrap_or(n).clamp(0, n);
            let count = if end > start {
                (end - start + self.step - 1) / self.step
            } else {
                0
            };
            Ok((start, count as usize))
        } else {
            let start = self.start.map(wrap).unwrap_or(n - 1).clamp(-1, n - 1);
            let end = self.end.map(wrap).unwrap_or(-1).clamp(-1, n - 1);
            let step = -self.step;
            let count = if start > end {
                (start - end + step - 1) / step
            } else {
                0
            };
            Ok((start, count as usize))
        }
    }
}

/// Marker for inserting a new axis of extent 1 in [`s!`](crate::s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NewAxis;

/// One element of a slice request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SliceArg {
    Index(isize),
    Range(Slice),
    NewAxis,
}

impl SliceArg {
    /// Replace the step of a range argument; other arguments are unchanged.
    pub fn step_by(self, step: isize) -> Self {
        match self {
            SliceArg::Range(slice) => SliceArg::Range(slice.step_by(step)),
            other => other,
        }
    }
}

impl From<Slice> for SliceArg {
    fn from(slice: Slice) -> Self {
        SliceArg::Range(slice)
    }
}

impl From<NewAxis> for SliceArg {
    fn from(_: NewAxis) -> Self {
        SliceArg::NewAxis
    }
}

impl From<RangeFull> for SliceArg {
    fn from(_: RangeFull) -> Self {
        SliceArg::Range(Slice::full())
    }
}

macro_rules! impl_slice_arg_from_int {
    ($($int:ty),*) => {$(
        impl From<$int> for SliceArg {
            fn from(i: $int) -> Self {
                SliceArg::Index(i as isize)
            }
        }

        impl From<Range<$int>> for SliceArg {
            fn from(r: Range<$int>) -> Self {
                SliceArg::Range(Slice::new(Some(r.start as isize), Some(r.end as isize), 1))
            }
        }

        impl From<RangeInclusive<$int>> for SliceArg {
            fn from(r: RangeInclusive<$int>) -> Self {
                let end = *r.end() as isize;
                // `..=-1` runs to the end of the axis
                let end = if end == -1 { None } else { Some(end + 1) };
                SliceArg::Range(Slice::new(Some(*r.start() as isize), end, 1))
            }
        }

        impl From<RangeFrom<$int>> for SliceArg {
            fn from(r: RangeFrom<$int>) -> Self {
                SliceArg::Range(Slice::new(Some(r.start as isize), None, 1))
            }
        }

        impl From<RangeTo<$int>> for SliceArg {
            fn from(r: RangeTo<$int>) -> Self {
                SliceArg::Range(Slice::new(None, Some(r.end as isize), 1))
            }
        }

        impl From<RangeToInclusive<$int>> for SliceArg {
            fn from(r: RangeToInclusive<$int>) -> Self {
                let end = r.end as isize;
                let end = if end == -1 { None } else { Some(end + 1) };
                SliceArg::Range(Slice::new(None, end, 1))
            }
        }
    )*};
}

impl_slice_arg_from_int!(i32, i64, isize, usize);

/// Build a `[SliceArg; N]` from NumPy-like syntax.
///
/// Each argument is an integer, a range, `..`, or [`NewAxis`]; `range;step`
/// sets a step (`..;-1` reverses an axis).
///
/// ```
/// use tenx_core::{s, Slice, SliceArg};
///
/// let args = s![1, 2..;2, ..;-1];
/// assert_eq!(args[0], SliceArg::Index(1));
/// assert_eq!(args[1], SliceArg::Range(Slice::new(Some(2), None, 2)));
/// assert_eq!(args[2], SliceArg::Range(Slice::new(None, None, -1)));
/// ```
#[macro_export]
macro_rules! s {
    ($($arg:expr $(; $step:expr)?),* $(,)?) => {
        [$( $crate::SliceArg::from($arg) $( .step_by($step) )? ),*]
    };
}

/// Resolved strided layout of a slice over `(shape, strides, offset)`.
pub(crate) fn apply_slice(
    shape: &[usize],
    strides: &[isize],
    offset: usize,
    args: &[SliceArg],
) -> Result<(Shape, Strides, usize)> {
    let consumed = args.iter().filter(|a| !matches!(a, SliceArg::NewAxis)).count();
    if consumed > shape.len() {
        return Err(TensorError::RankMismatch {
            expected: shape.len(),
            actual: consumed,
        });
    }

    let mut out_shape = Shape::new();
    let mut out_strides = Strides::new();
    let mut offset = offset as isize;
    let mut axis = 0;

    for arg in args {
        match *arg {
            SliceArg::NewAxis => {
                out_shape.push(1);
                out_strides.push(0);
            }
            SliceArg::Index(i) => {
                let n = shape[axis];
                let pos = if i < 0 { i + n as isize } else { i };
                if pos < 0 || pos >= n as isize {
                    return Err(TensorError::IndexOutOfRange {
                        index: vec![i],
                        shape: smallvec::smallvec![n],
                    });
                }
                offset += pos * strides[axis];
                axis += 1;
            }
            SliceArg::Range(slice) => {
                let (start, count) = slice.resolve(shape[axis])?;
                if count > 0 {
                    offset += start * strides[axis];
                }
                out_shape.push(count);
                out_strides.push(strides[axis] * slice.step);
                axis += 1;
            }
        }
    }
    out_shape.extend_from_slice(&shape[axis..]);
    out_strides.extend_from_slice(&strides[axis..]);

    Ok((out_shape, out_strides, offset as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_positive_steps() {
        assert_eq!(Slice::full().resolve(5).unwrap(), (0, 5));
        assert_eq!(Slice::new(Some(1), Some(4), 2).resolve(5).unwrap(), (1, 2));
        assert_eq!(Slice::new(Some(-2), None, 1).resolve(5).unwrap(), (3, 2));
        assert_eq!(Slice::new(Some(3), Some(100), 1).resolve(5).unwrap(), (3, 2));
        assert_eq!(Slice::new(Some(4), Some(2), 1).resolve(5).unwrap().1, 0);
        assert_eq!(Slice::new(Some(-100), Some(2), 1).resolve(5).unwrap(), (0, 2));
    }

    #[test]
    fn test_resolve_negative_steps() {
        assert_eq!(Slice::new(None, None, -1).resolve(5).unwrap(), (4, 5));
        assert_eq!(Slice::new(None, None, -2).resolve(5).unwrap(), (4, 3));
        assert_eq!(Slice::new(Some(3), Some(0), -1).resolve(5).unwrap(), (3, 3));
        assert_eq!(Slice::new(Some(100), None, -1).resolve(5).unwrap(), (4, 5));
        assert_eq!(Slice::new(Some(0), Some(3), -1).resolve(5).unwrap().1, 0);
    }

    #[test]
    fn test_resolve_zero_step_and_empty_axis() {
        assert!(Slice::new(None, None, 0).resolve(5).is_err());
        assert_eq!(Slice::full().resolve(0).unwrap().1, 0);
        assert_eq!(Slice::new(None, None, -1).resolve(0).unwrap().1, 0);
    }

    #[test]
    fn test_macro_conversions() {
        let args = s![0, 1..3, ..2, 3.., .., -1];
        assert_eq!(args[0], SliceArg::Index(0));
        assert_eq!(args[1], SliceArg::Range(Slice::new(Some(1), Some(3), 1)));
        assert_eq!(args[2], SliceArg::Range(Slice::new(None, Some(2), 1)));
        assert_eq!(args[3], SliceArg::Range(Slice::new(Some(3), None, 1)));
        assert_eq!(args[4], SliceArg::Range(Slice::full()));
        assert_eq!(args[5], SliceArg::Index(-1));

        let inclusive = s![1..=2, ..=-1];
        assert_eq!(inclusive[0], SliceArg::Range(Slice::new(Some(1), Some(3), 1)));
        assert_eq!(inclusive[1], SliceArg::Range(Slice::full()));
    }

    #[test]
    fn test_apply_slice_offsets() {
        // row-major 3x4
        let (shape, strides, offset) =
            apply_slice(&[3, 4], &[4, 1], 0, &s![1.., ..;-2]).unwrap();
        assert_eq!(shape.as_slice(), &[2, 2]);
        assert_eq!(strides.as_slice(), &[4, -2]);
        assert_eq!(offset, 4 + 3);
    }

    #[test]
    fn test_apply_slice_errors() {
        let err = apply_slice(&[3, 4], &[4, 1], 0, &s![3]).unwrap_err();
        assert!(matches!(err, TensorError::IndexOutOfRange { .. }));
        let err = apply_slice(&[3, 4], &[4, 1], 0, &s![0, 0, 0]).unwrap_err();
        assert!(matches!(err, TensorError::RankMismatch { .. }));
        assert!(apply_slice(&[3, 4], &[4, 1], 0, &s![..;0]).is_err());
        assert!(apply_slice(&[3, 4], &[4, 1], 0, &s![NewAxis, 0, 0]).is_ok());
    }

    #[test]
    fn test_empty_slice_adds_no_offset() {
        let (shape, _, offset) = apply_slice(&[3, 4], &[4, 1], 0, &s![2..1]).unwrap();
        assert_eq!(shape.as_slice(), &[0, 4]);
        assert_eq!(offset, 0);
    }
}
