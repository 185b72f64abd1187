//! Core type definitions for tenx tensors.
//!
//! This module defines the vocabulary shared by every expression, view and
//! dense tensor in the crate:
//!
//! - Type aliases for tensor dimensions ([`Axis`], [`Rank`], [`Shape`], [`Index`], [`Strides`])
//! - Memory/iteration order ([`Layout`])
//!
//! # Examples
//!
//! ```
//! use tenx_core::{Layout, Shape, make_strides};
//!
//! let shape: Shape = Shape::from_slice(&[2, 3, 4]);
//! assert_eq!(make_strides(&shape, Layout::RowMajor).as_slice(), &[12, 4, 1]);
//! assert_eq!(make_strides(&shape, Layout::ColumnMajor).as_slice(), &[1, 2, 6]);
//! ```

use smallvec::SmallVec;

/// Type alias for tensor axis index.
///
/// Zero-indexed (0 is the first axis).
pub type Axis = usize;

/// Type alias for tensor rank (number of dimensions).
///
/// # Examples
///
/// ```
/// use tenx_core::{Rank, Tensor};
///
/// let matrix = Tensor::<f64>::zeros(&[2, 3]);
/// let rank: Rank = matrix.rank();
/// assert_eq!(rank, 2);
/// ```
pub type Rank = usize;

/// Per-axis sizes of a tensor.
///
/// Uses SmallVec to avoid heap allocation for tensors with up to 6 axes,
/// falling back to the heap for higher ranks. A size of 0 on any axis makes
/// the tensor empty.
pub type Shape = SmallVec<[usize; 6]>;

/// A coordinate inside a tensor, one component per axis.
///
/// Structurally identical to [`Shape`]; an index is valid for a shape when it
/// has the same rank and `index[i] < shape[i]` on every axis.
pub type Index = SmallVec<[usize; 6]>;

/// Signed per-axis buffer multipliers.
///
/// Strides are signed because slicing with a negative step walks the buffer
/// backwards.
pub type Strides = SmallVec<[isize; 6]>;

/// Order in which a flat position maps onto a coordinate.
///
/// For owning tensors this is the storage order of the buffer; for lazy
/// expressions it is the order of iteration. The two may differ: a row-major
/// tensor can be walked in column-major order with
/// [`Expression::iter_order`](crate::Expression::iter_order).
///
/// # Examples
///
/// ```
/// use tenx_core::{Expression, Layout, Tensor};
///
/// let t = Tensor::from_vec(vec![1, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
/// let row: Vec<i32> = t.iter_order(Layout::RowMajor).collect();
/// let col: Vec<i32> = t.iter_order(Layout::ColumnMajor).collect();
/// assert_eq!(row, vec![1, 2, 3, 4, 5, 6]);
/// assert_eq!(col, vec![1, 4, 2, 5, 3, 6]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Layout {
    /// Last axis varies fastest (C order)
    #[default]
    RowMajor,
    /// First axis varies fastest (Fortran order)
    ColumnMajor,
}

impl Layout {
    /// Layout shared by two operands, row-major when they disagree.
    pub fn common(self, other: Layout) -> Layout {
        if self == other {
            self
        } else {
            Layout::RowMajor
        }
    }

    /// The opposite order
    pub fn transposed(self) -> Layout {
        match self {
            Layout::RowMajor => Layout::ColumnMajor,
            Layout::ColumnMajor => Layout::RowMajor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_common_tie_break() {
        assert_eq!(Layout::RowMajor.common(Layout::RowMajor), Layout::RowMajor);
        assert_eq!(
            Layout::ColumnMajor.common(Layout::ColumnMajor),
            Layout::ColumnMajor
        );
        assert_eq!(Layout::ColumnMajor.common(Layout::RowMajor), Layout::RowMajor);
        assert_eq!(Layout::RowMajor.common(Layout::ColumnMajor), Layout::RowMajor);
    }

    #[test]
    fn test_layout_default_and_transposed() {
        assert_eq!(Layout::default(), Layout::RowMajor);
        assert_eq!(Layout::RowMajor.transposed(), Layout::ColumnMajor);
        assert_eq!(Layout::ColumnMajor.transposed(), Layout::RowMajor);
    }
}
