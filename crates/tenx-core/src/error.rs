//! Error types for tensor construction, indexing and expression building
//!
//! Every fallible operation in this crate returns [`Result`], whose error type
//! is [`TensorError`]. Errors are raised eagerly: a broadcasting expression
//! with incompatible operands fails when it is built, never on first access.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::types::Shape;

/// Result alias used throughout tenx-core
pub type Result<T> = std::result::Result<T, TensorError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TensorError {
    #[error("cannot broadcast shapes {lhs:?} and {rhs:?}")]
    Broadcast { lhs: Shape, rhs: Shape },

    #[error("rank mismatch: expected {expected}, got {actual}")]
    RankMismatch { expected: usize, actual: usize },

    #[error("index {index:?} out of range for shape {shape:?}")]
    IndexOutOfRange { index: Vec<isize>, shape: Shape },

    #[error("flat index {index} out of range for size {size}")]
    FlatIndexOutOfRange { index: usize, size: usize },

    #[error("axis {axis} out of range for rank {rank}")]
    AxisOutOfRange { axis: isize, rank: usize },

    #[error("shape {shape:?} requires {expected} elements, but got {actual}")]
    SizeMismatch {
        shape: Shape,
        expected: usize,
        actual: usize,
    },

    #[error("cannot reshape shape {from:?} into {to:?}")]
    IncompatibleReshape { from: Shape, to: Shape },

    #[error("cannot squeeze axis {axis} with extent {extent}")]
    InvalidSqueeze { axis: usize, extent: usize },

    #[error("operation requires a contiguous view (shape {shape:?}, strides {strides:?})")]
    NotContiguous { shape: Shape, strides: Vec<isize> },

    #[error("invalid permutation {perm:?} for rank {rank}")]
    InvalidPermutation { perm: Vec<usize>, rank: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed to allocate {elements} elements: {reason}")]
    Allocation { elements: usize, reason: String },
}

/// Coarse classification of a [`TensorError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Operand shapes cannot be reconciled (broadcast, rank, element count)
    Shape,
    /// A coordinate, flat index or axis exceeds its extent
    OutOfRange,
    /// A structural request does not fit the tensor (squeeze, reshape, flatten)
    Structural,
    /// A malformed argument (zero step, bad permutation, ...)
    InvalidArgument,
    /// The allocator refused the request or a configured budget was exceeded
    Allocation,
}

impl TensorError {
    /// Classify this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use tenx_core::{broadcast_shapes, ErrorKind};
    ///
    /// let err = broadcast_shapes(&[&[2, 3], &[3, 2]]).unwrap_err();
    /// assert_eq!(err.kind(), ErrorKind::Shape);
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            TensorError::Broadcast { .. }
            | TensorError::RankMismatch { .. }
            | TensorError::SizeMismatch { .. } => ErrorKind::Shape,
            TensorError::IndexOutOfRange { .. }
            | TensorError::FlatIndexOutOfRange { .. }
            | TensorError::AxisOutOfRange { .. } => ErrorKind::OutOfRange,
            TensorError::IncompatibleReshape { .. }
            | TensorError::InvalidSqueeze { .. }
            | TensorError::NotContiguous { .. } => ErrorKind::Structural,
            TensorError::InvalidPermutation { .. } | TensorError::InvalidArgument(_) => {
                ErrorKind::InvalidArgument
            }
            TensorError::Allocation { .. } => ErrorKind::Allocation,
        }
    }

    pub(crate) fn index_out_of_range(index: &[usize], shape: &[usize]) -> Self {
        TensorError::IndexOutOfRange {
            index: index.iter().map(|&i| i as isize).collect(),
            shape: Shape::from_slice(shape),
        }
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        TensorError::InvalidArgument(message.into())
    }

    pub(crate) fn allocation(elements: usize, source: TryReserveError) -> Self {
        TensorError::Allocation {
            elements,
            reason: source.to_string(),
        }
    }
}
