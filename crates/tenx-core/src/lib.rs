//! # tenx-core
//!
//! Lazy N-dimensional tensor expressions with NumPy-style broadcasting,
//! zero-copy views and explicit materialization.
//!
//! This crate provides the foundational building blocks of the tenx stack:
//!
//! - **Shape math** ([`make_strides`], [`ravel_index`], [`unravel_index`]) for row- and column-major layouts
//! - **The [`Expression`] trait**: anything with a shape, a layout and an element at every index
//! - **Broadcasting** ([`broadcast_shapes`], [`BroadcastExpr`]) under the NumPy rules
//! - **Lazy element-wise expressions** ([`UnaryExpr`], [`BinaryExpr`], [`OuterExpr`], [`ElementWiseExpr`])
//! - **Generators** ([`arange`], [`linspace`], [`logspace`], [`eye`], ...) that allocate nothing
//! - **Structural views** ([`TransposeExpr`], [`ReverseExpr`], [`RotateExpr`], [`ReshapeExpr`])
//! - **Strided and indirect views** ([`TensorView`], [`IndirectView`]) sharing a tensor's buffer
//! - **Materialization** ([`materialize`], [`Tensor`]) into owning dense storage
//!
//! ## Core Principles
//!
//! ### Laziness
//!
//! Building an expression never evaluates an element. Work happens only when
//! an element is read (`eval`, iteration) or the whole expression is
//! materialized into a [`Tensor`].
//!
//! ### SciRS2 Integration
//!
//! Numeric traits, complex numbers and n-dimensional array interop all come
//! from `scirs2-core` (`scirs2_core::numeric`, `scirs2_core::num_complex`,
//! `scirs2_core::ndarray_ext`).
//!
//! ### Memory Layout
//!
//! Tensors default to row-major (C) order; column-major (Fortran) order is
//! available everywhere a layout can be chosen. When operands disagree, the
//! combined expression iterates in row-major order.
//!
//! ### Safety
//!
//! No unsafe code. Checked accessors ([`Expression::get`], [`ExpressionMut::set`])
//! return errors; raw `eval` and `tensor[&[..]]` assume an in-range index and
//! panic otherwise.
//!
//! ## Quick Start
//!
//! ```
//! use tenx_core::{Expression, ExpressionExt, Tensor};
//!
//! let a = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0], &[1, 3]).unwrap();
//! let b = Tensor::from_vec(vec![10.0_f64, 20.0], &[2, 1]).unwrap();
//!
//! // Nothing is computed here
//! let e = (&a + &b) * 2.0;
//! assert_eq!(e.shape(), &[2, 3]);
//!
//! // Single elements are computed on demand
//! assert_eq!(e.eval(&[1, 2]), 46.0);
//!
//! // Or the whole expression at once
//! let t = e.to_tensor();
//! assert_eq!(t.data(), &[22.0, 24.0, 26.0, 42.0, 44.0, 46.0]);
//! ```
//!
//! ## Generators
//!
//! ```
//! use tenx_core::{arange, eye, linspace, Expression};
//!
//! let r = arange(0, 10, 3).unwrap();
//! assert_eq!(r.iter().collect::<Vec<_>>(), vec![0, 3, 6, 9]);
//!
//! let l = linspace(0.0_f64, 1.0, 3, true).unwrap();
//! assert_eq!(l.iter().collect::<Vec<_>>(), vec![0.0, 0.5, 1.0]);
//!
//! let i = eye::<i32>(2, 3, 1);
//! assert_eq!(i.iter().collect::<Vec<_>>(), vec![0, 1, 0, 0, 0, 1]);
//! ```
//!
//! ## Views and Zero-Copy Operations
//!
//! ```
//! use tenx_core::{s, Expression, ExpressionMut, Tensor};
//!
//! let mut t = Tensor::from_vec((0..12).collect::<Vec<i32>>(), &[3, 4]).unwrap();
//!
//! // Read-only strided view
//! let odd_cols = t.slice(&s![.., 1..;2]).unwrap();
//! assert_eq!(odd_cols.iter().collect::<Vec<_>>(), vec![1, 3, 5, 7, 9, 11]);
//!
//! // Writes through a mutable view land in the tensor
//! t.slice_mut(&s![-1, ..]).unwrap().fill(0);
//! assert_eq!(t[&[2, 3]], 0);
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return [`Result<T, TensorError>`](TensorError):
//!
//! ```
//! use tenx_core::{ErrorKind, ExpressionExt, Tensor};
//!
//! let a = Tensor::<f64>::zeros(&[2, 3]);
//! let b = Tensor::<f64>::zeros(&[3, 2]);
//! let err = (&a).zip_with(&b, |x, y| x + y).unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::Shape);
//! ```
//!
//! Arithmetic operators cannot fail gracefully and panic on incompatible
//! shapes; see [`ops`].
//!
//! ## Integration with Other Crates
//!
//! - **tenx-kernels:** Reductions and matrix products over any [`Expression`]
//! - **tenx:** Facade re-exporting both crates with a prelude
//!
//! ## Features
//!
//! - `serde`: Enable serialization/deserialization support

pub mod broadcast;
pub mod dense;
pub mod elementwise;
pub mod error;
pub mod expr;
pub mod generators;
pub mod indirect;
pub mod iter;
pub mod materialize;
pub mod ops;
pub mod shape;
pub mod slice;
pub mod structural;
pub mod types;
pub mod view;

#[cfg(test)]
mod property_tests;

pub use broadcast::{
    broadcast_index, broadcast_shape2, broadcast_shapes, can_broadcast_to, BroadcastExpr,
};
pub use dense::Tensor;
pub use elementwise::{
    select, BinaryExpr, BinaryScalarExpr, ElementWiseExpr, OuterExpr, ScalarBinaryExpr,
    TernaryExpr, UnaryExpr,
};
pub use error::{ErrorKind, Result, TensorError};
pub use expr::{Expression, ExpressionExt, ExpressionMut};
pub use generators::{
    arange, diag_matrix, eye, full_expr, geomspace, identity, linspace, logspace, ones_expr, tril,
    triu, zeros_expr, ConstExpr, DiagMatrixExpr, DiagonalExpr, IdentityExpr, LogSequenceExpr,
    SequenceExpr, Triangle, TriangularExpr,
};
pub use indirect::{IndirectView, IndirectViewMut};
pub use iter::{FlatIter, IndexedIter};
pub use materialize::{materialize, materialize_with, EvalOptions};
pub use ops::{BinaryFn, Conj, UnaryFn};
pub use shape::{
    check_index, invert_permutation, is_contiguous_for, make_strides, normalize_axis,
    ravel_index, ravel_index_unchecked, shape_cat, size_of, unravel_index, unravel_index_into,
    validate_permutation,
};
pub use slice::{NewAxis, Slice, SliceArg};
pub use structural::{ReshapeExpr, ReverseExpr, RotateExpr, TransposeExpr};
pub use types::{Axis, Index, Layout, Rank, Shape, Strides};
pub use view::{TensorView, TensorViewMut};
