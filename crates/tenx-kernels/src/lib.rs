//! # tenx-kernels
//!
//! Reductions and products over tenx-core expressions.
//!
//! ## Overview
//!
//! Every kernel accepts anything implementing [`tenx_core::Expression`]:
//! dense tensors, views, generators and lazy expressions alike. Kernels that
//! produce a scalar evaluate eagerly; kernels that produce a tensor return a
//! new lazy expression.
//!
//! **Key Features:**
//! - **Full reductions** - `sum`, `prod`, `mean`, `min`, `max`
//! - **Axis reductions** - Lazy [`AxisReduceExpr`] with optional `keepdims`
//! - **Outer products** - Lazy pairwise [`outer`], materialized N-way [`outer_product`]
//! - **Matrix products** - [`dot`] and lazy batched [`matmul`] with broadcasting batch axes
//! - **Comparison** - [`allclose`] under broadcasting
//!
//! ## Quick Start
//!
//! ```rust
//! use tenx_core::{linspace, Expression, ExpressionExt, Tensor};
//! use tenx_kernels::{allclose, matmul, mean, sum_axis};
//!
//! let x = linspace(0.0_f64, 5.0, 6, true).unwrap().reshaped(&[2, 3]).unwrap();
//! assert_eq!(mean(&x).unwrap(), 2.5);
//!
//! // Row sums, still lazy
//! let rows = sum_axis(&x, 1, false).unwrap();
//! assert_eq!(rows.to_tensor().data(), &[3.0, 12.0]);
//!
//! // x · xᵀ
//! let gram = matmul(&x, (&x).transpose()).unwrap().to_tensor();
//! let expected = Tensor::from_vec(vec![5.0_f64, 14.0, 14.0, 50.0], &[2, 2]).unwrap();
//! assert!(allclose(&gram, &expected, 1e-12, 0.0).unwrap());
//! ```
//!
//! ## Composing Kernel Output
//!
//! Arithmetic operators are implemented on the core expression types. Kernel
//! expressions can appear on the right of an operator, or be combined with
//! [`ExpressionExt::map`](tenx_core::ExpressionExt::map) and
//! [`ExpressionExt::zip_with`](tenx_core::ExpressionExt::zip_with):
//!
//! ```rust
//! use tenx_core::{Expression, ExpressionExt, Tensor};
//! use tenx_kernels::mean_axis;
//!
//! let t = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0, 5.0, 7.0, 9.0], &[2, 3]).unwrap();
//! let centered = &t - mean_axis(&t, 1, true).unwrap();
//! assert_eq!(centered.to_tensor().data(), &[-1.0, 0.0, 1.0, -2.0, 0.0, 2.0]);
//! ```
//!
//! ## Errors
//!
//! Kernels report [`KernelError`]; failures from core constructors arrive
//! wrapped as [`KernelError::Tensor`].
//!
//! ## SciRS2 Integration
//!
//! Numeric traits come from `scirs2_core::numeric`.

pub mod error;
pub mod outer;
pub mod products;
pub mod reductions;


// Re-exports
pub use error::{KernelError, KernelResult};
pub use outer::*;
pub use products::*;
pub use reductions::*;
