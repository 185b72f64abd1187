//! # tenx - Lazy Tensor Expressions
//!
//! NumPy-style N-dimensional tensors where every operation builds a lazy
//! expression and nothing is computed until an element is read or the
//! expression is materialized.
//!
//! This is the **meta crate** that re-exports all tenx components for convenient access.
//!
//! ## Quick Start
//!
//! ```
//! use tenx::prelude::*;
//!
//! let a = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0], &[1, 3])?;
//! let b = Tensor::from_vec(vec![10.0_f64, 20.0], &[2, 1])?;
//!
//! // Broadcast to (2, 3); nothing evaluated yet
//! let e = (&a + &b) * 2.0;
//! assert_eq!(e.shape(), &[2, 3]);
//!
//! // Reduce without materializing the intermediate
//! assert_eq!(sum(&e), 204.0);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ## Components
//!
//! ### Core Expressions ([`core`])
//!
//! Shapes and layouts, the `Expression` trait, broadcasting, generators,
//! structural and strided views, materialization.
//!
//! ```
//! use tenx::core::{s, Expression, Tensor};
//!
//! let t = Tensor::from_vec((0..12).collect::<Vec<i32>>(), &[3, 4]).unwrap();
//! let v = t.slice(&s![.., ..;-2]).unwrap();
//! assert_eq!(v.shape(), &[3, 2]);
//! assert_eq!(v.eval(&[0, 0]), 3);
//! ```
//!
//! ### Kernels ([`kernels`])
//!
//! Reductions, outer and matrix products.
//!
//! ```
//! use tenx::core::{ExpressionExt, Tensor};
//! use tenx::kernels::matmul;
//!
//! let a = Tensor::from_vec(vec![1, 2, 3, 4], &[2, 2]).unwrap();
//! let sq = matmul(&a, &a).unwrap().to_tensor();
//! assert_eq!(sq.data(), &[7, 10, 15, 22]);
//! ```
//!
//! ## Features
//!
//! - `serde`: Serialization for `Tensor`, `Layout` and `EvalOptions`

pub use tenx_core as core;
pub use tenx_kernels as kernels;

pub mod prelude {
    //! Prelude module for convenient imports
    //!
    //! # Example
    //!
    //! ```
    //! use tenx::prelude::*;
    //!
    //! let t = Tensor::<f64>::zeros(&[10, 20, 30]);
    //! assert_eq!(t.shape(), &[10, 20, 30]);
    //! ```

    // Core types and traits
    pub use crate::core::{
        s, EvalOptions, Expression, ExpressionExt, ExpressionMut, Layout, Tensor, TensorError,
        TensorView, TensorViewMut,
    };

    // Generators
    pub use crate::core::{arange, eye, identity, linspace, logspace};

    // Materialization
    pub use crate::core::{materialize, materialize_with};

    // Common kernels
    pub use crate::kernels::{
        allclose, dot, matmul, max, mean, min, outer, sum, sum_axis, KernelError,
    };
}
