//! Materialization of expressions into owning tensors
//!
//! Evaluation is the only place an expression touches memory it does not
//! already borrow. [`materialize`] always succeeds (short of the allocator
//! aborting); [`materialize_with`] lets the caller choose the output layout
//! and cap the allocation, reporting failures as [`TensorError::Allocation`].

use crate::dense::Tensor;
use crate::error::{Result, TensorError};
use crate::expr::Expression;
use crate::shape::{for_each_index, size_of};
use crate::types::Layout;

/// Options controlling [`materialize_with`].
///
/// # Examples
///
/// ```
/// use tenx_core::{materialize_with, EvalOptions, Expression, Layout, Tensor};
///
/// let t = Tensor::from_vec(vec![1, 2, 3, 4], &[2, 2]).unwrap();
/// let opts = EvalOptions::column_major().with_max_elements(16);
/// let c = materialize_with(&t, &opts).unwrap();
/// assert_eq!(c.layout(), Layout::ColumnMajor);
/// assert_eq!(c.data(), &[1, 3, 2, 4]);
///
/// let tiny = EvalOptions::new().with_max_elements(3);
/// assert!(materialize_with(&t, &tiny).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvalOptions {
    /// Output layout; `None` keeps the expression's own layout
    pub layout: Option<Layout>,
    /// Refuse to allocate more than this many elements
    pub max_elements: Option<usize>,
}

impl EvalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row_major() -> Self {
        Self::new().with_layout(Layout::RowMajor)
    }

    pub fn column_major() -> Self {
        Self::new().with_layout(Layout::ColumnMajor)
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn with_max_elements(mut self, max_elements: usize) -> Self {
        self.max_elements = Some(max_elements);
        self
    }
}

/// Evaluate every element of `expr` into a new tensor in the expression's layout.
///
/// Each element is evaluated exactly once, in layout order.
///
/// # Examples
///
/// ```
/// use tenx_core::{materialize, Expression, ExpressionExt, Tensor};
///
/// let a = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0], &[3]).unwrap();
/// let squares = materialize(&(&a).map(|x| x * x));
/// assert_eq!(squares.data(), &[1.0, 4.0, 9.0]);
/// ```
pub fn materialize<E>(expr: &E) -> Tensor<E::Elem>
where
    E: Expression + ?Sized,
{
    let layout = expr.layout();
    let shape = expr.shape();
    let mut data = Vec::with_capacity(size_of(shape));
    for_each_index(shape, layout, |idx| data.push(expr.eval(idx)));
    log::trace!("materialized {} elements of shape {:?}", data.len(), shape);
    Tensor::from_parts(data, shape, layout)
}

/// Like [`materialize`], honoring `options`.
///
/// Fails with [`TensorError::Allocation`] when the element count exceeds
/// `max_elements` or the buffer cannot be reserved. Nothing is evaluated on
/// failure.
pub fn materialize_with<E>(expr: &E, options: &EvalOptions) -> Result<Tensor<E::Elem>>
where
    E: Expression + ?Sized,
{
    let layout = options.layout.unwrap_or_else(|| expr.layout());
    let shape = expr.shape();
    let n = size_of(shape);

    if let Some(limit) = options.max_elements {
        if n > limit {
            log::debug!("refusing to materialize {n} elements (limit {limit})");
            return Err(TensorError::Allocation {
                elements: n,
                reason: format!("exceeds the limit of {limit} elements"),
            });
        }
    }

    let mut data = Vec::new();
    data.try_reserve_exact(n)
        .map_err(|e| TensorError::allocation(n, e))?;
    for_each_index(shape, layout, |idx| data.push(expr.eval(idx)));
    Ok(Tensor::from_parts(data, shape, layout))
}
