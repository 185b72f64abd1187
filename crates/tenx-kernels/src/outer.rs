//! Outer products of expressions
//!
//! For operands u (shape I) and v (shape J), the outer product has shape
//! `I ++ J` and `T[i, j] = u[i] × v[j]`. The two-operand form is lazy; the
//! N-operand form materializes, since each element multiplies one value
//! from every operand.

use scirs2_core::numeric::One;
use tenx_core::{shape_cat, Expression, ExpressionExt, OuterExpr, Tensor};

use crate::error::{KernelError, KernelResult};

/// Multiplication as a plain function, so outer products have a nameable type.
pub type MulFn<T> = fn(T, T) -> T;

/// Lazy outer product of two expressions
///
/// # Arguments
///
/// * `u` - First operand with shape I
/// * `v` - Second operand with shape J
///
/// # Returns
///
/// An expression with shape `I ++ J`
///
/// # Complexity
///
/// Time: O(1) to build, O(1) per element read
/// Space: O(rank)
///
/// # Examples
///
/// ```
/// use tenx_core::{Expression, Tensor};
/// use tenx_kernels::outer;
///
/// let u = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0], &[3]).unwrap();
/// let v = Tensor::from_vec(vec![4.0_f64, 5.0], &[2]).unwrap();
/// let m = outer(&u, &v);
///
/// assert_eq!(m.shape(), &[3, 2]);
/// assert_eq!(m.eval(&[0, 0]), 4.0);   // 1*4
/// assert_eq!(m.eval(&[2, 1]), 15.0);  // 3*5
/// ```
pub fn outer<A, B, T>(u: A, v: B) -> OuterExpr<MulFn<T>, A, B>
where
    A: Expression<Elem = T>,
    B: Expression<Elem = T>,
    T: std::ops::Mul<Output = T>,
{
    u.outer_with(v, mul::<T> as MulFn<T>)
}

fn mul<T: std::ops::Mul<Output = T>>(a: T, b: T) -> T {
    a * b
}

/// Outer product of any number of operands, materialized
///
/// `T[i₁, ..., iₙ] = v₁[i₁] × ... × vₙ[iₙ]`, where each `iₖ` is a full
/// multi-index into the k-th operand.
///
/// # Errors
///
/// Returns [`KernelError::EmptyInput`] if `operands` is empty.
///
/// # Complexity
///
/// Time: O(n × ∏ sizes)
/// Space: O(∏ sizes)
///
/// # Examples
///
/// ```
/// use tenx_core::{Expression, Tensor};
/// use tenx_kernels::outer_product;
///
/// let a = Tensor::from_vec(vec![1, 2], &[2]).unwrap();
/// let b = Tensor::from_vec(vec![1, 10, 100], &[3]).unwrap();
/// let c = Tensor::from_vec(vec![1, -1], &[2]).unwrap();
///
/// let t = outer_product(&[&a as &dyn Expression<Elem = i32>, &b, &c]).unwrap();
/// assert_eq!(t.shape(), &[2, 3, 2]);
/// assert_eq!(t[&[1, 2, 1]], -200);
/// ```
pub fn outer_product<T>(operands: &[&dyn Expression<Elem = T>]) -> KernelResult<Tensor<T>>
where
    T: Clone + One,
{
    if operands.is_empty() {
        return Err(KernelError::empty_input("outer_product", "operands"));
    }

    let shape = operands
        .iter()
        .fold(tenx_core::Shape::new(), |acc, e| shape_cat(&acc, e.shape()));
    log::debug!(
        "outer product of {} operands -> {:?}",
        operands.len(),
        shape
    );

    Ok(Tensor::from_shape_fn(&shape, |index| {
        let mut start = 0;
        operands.iter().fold(T::one(), |acc, e| {
            let end = start + e.rank();
            let value = e.eval(&index[start..end]);
            start = end;
            acc * value
        })
    }))
}
