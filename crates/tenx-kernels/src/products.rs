//! Inner and matrix products
//!
//! # Operations
//!
//! - **Dot** - Inner product of two 1-D expressions
//! - **Matmul** - Lazy (batched) matrix product with broadcasting batch axes
//! - **Allclose** - Tolerance comparison under broadcasting
//!
//! Matrix products treat the last two axes of each operand as the matrix and
//! every leading axis as a batch axis. Batch axes are aligned from the right
//! and broadcast under the usual rules, so a `(3, 2, 4)` stack can be
//! multiplied by a single `(4, 5)` matrix.

use std::ops::Mul;

use scirs2_core::numeric::{Float, Zero};
use tenx_core::{broadcast_index, BinaryExpr, Expression, Index, Layout, Shape};

use crate::error::{KernelError, KernelResult};

/// Inner product of two 1-D expressions
///
/// # Errors
///
/// - [`KernelError::IncompatibleShapes`] if either operand is not 1-D
/// - [`KernelError::DimensionMismatch`] if the lengths differ
///
/// # Examples
///
/// ```
/// use tenx_core::Tensor;
/// use tenx_kernels::dot;
///
/// let a = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0], &[3]).unwrap();
/// let b = Tensor::from_vec(vec![4.0_f64, 5.0, 6.0], &[3]).unwrap();
/// assert_eq!(dot(&a, &b).unwrap(), 32.0);
/// ```
pub fn dot<A, B, T>(a: &A, b: &B) -> KernelResult<T>
where
    A: Expression<Elem = T>,
    B: Expression<Elem = T>,
    T: Zero + Mul<Output = T>,
{
    if a.rank() != 1 || b.rank() != 1 {
        return Err(KernelError::incompatible_shapes(
            "dot",
            a.shape(),
            b.shape(),
            "both operands must be 1-D",
        ));
    }
    if a.size() != b.size() {
        return Err(KernelError::dimension_mismatch(
            "dot",
            a.shape().to_vec(),
            b.shape().to_vec(),
            "operand lengths must match",
        ));
    }
    Ok(a.iter()
        .zip(b.iter())
        .fold(T::zero(), |acc, (x, y)| acc + x * y))
}

/// Lazy matrix product.
///
/// Element `[..batch, i, j]` is `Σₖ lhs[..batch, i, k] × rhs[..batch, k, j]`,
/// with the batch coordinates broadcast onto each operand.
#[derive(Debug, Clone)]
pub struct MatmulExpr<A, B> {
    lhs: A,
    rhs: B,
    shape: Shape,
    inner: usize,
    layout: Layout,
}

impl<A: Expression, B: Expression> MatmulExpr<A, B> {
    pub fn new(lhs: A, rhs: B) -> KernelResult<Self> {
        let (ls, rs) = (lhs.shape(), rhs.shape());
        if ls.len() < 2 || rs.len() < 2 {
            return Err(KernelError::incompatible_shapes(
                "matmul",
                ls,
                rs,
                "operands must have rank >= 2",
            ));
        }

        let (lb, lm) = ls.split_at(ls.len() - 2);
        let (rb, rm) = rs.split_at(rs.len() - 2);
        if lm[1] != rm[0] {
            return Err(KernelError::dimension_mismatch(
                "matmul",
                vec![lm[1]],
                vec![rm[0]],
                format!("inner dimensions of {:?} and {:?} differ", ls, rs),
            ));
        }

        let mut shape = batch_shape(lb, rb).ok_or_else(|| {
            KernelError::incompatible_shapes("matmul", ls, rs, "batch axes do not broadcast")
        })?;
        shape.push(lm[0]);
        shape.push(rm[1]);

        let layout = lhs.layout().common(rhs.layout());
        log::debug!("matmul {:?} x {:?} -> {:?}", ls, rs, shape);
        Ok(MatmulExpr {
            inner: lm[1],
            lhs,
            rhs,
            shape,
            layout,
        })
    }

    pub fn lhs(&self) -> &A {
        &self.lhs
    }

    pub fn rhs(&self) -> &B {
        &self.rhs
    }

    /// Length of the contracted axis
    pub fn inner_len(&self) -> usize {
        self.inner
    }
}

// Right-aligned broadcast of two batch shapes of any rank
fn batch_shape(a: &[usize], b: &[usize]) -> Option<Shape> {
    let rank = a.len().max(b.len());
    let extent = |s: &[usize], axis: usize| {
        let lead = rank - s.len();
        if axis < lead {
            1
        } else {
            s[axis - lead]
        }
    };
    (0..rank)
        .map(|axis| match (extent(a, axis), extent(b, axis)) {
            (x, y) if x == y => Some(x),
            (1, y) => Some(y),
            (x, 1) => Some(x),
            _ => None,
        })
        .collect()
}

impl<A, B, T> Expression for MatmulExpr<A, B>
where
    A: Expression<Elem = T>,
    B: Expression<Elem = T>,
    T: Zero + Mul<Output = T>,
{
    type Elem = T;

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn layout(&self) -> Layout {
        self.layout
    }

    fn eval(&self, index: &[usize]) -> T {
        let (batch, ij) = index.split_at(index.len() - 2);
        let (ls, rs) = (self.lhs.shape(), self.rhs.shape());

        let mut li = Index::new();
        broadcast_index(batch, &ls[..ls.len() - 2], &mut li);
        li.push(ij[0]);
        li.push(0);
        let mut ri = Index::new();
        broadcast_index(batch, &rs[..rs.len() - 2], &mut ri);
        ri.push(0);
        ri.push(ij[1]);

        let (lk, rk) = (li.len() - 1, ri.len() - 2);
        (0..self.inner).fold(T::zero(), |acc, k| {
            li[lk] = k;
            ri[rk] = k;
            acc + self.lhs.eval(&li) * self.rhs.eval(&ri)
        })
    }
}

/// Lazy matrix product of two expressions of rank at least 2
///
/// # Errors
///
/// - [`KernelError::IncompatibleShapes`] if an operand has rank < 2 or the
///   batch axes do not broadcast
/// - [`KernelError::DimensionMismatch`] if the inner dimensions differ
///
/// # Complexity
///
/// Time: O(K) per element read, where K is the inner dimension
/// Space: O(rank)
///
/// # Examples
///
/// ```
/// use tenx_core::{Expression, ExpressionExt, Tensor};
/// use tenx_kernels::matmul;
///
/// let a = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
/// let b = Tensor::from_vec(vec![1.0_f64, 0.0, 0.0, 1.0, 1.0, 1.0], &[3, 2]).unwrap();
///
/// let c = matmul(&a, &b).unwrap();
/// assert_eq!(c.shape(), &[2, 2]);
/// assert_eq!(c.to_tensor().data(), &[4.0, 5.0, 10.0, 11.0]);
///
/// // batch of three against one matrix
/// let stack = Tensor::<f64>::ones(&[3, 2, 3]);
/// assert_eq!(matmul(&stack, &b).unwrap().shape(), &[3, 2, 2]);
/// ```
pub fn matmul<A, B>(lhs: A, rhs: B) -> KernelResult<MatmulExpr<A, B>>
where
    A: Expression,
    B: Expression,
{
    MatmulExpr::new(lhs, rhs)
}

/// Whether every element pair satisfies `|a - b| <= atol + rtol × |b|`
///
/// Operands broadcast against each other. NaN never compares close.
///
/// # Errors
///
/// [`KernelError::Tensor`] if the shapes do not broadcast.
///
/// # Examples
///
/// ```
/// use tenx_core::Tensor;
/// use tenx_kernels::allclose;
///
/// let a = Tensor::from_vec(vec![1.0_f64, 2.0], &[2]).unwrap();
/// let b = Tensor::from_vec(vec![1.0_f64 + 1e-10, 2.0], &[2]).unwrap();
/// assert!(allclose(&a, &b, 1e-8, 1e-12).unwrap());
/// ```
pub fn allclose<A, B, T>(a: A, b: B, rtol: T, atol: T) -> KernelResult<bool>
where
    A: Expression<Elem = T>,
    B: Expression<Elem = T>,
    T: Float,
{
    let pairs = BinaryExpr::new(
        |x: T, y: T| (x - y).abs() <= atol + rtol * y.abs(),
        a,
        b,
    )?;
    Ok(pairs.iter().all(|close| close))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tenx_core::{ExpressionExt, Tensor};

    #[test]
    fn test_dot() {
        let a = Tensor::from_vec(vec![1, 2, 3], &[3]).unwrap();
        let b = Tensor::from_vec(vec![4, -5, 6], &[3]).unwrap();
        assert_eq!(dot(&a, &b).unwrap(), 12);

        let empty = Tensor::<i32>::zeros(&[0]);
        assert_eq!(dot(&empty, &empty).unwrap(), 0);
    }

    #[test]
    fn test_dot_errors() {
        let a = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0], &[3]).unwrap();
        let b = Tensor::from_vec(vec![1.0_f64, 2.0], &[2]).unwrap();
        assert!(matches!(
            dot(&a, &b),
            Err(KernelError::DimensionMismatch { .. })
        ));
        let m = Tensor::<f64>::zeros(&[3, 1]);
        assert!(matches!(
            dot(&a, &m),
            Err(KernelError::IncompatibleShapes { .. })
        ));
    }

    #[test]
    fn test_matmul_identity() {
        let a = Tensor::from_vec((0..6).collect::<Vec<i64>>(), &[2, 3]).unwrap();
        let id = tenx_core::identity::<i64>(3);
        let c = matmul(&a, &id).unwrap().to_tensor();
        assert_eq!(c, a);
    }

    #[test]
    fn test_matmul_lazy_operands() {
        let a = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
        // a^T a
        let c = matmul((&a).transpose(), &a).unwrap();
        assert_eq!(c.to_tensor().data(), &[10.0, 14.0, 14.0, 20.0]);
    }

    #[test]
    fn test_matmul_batch_broadcast() {
        let stack = Tensor::from_shape_fn(&[2, 1, 2, 2], |idx| (idx[0] + 1) as i32 * (idx[2] == idx[3]) as i32);
        let rhs = Tensor::from_shape_fn(&[3, 2, 2], |idx| (idx[0] * 4 + idx[1] * 2 + idx[2]) as i32);
        let c = matmul(&stack, &rhs).unwrap();
        assert_eq!(c.shape(), &[2, 3, 2, 2]);
        // stack[b] is (b+1) * I, so each output block is a scaled rhs block
        for (index, value) in c.indexed_iter() {
            let expect = (index[0] as i32 + 1) * rhs[&index[1..]];
            assert_eq!(value, expect);
        }
    }

    #[test]
    fn test_matmul_errors() {
        let v = Tensor::<f64>::zeros(&[3]);
        let m = Tensor::<f64>::zeros(&[3, 3]);
        assert!(matches!(
            matmul(&v, &m),
            Err(KernelError::IncompatibleShapes { .. })
        ));

        let a = Tensor::<f64>::zeros(&[2, 3]);
        let b = Tensor::<f64>::zeros(&[2, 3]);
        assert!(matches!(
            matmul(&a, &b),
            Err(KernelError::DimensionMismatch { .. })
        ));

        let x = Tensor::<f64>::zeros(&[2, 2, 3]);
        let y = Tensor::<f64>::zeros(&[3, 3, 2]);
        assert!(matches!(
            matmul(&x, &y),
            Err(KernelError::IncompatibleShapes { .. })
        ));
    }

    #[test]
    fn test_matmul_empty_inner() {
        let a = Tensor::<f64>::zeros(&[2, 0]);
        let b = Tensor::<f64>::zeros(&[0, 3]);
        let c = matmul(&a, &b).unwrap().to_tensor();
        assert_eq!(c, Tensor::zeros(&[2, 3]));
    }

    #[test]
    fn test_allclose() {
        let a = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0], &[1, 3]).unwrap();
        let b = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0 + 1e-9], &[1, 3]).unwrap();
        assert!(allclose(&a, &b, 1e-8, 0.0).unwrap());
        assert!(!allclose(&a, &b, 0.0, 0.0).unwrap());

        let col = Tensor::from_vec(vec![2.0_f64, 2.0], &[2, 1]).unwrap();
        let twos = Tensor::full(&[2, 3], 2.0);
        assert!(allclose(&twos, &col, 0.0, 0.0).unwrap());

        let nan = Tensor::from_vec(vec![f64::NAN], &[1]).unwrap();
        assert!(!allclose(&nan, &nan, 1.0, 1.0).unwrap());

        let bad = Tensor::<f64>::zeros(&[2, 2]);
        assert!(matches!(
            allclose(&a, &bad, 0.0, 0.0),
            Err(KernelError::Tensor(_))
        ));
    }
}
