//! Structural views
//!
//! Views that reinterpret the coordinate space of an operand without copying
//! it: axis permutation, per-axis reflection, circular shift and reshape.
//! Each maps an output coordinate to an operand coordinate on access and is
//! writable whenever its operand is, so mutations through the view land in
//! the operand's storage.
//!
//! # Examples
//!
//! ```
//! use tenx_core::{Expression, ExpressionExt, ExpressionMut, Tensor};
//!
//! let mut t = Tensor::from_vec((0..6).collect::<Vec<i32>>(), &[2, 3]).unwrap();
//! {
//!     let mut tr = (&mut t).transpose();
//!     assert_eq!(tr.shape(), &[3, 2]);
//!     tr.set(&[2, 0], 42).unwrap();
//! }
//! assert_eq!(t[&[0, 2]], 42);
//! ```

use crate::error::{Result, TensorError};
use crate::expr::{Expression, ExpressionMut};
use crate::shape::{
    invert_permutation, ravel_index_unchecked, size_of, unravel_index_into, validate_permutation,
};
use crate::types::{Index, Layout, Shape};

type AxisMask = smallvec::SmallVec<[bool; 6]>;

/// Axis permutation: output axis `i` is operand axis `perm[i]`.
#[derive(Debug, Clone)]
pub struct TransposeExpr<A> {
    operand: A,
    perm: Index,
    inverse: Index,
    shape: Shape,
}

impl<A: Expression> TransposeExpr<A> {
    pub fn new(operand: A, perm: &[usize]) -> Result<Self> {
        validate_permutation(perm, operand.rank())?;
        let shape = perm.iter().map(|&p| operand.shape()[p]).collect();
        Ok(TransposeExpr {
            perm: Index::from_slice(perm),
            inverse: invert_permutation(perm),
            shape,
            operand,
        })
    }

    /// Reverse the order of all axes.
    pub fn reversed(operand: A) -> Self {
        let perm: Index = (0..operand.rank()).rev().collect();
        let shape = perm.iter().map(|&p| operand.shape()[p]).collect();
        TransposeExpr {
            inverse: invert_permutation(&perm),
            perm,
            shape,
            operand,
        }
    }

    pub fn permutation(&self) -> &[usize] {
        &self.perm
    }

    #[inline]
    fn operand_index(&self, index: &[usize]) -> Index {
        self.inverse.iter().map(|&axis| index[axis]).collect()
    }
}

impl<A: Expression> Expression for TransposeExpr<A> {
    type Elem = A::Elem;

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn layout(&self) -> Layout {
        self.operand.layout()
    }

    #[inline]
    fn eval(&self, index: &[usize]) -> A::Elem {
        self.operand.eval(&self.operand_index(index))
    }
}

impl<A: ExpressionMut> ExpressionMut for TransposeExpr<A> {
    #[inline]
    fn eval_mut(&mut self, index: &[usize]) -> &mut A::Elem {
        let mapped = self.operand_index(index);
        self.operand.eval_mut(&mapped)
    }
}

/// Mirror selected axes: `idx[a] -> shape[a] - 1 - idx[a]`.
///
/// ```
/// use tenx_core::{Expression, ExpressionExt, Tensor};
///
/// let t = Tensor::from_vec((0..6).collect::<Vec<i32>>(), &[2, 3]).unwrap();
/// let r = (&t).reverse(&[1]).unwrap();
/// assert_eq!(r.iter().collect::<Vec<_>>(), vec![2, 1, 0, 5, 4, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct ReverseExpr<A> {
    operand: A,
    mask: AxisMask,
}

impl<A: Expression> ReverseExpr<A> {
    pub fn new(operand: A, axes: &[usize]) -> Result<Self> {
        let rank = operand.rank();
        let mut mask: AxisMask = smallvec::smallvec![false; rank];
        for &axis in axes {
            if axis >= rank {
                return Err(TensorError::AxisOutOfRange {
                    axis: axis as isize,
                    rank,
                });
            }
            mask[axis] = true;
        }
        Ok(ReverseExpr { operand, mask })
    }

    /// Reverse every axis.
    pub fn all(operand: A) -> Self {
        let mask = smallvec::smallvec![true; operand.rank()];
        ReverseExpr { operand, mask }
    }

    #[inline]
    fn operand_index(&self, index: &[usize]) -> Index {
        index
            .iter()
            .zip(self.operand.shape())
            .zip(&self.mask)
            .map(|((&i, &n), &flip)| if flip { n - 1 - i } else { i })
            .collect()
    }
}

impl<A: Expression> Expression for ReverseExpr<A> {
    type Elem = A::Elem;

    fn shape(&self) -> &[usize] {
        self.operand.shape()
    }

    fn layout(&self) -> Layout {
        self.operand.layout()
    }

    #[inline]
    fn eval(&self, index: &[usize]) -> A::Elem {
        self.operand.eval(&self.operand_index(index))
    }
}

impl<A: ExpressionMut> ExpressionMut for ReverseExpr<A> {
    #[inline]
    fn eval_mut(&mut self, index: &[usize]) -> &mut A::Elem {
        let mapped = self.operand_index(index);
        self.operand.eval_mut(&mapped)
    }
}

/// Circular shift: `idx[a] -> (idx[a] + shift[a]) mod shape[a]`.
///
/// Shifts may be negative or exceed the axis extent.
///
/// ```
/// use tenx_core::{Expression, ExpressionExt, Tensor};
///
/// let t = Tensor::from_vec(vec![0, 1, 2, 3, 4], &[5]).unwrap();
/// let r = (&t).rotate(&[2]).unwrap();
/// assert_eq!(r.iter().collect::<Vec<_>>(), vec![2, 3, 4, 0, 1]);
///
/// // NumPy roll moves elements the other way
/// let r = (&t).roll(0, 2).unwrap();
/// assert_eq!(r.iter().collect::<Vec<_>>(), vec![3, 4, 0, 1, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct RotateExpr<A> {
    operand: A,
    shifts: smallvec::SmallVec<[isize; 6]>,
}

impl<A: Expression> RotateExpr<A> {
    /// One shift per axis.
    pub fn new(operand: A, shifts: &[isize]) -> Result<Self> {
        if shifts.len() != operand.rank() {
            return Err(TensorError::RankMismatch {
                expected: operand.rank(),
                actual: shifts.len(),
            });
        }
        Ok(RotateExpr {
            operand,
            shifts: shifts.iter().copied().collect(),
        })
    }

    /// Move every element along `axis` forward by `shift` (NumPy `roll`).
    pub fn roll(operand: A, axis: usize, shift: isize) -> Result<Self> {
        let rank = operand.rank();
        if axis >= rank {
            return Err(TensorError::AxisOutOfRange {
                axis: axis as isize,
                rank,
            });
        }
        let mut shifts = smallvec::smallvec![0; rank];
        shifts[axis] = -shift;
        Ok(RotateExpr { operand, shifts })
    }

    pub fn shifts(&self) -> &[isize] {
        &self.shifts
    }

    #[inline]
    fn operand_index(&self, index: &[usize]) -> Index {
        index
            .iter()
            .zip(self.operand.shape())
            .zip(&self.shifts)
            .map(|((&i, &n), &s)| {
                if s == 0 {
                    i
                } else {
                    (i as isize + s).rem_euclid(n as isize) as usize
                }
            })
            .collect()
    }
}

impl<A: Expression> Expression for RotateExpr<A> {
    type Elem = A::Elem;

    fn shape(&self) -> &[usize] {
        self.operand.shape()
    }

    fn layout(&self) -> Layout {
        self.operand.layout()
    }

    #[inline]
    fn eval(&self, index: &[usize]) -> A::Elem {
        self.operand.eval(&self.operand_index(index))
    }
}

impl<A: ExpressionMut> ExpressionMut for RotateExpr<A> {
    #[inline]
    fn eval_mut(&mut self, index: &[usize]) -> &mut A::Elem {
        let mapped = self.operand_index(index);
        self.operand.eval_mut(&mapped)
    }
}

/// Lazy reshape: elements keep their flat position under `order`.
///
/// ```
/// use tenx_core::{Expression, ExpressionExt, Tensor};
///
/// let t = Tensor::from_vec((0..6).collect::<Vec<i32>>(), &[2, 3]).unwrap();
/// let r = (&t).transpose().reshaped(&[6]).unwrap();
/// assert_eq!(r.iter().collect::<Vec<_>>(), vec![0, 3, 1, 4, 2, 5]);
/// ```
#[derive(Debug, Clone)]
pub struct ReshapeExpr<A> {
    operand: A,
    shape: Shape,
    order: Layout,
}

impl<A: Expression> ReshapeExpr<A> {
    pub fn new(operand: A, shape: &[usize], order: Layout) -> Result<Self> {
        if size_of(shape) != operand.size() {
            return Err(TensorError::IncompatibleReshape {
                from: Shape::from_slice(operand.shape()),
                to: Shape::from_slice(shape),
            });
        }
        Ok(ReshapeExpr {
            operand,
            shape: Shape::from_slice(shape),
            order,
        })
    }

    #[inline]
    fn operand_index(&self, index: &[usize]) -> Index {
        let flat = ravel_index_unchecked(index, &self.shape, self.order);
        let mut out = Index::new();
        unravel_index_into(flat, self.operand.shape(), self.order, &mut out);
        out
    }
}

impl<A: Expression> Expression for ReshapeExpr<A> {
    type Elem = A::Elem;

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn layout(&self) -> Layout {
        self.order
    }

    #[inline]
    fn eval(&self, index: &[usize]) -> A::Elem {
        self.operand.eval(&self.operand_index(index))
    }
}

impl<A: ExpressionMut> ExpressionMut for ReshapeExpr<A> {
    #[inline]
    fn eval_mut(&mut self, index: &[usize]) -> &mut A::Elem {
        let mapped = self.operand_index(index);
        self.operand.eval_mut(&mapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::Tensor;
    use crate::expr::ExpressionExt;
    use scirs2_core::num_complex::Complex;

    fn sample() -> Tensor<i32> {
        Tensor::from_vec((0..24).collect(), &[2, 3, 4]).unwrap()
    }

    #[test]
    fn test_transpose_default_reverses_axes() {
        let t = sample();
        let tr = (&t).transpose();
        assert_eq!(tr.shape(), &[4, 3, 2]);
        assert_eq!(tr.permutation(), &[2, 1, 0]);
        assert_eq!(tr.eval(&[3, 1, 0]), t.eval(&[0, 1, 3]));
    }

    #[test]
    fn test_permute_axes() {
        let t = sample();
        let p = (&t).permute_axes(&[1, 2, 0]).unwrap();
        assert_eq!(p.shape(), &[3, 4, 2]);
        for i in 0..3 {
            for j in 0..4 {
                for k in 0..2 {
                    assert_eq!(p.eval(&[i, j, k]), t.eval(&[k, i, j]));
                }
            }
        }
        assert!((&t).permute_axes(&[0, 0, 1]).is_err());
        assert!((&t).permute_axes(&[0, 1]).is_err());
    }

    #[test]
    fn test_transpose_involution() {
        let t = sample();
        let twice = (&t).transpose().transpose().to_tensor();
        assert_eq!(twice.shape(), t.shape());
        assert_eq!(twice.data(), t.data());
    }

    #[test]
    fn test_conj_transpose() {
        let m = Tensor::from_vec(
            vec![
                Complex::new(1.0_f64, 1.0),
                Complex::new(2.0, -1.0),
                Complex::new(3.0, 0.5),
                Complex::new(4.0, 0.0),
            ],
            &[2, 2],
        )
        .unwrap();
        let h = (&m).conj_transpose();
        assert_eq!(h.eval(&[0, 1]), Complex::new(3.0, -0.5));
        assert_eq!(h.eval(&[1, 0]), Complex::new(2.0, 1.0));

        let real = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
        let rt = (&real).conj_transpose();
        assert_eq!(rt.eval(&[0, 1]), 3.0);
    }

    #[test]
    fn test_reverse_axes() {
        let t = sample();
        let r = (&t).reverse(&[0, 2]).unwrap();
        assert_eq!(r.eval(&[0, 1, 0]), t.eval(&[1, 1, 3]));
        let all = ReverseExpr::all(&t);
        assert_eq!(all.eval(&[0, 0, 0]), 23);
        assert!((&t).reverse(&[3]).is_err());
    }

    #[test]
    fn test_rotate_negative_and_large_shifts() {
        let v = Tensor::from_vec(vec![0, 1, 2, 3, 4], &[5]).unwrap();
        let neg = (&v).rotate(&[-1]).unwrap();
        assert_eq!(neg.iter().collect::<Vec<_>>(), vec![4, 0, 1, 2, 3]);
        let big = (&v).rotate(&[7]).unwrap();
        assert_eq!(big.iter().collect::<Vec<_>>(), vec![2, 3, 4, 0, 1]);
        assert!((&v).rotate(&[1, 1]).is_err());
        assert!((&v).roll(1, 1).is_err());
    }

    #[test]
    fn test_writes_through_views() {
        let mut t = Tensor::from_vec((0..6).collect::<Vec<i32>>(), &[2, 3]).unwrap();
        {
            let mut r = (&mut t).reverse(&[1]).unwrap();
            r.set(&[0, 0], 100).unwrap();
        }
        assert_eq!(t[&[0, 2]], 100);
        {
            let mut rot = (&mut t).rotate(&[0, 1]).unwrap();
            *rot.eval_mut(&[1, 2]) = -5;
        }
        assert_eq!(t[&[1, 0]], -5);
        {
            let mut flat = (&mut t).reshaped(&[6]).unwrap();
            flat.set(&[4], 77).unwrap();
        }
        assert_eq!(t[&[1, 1]], 77);
    }

    #[test]
    fn test_reshape_incompatible() {
        let t = sample();
        let err = (&t).reshaped(&[5, 5]).unwrap_err();
        assert!(matches!(err, TensorError::IncompatibleReshape { .. }));
        let col = ReshapeExpr::new(&t, &[4, 6], Layout::ColumnMajor).unwrap();
        assert_eq!(col.layout(), Layout::ColumnMajor);
        assert_eq!(col.eval(&[1, 0]), t.eval(&[1, 0, 0]));
    }
}
