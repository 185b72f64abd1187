//! The expression contract
//!
//! An [`Expression`] is anything that can report a shape and produce the
//! element at a coordinate. Dense tensors, borrowed views, generators and
//! lazy arithmetic trees all implement it, which is what lets them be mixed
//! freely: `&a + &b.t()` is itself an expression and nothing is computed
//! until it is iterated, indexed or materialized.
//!
//! Writable expressions additionally implement [`ExpressionMut`], which hands
//! out `&mut` references into the storage they ultimately view.
//!
//! # Access tiers
//!
//! - [`Expression::eval`] is the fast path. It performs no per-axis bounds
//!   check; an invalid coordinate panics or yields an unspecified element.
//! - [`Expression::get`], [`ExpressionMut::get_mut`] and [`ExpressionMut::set`]
//!   validate the coordinate first and return [`Result`].
//!
//! # Combinators
//!
//! [`ExpressionExt`] is implemented for every sized expression and provides
//! the builder methods (`map`, `zip_with`, `transpose`, `broadcast_to`, ...)
//! that wrap an expression into a lazy one.

use crate::broadcast::BroadcastExpr;
use crate::dense::Tensor;
use crate::elementwise::{BinaryExpr, OuterExpr, UnaryExpr};
use crate::error::Result;
use crate::generators::{DiagonalExpr, TriangularExpr};
use crate::iter::{FlatIter, IndexedIter};
use crate::materialize::{materialize, materialize_with, EvalOptions};
use crate::ops::Conj;
use crate::shape::{check_index, for_each_index, size_of};
use crate::structural::{ReshapeExpr, ReverseExpr, RotateExpr, TransposeExpr};
use crate::types::{Layout, Shape};

/// Read access to an N-dimensional collection of elements.
///
/// Implementors supply [`shape`](Expression::shape),
/// [`layout`](Expression::layout) and [`eval`](Expression::eval); everything
/// else is derived.
///
/// # Examples
///
/// ```
/// use tenx_core::{Expression, Layout, Tensor};
///
/// let t = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
/// assert_eq!(Expression::shape(&t), &[2, 3]);
/// assert_eq!(Expression::size(&t), 6);
/// assert_eq!(t.eval(&[1, 0]), 4.0);
/// assert!(t.get(&[2, 0]).is_err());
/// assert_eq!(t.iter().sum::<f64>(), 21.0);
/// ```
pub trait Expression {
    /// Element type produced by evaluation
    type Elem;

    /// Extent of every axis
    fn shape(&self) -> &[usize];

    /// Natural iteration order of this expression
    fn layout(&self) -> Layout;

    /// Element at `index`, without bounds checking.
    fn eval(&self, index: &[usize]) -> Self::Elem;

    /// Number of axes
    fn rank(&self) -> usize {
        self.shape().len()
    }

    /// Number of elements (product of the shape)
    fn size(&self) -> usize {
        size_of(self.shape())
    }

    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Element at `index`, after checking rank and per-axis bounds.
    fn get(&self, index: &[usize]) -> Result<Self::Elem> {
        check_index(index, self.shape())?;
        Ok(self.eval(index))
    }

    /// Iterate all elements in this expression's own layout.
    fn iter(&self) -> FlatIter<'_, Self>
    where
        Self: Sized,
    {
        FlatIter::new(self, self.layout())
    }

    /// Iterate all elements in an explicit order.
    fn iter_order(&self, layout: Layout) -> FlatIter<'_, Self>
    where
        Self: Sized,
    {
        FlatIter::new(self, layout)
    }

    /// Iterate `(coordinate, element)` pairs in this expression's layout.
    fn indexed_iter(&self) -> IndexedIter<'_, Self>
    where
        Self: Sized,
    {
        IndexedIter::new(self, self.layout())
    }
}

/// Write access through an expression into the storage it views.
///
/// Implemented by [`Tensor`], the mutable views, and the structural views
/// (transpose, reverse, rotate, reshape, diagonal) over writable operands.
pub trait ExpressionMut: Expression {
    /// Mutable reference to the element at `index`, without bounds checking.
    fn eval_mut(&mut self, index: &[usize]) -> &mut Self::Elem;

    /// Checked counterpart of [`eval_mut`](ExpressionMut::eval_mut).
    fn get_mut(&mut self, index: &[usize]) -> Result<&mut Self::Elem> {
        check_index(index, self.shape())?;
        Ok(self.eval_mut(index))
    }

    /// Overwrite the element at `index`.
    fn set(&mut self, index: &[usize], value: Self::Elem) -> Result<()> {
        *self.get_mut(index)? = value;
        Ok(())
    }

    /// Overwrite every element with `value`.
    fn fill(&mut self, value: Self::Elem)
    where
        Self: Sized,
        Self::Elem: Clone,
    {
        let shape = Shape::from_slice(self.shape());
        for_each_index(&shape, self.layout(), |index| {
            *self.eval_mut(index) = value.clone();
        });
    }

    /// Evaluate `src` into every element of `self`.
    ///
    /// `src` is broadcast to this expression's shape; the shape of `self`
    /// never changes. Fails before any write if `src` cannot be broadcast.
    ///
    /// # Examples
    ///
    /// ```
    /// use tenx_core::{Expression, ExpressionMut, Tensor};
    ///
    /// let mut dst = Tensor::<i32>::zeros(&[2, 3]);
    /// let row = Tensor::from_vec(vec![1, 2, 3], &[1, 3]).unwrap();
    /// dst.assign(&row).unwrap();
    /// assert_eq!(dst.data(), &[1, 2, 3, 1, 2, 3]);
    ///
    /// let bad = Tensor::from_vec(vec![1, 2], &[1, 2]).unwrap();
    /// assert!(dst.assign(&bad).is_err());
    /// ```
    fn assign<S>(&mut self, src: S) -> Result<()>
    where
        Self: Sized,
        S: Expression<Elem = Self::Elem>,
    {
        let shape = Shape::from_slice(self.shape());
        let src = BroadcastExpr::new(src, &shape)?;
        for_each_index(&shape, self.layout(), |index| {
            *self.eval_mut(index) = src.eval(index);
        });
        Ok(())
    }
}

impl<E: Expression + ?Sized> Expression for &E {
    type Elem = E::Elem;

    #[inline]
    fn shape(&self) -> &[usize] {
        (**self).shape()
    }

    #[inline]
    fn layout(&self) -> Layout {
        (**self).layout()
    }

    #[inline]
    fn eval(&self, index: &[usize]) -> Self::Elem {
        (**self).eval(index)
    }
}

impl<E: Expression + ?Sized> Expression for &mut E {
    type Elem = E::Elem;

    #[inline]
    fn shape(&self) -> &[usize] {
        (**self).shape()
    }

    #[inline]
    fn layout(&self) -> Layout {
        (**self).layout()
    }

    #[inline]
    fn eval(&self, index: &[usize]) -> Self::Elem {
        (**self).eval(index)
    }
}

impl<E: ExpressionMut + ?Sized> ExpressionMut for &mut E {
    #[inline]
    fn eval_mut(&mut self, index: &[usize]) -> &mut Self::Elem {
        (**self).eval_mut(index)
    }
}

/// Lazy combinators available on every expression.
///
/// Each method consumes `self`; pass a reference (`(&t).map(..)`, or
/// `t.view().map(..)`) to keep using the operand afterwards.
///
/// # Examples
///
/// ```
/// use tenx_core::{Expression, ExpressionExt, Tensor};
///
/// let a = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0], &[1, 3]).unwrap();
/// let b = Tensor::from_vec(vec![10.0_f64, 20.0], &[2, 1]).unwrap();
///
/// let sum = (&a).zip_with(&b, |x, y| x + y).unwrap();
/// assert_eq!(sum.shape(), &[2, 3]);
/// assert_eq!(sum.eval(&[1, 2]), 23.0);
///
/// let t = sum.transpose().to_tensor();
/// assert_eq!(t.shape(), &[3, 2]);
/// ```
pub trait ExpressionExt: Expression + Sized {
    /// Apply `f` to every element.
    fn map<F, O>(self, f: F) -> UnaryExpr<F, Self>
    where
        F: Fn(Self::Elem) -> O,
    {
        UnaryExpr::new(f, self)
    }

    /// Combine with `other` elementwise under broadcasting.
    fn zip_with<B, F, O>(self, other: B, f: F) -> Result<BinaryExpr<F, Self, B>>
    where
        B: Expression,
        F: Fn(Self::Elem, B::Elem) -> O,
    {
        BinaryExpr::new(f, self, other)
    }

    /// Generalised outer product: rank `M + N`, `f(self[i], other[j])`.
    fn outer_with<B, F, O>(self, other: B, f: F) -> OuterExpr<F, Self, B>
    where
        B: Expression,
        F: Fn(Self::Elem, B::Elem) -> O,
    {
        OuterExpr::new(f, self, other)
    }

    /// Reverse the order of all axes.
    fn transpose(self) -> TransposeExpr<Self> {
        TransposeExpr::reversed(self)
    }

    /// Reorder axes: output axis `i` is input axis `perm[i]`.
    fn permute_axes(self, perm: &[usize]) -> Result<TransposeExpr<Self>> {
        TransposeExpr::new(self, perm)
    }

    /// Complex conjugate of every element (identity for real types).
    fn conj(self) -> UnaryExpr<fn(Self::Elem) -> Self::Elem, Self>
    where
        Self::Elem: Conj,
    {
        UnaryExpr::new(conj_value::<Self::Elem> as fn(Self::Elem) -> Self::Elem, self)
    }

    /// Transpose followed by conjugation.
    fn conj_transpose(self) -> UnaryExpr<fn(Self::Elem) -> Self::Elem, TransposeExpr<Self>>
    where
        Self::Elem: Conj,
    {
        self.transpose().conj()
    }

    /// Mirror the listed axes.
    fn reverse(self, axes: &[usize]) -> Result<ReverseExpr<Self>> {
        ReverseExpr::new(self, axes)
    }

    /// Cyclic shift: element at `i` reads the operand at `(i + shift) mod n`.
    fn rotate(self, shifts: &[isize]) -> Result<RotateExpr<Self>> {
        RotateExpr::new(self, shifts)
    }

    /// NumPy `roll` along one axis: element at `i` moves to `i + shift`.
    fn roll(self, axis: usize, shift: isize) -> Result<RotateExpr<Self>> {
        RotateExpr::roll(self, axis, shift)
    }

    /// Read-only view broadcast to `shape`.
    fn broadcast_to(self, shape: &[usize]) -> Result<BroadcastExpr<Self>> {
        BroadcastExpr::new(self, shape)
    }

    /// Lazy reshape, reading elements in this expression's layout order.
    fn reshaped(self, shape: &[usize]) -> Result<ReshapeExpr<Self>> {
        let layout = self.layout();
        ReshapeExpr::new(self, shape, layout)
    }

    /// Offset diagonal of the two trailing axes.
    fn diagonal(self, k: isize) -> Result<DiagonalExpr<Self>> {
        DiagonalExpr::new(self, k)
    }

    /// Lower triangle (`col <= row + k`) of the two trailing axes.
    fn tril(self, k: isize) -> Result<TriangularExpr<Self>> {
        TriangularExpr::lower(self, k)
    }

    /// Upper triangle (`col >= row + k`) of the two trailing axes.
    fn triu(self, k: isize) -> Result<TriangularExpr<Self>> {
        TriangularExpr::upper(self, k)
    }

    /// Evaluate into a new dense tensor in this expression's layout.
    fn to_tensor(&self) -> Tensor<Self::Elem> {
        materialize(self)
    }

    /// Evaluate into a new dense tensor under explicit options.
    fn to_tensor_with(&self, options: &EvalOptions) -> Result<Tensor<Self::Elem>> {
        materialize_with(self, options)
    }
}

impl<E: Expression> ExpressionExt for E {}

fn conj_value<T: Conj>(value: T) -> T {
    value.conj()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_expressions() {
        let t = Tensor::from_vec(vec![1, 2, 3, 4], &[2, 2]).unwrap();
        let r = &t;
        let rr = &r;
        assert_eq!(rr.shape(), &[2, 2]);
        assert_eq!(rr.eval(&[1, 1]), 4);
        assert_eq!(Expression::size(&rr), 4);
    }

    #[test]
    fn test_checked_access() {
        let t = Tensor::from_vec(vec![1, 2, 3, 4], &[2, 2]).unwrap();
        assert_eq!(t.get(&[0, 1]).unwrap(), 2);
        assert!(t.get(&[0, 2]).is_err());
        assert!(t.get(&[0]).is_err());
    }

    #[test]
    fn test_set_and_fill() {
        let mut t = Tensor::<i32>::zeros(&[2, 2]);
        t.set(&[1, 0], 7).unwrap();
        assert_eq!(t.data(), &[0, 0, 7, 0]);
        assert!(t.set(&[2, 0], 1).is_err());
        t.fill(3);
        assert_eq!(t.data(), &[3, 3, 3, 3]);
    }

    #[test]
    fn test_assign_through_mut_reference() {
        let mut t = Tensor::<f64>::zeros(&[2, 3]);
        let col = Tensor::from_vec(vec![1.0_f64, 2.0], &[2, 1]).unwrap();
        {
            let mut target = &mut t;
            ExpressionMut::assign(&mut target, &col).unwrap();
        }
        assert_eq!(t.data(), &[1.0, 1.0, 1.0, 2.0, 2.0, 2.0]);
    }

    #[test]
    fn test_assign_failure_leaves_destination() {
        let mut t = Tensor::<i32>::ones(&[2, 2]);
        let src = Tensor::<i32>::zeros(&[3, 1]);
        assert!(t.assign(&src).is_err());
        assert_eq!(t.data(), &[1, 1, 1, 1]);
    }

    #[test]
    fn test_dyn_expression() {
        let t = Tensor::from_vec(vec![1, 2, 3], &[3]).unwrap();
        let d: &dyn Expression<Elem = i32> = &t;
        assert_eq!(d.size(), 3);
        assert_eq!(d.get(&[2]).unwrap(), 3);
    }
}
