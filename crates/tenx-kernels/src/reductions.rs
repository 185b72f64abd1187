//! Reductions over expressions
//!
//! This module provides whole-expression reductions, which evaluate eagerly
//! and return a scalar, and lazy reductions along a single axis, which are
//! themselves expressions.
//!
//! # Operations
//!
//! ## Full reductions
//! - **Sum / Prod** - Fold every element (empty input gives the identity)
//! - **Mean** - Arithmetic mean (error on empty input)
//! - **Min / Max** - Extreme values, NaN-propagating (error on empty input)
//!
//! ## Axis reductions
//! - [`sum_axis`], [`prod_axis`], [`mean_axis`], [`min_axis`], [`max_axis`]
//! - Built on [`AxisReduceExpr`], which folds one axis lane per output element
//!
//! # Examples
//!
//! ```
//! use tenx_core::{Expression, Tensor};
//! use tenx_kernels::{max, sum, sum_axis};
//!
//! let t = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
//! assert_eq!(sum(&t), 21.0);
//! assert_eq!(max(&t).unwrap(), 6.0);
//!
//! let cols = sum_axis(&t, 0, false).unwrap();
//! assert_eq!(cols.shape(), &[3]);
//! assert_eq!(cols.iter().collect::<Vec<_>>(), vec![5.0, 7.0, 9.0]);
//! ```

use std::cmp::Ordering;
use std::fmt;

use scirs2_core::numeric::{Float, FromPrimitive, One, Zero};
use tenx_core::{Expression, Index, Layout, Shape};

use crate::error::{KernelError, KernelResult};

/// Sum of every element; zero for an empty expression.
pub fn sum<E>(expr: &E) -> E::Elem
where
    E: Expression,
    E::Elem: Zero,
{
    expr.iter().fold(Zero::zero(), |acc, x| acc + x)
}

/// Product of every element; one for an empty expression.
pub fn prod<E>(expr: &E) -> E::Elem
where
    E: Expression,
    E::Elem: One,
{
    expr.iter().fold(One::one(), |acc, x| acc * x)
}

/// Arithmetic mean of every element.
///
/// # Errors
///
/// Returns [`KernelError::EmptyInput`] when the expression has no elements.
pub fn mean<E>(expr: &E) -> KernelResult<E::Elem>
where
    E: Expression,
    E::Elem: Float + FromPrimitive,
{
    let n = expr.size();
    if n == 0 {
        return Err(KernelError::empty_input("mean", "expr"));
    }
    let count = E::Elem::from_usize(n)
        .ok_or_else(|| KernelError::operation_error("mean", "element count not representable"))?;
    Ok(sum(expr) / count)
}

/// Smallest element; NaN if any element is NaN.
///
/// # Errors
///
/// Returns [`KernelError::EmptyInput`] when the expression has no elements.
pub fn min<E>(expr: &E) -> KernelResult<E::Elem>
where
    E: Expression,
    E::Elem: PartialOrd,
{
    expr.iter()
        .reduce(|acc, x| extreme(acc, x, Ordering::Less))
        .ok_or_else(|| KernelError::empty_input("min", "expr"))
}

/// Largest element; NaN if any element is NaN.
///
/// # Errors
///
/// Returns [`KernelError::EmptyInput`] when the expression has no elements.
pub fn max<E>(expr: &E) -> KernelResult<E::Elem>
where
    E: Expression,
    E::Elem: PartialOrd,
{
    expr.iter()
        .reduce(|acc, x| extreme(acc, x, Ordering::Greater))
        .ok_or_else(|| KernelError::empty_input("max", "expr"))
}

// Keep `acc` unless `x` compares as `wanted`; an unordered value wins.
fn extreme<T: PartialOrd>(acc: T, x: T, wanted: Ordering) -> T {
    match x.partial_cmp(&acc) {
        Some(ord) if ord == wanted => x,
        Some(_) => acc,
        None if acc.partial_cmp(&acc).is_none() => acc,
        None => x,
    }
}

/// The elements of an operand along one axis, at a fixed position on the others.
///
/// Yielded by [`AxisReduceExpr`] to its folding function.
#[derive(Debug, Clone)]
pub struct AxisLane<'a, A> {
    operand: &'a A,
    index: Index,
    axis: usize,
    front: usize,
    back: usize,
}

impl<A: Expression> Iterator for AxisLane<'_, A> {
    type Item = A::Elem;

    fn next(&mut self) -> Option<A::Elem> {
        if self.front >= self.back {
            return None;
        }
        self.index[self.axis] = self.front;
        self.front += 1;
        Some(self.operand.eval(&self.index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }
}

impl<A: Expression> ExactSizeIterator for AxisLane<'_, A> {}

/// Folding function type used by the named axis reductions.
pub type LaneFn<A, O> = for<'l> fn(AxisLane<'l, A>) -> O;

/// Lazy reduction of one axis.
///
/// Element `idx` of the result is `f(lane)`, where `lane` walks the operand
/// along `axis` with every other coordinate taken from `idx`. With `keepdims`
/// the reduced axis stays in the shape with extent 1.
///
/// # Examples
///
/// ```
/// use tenx_core::{Expression, Tensor};
/// use tenx_kernels::AxisReduceExpr;
///
/// let t = Tensor::from_vec(vec![3_i32, 1, 4, 1, 5, 9], &[2, 3]).unwrap();
/// // count of odd values per row
/// let odd = AxisReduceExpr::new(&t, 1, true, |lane| lane.filter(|x| *x % 2 == 1).count()).unwrap();
/// assert_eq!(odd.shape(), &[2, 1]);
/// assert_eq!(odd.eval(&[1, 0]), 2);
/// ```
#[derive(Clone)]
pub struct AxisReduceExpr<A, F> {
    operand: A,
    axis: usize,
    keepdims: bool,
    shape: Shape,
    f: F,
}

impl<A: Expression, F> AxisReduceExpr<A, F> {
    pub fn new<O>(operand: A, axis: usize, keepdims: bool, f: F) -> KernelResult<Self>
    where
        F: for<'l> Fn(AxisLane<'l, A>) -> O,
    {
        let rank = operand.rank();
        if axis >= rank {
            return Err(KernelError::invalid_axis(axis, rank, "axis reduction"));
        }
        let mut shape = Shape::from_slice(operand.shape());
        if keepdims {
            shape[axis] = 1;
        } else {
            shape.remove(axis);
        }
        log::trace!(
            "axis reduction over axis {} of {:?} -> {:?}",
            axis,
            operand.shape(),
            shape
        );
        Ok(AxisReduceExpr {
            operand,
            axis,
            keepdims,
            shape,
            f,
        })
    }

    pub fn axis(&self) -> usize {
        self.axis
    }

    pub fn keepdims(&self) -> bool {
        self.keepdims
    }

    pub fn operand(&self) -> &A {
        &self.operand
    }

    // Extent of the reduced axis
    fn lane_len(&self) -> usize {
        self.operand.shape()[self.axis]
    }
}

impl<A, F, O> Expression for AxisReduceExpr<A, F>
where
    A: Expression,
    F: for<'l> Fn(AxisLane<'l, A>) -> O,
{
    type Elem = O;

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn layout(&self) -> Layout {
        self.operand.layout()
    }

    fn eval(&self, index: &[usize]) -> O {
        let mut source = Index::with_capacity(self.operand.rank());
        if self.keepdims {
            source.extend_from_slice(index);
        } else {
            source.extend_from_slice(&index[..self.axis]);
            source.push(0);
            source.extend_from_slice(&index[self.axis..]);
        }
        (self.f)(AxisLane {
            operand: &self.operand,
            index: source,
            axis: self.axis,
            front: 0,
            back: self.lane_len(),
        })
    }
}

impl<A: fmt::Debug, F> fmt::Debug for AxisReduceExpr<A, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AxisReduceExpr")
            .field("operand", &self.operand)
            .field("axis", &self.axis)
            .field("keepdims", &self.keepdims)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

fn lane_sum<A>(lane: AxisLane<'_, A>) -> A::Elem
where
    A: Expression,
    A::Elem: Zero,
{
    lane.fold(Zero::zero(), |acc, x| acc + x)
}

fn lane_prod<A>(lane: AxisLane<'_, A>) -> A::Elem
where
    A: Expression,
    A::Elem: One,
{
    lane.fold(One::one(), |acc, x| acc * x)
}

fn lane_mean<A>(lane: AxisLane<'_, A>) -> A::Elem
where
    A: Expression,
    A::Elem: Float + FromPrimitive,
{
    let n = A::Elem::from_usize(lane.len()).unwrap_or_else(A::Elem::nan);
    lane_sum(lane) / n
}

fn lane_extreme<A>(mut lane: AxisLane<'_, A>, wanted: Ordering) -> A::Elem
where
    A: Expression,
    A::Elem: PartialOrd,
{
    match lane.next() {
        Some(first) => lane.fold(first, |acc, x| extreme(acc, x, wanted)),
        None => unreachable!("extreme of an empty lane"),
    }
}

fn lane_min<A>(lane: AxisLane<'_, A>) -> A::Elem
where
    A: Expression,
    A::Elem: PartialOrd,
{
    lane_extreme(lane, Ordering::Less)
}

fn lane_max<A>(lane: AxisLane<'_, A>) -> A::Elem
where
    A: Expression,
    A::Elem: PartialOrd,
{
    lane_extreme(lane, Ordering::Greater)
}

// min/max/mean have no value for an empty lane; refuse unless nothing would be read
fn require_lanes<A: Expression>(operation: &str, operand: &A, axis: usize) -> KernelResult<()> {
    let rank = operand.rank();
    if axis < rank && operand.shape()[axis] == 0 && operand.size() == 0 {
        let others = operand
            .shape()
            .iter()
            .enumerate()
            .all(|(a, &n)| a == axis || n > 0);
        if others {
            return Err(KernelError::empty_input(operation, "axis"));
        }
    }
    Ok(())
}

/// Sum along `axis`.
pub fn sum_axis<A>(
    operand: A,
    axis: usize,
    keepdims: bool,
) -> KernelResult<AxisReduceExpr<A, LaneFn<A, A::Elem>>>
where
    A: Expression,
    A::Elem: Zero,
{
    AxisReduceExpr::new(operand, axis, keepdims, lane_sum::<A> as LaneFn<A, A::Elem>)
}

/// Product along `axis`.
pub fn prod_axis<A>(
    operand: A,
    axis: usize,
    keepdims: bool,
) -> KernelResult<AxisReduceExpr<A, LaneFn<A, A::Elem>>>
where
    A: Expression,
    A::Elem: One,
{
    AxisReduceExpr::new(operand, axis, keepdims, lane_prod::<A> as LaneFn<A, A::Elem>)
}

/// Mean along `axis`.
///
/// # Errors
///
/// [`KernelError::EmptyInput`] when `axis` has extent 0 and the result is non-empty.
///
/// # Examples
///
/// ```
/// use tenx_core::{Expression, Tensor};
/// use tenx_kernels::mean_axis;
///
/// let t = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
/// let rows = mean_axis(&t, 1, false).unwrap();
/// assert_eq!(rows.iter().collect::<Vec<_>>(), vec![2.0, 5.0]);
/// ```
pub fn mean_axis<A>(
    operand: A,
    axis: usize,
    keepdims: bool,
) -> KernelResult<AxisReduceExpr<A, LaneFn<A, A::Elem>>>
where
    A: Expression,
    A::Elem: Float + FromPrimitive,
{
    require_lanes("mean_axis", &operand, axis)?;
    AxisReduceExpr::new(operand, axis, keepdims, lane_mean::<A> as LaneFn<A, A::Elem>)
}

/// Minimum along `axis`, NaN-propagating.
///
/// # Errors
///
/// [`KernelError::EmptyInput`] when `axis` has extent 0 and the result is non-empty.
pub fn min_axis<A>(
    operand: A,
    axis: usize,
    keepdims: bool,
) -> KernelResult<AxisReduceExpr<A, LaneFn<A, A::Elem>>>
where
    A: Expression,
    A::Elem: PartialOrd,
{
    require_lanes("min_axis", &operand, axis)?;
    AxisReduceExpr::new(operand, axis, keepdims, lane_min::<A> as LaneFn<A, A::Elem>)
}

/// Maximum along `axis`, NaN-propagating.
///
/// # Errors
///
/// [`KernelError::EmptyInput`] when `axis` has extent 0 and the result is non-empty.
pub fn max_axis<A>(
    operand: A,
    axis: usize,
    keepdims: bool,
) -> KernelResult<AxisReduceExpr<A, LaneFn<A, A::Elem>>>
where
    A: Expression,
    A::Elem: PartialOrd,
{
    require_lanes("max_axis", &operand, axis)?;
    AxisReduceExpr::new(operand, axis, keepdims, lane_max::<A> as LaneFn<A, A::Elem>)
}
