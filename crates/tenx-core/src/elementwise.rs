//! Lazy elementwise expressions
//!
//! These types hold their operands and a function and compute each element
//! on access. None of them allocates element storage. Broadcasting operands
//! are checked when the expression is built; the result shape is cached and
//! each access only remaps the coordinate per operand.
//!
//! | Type | Element at `idx` | Shape |
//! |------|------------------|-------|
//! | [`UnaryExpr`] | `f(a[idx])` | `a` |
//! | [`BinaryExpr`] | `f(a[idx'], b[idx''])` | `broadcast(a, b)` |
//! | [`BinaryScalarExpr`] | `f(a[idx], s)` | `a` |
//! | [`ScalarBinaryExpr`] | `f(s, a[idx])` | `a` |
//! | [`TernaryExpr`] | `f(a, b, c)` | `broadcast(a, b, c)` |
//! | [`OuterExpr`] | `f(a[i], b[j])` | `a ++ b` |
//! | [`ElementWiseExpr`] | `f(&[x0, x1, ...])` | `broadcast(x0, x1, ...)` |

use std::fmt;

use smallvec::SmallVec;

use crate::broadcast::{broadcast_shapes, eval_broadcast};
use crate::error::{Result, TensorError};
use crate::expr::Expression;
use crate::shape::shape_cat;
use crate::types::{Layout, Shape};

/// `f(a[idx])`
#[derive(Clone)]
pub struct UnaryExpr<F, A> {
    f: F,
    operand: A,
}

impl<F, A> UnaryExpr<F, A> {
    pub fn new(f: F, operand: A) -> Self {
        UnaryExpr { f, operand }
    }

    pub fn operand(&self) -> &A {
        &self.operand
    }
}

impl<F, A, O> Expression for UnaryExpr<F, A>
where
    A: Expression,
    F: Fn(A::Elem) -> O,
{
    type Elem = O;

    fn shape(&self) -> &[usize] {
        self.operand.shape()
    }

    fn layout(&self) -> Layout {
        self.operand.layout()
    }

    #[inline]
    fn eval(&self, index: &[usize]) -> O {
        (self.f)(self.operand.eval(index))
    }
}

/// `f(a, b)` under broadcasting.
///
/// The layout is the operands' common layout, or row-major when they differ.
///
/// # Examples
///
/// ```
/// use tenx_core::{BinaryExpr, Expression, Tensor};
///
/// let a = Tensor::from_vec(vec![1, 2, 3], &[1, 3]).unwrap();
/// let b = Tensor::from_vec(vec![10, 20], &[2, 1]).unwrap();
/// let sum = BinaryExpr::new(|x: i32, y: i32| x + y, &a, &b).unwrap();
/// assert_eq!(sum.shape(), &[2, 3]);
/// assert_eq!(sum.iter().collect::<Vec<_>>(), vec![11, 12, 13, 21, 22, 23]);
/// ```
#[derive(Clone)]
pub struct BinaryExpr<F, A, B> {
    f: F,
    lhs: A,
    rhs: B,
    shape: Shape,
    layout: Layout,
    lhs_direct: bool,
    rhs_direct: bool,
}

impl<F, A: Expression, B: Expression> BinaryExpr<F, A, B> {
    /// Build `f(lhs, rhs)`, failing if the shapes do not broadcast.
    pub fn new(f: F, lhs: A, rhs: B) -> Result<Self> {
        let shape = broadcast_shapes(&[lhs.shape(), rhs.shape()])?;
        let layout = lhs.layout().common(rhs.layout());
        let lhs_direct = lhs.shape() == shape.as_slice();
        let rhs_direct = rhs.shape() == shape.as_slice();
        Ok(BinaryExpr {
            f,
            lhs,
            rhs,
            shape,
            layout,
            lhs_direct,
            rhs_direct,
        })
    }
}

impl<F, A, B> BinaryExpr<F, A, B> {
    pub fn lhs(&self) -> &A {
        &self.lhs
    }

    pub fn rhs(&self) -> &B {
        &self.rhs
    }
}

impl<F, A, B, O> Expression for BinaryExpr<F, A, B>
where
    A: Expression,
    B: Expression,
    F: Fn(A::Elem, B::Elem) -> O,
{
    type Elem = O;

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn layout(&self) -> Layout {
        self.layout
    }

    #[inline]
    fn eval(&self, index: &[usize]) -> O {
        (self.f)(
            eval_broadcast(&self.lhs, index, self.lhs_direct),
            eval_broadcast(&self.rhs, index, self.rhs_direct),
        )
    }
}

/// `f(a[idx], scalar)`
#[derive(Clone)]
pub struct BinaryScalarExpr<F, A, S> {
    f: F,
    operand: A,
    scalar: S,
}

impl<F, A, S> BinaryScalarExpr<F, A, S> {
    pub fn new(f: F, operand: A, scalar: S) -> Self {
        BinaryScalarExpr { f, operand, scalar }
    }
}

impl<F, A, S, O> Expression for BinaryScalarExpr<F, A, S>
where
    A: Expression,
    S: Clone,
    F: Fn(A::Elem, S) -> O,
{
    type Elem = O;

    fn shape(&self) -> &[usize] {
        self.operand.shape()
    }

    fn layout(&self) -> Layout {
        self.operand.layout()
    }

    #[inline]
    fn eval(&self, index: &[usize]) -> O {
        (self.f)(self.operand.eval(index), self.scalar.clone())
    }
}

/// `f(scalar, a[idx])`
#[derive(Clone)]
pub struct ScalarBinaryExpr<F, S, A> {
    f: F,
    scalar: S,
    operand: A,
}

impl<F, S, A> ScalarBinaryExpr<F, S, A> {
    pub fn new(f: F, scalar: S, operand: A) -> Self {
        ScalarBinaryExpr { f, scalar, operand }
    }
}

impl<F, S, A, O> Expression for ScalarBinaryExpr<F, S, A>
where
    A: Expression,
    S: Clone,
    F: Fn(S, A::Elem) -> O,
{
    type Elem = O;

    fn shape(&self) -> &[usize] {
        self.operand.shape()
    }

    fn layout(&self) -> Layout {
        self.operand.layout()
    }

    #[inline]
    fn eval(&self, index: &[usize]) -> O {
        (self.f)(self.scalar.clone(), self.operand.eval(index))
    }
}

/// `f(a, b, c)` under three-way broadcasting.
#[derive(Clone)]
pub struct TernaryExpr<F, A, B, C> {
    f: F,
    a: A,
    b: B,
    c: C,
    shape: Shape,
    layout: Layout,
    direct: [bool; 3],
}

impl<F, A: Expression, B: Expression, C: Expression> TernaryExpr<F, A, B, C> {
    pub fn new(f: F, a: A, b: B, c: C) -> Result<Self> {
        let shape = broadcast_shapes(&[a.shape(), b.shape(), c.shape()])?;
        let layout = a.layout().common(b.layout()).common(c.layout());
        let direct = [
            a.shape() == shape.as_slice(),
            b.shape() == shape.as_slice(),
            c.shape() == shape.as_slice(),
        ];
        Ok(TernaryExpr {
            f,
            a,
            b,
            c,
            shape,
            layout,
            direct,
        })
    }
}

impl<F, A, B, C, O> Expression for TernaryExpr<F, A, B, C>
where
    A: Expression,
    B: Expression,
    C: Expression,
    F: Fn(A::Elem, B::Elem, C::Elem) -> O,
{
    type Elem = O;

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn layout(&self) -> Layout {
        self.layout
    }

    #[inline]
    fn eval(&self, index: &[usize]) -> O {
        (self.f)(
            eval_broadcast(&self.a, index, self.direct[0]),
            eval_broadcast(&self.b, index, self.direct[1]),
            eval_broadcast(&self.c, index, self.direct[2]),
        )
    }
}

fn pick<T>(cond: bool, then: T, otherwise: T) -> T {
    if cond {
        then
    } else {
        otherwise
    }
}

/// Elementwise `if cond { x } else { y }` under broadcasting (NumPy `where`).
///
/// # Examples
///
/// ```
/// use tenx_core::{select, Expression, Tensor};
///
/// let cond = Tensor::from_vec(vec![true, false, true], &[3]).unwrap();
/// let x = Tensor::from_vec(vec![1, 2, 3], &[3]).unwrap();
/// let y = Tensor::from_vec(vec![0], &[1]).unwrap();
/// let r = select(&cond, &x, &y).unwrap();
/// assert_eq!(r.iter().collect::<Vec<_>>(), vec![1, 0, 3]);
/// ```
#[allow(clippy::type_complexity)]
pub fn select<C, X, Y>(
    cond: C,
    x: X,
    y: Y,
) -> Result<TernaryExpr<fn(bool, X::Elem, X::Elem) -> X::Elem, C, X, Y>>
where
    C: Expression<Elem = bool>,
    X: Expression,
    Y: Expression<Elem = X::Elem>,
{
    TernaryExpr::new(
        pick::<X::Elem> as fn(bool, X::Elem, X::Elem) -> X::Elem,
        cond,
        x,
        y,
    )
}

/// `f(a[i], b[j])` over the concatenated coordinate `i ++ j`.
///
/// # Examples
///
/// ```
/// use tenx_core::{Expression, ExpressionExt, Tensor};
///
/// let a = Tensor::from_vec(vec![1, 2], &[2]).unwrap();
/// let b = Tensor::from_vec(vec![10, 20, 30], &[3]).unwrap();
/// let o = (&a).outer_with(&b, |x, y| x * y);
/// assert_eq!(o.shape(), &[2, 3]);
/// assert_eq!(o.eval(&[1, 2]), 60);
/// ```
#[derive(Clone)]
pub struct OuterExpr<F, A, B> {
    f: F,
    lhs: A,
    rhs: B,
    shape: Shape,
    split: usize,
    layout: Layout,
}

impl<F, A: Expression, B: Expression> OuterExpr<F, A, B> {
    pub fn new(f: F, lhs: A, rhs: B) -> Self {
        let shape = shape_cat(lhs.shape(), rhs.shape());
        let split = lhs.rank();
        let layout = lhs.layout().common(rhs.layout());
        OuterExpr {
            f,
            lhs,
            rhs,
            shape,
            split,
            layout,
        }
    }
}

impl<F, A, B, O> Expression for OuterExpr<F, A, B>
where
    A: Expression,
    B: Expression,
    F: Fn(A::Elem, B::Elem) -> O,
{
    type Elem = O;

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn layout(&self) -> Layout {
        self.layout
    }

    #[inline]
    fn eval(&self, index: &[usize]) -> O {
        let (i, j) = index.split_at(self.split);
        (self.f)(self.lhs.eval(i), self.rhs.eval(j))
    }
}

/// N-ary elementwise expression over a runtime list of operands.
///
/// Each operand is broadcast independently to the common shape; `f` receives
/// the operand values in order.
///
/// # Examples
///
/// ```
/// use tenx_core::{ElementWiseExpr, Expression, Tensor};
///
/// let a = Tensor::from_vec(vec![1.0_f64, 2.0], &[2, 1]).unwrap();
/// let b = Tensor::from_vec(vec![10.0_f64, 20.0, 30.0], &[1, 3]).unwrap();
/// let c = Tensor::from_vec(vec![100.0_f64], &[1, 1]).unwrap();
/// let e = ElementWiseExpr::new(vec![&a as &dyn Expression<Elem = f64>, &b, &c], |v: &[f64]| v.iter().sum::<f64>()).unwrap();
/// assert_eq!(e.shape(), &[2, 3]);
/// assert_eq!(e.eval(&[1, 2]), 132.0);
/// ```
pub struct ElementWiseExpr<'a, T, F> {
    operands: Vec<&'a dyn Expression<Elem = T>>,
    direct: Vec<bool>,
    shape: Shape,
    layout: Layout,
    f: F,
}

impl<'a, T, F> ElementWiseExpr<'a, T, F> {
    pub fn new(operands: Vec<&'a dyn Expression<Elem = T>>, f: F) -> Result<Self> {
        if operands.is_empty() {
            return Err(TensorError::invalid_argument(
                "elementwise expression needs at least one operand",
            ));
        }
        let shapes: Vec<&[usize]> = operands.iter().map(|e| e.shape()).collect();
        let shape = broadcast_shapes(&shapes)?;
        let layout = operands
            .iter()
            .skip(1)
            .fold(operands[0].layout(), |acc, e| acc.common(e.layout()));
        let direct = shapes.iter().map(|s| *s == shape.as_slice()).collect();
        Ok(ElementWiseExpr {
            operands,
            direct,
            shape,
            layout,
            f,
        })
    }

    pub fn arity(&self) -> usize {
        self.operands.len()
    }
}

impl<T, F, O> Expression for ElementWiseExpr<'_, T, F>
where
    F: Fn(&[T]) -> O,
{
    type Elem = O;

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn layout(&self) -> Layout {
        self.layout
    }

    fn eval(&self, index: &[usize]) -> O {
        let values: SmallVec<[T; 4]> = self
            .operands
            .iter()
            .zip(&self.direct)
            .map(|(e, &direct)| eval_broadcast(*e, index, direct))
            .collect();
        (self.f)(&values)
    }
}

// Debug output omits the element functions.

impl<F, A: fmt::Debug> fmt::Debug for UnaryExpr<F, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnaryExpr")
            .field("operand", &self.operand)
            .finish_non_exhaustive()
    }
}

impl<F, A: fmt::Debug, B: fmt::Debug> fmt::Debug for BinaryExpr<F, A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryExpr")
            .field("lhs", &self.lhs)
            .field("rhs", &self.rhs)
            .field("shape", &self.shape)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl<F, A: fmt::Debug, S: fmt::Debug> fmt::Debug for BinaryScalarExpr<F, A, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryScalarExpr")
            .field("operand", &self.operand)
            .field("scalar", &self.scalar)
            .finish_non_exhaustive()
    }
}

impl<F, S: fmt::Debug, A: fmt::Debug> fmt::Debug for ScalarBinaryExpr<F, S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScalarBinaryExpr")
            .field("scalar", &self.scalar)
            .field("operand", &self.operand)
            .finish_non_exhaustive()
    }
}

impl<F, A: fmt::Debug, B: fmt::Debug, C: fmt::Debug> fmt::Debug for TernaryExpr<F, A, B, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TernaryExpr")
            .field("a", &self.a)
            .field("b", &self.b)
            .field("c", &self.c)
            .field("shape", &self.shape)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl<F, A: fmt::Debug, B: fmt::Debug> fmt::Debug for OuterExpr<F, A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OuterExpr")
            .field("lhs", &self.lhs)
            .field("rhs", &self.rhs)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::Tensor;
    use crate::expr::ExpressionExt;

    #[test]
    fn test_unary_map() {
        let t = Tensor::from_vec(vec![1, 2, 3], &[3]).unwrap();
        let sq = UnaryExpr::new(|x: i32| x * x, &t);
        assert_eq!(sq.iter().collect::<Vec<_>>(), vec![1, 4, 9]);
        let as_f = (&t).map(|x| x as f64 / 2.0);
        assert_eq!(as_f.eval(&[2]), 1.5);
    }

    #[test]
    fn test_binary_broadcast_scenario() {
        let a = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0], &[1, 3]).unwrap();
        let b = Tensor::from_vec(vec![10.0_f64, 20.0], &[2, 1]).unwrap();
        let r = BinaryExpr::new(|x: f64, y: f64| x + y, &a, &b).unwrap();
        assert_eq!(r.shape(), &[2, 3]);
        for i in 0..2 {
            for j in 0..3 {
                assert_eq!(r.eval(&[i, j]), a.eval(&[0, j]) + b.eval(&[i, 0]));
            }
        }
    }

    #[test]
    fn test_binary_incompatible_fails_at_construction() {
        let a = Tensor::<f64>::zeros(&[2, 3]);
        let b = Tensor::<f64>::zeros(&[3, 2]);
        let err = BinaryExpr::new(|x: f64, y: f64| x + y, &a, &b).unwrap_err();
        assert!(matches!(err, TensorError::Broadcast { .. }));
    }

    #[test]
    fn test_debug_without_debug_closure() {
        let a = Tensor::from_vec(vec![1, 2], &[2]).unwrap();
        let e = (&a).map(|x| x + 1).zip_with(&a, |x, y| x * y).unwrap();
        let text = format!("{:?}", e);
        assert!(text.starts_with("BinaryExpr"));
        assert!(text.contains("UnaryExpr"));
        assert!(text.contains(".."));
    }

    #[test]
    fn test_binary_layout_tie_break() {
        let row = Tensor::<i32>::zeros(&[2, 2]);
        let col = Tensor::from_vec_with_layout(vec![0; 4], &[2, 2], Layout::ColumnMajor).unwrap();
        let col2 = col.clone();
        let mixed = BinaryExpr::new(|x: i32, y: i32| x + y, &row, &col).unwrap();
        assert_eq!(mixed.layout(), Layout::RowMajor);
        let same = BinaryExpr::new(|x: i32, y: i32| x + y, &col, &col2).unwrap();
        assert_eq!(same.layout(), Layout::ColumnMajor);
    }

    #[test]
    fn test_scalar_sides() {
        let t = Tensor::from_vec(vec![1, 2, 3], &[3]).unwrap();
        let minus = BinaryScalarExpr::new(|x: i32, s: i32| x - s, &t, 1);
        assert_eq!(minus.iter().collect::<Vec<_>>(), vec![0, 1, 2]);
        let from = ScalarBinaryExpr::new(|s: i32, x: i32| s - x, 10, &t);
        assert_eq!(from.iter().collect::<Vec<_>>(), vec![9, 8, 7]);
    }

    #[test]
    fn test_ternary_and_select() {
        let a = Tensor::from_vec(vec![1, 2], &[2, 1]).unwrap();
        let b = Tensor::from_vec(vec![10, 20, 30], &[1, 3]).unwrap();
        let c = Tensor::from_vec(vec![100], &[1, 1]).unwrap();
        let t = TernaryExpr::new(|x: i32, y: i32, z: i32| x + y + z, &a, &b, &c).unwrap();
        assert_eq!(t.shape(), &[2, 3]);
        assert_eq!(t.eval(&[1, 1]), 122);

        let cond = Tensor::from_vec(vec![true, false], &[2, 1]).unwrap();
        let s = select(&cond, &b, &c).unwrap();
        assert_eq!(s.iter().collect::<Vec<_>>(), vec![10, 20, 30, 100, 100, 100]);
    }

    #[test]
    fn test_outer_split() {
        let a = Tensor::from_vec(vec![1, 2, 3, 4], &[2, 2]).unwrap();
        let b = Tensor::from_vec(vec![1, 10], &[2]).unwrap();
        let o = OuterExpr::new(|x: i32, y: i32| x * y, &a, &b);
        assert_eq!(o.shape(), &[2, 2, 2]);
        assert_eq!(o.eval(&[1, 0, 1]), 30);
        assert_eq!(o.size(), 8);
    }

    #[test]
    fn test_elementwise_nary() {
        let a = Tensor::from_vec(vec![1, 2, 3], &[1, 3]).unwrap();
        let b = Tensor::from_vec(vec![1, 0], &[2, 1]).unwrap();
        let e = ElementWiseExpr::new(vec![&a as &dyn Expression<Elem = i32>, &b], |v: &[i32]| v[0] * v[1]).unwrap();
        assert_eq!(e.arity(), 2);
        assert_eq!(e.iter().collect::<Vec<_>>(), vec![1, 2, 3, 0, 0, 0]);

        let empty: Vec<&dyn Expression<Elem = i32>> = Vec::new();
        assert!(ElementWiseExpr::new(empty, |v: &[i32]| v.len()).is_err());

        let bad = Tensor::from_vec(vec![1, 2], &[1, 2]).unwrap();
        assert!(ElementWiseExpr::new(vec![&a as &dyn Expression<Elem = i32>, &bad], |v: &[i32]| v[0]).is_err());
    }
}
