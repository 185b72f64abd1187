//! Generator expressions
//!
//! Closed-form index-to-value mappings. Constants, progressions and identity
//! matrices need no operand at all; diagonal and triangular expressions
//! reinterpret an operand without copying it.
//!
//! # Examples
//!
//! ```
//! use tenx_core::{arange, eye, Expression, ExpressionExt};
//!
//! let seq = arange(0, 10, 2).unwrap();
//! assert_eq!(seq.iter().collect::<Vec<i32>>(), vec![0, 2, 4, 6, 8]);
//!
//! let id = eye::<f64>(3, 3, 0);
//! assert_eq!(id.diagonal(0).unwrap().iter().collect::<Vec<_>>(), vec![1.0, 1.0, 1.0]);
//! ```

use std::marker::PhantomData;

use scirs2_core::numeric::{Float, FromPrimitive, Num, NumCast, One, Zero};
use smallvec::smallvec;

use crate::error::{Result, TensorError};
use crate::expr::{Expression, ExpressionMut};
use crate::types::{Index, Layout, Shape};

// ---------------------------------------------------------------------------
// Constants

/// Every element equals one value.
#[derive(Debug, Clone)]
pub struct ConstExpr<T> {
    shape: Shape,
    layout: Layout,
    value: T,
}

impl<T> ConstExpr<T> {
    pub fn new(shape: &[usize], value: T) -> Self {
        ConstExpr {
            shape: Shape::from_slice(shape),
            layout: Layout::RowMajor,
            value,
        }
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn value(&self) -> &T {
        &self.value
    }
}

impl<T: Clone> Expression for ConstExpr<T> {
    type Elem = T;

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn layout(&self) -> Layout {
        self.layout
    }

    #[inline]
    fn eval(&self, _index: &[usize]) -> T {
        self.value.clone()
    }
}

/// Constant expression of `shape` filled with `value`.
pub fn full_expr<T: Clone>(shape: &[usize], value: T) -> ConstExpr<T> {
    ConstExpr::new(shape, value)
}

pub fn zeros_expr<T: Clone + Zero>(shape: &[usize]) -> ConstExpr<T> {
    ConstExpr::new(shape, T::zero())
}

pub fn ones_expr<T: Clone + One>(shape: &[usize]) -> ConstExpr<T> {
    ConstExpr::new(shape, T::one())
}

// ---------------------------------------------------------------------------
// Progressions

/// 1-D arithmetic progression `start + i * step`.
///
/// # Examples
///
/// ```
/// use tenx_core::{Expression, SequenceExpr};
///
/// let s = SequenceExpr::new(0, 5, 2).unwrap();
/// assert_eq!(s.iter().collect::<Vec<i64>>(), vec![0, 2, 4, 6, 8]);
/// ```
#[derive(Debug, Clone)]
pub struct SequenceExpr<T> {
    start: T,
    step: T,
    shape: Shape,
    // exact value of the last element (linspace endpoint)
    last: Option<T>,
}

impl<T: Num + FromPrimitive + Copy> SequenceExpr<T> {
    /// `size` elements starting at `start`, `step` apart.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `size - 1` is not representable in `T`.
    pub fn new(start: T, size: usize, step: T) -> Result<Self> {
        if T::from_usize(size.saturating_sub(1)).is_none() {
            return Err(TensorError::invalid_argument(format!(
                "sequence length {} is not representable in the element type",
                size
            )));
        }
        Ok(SequenceExpr {
            start,
            step,
            shape: smallvec![size],
            last: None,
        })
    }

    pub fn start(&self) -> T {
        self.start
    }

    pub fn step(&self) -> T {
        self.step
    }

    fn with_last(mut self, last: T) -> Self {
        if self.shape[0] > 1 {
            self.last = Some(last);
        }
        self
    }
}

impl<T: Num + FromPrimitive + Copy> Expression for SequenceExpr<T> {
    type Elem = T;

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn layout(&self) -> Layout {
        Layout::RowMajor
    }

    #[inline]
    fn eval(&self, index: &[usize]) -> T {
        let i = index[0];
        match self.last {
            Some(last) if i + 1 == self.shape[0] => last,
            _ => self.start + T::from_usize(i).unwrap_or_else(T::zero) * self.step,
        }
    }
}

/// Values in `[start, stop)` spaced by `step` (NumPy `arange`).
///
/// # Errors
///
/// `InvalidArgument` if `step` is zero.
///
/// # Examples
///
/// ```
/// use tenx_core::{arange, Expression};
///
/// assert_eq!(arange(5, 0, -2).unwrap().iter().collect::<Vec<i32>>(), vec![5, 3, 1]);
/// assert_eq!(arange(0.0_f64, 1.0, 0.25).unwrap().size(), 4);
/// assert!(arange(0, 3, 0).is_err());
/// ```
pub fn arange<T>(start: T, stop: T, step: T) -> Result<SequenceExpr<T>>
where
    T: Num + FromPrimitive + NumCast + Copy,
{
    if step.is_zero() {
        return Err(TensorError::invalid_argument("arange step must be non-zero"));
    }
    let to_f64 = |v: T| -> Result<f64> {
        <f64 as NumCast>::from(v)
            .ok_or_else(|| TensorError::invalid_argument("arange bound is not representable as f64"))
    };
    let count = ((to_f64(stop)? - to_f64(start)?) / to_f64(step)?).ceil();
    let size = if count > 0.0 { count as usize } else { 0 };
    SequenceExpr::new(start, size, step)
}

/// `num` evenly spaced values over `[start, stop]` (or `[start, stop)` when
/// `endpoint` is false).
///
/// With `endpoint`, the last element is exactly `stop`.
///
/// # Examples
///
/// ```
/// use tenx_core::{linspace, Expression};
///
/// let v: Vec<f64> = linspace(0.0, 1.0, 5, true).unwrap().iter().collect();
/// assert_eq!(v, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
///
/// let v: Vec<f64> = linspace(0.0, 1.0, 4, false).unwrap().iter().collect();
/// assert_eq!(v, vec![0.0, 0.25, 0.5, 0.75]);
/// ```
pub fn linspace<T>(start: T, stop: T, num: usize, endpoint: bool) -> Result<SequenceExpr<T>>
where
    T: Float + FromPrimitive,
{
    let intervals = if endpoint { num.saturating_sub(1) } else { num };
    let step = if intervals == 0 {
        T::zero()
    } else {
        let div = T::from_usize(intervals).ok_or_else(|| {
            TensorError::invalid_argument("linspace length is not representable")
        })?;
        (stop - start) / div
    };
    let seq = SequenceExpr::new(start, num, step)?;
    Ok(if endpoint { seq.with_last(stop) } else { seq })
}

/// `coefficient * base^(start + i * step)`
///
/// # Examples
///
/// ```
/// use tenx_core::{logspace, Expression};
///
/// let v: Vec<f64> = logspace(0.0, 3.0, 4, true, 10.0).unwrap().iter().collect();
/// for (got, want) in v.iter().zip([1.0, 10.0, 100.0, 1000.0]) {
///     assert!((got - want).abs() < 1e-9);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct LogSequenceExpr<T> {
    exponents: SequenceExpr<T>,
    base: T,
    coefficient: T,
}

impl<T: Float + FromPrimitive> LogSequenceExpr<T> {
    pub fn new(start: T, size: usize, step: T, base: T) -> Result<Self> {
        Ok(LogSequenceExpr {
            exponents: SequenceExpr::new(start, size, step)?,
            base,
            coefficient: T::one(),
        })
    }

    pub fn base(&self) -> T {
        self.base
    }
}

impl<T: Float + FromPrimitive> Expression for LogSequenceExpr<T> {
    type Elem = T;

    fn shape(&self) -> &[usize] {
        self.exponents.shape()
    }

    fn layout(&self) -> Layout {
        Layout::RowMajor
    }

    #[inline]
    fn eval(&self, index: &[usize]) -> T {
        self.coefficient * self.base.powf(self.exponents.eval(index))
    }
}

/// `num` values spaced evenly on a log scale from `base^start` to `base^stop`.
pub fn logspace<T>(
    start: T,
    stop: T,
    num: usize,
    endpoint: bool,
    base: T,
) -> Result<LogSequenceExpr<T>>
where
    T: Float + FromPrimitive,
{
    Ok(LogSequenceExpr {
        exponents: linspace(start, stop, num, endpoint)?,
        base,
        coefficient: T::one(),
    })
}

/// Geometric progression from `start` to `stop` (NumPy `geomspace`).
///
/// # Errors
///
/// `InvalidArgument` if either bound is zero or the bounds differ in sign.
///
/// # Examples
///
/// ```
/// use tenx_core::{geomspace, Expression};
///
/// let v: Vec<f64> = geomspace(-1.0, -1000.0, 4, true).unwrap().iter().collect();
/// for (got, want) in v.iter().zip([-1.0, -10.0, -100.0, -1000.0]) {
///     assert!((got - want).abs() < 1e-9);
/// }
/// assert!(geomspace(0.0_f64, 10.0, 3, true).is_err());
/// ```
pub fn geomspace<T>(start: T, stop: T, num: usize, endpoint: bool) -> Result<LogSequenceExpr<T>>
where
    T: Float + FromPrimitive,
{
    if start.is_zero() || stop.is_zero() {
        return Err(TensorError::invalid_argument(
            "geomspace bounds must be non-zero",
        ));
    }
    if start.signum() != stop.signum() {
        return Err(TensorError::invalid_argument(
            "geomspace bounds must share a sign",
        ));
    }
    let ten = T::from_f64(10.0)
        .ok_or_else(|| TensorError::invalid_argument("element type cannot represent 10"))?;
    Ok(LogSequenceExpr {
        exponents: linspace(start.abs().log10(), stop.abs().log10(), num, endpoint)?,
        base: ten,
        coefficient: start.signum(),
    })
}

// ---------------------------------------------------------------------------
// Identity

/// 2-D matrix with ones where `row + k == col`, zero elsewhere.
///
/// # Examples
///
/// ```
/// use tenx_core::{eye, Expression};
///
/// let e = eye::<i32>(3, 3, 1);
/// assert_eq!(e.iter().collect::<Vec<_>>(), vec![0, 1, 0, 0, 0, 1, 0, 0, 0]);
/// ```
#[derive(Debug, Clone)]
pub struct IdentityExpr<T> {
    shape: Shape,
    k: isize,
    _marker: PhantomData<T>,
}

impl<T> IdentityExpr<T> {
    /// Identity-like matrix of a rank-2 `shape` with diagonal offset `k`.
    pub fn new(shape: &[usize], k: isize) -> Result<Self> {
        if shape.len() != 2 {
            return Err(TensorError::RankMismatch {
                expected: 2,
                actual: shape.len(),
            });
        }
        Ok(IdentityExpr {
            shape: Shape::from_slice(shape),
            k,
            _marker: PhantomData,
        })
    }

    pub fn offset(&self) -> isize {
        self.k
    }
}

impl<T: Zero + One> Expression for IdentityExpr<T> {
    type Elem = T;

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn layout(&self) -> Layout {
        Layout::RowMajor
    }

    #[inline]
    fn eval(&self, index: &[usize]) -> T {
        if index[0] as isize + self.k == index[1] as isize {
            T::one()
        } else {
            T::zero()
        }
    }
}

/// `rows x cols` matrix with ones on diagonal `k`.
pub fn eye<T>(rows: usize, cols: usize, k: isize) -> IdentityExpr<T> {
    IdentityExpr {
        shape: smallvec![rows, cols],
        k,
        _marker: PhantomData,
    }
}

/// `n x n` identity matrix.
pub fn identity<T>(n: usize) -> IdentityExpr<T> {
    eye(n, n, 0)
}

// ---------------------------------------------------------------------------
// Diagonals

fn trailing_matrix(shape: &[usize], what: &str) -> Result<(usize, usize)> {
    match shape {
        [.., rows, cols] => Ok((*rows, *cols)),
        _ => Err(TensorError::invalid_argument(format!(
            "{} requires rank >= 2, got rank {}",
            what,
            shape.len()
        ))),
    }
}

/// Length of diagonal `k` of a `rows x cols` matrix.
pub(crate) fn diagonal_len(rows: usize, cols: usize, k: isize) -> usize {
    let shift = k.unsigned_abs();
    if k >= 0 {
        rows.min(cols.saturating_sub(shift))
    } else {
        rows.saturating_sub(shift).min(cols)
    }
}

/// Offset diagonal of the two trailing axes, rank N -> N-1.
///
/// Leading axes are batch axes; the diagonal becomes the last axis.
/// Writable when the operand is.
///
/// # Examples
///
/// ```
/// use tenx_core::{Expression, ExpressionExt, Tensor};
///
/// let m = Tensor::from_vec((1..=6).collect::<Vec<i32>>(), &[2, 3]).unwrap();
/// assert_eq!((&m).diagonal(0).unwrap().iter().collect::<Vec<_>>(), vec![1, 5]);
/// assert_eq!((&m).diagonal(1).unwrap().iter().collect::<Vec<_>>(), vec![2, 6]);
/// assert_eq!((&m).diagonal(-1).unwrap().iter().collect::<Vec<_>>(), vec![4]);
/// assert_eq!((&m).diagonal(3).unwrap().size(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct DiagonalExpr<A> {
    operand: A,
    k: isize,
    shape: Shape,
}

impl<A: Expression> DiagonalExpr<A> {
    pub fn new(operand: A, k: isize) -> Result<Self> {
        let (rows, cols) = trailing_matrix(operand.shape(), "diagonal")?;
        let batch = &operand.shape()[..operand.rank() - 2];
        let mut shape = Shape::from_slice(batch);
        shape.push(diagonal_len(rows, cols, k));
        Ok(DiagonalExpr { operand, k, shape })
    }

    fn operand_index(&self, index: &[usize]) -> Index {
        let (batch, d) = index.split_at(index.len() - 1);
        let d = d[0];
        let (row, col) = if self.k >= 0 {
            (d, d + self.k.unsigned_abs())
        } else {
            (d + self.k.unsigned_abs(), d)
        };
        let mut out = Index::from_slice(batch);
        out.push(row);
        out.push(col);
        out
    }
}

impl<A: Expression> Expression for DiagonalExpr<A> {
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

impl<A: ExpressionMut> ExpressionMut for DiagonalExpr<A> {
    #[inline]
    fn eval_mut(&mut self, index: &[usize]) -> &mut A::Elem {
        let mapped = self.operand_index(index);
        self.operand.eval_mut(&mapped)
    }
}

/// Square matrix with a 1-D operand on diagonal `k`, zero elsewhere.
///
/// The side length is `len + |k|`.
///
/// # Examples
///
/// ```
/// use tenx_core::{diag_matrix, Expression, Tensor};
///
/// let v = Tensor::from_vec(vec![1, 2], &[2]).unwrap();
/// let d = diag_matrix(&v, -1).unwrap();
/// assert_eq!(d.shape(), &[3, 3]);
/// assert_eq!(d.iter().collect::<Vec<_>>(), vec![0, 0, 0, 1, 0, 0, 0, 2, 0]);
/// ```
#[derive(Debug, Clone)]
pub struct DiagMatrixExpr<A> {
    operand: A,
    k: isize,
    shape: Shape,
}

impl<A: Expression> DiagMatrixExpr<A> {
    pub fn new(operand: A, k: isize) -> Result<Self> {
        if operand.rank() != 1 {
            return Err(TensorError::RankMismatch {
                expected: 1,
                actual: operand.rank(),
            });
        }
        let side = operand.shape()[0] + k.unsigned_abs();
        Ok(DiagMatrixExpr {
            operand,
            k,
            shape: smallvec![side, side],
        })
    }
}

impl<A> Expression for DiagMatrixExpr<A>
where
    A: Expression,
    A::Elem: Zero,
{
    type Elem = A::Elem;

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn layout(&self) -> Layout {
        self.operand.layout()
    }

    #[inline]
    fn eval(&self, index: &[usize]) -> A::Elem {
        let (i, j) = (index[0], index[1]);
        if j as isize - i as isize == self.k {
            self.operand.eval(&[i.min(j)])
        } else {
            Zero::zero()
        }
    }
}

/// Build a diagonal matrix from a 1-D expression.
pub fn diag_matrix<A: Expression>(operand: A, k: isize) -> Result<DiagMatrixExpr<A>> {
    DiagMatrixExpr::new(operand, k)
}

// ---------------------------------------------------------------------------
// Triangles

/// Which side of diagonal `k` a [`TriangularExpr`] keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Triangle {
    /// `col <= row + k`
    Lower,
    /// `col >= row + k`
    Upper,
}

/// Operand values on one side of diagonal `k`, zero elsewhere.
///
/// Applies to the two trailing axes, so higher-rank operands are treated as
/// stacks of matrices. With `strict` the diagonal itself is excluded.
///
/// # Examples
///
/// ```
/// use tenx_core::{Expression, ExpressionExt, Tensor};
///
/// let a = Tensor::from_vec((1..=9).collect::<Vec<i32>>(), &[3, 3]).unwrap();
/// let lower = (&a).tril(0).unwrap();
/// assert_eq!(lower.iter().collect::<Vec<_>>(), vec![1, 0, 0, 4, 5, 0, 7, 8, 9]);
/// let upper = (&a).triu(1).unwrap();
/// assert_eq!(upper.iter().collect::<Vec<_>>(), vec![0, 2, 3, 0, 0, 6, 0, 0, 0]);
/// ```
#[derive(Debug, Clone)]
pub struct TriangularExpr<A> {
    operand: A,
    triangle: Triangle,
    k: isize,
    strict: bool,
}

impl<A: Expression> TriangularExpr<A> {
    pub fn new(operand: A, triangle: Triangle, k: isize, strict: bool) -> Result<Self> {
        trailing_matrix(operand.shape(), "triangular view")?;
        Ok(TriangularExpr {
            operand,
            triangle,
            k,
            strict,
        })
    }

    pub fn lower(operand: A, k: isize) -> Result<Self> {
        Self::new(operand, Triangle::Lower, k, false)
    }

    pub fn upper(operand: A, k: isize) -> Result<Self> {
        Self::new(operand, Triangle::Upper, k, false)
    }

    pub fn triangle(&self) -> Triangle {
        self.triangle
    }

    #[inline]
    fn keeps(&self, row: usize, col: usize) -> bool {
        let col = col as isize;
        let bound = row as isize + self.k;
        match (self.triangle, self.strict) {
            (Triangle::Lower, false) => col <= bound,
            (Triangle::Lower, true) => col < bound,
            (Triangle::Upper, false) => col >= bound,
            (Triangle::Upper, true) => col > bound,
        }
    }
}

impl<A> Expression for TriangularExpr<A>
where
    A: Expression,
    A::Elem: Zero,
{
    type Elem = A::Elem;

    fn shape(&self) -> &[usize] {
        self.operand.shape()
    }

    fn layout(&self) -> Layout {
        self.operand.layout()
    }

    #[inline]
    fn eval(&self, index: &[usize]) -> A::Elem {
        let n = index.len();
        if self.keeps(index[n - 2], index[n - 1]) {
            self.operand.eval(index)
        } else {
            Zero::zero()
        }
    }
}

/// Lower triangle of the trailing two axes.
pub fn tril<A: Expression>(operand: A, k: isize) -> Result<TriangularExpr<A>> {
    TriangularExpr::lower(operand, k)
}

/// Upper triangle of the trailing two axes.
pub fn triu<A: Expression>(operand: A, k: isize) -> Result<TriangularExpr<A>> {
    TriangularExpr::upper(operand, k)
}
