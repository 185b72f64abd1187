//! Arithmetic operators on expressions
//!
//! Every expression type in this crate, plus [`Tensor`] and `&Tensor`,
//! supports `+ - * / %` and unary `-`. The result is always another lazy
//! expression:
//!
//! - expression ⊕ expression → [`BinaryExpr`] (operands broadcast)
//! - expression ⊕ scalar → [`BinaryScalarExpr`]
//! - scalar ⊕ expression → [`ScalarBinaryExpr`]
//! - `-expression` → [`UnaryExpr`]
//!
//! Scalars are the primitive numeric types and `Complex<f32>`/`Complex<f64>`.
//!
//! Operators cannot return a `Result`, so `a + b` **panics** when the operands
//! do not broadcast. Use [`ExpressionExt::zip_with`](crate::ExpressionExt::zip_with)
//! (or [`BinaryExpr::new`]) for the fallible form.
//!
//! Compound assignment (`+=`, ...) evaluates into [`Tensor`], [`TensorViewMut`]
//! and [`IndirectViewMut`] in place; the right-hand side is broadcast to the
//! destination's shape.
//!
//! # Examples
//!
//! ```
//! use tenx_core::{Expression, ExpressionExt, Tensor};
//!
//! let a = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0], &[1, 3]).unwrap();
//! let b = Tensor::from_vec(vec![10.0_f64, 20.0], &[2, 1]).unwrap();
//!
//! let e = (&a + &b) * 2.0 - 1.0;
//! assert_eq!(e.shape(), &[2, 3]);
//! assert_eq!(e.to_tensor().data(), &[21.0, 23.0, 25.0, 41.0, 43.0, 45.0]);
//!
//! let mut acc = Tensor::<f64>::zeros(&[2, 3]);
//! acc += &a;
//! acc *= 3.0;
//! assert_eq!(acc[&[1, 2]], 9.0);
//! ```

use scirs2_core::num_complex::Complex;
use scirs2_core::numeric::Num;

use crate::broadcast::BroadcastExpr;
use crate::dense::Tensor;
use crate::elementwise::{
    BinaryExpr, BinaryScalarExpr, ElementWiseExpr, OuterExpr, ScalarBinaryExpr, TernaryExpr,
    UnaryExpr,
};
use crate::expr::{Expression, ExpressionMut};
use crate::generators::{
    ConstExpr, DiagMatrixExpr, DiagonalExpr, IdentityExpr, LogSequenceExpr, SequenceExpr,
    TriangularExpr,
};
use crate::indirect::{IndirectView, IndirectViewMut};
use crate::shape::for_each_index;
use crate::structural::{ReshapeExpr, ReverseExpr, RotateExpr, TransposeExpr};
use crate::types::Shape;
use crate::view::{TensorView, TensorViewMut};

/// Function pointer type carried by operator-built unary expressions.
pub type UnaryFn<T> = fn(T) -> T;

/// Function pointer type carried by operator-built binary expressions.
pub type BinaryFn<T> = fn(T, T) -> T;

/// Complex conjugation, the identity on real and integer types.
///
/// # Examples
///
/// ```
/// use scirs2_core::num_complex::Complex;
/// use tenx_core::Conj;
///
/// assert_eq!(Conj::conj(&Complex::new(1.0_f64, 2.0)), Complex::new(1.0, -2.0));
/// assert_eq!(Conj::conj(&3.5f32), 3.5);
/// ```
pub trait Conj {
    fn conj(&self) -> Self;
}

macro_rules! impl_conj_identity {
    ($($t:ty),*) => {
        $(
            impl Conj for $t {
                #[inline]
                fn conj(&self) -> Self {
                    *self
                }
            }
        )*
    };
}

impl_conj_identity!(f32, f64, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl<T> Conj for Complex<T>
where
    T: Clone + Num + std::ops::Neg<Output = T>,
{
    #[inline]
    fn conj(&self) -> Self {
        Complex::conj(self)
    }
}

fn binary_op<A, B>(lhs: A, rhs: B, f: BinaryFn<A::Elem>) -> BinaryExpr<BinaryFn<A::Elem>, A, B>
where
    A: Expression,
    B: Expression<Elem = A::Elem>,
{
    match BinaryExpr::new(f, lhs, rhs) {
        Ok(expr) => expr,
        Err(err) => panic!("{err}"),
    }
}

fn compound_assign<D, S>(dst: &mut D, src: S, f: fn(&mut D::Elem, D::Elem))
where
    D: ExpressionMut,
    S: Expression<Elem = D::Elem>,
{
    let shape = Shape::from_slice(dst.shape());
    let src = match BroadcastExpr::new(src, &shape) {
        Ok(src) => src,
        Err(err) => panic!("{err}"),
    };
    for_each_index(&shape, dst.layout(), |idx| f(dst.eval_mut(idx), src.eval(idx)));
}

macro_rules! impl_binary_op {
    ([$($g:tt)*] $ty:ty, $trt:ident, $method:ident) => {
        impl<$($g)* Rhs> std::ops::$trt<Rhs> for $ty
        where
            Self: Expression,
            Rhs: Expression<Elem = <Self as Expression>::Elem>,
            <Self as Expression>::Elem: std::ops::$trt<Output = <Self as Expression>::Elem>,
        {
            type Output = BinaryExpr<BinaryFn<<Self as Expression>::Elem>, Self, Rhs>;

            fn $method(self, rhs: Rhs) -> Self::Output {
                binary_op(self, rhs, <<Self as Expression>::Elem as std::ops::$trt>::$method)
            }
        }
    };
}

macro_rules! impl_scalar_op {
    ([$($g:tt)*] $ty:ty, $s:ty, $trt:ident, $method:ident) => {
        impl<$($g)*> std::ops::$trt<$s> for $ty
        where
            Self: Expression<Elem = $s>,
        {
            type Output = BinaryScalarExpr<BinaryFn<$s>, Self, $s>;

            fn $method(self, rhs: $s) -> Self::Output {
                BinaryScalarExpr::new(<$s as std::ops::$trt>::$method as BinaryFn<$s>, self, rhs)
            }
        }

        impl<$($g)*> std::ops::$trt<$ty> for $s
        where
            $ty: Expression<Elem = $s>,
        {
            type Output = ScalarBinaryExpr<BinaryFn<$s>, $s, $ty>;

            fn $method(self, rhs: $ty) -> Self::Output {
                ScalarBinaryExpr::new(<$s as std::ops::$trt>::$method as BinaryFn<$s>, self, rhs)
            }
        }
    };
}

macro_rules! impl_scalar_ops {
    ($gen:tt $ty:ty; $($s:ty),*) => {
        $(
            impl_scalar_op!($gen $ty, $s, Add, add);
            impl_scalar_op!($gen $ty, $s, Sub, sub);
            impl_scalar_op!($gen $ty, $s, Mul, mul);
            impl_scalar_op!($gen $ty, $s, Div, div);
            impl_scalar_op!($gen $ty, $s, Rem, rem);
        )*
    };
}

macro_rules! impl_neg {
    ([$($g:tt)*] $ty:ty) => {
        impl<$($g)*> std::ops::Neg for $ty
        where
            Self: Expression,
            <Self as Expression>::Elem: std::ops::Neg<Output = <Self as Expression>::Elem>,
        {
            type Output = UnaryExpr<UnaryFn<<Self as Expression>::Elem>, Self>;

            fn neg(self) -> Self::Output {
                UnaryExpr::new(
                    <<Self as Expression>::Elem as std::ops::Neg>::neg as UnaryFn<_>,
                    self,
                )
            }
        }
    };
}

/// Arithmetic operators for an expression type.
///
/// The generic parameter list is passed in brackets with a trailing comma,
/// e.g. `impl_expr_ops!([F, A,] UnaryExpr<F, A>)`.
macro_rules! impl_expr_ops {
    ($gen:tt $ty:ty) => {
        impl_binary_op!($gen $ty, Add, add);
        impl_binary_op!($gen $ty, Sub, sub);
        impl_binary_op!($gen $ty, Mul, mul);
        impl_binary_op!($gen $ty, Div, div);
        impl_binary_op!($gen $ty, Rem, rem);
        impl_neg!($gen $ty);
        impl_scalar_ops!(
            $gen $ty;
            f32, f64, i32, i64, u32, u64, isize, usize, Complex<f32>, Complex<f64>
        );
    };
}

impl_expr_ops!([T,] Tensor<T>);
impl_expr_ops!(['a, T,] &'a Tensor<T>);
impl_expr_ops!(['a, T,] TensorView<'a, T>);
impl_expr_ops!(['a, T,] IndirectView<'a, T>);
impl_expr_ops!([A,] BroadcastExpr<A>);
impl_expr_ops!([F, A,] UnaryExpr<F, A>);
impl_expr_ops!([F, A, B,] BinaryExpr<F, A, B>);
impl_expr_ops!([F, A, S,] BinaryScalarExpr<F, A, S>);
impl_expr_ops!([F, S, A,] ScalarBinaryExpr<F, S, A>);
impl_expr_ops!([F, A, B, C,] TernaryExpr<F, A, B, C>);
impl_expr_ops!([F, A, B,] OuterExpr<F, A, B>);
impl_expr_ops!(['a, T, F,] ElementWiseExpr<'a, T, F>);
impl_expr_ops!([T,] ConstExpr<T>);
impl_expr_ops!([T,] SequenceExpr<T>);
impl_expr_ops!([T,] LogSequenceExpr<T>);
impl_expr_ops!([T,] IdentityExpr<T>);
impl_expr_ops!([A,] DiagonalExpr<A>);
impl_expr_ops!([A,] DiagMatrixExpr<A>);
impl_expr_ops!([A,] TriangularExpr<A>);
impl_expr_ops!([A,] TransposeExpr<A>);
impl_expr_ops!([A,] ReverseExpr<A>);
impl_expr_ops!([A,] RotateExpr<A>);
impl_expr_ops!([A,] ReshapeExpr<A>);

macro_rules! impl_assign_op {
    ([$($g:tt)*] $ty:ty, $trt:ident, $method:ident) => {
        impl<$($g)* Rhs> std::ops::$trt<Rhs> for $ty
        where
            Self: ExpressionMut,
            Rhs: Expression<Elem = <Self as Expression>::Elem>,
            <Self as Expression>::Elem: std::ops::$trt,
        {
            fn $method(&mut self, rhs: Rhs) {
                compound_assign(self, rhs, <<Self as Expression>::Elem as std::ops::$trt>::$method);
            }
        }
    };
}

macro_rules! impl_scalar_assign_op {
    ([$($g:tt)*] $ty:ty, $s:ty, $trt:ident, $method:ident) => {
        impl<$($g)*> std::ops::$trt<$s> for $ty
        where
            Self: ExpressionMut<Elem = $s>,
        {
            fn $method(&mut self, rhs: $s) {
                let shape = Shape::from_slice(self.shape());
                for_each_index(&shape, self.layout(), |idx| {
                    <$s as std::ops::$trt>::$method(self.eval_mut(idx), rhs)
                });
            }
        }
    };
}

macro_rules! impl_scalar_assign_ops {
    ($gen:tt $ty:ty; $($s:ty),*) => {
        $(
            impl_scalar_assign_op!($gen $ty, $s, AddAssign, add_assign);
            impl_scalar_assign_op!($gen $ty, $s, SubAssign, sub_assign);
            impl_scalar_assign_op!($gen $ty, $s, MulAssign, mul_assign);
            impl_scalar_assign_op!($gen $ty, $s, DivAssign, div_assign);
            impl_scalar_assign_op!($gen $ty, $s, RemAssign, rem_assign);
        )*
    };
}

macro_rules! impl_assign_ops {
    ($gen:tt $ty:ty) => {
        impl_assign_op!($gen $ty, AddAssign, add_assign);
        impl_assign_op!($gen $ty, SubAssign, sub_assign);
        impl_assign_op!($gen $ty, MulAssign, mul_assign);
        impl_assign_op!($gen $ty, DivAssign, div_assign);
        impl_assign_op!($gen $ty, RemAssign, rem_assign);
        impl_scalar_assign_ops!(
            $gen $ty;
            f32, f64, i32, i64, u32, u64, isize, usize, Complex<f32>, Complex<f64>
        );
    };
}

impl_assign_ops!([T,] Tensor<T>);
impl_assign_ops!(['a, T,] TensorViewMut<'a, T>);
impl_assign_ops!(['a, T,] IndirectViewMut<'a, T>);
