//! Owning dense tensors
//!
//! [`Tensor<T>`] is the materialized end of every expression: a contiguous
//! buffer plus a shape and a [`Layout`]. It is itself an [`Expression`], so a
//! tensor can appear anywhere a lazy operand is expected, and an
//! [`ExpressionMut`], so it can be the target of `assign`.
//!
//! # SciRS2 Integration
//!
//! Interop with n-dimensional arrays goes through `scirs2_core::ndarray_ext`
//! ([`Tensor::from_array`] and [`Tensor::to_array`]).

use scirs2_core::ndarray_ext::{Array, ArrayD, IxDyn};
use scirs2_core::numeric::{One, Zero};

use crate::error::{Result, TensorError};
use crate::expr::{Expression, ExpressionMut};
use crate::indirect::{IndirectView, IndirectViewMut};
use crate::materialize::materialize;
use crate::shape::{check_index, for_each_index, make_strides, ravel_index_unchecked, size_of};
use crate::slice::SliceArg;
use crate::types::{Layout, Shape, Strides};
use crate::view::{Strided, TensorView, TensorViewMut};

/// Dense N-dimensional tensor owning a contiguous buffer
///
/// The buffer holds exactly `shape.iter().product()` elements in the order
/// given by the tensor's [`Layout`] (row-major unless requested otherwise).
/// A rank-0 tensor holds one element.
///
/// Two tensors compare equal when shape, layout and buffer all match.
///
/// # Examples
///
/// ```
/// use tenx_core::Tensor;
///
/// // Create a 3D tensor of zeros
/// let tensor = Tensor::<f64>::zeros(&[2, 3, 4]);
/// assert_eq!(tensor.shape(), &[2, 3, 4]);
/// assert_eq!(tensor.rank(), 3);
/// assert_eq!(tensor[&[1, 2, 3]], 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "TensorRepr<T>"))]
pub struct Tensor<T> {
    data: Vec<T>,
    shape: Shape,
    strides: Strides,
    layout: Layout,
}

/// Unvalidated wire form of a [`Tensor`]; checked by `TryFrom` on deserialize.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct TensorRepr<T> {
    data: Vec<T>,
    shape: Shape,
    #[serde(default)]
    strides: Option<Strides>,
    layout: Layout,
}

#[cfg(feature = "serde")]
impl<T> TryFrom<TensorRepr<T>> for Tensor<T> {
    type Error = TensorError;

    fn try_from(repr: TensorRepr<T>) -> Result<Self> {
        let tensor = Tensor::from_vec_with_layout(repr.data, &repr.shape, repr.layout)?;
        if let Some(strides) = repr.strides {
            if strides != tensor.strides {
                return Err(TensorError::invalid_argument(format!(
                    "strides {:?} do not match a dense {:?} tensor of shape {:?}",
                    strides.as_slice(),
                    tensor.layout,
                    tensor.shape.as_slice()
                )));
            }
        }
        Ok(tensor)
    }
}

impl<T> Tensor<T> {
    pub(crate) fn from_parts(data: Vec<T>, shape: &[usize], layout: Layout) -> Self {
        debug_assert_eq!(data.len(), size_of(shape));
        Tensor {
            data,
            shape: Shape::from_slice(shape),
            strides: make_strides(shape, layout),
            layout,
        }
    }

    /// Create a row-major tensor from a vector with given shape
    ///
    /// # Returns
    ///
    /// `SizeMismatch` if `vec.len()` differs from the product of `shape`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tenx_core::Tensor;
    ///
    /// let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    /// let tensor = Tensor::from_vec(data, &[2, 3]).unwrap();
    /// assert_eq!(tensor.shape(), &[2, 3]);
    /// assert_eq!(tensor[&[1, 0]], 4.0);
    ///
    /// assert!(Tensor::from_vec(vec![1.0_f64; 5], &[2, 3]).is_err());
    /// ```
    pub fn from_vec(vec: Vec<T>, shape: &[usize]) -> Result<Self> {
        Self::from_vec_with_layout(vec, shape, Layout::RowMajor)
    }

    /// Like [`from_vec`](Self::from_vec), reading `vec` in `layout` order.
    ///
    /// ```
    /// use tenx_core::{Layout, Tensor};
    ///
    /// let t = Tensor::from_vec_with_layout(vec![1, 2, 3, 4, 5, 6], &[2, 3], Layout::ColumnMajor).unwrap();
    /// assert_eq!(t[&[0, 1]], 3);
    /// assert_eq!(t.strides(), &[1, 2]);
    /// ```
    pub fn from_vec_with_layout(vec: Vec<T>, shape: &[usize], layout: Layout) -> Result<Self> {
        let expected = size_of(shape);
        if vec.len() != expected {
            return Err(TensorError::SizeMismatch {
                shape: Shape::from_slice(shape),
                expected,
                actual: vec.len(),
            });
        }
        Ok(Self::from_parts(vec, shape, layout))
    }

    /// Build a row-major tensor by calling `f` on every index.
    ///
    /// ```
    /// use tenx_core::Tensor;
    ///
    /// let t = Tensor::from_shape_fn(&[2, 3], |idx| 10 * idx[0] + idx[1]);
    /// assert_eq!(t.data(), &[0, 1, 2, 10, 11, 12]);
    /// ```
    pub fn from_shape_fn<F>(shape: &[usize], mut f: F) -> Self
    where
        F: FnMut(&[usize]) -> T,
    {
        let mut data = Vec::with_capacity(size_of(shape));
        for_each_index(shape, Layout::RowMajor, |idx| data.push(f(idx)));
        Self::from_parts(data, shape, Layout::RowMajor)
    }

    /// 1-D tensor from any iterator.
    pub fn from_elements<I: IntoIterator<Item = T>>(elements: I) -> Self {
        let data: Vec<T> = elements.into_iter().collect();
        let n = data.len();
        Self::from_parts(data, &[n], Layout::RowMajor)
    }

    /// Get the shape of this tensor
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Get the rank (number of dimensions) of this tensor
    ///
    /// # Examples
    ///
    /// ```
    /// use tenx_core::Tensor;
    ///
    /// let tensor = Tensor::<f32>::zeros(&[2, 3, 4]);
    /// assert_eq!(tensor.rank(), 3);
    /// ```
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Get the total number of elements
    ///
    /// # Examples
    ///
    /// ```
    /// use tenx_core::Tensor;
    ///
    /// let tensor = Tensor::<f32>::zeros(&[2, 3, 4]);
    /// assert_eq!(tensor.len(), 24);
    /// ```
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Element strides of the buffer.
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Buffer offset of the first element; always 0 for an owning tensor.
    pub fn offset(&self) -> usize {
        0
    }

    /// The buffer, in [`layout`](Self::layout) order.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Borrow the whole tensor as a strided view.
    pub fn view(&self) -> TensorView<'_, T> {
        TensorView::from_parts(&self.data, Strided::contiguous(&self.shape, self.layout))
    }

    pub fn view_mut(&mut self) -> TensorViewMut<'_, T> {
        let meta = Strided::contiguous(&self.shape, self.layout);
        TensorViewMut::from_parts(&mut self.data, meta)
    }

    /// Reversed-axes view (matrix transpose for rank 2).
    ///
    /// ```
    /// use tenx_core::{Expression, Tensor};
    ///
    /// let m = Tensor::from_vec(vec![1, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
    /// let mt = m.t();
    /// assert_eq!(mt.shape(), &[3, 2]);
    /// assert_eq!(mt.eval(&[2, 1]), 6);
    /// ```
    pub fn t(&self) -> TensorView<'_, T> {
        self.view().t()
    }

    /// NumPy-style basic slicing, see [`s!`](crate::s).
    ///
    /// ```
    /// use tenx_core::{s, Expression, Tensor};
    ///
    /// let t = Tensor::from_vec((0..12).collect::<Vec<i32>>(), &[3, 4]).unwrap();
    /// let v = t.slice(&s![1.., ..;2]).unwrap();
    /// assert_eq!(v.shape(), &[2, 2]);
    /// assert_eq!(v.iter().collect::<Vec<_>>(), vec![4, 6, 8, 10]);
    /// ```
    pub fn slice(&self, args: &[SliceArg]) -> Result<TensorView<'_, T>> {
        self.view().slice(args)
    }

    pub fn slice_mut(&mut self, args: &[SliceArg]) -> Result<TensorViewMut<'_, T>> {
        self.view_mut().into_slice(args)
    }

    /// Gather `indices` along `axis` without copying.
    pub fn take(&self, axis: usize, indices: &[usize]) -> Result<IndirectView<'_, T>> {
        self.view().take(axis, indices)
    }

    pub fn take_flat(&self, flat: &[usize]) -> Result<IndirectView<'_, T>> {
        self.view().take_flat(flat)
    }

    pub fn mask<M>(&self, mask: M) -> Result<IndirectView<'_, T>>
    where
        M: Expression<Elem = bool>,
    {
        self.view().mask(mask)
    }

    pub fn take_mut(&mut self, axis: usize, indices: &[usize]) -> Result<IndirectViewMut<'_, T>> {
        self.view_mut().take_mut(axis, indices)
    }

    pub fn mask_mut<M>(&mut self, mask: M) -> Result<IndirectViewMut<'_, T>>
    where
        M: Expression<Elem = bool>,
    {
        self.view_mut().mask_mut(mask)
    }

    /// Reinterpret the buffer with a new shape of the same size.
    ///
    /// The buffer is reused as-is, read in this tensor's layout order.
    ///
    /// ```
    /// use tenx_core::Tensor;
    ///
    /// let t = Tensor::from_vec((0..6).collect::<Vec<i32>>(), &[2, 3]).unwrap();
    /// let r = t.reshape(&[3, 2]).unwrap();
    /// assert_eq!(r[&[2, 0]], 4);
    /// ```
    pub fn reshape(self, shape: &[usize]) -> Result<Self> {
        if size_of(shape) != self.data.len() {
            return Err(TensorError::IncompatibleReshape {
                from: self.shape,
                to: Shape::from_slice(shape),
            });
        }
        Ok(Self::from_parts(self.data, shape, self.layout))
    }

    /// Apply `f` to every element in place.
    pub fn map_inplace<F: FnMut(&mut T)>(&mut self, f: F) {
        self.data.iter_mut().for_each(f);
    }

    #[inline]
    fn offset_of(&self, index: &[usize]) -> usize {
        ravel_index_unchecked(index, &self.shape, self.layout)
    }
}

impl<T: Clone> Tensor<T> {
    /// Tensor with every element set to `value`.
    pub fn full(shape: &[usize], value: T) -> Self {
        Self::from_parts(vec![value; size_of(shape)], shape, Layout::RowMajor)
    }

    /// Materialize any expression into a new tensor in its own layout.
    ///
    /// ```
    /// use tenx_core::{linspace, Tensor};
    ///
    /// let t = Tensor::from_expr(&linspace(0.0_f64, 1.0, 5, true).unwrap());
    /// assert_eq!(t.data(), &[0.0, 0.25, 0.5, 0.75, 1.0]);
    /// ```
    pub fn from_expr<E>(expr: &E) -> Self
    where
        E: Expression<Elem = T> + ?Sized,
    {
        materialize(expr)
    }

    /// Deep copy with the same shape, layout and buffer order.
    ///
    /// Use [`Tensor::to_layout`] to change the memory order while copying.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Deep copy with a fresh buffer in `layout` order.
    pub fn to_layout(&self, layout: Layout) -> Self {
        if layout == self.layout {
            return self.clone();
        }
        let mut data = Vec::with_capacity(self.data.len());
        for_each_index(&self.shape, layout, |idx| {
            data.push(self.data[self.offset_of(idx)].clone());
        });
        Self::from_parts(data, &self.shape, layout)
    }

    /// Copy an n-dimensional array (any memory order) into a row-major tensor.
    ///
    /// ```
    /// use scirs2_core::ndarray_ext::Array;
    /// use tenx_core::Tensor;
    ///
    /// let arr = Array::<f64, _>::zeros(vec![2, 3]);
    /// let tensor = Tensor::from_array(&arr);
    /// assert_eq!(tensor.shape(), &[2, 3]);
    /// ```
    pub fn from_array(array: &ArrayD<T>) -> Self {
        let data: Vec<T> = array.iter().cloned().collect();
        Self::from_parts(data, array.shape(), Layout::RowMajor)
    }

    /// Copy into an n-dimensional array.
    pub fn to_array(&self) -> Result<ArrayD<T>> {
        let data = match self.layout {
            Layout::RowMajor => self.data.clone(),
            Layout::ColumnMajor => self.to_layout(Layout::RowMajor).into_vec(),
        };
        Array::from_shape_vec(IxDyn(&self.shape), data)
            .map_err(|e| TensorError::InvalidArgument(format!("ndarray conversion failed: {e}")))
    }
}

impl<T: Clone + Zero> Tensor<T> {
    /// Create a tensor filled with zeros
    ///
    /// # Examples
    ///
    /// ```
    /// use tenx_core::Tensor;
    ///
    /// let tensor = Tensor::<f64>::zeros(&[2, 3]);
    /// assert!(tensor.data().iter().all(|&x| x == 0.0));
    /// ```
    pub fn zeros(shape: &[usize]) -> Self {
        Self::full(shape, T::zero())
    }
}

impl<T: Clone + One> Tensor<T> {
    /// Create a tensor filled with ones
    pub fn ones(shape: &[usize]) -> Self {
        Self::full(shape, T::one())
    }
}

impl<T: Clone> Expression for Tensor<T> {
    type Elem = T;

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn layout(&self) -> Layout {
        self.layout
    }

    #[inline]
    fn eval(&self, index: &[usize]) -> T {
        self.data[self.offset_of(index)].clone()
    }
}

impl<T: Clone> ExpressionMut for Tensor<T> {
    #[inline]
    fn eval_mut(&mut self, index: &[usize]) -> &mut T {
        let k = self.offset_of(index);
        &mut self.data[k]
    }
}

impl<T> std::ops::Index<&[usize]> for Tensor<T> {
    type Output = T;

    fn index(&self, index: &[usize]) -> &Self::Output {
        if let Err(e) = check_index(index, &self.shape) {
            panic!("{e}");
        }
        &self.data[self.offset_of(index)]
    }
}

impl<T> std::ops::IndexMut<&[usize]> for Tensor<T> {
    fn index_mut(&mut self, index: &[usize]) -> &mut Self::Output {
        if let Err(e) = check_index(index, &self.shape) {
            panic!("{e}");
        }
        let k = self.offset_of(index);
        &mut self.data[k]
    }
}
