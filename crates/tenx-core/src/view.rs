//! Strided views over borrowed buffers
//!
//! A view is a borrowed buffer plus `(shape, strides, offset)`: the element
//! at `idx` lives at `offset + sum(idx[i] * strides[i])`. Slicing,
//! permuting, reversing, squeezing and (for contiguous views) reshaping only
//! rewrite that metadata, so every view shares the buffer of the tensor it
//! was taken from. Writes through a [`TensorViewMut`] are visible in the
//! owner once the view is dropped.
//!
//! # Examples
//!
//! ```
//! use tenx_core::{s, Expression, ExpressionMut, Tensor};
//!
//! let mut t = Tensor::<i32>::zeros(&[3, 4]);
//! {
//!     let mut col = t.slice_mut(&s![.., 1]).unwrap();
//!     col.fill(7);
//! }
//! assert_eq!(t.data(), &[0, 7, 0, 0, 0, 7, 0, 0, 0, 7, 0, 0]);
//!
//! let v = t.view();
//! assert!(v.is_contiguous());
//! assert!(!v.slice(&s![.., ..;2]).unwrap().is_contiguous());
//! ```

use crate::error::{Result, TensorError};
use crate::expr::{Expression, ExpressionMut};
use crate::shape::{is_contiguous_for, make_strides, normalize_axis, size_of, validate_permutation};
use crate::slice::{apply_slice, SliceArg};
use crate::types::{Index, Layout, Shape, Strides};

/// Shape, strides and offset shared by the strided view types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Strided {
    pub(crate) shape: Shape,
    pub(crate) strides: Strides,
    pub(crate) offset: usize,
    pub(crate) layout: Layout,
}

impl Strided {
    pub(crate) fn contiguous(shape: &[usize], layout: Layout) -> Self {
        Strided {
            shape: Shape::from_slice(shape),
            strides: make_strides(shape, layout),
            offset: 0,
            layout,
        }
    }

    /// Validated metadata for a buffer of `len` elements.
    pub(crate) fn checked(
        shape: &[usize],
        strides: &[isize],
        offset: usize,
        layout: Layout,
        len: usize,
    ) -> Result<Self> {
        if shape.len() != strides.len() {
            return Err(TensorError::RankMismatch {
                expected: shape.len(),
                actual: strides.len(),
            });
        }
        let meta = Strided {
            shape: Shape::from_slice(shape),
            strides: Strides::from_slice(strides),
            offset,
            layout,
        };
        if size_of(shape) > 0 {
            let (lo, hi) = meta.extent();
            if lo < 0 || hi >= len as isize {
                return Err(TensorError::invalid_argument(format!(
                    "strided view reaches buffer positions {}..={} outside a buffer of {} elements",
                    lo, hi, len
                )));
            }
        }
        Ok(meta)
    }

    /// Lowest and highest buffer positions reachable (non-empty shapes only).
    fn extent(&self) -> (isize, isize) {
        let base = self.offset as isize;
        self.shape
            .iter()
            .zip(&self.strides)
            .fold((base, base), |(lo, hi), (&n, &s)| {
                let reach = (n as isize - 1) * s;
                if reach < 0 {
                    (lo + reach, hi)
                } else {
                    (lo, hi + reach)
                }
            })
    }

    #[inline]
    pub(crate) fn position(&self, index: &[usize]) -> usize {
        let delta: isize = index
            .iter()
            .zip(&self.strides)
            .map(|(&i, &s)| i as isize * s)
            .sum();
        (self.offset as isize + delta) as usize
    }

    pub(crate) fn is_contiguous(&self) -> bool {
        is_contiguous_for(&self.shape, &self.strides, self.layout)
    }

    /// Buffer position of every element, in `layout` order.
    pub(crate) fn positions(&self, layout: Layout) -> Vec<usize> {
        let mut out = Vec::with_capacity(size_of(&self.shape));
        crate::shape::for_each_index(&self.shape, layout, |idx| out.push(self.position(idx)));
        out
    }

    pub(crate) fn permuted(&self, perm: &[usize]) -> Result<Self> {
        validate_permutation(perm, self.shape.len())?;
        Ok(Strided {
            shape: perm.iter().map(|&p| self.shape[p]).collect(),
            strides: perm.iter().map(|&p| self.strides[p]).collect(),
            offset: self.offset,
            layout: self.layout,
        })
    }

    pub(crate) fn reversed_axis(&self, axis: usize) -> Result<Self> {
        let rank = self.shape.len();
        if axis >= rank {
            return Err(TensorError::AxisOutOfRange {
                axis: axis as isize,
                rank,
            });
        }
        let mut out = self.clone();
        let n = self.shape[axis];
        if n > 0 {
            out.offset = (self.offset as isize + (n as isize - 1) * self.strides[axis]) as usize;
        }
        out.strides[axis] = -self.strides[axis];
        Ok(out)
    }

    pub(crate) fn squeezed(&self, axis: Option<usize>) -> Result<Self> {
        let keep: Vec<bool> = match axis {
            None => self.shape.iter().map(|&n| n != 1).collect(),
            Some(axis) => {
                let rank = self.shape.len();
                if axis >= rank {
                    return Err(TensorError::AxisOutOfRange {
                        axis: axis as isize,
                        rank,
                    });
                }
                if self.shape[axis] != 1 {
                    return Err(TensorError::InvalidSqueeze {
                        axis,
                        extent: self.shape[axis],
                    });
                }
                (0..rank).map(|a| a != axis).collect()
            }
        };
        let mut out = Strided {
            shape: Shape::new(),
            strides: Strides::new(),
            offset: self.offset,
            layout: self.layout,
        };
        for ((&n, &s), &k) in self.shape.iter().zip(&self.strides).zip(&keep) {
            if k {
                out.shape.push(n);
                out.strides.push(s);
            }
        }
        Ok(out)
    }

    pub(crate) fn expanded(&self, axis: isize) -> Result<Self> {
        let axis = normalize_axis(axis, self.shape.len() + 1)?;
        let mut out = self.clone();
        out.shape.insert(axis, 1);
        out.strides.insert(axis, 0);
        Ok(out)
    }

    pub(crate) fn reshaped(&self, shape: &[usize]) -> Result<Self> {
        if size_of(shape) != size_of(&self.shape) {
            return Err(TensorError::IncompatibleReshape {
                from: self.shape.clone(),
                to: Shape::from_slice(shape),
            });
        }
        if !self.is_contiguous() {
            return Err(TensorError::NotContiguous {
                shape: self.shape.clone(),
                strides: self.strides.to_vec(),
            });
        }
        Ok(Strided {
            shape: Shape::from_slice(shape),
            strides: make_strides(shape, self.layout),
            offset: self.offset,
            layout: self.layout,
        })
    }

    pub(crate) fn sliced(&self, args: &[SliceArg]) -> Result<Self> {
        let (shape, strides, offset) = apply_slice(&self.shape, &self.strides, self.offset, args)?;
        Ok(Strided {
            shape,
            strides,
            offset,
            layout: self.layout,
        })
    }
}

/// Read-only strided view of a borrowed buffer.
#[derive(Debug, Clone)]
pub struct TensorView<'a, T> {
    data: &'a [T],
    meta: Strided,
}

/// Mutable strided view of a borrowed buffer.
#[derive(Debug)]
pub struct TensorViewMut<'a, T> {
    data: &'a mut [T],
    meta: Strided,
}

impl<'a, T> TensorView<'a, T> {
    pub(crate) fn from_parts(data: &'a [T], meta: Strided) -> Self {
        TensorView { data, meta }
    }

    /// Contiguous row-major view of `data`.
    pub fn from_slice(data: &'a [T], shape: &[usize]) -> Result<Self> {
        if data.len() != size_of(shape) {
            return Err(TensorError::SizeMismatch {
                shape: Shape::from_slice(shape),
                expected: size_of(shape),
                actual: data.len(),
            });
        }
        Ok(TensorView {
            data,
            meta: Strided::contiguous(shape, Layout::RowMajor),
        })
    }

    /// View with explicit strides and offset into `data`.
    ///
    /// # Errors
    ///
    /// Fails if any addressable element would fall outside `data`.
    ///
    /// ```
    /// use tenx_core::{Expression, Layout, TensorView};
    ///
    /// let buf = [0, 1, 2, 3, 4, 5];
    /// // every other element, backwards
    /// let v = TensorView::with_strides(&buf, &[3], &[-2], 5, Layout::RowMajor).unwrap();
    /// assert_eq!(v.iter().collect::<Vec<_>>(), vec![5, 3, 1]);
    /// assert!(TensorView::with_strides(&buf, &[4], &[2], 0, Layout::RowMajor).is_err());
    /// ```
    pub fn with_strides(
        data: &'a [T],
        shape: &[usize],
        strides: &[isize],
        offset: usize,
        layout: Layout,
    ) -> Result<Self> {
        let meta = Strided::checked(shape, strides, offset, layout, data.len())?;
        Ok(TensorView { data, meta })
    }

    /// The whole underlying buffer (not just the viewed elements).
    pub fn data(&self) -> &'a [T] {
        self.data
    }

    pub fn shape(&self) -> &[usize] {
        &self.meta.shape
    }

    pub fn strides(&self) -> &[isize] {
        &self.meta.strides
    }

    pub fn offset(&self) -> usize {
        self.meta.offset
    }

    pub fn layout(&self) -> Layout {
        self.meta.layout
    }

    /// Whether the viewed elements are gap-free in this view's layout.
    pub fn is_contiguous(&self) -> bool {
        self.meta.is_contiguous()
    }

    /// Reorder axes without copying.
    pub fn permute(&self, perm: &[usize]) -> Result<TensorView<'a, T>> {
        Ok(TensorView::from_parts(self.data, self.meta.permuted(perm)?))
    }

    /// Reverse the order of all axes.
    pub fn t(&self) -> TensorView<'a, T> {
        let perm: Index = (0..self.meta.shape.len()).rev().collect();
        let meta = Strided {
            shape: perm.iter().map(|&p| self.meta.shape[p]).collect(),
            strides: perm.iter().map(|&p| self.meta.strides[p]).collect(),
            offset: self.meta.offset,
            layout: self.meta.layout,
        };
        TensorView::from_parts(self.data, meta)
    }

    pub fn reversed_axis(&self, axis: usize) -> Result<TensorView<'a, T>> {
        Ok(TensorView::from_parts(self.data, self.meta.reversed_axis(axis)?))
    }

    /// Drop one axis of extent 1, or every such axis with `None`.
    pub fn squeeze(&self, axis: Option<usize>) -> Result<TensorView<'a, T>> {
        Ok(TensorView::from_parts(self.data, self.meta.squeezed(axis)?))
    }

    /// Insert an axis of extent 1 at `axis` (negative counts from the end).
    pub fn expand_dims(&self, axis: isize) -> Result<TensorView<'a, T>> {
        Ok(TensorView::from_parts(self.data, self.meta.expanded(axis)?))
    }

    /// Reinterpret a contiguous view with a new shape.
    ///
    /// # Errors
    ///
    /// `IncompatibleReshape` on an element-count mismatch, `NotContiguous`
    /// when the viewed elements are not gap-free in this view's layout.
    pub fn reshape(&self, shape: &[usize]) -> Result<TensorView<'a, T>> {
        Ok(TensorView::from_parts(self.data, self.meta.reshaped(shape)?))
    }

    pub fn flatten(&self) -> Result<TensorView<'a, T>> {
        self.reshape(&[size_of(&self.meta.shape)])
    }

    /// NumPy-style basic slicing; see [`s!`](crate::s).
    pub fn slice(&self, args: &[SliceArg]) -> Result<TensorView<'a, T>> {
        Ok(TensorView::from_parts(self.data, self.meta.sliced(args)?))
    }

    pub(crate) fn meta(&self) -> &Strided {
        &self.meta
    }
}

impl<T: Clone> Expression for TensorView<'_, T> {
    type Elem = T;

    fn shape(&self) -> &[usize] {
        &self.meta.shape
    }

    fn layout(&self) -> Layout {
        self.meta.layout
    }

    #[inline]
    fn eval(&self, index: &[usize]) -> T {
        self.data[self.meta.position(index)].clone()
    }
}

impl<'a, T> TensorViewMut<'a, T> {
    pub(crate) fn from_parts(data: &'a mut [T], meta: Strided) -> Self {
        TensorViewMut { data, meta }
    }

    /// Contiguous row-major mutable view of `data`.
    pub fn from_slice(data: &'a mut [T], shape: &[usize]) -> Result<Self> {
        if data.len() != size_of(shape) {
            return Err(TensorError::SizeMismatch {
                shape: Shape::from_slice(shape),
                expected: size_of(shape),
                actual: data.len(),
            });
        }
        Ok(TensorViewMut {
            data,
            meta: Strided::contiguous(shape, Layout::RowMajor),
        })
    }

    pub fn with_strides(
        data: &'a mut [T],
        shape: &[usize],
        strides: &[isize],
        offset: usize,
        layout: Layout,
    ) -> Result<Self> {
        let meta = Strided::checked(shape, strides, offset, layout, data.len())?;
        Ok(TensorViewMut { data, meta })
    }

    pub fn data(&self) -> &[T] {
        &*self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut *self.data
    }

    pub fn shape(&self) -> &[usize] {
        &self.meta.shape
    }

    pub fn strides(&self) -> &[isize] {
        &self.meta.strides
    }

    pub fn offset(&self) -> usize {
        self.meta.offset
    }

    pub fn layout(&self) -> Layout {
        self.meta.layout
    }

    pub fn is_contiguous(&self) -> bool {
        self.meta.is_contiguous()
    }

    /// Read-only reborrow.
    pub fn view(&self) -> TensorView<'_, T> {
        TensorView::from_parts(&*self.data, self.meta.clone())
    }

    /// Mutable reborrow.
    pub fn view_mut(&mut self) -> TensorViewMut<'_, T> {
        TensorViewMut::from_parts(&mut *self.data, self.meta.clone())
    }

    pub fn permute(self, perm: &[usize]) -> Result<TensorViewMut<'a, T>> {
        let meta = self.meta.permuted(perm)?;
        Ok(TensorViewMut::from_parts(self.data, meta))
    }

    pub fn reversed_axis(self, axis: usize) -> Result<TensorViewMut<'a, T>> {
        let meta = self.meta.reversed_axis(axis)?;
        Ok(TensorViewMut::from_parts(self.data, meta))
    }

    pub fn squeeze(self, axis: Option<usize>) -> Result<TensorViewMut<'a, T>> {
        let meta = self.meta.squeezed(axis)?;
        Ok(TensorViewMut::from_parts(self.data, meta))
    }

    pub fn expand_dims(self, axis: isize) -> Result<TensorViewMut<'a, T>> {
        let meta = self.meta.expanded(axis)?;
        Ok(TensorViewMut::from_parts(self.data, meta))
    }

    pub fn reshape(self, shape: &[usize]) -> Result<TensorViewMut<'a, T>> {
        let meta = self.meta.reshaped(shape)?;
        Ok(TensorViewMut::from_parts(self.data, meta))
    }

    pub fn flatten(self) -> Result<TensorViewMut<'a, T>> {
        let size = size_of(&self.meta.shape);
        self.reshape(&[size])
    }

    /// Consume into a narrower mutable view.
    pub fn into_slice(self, args: &[SliceArg]) -> Result<TensorViewMut<'a, T>> {
        let meta = self.meta.sliced(args)?;
        Ok(TensorViewMut::from_parts(self.data, meta))
    }

    /// Mutable sub-view borrowing from `self`.
    pub fn slice_mut(&mut self, args: &[SliceArg]) -> Result<TensorViewMut<'_, T>> {
        let meta = self.meta.sliced(args)?;
        Ok(TensorViewMut::from_parts(&mut *self.data, meta))
    }

    pub fn slice(&self, args: &[SliceArg]) -> Result<TensorView<'_, T>> {
        let meta = self.meta.sliced(args)?;
        Ok(TensorView::from_parts(&*self.data, meta))
    }

    pub(crate) fn into_parts(self) -> (&'a mut [T], Strided) {
        (self.data, self.meta)
    }
}

impl<T: Clone> Expression for TensorViewMut<'_, T> {
    type Elem = T;

    fn shape(&self) -> &[usize] {
        &self.meta.shape
    }

    fn layout(&self) -> Layout {
        self.meta.layout
    }

    #[inline]
    fn eval(&self, index: &[usize]) -> T {
        self.data[self.meta.position(index)].clone()
    }
}

impl<T: Clone> ExpressionMut for TensorViewMut<'_, T> {
    #[inline]
    fn eval_mut(&mut self, index: &[usize]) -> &mut T {
        let pos = self.meta.position(index);
        &mut self.data[pos]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::Tensor;
    use crate::expr::ExpressionExt;
    use crate::s;

    fn grid() -> Tensor<i32> {
        Tensor::from_vec((0..12).collect(), &[3, 4]).unwrap()
    }

    #[test]
    fn test_view_accessors() {
        let t = grid();
        let v = t.view();
        assert_eq!(v.strides(), &[4, 1]);
        assert_eq!(v.offset(), 0);
        assert_eq!(v.data().len(), 12);
        assert!(v.is_contiguous());
        assert_eq!(v.eval(&[2, 3]), 11);
    }

    #[test]
    fn test_slice_shares_buffer() {
        let t = grid();
        let v = t.slice(&s![1..3, 1..;2]).unwrap();
        assert_eq!(v.shape(), &[2, 2]);
        assert_eq!(v.offset(), 5);
        assert_eq!(v.strides(), &[4, 2]);
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![5, 7, 9, 11]);
        assert!(std::ptr::eq(v.data().as_ptr(), t.data().as_ptr()));
    }

    #[test]
    fn test_nested_slices() {
        let t = grid();
        let v = t.slice(&s![..;-1, ..]).unwrap();
        let w = v.slice(&s![1.., -1]).unwrap();
        assert_eq!(w.iter().collect::<Vec<_>>(), vec![7, 3]);
    }

    #[test]
    fn test_permute_and_transpose_view() {
        let t = grid();
        let tv = t.view().t();
        assert_eq!(tv.shape(), &[4, 3]);
        assert_eq!(tv.strides(), &[1, 4]);
        assert_eq!(tv.eval(&[3, 2]), 11);
        assert!(!tv.is_contiguous());
        let p = t.view().permute(&[1, 0]).unwrap();
        assert_eq!(p.strides(), tv.strides());
        assert!(t.view().permute(&[0, 0]).is_err());
    }

    #[test]
    fn test_reversed_axis_view() {
        let t = grid();
        let r = t.view().reversed_axis(1).unwrap();
        assert_eq!(r.offset(), 3);
        assert_eq!(r.eval(&[0, 0]), 3);
        assert_eq!(r.eval(&[2, 3]), 8);
    }

    #[test]
    fn test_squeeze_and_expand() {
        let t = Tensor::from_vec((0..6).collect::<Vec<i32>>(), &[1, 6, 1]).unwrap();
        let v = t.view();
        assert_eq!(v.squeeze(None).unwrap().shape(), &[6]);
        assert_eq!(v.squeeze(Some(2)).unwrap().shape(), &[1, 6]);
        let err = v.squeeze(Some(1)).unwrap_err();
        assert_eq!(err, TensorError::InvalidSqueeze { axis: 1, extent: 6 });
        assert!(v.squeeze(Some(3)).is_err());

        let e = v.expand_dims(-1).unwrap();
        assert_eq!(e.shape(), &[1, 6, 1, 1]);
        let e = v.expand_dims(0).unwrap();
        assert_eq!(e.shape(), &[1, 1, 6, 1]);
        assert_eq!(e.eval(&[0, 0, 4, 0]), 4);
    }

    #[test]
    fn test_reshape_contiguous_only() {
        let t = grid();
        let r = t.view().reshape(&[2, 6]).unwrap();
        assert_eq!(r.eval(&[1, 0]), 6);
        assert_eq!(t.view().flatten().unwrap().shape(), &[12]);

        let err = t.view().reshape(&[5, 2]).unwrap_err();
        assert!(matches!(err, TensorError::IncompatibleReshape { .. }));

        let err = t.view().t().reshape(&[12]).unwrap_err();
        assert!(matches!(err, TensorError::NotContiguous { .. }));

        // an interior row block is still contiguous
        let rows = t.slice(&s![1..3]).unwrap();
        assert!(rows.is_contiguous());
        assert_eq!(rows.flatten().unwrap().iter().collect::<Vec<_>>(), (4..12).collect::<Vec<_>>());
    }

    #[test]
    fn test_view_mut_writes_visible() {
        let mut t = grid();
        {
            let mut v = t.view_mut().permute(&[1, 0]).unwrap();
            v.set(&[3, 0], -1).unwrap();
            let mut sub = v.slice_mut(&s![0]).unwrap();
            sub.fill(9);
        }
        assert_eq!(t[&[0, 3]], -1);
        assert_eq!(t[&[0, 0]], 9);
        assert_eq!(t[&[1, 0]], 9);
        assert_eq!(t[&[2, 0]], 9);
    }

    #[test]
    fn test_with_strides_bounds() {
        let buf = vec![0.0_f64; 6];
        assert!(TensorView::with_strides(&buf, &[2, 3], &[3, 1], 0, Layout::RowMajor).is_ok());
        assert!(TensorView::with_strides(&buf, &[2, 3], &[3, 1], 1, Layout::RowMajor).is_err());
        assert!(TensorView::with_strides(&buf, &[2], &[-1], 0, Layout::RowMajor).is_err());
        assert!(TensorView::with_strides(&buf, &[0, 3], &[3, 1], 6, Layout::RowMajor).is_ok());
        assert!(TensorView::with_strides(&buf, &[2], &[1, 1], 0, Layout::RowMajor).is_err());
    }

    #[test]
    fn test_from_slice() {
        let buf = [1, 2, 3, 4];
        let v = TensorView::from_slice(&buf, &[2, 2]).unwrap();
        assert_eq!(v.to_tensor().data(), &[1, 2, 3, 4]);
        assert!(TensorView::from_slice(&buf, &[3]).is_err());

        let mut buf = [0; 4];
        let mut m = TensorViewMut::from_slice(&mut buf, &[4]).unwrap();
        m.fill(2);
        assert_eq!(buf, [2, 2, 2, 2]);
    }
}
