//! Indirect (gather) views
//!
//! An indirect view owns only an array of buffer positions, one per element
//! of its shape in its layout order: `eval(idx) = data[positions[ravel(idx)]]`.
//! This is what integer-array ("fancy") indexing and boolean masking produce
//! in NumPy, minus the copy.
//!
//! # Examples
//!
//! ```
//! use tenx_core::{Expression, ExpressionExt, Tensor};
//!
//! let t = Tensor::from_vec((0..12).collect::<Vec<i32>>(), &[3, 4]).unwrap();
//!
//! let cols = t.take(1, &[3, 0]).unwrap();
//! assert_eq!(cols.shape(), &[3, 2]);
//! assert_eq!(cols.iter().collect::<Vec<_>>(), vec![3, 0, 7, 4, 11, 8]);
//!
//! let big = (&t).map(|x| x > 8);
//! let picked = t.mask(&big).unwrap();
//! assert_eq!(picked.iter().collect::<Vec<_>>(), vec![9, 10, 11]);
//! ```

use crate::broadcast::BroadcastExpr;
use crate::error::{Result, TensorError};
use crate::expr::{Expression, ExpressionMut};
use crate::shape::{for_each_index, ravel_index_unchecked, size_of, unravel_index_into};
use crate::types::{Index, Layout, Shape};
use crate::view::{Strided, TensorView, TensorViewMut};

/// Read-only view addressing its elements through an owned position array.
#[derive(Debug, Clone)]
pub struct IndirectView<'a, T> {
    data: &'a [T],
    shape: Shape,
    positions: Vec<usize>,
    layout: Layout,
}

/// Mutable twin of [`IndirectView`].
#[derive(Debug)]
pub struct IndirectViewMut<'a, T> {
    data: &'a mut [T],
    shape: Shape,
    positions: Vec<usize>,
    layout: Layout,
}

fn check_positions(shape: &[usize], positions: &[usize], len: usize) -> Result<()> {
    if positions.len() != size_of(shape) {
        return Err(TensorError::SizeMismatch {
            shape: Shape::from_slice(shape),
            expected: size_of(shape),
            actual: positions.len(),
        });
    }
    if let Some(&bad) = positions.iter().find(|&&p| p >= len) {
        return Err(TensorError::FlatIndexOutOfRange {
            index: bad,
            size: len,
        });
    }
    Ok(())
}

impl<'a, T> IndirectView<'a, T> {
    /// View `data` through explicit buffer `positions`, laid out as `shape`.
    ///
    /// ```
    /// use tenx_core::{Expression, IndirectView, Layout};
    ///
    /// let buf = [10, 20, 30];
    /// let v = IndirectView::new(&buf, &[2, 2], vec![2, 0, 0, 1], Layout::RowMajor).unwrap();
    /// assert_eq!(v.iter().collect::<Vec<_>>(), vec![30, 10, 10, 20]);
    /// ```
    pub fn new(data: &'a [T], shape: &[usize], positions: Vec<usize>, layout: Layout) -> Result<Self> {
        check_positions(shape, &positions, data.len())?;
        Ok(IndirectView {
            data,
            shape: Shape::from_slice(shape),
            positions,
            layout,
        })
    }

    pub fn data(&self) -> &'a [T] {
        self.data
    }

    /// Buffer position of each element, in layout order.
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }
}

impl<T: Clone> Expression for IndirectView<'_, T> {
    type Elem = T;

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn layout(&self) -> Layout {
        self.layout
    }

    #[inline]
    fn eval(&self, index: &[usize]) -> T {
        let k = ravel_index_unchecked(index, &self.shape, self.layout);
        self.data[self.positions[k]].clone()
    }
}

impl<'a, T> IndirectViewMut<'a, T> {
    pub fn new(
        data: &'a mut [T],
        shape: &[usize],
        positions: Vec<usize>,
        layout: Layout,
    ) -> Result<Self> {
        check_positions(shape, &positions, data.len())?;
        Ok(IndirectViewMut {
            data,
            shape: Shape::from_slice(shape),
            positions,
            layout,
        })
    }

    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn view(&self) -> IndirectView<'_, T> {
        IndirectView {
            data: &*self.data,
            shape: self.shape.clone(),
            positions: self.positions.clone(),
            layout: self.layout,
        }
    }
}

impl<T: Clone> Expression for IndirectViewMut<'_, T> {
    type Elem = T;

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn layout(&self) -> Layout {
        self.layout
    }

    #[inline]
    fn eval(&self, index: &[usize]) -> T {
        let k = ravel_index_unchecked(index, &self.shape, self.layout);
        self.data[self.positions[k]].clone()
    }
}

impl<T: Clone> ExpressionMut for IndirectViewMut<'_, T> {
    #[inline]
    fn eval_mut(&mut self, index: &[usize]) -> &mut T {
        let k = ravel_index_unchecked(index, &self.shape, self.layout);
        &mut self.data[self.positions[k]]
    }
}

// ---------------------------------------------------------------------------
// Position gathering shared by the read-only and mutable builders

/// Positions of the elements at the given flat indices (view layout order).
fn gather_flat(meta: &Strided, flat: &[usize]) -> Result<Vec<usize>> {
    let size = size_of(&meta.shape);
    let mut index = Index::new();
    flat.iter()
        .map(|&f| {
            if f >= size {
                return Err(TensorError::FlatIndexOutOfRange { index: f, size });
            }
            unravel_index_into(f, &meta.shape, meta.layout, &mut index);
            Ok(meta.position(&index))
        })
        .collect()
}

/// Shape and positions of `indices` taken along `axis`.
fn gather_axis(meta: &Strided, axis: usize, indices: &[usize]) -> Result<(Shape, Vec<usize>)> {
    let rank = meta.shape.len();
    if axis >= rank {
        return Err(TensorError::AxisOutOfRange {
            axis: axis as isize,
            rank,
        });
    }
    let n = meta.shape[axis];
    if let Some(&bad) = indices.iter().find(|&&i| i >= n) {
        let mut index = vec![0isize; rank];
        index[axis] = bad as isize;
        return Err(TensorError::IndexOutOfRange {
            index,
            shape: meta.shape.clone(),
        });
    }
    let mut shape = meta.shape.clone();
    shape[axis] = indices.len();

    let mut positions = Vec::with_capacity(size_of(&shape));
    let mut source = Index::new();
    for_each_index(&shape, meta.layout, |idx| {
        source.clear();
        source.extend_from_slice(idx);
        source[axis] = indices[idx[axis]];
        positions.push(meta.position(&source));
    });
    Ok((shape, positions))
}

/// Positions of the elements where `mask` (broadcast to the view) is true.
fn gather_mask<M>(meta: &Strided, mask: M) -> Result<Vec<usize>>
where
    M: Expression<Elem = bool>,
{
    let mask = BroadcastExpr::new(mask, &meta.shape)?;
    let mut positions = Vec::new();
    for_each_index(&meta.shape, meta.layout, |idx| {
        if mask.eval(idx) {
            positions.push(meta.position(idx));
        }
    });
    Ok(positions)
}

impl<'a, T> TensorView<'a, T> {
    /// 1-D view of the elements at the given flat positions (layout order).
    pub fn take_flat(&self, flat: &[usize]) -> Result<IndirectView<'a, T>> {
        let positions = gather_flat(self.meta(), flat)?;
        Ok(IndirectView {
            data: self.data(),
            shape: smallvec::smallvec![positions.len()],
            positions,
            layout: self.layout(),
        })
    }

    /// Select `indices` along `axis`; duplicates and any order are allowed.
    pub fn take(&self, axis: usize, indices: &[usize]) -> Result<IndirectView<'a, T>> {
        let (shape, positions) = gather_axis(self.meta(), axis, indices)?;
        Ok(IndirectView {
            data: self.data(),
            shape,
            positions,
            layout: self.layout(),
        })
    }

    /// 1-D view of the elements where `mask` is true.
    ///
    /// `mask` is broadcast to this view's shape.
    pub fn mask<M>(&self, mask: M) -> Result<IndirectView<'a, T>>
    where
        M: Expression<Elem = bool>,
    {
        let positions = gather_mask(self.meta(), mask)?;
        log::trace!("mask selected {} of {} elements", positions.len(), size_of(self.shape()));
        Ok(IndirectView {
            data: self.data(),
            shape: smallvec::smallvec![positions.len()],
            positions,
            layout: self.layout(),
        })
    }
}

impl<'a, T> TensorViewMut<'a, T> {
    pub fn take_flat_mut(self, flat: &[usize]) -> Result<IndirectViewMut<'a, T>> {
        let (data, meta) = self.into_parts();
        let positions = gather_flat(&meta, flat)?;
        Ok(IndirectViewMut {
            data,
            shape: smallvec::smallvec![positions.len()],
            positions,
            layout: meta.layout,
        })
    }

    pub fn take_mut(self, axis: usize, indices: &[usize]) -> Result<IndirectViewMut<'a, T>> {
        let (data, meta) = self.into_parts();
        let (shape, positions) = gather_axis(&meta, axis, indices)?;
        Ok(IndirectViewMut {
            data,
            shape,
            positions,
            layout: meta.layout,
        })
    }

    pub fn mask_mut<M>(self, mask: M) -> Result<IndirectViewMut<'a, T>>
    where
        M: Expression<Elem = bool>,
    {
        let (data, meta) = self.into_parts();
        let positions = gather_mask(&meta, mask)?;
        Ok(IndirectViewMut {
            data,
            shape: smallvec::smallvec![positions.len()],
            positions,
            layout: meta.layout,
        })
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
    fn test_take_flat() {
        let t = grid();
        let v = t.view().take_flat(&[11, 0, 5, 5]).unwrap();
        assert_eq!(v.shape(), &[4]);
        assert_eq!(v.iter().collect::<Vec<_>>(), vec![11, 0, 5, 5]);
        let err = t.view().take_flat(&[12]).unwrap_err();
        assert_eq!(err, TensorError::FlatIndexOutOfRange { index: 12, size: 12 });
    }

    #[test]
    fn test_take_flat_follows_view_order() {
        let t = grid();
        let tv = t.view().t();
        let v = tv.take_flat(&[1]).unwrap();
        // second element of the transposed view in row-major order
        assert_eq!(v.eval(&[0]), 4);
    }

    #[test]
    fn test_take_along_axis() {
        let t = grid();
        let rows = t.view().take(0, &[2, 2, 0]).unwrap();
        assert_eq!(rows.shape(), &[3, 4]);
        assert_eq!(rows.eval(&[1, 3]), 11);
        assert_eq!(rows.eval(&[2, 1]), 1);
        assert!(t.view().take(0, &[3]).is_err());
        assert!(t.view().take(2, &[0]).is_err());
    }

    #[test]
    fn test_take_from_strided_view() {
        let t = grid();
        let v = t.slice(&s![..;-1, 1..]).unwrap();
        let picked = v.take(1, &[2]).unwrap();
        assert_eq!(picked.iter().collect::<Vec<_>>(), vec![11, 7, 3]);
    }

    #[test]
    fn test_mask_broadcast() {
        let t = grid();
        let row_mask = Tensor::from_vec(vec![true, false, false, true], &[4]).unwrap();
        let m = t.view().mask(&row_mask).unwrap();
        assert_eq!(m.iter().collect::<Vec<_>>(), vec![0, 3, 4, 7, 8, 11]);
        let bad = Tensor::from_vec(vec![true, false], &[2]).unwrap();
        assert!(t.view().mask(&bad).is_err());
    }

    #[test]
    fn test_indirect_mut_writes() {
        let mut t = grid();
        {
            let evens = (&t).map(|x| x % 2 == 0).to_tensor();
            let mut m = t.view_mut().mask_mut(&evens).unwrap();
            m.fill(0);
        }
        assert_eq!(t.data(), &[0, 1, 0, 3, 0, 5, 0, 7, 0, 9, 0, 11]);
        {
            let mut cols = t.view_mut().take_mut(1, &[0]).unwrap();
            cols.assign(&Tensor::from_vec(vec![-1, -2, -3], &[3, 1]).unwrap()).unwrap();
        }
        assert_eq!(t.data()[0], -1);
        assert_eq!(t.data()[4], -2);
        assert_eq!(t.data()[8], -3);
        {
            let mut f = t.view_mut().take_flat_mut(&[1]).unwrap();
            f.set(&[0], 100).unwrap();
        }
        assert_eq!(t[&[0, 1]], 100);
    }

    #[test]
    fn test_new_validates_positions() {
        let buf = [1, 2, 3];
        assert!(IndirectView::new(&buf, &[2], vec![0, 3], Layout::RowMajor).is_err());
        assert!(IndirectView::new(&buf, &[3], vec![0, 1], Layout::RowMajor).is_err());
        let mut buf = [1, 2, 3];
        let mut m = IndirectViewMut::new(&mut buf, &[1], vec![2], Layout::RowMajor).unwrap();
        *m.eval_mut(&[0]) = 30;
        assert_eq!(m.view().eval(&[0]), 30);
        assert_eq!(buf, [1, 2, 30]);
    }
}
