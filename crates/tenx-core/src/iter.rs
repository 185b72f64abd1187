//! Flat iteration over any expression
//!
//! Every expression is traversed through the same machinery: a position
//! counter in `[0, size)` is unravelled into a coordinate under a chosen
//! [`Layout`] and the coordinate is evaluated through
//! [`Expression::eval`]. Expressions never carry their own iterator types.
//!
//! Skipping (`nth`, `nth_back`, [`FlatIter::seek`]) is pure position
//! arithmetic; only the element actually produced is evaluated.

use std::iter::FusedIterator;

use crate::expr::Expression;
use crate::shape::unravel_index_into;
use crate::types::{Index, Layout};

/// Element iterator over an expression in a fixed [`Layout`].
///
/// # Examples
///
/// ```
/// use tenx_core::{Expression, Tensor};
///
/// let t = Tensor::from_vec(vec![1, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
/// let mut it = t.iter();
/// assert_eq!(it.len(), 6);
/// assert_eq!(it.next(), Some(1));
/// assert_eq!(it.next_back(), Some(6));
/// assert_eq!(it.nth(2), Some(4));
/// assert_eq!(it.position(), 4);
/// ```
pub struct FlatIter<'a, E: ?Sized> {
    expr: &'a E,
    layout: Layout,
    front: usize,
    back: usize,
    index: Index,
}

impl<'a, E: Expression + ?Sized> FlatIter<'a, E> {
    /// Iterate `expr` in `layout` order.
    pub fn new(expr: &'a E, layout: Layout) -> Self {
        FlatIter {
            expr,
            layout,
            front: 0,
            back: expr.size(),
            index: Index::with_capacity(expr.rank()),
        }
    }

    /// Flat position of the next element yielded from the front.
    pub fn position(&self) -> usize {
        self.front
    }

    /// Order in which positions map to coordinates.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Jump to absolute flat position `pos`, clamped to the remaining range.
    pub fn seek(&mut self, pos: usize) {
        self.front = pos.min(self.back);
    }

    /// Coordinate of the element most recently produced.
    pub(crate) fn current_index(&self) -> &Index {
        &self.index
    }

    #[inline]
    fn eval_at(&mut self, pos: usize) -> E::Elem {
        unravel_index_into(pos, self.expr.shape(), self.layout, &mut self.index);
        self.expr.eval(&self.index)
    }
}

impl<E: ?Sized> Clone for FlatIter<'_, E> {
    fn clone(&self) -> Self {
        FlatIter {
            expr: self.expr,
            layout: self.layout,
            front: self.front,
            back: self.back,
            index: self.index.clone(),
        }
    }
}

impl<E: Expression + ?Sized> Iterator for FlatIter<'_, E> {
    type Item = E::Elem;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let pos = self.front;
        self.front += 1;
        Some(self.eval_at(pos))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.back - self.front;
        (remaining, Some(remaining))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.front = self.front.saturating_add(n).min(self.back);
        self.next()
    }

    fn count(self) -> usize {
        self.back - self.front
    }
}

impl<E: Expression + ?Sized> DoubleEndedIterator for FlatIter<'_, E> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        let pos = self.back;
        Some(self.eval_at(pos))
    }

    fn nth_back(&mut self, n: usize) -> Option<Self::Item> {
        self.back = self.back.saturating_sub(n).max(self.front);
        self.next_back()
    }
}

impl<E: Expression + ?Sized> ExactSizeIterator for FlatIter<'_, E> {}

impl<E: Expression + ?Sized> FusedIterator for FlatIter<'_, E> {}

/// Like [`FlatIter`] but yields each coordinate alongside its element.
///
/// ```
/// use tenx_core::{Expression, Tensor};
///
/// let t = Tensor::from_vec(vec![10, 20, 30, 40], &[2, 2]).unwrap();
/// let pairs: Vec<(Vec<usize>, i32)> = t
///     .indexed_iter()
///     .map(|(idx, v)| (idx.to_vec(), v))
///     .collect();
/// assert_eq!(pairs[2], (vec![1, 0], 30));
/// ```
pub struct IndexedIter<'a, E: ?Sized> {
    inner: FlatIter<'a, E>,
}

impl<'a, E: Expression + ?Sized> IndexedIter<'a, E> {
    pub fn new(expr: &'a E, layout: Layout) -> Self {
        IndexedIter {
            inner: FlatIter::new(expr, layout),
        }
    }
}

impl<E: Expression + ?Sized> Iterator for IndexedIter<'_, E> {
    type Item = (Index, E::Elem);

    fn next(&mut self) -> Option<Self::Item> {
        let value = self.inner.next()?;
        Some((self.inner.current_index().clone(), value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        let value = self.inner.nth(n)?;
        Some((self.inner.current_index().clone(), value))
    }
}

impl<E: Expression + ?Sized> DoubleEndedIterator for IndexedIter<'_, E> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let value = self.inner.next_back()?;
        Some((self.inner.current_index().clone(), value))
    }
}

impl<E: Expression + ?Sized> ExactSizeIterator for IndexedIter<'_, E> {}

impl<E: Expression + ?Sized> FusedIterator for IndexedIter<'_, E> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::Tensor;

    fn sample() -> Tensor<i32> {
        Tensor::from_vec((0..12).collect(), &[3, 4]).unwrap()
    }

    #[test]
    fn test_row_major_order() {
        let t = sample();
        let values: Vec<i32> = FlatIter::new(&t, Layout::RowMajor).collect();
        assert_eq!(values, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn test_column_major_order() {
        let t = sample();
        let values: Vec<i32> = FlatIter::new(&t, Layout::ColumnMajor).collect();
        assert_eq!(values, vec![0, 4, 8, 1, 5, 9, 2, 6, 10, 3, 7, 11]);
    }

    #[test]
    fn test_double_ended_and_len() {
        let t = sample();
        let mut it = FlatIter::new(&t, Layout::RowMajor);
        assert_eq!(it.len(), 12);
        assert_eq!(it.next_back(), Some(11));
        assert_eq!(it.next(), Some(0));
        assert_eq!(it.len(), 10);
        let rest: Vec<i32> = it.rev().collect();
        assert_eq!(rest, (1..11).rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_nth_and_seek() {
        let t = sample();
        let mut it = FlatIter::new(&t, Layout::RowMajor);
        assert_eq!(it.nth(5), Some(5));
        assert_eq!(it.position(), 6);
        assert_eq!(it.nth_back(1), Some(10));
        it.seek(9);
        assert_eq!(it.next(), Some(9));
        it.seek(100);
        assert_eq!(it.next(), None);
        assert_eq!(it.next(), None);
    }

    #[test]
    fn test_nth_past_end_is_fused() {
        let t = sample();
        let mut it = FlatIter::new(&t, Layout::RowMajor);
        assert_eq!(it.nth(12), None);
        assert_eq!(it.next_back(), None);
    }

    #[test]
    fn test_empty_expression() {
        let t = Tensor::<f64>::zeros(&[3, 0]);
        let mut it = FlatIter::new(&t, Layout::RowMajor);
        assert_eq!(it.len(), 0);
        assert_eq!(it.next(), None);
    }

    #[test]
    fn test_indexed_iter_column_major() {
        let t = sample();
        let pairs: Vec<(Index, i32)> = IndexedIter::new(&t, Layout::ColumnMajor).take(4).collect();
        assert_eq!(pairs[1].0.as_slice(), &[1, 0]);
        assert_eq!(pairs[1].1, 4);
        assert_eq!(pairs[3].0.as_slice(), &[0, 1]);
        assert_eq!(pairs[3].1, 1);
    }
}
