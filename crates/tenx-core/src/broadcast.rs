//! Broadcasting: shape compatibility and lazy index remapping
//!
//! Two extents along an axis are compatible when they are equal or one of
//! them is 1; the broadcast extent is the non-1 value. An operand with extent
//! 1 along an axis is read at coordinate 0 on that axis, whatever the output
//! coordinate is. No data is ever replicated.
//!
//! Operands of elementwise expressions must share a rank. Explicit
//! broadcasting through [`BroadcastExpr`] additionally accepts a
//! lower-rank operand, aligned to the trailing axes of the target.
//!
//! # Examples
//!
//! ```
//! use tenx_core::broadcast_shapes;
//!
//! let shape = broadcast_shapes(&[&[1, 3], &[2, 1]]).unwrap();
//! assert_eq!(shape.as_slice(), &[2, 3]);
//!
//! assert!(broadcast_shapes(&[&[2, 3], &[3, 2]]).is_err());
//! ```

use crate::error::{Result, TensorError};
use crate::expr::Expression;
use crate::types::{Index, Layout, Shape};

/// Broadcast shape of two operands of equal rank.
pub fn broadcast_shape2(lhs: &[usize], rhs: &[usize]) -> Result<Shape> {
    if lhs.len() != rhs.len() {
        log::debug!("broadcast rank mismatch: {:?} vs {:?}", lhs, rhs);
        return Err(TensorError::RankMismatch {
            expected: lhs.len(),
            actual: rhs.len(),
        });
    }
    lhs.iter()
        .zip(rhs)
        .map(|(&a, &b)| match (a, b) {
            _ if a == b => Ok(a),
            (1, _) => Ok(b),
            (_, 1) => Ok(a),
            _ => {
                log::debug!("cannot broadcast {:?} with {:?}", lhs, rhs);
                Err(TensorError::Broadcast {
                    lhs: Shape::from_slice(lhs),
                    rhs: Shape::from_slice(rhs),
                })
            }
        })
        .collect()
}

/// Broadcast shape of any number of operands of equal rank.
///
/// The result does not depend on the order of `shapes`.
///
/// # Errors
///
/// `InvalidArgument` for an empty list, `RankMismatch` when ranks differ and
/// `Broadcast` when two extents along an axis are incompatible.
pub fn broadcast_shapes(shapes: &[&[usize]]) -> Result<Shape> {
    let (first, rest) = shapes
        .split_first()
        .ok_or_else(|| TensorError::invalid_argument("no shapes to broadcast"))?;
    rest.iter().try_fold(Shape::from_slice(first), |acc, shape| {
        broadcast_shape2(&acc, shape)
    })
}

/// Whether an operand of shape `from` can be read as shape `to`.
///
/// `from` may have fewer axes than `to`; it is aligned to the trailing axes.
pub fn can_broadcast_to(from: &[usize], to: &[usize]) -> bool {
    if from.len() > to.len() {
        return false;
    }
    let lead = to.len() - from.len();
    from.iter()
        .zip(&to[lead..])
        .all(|(&f, &t)| f == t || f == 1)
}

/// Map an output coordinate onto an operand of shape `operand_shape`.
///
/// Axes where the operand has extent 1 read coordinate 0. When the operand has
/// lower rank, the leading components of `index` are dropped.
#[inline]
pub fn broadcast_index(index: &[usize], operand_shape: &[usize], out: &mut Index) {
    let lead = index.len() - operand_shape.len();
    out.clear();
    out.extend(
        index[lead..]
            .iter()
            .zip(operand_shape)
            .map(|(&i, &n)| if n == 1 { 0 } else { i }),
    );
}

/// Evaluate `expr` at an output coordinate, remapping unless `direct`.
///
/// `direct` is true when the operand's shape already equals the output shape.
#[inline]
pub(crate) fn eval_broadcast<E: Expression + ?Sized>(
    expr: &E,
    index: &[usize],
    direct: bool,
) -> E::Elem {
    if direct {
        expr.eval(index)
    } else {
        let mut mapped = Index::new();
        broadcast_index(index, expr.shape(), &mut mapped);
        expr.eval(&mapped)
    }
}

/// Read-only view of an expression broadcast to a larger shape.
///
/// # Examples
///
/// ```
/// use tenx_core::{Expression, ExpressionExt, Tensor};
///
/// let row = Tensor::from_vec(vec![1, 2, 3], &[3]).unwrap();
/// let b = (&row).broadcast_to(&[2, 3]).unwrap();
/// assert_eq!(b.shape(), &[2, 3]);
/// assert_eq!(b.iter().collect::<Vec<_>>(), vec![1, 2, 3, 1, 2, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct BroadcastExpr<A> {
    operand: A,
    shape: Shape,
    direct: bool,
}

impl<A: Expression> BroadcastExpr<A> {
    pub fn new(operand: A, shape: &[usize]) -> Result<Self> {
        if !can_broadcast_to(operand.shape(), shape) {
            log::debug!(
                "cannot broadcast operand {:?} to {:?}",
                operand.shape(),
                shape
            );
            return Err(TensorError::Broadcast {
                lhs: Shape::from_slice(operand.shape()),
                rhs: Shape::from_slice(shape),
            });
        }
        let direct = operand.shape() == shape;
        Ok(BroadcastExpr {
            operand,
            shape: Shape::from_slice(shape),
            direct,
        })
    }

    pub fn operand(&self) -> &A {
        &self.operand
    }

    pub fn into_inner(self) -> A {
        self.operand
    }
}

impl<A: Expression> Expression for BroadcastExpr<A> {
    type Elem = A::Elem;

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn layout(&self) -> Layout {
        self.operand.layout()
    }

    #[inline]
    fn eval(&self, index: &[usize]) -> Self::Elem {
        eval_broadcast(&self.operand, index, self.direct)
    }
}
