//! Property-based tests for shape math, broadcasting and lazy evaluation
//!
//! This module uses proptest to check algebraic properties of the expression
//! machinery across randomly generated shapes and data.

use crate::{
    broadcast_shape2, broadcast_shapes, materialize, ravel_index, s, unravel_index, Expression,
    ExpressionExt, Layout, Tensor,
};
use proptest::prelude::*;

// Valid tensor shapes (1-4D, small extents, zero allowed)
fn shape_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0usize..5, 1..=4)
}

// Shapes whose axes are either 1 or the matching extent of `base`
fn compatible_shape(base: Vec<usize>) -> impl Strategy<Value = (Vec<usize>, Vec<usize>)> {
    let mask = prop::collection::vec(any::<bool>(), base.len());
    mask.prop_map(move |m| {
        let other: Vec<usize> = base
            .iter()
            .zip(&m)
            .map(|(&n, &one)| if one { 1 } else { n })
            .collect();
        (base.clone(), other)
    })
}

fn layout_strategy() -> impl Strategy<Value = Layout> {
    prop_oneof![Just(Layout::RowMajor), Just(Layout::ColumnMajor)]
}

fn iota(shape: &[usize], layout: Layout) -> Tensor<i64> {
    let n: usize = shape.iter().product();
    Tensor::from_vec_with_layout((0..n as i64).collect(), shape, layout).unwrap()
}

#[test]
fn test_proptest_smoke() {
    let tensor = Tensor::<f64>::zeros(&[2, 3]);
    assert_eq!(tensor.shape(), &[2, 3]);
}

proptest! {
    #[test]
    fn prop_broadcast_commutative((a, b) in shape_strategy().prop_flat_map(compatible_shape)) {
        prop_assert_eq!(broadcast_shape2(&a, &b), broadcast_shape2(&b, &a));
        let shape = broadcast_shape2(&a, &b).unwrap();
        prop_assert_eq!(shape.as_slice(), a.as_slice());
    }

    #[test]
    fn prop_broadcast_associative(
        (a, b) in shape_strategy().prop_flat_map(compatible_shape),
        mask in prop::collection::vec(any::<bool>(), 4),
    ) {
        let c: Vec<usize> = b.iter().zip(&mask).map(|(&n, &one)| if one { 1 } else { n }).collect();
        let left = broadcast_shape2(&broadcast_shape2(&a, &b).unwrap(), &c).unwrap();
        let right = broadcast_shape2(&a, &broadcast_shape2(&b, &c).unwrap()).unwrap();
        prop_assert_eq!(&left, &right);
        prop_assert_eq!(broadcast_shapes(&[a.as_slice(), b.as_slice(), c.as_slice()]).unwrap(), left);
    }

    #[test]
    fn prop_ravel_roundtrip(shape in shape_strategy(), layout in layout_strategy()) {
        let size: usize = shape.iter().product();
        for flat in 0..size {
            let index = unravel_index(flat, &shape, layout).unwrap();
            prop_assert_eq!(ravel_index(&index, &shape, layout).unwrap(), flat);
        }
        prop_assert!(unravel_index(size, &shape, layout).is_err());
    }

    #[test]
    fn prop_iteration_matches_buffer(shape in shape_strategy(), layout in layout_strategy()) {
        let t = iota(&shape, layout);
        let walked: Vec<i64> = t.iter().collect();
        prop_assert_eq!(walked.as_slice(), t.data());
        prop_assert_eq!(t.iter().rev().count(), t.len());
    }

    #[test]
    fn prop_materialize_idempotent(shape in shape_strategy(), layout in layout_strategy()) {
        let t = iota(&shape, layout);
        let once = materialize(&(&t).map(|x| 3 * x - 1));
        let twice = materialize(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_dense_copies_reproduce(shape in shape_strategy(), layout in layout_strategy()) {
        let t = iota(&shape, layout);
        prop_assert_eq!(materialize(&t.view()), t.clone());
        prop_assert_eq!(t.view().to_tensor(), t.clone());
        prop_assert_eq!(Tensor::from_expr(&t), t.clone());
        prop_assert_eq!(t.copy(), t);
    }

    #[test]
    fn prop_strided_view_materializes_elementwise(
        shape in prop::collection::vec(1usize..5, 2..=3),
        layout in layout_strategy(),
    ) {
        let t = iota(&shape, layout);
        let v = t.slice(&s![..;-1, 1..]).unwrap();
        let m = materialize(&v);
        prop_assert_eq!(m.layout(), layout);
        prop_assert_eq!(m.shape(), v.shape());
        for (index, value) in v.indexed_iter() {
            prop_assert_eq!(m[&index[..]], value);
        }
    }

    #[test]
    fn prop_transpose_involution(shape in shape_strategy()) {
        let t = iota(&shape, Layout::RowMajor);
        let back = (&t).transpose().transpose().to_tensor();
        prop_assert_eq!(back, t);
    }

    #[test]
    fn prop_broadcast_reads_operand((full, small) in shape_strategy().prop_flat_map(compatible_shape)) {
        let s = iota(&small, Layout::RowMajor);
        let b = (&s).broadcast_to(&full).unwrap();
        for (index, value) in b.indexed_iter() {
            let source: Vec<usize> = index
                .iter()
                .zip(&small)
                .map(|(&i, &n)| if n == 1 { 0 } else { i })
                .collect();
            prop_assert_eq!(value, s[&source[..]]);
        }
    }

    #[test]
    fn prop_reverse_twice_is_identity(shape in shape_strategy(), axis_seed in 0usize..4) {
        let t = iota(&shape, Layout::RowMajor);
        let axis = axis_seed % shape.len();
        let back = (&t).reverse(&[axis]).unwrap().reverse(&[axis]).unwrap().to_tensor();
        prop_assert_eq!(back, t);
    }

    #[test]
    fn prop_sum_of_parts(shape in shape_strategy()) {
        let t = iota(&shape, Layout::RowMajor);
        let doubled = (&t + &t).to_tensor();
        let scaled = (&t * 2i64).to_tensor();
        prop_assert_eq!(doubled, scaled);
    }
}
