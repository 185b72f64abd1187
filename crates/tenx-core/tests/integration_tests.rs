//! Integration tests for tenx-core
//!
//! These tests exercise expressions, views and materialization together
//! through the public API only.

use tenx_core::{
    arange, broadcast_shapes, diag_matrix, eye, identity, linspace, materialize, s, select, tril,
    triu, BinaryExpr, ElementWiseExpr, ErrorKind, EvalOptions, Expression, ExpressionExt,
    ExpressionMut, Layout, SequenceExpr, Tensor, TensorError,
};

fn matrix3() -> Tensor<i32> {
    Tensor::from_vec((1..=9).collect(), &[3, 3]).unwrap()
}

#[test]
fn test_broadcast_add_row_and_column() {
    let a = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0], &[1, 3]).unwrap();
    let b = Tensor::from_vec(vec![10.0_f64, 20.0], &[2, 1]).unwrap();

    let r = BinaryExpr::new(|x: f64, y: f64| x + y, &a, &b).unwrap();
    assert_eq!(r.shape(), &[2, 3]);
    for i in 0..2 {
        for j in 0..3 {
            assert_eq!(r.eval(&[i, j]), a[&[0, j]] + b[&[i, 0]]);
        }
    }
}

#[test]
fn test_broadcast_incompatible_shapes() {
    let err = broadcast_shapes(&[&[2, 3][..], &[3, 2][..]]).unwrap_err();
    assert!(matches!(err, TensorError::Broadcast { .. }));
    assert_eq!(err.kind(), ErrorKind::Shape);
}

#[test]
fn test_materialize_matches_lazy_reads() {
    let a = Tensor::from_vec((0..24).map(|x| x as f64).collect(), &[2, 3, 4]).unwrap();
    let e = (&a * 0.5 + 1.0).permute_axes(&[2, 0, 1]).unwrap();
    let t = materialize(&e);
    assert_eq!(t.shape(), &[4, 2, 3]);
    for (index, value) in e.indexed_iter() {
        assert_eq!(t[&index[..]], value);
    }
    assert_eq!(materialize(&t.view()), t);
}

#[test]
fn test_mutation_through_transpose_and_reverse() {
    let mut t = Tensor::<i32>::zeros(&[2, 3]);
    {
        let mut tr = (&mut t).transpose();
        tr.set(&[2, 0], 7).unwrap();
    }
    assert_eq!(t[&[0, 2]], 7);
    {
        let mut rev = (&mut t).reverse(&[0, 1]).unwrap();
        *rev.eval_mut(&[0, 0]) = 9;
    }
    assert_eq!(t[&[1, 2]], 9);

    t[&[1, 0]] = 4;
    assert_eq!(t.t().eval(&[0, 1]), 4);
}

#[test]
fn test_mutation_through_strided_view() {
    let mut t = Tensor::from_vec((0..12).collect::<Vec<i32>>(), &[3, 4]).unwrap();
    {
        let mut v = t.slice_mut(&s![..;2, ..;-1]).unwrap();
        assert_eq!(v.shape(), &[2, 4]);
        assert_eq!(v.eval(&[1, 0]), 11);
        v.set(&[0, 0], -3).unwrap();
    }
    assert_eq!(t[&[0, 3]], -3);
    t[&[2, 2]] = 100;
    let v = t.slice(&s![..;2, ..;-1]).unwrap();
    assert_eq!(v.eval(&[1, 1]), 100);
}

#[test]
fn test_sequences_and_identity() {
    let seq = SequenceExpr::new(0, 5, 2).unwrap();
    assert_eq!(seq.iter().collect::<Vec<_>>(), vec![0, 2, 4, 6, 8]);

    let i3 = identity::<i32>(3).to_tensor();
    assert_eq!(i3.data(), &[1, 0, 0, 0, 1, 0, 0, 0, 1]);

    let shifted = eye::<i32>(3, 3, 1).to_tensor();
    assert_eq!(shifted.data(), &[0, 1, 0, 0, 0, 1, 0, 0, 0]);
    assert!((0..3).all(|j| shifted[&[2, j]] == 0));
}

#[test]
fn test_triangles() {
    let lower = tril(matrix3(), 0).unwrap().to_tensor();
    assert_eq!(lower.data(), &[1, 0, 0, 4, 5, 0, 7, 8, 9]);

    let upper = triu(matrix3(), 1).unwrap().to_tensor();
    assert_eq!(upper.data(), &[0, 2, 3, 0, 0, 6, 0, 0, 0]);
}

#[test]
fn test_diagonal_round_trip() {
    let d = identity::<f64>(3).diagonal(0).unwrap();
    assert_eq!(d.iter().collect::<Vec<_>>(), vec![1.0, 1.0, 1.0]);

    let ones = Tensor::from_vec(vec![1.0_f64, 1.0, 1.0], &[3]).unwrap();
    let m = diag_matrix(&ones, 0).unwrap().to_tensor();
    assert_eq!(m, identity::<f64>(3).to_tensor());
}

#[test]
fn test_linspace_against_arange() {
    let l = linspace(0.0_f64, 4.0, 5, true).unwrap().to_tensor();
    let a = arange(0.0_f64, 5.0, 1.0).unwrap().to_tensor();
    assert_eq!(l, a);
}

#[test]
fn test_select_and_nary() {
    let x = arange(-2i32, 3, 1).unwrap();
    let relu = select((&x).map(|v| v > 0), &x, (&x).map(|_| 0)).unwrap();
    assert_eq!(relu.iter().collect::<Vec<_>>(), vec![0, 0, 0, 1, 2]);

    let a = Tensor::from_vec(vec![1, 2, 3], &[3]).unwrap();
    let b = Tensor::from_vec(vec![10], &[1]).unwrap();
    let c = Tensor::from_vec(vec![100, 200, 300], &[3]).unwrap();
    let sum = ElementWiseExpr::new(
        vec![&a as &dyn Expression<Elem = i32>, &b, &c],
        |vals: &[i32]| vals.iter().sum::<i32>(),
    )
    .unwrap();
    assert_eq!(sum.iter().collect::<Vec<_>>(), vec![111, 212, 313]);
}

#[test]
fn test_assign_broadcasts_into_view() {
    let mut t = Tensor::<i32>::zeros(&[3, 4]);
    let row = Tensor::from_vec(vec![1, 2], &[1, 2]).unwrap();
    t.slice_mut(&s![.., 1..3]).unwrap().assign(&row).unwrap();
    assert_eq!(t.data(), &[0, 1, 2, 0, 0, 1, 2, 0, 0, 1, 2, 0]);
}

#[test]
fn test_layout_control() {
    let t = Tensor::from_vec((0..6).collect::<Vec<i32>>(), &[2, 3]).unwrap();
    let c = t.to_tensor_with(&EvalOptions::column_major()).unwrap();
    assert_eq!(c.layout(), Layout::ColumnMajor);
    assert_eq!(c.data(), &[0, 3, 1, 4, 2, 5]);

    // mixed layouts combine in row-major order
    let sum = (&t + &c).to_tensor();
    assert_eq!(sum.layout(), Layout::RowMajor);
    assert_eq!(sum.data(), &[0, 2, 4, 6, 8, 10]);
}

#[test]
fn test_checked_access_errors() {
    let t = matrix3();
    assert_eq!(t.get(&[2, 2]).unwrap(), 9);
    assert_eq!(t.get(&[3, 0]).unwrap_err().kind(), ErrorKind::OutOfRange);
    assert_eq!(t.get(&[0]).unwrap_err().kind(), ErrorKind::Shape);
}

#[test]
fn test_indirect_views_share_the_buffer() {
    let mut t = matrix3();
    let diag = t.take_flat(&[0, 4, 8]).unwrap();
    assert_eq!(diag.iter().collect::<Vec<_>>(), vec![1, 5, 9]);

    let odd = (&t).map(|x| x % 2 == 1).to_tensor();
    t.mask_mut(&odd).unwrap().fill(0);
    assert_eq!(t.data(), &[0, 2, 0, 4, 0, 6, 0, 8, 0]);
}
