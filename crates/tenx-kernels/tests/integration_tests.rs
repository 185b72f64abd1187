//! Integration tests for tenx-kernels with tenx-core
//!
//! These tests verify that kernels work on every kind of core expression:
//! dense tensors, strided and indirect views, generators and lazy chains.

use tenx_core::{arange, eye, s, Expression, ExpressionExt, Tensor};
use tenx_kernels::{
    allclose, dot, matmul, max, mean, mean_axis, min_axis, outer, outer_product, prod, sum,
    sum_axis, KernelError,
};

#[test]
fn test_reductions_over_views() {
    let t = Tensor::from_vec((0..12).map(|x| x as f64).collect(), &[3, 4]).unwrap();

    let view = t.slice(&s![1.., ..;2]).unwrap();
    assert_eq!(view.shape(), &[2, 2]);
    assert_eq!(sum(&view), 4.0 + 6.0 + 8.0 + 10.0);

    let picked = t.take(0, &[2, 0]).unwrap();
    assert_eq!(max(&picked).unwrap(), 11.0);

    let evens = (&t).map(|x| x as i64 % 2 == 0).to_tensor();
    let masked = t.mask(&evens).unwrap();
    assert_eq!(sum(&masked), 30.0);
}

#[test]
fn test_reductions_over_generators() {
    let r = arange(1i64, 6, 1).unwrap();
    assert_eq!(sum(&r), 15);
    assert_eq!(prod(&r), 120);

    let i = eye::<f64>(4, 4, 0);
    assert_eq!(sum(&i), 4.0);
    assert_eq!(mean(&i).unwrap(), 0.25);
}

#[test]
fn test_axis_reduction_feeds_core_operators() {
    let t = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();

    // subtract the column means, broadcasting the kept axis
    let centered = (&t - mean_axis(&t, 0, true).unwrap()).to_tensor();
    assert_eq!(centered.data(), &[-1.5, -1.5, -1.5, 1.5, 1.5, 1.5]);

    let col_min = min_axis(&t, 0, false).unwrap();
    assert_eq!(col_min.iter().collect::<Vec<_>>(), vec![1.0, 2.0, 3.0]);
}

#[test]
fn test_matmul_with_views_and_generators() {
    let a = Tensor::from_vec((1..=6).map(|x| x as f64).collect(), &[2, 3]).unwrap();

    let same = matmul(&a, eye::<f64>(3, 3, 0)).unwrap().to_tensor();
    assert_eq!(same, a);

    // shifting eye moves columns right by one
    let shifted = matmul(&a, eye::<f64>(3, 3, 1)).unwrap().to_tensor();
    assert_eq!(shifted.data(), &[0.0, 1.0, 2.0, 0.0, 4.0, 5.0]);

    let gram = matmul(a.t(), &a).unwrap();
    assert_eq!(gram.shape(), &[3, 3]);
    assert_eq!(gram.eval(&[0, 0]), 1.0 + 16.0);
}

#[test]
fn test_batched_matmul_against_loops() {
    let lhs = Tensor::from_shape_fn(&[4, 2, 3], |i| (i[0] + i[1] * 3 + i[2]) as f64);
    let rhs = Tensor::from_shape_fn(&[3, 5], |i| (i[0] * 5 + i[1]) as f64 * 0.5);
    let c = matmul(&lhs, &rhs).unwrap().to_tensor();
    assert_eq!(c.shape(), &[4, 2, 5]);

    for b in 0..4 {
        for i in 0..2 {
            for j in 0..5 {
                let expect: f64 = (0..3).map(|k| lhs[&[b, i, k]] * rhs[&[k, j]]).sum();
                assert_eq!(c[&[b, i, j]], expect);
            }
        }
    }
}

#[test]
fn test_outer_products_agree() {
    let u = arange(1.0_f64, 4.0, 1.0).unwrap();
    let v = Tensor::from_vec(vec![2.0_f64, -1.0], &[2]).unwrap();

    let lazy = outer(&u, &v).to_tensor();
    let eager = outer_product(&[&u as &dyn Expression<Elem = f64>, &v]).unwrap();
    assert_eq!(lazy, eager);

    // a rank-1 matrix: dot with v recovers a scaled u
    let col = matmul(&lazy, v.view().reshaped(&[2, 1]).unwrap()).unwrap();
    assert_eq!(col.iter().collect::<Vec<_>>(), vec![5.0, 10.0, 15.0]);
}

#[test]
fn test_kernel_errors() {
    let a = Tensor::<f64>::zeros(&[3]);
    let b = Tensor::<f64>::zeros(&[4]);
    assert!(matches!(dot(&a, &b), Err(KernelError::DimensionMismatch { .. })));

    let m = Tensor::<f64>::zeros(&[2, 3]);
    let err = sum_axis(&m, 2, false).unwrap_err();
    assert!(err.to_string().contains("Invalid axis 2"));

    let err = allclose(&m, &a, 0.0, 0.0).unwrap_err();
    assert!(matches!(err, KernelError::Tensor(_)));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_anyhow_propagation() -> anyhow::Result<()> {
    let x = Tensor::from_vec(vec![3.0_f64, 4.0], &[2])?;
    let norm = dot(&x, &x)?.sqrt();
    assert_eq!(norm, 5.0);
    Ok(())
}
