//! Batched matrix products over lazy operands.
//!
//! Run with:
//! ```bash
//! cargo run --example batched_matmul
//! ```

use tenx_core::{eye, Expression, ExpressionExt, Tensor};
use tenx_kernels::{allclose, dot, matmul, outer};

fn main() -> anyhow::Result<()> {
    println!("=== tenx Kernels: Matrix Products ===\n");

    // A stack of four 2x3 matrices against one shared 3x2 matrix
    let stack = Tensor::from_shape_fn(&[4, 2, 3], |i| (i[0] * 6 + i[1] * 3 + i[2]) as f64);
    let weights = Tensor::from_vec(vec![1.0_f64, 0.0, 0.0, 1.0, 1.0, 1.0], &[3, 2])?;

    let product = matmul(&stack, &weights)?;
    println!("stack {:?} x weights {:?} -> {:?}", stack.shape(), weights.shape(), product.shape());
    println!("  batch 2, row 1 computed on demand: [{}, {}]",
        product.eval(&[2, 1, 0]),
        product.eval(&[2, 1, 1])
    );

    // Multiplying by the identity leaves every batch unchanged
    let same = matmul(&stack, eye::<f64>(3, 3, 0))?;
    println!("  x I equals the stack: {}", allclose(&same, &stack, 0.0, 0.0)?);

    // Transposes are views, so A^T A never copies A
    let a = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0], &[3, 2])?;
    let gram = matmul(a.t(), &a)?.to_tensor();
    println!("\nA^T A = {:?}", gram.data());

    // An outer product has rank one: (u v^T) w = u (v . w)
    let u = Tensor::from_vec(vec![1.0_f64, 2.0], &[2])?;
    let v = Tensor::from_vec(vec![3.0_f64, 4.0, 5.0], &[3])?;
    let w = Tensor::from_vec(vec![1.0_f64, 1.0, 1.0], &[3])?;
    let rank_one = outer(&u, &v);
    let applied = matmul(&rank_one, w.view().reshaped(&[3, 1])?)?;
    println!("\n(u v^T) w = {:?}", applied.to_tensor().data());
    println!("u * (v . w) = {:?}", (&u * dot(&v, &w)?).to_tensor().data());

    // Mismatched inner dimensions are reported, not panicked on
    match matmul(&a, &a) {
        Ok(_) => println!("unexpected success"),
        Err(e) => println!("\nmatmul(3x2, 3x2) refused: {}", e),
    }

    Ok(())
}
