//! Building and evaluating lazy expressions.
//!
//! Run with:
//! ```bash
//! cargo run --example lazy_expressions
//! ```

use tenx_core::{
    arange, eye, linspace, logspace, materialize_with, select, EvalOptions, Expression,
    ExpressionExt, Tensor,
};

fn main() -> anyhow::Result<()> {
    println!("=== tenx Core: Lazy Expressions ===\n");

    // Broadcasting: a row against a column
    let row = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0], &[1, 3])?;
    let col = Tensor::from_vec(vec![10.0_f64, 20.0], &[2, 1])?;
    let grid = (&row + &col) * 0.5;
    println!("(row + col) * 0.5 has shape {:?}", grid.shape());
    println!("  element [1, 2] computed on demand: {}", grid.eval(&[1, 2]));
    println!("  materialized: {:?}", grid.to_tensor().data());

    // Fallible combination instead of a panicking operator
    let wrong = Tensor::<f64>::zeros(&[3, 2]);
    match (&grid).zip_with(&wrong, |a, b| a + b) {
        Ok(_) => println!("unexpectedly broadcast"),
        Err(e) => println!("  zip_with refused: {e}"),
    }

    // Generators
    println!("\narange(0, 10, 3): {:?}", arange(0, 10, 3)?.iter().collect::<Vec<_>>());
    println!("linspace(0, 1, 5): {:?}", linspace(0.0_f64, 1.0, 5, true)?.iter().collect::<Vec<_>>());
    println!("logspace(0, 3, 4): {:?}", logspace(0.0_f64, 3.0, 4, true, 10.0)?.iter().collect::<Vec<_>>());
    let shifted = eye::<i32>(3, 4, 1);
    println!("eye(3, 4, k=1): {:?}", shifted.to_tensor().data());

    // Triangles and diagonals compose with everything else
    let m = Tensor::from_vec((1..=9).collect::<Vec<i32>>(), &[3, 3])?;
    println!("\ntril(m): {:?}", (&m).tril(0)?.to_tensor().data());
    println!("diag(m, 1): {:?}", (&m).diagonal(1)?.iter().collect::<Vec<_>>());

    // Element-wise choice
    let x = linspace(-1.0_f64, 1.0, 5, true)?;
    let relu = select((&x).map(|v| v > 0.0), &x, (&x).map(|_| 0.0))?;
    println!("relu(linspace(-1, 1, 5)): {:?}", relu.iter().collect::<Vec<_>>());

    // Materialize with an explicit layout and element budget
    let opts = EvalOptions::column_major().with_max_elements(1_000);
    let stored = materialize_with(&grid, &opts)?;
    println!("\ncolumn-major buffer: {:?}", stored.data());
    let tight = EvalOptions::new().with_max_elements(4);
    if let Err(e) = materialize_with(&grid, &tight) {
        println!("budget of 4 elements: {e}");
    }
    Ok(())
}
