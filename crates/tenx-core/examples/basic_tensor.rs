//! Basic tensor creation and manipulation examples.
//!
//! This example demonstrates the core functionality of tenx-core:
//! - Creating tensors with different initialization methods
//! - Accessing tensor properties (rank, shape, layout, strides)
//! - Checked and unchecked element access
//! - Interop with n-dimensional arrays
//!
//! Run with:
//! ```bash
//! cargo run --example basic_tensor
//! ```

use tenx_core::{Expression, ExpressionMut, Layout, Tensor};

fn main() -> anyhow::Result<()> {
    println!("=== tenx Core: Basic Tensor Examples ===\n");

    // Example 1: Creating tensors with different methods
    example_creation()?;

    // Example 2: Tensor properties and layouts
    example_properties()?;

    // Example 3: Indexing and modification
    example_indexing()?;

    // Example 4: ndarray interop
    example_array_interop()?;

    println!("\n=== All examples completed successfully! ===");
    Ok(())
}

fn example_creation() -> anyhow::Result<()> {
    println!("--- Example 1: Tensor Creation ---");

    let zeros = Tensor::<f64>::zeros(&[2, 3]);
    println!("Zeros tensor [2, 3]: {:?}", zeros.data());

    let ones = Tensor::<f64>::ones(&[3, 4]);
    println!("Ones tensor [3, 4]: element at [1, 2] = {}", ones[&[1, 2]]);

    let sevens = Tensor::full(&[2, 2], 7i32);
    println!("Full tensor: {:?}", sevens.data());

    let from_vec = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3])?;
    println!("From vec [2, 3]: {:?}", from_vec.data());

    let table = Tensor::from_shape_fn(&[3, 3], |idx| (idx[0] + 1) * (idx[1] + 1));
    println!("Multiplication table: {:?}", table.data());

    let from_iter = Tensor::from_elements((1..=5).map(|x| x * x));
    println!("From iterator: {:?}", from_iter.data());
    println!();
    Ok(())
}

fn example_properties() -> anyhow::Result<()> {
    println!("--- Example 2: Tensor Properties ---");

    let row = Tensor::from_vec((0..24).collect::<Vec<i32>>(), &[2, 3, 4])?;
    println!("Row-major [2, 3, 4]:");
    println!("  Rank: {}", row.rank());
    println!("  Elements: {}", row.len());
    println!("  Strides: {:?}", row.strides());

    let col = row.to_layout(Layout::ColumnMajor);
    println!("Same tensor in column-major order:");
    println!("  Strides: {:?}", col.strides());
    println!("  Buffer head: {:?}", &col.data()[..6]);
    println!("  Logically equal at [1, 2, 3]: {}", row[&[1, 2, 3]] == col[&[1, 2, 3]]);
    println!();
    Ok(())
}

fn example_indexing() -> anyhow::Result<()> {
    println!("--- Example 3: Indexing and Modification ---");

    let mut t = Tensor::<f64>::zeros(&[2, 3]);
    t[&[0, 1]] = 42.0;
    t.set(&[1, 2], 3.5)?;
    println!("After writes: {:?}", t.data());

    println!("Checked read [1, 2]: {}", t.get(&[1, 2])?);
    match t.get(&[2, 0]) {
        Ok(v) => println!("Unexpected value {v}"),
        Err(e) => println!("Checked read [2, 0] failed: {e}"),
    }

    t.map_inplace(|x| *x *= 2.0);
    println!("Doubled in place: {:?}", t.data());

    let reshaped = t.reshape(&[3, 2])?;
    println!("Reshaped to {:?}: {:?}", reshaped.shape(), reshaped.data());
    println!();
    Ok(())
}

fn example_array_interop() -> anyhow::Result<()> {
    println!("--- Example 4: ndarray Interop ---");

    let t = Tensor::from_vec(vec![1.0_f64, 2.0, 3.0, 4.0], &[2, 2])?;
    let arr = t.to_array()?;
    println!("As ndarray: shape {:?}", arr.shape());

    let back = Tensor::from_array(&arr);
    println!("Round trip equal: {}", back == t);
    Ok(())
}
