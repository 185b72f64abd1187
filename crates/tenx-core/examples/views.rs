//! Zero-copy views: slicing, structural views and gathers.
//!
//! Run with:
//! ```bash
//! cargo run --example views
//! ```

use tenx_core::{s, Expression, ExpressionExt, ExpressionMut, Tensor};

fn main() -> anyhow::Result<()> {
    println!("=== tenx Core: Views ===\n");

    let mut t = Tensor::from_vec((0..12).collect::<Vec<i32>>(), &[3, 4])?;
    println!("Base tensor [3, 4]: {:?}\n", t.data());

    // Basic slicing with NumPy semantics
    let every_other = t.slice(&s![.., ..;2])?;
    println!("t[:, ::2] -> shape {:?}", every_other.shape());
    println!("  values: {:?}", every_other.iter().collect::<Vec<_>>());
    println!("  strides: {:?}, contiguous: {}", every_other.strides(), every_other.is_contiguous());

    let flipped = t.slice(&s![..;-1, -1])?;
    println!("t[::-1, -1] -> {:?}", flipped.iter().collect::<Vec<_>>());

    // Structural views on a strided view
    let v = t.view().permute(&[1, 0])?.expand_dims(0)?;
    println!("permute + expand_dims -> shape {:?}", v.shape());

    // Lazy structural expressions work on any expression
    let rolled = (&t).roll(1, 1)?;
    println!("roll(axis 1, +1) row 0: {:?}", (0..4).map(|j| rolled.eval(&[0, j])).collect::<Vec<_>>());

    // Gathers own only their index array
    let picked = t.take(0, &[2, 0])?;
    println!("take rows [2, 0]: {:?}", picked.iter().collect::<Vec<_>>());
    let big = (&t).map(|x| x >= 9).to_tensor();
    println!("mask x >= 9: {:?}", t.mask(&big)?.iter().collect::<Vec<_>>());

    // Writes through mutable views are visible in the base tensor
    {
        let mut corner = t.slice_mut(&s![1.., 2..])?;
        corner.fill(-1);
    }
    {
        let mut col = (&mut t).transpose();
        col.set(&[0, 0], 100)?;
    }
    println!("\nAfter writes through views: {:?}", t.data());
    Ok(())
}
