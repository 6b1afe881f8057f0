//! Block stream decoding command.

use std::path::Path;

use anyhow::{Context, Result};
use bc1_fidelity::bc1::{block_dimensions, reconstruct_surface};

use crate::image_io;

pub fn run(
    input: &Path,
    width: usize,
    height: usize,
    offset: usize,
    output: &Path,
    verbose: bool,
) -> Result<()> {
    let data = std::fs::read(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let stream = data.get(offset..).with_context(|| {
        format!("Offset {} is past the end of {} ({} bytes)", offset, input.display(), data.len())
    })?;

    if verbose {
        let (bw, bh) = block_dimensions(width, height);
        eprintln!("Decoding {}x{} blocks from: {}", bw, bh, input.display());
    }

    let surface = reconstruct_surface(stream, width, height)
        .with_context(|| format!("{} is not a {}x{} BC1 stream", input.display(), width, height))?;

    image_io::save_png(&surface, output)?;
    println!("Wrote {}x{} image to: {}", width, height, output.display());

    Ok(())
}
