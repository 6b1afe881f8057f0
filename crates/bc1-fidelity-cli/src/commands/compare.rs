//! Image comparison command.

use std::path::Path;

use anyhow::{Context, Result};
use bc1_fidelity::fidelity;

use crate::image_io;

pub fn run(reference: &Path, test: &Path, verbose: bool) -> Result<()> {
    let reference_img = image_io::load_surface(reference)?;
    let test_img = image_io::load_surface(test)?;

    if verbose {
        eprintln!(
            "Comparing {} ({}x{}) against {}",
            test.display(),
            test_img.width(),
            test_img.height(),
            reference.display()
        );
    }

    let score = fidelity(&reference_img, &test_img)
        .with_context(|| format!("Cannot compare {} with {}", reference.display(), test.display()))?;

    println!("RMS: {:.4}", score.rms());
    if score.is_lossless() {
        println!("PSNR: inf (identical)");
    } else {
        println!("PSNR: {:.2} dB", score.psnr());
    }

    Ok(())
}
