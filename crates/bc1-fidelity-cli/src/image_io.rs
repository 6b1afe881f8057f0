//! Image file loading and saving.

use std::path::Path;

use anyhow::{Context, Result};
use bc1_fidelity::{Error, PixelSurface};

/// Decode an image file into an RGBA8 surface.
pub fn load_surface(path: &Path) -> bc1_fidelity::Result<PixelSurface> {
    let img = image::open(path)
        .map_err(|e| Error::ImageLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?
        .to_rgba8();
    let (width, height) = img.dimensions();
    PixelSurface::from_rgba8_bytes(img.as_raw(), width as usize, height as usize)
}

/// Save a surface as PNG.
pub fn save_png(surface: &PixelSurface, path: &Path) -> Result<()> {
    let img = image::RgbaImage::from_raw(
        surface.width() as u32,
        surface.height() as u32,
        surface.to_rgba8_bytes(),
    )
    .context("pixel buffer does not match surface dimensions")?;
    img.save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("Failed to write {}", path.display()))
}
