//! Owned RGBA8 pixel surfaces.
//!
//! [`PixelSurface`] is the pixel type shared by every stage of the pipeline:
//! source images handed in by the caller, surfaces rebuilt from compressed
//! blocks, and both inputs of the error evaluator. Width and height are fixed
//! at construction and the backing buffer always holds exactly
//! `width * height` pixels in row-major order.

use imgref::{ImgRef, ImgVec};
use rgb::{RGB8, RGBA8};

use crate::error::{Error, Result};

/// A fixed-size, row-major RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelSurface {
    img: ImgVec<RGBA8>,
}

impl PixelSurface {
    /// Create a surface filled with transparent black.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Self::filled(width, height, RGBA8::default())
    }

    /// Create a surface where every pixel is `color`.
    pub fn filled(width: usize, height: usize, color: RGBA8) -> Result<Self> {
        let count = checked_pixel_count(width, height)?;
        Ok(Self::from_parts(vec![color; count], width, height))
    }

    /// Wrap an owned pixel buffer.
    pub fn from_pixels(pixels: Vec<RGBA8>, width: usize, height: usize) -> Result<Self> {
        let count = checked_pixel_count(width, height)?;
        if pixels.len() != count {
            return Err(Error::PixelCount {
                width,
                height,
                expected: count,
                actual: pixels.len(),
            });
        }
        Ok(Self::from_parts(pixels, width, height))
    }

    /// Build a surface from interleaved RGBA8 bytes.
    pub fn from_rgba8_bytes(data: &[u8], width: usize, height: usize) -> Result<Self> {
        check_byte_len(data, 4, width, height)?;
        let pixels = data
            .chunks_exact(4)
            .map(|c| RGBA8::new(c[0], c[1], c[2], c[3]))
            .collect();
        Ok(Self::from_parts(pixels, width, height))
    }

    /// Build an opaque surface from interleaved RGB8 bytes.
    pub fn from_rgb8_bytes(data: &[u8], width: usize, height: usize) -> Result<Self> {
        check_byte_len(data, 3, width, height)?;
        let pixels = data
            .chunks_exact(3)
            .map(|c| RGBA8::new(c[0], c[1], c[2], 255))
            .collect();
        Ok(Self::from_parts(pixels, width, height))
    }

    /// Build an opaque surface from an RGB8 image.
    pub fn from_rgb8_img(img: ImgRef<'_, RGB8>) -> Result<Self> {
        checked_pixel_count(img.width(), img.height())?;
        let pixels = img.pixels().map(|p| RGBA8::new(p.r, p.g, p.b, 255)).collect();
        Ok(Self::from_parts(pixels, img.width(), img.height()))
    }

    /// Internal constructor; callers have already validated the dimensions.
    pub(crate) fn from_parts(pixels: Vec<RGBA8>, width: usize, height: usize) -> Self {
        debug_assert_eq!(pixels.len(), width * height);
        Self {
            img: ImgVec::new(pixels, width, height),
        }
    }

    /// Surface width in pixels.
    #[must_use]
    pub fn width(&self) -> usize {
        self.img.width()
    }

    /// Surface height in pixels.
    #[must_use]
    pub fn height(&self) -> usize {
        self.img.height()
    }

    /// `(width, height)` tuple.
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    /// Total number of pixels.
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        self.width() * self.height()
    }

    /// Pixel at `(x, y)`, or `None` outside the surface.
    #[must_use]
    pub fn pixel(&self, x: usize, y: usize) -> Option<RGBA8> {
        if x < self.width() && y < self.height() {
            Some(self.img.buf()[y * self.width() + x])
        } else {
            None
        }
    }

    /// Mutable pixel at `(x, y)`, or `None` outside the surface.
    pub fn pixel_mut(&mut self, x: usize, y: usize) -> Option<&mut RGBA8> {
        let width = self.width();
        if x < width && y < self.height() {
            self.img.buf_mut().get_mut(y * width + x)
        } else {
            None
        }
    }

    /// All pixels in row-major order.
    #[must_use]
    pub fn pixels(&self) -> &[RGBA8] {
        self.img.buf()
    }

    /// Mutable access to all pixels in row-major order.
    pub fn pixels_mut(&mut self) -> &mut [RGBA8] {
        self.img.buf_mut()
    }

    /// Borrow as an `imgref` view.
    #[must_use]
    pub fn as_img(&self) -> ImgRef<'_, RGBA8> {
        self.img.as_ref()
    }

    /// Interleaved RGBA8 bytes.
    #[must_use]
    pub fn to_rgba8_bytes(&self) -> Vec<u8> {
        self.pixels().iter().flat_map(|p| [p.r, p.g, p.b, p.a]).collect()
    }

    /// Interleaved RGB8 bytes, dropping alpha.
    #[must_use]
    pub fn to_rgb8_bytes(&self) -> Vec<u8> {
        self.pixels().iter().flat_map(|p| [p.r, p.g, p.b]).collect()
    }

    /// Unwrap into the backing image.
    #[must_use]
    pub fn into_img(self) -> ImgVec<RGBA8> {
        self.img
    }
}

impl TryFrom<ImgVec<RGBA8>> for PixelSurface {
    type Error = Error;

    fn try_from(img: ImgVec<RGBA8>) -> Result<Self> {
        checked_pixel_count(img.width(), img.height())?;
        if img.stride() == img.width() && img.buf().len() == img.width() * img.height() {
            return Ok(Self { img });
        }
        // Repack strided images so the buffer is exactly width * height.
        let pixels = img.pixels().collect();
        Ok(Self::from_parts(pixels, img.width(), img.height()))
    }
}

/// Pixel count of a `width` x `height` surface.
///
/// Rejects empty surfaces and any size whose RGBA8 byte length does not fit
/// in `usize`.
pub(crate) fn checked_pixel_count(width: usize, height: usize) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .filter(|count| count.checked_mul(4).is_some())
        .ok_or(Error::InvalidDimensions { width, height })
}

fn check_byte_len(data: &[u8], channels: usize, width: usize, height: usize) -> Result<()> {
    let expected = checked_pixel_count(width, height)? * channels;
    if data.len() != expected {
        return Err(Error::PixelCount {
            width,
            height,
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_dimensions() {
        let surface = PixelSurface::new(100, 50).unwrap();
        assert_eq!(surface.width(), 100);
        assert_eq!(surface.height(), 50);
        assert_eq!(surface.pixel_count(), 5000);
        assert_eq!(surface.pixels().len(), 5000);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            PixelSurface::new(0, 4),
            Err(Error::InvalidDimensions { width: 0, height: 4 })
        ));
        assert!(PixelSurface::new(4, 0).is_err());
    }

    #[test]
    fn test_oversized_dimensions_rejected() {
        let huge = 1usize << (usize::BITS / 2 + 8);
        assert!(matches!(
            PixelSurface::new(huge, huge),
            Err(Error::InvalidDimensions { .. })
        ));
        assert!(matches!(
            PixelSurface::from_pixels(Vec::new(), huge, huge),
            Err(Error::InvalidDimensions { .. })
        ));
        assert!(matches!(
            PixelSurface::from_rgba8_bytes(&[], usize::MAX / 2, 1),
            Err(Error::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_from_pixels_wrong_length() {
        let err = PixelSurface::from_pixels(vec![RGBA8::default(); 15], 4, 4).unwrap_err();
        assert!(matches!(err, Error::PixelCount { expected: 16, actual: 15, .. }));
    }

    #[test]
    fn test_rgb8_bytes_are_opaque() {
        let data = [10, 20, 30, 40, 50, 60];
        let surface = PixelSurface::from_rgb8_bytes(&data, 2, 1).unwrap();
        assert_eq!(surface.pixel(0, 0), Some(RGBA8::new(10, 20, 30, 255)));
        assert_eq!(surface.pixel(1, 0), Some(RGBA8::new(40, 50, 60, 255)));
        assert_eq!(surface.to_rgb8_bytes(), data);
    }

    #[test]
    fn test_pixel_out_of_bounds() {
        let mut surface = PixelSurface::new(3, 2).unwrap();
        assert!(surface.pixel(3, 0).is_none());
        assert!(surface.pixel(0, 2).is_none());
        assert!(surface.pixel_mut(3, 1).is_none());

        *surface.pixel_mut(2, 1).unwrap() = RGBA8::new(1, 2, 3, 4);
        assert_eq!(surface.pixels()[5], RGBA8::new(1, 2, 3, 4));
    }

    #[test]
    fn test_rgba8_round_trip_bytes() {
        let data: Vec<u8> = (0..2 * 2 * 4).map(|i| i as u8).collect();
        let surface = PixelSurface::from_rgba8_bytes(&data, 2, 2).unwrap();
        assert_eq!(surface.to_rgba8_bytes(), data);
    }

    #[test]
    fn test_try_from_strided_img() {
        let buf = vec![
            RGBA8::new(1, 0, 0, 255),
            RGBA8::new(2, 0, 0, 255),
            RGBA8::new(9, 9, 9, 9),
            RGBA8::new(3, 0, 0, 255),
            RGBA8::new(4, 0, 0, 255),
            RGBA8::new(9, 9, 9, 9),
        ];
        let img = ImgVec::new_stride(buf, 2, 2, 3);
        let surface = PixelSurface::try_from(img).unwrap();
        assert_eq!(surface.pixels().len(), 4);
        assert_eq!(surface.pixel(0, 1), Some(RGBA8::new(3, 0, 0, 255)));
    }
}
