//! Rebuilding full surfaces from block streams.

use crate::error::{Error, Result};
use crate::surface::{PixelSurface, checked_pixel_count};

use super::block::Bc1Block;
use super::{BLOCK_BYTES, BLOCK_DIM, block_dimensions, expected_stream_len};

/// A complete block stream tagged with the dimensions it was encoded from.
///
/// Construction validates that the stream holds exactly one block per tile,
/// so every `CompressedSurface` can be reconstructed without further checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedSurface {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl CompressedSurface {
    /// Take ownership of a block stream for a `width` x `height` surface.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> Result<Self> {
        check_stream(&data, width, height)?;
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Surface width the stream was encoded from.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Surface height the stream was encoded from.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw block stream.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Stream length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Always false: streams cover at least one block.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of blocks in the stream.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.data.len() / BLOCK_BYTES
    }

    /// Iterate blocks in row-major tile order.
    pub fn blocks(&self) -> impl Iterator<Item = Bc1Block> + '_ {
        blocks(&self.data)
    }

    /// Decode every block into a new surface.
    #[must_use]
    pub fn reconstruct(&self) -> PixelSurface {
        decode_blocks(&self.data, self.width, self.height)
    }

    /// Release the block stream.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

/// Reconstruct a `width` x `height` surface from a borrowed block stream.
///
/// Fails with [`Error::BlockStreamLength`] unless the stream is exactly
/// `ceil(width/4) * ceil(height/4)` blocks long.
pub fn reconstruct_surface(stream: &[u8], width: usize, height: usize) -> Result<PixelSurface> {
    check_stream(stream, width, height)?;
    Ok(decode_blocks(stream, width, height))
}

fn blocks(stream: &[u8]) -> impl Iterator<Item = Bc1Block> + '_ {
    stream.chunks_exact(BLOCK_BYTES).map(|chunk| {
        let mut bytes = [0u8; BLOCK_BYTES];
        bytes.copy_from_slice(chunk);
        Bc1Block::from_bytes(&bytes)
    })
}

/// Decode a stream that has already passed [`check_stream`].
fn decode_blocks(stream: &[u8], width: usize, height: usize) -> PixelSurface {
    let (blocks_wide, _) = block_dimensions(width, height);
    let mut pixels = vec![rgb::RGBA8::default(); width * height];

    for (i, block) in blocks(stream).enumerate() {
        let x0 = (i % blocks_wide) * BLOCK_DIM;
        let y0 = (i / blocks_wide) * BLOCK_DIM;
        let texels = block.decode();

        // Edge tiles: texels past the right or bottom border are dropped.
        let cols = BLOCK_DIM.min(width - x0);
        let rows = BLOCK_DIM.min(height - y0);
        for dy in 0..rows {
            let row = (y0 + dy) * width + x0;
            pixels[row..row + cols].copy_from_slice(&texels[dy * BLOCK_DIM..dy * BLOCK_DIM + cols]);
        }
    }

    PixelSurface::from_parts(pixels, width, height)
}

/// Validate dimensions and stream length before any allocation.
fn check_stream(stream: &[u8], width: usize, height: usize) -> Result<()> {
    checked_pixel_count(width, height)?;
    let expected =
        expected_stream_len(width, height).ok_or(Error::InvalidDimensions { width, height })?;
    if stream.len() != expected {
        return Err(Error::BlockStreamLength {
            width,
            height,
            expected,
            actual: stream.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rgb::{RGB8, RGBA8};

    fn solid_stream(colors: &[RGB8]) -> Vec<u8> {
        colors
            .iter()
            .flat_map(|&c| Bc1Block::solid(c).to_bytes())
            .collect()
    }

    const TILE_COLORS: [RGB8; 4] = [
        RGB8 { r: 255, g: 0, b: 0 },
        RGB8 { r: 0, g: 255, b: 0 },
        RGB8 { r: 0, g: 0, b: 255 },
        RGB8 { r: 255, g: 255, b: 255 },
    ];

    #[test]
    fn test_single_block_surface() {
        let stream = solid_stream(&TILE_COLORS[..1]);
        let surface = reconstruct_surface(&stream, 4, 4).unwrap();
        assert_eq!(surface.dimensions(), (4, 4));
        assert!(surface.pixels().iter().all(|&p| p == RGBA8::new(255, 0, 0, 255)));
    }

    #[test]
    fn test_edge_tiles_clipped() {
        let stream = solid_stream(&TILE_COLORS);
        let surface = reconstruct_surface(&stream, 6, 6).unwrap();

        assert_eq!(surface.pixels().len(), 36);
        for y in 0..6 {
            for x in 0..6 {
                let tile = (y / 4) * 2 + x / 4;
                let expected = TILE_COLORS[tile];
                assert_eq!(
                    surface.pixel(x, y),
                    Some(RGBA8::new(expected.r, expected.g, expected.b, 255)),
                    "pixel ({x}, {y})"
                );
            }
        }
        assert!(surface.pixel(6, 0).is_none());
        assert!(surface.pixel(0, 6).is_none());
    }

    #[test]
    fn test_non_square_uses_independent_block_rows() {
        // 8x4: two blocks across, one down.
        let stream = solid_stream(&TILE_COLORS[..2]);
        let surface = reconstruct_surface(&stream, 8, 4).unwrap();
        assert_eq!(surface.pixel(7, 3), Some(RGBA8::new(0, 255, 0, 255)));

        // 4x8: one block across, two down.
        let surface = reconstruct_surface(&stream, 4, 8).unwrap();
        assert_eq!(surface.pixel(3, 7), Some(RGBA8::new(0, 255, 0, 255)));
        assert_eq!(surface.pixel(3, 3), Some(RGBA8::new(255, 0, 0, 255)));
    }

    #[test]
    fn test_texel_placement_within_tile() {
        // Row-major indices 0,1,2,3 on every row of a red/blue block.
        let block = Bc1Block::new(
            crate::bc1::Color565::from_rgb8(TILE_COLORS[0]),
            crate::bc1::Color565::from_rgb8(TILE_COLORS[2]),
            0xE4E4_E4E4,
        );
        let surface = reconstruct_surface(&block.to_bytes(), 3, 2).unwrap();
        let palette = block.palette();
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(surface.pixel(x, y), Some(palette[x]));
            }
        }
    }

    #[test]
    fn test_one_byte_short_is_fatal() {
        let mut stream = solid_stream(&TILE_COLORS);
        stream.pop();
        let err = reconstruct_surface(&stream, 6, 6).unwrap_err();
        assert!(matches!(
            err,
            Error::BlockStreamLength {
                expected: 32,
                actual: 31,
                ..
            }
        ));
        assert!(err.is_contract_violation());
        assert!(CompressedSurface::new(stream, 6, 6).is_err());
    }

    #[test]
    fn test_extra_bytes_rejected() {
        let stream = solid_stream(&TILE_COLORS);
        assert!(reconstruct_surface(&stream, 4, 4).is_err());
    }

    #[test]
    fn test_oversized_dimensions_rejected() {
        let huge = 1usize << (usize::BITS / 2 + 8);
        for (width, height) in [(huge, huge), (usize::MAX, 1)] {
            assert!(matches!(
                reconstruct_surface(&[], width, height),
                Err(Error::InvalidDimensions { .. })
            ));
            assert!(matches!(
                CompressedSurface::new(Vec::new(), width, height),
                Err(Error::InvalidDimensions { .. })
            ));
        }
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        assert!(matches!(
            reconstruct_surface(&[], 0, 4),
            Err(Error::InvalidDimensions { width: 0, height: 4 })
        ));
    }

    #[test]
    fn test_compressed_surface_accessors() {
        let compressed = CompressedSurface::new(solid_stream(&TILE_COLORS), 6, 6).unwrap();
        assert_eq!(compressed.block_count(), 4);
        assert_eq!(compressed.len(), 32);
        assert_eq!(compressed.blocks().count(), 4);
        assert_eq!(compressed.reconstruct().dimensions(), (6, 6));
    }
}
