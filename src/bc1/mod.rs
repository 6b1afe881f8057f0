//! BC1 (DXT1) block decoding and surface reconstruction.
//!
//! - [`Bc1Block`] / [`decode_block`]: one 8-byte block to 16 RGBA8 texels
//! - [`CompressedSurface`] / [`reconstruct_surface`]: a concatenated block
//!   stream back to a full [`PixelSurface`](crate::surface::PixelSurface)
//!
//! Blocks always cover aligned 4x4 tiles. Surfaces whose dimensions are not
//! multiples of four still carry whole blocks along the right and bottom
//! edges; the texels that fall outside the surface are dropped on decode.

mod block;
mod reconstruct;

pub use block::{Bc1Block, Color565, TEXELS_PER_BLOCK, decode_block};
pub use reconstruct::{CompressedSurface, reconstruct_surface};

/// Size of one compressed block in bytes.
pub const BLOCK_BYTES: usize = 8;

/// Edge length of the tile one block covers.
pub const BLOCK_DIM: usize = 4;

/// Number of blocks across and down a `width` x `height` surface.
#[must_use]
pub const fn block_dimensions(width: usize, height: usize) -> (usize, usize) {
    (width.div_ceil(BLOCK_DIM), height.div_ceil(BLOCK_DIM))
}

/// Byte length of the block stream for a `width` x `height` surface, or
/// `None` if it does not fit in `usize`.
#[must_use]
pub const fn expected_stream_len(width: usize, height: usize) -> Option<usize> {
    let (bw, bh) = block_dimensions(width, height);
    match bw.checked_mul(bh) {
        Some(blocks) => blocks.checked_mul(BLOCK_BYTES),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_dimensions_round_up() {
        assert_eq!(block_dimensions(4, 4), (1, 1));
        assert_eq!(block_dimensions(5, 4), (2, 1));
        assert_eq!(block_dimensions(6, 6), (2, 2));
        assert_eq!(block_dimensions(1, 1), (1, 1));
    }

    #[test]
    fn test_block_rows_follow_height() {
        // Wide and short: rows must come from the height, not the width.
        assert_eq!(block_dimensions(768, 512), (192, 128));
        assert_eq!(block_dimensions(16, 3), (4, 1));
        assert_eq!(expected_stream_len(16, 3), Some(4 * 8));
    }

    #[test]
    fn test_expected_stream_len() {
        assert_eq!(expected_stream_len(6, 6), Some(32));
        assert_eq!(expected_stream_len(768, 512), Some(192 * 128 * 8));
    }

    #[test]
    fn test_expected_stream_len_overflow() {
        let huge = 1usize << (usize::BITS / 2 + 8);
        assert_eq!(expected_stream_len(huge, huge), None);
        assert_eq!(expected_stream_len(usize::MAX, 4), None);
        assert_eq!(block_dimensions(usize::MAX, 1), (usize::MAX / 4 + 1, 1));
    }
}
