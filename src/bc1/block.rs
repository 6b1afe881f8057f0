//! Single-block BC1 decoding.
//!
//! Block layout (8 bytes, little-endian fields):
//!
//! | Bytes | Field |
//! |-------|-------|
//! | 0..2  | `color0`, RGB565 |
//! | 2..4  | `color1`, RGB565 |
//! | 4..8  | 16 texel indices, 2 bits each, texel 0 in the lowest bits |

use rgb::{RGB8, RGBA8};

use super::{BLOCK_BYTES, BLOCK_DIM};

/// Number of texels in one block.
pub const TEXELS_PER_BLOCK: usize = BLOCK_DIM * BLOCK_DIM;

/// A color packed as 5 bits red, 6 bits green, 5 bits blue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color565(u16);

impl Color565 {
    /// Wrap a raw packed value.
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Raw packed value.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Quantize an 8-bit color by truncating each channel to its packed width.
    #[must_use]
    pub const fn from_rgb8(color: RGB8) -> Self {
        let r = (color.r as u16 >> 3) << 11;
        let g = (color.g as u16 >> 2) << 5;
        let b = color.b as u16 >> 3;
        Self(r | g | b)
    }

    /// Red channel expanded to 8 bits.
    #[must_use]
    pub const fn red(self) -> u8 {
        let r5 = ((self.0 >> 11) & 0x1F) as u8;
        (r5 << 3) | (r5 >> 2)
    }

    /// Green channel expanded to 8 bits.
    #[must_use]
    pub const fn green(self) -> u8 {
        let g6 = ((self.0 >> 5) & 0x3F) as u8;
        (g6 << 2) | (g6 >> 4)
    }

    /// Blue channel expanded to 8 bits.
    #[must_use]
    pub const fn blue(self) -> u8 {
        let b5 = (self.0 & 0x1F) as u8;
        (b5 << 3) | (b5 >> 2)
    }

    /// Expand to an opaque 8-bit color.
    #[must_use]
    pub const fn to_rgba8(self) -> RGBA8 {
        RGBA8 {
            r: self.red(),
            g: self.green(),
            b: self.blue(),
            a: 255,
        }
    }
}

/// One compressed 4x4 tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bc1Block {
    /// First reference color.
    pub color0: Color565,
    /// Second reference color.
    pub color1: Color565,
    /// Packed 2-bit palette indices, texel 0 in bits 0..2.
    pub indices: u32,
}

impl Bc1Block {
    /// Assemble a block from its fields.
    #[must_use]
    pub const fn new(color0: Color565, color1: Color565, indices: u32) -> Self {
        Self {
            color0,
            color1,
            indices,
        }
    }

    /// A block that decodes to `color` (after RGB565 quantization) everywhere.
    #[must_use]
    pub const fn solid(color: RGB8) -> Self {
        let c = Color565::from_rgb8(color);
        Self::new(c, c, 0)
    }

    /// Parse the 8-byte wire form.
    #[must_use]
    pub const fn from_bytes(bytes: &[u8; BLOCK_BYTES]) -> Self {
        Self {
            color0: Color565::from_raw(u16::from_le_bytes([bytes[0], bytes[1]])),
            color1: Color565::from_raw(u16::from_le_bytes([bytes[2], bytes[3]])),
            indices: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        }
    }

    /// Serialize to the 8-byte wire form.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; BLOCK_BYTES] {
        let c0 = self.color0.raw().to_le_bytes();
        let c1 = self.color1.raw().to_le_bytes();
        let idx = self.indices.to_le_bytes();
        [c0[0], c0[1], c1[0], c1[1], idx[0], idx[1], idx[2], idx[3]]
    }

    /// Palette index of texel `texel` (row-major, 0..16).
    #[must_use]
    pub const fn index(self, texel: usize) -> usize {
        ((self.indices >> (2 * texel)) & 0b11) as usize
    }

    /// The four palette entries the indices select from.
    ///
    /// Identical reference colors collapse the palette to a single color; the
    /// 3-color transparent variant of the format is never produced.
    #[must_use]
    pub fn palette(self) -> [RGBA8; 4] {
        let c0 = self.color0.to_rgba8();
        let c1 = self.color1.to_rgba8();

        if self.color0 == self.color1 {
            return [c0; 4];
        }

        [c0, c1, interpolate(c0, c1), interpolate(c1, c0)]
    }

    /// Decode into 16 pixels, row-major.
    #[must_use]
    pub fn decode(self) -> [RGBA8; TEXELS_PER_BLOCK] {
        let palette = self.palette();
        std::array::from_fn(|texel| palette[self.index(texel)])
    }
}

/// `(2 * near + far) / 3` per channel, floor division.
fn interpolate(near: RGBA8, far: RGBA8) -> RGBA8 {
    let mix = |n: u8, f: u8| ((2 * u16::from(n) + u16::from(f)) / 3) as u8;
    RGBA8::new(mix(near.r, far.r), mix(near.g, far.g), mix(near.b, far.b), 255)
}

/// Decode one compressed block into a row-major 4x4 tile.
#[must_use]
pub fn decode_block(bytes: &[u8; BLOCK_BYTES]) -> [RGBA8; TEXELS_PER_BLOCK] {
    Bc1Block::from_bytes(bytes).decode()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: RGB8 = RGB8 { r: 255, g: 0, b: 0 };
    const BLUE: RGB8 = RGB8 { r: 0, g: 0, b: 255 };

    #[test]
    fn test_color565_bit_replication() {
        assert_eq!(Color565::from_raw(0xFFFF).to_rgba8(), RGBA8::new(255, 255, 255, 255));
        assert_eq!(Color565::from_raw(0x0000).to_rgba8(), RGBA8::new(0, 0, 0, 255));
        // r5 = 16 -> 0b10000_100, g6 = 32 -> 0b100000_10, b5 = 1 -> 0b00001_000
        let c = Color565::from_raw((16 << 11) | (32 << 5) | 1);
        assert_eq!(c.red(), 132);
        assert_eq!(c.green(), 130);
        assert_eq!(c.blue(), 8);
    }

    #[test]
    fn test_color565_from_rgb8() {
        assert_eq!(Color565::from_rgb8(RED).raw(), 0xF800);
        assert_eq!(Color565::from_rgb8(BLUE).raw(), 0x001F);
        assert_eq!(Color565::from_rgb8(RGB8::new(0, 255, 0)).raw(), 0x07E0);
    }

    #[test]
    fn test_wire_layout_is_little_endian() {
        let bytes = [0x00, 0xF8, 0x1F, 0x00, 0x78, 0x56, 0x34, 0x12];
        let block = Bc1Block::from_bytes(&bytes);
        assert_eq!(block.color0.raw(), 0xF800);
        assert_eq!(block.color1.raw(), 0x001F);
        assert_eq!(block.indices, 0x12345678);
        assert_eq!(block.to_bytes(), bytes);
    }

    #[test]
    fn test_identical_references_decode_solid() {
        // Mixed indices must still land on the single reference color.
        let c = Color565::from_rgb8(RED);
        let block = Bc1Block::new(c, c, 0xE4E4_E4E4);
        for pixel in block.decode() {
            assert_eq!(pixel, RGBA8::new(255, 0, 0, 255));
        }
    }

    #[test]
    fn test_interpolation_exact() {
        let block = Bc1Block::new(Color565::from_rgb8(RED), Color565::from_rgb8(BLUE), 0);
        let palette = block.palette();
        assert_eq!(palette[0], RGBA8::new(255, 0, 0, 255));
        assert_eq!(palette[1], RGBA8::new(0, 0, 255, 255));
        assert_eq!(palette[2], RGBA8::new(170, 0, 85, 255));
        assert_eq!(palette[3], RGBA8::new(85, 0, 170, 255));
    }

    #[test]
    fn test_interpolation_ignores_reference_order() {
        // color0 < color1 still yields the 4-color palette.
        let block = Bc1Block::new(Color565::from_rgb8(BLUE), Color565::from_rgb8(RED), 0);
        let palette = block.palette();
        assert_eq!(palette[2], RGBA8::new(85, 0, 170, 255));
        assert_eq!(palette[3], RGBA8::new(170, 0, 85, 255));
        assert!(palette.iter().all(|p| p.a == 255));
    }

    #[test]
    fn test_indices_map_row_major() {
        // Texel t uses index t % 4: each row reads 0, 1, 2, 3.
        let block = Bc1Block::new(Color565::from_rgb8(RED), Color565::from_rgb8(BLUE), 0xE4E4_E4E4);
        let pixels = block.decode();
        let palette = block.palette();
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(pixels[y * 4 + x], palette[x]);
            }
        }
    }

    #[test]
    fn test_decode_block_deterministic() {
        let bytes = [0x34, 0x12, 0x78, 0x56, 0x1B, 0x2C, 0x3D, 0x4E];
        assert_eq!(decode_block(&bytes), decode_block(&bytes));
        assert_eq!(decode_block(&bytes), Bc1Block::from_bytes(&bytes).decode());
    }

    #[test]
    fn test_solid_block() {
        let block = Bc1Block::solid(RGB8::new(0, 255, 0));
        assert_eq!(block.color0, block.color1);
        assert!(block.decode().iter().all(|&p| p == RGBA8::new(0, 255, 0, 255)));
    }
}
