//! Capture of the block stream written by an external encoder.
//!
//! A [`CaptureSink`] lives for exactly one image: it is created for the
//! image's dimensions, the encoder appends to it, and [`CaptureSink::finish`]
//! moves the buffer into a [`CompressedSurface`] ready for reconstruction.

use std::io;

use crate::bc1::{CompressedSurface, expected_stream_len};
use crate::error::{Error, Result};
use crate::surface::checked_pixel_count;

/// Append-only buffer sized for one compressed surface.
#[derive(Debug)]
pub struct CaptureSink {
    data: Vec<u8>,
    expected_len: usize,
    width: usize,
    height: usize,
}

impl CaptureSink {
    /// Create a sink for the block stream of a `width` x `height` surface.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        checked_pixel_count(width, height)?;
        let expected_len =
            expected_stream_len(width, height).ok_or(Error::InvalidDimensions { width, height })?;
        Ok(Self {
            data: Vec::with_capacity(expected_len),
            expected_len,
            width,
            height,
        })
    }

    /// Append encoder output.
    ///
    /// Writes that would grow the stream past the expected length are
    /// rejected whole; nothing is appended.
    pub fn append(&mut self, bytes: &[u8]) -> Result<()> {
        let attempted = self.data.len() + bytes.len();
        if attempted > self.expected_len {
            return Err(Error::CaptureOverflow {
                expected: self.expected_len,
                attempted,
            });
        }
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    /// Bytes captured so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether nothing has been captured yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Total stream length this sink expects.
    #[must_use]
    pub fn expected_len(&self) -> usize {
        self.expected_len
    }

    /// Bytes still missing.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.expected_len - self.data.len()
    }

    /// Whether the full stream has been captured.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.data.len() == self.expected_len
    }

    /// Dimensions of the surface being captured.
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Hand the captured stream over for reconstruction.
    ///
    /// Fails with [`Error::BlockStreamLength`] if the encoder stopped short.
    pub fn finish(self) -> Result<CompressedSurface> {
        CompressedSurface::new(self.data, self.width, self.height)
    }
}

impl io::Write for CaptureSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bc1::Bc1Block;
    use rgb::RGB8;
    use std::io::Write;

    #[test]
    fn test_capture_in_pieces() {
        let mut sink = CaptureSink::new(6, 6).unwrap();
        assert_eq!(sink.expected_len(), 32);
        assert!(sink.is_empty());

        let block = Bc1Block::solid(RGB8::new(255, 0, 0)).to_bytes();
        for _ in 0..4 {
            sink.append(&block[..3]).unwrap();
            sink.append(&block[3..]).unwrap();
        }

        assert!(sink.is_complete());
        assert_eq!(sink.remaining(), 0);
        let compressed = sink.finish().unwrap();
        assert_eq!(compressed.block_count(), 4);
        assert_eq!((compressed.width(), compressed.height()), (6, 6));
    }

    #[test]
    fn test_overflow_rejected() {
        let mut sink = CaptureSink::new(4, 4).unwrap();
        sink.append(&[0u8; 6]).unwrap();
        let err = sink.append(&[0u8; 3]).unwrap_err();
        assert!(matches!(err, Error::CaptureOverflow { expected: 8, attempted: 9 }));
        // The rejected write left the buffer untouched.
        assert_eq!(sink.len(), 6);
    }

    #[test]
    fn test_short_capture_is_fatal() {
        let mut sink = CaptureSink::new(4, 4).unwrap();
        sink.append(&[0u8; 7]).unwrap();
        assert_eq!(sink.remaining(), 1);
        assert!(matches!(
            sink.finish(),
            Err(Error::BlockStreamLength { expected: 8, actual: 7, .. })
        ));
    }

    #[test]
    fn test_io_write() {
        let mut sink = CaptureSink::new(4, 4).unwrap();
        sink.write_all(&Bc1Block::solid(RGB8::new(0, 0, 255)).to_bytes())
            .unwrap();
        sink.flush().unwrap();
        assert!(sink.is_complete());
        assert!(sink.write_all(&[0]).is_err());
    }

    #[test]
    fn test_io_write_overflow_keeps_typed_error() {
        let mut sink = CaptureSink::new(4, 4).unwrap();
        let err = sink.write(&[0u8; 9]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        let inner = err.into_inner().unwrap().downcast::<Error>().unwrap();
        assert!(matches!(*inner, Error::CaptureOverflow { expected: 8, attempted: 9 }));
    }

    #[test]
    fn test_oversized_dimensions_rejected() {
        let huge = 1usize << (usize::BITS / 2 + 8);
        assert!(matches!(
            CaptureSink::new(huge, huge),
            Err(Error::InvalidDimensions { .. })
        ));
        assert!(matches!(CaptureSink::new(0, 4), Err(Error::InvalidDimensions { .. })));
    }
}
