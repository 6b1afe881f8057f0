//! Error types for bc1-fidelity operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bc1-fidelity operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while capturing, reconstructing or scoring images.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Failed to load a source image.
    #[error("Image load failed: {path}: {reason}")]
    ImageLoad {
        /// Path to the image that failed to load.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// The external encoder failed or produced unusable output.
    #[error("Encoder error ({encoder}): {message}")]
    Encoder {
        /// Encoder identifier.
        encoder: String,
        /// Error message from the encoder.
        message: String,
    },

    /// A compressed stream does not hold exactly one block per 4x4 tile.
    #[error(
        "Block stream length mismatch for {width}x{height}: expected {expected} bytes, got {actual}"
    )]
    BlockStreamLength {
        /// Surface width the stream was encoded from.
        width: usize,
        /// Surface height the stream was encoded from.
        height: usize,
        /// Required byte length.
        expected: usize,
        /// Supplied byte length.
        actual: usize,
    },

    /// The encoder wrote more bytes than the surface can hold.
    #[error("Capture overflow: expected {expected} bytes, encoder attempted {attempted}")]
    CaptureOverflow {
        /// Expected total byte length.
        expected: usize,
        /// Total length the write would have produced.
        attempted: usize,
    },

    /// Image dimensions don't match between reference and test images.
    #[error("Dimension mismatch: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        /// Expected dimensions (width, height).
        expected: (usize, usize),
        /// Actual dimensions (width, height).
        actual: (usize, usize),
    },

    /// A pixel buffer does not match its declared dimensions.
    #[error("Pixel count mismatch for {width}x{height}: expected {expected}, got {actual}")]
    PixelCount {
        /// Declared width.
        width: usize,
        /// Declared height.
        height: usize,
        /// Expected number of pixels (or bytes, for raw buffers).
        expected: usize,
        /// Supplied number of pixels (or bytes).
        actual: usize,
    },

    /// Surfaces must be at least one pixel in each direction, and small
    /// enough that their pixel and block byte counts fit in `usize`.
    #[error("Invalid surface dimensions: {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },

    /// Error in corpus management.
    #[error("Corpus error: {0}")]
    Corpus(String),

    /// Error writing report files.
    #[error("Report error: {0}")]
    Report(String),

    /// I/O error wrapper.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl Error {
    /// Whether this error signals a caller or integration bug rather than
    /// a problem with the input data.
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::BlockStreamLength { .. }
                | Self::CaptureOverflow { .. }
                | Self::DimensionMismatch { .. }
                | Self::PixelCount { .. }
        )
    }
}
