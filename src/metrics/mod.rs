//! Round-trip fidelity metrics.
//!
//! The score is the root-mean-square error over the red, green and blue
//! channels of every pixel (alpha is ignored):
//!
//! ```text
//! rms = sqrt( sum((a - b)^2 over r, g, b of every pixel) / (pixels * 3) )
//! ```
//!
//! The squared differences are summed as integers, so the reduction is exact
//! for any surface size; only the final division and square root use floats.
//!
//! | RMS | Typical meaning for BC1 |
//! |-----|-------------------------|
//! | 0 | Lossless (flat or two-color tiles) |
//! | < 5 | Production-quality encoder on photographic content |
//! | >= 10 | Visible banding or blocking |

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::surface::PixelSurface;

/// Color channels that contribute to the score.
pub const SCORED_CHANNELS: u64 = 3;

/// Exact error totals for one reference/test pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FidelityScore {
    /// Sum of squared per-channel differences.
    pub squared_error_sum: u64,
    /// Number of channel samples compared (`pixels * 3`).
    pub sample_count: u64,
}

impl FidelityScore {
    /// Mean squared error.
    #[must_use]
    pub fn mse(&self) -> f64 {
        if self.sample_count == 0 {
            return 0.0;
        }
        self.squared_error_sum as f64 / self.sample_count as f64
    }

    /// Root-mean-square error, in `[0, 255]`.
    #[must_use]
    pub fn rms(&self) -> f64 {
        self.mse().sqrt()
    }

    /// PSNR in decibels. `f64::INFINITY` for identical images.
    #[must_use]
    pub fn psnr(&self) -> f64 {
        let mse = self.mse();
        if mse == 0.0 {
            f64::INFINITY
        } else {
            10.0 * (255.0_f64 * 255.0 / mse).log10()
        }
    }

    /// Whether the two surfaces matched exactly on every scored channel.
    #[must_use]
    pub fn is_lossless(&self) -> bool {
        self.squared_error_sum == 0
    }
}

/// Compare two equally sized surfaces.
///
/// # Errors
///
/// [`Error::DimensionMismatch`] if the surfaces differ in size. This is a
/// harness bug, not a data condition, and callers should abort on it.
pub fn fidelity(reference: &PixelSurface, test: &PixelSurface) -> Result<FidelityScore> {
    if reference.dimensions() != test.dimensions() {
        return Err(Error::DimensionMismatch {
            expected: reference.dimensions(),
            actual: test.dimensions(),
        });
    }

    let squared_error_sum = reference
        .pixels()
        .iter()
        .zip(test.pixels())
        .map(|(a, b)| {
            let r = i32::from(a.r) - i32::from(b.r);
            let g = i32::from(a.g) - i32::from(b.g);
            let b = i32::from(a.b) - i32::from(b.b);
            (r * r + g * g + b * b) as u64
        })
        .sum();

    Ok(FidelityScore {
        squared_error_sum,
        sample_count: reference.pixel_count() as u64 * SCORED_CHANNELS,
    })
}

/// Root-mean-square RGB error between two equally sized surfaces.
pub fn rms_error(reference: &PixelSurface, test: &PixelSurface) -> Result<f64> {
    fidelity(reference, test).map(|score| score.rms())
}
