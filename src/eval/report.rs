//! Report types for evaluation results.
//!
//! This module defines the data structures for evaluation reports that can be
//! serialized to JSON or CSV.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::metrics::FidelityScore;
use crate::stats::{self, Summary};

/// Round-trip result for a single image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageReport {
    /// Image name or identifier.
    pub name: String,

    /// Path to the source image.
    pub source_path: Option<PathBuf>,

    /// Image dimensions.
    pub width: u32,
    pub height: u32,

    /// Size of the captured block stream in bytes.
    pub compressed_size: usize,

    /// Bits per pixel of the block stream (4.0 for aligned BC1 surfaces).
    pub bits_per_pixel: f64,

    /// Time spent in the encoder.
    #[serde(with = "duration_millis")]
    pub encode_time: Duration,

    /// Time spent reconstructing the surface.
    #[serde(with = "duration_millis")]
    pub decode_time: Duration,

    /// Exact error totals.
    pub score: FidelityScore,

    /// Root-mean-square RGB error.
    pub rms: f64,

    /// PSNR in dB; `None` when the round trip was lossless.
    pub psnr: Option<f64>,

    /// When this report was generated.
    #[serde(with = "chrono_serde")]
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ImageReport {
    /// Create a report from a finished round trip.
    #[must_use]
    pub fn new(
        name: String,
        width: u32,
        height: u32,
        compressed_size: usize,
        score: FidelityScore,
    ) -> Self {
        let pixels = f64::from(width) * f64::from(height);
        let psnr = score.psnr();
        Self {
            name,
            source_path: None,
            width,
            height,
            compressed_size,
            bits_per_pixel: (compressed_size * 8) as f64 / pixels,
            encode_time: Duration::ZERO,
            decode_time: Duration::ZERO,
            score,
            rms: score.rms(),
            psnr: psnr.is_finite().then_some(psnr),
            timestamp: chrono::Utc::now(),
        }
    }

    /// Uncompressed RGB size in bytes.
    #[must_use]
    pub fn uncompressed_size(&self) -> usize {
        (self.width as usize) * (self.height as usize) * 3
    }
}

/// Report for a corpus of images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusReport {
    /// Corpus name or identifier.
    pub name: String,

    /// Encoder identifier.
    pub encoder_id: String,

    /// Encoder version string.
    pub encoder_version: String,

    /// Individual image reports, in corpus order.
    pub images: Vec<ImageReport>,

    /// When this report was generated.
    #[serde(with = "chrono_serde")]
    pub timestamp: chrono::DateTime<chrono::Utc>,

    /// Configuration used for this evaluation.
    pub config_summary: String,
}

impl CorpusReport {
    /// Create a new corpus report.
    #[must_use]
    pub fn new(name: String, encoder_id: String, encoder_version: String) -> Self {
        Self {
            name,
            encoder_id,
            encoder_version,
            images: Vec::new(),
            timestamp: chrono::Utc::now(),
            config_summary: String::new(),
        }
    }

    /// Per-image RMS values in corpus order.
    #[must_use]
    pub fn rms_values(&self) -> Vec<f64> {
        self.images.iter().map(|img| img.rms).collect()
    }

    /// Arithmetic mean of the per-image RMS values.
    #[must_use]
    pub fn mean_rms(&self) -> Option<f64> {
        if self.images.is_empty() {
            None
        } else {
            Some(stats::mean(&self.rms_values()))
        }
    }

    /// RMS over every sample of every image, weighting large images more.
    #[must_use]
    pub fn pooled_rms(&self) -> Option<f64> {
        let pooled = self.images.iter().fold(FidelityScore::default(), |acc, img| {
            FidelityScore {
                squared_error_sum: acc.squared_error_sum + img.score.squared_error_sum,
                sample_count: acc.sample_count + img.score.sample_count,
            }
        });
        (pooled.sample_count > 0).then(|| pooled.rms())
    }

    /// Spread of the per-image RMS values.
    #[must_use]
    pub fn summary(&self) -> Option<Summary> {
        Summary::compute(&self.rms_values())
    }

    /// The image with the highest RMS.
    #[must_use]
    pub fn worst(&self) -> Option<&ImageReport> {
        self.images.iter().max_by(|a, b| a.rms.total_cmp(&b.rms))
    }

    /// Total time spent in the encoder.
    #[must_use]
    pub fn total_encode_time(&self) -> Duration {
        self.images.iter().map(|img| img.encode_time).sum()
    }
}

// Custom serialization for Duration as milliseconds
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_secs_f64() * 1000.0).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(millis / 1000.0).map_err(serde::de::Error::custom)
    }
}

mod chrono_serde {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        dt.to_rfc3339().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(name: &str, squared_error_sum: u64) -> ImageReport {
        let score = FidelityScore {
            squared_error_sum,
            sample_count: 4 * 4 * 3,
        };
        ImageReport::new(name.to_string(), 4, 4, 8, score)
    }

    #[test]
    fn test_image_report_new() {
        let r = report("flat.png", 0);
        assert_eq!(r.bits_per_pixel, 4.0);
        assert_eq!(r.rms, 0.0);
        assert_eq!(r.psnr, None);
        assert_eq!(r.uncompressed_size(), 48);

        let r = report("noisy.png", 48 * 9);
        assert_eq!(r.rms, 3.0);
        assert!(r.psnr.is_some());
    }

    #[test]
    fn test_mean_rms_is_arithmetic() {
        let mut corpus = CorpusReport::new("kodak".to_string(), "enc".to_string(), "1".to_string());
        assert_eq!(corpus.mean_rms(), None);
        assert_eq!(corpus.pooled_rms(), None);

        corpus.images.push(report("a.png", 48)); // rms 1
        corpus.images.push(report("b.png", 48 * 9)); // rms 3
        assert_eq!(corpus.mean_rms(), Some(2.0));
        assert_eq!(corpus.pooled_rms(), Some(5.0_f64.sqrt()));
        assert_eq!(corpus.worst().map(|r| r.name.as_str()), Some("b.png"));
        assert_eq!(corpus.summary().unwrap().count, 2);
    }

    #[test]
    fn test_json_round_trip() {
        let mut r = report("a.png", 48);
        r.encode_time = Duration::from_micros(1500);
        let json = serde_json::to_string(&r).unwrap();
        let back: ImageReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "a.png");
        assert_eq!(back.score, r.score);
        assert!((back.encode_time.as_secs_f64() - 0.0015).abs() < 1e-9);
    }
}
