//! Evaluation session driving the compress/reconstruct/score round trip.
//!
//! [`EvalSession`] owns one encoder callback. For every source image it
//! captures the encoder's block stream, rebuilds the surface and scores it
//! against the source. Any failure aborts the run: a missing image, an
//! encoder error and a short block stream are all fatal.

use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;

use crate::capture::CaptureSink;
use crate::corpus::{Corpus, CorpusImage};
use crate::encode::{CommandEncoder, EncodeFn, EncodeOptions};
use crate::error::{Error, Result};
use crate::eval::report::{CorpusReport, ImageReport};
use crate::metrics;
use crate::surface::PixelSurface;

/// Callback invoked after each image finishes.
pub type ProgressFn = Box<dyn Fn(&ImageReport) + Send + Sync>;

/// Configuration for an evaluation session.
#[derive(Debug, Clone, Default)]
pub struct EvalConfig {
    /// Directory for report output (CSV, JSON). Reports are not written
    /// when unset.
    pub report_dir: Option<PathBuf>,

    /// Options forwarded to the encoder.
    pub encode: EncodeOptions,

    /// Evaluate images in parallel. Report order still follows the corpus.
    pub parallel: bool,
}

impl EvalConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> EvalConfigBuilder {
        EvalConfigBuilder::default()
    }

    /// One-line description recorded in corpus reports.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "quality={} gpu={} parallel={}",
            self.encode.quality, self.encode.gpu_acceleration, self.parallel
        )
    }
}

/// Builder for [`EvalConfig`].
#[derive(Debug, Default)]
pub struct EvalConfigBuilder {
    config: EvalConfig,
}

impl EvalConfigBuilder {
    /// Set the report output directory.
    #[must_use]
    pub fn report_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.report_dir = Some(path.into());
        self
    }

    /// Set the encoder options.
    #[must_use]
    pub fn encode(mut self, options: EncodeOptions) -> Self {
        self.config.encode = options;
        self
    }

    /// Enable or disable parallel evaluation.
    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> EvalConfig {
        self.config
    }
}

/// Round-trip evaluation session for one encoder.
///
/// # Example
///
/// ```rust,ignore
/// use bc1_fidelity::{Corpus, EvalConfig, EvalSession};
/// use bc1_fidelity::encode::CommandEncoder;
///
/// let session = EvalSession::with_command_encoder(
///     EvalConfig::builder().report_dir("./reports").build(),
///     CommandEncoder::new("bc1enc").args(["{width}", "{height}"]),
/// );
///
/// let corpus = Corpus::discover("./images")?;
/// let report = session.evaluate_corpus(&corpus, load_png)?;
/// println!("mean RMS: {:?}", report.mean_rms());
/// ```
pub struct EvalSession {
    config: EvalConfig,
    encoder_id: String,
    encoder_version: String,
    encode: EncodeFn,
    progress: Option<ProgressFn>,
}

impl EvalSession {
    /// Create a session around an encode callback.
    #[must_use]
    pub fn new(config: EvalConfig, encoder_id: &str, encoder_version: &str, encode: EncodeFn) -> Self {
        Self {
            config,
            encoder_id: encoder_id.to_string(),
            encoder_version: encoder_version.to_string(),
            encode,
            progress: None,
        }
    }

    /// Create a session that runs an external encoder program.
    #[must_use]
    pub fn with_command_encoder(config: EvalConfig, encoder: CommandEncoder) -> Self {
        let id = encoder.id().to_string();
        Self::new(config, &id, "external", encoder.into_encode_fn())
    }

    /// Register a callback invoked as each image completes.
    ///
    /// With parallel evaluation enabled the callback runs on worker threads
    /// in completion order.
    pub fn on_progress(&mut self, progress: ProgressFn) -> &mut Self {
        self.progress = Some(progress);
        self
    }

    /// Session configuration.
    #[must_use]
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Encoder identifier.
    #[must_use]
    pub fn encoder_id(&self) -> &str {
        &self.encoder_id
    }

    /// Round-trip one already-loaded image.
    pub fn evaluate_image(&self, name: &str, source: &PixelSurface) -> Result<ImageReport> {
        let (width, height) = source.dimensions();
        let mut sink = CaptureSink::new(width, height)?;

        let start = Instant::now();
        (self.encode)(source, &self.config.encode, &mut sink)?;
        let encode_time = start.elapsed();

        let compressed = sink.finish()?;

        let start = Instant::now();
        let reconstructed = compressed.reconstruct();
        let decode_time = start.elapsed();

        let score = metrics::fidelity(source, &reconstructed)?;

        let mut report = ImageReport::new(
            name.to_string(),
            width as u32,
            height as u32,
            compressed.len(),
            score,
        );
        report.encode_time = encode_time;
        report.decode_time = decode_time;
        Ok(report)
    }

    /// Round-trip every image of a corpus.
    ///
    /// `load` turns a full image path into pixels. The first failing entry
    /// aborts the run and its error is returned; no partial report is
    /// produced.
    pub fn evaluate_corpus<L>(&self, corpus: &Corpus, load: L) -> Result<CorpusReport>
    where
        L: Fn(&Path) -> Result<PixelSurface> + Sync,
    {
        let evaluate_entry = |image: &CorpusImage| -> Result<ImageReport> {
            let path = image.full_path(&corpus.root_path);
            let source = load(&path)?;
            let mut report = self.evaluate_image(image.name(), &source)?;
            report.source_path = Some(path);
            if let Some(progress) = &self.progress {
                progress(&report);
            }
            Ok(report)
        };

        let images = if self.config.parallel {
            corpus
                .images
                .par_iter()
                .map(evaluate_entry)
                .collect::<Result<Vec<_>>>()?
        } else {
            corpus
                .images
                .iter()
                .map(evaluate_entry)
                .collect::<Result<Vec<_>>>()?
        };

        let mut report = CorpusReport::new(
            corpus.name.clone(),
            self.encoder_id.clone(),
            self.encoder_version.clone(),
        );
        report.images = images;
        report.config_summary = self.config.summary();
        Ok(report)
    }

    fn report_dir(&self) -> Result<&Path> {
        self.config
            .report_dir
            .as_deref()
            .ok_or_else(|| Error::Report("no report directory configured".to_string()))
    }

    /// Write an image report to the configured report directory.
    pub fn write_image_report(&self, report: &ImageReport) -> Result<PathBuf> {
        let dir = self.report_dir()?;
        std::fs::create_dir_all(dir)?;

        let json_path = dir.join(format!("{}.json", report.name));
        std::fs::write(&json_path, serde_json::to_string_pretty(report)?)?;

        Ok(json_path)
    }

    /// Write a corpus report (JSON plus CSV summary) to the report directory.
    pub fn write_corpus_report(&self, report: &CorpusReport) -> Result<PathBuf> {
        let dir = self.report_dir()?;
        std::fs::create_dir_all(dir)?;

        let json_path = dir.join(format!("{}.json", report.name));
        std::fs::write(&json_path, serde_json::to_string_pretty(report)?)?;

        let csv_path = dir.join(format!("{}.csv", report.name));
        write_csv_summary(report, &csv_path)?;

        Ok(json_path)
    }
}

/// Write one CSV row per image.
fn write_csv_summary(report: &CorpusReport, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "image",
        "width",
        "height",
        "compressed_size",
        "bpp",
        "encode_ms",
        "decode_ms",
        "rms",
        "psnr",
    ])?;

    for img in &report.images {
        wtr.write_record([
            &img.name,
            &img.width.to_string(),
            &img.height.to_string(),
            &img.compressed_size.to_string(),
            &format!("{:.4}", img.bits_per_pixel),
            &format!("{:.3}", img.encode_time.as_secs_f64() * 1000.0),
            &format!("{:.3}", img.decode_time.as_secs_f64() * 1000.0),
            &format!("{:.4}", img.rms),
            &img.psnr.map_or(String::new(), |p| format!("{:.2}", p)),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
