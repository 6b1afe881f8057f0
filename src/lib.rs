//! # bc1-fidelity
//!
//! BC1 (DXT1) block decoding and round-trip fidelity evaluation.
//!
//! An external encoder compresses each source image into a BC1 block stream.
//! This crate captures that stream, decodes it back into pixels and reports
//! the RMS error against the source, per image and averaged over a corpus.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bc1_fidelity::{Corpus, EvalConfig, EvalSession, PixelSurface};
//!
//! let mut session = EvalSession::new(
//!     EvalConfig::builder().report_dir("./reports").build(),
//!     "my-encoder",
//!     "1.0.0",
//!     Box::new(|source, options, sink| {
//!         // Compress `source` and append the blocks
//!         sink.append(&encode_bc1(source, options))
//!     }),
//! );
//!
//! let corpus = Corpus::from_names("kodak", "./images", ["kodim01.png", "kodim02.png"]);
//! let report = session.evaluate_corpus(&corpus, load_image)?;
//! println!("Average RMS: {:.4}", report.mean_rms().unwrap_or(0.0));
//! ```
//!
//! ## Modules
//!
//! - [`bc1`]: Block decoding and surface reconstruction
//! - [`capture`]: Capture buffer for encoder output
//! - [`metrics`]: RMS error between surfaces
//! - [`encode`]: External encoder boundary
//! - [`eval`]: Evaluation session and report generation
//! - [`corpus`]: Corpus lists
//! - [`stats`]: Aggregate statistics
//! - [`surface`]: Pixel surfaces
//! - [`error`]: Error types for the library

pub mod bc1;
pub mod capture;
pub mod corpus;
pub mod encode;
pub mod error;
pub mod eval;
pub mod metrics;
pub mod stats;
pub mod surface;

// Re-export commonly used types
pub use bc1::{Bc1Block, Color565, CompressedSurface, decode_block, reconstruct_surface};
pub use capture::CaptureSink;
pub use corpus::{Corpus, CorpusImage};
pub use encode::{CommandEncoder, EncodeFn, EncodeOptions, EncodeQuality};
pub use error::{Error, Result};
pub use eval::{CorpusReport, EvalConfig, EvalSession, ImageReport};
pub use metrics::{FidelityScore, fidelity, rms_error};
pub use stats::Summary;
pub use surface::PixelSurface;
