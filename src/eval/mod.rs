//! Corpus evaluation and report generation.
//!
//! - [`session::EvalSession`]: Runs the encoder, reconstruction and scoring per image
//! - [`session::EvalConfig`]: Configuration for evaluation
//! - [`report`]: Report types for evaluation results

pub mod report;
pub mod session;

pub use report::{CorpusReport, ImageReport};
pub use session::{EvalConfig, EvalConfigBuilder, EvalSession, ProgressFn};
