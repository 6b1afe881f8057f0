//! The external encoder boundary.
//!
//! This crate never chooses block encodings itself. An encoder is any
//! callback that reads a [`PixelSurface`] and appends the resulting BC1 block
//! stream to a [`CaptureSink`]. [`CommandEncoder`] adapts a command-line
//! compressor to that shape:
//!
//! - the source is written to the program's stdin as raw RGBA8, row-major
//! - the program writes the bare block stream (no container header) to stdout
//! - `{width}`, `{height}`, `{quality}` and `{gpu}` in its arguments are
//!   replaced per image
//!
//! ```rust,ignore
//! use bc1_fidelity::encode::CommandEncoder;
//!
//! let encoder = CommandEncoder::new("my-bc1-encoder")
//!     .args(["--size", "{width}x{height}", "--quality", "{quality}", "--gpu={gpu}"]);
//! ```

use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::capture::CaptureSink;
use crate::error::{Error, Result};
use crate::surface::PixelSurface;

/// Effort level requested from the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodeQuality {
    /// Fastest encode, lowest quality.
    Fastest,
    /// Balanced.
    Normal,
    /// The level the reference corpus is normally evaluated at.
    #[default]
    Production,
    /// Exhaustive search.
    Highest,
}

impl EncodeQuality {
    /// Parse from string (case-insensitive).
    #[must_use]
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fastest" | "fast" => Some(Self::Fastest),
            "normal" | "default" => Some(Self::Normal),
            "production" | "prod" => Some(Self::Production),
            "highest" | "best" => Some(Self::Highest),
            _ => None,
        }
    }

    /// Short lowercase name, as substituted for `{quality}`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fastest => "fastest",
            Self::Normal => "normal",
            Self::Production => "production",
            Self::Highest => "highest",
        }
    }
}

impl fmt::Display for EncodeQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options forwarded to the encoder for every image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EncodeOptions {
    /// Requested effort level.
    pub quality: EncodeQuality,
    /// Whether the encoder may use GPU acceleration. Encoders are free to
    /// ignore this.
    pub gpu_acceleration: bool,
}

/// Encode callback type.
///
/// Reads the source surface and appends the full block stream to the sink.
pub type EncodeFn =
    Box<dyn Fn(&PixelSurface, &EncodeOptions, &mut CaptureSink) -> Result<()> + Send + Sync>;

/// Runs an external program as the encoder.
#[derive(Debug, Clone)]
pub struct CommandEncoder {
    id: String,
    program: PathBuf,
    args: Vec<String>,
}

impl CommandEncoder {
    /// Create an encoder running `program`.
    ///
    /// The encoder id defaults to the program's file stem.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        let id = program
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("external")
            .to_string();
        Self {
            id,
            program,
            args: Vec::new(),
        }
    }

    /// Override the encoder id used in reports.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Append one argument template.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several argument templates.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Encoder id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Arguments with placeholders filled in for one image.
    #[must_use]
    pub fn expand_args(&self, width: usize, height: usize, options: &EncodeOptions) -> Vec<String> {
        let width = width.to_string();
        let height = height.to_string();
        let gpu = if options.gpu_acceleration { "1" } else { "0" };
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{width}", &width)
                    .replace("{height}", &height)
                    .replace("{quality}", options.quality.as_str())
                    .replace("{gpu}", gpu)
            })
            .collect()
    }

    /// Run the program on one surface and capture its output.
    ///
    /// The program need not read all of stdin. Once it exits successfully,
    /// a broken pipe on the pixel upload is ignored and only its stdout
    /// counts.
    pub fn encode(
        &self,
        source: &PixelSurface,
        options: &EncodeOptions,
        sink: &mut CaptureSink,
    ) -> Result<()> {
        let args = self.expand_args(source.width(), source.height(), options);

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| self.error(format!("Failed to run {}: {e}", self.program.display())))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| self.error("stdin was not captured".to_string()))?;
        let input = source.to_rgba8_bytes();
        // Feed stdin from a separate thread so a large stdout can't deadlock us.
        let writer = std::thread::spawn(move || stdin.write_all(&input));

        let output = child
            .wait_with_output()
            .map_err(|e| self.error(format!("Failed to wait for encoder: {e}")))?;
        let written = writer
            .join()
            .map_err(|_| self.error("stdin writer panicked".to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self.error(format!("exited with {}: {}", output.status, stderr.trim())));
        }
        // A successful encoder may exit without draining stdin.
        match written {
            Err(e) if e.kind() != io::ErrorKind::BrokenPipe => {
                return Err(self.error(format!("Failed to send pixels: {e}")));
            }
            _ => {}
        }

        sink.append(&output.stdout)
    }

    /// Box this encoder as an [`EncodeFn`].
    #[must_use]
    pub fn into_encode_fn(self) -> EncodeFn {
        Box::new(move |source, options, sink| self.encode(source, options, sink))
    }

    fn error(&self, message: String) -> Error {
        Error::Encoder {
            encoder: self.id.clone(),
            message,
        }
    }
}
