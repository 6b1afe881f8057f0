//! Corpus lists for validation runs.
//!
//! A [`Corpus`] is plain data: a root directory plus the images under it. It
//! is built by the caller (from a fixed name list, a directory scan or a JSON
//! manifest) and handed to
//! [`EvalSession::evaluate_corpus`](crate::eval::EvalSession::evaluate_corpus).
//!
//! ## Example
//!
//! ```rust,ignore
//! use bc1_fidelity::corpus::Corpus;
//!
//! // Fixed list of reference images
//! let corpus = Corpus::from_names("kodak", "./images", ["kodim01.png", "kodim02.png"]);
//!
//! // Or scan a directory
//! let corpus = Corpus::discover("./images")?;
//! ```

mod discovery;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A corpus of source images.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Corpus {
    /// Name of the corpus.
    pub name: String,

    /// Root path of the corpus.
    pub root_path: PathBuf,

    /// Images in the corpus, in evaluation order.
    pub images: Vec<CorpusImage>,

    /// Metadata about the corpus.
    #[serde(default)]
    pub metadata: CorpusMetadata,
}

/// Metadata about a corpus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusMetadata {
    /// Description of the corpus.
    pub description: Option<String>,

    /// License information.
    pub license: Option<String>,

    /// Source URL.
    pub source_url: Option<String>,
}

/// An image in the corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusImage {
    /// Relative path from corpus root.
    pub relative_path: PathBuf,

    /// Image dimensions (0 when not yet known).
    pub width: u32,
    pub height: u32,

    /// File size in bytes (0 when not yet known).
    #[serde(default)]
    pub file_size: u64,

    /// Format detected from file extension.
    pub format: String,
}

impl CorpusImage {
    /// Describe an image by path alone; dimensions are filled in on load.
    #[must_use]
    pub fn from_path(relative_path: impl Into<PathBuf>) -> Self {
        let relative_path = relative_path.into();
        let format = relative_path
            .extension()
            .and_then(|e| e.to_str())
            .map(discovery::format_for_extension)
            .unwrap_or_default();
        Self {
            relative_path,
            width: 0,
            height: 0,
            file_size: 0,
            format,
        }
    }

    /// Get the full path to the image.
    #[must_use]
    pub fn full_path(&self, root: &Path) -> PathBuf {
        root.join(&self.relative_path)
    }

    /// Get the image name (filename without path).
    #[must_use]
    pub fn name(&self) -> &str {
        self.relative_path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("")
    }

    /// Get pixel count.
    #[must_use]
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl Corpus {
    /// Create a new empty corpus.
    #[must_use]
    pub fn new(name: impl Into<String>, root_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root_path: root_path.into(),
            images: Vec::new(),
            metadata: CorpusMetadata::default(),
        }
    }

    /// Build a corpus from a fixed list of paths relative to `root_path`.
    ///
    /// Files are not touched; a missing entry only surfaces when the run
    /// tries to load it.
    #[must_use]
    pub fn from_names<I, S>(name: impl Into<String>, root_path: impl Into<PathBuf>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<Path>,
    {
        let mut corpus = Self::new(name, root_path);
        corpus.images = names
            .into_iter()
            .map(|n| CorpusImage::from_path(n.as_ref()))
            .collect();
        corpus
    }

    /// Discover images in a directory.
    ///
    /// Recursively scans the directory for supported image formats
    /// (PNG, JPEG, TIFF, BMP), sorted by relative path.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self> {
        discovery::discover_corpus(path.as_ref())
    }

    /// Load a corpus from a JSON manifest file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let corpus: Corpus = serde_json::from_str(&content)?;
        Ok(corpus)
    }

    /// Save the corpus to a JSON manifest file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Get the number of images in the corpus.
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Check if the corpus is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Filter images by format.
    #[must_use]
    pub fn filter_format(&self, format: &str) -> Vec<&CorpusImage> {
        self.images
            .iter()
            .filter(|img| img.format.eq_ignore_ascii_case(format))
            .collect()
    }

    /// Filter images by minimum dimensions.
    #[must_use]
    pub fn filter_min_size(&self, min_width: u32, min_height: u32) -> Vec<&CorpusImage> {
        self.images
            .iter()
            .filter(|img| img.width >= min_width && img.height >= min_height)
            .collect()
    }

    /// Get statistics about the corpus.
    #[must_use]
    pub fn stats(&self) -> CorpusStats {
        let known = || self.images.iter().filter(|img| img.pixel_count() > 0);

        CorpusStats {
            image_count: self.images.len(),
            total_pixels: self.images.iter().map(CorpusImage::pixel_count).sum(),
            total_bytes: self.images.iter().map(|img| img.file_size).sum(),
            min_width: known().map(|img| img.width).min().unwrap_or(0),
            max_width: known().map(|img| img.width).max().unwrap_or(0),
            min_height: known().map(|img| img.height).min().unwrap_or(0),
            max_height: known().map(|img| img.height).max().unwrap_or(0),
        }
    }
}

/// Statistics about a corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusStats {
    /// Number of images.
    pub image_count: usize,
    /// Total pixels across images with known dimensions.
    pub total_pixels: u64,
    /// Total file size in bytes.
    pub total_bytes: u64,
    /// Minimum image width.
    pub min_width: u32,
    /// Maximum image width.
    pub max_width: u32,
    /// Minimum image height.
    pub min_height: u32,
    /// Maximum image height.
    pub max_height: u32,
}
