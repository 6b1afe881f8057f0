//! Corpus management commands.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use bc1_fidelity::Corpus;

use crate::CorpusAction;

pub fn run(action: CorpusAction, verbose: bool) -> Result<()> {
    match action {
        CorpusAction::Discover { path, output } => discover(&path, output.as_deref(), verbose),
        CorpusAction::Info { path } => info(&path),
        CorpusAction::List { path, format, min_width, min_height } => {
            list(&path, format.as_deref(), min_width.unwrap_or(0), min_height.unwrap_or(0))
        }
    }
}

/// Open a corpus from a directory scan or a JSON manifest.
pub fn open(path: &Path) -> Result<Corpus> {
    if path.is_dir() {
        Corpus::discover(path)
            .with_context(|| format!("Failed to discover images in {}", path.display()))
    } else {
        Corpus::load(path).with_context(|| format!("Failed to load corpus from {}", path.display()))
    }
}

fn discover(path: &Path, output: Option<&Path>, verbose: bool) -> Result<()> {
    if verbose {
        eprintln!("Discovering images in: {}", path.display());
    }

    let corpus = Corpus::discover(path)
        .with_context(|| format!("Failed to discover images in {}", path.display()))?;

    let stats = corpus.stats();
    println!("Discovered {} images", stats.image_count);
    println!("  Total size: {} bytes", stats.total_bytes);
    println!(
        "  Dimensions: {}x{} to {}x{}",
        stats.min_width, stats.min_height, stats.max_width, stats.max_height
    );

    if let Some(output_path) = output {
        corpus
            .save(output_path)
            .with_context(|| format!("Failed to save corpus to {}", output_path.display()))?;
        println!("Saved manifest to: {}", output_path.display());
    } else {
        let json = serde_json::to_string_pretty(&corpus)?;
        println!("{json}");
    }

    Ok(())
}

fn info(path: &Path) -> Result<()> {
    let corpus = open(path)?;
    let stats = corpus.stats();

    println!("Corpus: {}", corpus.name);
    println!("  Path: {}", corpus.root_path.display());
    println!("  Images: {}", stats.image_count);
    println!("  Total pixels: {}", stats.total_pixels);
    println!(
        "  Total size: {} bytes ({:.2} MB)",
        stats.total_bytes,
        stats.total_bytes as f64 / 1_000_000.0
    );
    println!(
        "  Dimensions: {}x{} to {}x{}",
        stats.min_width, stats.min_height, stats.max_width, stats.max_height
    );
    if let Some(description) = &corpus.metadata.description {
        println!("  Description: {description}");
    }

    let mut formats: BTreeMap<&str, usize> = BTreeMap::new();
    for img in &corpus.images {
        *formats.entry(img.format.as_str()).or_default() += 1;
    }
    if !formats.is_empty() {
        println!("  Formats:");
        for (format, count) in formats {
            println!("    {format}: {count}");
        }
    }

    Ok(())
}

fn list(path: &Path, format: Option<&str>, min_width: u32, min_height: u32) -> Result<()> {
    let corpus = open(path)?;

    let matching = corpus
        .filter_min_size(min_width, min_height)
        .into_iter()
        .filter(|img| format.is_none_or(|f| img.format.eq_ignore_ascii_case(f)));

    for img in matching {
        println!(
            "{}\t{}x{}\t{}",
            img.relative_path.display(),
            img.width,
            img.height,
            img.format
        );
    }

    Ok(())
}
