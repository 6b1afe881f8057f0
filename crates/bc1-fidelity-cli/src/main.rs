//! bc1-fidelity CLI - BC1 round-trip fidelity tool

use std::path::PathBuf;

use bc1_fidelity::EncodeQuality;
use clap::{Args, Parser, Subcommand, ValueEnum};

mod commands;
mod image_io;

/// BC1 compression round-trip evaluation tool.
#[derive(Parser)]
#[command(name = "bc1-fidelity")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress, reconstruct and score a corpus of images
    Run(RunArgs),

    /// Reconstruct a raw BC1 block stream and save it as PNG
    Decode {
        /// Raw block stream
        input: PathBuf,

        /// Width of the encoded surface
        #[arg(long)]
        width: usize,

        /// Height of the encoded surface
        #[arg(long)]
        height: usize,

        /// Bytes to skip before the first block (e.g. 128 for a DDS header)
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Output PNG file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Report the RMS error between two images of equal size
    Compare {
        /// Reference image
        reference: PathBuf,

        /// Test image
        test: PathBuf,
    },

    /// Discover and inspect image corpora
    Corpus {
        #[command(subcommand)]
        action: CorpusAction,
    },
}

/// Arguments for the `run` command.
#[derive(Args)]
pub struct RunArgs {
    /// Image files to evaluate
    pub images: Vec<PathBuf>,

    /// Corpus directory or JSON manifest
    #[arg(long, conflicts_with_all = ["images", "reference_set"])]
    pub corpus: Option<PathBuf>,

    /// Directory holding the standard reference images (Kodak set plus classic test images)
    #[arg(long, conflicts_with = "images")]
    pub reference_set: Option<PathBuf>,

    /// Encoder program: reads RGBA8 on stdin, writes BC1 blocks to stdout
    #[arg(short, long, env = "BC1_FIDELITY_ENCODER")]
    pub encoder: PathBuf,

    /// Encoder argument; {width}, {height}, {quality} and {gpu} are substituted
    #[arg(long = "encoder-arg", allow_hyphen_values = true)]
    pub encoder_args: Vec<String>,

    /// Requested encoder effort
    #[arg(long, value_enum, default_value_t = Quality::Production)]
    pub quality: Quality,

    /// Allow the encoder to use GPU acceleration
    #[arg(long)]
    pub gpu: bool,

    /// Evaluate images in parallel
    #[arg(short = 'j', long)]
    pub parallel: bool,

    /// Write JSON and CSV reports to this directory
    #[arg(long)]
    pub report_dir: Option<PathBuf>,
}

/// Encoder effort levels accepted on the command line.
#[derive(Clone, Copy, ValueEnum)]
pub enum Quality {
    Fastest,
    Normal,
    Production,
    Highest,
}

impl From<Quality> for EncodeQuality {
    fn from(quality: Quality) -> Self {
        match quality {
            Quality::Fastest => Self::Fastest,
            Quality::Normal => Self::Normal,
            Quality::Production => Self::Production,
            Quality::Highest => Self::Highest,
        }
    }
}

#[derive(Subcommand)]
pub enum CorpusAction {
    /// Discover images in a directory
    Discover {
        /// Directory to scan
        path: PathBuf,

        /// Output manifest file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show corpus information
    Info {
        /// Corpus manifest file or directory
        path: PathBuf,
    },

    /// List images in a corpus
    List {
        /// Corpus manifest file or directory
        path: PathBuf,

        /// Filter by format
        #[arg(long)]
        format: Option<String>,

        /// Minimum width
        #[arg(long)]
        min_width: Option<u32>,

        /// Minimum height
        #[arg(long)]
        min_height: Option<u32>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => commands::run::run(args, cli.verbose),
        Commands::Decode { input, width, height, offset, output } => {
            commands::decode::run(&input, width, height, offset, &output, cli.verbose)
        }
        Commands::Compare { reference, test } => {
            commands::compare::run(&reference, &test, cli.verbose)
        }
        Commands::Corpus { action } => commands::corpus::run(action, cli.verbose),
    }
}
