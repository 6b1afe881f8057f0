//! Round-trip evaluation command.

use anyhow::{Context, Result, bail};
use bc1_fidelity::{CommandEncoder, Corpus, EncodeOptions, EvalConfig, EvalSession, ImageReport};

use crate::RunArgs;
use crate::commands::corpus;
use crate::image_io;

/// The standard validation set: the 24 Kodak photographs followed by the
/// classic test images.
pub const REFERENCE_IMAGES: &[&str] = &[
    "kodim01.png",
    "kodim02.png",
    "kodim03.png",
    "kodim04.png",
    "kodim05.png",
    "kodim06.png",
    "kodim07.png",
    "kodim08.png",
    "kodim09.png",
    "kodim10.png",
    "kodim11.png",
    "kodim12.png",
    "kodim13.png",
    "kodim14.png",
    "kodim15.png",
    "kodim16.png",
    "kodim17.png",
    "kodim18.png",
    "kodim19.png",
    "kodim20.png",
    "kodim21.png",
    "kodim22.png",
    "kodim23.png",
    "kodim24.png",
    "clegg.tif",
    "frymire.tif",
    "lena.tif",
    "monarch.tif",
    "sail.tif",
    "serrano.tif",
    "tulips.tif",
];

/// Per-image result block, printed once the image has been scored. With
/// parallel evaluation these arrive in completion order.
fn progress_line(report: &ImageReport) -> String {
    format!(
        "Compressed: '{}'\n  Time taken: {:.3} seconds\n  RMS: {:.4}",
        report.name,
        report.encode_time.as_secs_f64(),
        report.rms
    )
}

fn build_corpus(args: &RunArgs) -> Result<Corpus> {
    let corpus = if let Some(dir) = &args.reference_set {
        Corpus::from_names("reference", dir, REFERENCE_IMAGES)
    } else if let Some(path) = &args.corpus {
        corpus::open(path)?
    } else {
        Corpus::from_names("images", "", &args.images)
    };

    if corpus.is_empty() {
        bail!("No images to evaluate; pass image files, --corpus or --reference-set");
    }
    Ok(corpus)
}

pub fn run(args: RunArgs, verbose: bool) -> Result<()> {
    let corpus = build_corpus(&args)?;

    let encoder = CommandEncoder::new(&args.encoder).args(&args.encoder_args);
    let options = EncodeOptions {
        quality: args.quality.into(),
        gpu_acceleration: args.gpu,
    };

    let mut builder = EvalConfig::builder().encode(options).parallel(args.parallel);
    if let Some(dir) = &args.report_dir {
        builder = builder.report_dir(dir);
    }
    let config = builder.build();

    if verbose {
        eprintln!(
            "Evaluating {} images from '{}' with {} ({})",
            corpus.len(),
            corpus.name,
            encoder.id(),
            config.summary()
        );
    }

    let mut session = EvalSession::with_command_encoder(config, encoder);
    session.on_progress(Box::new(|report: &ImageReport| {
        println!("{}", progress_line(report));
    }));

    let report = session
        .evaluate_corpus(&corpus, image_io::load_surface)
        .with_context(|| format!("Evaluation of '{}' aborted", corpus.name))?;

    if let Some(mean) = report.mean_rms() {
        println!("Average Results:\n  RMS: {mean:.4}");
    }

    if verbose {
        if let Some(summary) = report.summary() {
            eprintln!(
                "RMS spread: median {:.4}, p95 {:.4}, std dev {:.4}, range {:.4}..{:.4}",
                summary.median, summary.p95, summary.std_dev, summary.min, summary.max
            );
        }
        if let Some(pooled) = report.pooled_rms() {
            eprintln!("Pooled RMS: {pooled:.4}");
        }
        if let Some(worst) = report.worst() {
            eprintln!("Worst image: {} (RMS {:.4})", worst.name, worst.rms);
        }
        eprintln!(
            "Total encode time: {:.3} seconds",
            report.total_encode_time().as_secs_f64()
        );
    }

    if session.config().report_dir.is_some() {
        let json_path = session.write_corpus_report(&report)?;
        println!("Report written to: {}", json_path.display());
    }

    Ok(())
}
