//! Handwritten Character Recognition Example
//!
//! Runs one or more images through the recognition pipeline and prints the
//! quality report, the preprocessing trace and the prediction. Without a
//! model the prediction is reported as unavailable. With `--samples` it
//! instead writes alphabet samples from the provider chain to a directory.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example recognize -- [OPTIONS] [IMAGES]...
//! ```
//!
//! # Example
//!
//! ```bash
//! cargo run --example recognize --features onnx -- \
//!     --mode digit -m models/mnist.onnx digit.png
//!
//! cargo run --example recognize -- --samples 6 --seed 7 -o samples/
//! ```

use clap::Parser;
use oar_hcr::core::{RecognizerConfig, init_tracing};
use oar_hcr::domain::Mode;
use oar_hcr::predictor::{Recognition, Recognizer};
use oar_hcr::samples::SampleProvider;
use oar_hcr::utils::load_image;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};

/// Command-line arguments for the recognition example
#[derive(Parser)]
#[command(name = "recognize")]
#[command(about = "Handwritten digit and letter recognition example")]
struct Args {
    /// Paths to input images
    images: Vec<PathBuf>,

    /// Recognition mode: digit or alphabet
    #[arg(long, default_value = "digit")]
    mode: Mode,

    /// Path to an ONNX classifier (requires the `onnx` feature)
    #[arg(short, long)]
    model_path: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write this many random alphabet samples instead of recognizing
    #[arg(long)]
    samples: Option<usize>,

    /// Seed for sample generation
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Directory for generated samples
    #[arg(short, long, default_value = "samples")]
    output_dir: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => RecognizerConfig::from_json_file(path)?,
        None => RecognizerConfig::default(),
    };

    if let Some(count) = args.samples {
        return write_samples(&config, count, args.seed, &args.output_dir);
    }

    if args.images.is_empty() {
        error!("No input images given");
        return Err("No input images given".into());
    }

    let mut builder = Recognizer::builder().config(config);
    if let Some(model_path) = &args.model_path {
        builder = with_model(builder, args.mode, model_path)?;
    }
    let recognizer = builder.build()?;
    info!(
        "Model: {}",
        recognizer.registry().slot(args.mode).display_name()
    );

    for path in &args.images {
        let image = match load_image(path) {
            Ok(image) => image,
            Err(e) => {
                error!("Failed to load {}: {}", path.display(), e);
                continue;
            }
        };
        let start = Instant::now();
        let recognition = recognizer.recognize(&image, args.mode)?;
        info!("{} processed in {:?}", path.display(), start.elapsed());
        print_recognition(&recognition);
    }
    Ok(())
}

#[cfg(feature = "onnx")]
fn with_model(
    builder: oar_hcr::predictor::RecognizerBuilder,
    mode: Mode,
    model_path: &std::path::Path,
) -> Result<oar_hcr::predictor::RecognizerBuilder, Box<dyn std::error::Error>> {
    let classifier = oar_hcr::core::OrtClassifier::load(model_path)?;
    Ok(builder.classifier(mode, std::sync::Arc::new(classifier)))
}

#[cfg(not(feature = "onnx"))]
fn with_model(
    builder: oar_hcr::predictor::RecognizerBuilder,
    _mode: Mode,
    model_path: &std::path::Path,
) -> Result<oar_hcr::predictor::RecognizerBuilder, Box<dyn std::error::Error>> {
    tracing::warn!(
        "Ignoring {}: built without the `onnx` feature",
        model_path.display()
    );
    Ok(builder)
}

fn print_recognition(recognition: &Recognition) {
    let quality = &recognition.quality;
    println!("Quality: {}/100 ({:?})", quality.score, quality.band());
    for (issue, recommendation) in quality.issues.iter().zip(&quality.recommendations) {
        println!("  - {}: {}", issue.description(), recommendation);
    }

    println!("Preprocessing:");
    for (stage, buffer) in recognition.trace.iter() {
        let (w, h) = buffer.dimensions();
        println!("  {:<12} {}x{} mean={:.3}", stage.as_str(), w, h, buffer.mean());
    }
    if recognition.trace.polarity_inverted() {
        println!("  (polarity inverted)");
    }

    match recognition.outcome.prediction() {
        Some(prediction) => {
            println!(
                "Prediction: {} ({:.1}%)",
                prediction.label_text(),
                prediction.confidence * 100.0
            );
            for ranked in &prediction.top_k {
                println!("  {} #{} {:.4}", ranked.label, ranked.class_index, ranked.score);
            }
        }
        None => println!("Prediction: {:?}", recognition.outcome),
    }
}

fn write_samples(
    config: &RecognizerConfig,
    count: usize,
    seed: u64,
    output_dir: &std::path::Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let letters: Vec<char> = ('A'..='Z').take(count).collect();
    let provider = SampleProvider::from_config(&config.samples)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let (set, tier) = provider.get_samples(&letters, &mut rng);
    info!("Generated {} samples from the {} tier", set.len(), tier);

    std::fs::create_dir_all(output_dir)?;
    for sample in set.samples() {
        let path = output_dir.join(format!("{}.png", sample.label));
        sample.image.save(&path)?;
        println!("{}", path.display());
    }
    Ok(())
}
