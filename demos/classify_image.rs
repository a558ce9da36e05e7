//! Image Classification Example
//!
//! This example loads an ONNX image classifier on the portable (CPU) and
//! accelerated (GPU) backends, classifies each image on both at once and
//! prints the merged report.
//!
//! Usage:
//! ```
//! cargo run --example classify_image -- --model-path <model.onnx> --class-table <classes.txt> <image_paths>...
//! ```
//!
//! Pass `--config <config.json>` to load a `ClassifierConfig`, and `--json`
//! to print reports as JSON. Enable GPU providers with e.g. `--features webgpu`.

use clap::Parser;
use dualsight::core::init_tracing;
use dualsight::prelude::*;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Command-line arguments for the image classification example
#[derive(Parser)]
#[command(name = "classify_image")]
#[command(about = "Classifies images on portable and accelerated ONNX Runtime backends")]
struct Args {
    /// Path to the ONNX model file
    #[arg(short, long)]
    model_path: PathBuf,

    /// Class table file, one class per line
    #[arg(short, long)]
    class_table: Option<PathBuf>,

    /// JSON classifier configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ranked entries per backend (overrides the config)
    #[arg(short, long)]
    topk: Option<usize>,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,

    /// Image file paths to process
    #[arg(required = true)]
    images: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    if !args.model_path.exists() {
        error!("Model file not found: {}", args.model_path.display());
        return Err("Model file not found".into());
    }

    let mut config = match &args.config {
        Some(path) => ClassifierConfig::from_file(path)?,
        None => ClassifierConfig::default(),
    };
    if let Some(path) = args.class_table {
        config = config.class_table(path);
    }
    if let Some(topk) = args.topk {
        config = config.topk(topk);
    }

    let classifier = ImageClassifier::new(config)?;
    let ready = classifier.load_model(args.model_path.as_path()).await;
    if ready.is_empty() {
        warn!("No backend could load the model; reports will be empty");
    } else {
        info!("Loaded backends: {:?}", ready);
    }

    for (i, path) in args.images.iter().enumerate() {
        info!(
            "Processing image {} of {}: {}",
            i + 1,
            args.images.len(),
            path.display()
        );
        match classifier.analyze_file(path).await {
            Ok(report) if args.json => println!("{}", report.to_json_pretty()?),
            Ok(report) => println!("{}\n{report}", path.display()),
            Err(e) => error!("Failed to classify {}: {}", path.display(), e),
        }
    }

    Ok(())
}
