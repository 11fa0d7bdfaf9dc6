//! Prediction panel entry point.
//!
//! Loads a trained model, runs it on samples from the held-out test
//! split, and writes one panel per sample with the input image, the
//! ground-truth mask, and the predicted mask side by side.
//!
//! ```bash
//! cargo run --release --bin predict -- artifacts/final_model.mpk
//!
//! # Binarize the predicted masks at 0.5
//! cargo run --release --bin predict -- artifacts/final_model.mpk --threshold 0.5
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use burn::{
    module::Module,
    record::{FullPrecisionSettings, NamedMpkFileRecorder, Recorder},
    tensor::activation::sigmoid,
};

use lesionseg_burn::{collect_pairs, preprocess, SplitConfig, UNet, UNetConfig};
use lesionseg_demos::{
    create_device, get_backend_name,
    panel::{compose_panel, to_gray_image},
    PredictConfig, SelectedBackend, SelectedDevice,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the trained model file
    model: PathBuf,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override dataset root
    #[arg(long)]
    data_root: Option<PathBuf>,

    /// Override output directory for the panels
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Override the number of test samples to render
    #[arg(long)]
    num_samples: Option<usize>,

    /// Binarization threshold for predicted masks (0.0-1.0)
    #[arg(short, long)]
    threshold: Option<f32>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
        serde_json::from_str::<PredictConfig>(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?
    } else {
        PredictConfig::default()
    };

    // Apply command line overrides
    if let Some(data_root) = args.data_root {
        config.data_root = data_root;
    }
    if let Some(output) = args.output {
        config.output_dir = output;
    }
    if let Some(num_samples) = args.num_samples {
        config.num_samples = num_samples;
    }
    if args.threshold.is_some() {
        config.threshold = args.threshold;
    }

    let device = create_device();
    info!("Using backend: {}", get_backend_name());

    let model = load_model(&args.model, &device)?;

    // Reconstruct the same test split the training run held out.
    let pairs = collect_pairs(&config.data_root, config.sample_limit)
        .context("Failed to collect dataset pairs")?;
    let splits = SplitConfig::new()
        .with_test_ratio(config.test_ratio)
        .with_val_ratio(config.val_ratio)
        .with_seed(config.seed)
        .split(pairs)
        .context("Failed to split dataset")?;

    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory at {}",
            config.output_dir.display()
        )
    })?;

    for (index, (image_path, mask_path)) in
        splits.test.iter().take(config.num_samples).enumerate()
    {
        let (image, mask) =
            preprocess::load_pair::<SelectedBackend>(image_path, mask_path, &device)
                .with_context(|| format!("Failed to preprocess {}", image_path.display()))?;

        let logits = model.forward(image.clone().unsqueeze::<4>());
        let probabilities = sigmoid(logits).squeeze::<3>(0);
        let prediction = match config.threshold {
            Some(threshold) => probabilities.greater_elem(threshold).float(),
            None => probabilities,
        };

        let panel = compose_panel(&[
            to_gray_image(image)?,
            to_gray_image(mask)?,
            to_gray_image(prediction)?,
        ])?;

        let stem = image_path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("sample");
        let panel_path = config.output_dir.join(format!("panel_{index}_{stem}.png"));

        panel
            .save(&panel_path)
            .with_context(|| format!("Failed to save panel to {}", panel_path.display()))?;
        info!("Wrote {}", panel_path.display());
    }

    Ok(())
}

/// Initialize the model and load trained weights into it.
fn load_model(path: &PathBuf, device: &SelectedDevice) -> Result<UNet<SelectedBackend>> {
    let model = UNetConfig::new()
        .init::<SelectedBackend>(device)
        .context("Failed to initialize U-Net model")?;

    let recorder = NamedMpkFileRecorder::<FullPrecisionSettings>::new();
    let record = recorder
        .load(path.clone(), device)
        .context("Failed to load model weights")?;

    Ok(model.load_record(record))
}
