//! Lesion segmentation training entry point.
//!
//! Fetches the ISIC-2018 training data when it is missing, splits it into
//! train/validation/test sets, and trains the U-Net with a Dice loss.
//! Dice, pixel accuracy, and loss curves are rendered live on the
//! terminal dashboard while the learner runs; the held-out test split is
//! evaluated at the end and the final model is saved under the artifact
//! directory.
//!
//! ```bash
//! # Train with the default configuration
//! cargo run --release --bin train
//!
//! # Train from a configuration file, overriding the epoch count
//! cargo run --release --bin train -- --config train_config.json --num-epochs 25
//!
//! # Train on the GPU
//! cargo run --release --bin train --features wgpu --no-default-features
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::{bail, ensure, Context, Result};
use clap::Parser;
use log::info;

use burn::{
    backend::Autodiff,
    data::dataloader::{DataLoader, DataLoaderBuilder, Dataset},
    module::{AutodiffModule, Module},
    optim::AdamConfig,
    record::{FullPrecisionSettings, NamedMpkFileRecorder},
    train::LearnerBuilder,
};

use lesionseg_burn::{
    collect_pairs, evaluate, isic, DiceMetric, LesionBatch, LesionBatcher, LesionDataset,
    LossMetric, PixelAccuracyMetric, SplitConfig, UNet, UNetConfig,
};
use lesionseg_demos::{create_device, get_backend_name, SelectedBackend, SelectedDevice, TrainingConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override batch size
    #[arg(long)]
    batch_size: Option<usize>,

    /// Override number of epochs
    #[arg(long)]
    num_epochs: Option<usize>,

    /// Override learning rate
    #[arg(long)]
    learning_rate: Option<f64>,

    /// Override dataset root
    #[arg(long)]
    data_root: Option<PathBuf>,

    /// Override artifact directory
    #[arg(long)]
    artifact_dir: Option<PathBuf>,

    /// Override the sample limit (0 trains on the full archive)
    #[arg(long)]
    sample_limit: Option<usize>,

    /// Never download the archive, even when the dataset is missing
    #[arg(long)]
    no_download: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // Load configuration
    let mut config = if let Some(config_path) = &args.config {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
        serde_json::from_str::<TrainingConfig>(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?
    } else {
        TrainingConfig::default()
    };

    // Apply command line overrides
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(num_epochs) = args.num_epochs {
        config.num_epochs = num_epochs;
    }
    if let Some(learning_rate) = args.learning_rate {
        config.learning_rate = learning_rate;
    }
    if let Some(data_root) = args.data_root {
        config.data_root = data_root;
    }
    if let Some(artifact_dir) = args.artifact_dir {
        config.artifact_dir = artifact_dir;
    }
    if let Some(sample_limit) = args.sample_limit {
        config.sample_limit = (sample_limit > 0).then_some(sample_limit);
    }
    if args.no_download {
        config.download = false;
    }

    // Validate configuration
    ensure!(config.batch_size > 0, "Batch size must be greater than 0");
    ensure!(
        config.num_epochs > 0,
        "Number of epochs must be greater than 0"
    );
    ensure!(config.learning_rate > 0.0, "Learning rate must be positive");

    info!("Starting lesion segmentation training:");
    info!("  Batch size: {}", config.batch_size);
    info!("  Number of epochs: {}", config.num_epochs);
    info!("  Learning rate: {}", config.learning_rate);
    info!("  Data root: {}", config.data_root.display());
    info!("  Artifact directory: {}", config.artifact_dir.display());

    std::fs::create_dir_all(&config.artifact_dir).with_context(|| {
        format!(
            "Failed to create artifact directory at {}",
            config.artifact_dir.display()
        )
    })?;

    ensure_dataset(&config)?;

    // Create device
    let device = create_device();
    info!("Using backend: {}", get_backend_name());

    // Create and initialize model
    let model = UNetConfig::new()
        .init::<Autodiff<SelectedBackend>>(&device)
        .context("Failed to initialize U-Net model")?;

    // Create datasets over the split path lists
    let (train_dataset, valid_dataset, test_dataset) = create_datasets(&config, &device)?;

    // Create data loaders
    let (train_dataloader, valid_dataloader, test_dataloader) =
        create_dataloaders(&config, train_dataset, valid_dataset, test_dataset);

    // Create learner with optimizer and metrics
    let learner = LearnerBuilder::new(&config.artifact_dir)
        .metric_train_numeric(LossMetric::new())
        .metric_valid_numeric(LossMetric::new())
        .metric_train_numeric(DiceMetric::new())
        .metric_valid_numeric(DiceMetric::new())
        .metric_train_numeric(PixelAccuracyMetric::new())
        .metric_valid_numeric(PixelAccuracyMetric::new())
        .devices(vec![device])
        .num_epochs(config.num_epochs)
        .build(model, AdamConfig::new().init(), config.learning_rate);

    // Start training
    info!("Starting training...");
    let model_trained = learner.fit(train_dataloader, valid_dataloader);

    // Evaluate on the held-out test split
    let report = evaluate(&model_trained.valid(), test_dataloader);
    info!(
        "Test evaluation - Dice: {:.5}, Accuracy: {:.5}, Loss: {:.5}",
        report.dice, report.accuracy, report.loss
    );

    // Save final model
    save_final_model(&config, model_trained)?;

    info!("Training completed successfully");
    Ok(())
}

/// Make sure the extracted dataset exists, fetching it when allowed.
fn ensure_dataset(config: &TrainingConfig) -> Result<()> {
    let image_root = config.data_root.join(isic::IMAGE_DIR);

    if config.download {
        lesionseg_burn::fetch_dataset(isic::DATASET_URL, &config.data_root)
            .context("Failed to fetch the training archive")?;
    } else if !image_root.is_dir() {
        bail!(
            "Dataset directory does not exist and downloading is disabled: {}",
            image_root.display()
        );
    }

    Ok(())
}

/// Creates the train/validation/test datasets.
fn create_datasets(
    config: &TrainingConfig,
    device: &SelectedDevice,
) -> Result<(
    LesionDataset<Autodiff<SelectedBackend>>,
    LesionDataset<SelectedBackend>,
    LesionDataset<SelectedBackend>,
)> {
    let pairs = collect_pairs(&config.data_root, config.sample_limit)
        .context("Failed to collect dataset pairs")?;

    let splits = SplitConfig::new()
        .with_test_ratio(config.test_ratio)
        .with_val_ratio(config.val_ratio)
        .with_seed(config.seed)
        .split(pairs)
        .context("Failed to split dataset")?;

    info!(
        "Split sizes - train: {}, val: {}, test: {}",
        splits.train.len(),
        splits.val.len(),
        splits.test.len()
    );

    let train_dataset = LesionDataset::<Autodiff<SelectedBackend>>::new(splits.train, device);
    let valid_dataset = LesionDataset::<SelectedBackend>::new(splits.val, device);
    let test_dataset = LesionDataset::<SelectedBackend>::new(splits.test, device);

    info!(
        "Datasets ready - train: {} samples, val: {} samples, test: {} samples",
        train_dataset.len(),
        valid_dataset.len(),
        test_dataset.len()
    );

    Ok((train_dataset, valid_dataset, test_dataset))
}

/// Creates the training, validation, and test data loaders.
fn create_dataloaders(
    config: &TrainingConfig,
    train_dataset: LesionDataset<Autodiff<SelectedBackend>>,
    valid_dataset: LesionDataset<SelectedBackend>,
    test_dataset: LesionDataset<SelectedBackend>,
) -> (
    Arc<dyn DataLoader<Autodiff<SelectedBackend>, LesionBatch<Autodiff<SelectedBackend>>>>,
    Arc<dyn DataLoader<SelectedBackend, LesionBatch<SelectedBackend>>>,
    Arc<dyn DataLoader<SelectedBackend, LesionBatch<SelectedBackend>>>,
) {
    let train_dataloader = DataLoaderBuilder::new(LesionBatcher::new())
        .batch_size(config.batch_size)
        .shuffle(config.seed)
        .num_workers(config.num_workers)
        .build(train_dataset);

    let valid_dataloader = DataLoaderBuilder::new(LesionBatcher::<SelectedBackend>::new())
        .batch_size(config.batch_size)
        .shuffle(config.seed)
        .num_workers(config.num_workers)
        .build(valid_dataset);

    let test_dataloader = DataLoaderBuilder::new(LesionBatcher::<SelectedBackend>::new())
        .batch_size(config.batch_size)
        .shuffle(config.seed)
        .num_workers(config.num_workers)
        .build(test_dataset);

    (train_dataloader, valid_dataloader, test_dataloader)
}

/// Saves the final trained model.
fn save_final_model(
    config: &TrainingConfig,
    model: UNet<Autodiff<SelectedBackend>>,
) -> Result<()> {
    let final_model_path = config.artifact_dir.join("final_model.mpk");
    info!("Saving final model to: {}", final_model_path.display());

    model
        .save_file(
            final_model_path.clone(),
            &NamedMpkFileRecorder::<FullPrecisionSettings>::new(),
        )
        .with_context(|| {
            format!(
                "Failed to save final model to {}",
                final_model_path.display()
            )
        })?;

    Ok(())
}
