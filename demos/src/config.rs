//! Configuration for the runnable entry points.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for a training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Root directory the dataset archive is fetched into and read from.
    pub data_root: PathBuf,
    /// Directory for checkpoints, dashboard logs, and the final model.
    pub artifact_dir: PathBuf,
    /// Number of training epochs.
    pub num_epochs: usize,
    /// Batch size for training and validation.
    pub batch_size: usize,
    /// Learning rate for the Adam optimizer.
    pub learning_rate: f64,
    /// Fraction of all pairs held out for testing.
    pub test_ratio: f64,
    /// Fraction of the remaining pairs held out for validation.
    pub val_ratio: f64,
    /// Keep only the first N pairs in sorted order. `None` trains on the
    /// full archive.
    pub sample_limit: Option<usize>,
    /// Seed for the split shuffle and the loader shuffle.
    pub seed: u64,
    /// Number of data-loading workers.
    pub num_workers: usize,
    /// Fetch the archive automatically when the dataset is missing.
    pub download: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("datasets"),
            artifact_dir: PathBuf::from("artifacts"),
            num_epochs: 10,
            batch_size: 7,
            learning_rate: 4e-5,
            test_ratio: 0.3,
            val_ratio: 0.3,
            sample_limit: Some(100),
            seed: 42,
            num_workers: 4,
            download: true,
        }
    }
}

/// Configuration for prediction-panel rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictConfig {
    /// Root directory of the extracted dataset.
    pub data_root: PathBuf,
    /// Output directory for the rendered panels.
    pub output_dir: PathBuf,
    /// Number of test samples to render.
    pub num_samples: usize,
    /// Binarization threshold for the predicted mask. `None` keeps the
    /// soft probability map.
    pub threshold: Option<f32>,
    /// Split settings; must match the training run so the rendered
    /// samples come from the held-out test split.
    pub test_ratio: f64,
    pub val_ratio: f64,
    pub sample_limit: Option<usize>,
    pub seed: u64,
}

impl Default for PredictConfig {
    fn default() -> Self {
        Self {
            data_root: PathBuf::from("datasets"),
            output_dir: PathBuf::from("outputs"),
            num_samples: 3,
            threshold: None,
            test_ratio: 0.3,
            val_ratio: 0.3,
            sample_limit: Some(100),
            seed: 42,
        }
    }
}
