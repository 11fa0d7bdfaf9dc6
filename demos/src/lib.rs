//! Runnable entry points for lesion segmentation.
//!
//! - `fetch`: download and extract the training archive
//! - `train`: full training run with live dashboard metrics
//! - `predict`: render side-by-side prediction panels from a trained model
//!
//! ```bash
//! # Fetch the dataset into ./datasets
//! cargo run --bin fetch
//!
//! # Train with the default configuration
//! cargo run --release --bin train
//!
//! # Render prediction panels for the held-out test samples
//! cargo run --release --bin predict -- artifacts/final_model.mpk
//! ```

pub mod backend;
pub mod config;
pub mod panel;

pub use backend::{create_device, get_backend_name, SelectedBackend, SelectedDevice};
pub use config::{PredictConfig, TrainingConfig};
