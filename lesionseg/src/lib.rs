//! Skin-lesion segmentation for the ISIC-2018 challenge data, built on
//! Burn.
//!
//! The crate covers the full pipeline around the external training
//! runtime: archive fetch (`fetch` feature), image/mask preprocessing into
//! normalized 256x256 tensors, a U-Net model, a Dice loss, and the
//! metrics shown on the learner dashboard (`train` feature).

pub mod error;
pub mod isic;
pub mod losses;
pub mod models;

#[cfg(feature = "train")]
pub mod dataset;
#[cfg(feature = "fetch")]
pub mod download;
#[cfg(feature = "train")]
pub mod metrics;
#[cfg(feature = "train")]
pub mod preprocess;
#[cfg(feature = "train")]
pub mod training;

pub use error::{LesionSegError, LesionSegResult};
pub use losses::{DiceLoss, DiceLossConfig};
pub use models::{UNet, UNetConfig, UNetRecord};

#[cfg(feature = "train")]
pub use dataset::{
    collect_pairs, DatasetSplits, LesionBatch, LesionBatcher, LesionDataset, LesionItem,
    SplitConfig,
};
#[cfg(feature = "fetch")]
pub use download::fetch_dataset;
#[cfg(feature = "train")]
pub use metrics::{
    calculate_accuracy, calculate_dice, DiceMetric, LossMetric, MetricsAggregator,
    PixelAccuracyMetric,
};
#[cfg(feature = "train")]
pub use training::{evaluate, EvalReport, SegmentationOutput};
