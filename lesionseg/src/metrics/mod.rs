//! Training and evaluation metrics for lesion segmentation.
//!
//! Each metric implements Burn's `Metric`/`Numeric` traits for use on the
//! learner dashboard, and ships a plain-function twin for ad-hoc use
//! outside the training loop.

pub mod accuracy;
pub mod aggregator;
pub mod dice;
pub mod input;
pub mod loss;

pub use accuracy::{calculate_accuracy, PixelAccuracyMetric, PixelAccuracyMetricConfig};
pub use aggregator::MetricsAggregator;
pub use dice::{calculate_dice, DiceMetric, DiceMetricConfig};
pub use input::{AccuracyInput, DiceInput, LossInput};
pub use loss::LossMetric;
