//! Binary pixel accuracy metric.

use burn::{
    prelude::*,
    tensor::{backend::Backend, ElementConversion, Tensor},
    train::metric::{
        state::{FormatOptions, NumericMetricState},
        Metric, MetricEntry, MetricMetadata, Numeric,
    },
};
use std::marker::PhantomData;

use crate::metrics::input::AccuracyInput;

// --- Pixel Accuracy Metric ---

#[derive(Config, Debug)]
pub struct PixelAccuracyMetricConfig {
    #[config(default = 0.5)]
    pub threshold: f32,
}

/// Fraction of pixels whose thresholded prediction matches the binary
/// target.
pub struct PixelAccuracyMetric<B: Backend> {
    state: NumericMetricState,
    threshold: f32,
    _b: PhantomData<B>,
}

impl PixelAccuracyMetricConfig {
    pub fn init<B: Backend>(&self) -> PixelAccuracyMetric<B> {
        PixelAccuracyMetric {
            state: NumericMetricState::default(),
            threshold: self.threshold,
            _b: PhantomData,
        }
    }
}

impl<B: Backend> Default for PixelAccuracyMetric<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> PixelAccuracyMetric<B> {
    pub fn new() -> Self {
        PixelAccuracyMetricConfig::new().init()
    }
}

impl<B: Backend> Metric for PixelAccuracyMetric<B> {
    type Input = AccuracyInput<B>;

    fn name(&self) -> String {
        "Accuracy".to_string()
    }

    fn update(&mut self, item: &Self::Input, _metadata: &MetricMetadata) -> MetricEntry {
        let batch_size = item.predictions.dims()[0];
        let value = calculate_accuracy(
            item.predictions.clone(),
            item.targets.clone(),
            self.threshold,
        );

        self.state.update(
            f64::from(value),
            batch_size,
            FormatOptions::new(self.name()).precision(5),
        )
    }

    fn clear(&mut self) {
        self.state.reset();
    }
}

impl<B: Backend> Numeric for PixelAccuracyMetric<B> {
    fn value(&self) -> f64 {
        self.state.value()
    }
}

/// Calculate pixel accuracy using a simple function interface.
///
/// Predictions are passed through a sigmoid and binarized at `threshold`;
/// targets are binarized at 0.5.
pub fn calculate_accuracy<B: Backend>(
    predictions: Tensor<B, 4>,
    targets: Tensor<B, 4>,
    threshold: f32,
) -> f32 {
    let preds_sigmoid = burn::tensor::activation::sigmoid(predictions);
    let preds_binary = preds_sigmoid.greater_elem(threshold).float();
    let targets_binary = targets.greater_elem(0.5).float();

    // Both tensors hold exactly {0, 1}, so the absolute difference is 1 on
    // every mismatched pixel.
    let mismatch = (preds_binary - targets_binary).abs().mean();
    let accuracy = Tensor::ones_like(&mismatch) - mismatch;

    accuracy.into_scalar().elem::<f32>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn matching_masks_give_full_accuracy() {
        let device = Default::default();
        // Large positive logits sigmoid to ~1, matching an all-ones target.
        let pred = Tensor::<TestBackend, 4>::ones([1, 1, 8, 8], &device) * 10.0;
        let target = Tensor::<TestBackend, 4>::ones([1, 1, 8, 8], &device);

        let accuracy = calculate_accuracy(pred, target, 0.5);
        assert!((accuracy - 1.0).abs() < 1e-6);
    }

    #[test]
    fn complementary_masks_give_zero_accuracy() {
        let device = Default::default();
        let pred = Tensor::<TestBackend, 4>::ones([1, 1, 8, 8], &device) * 10.0;
        let target = Tensor::<TestBackend, 4>::zeros([1, 1, 8, 8], &device);

        let accuracy = calculate_accuracy(pred, target, 0.5);
        assert!(accuracy < 1e-6);
    }
}
