//! Dice coefficient metric for segmentation quality tracking.

use burn::{
    prelude::*,
    tensor::{backend::Backend, ElementConversion, Tensor},
    train::metric::{
        state::{FormatOptions, NumericMetricState},
        Metric, MetricEntry, MetricMetadata, Numeric,
    },
};
use std::marker::PhantomData;

use crate::metrics::input::DiceInput;

// --- Dice Metric ---

#[derive(Config, Debug)]
pub struct DiceMetricConfig {
    #[config(default = 1.0)]
    pub smooth: f32,
    #[config(default = true)]
    pub apply_sigmoid: bool,
}

pub struct DiceMetric<B: Backend> {
    state: NumericMetricState,
    smooth: f32,
    apply_sigmoid: bool,
    _b: PhantomData<B>,
}

impl DiceMetricConfig {
    pub fn init<B: Backend>(&self) -> DiceMetric<B> {
        DiceMetric {
            state: NumericMetricState::default(),
            smooth: self.smooth,
            apply_sigmoid: self.apply_sigmoid,
            _b: PhantomData,
        }
    }
}

impl<B: Backend> Default for DiceMetric<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> DiceMetric<B> {
    pub fn new() -> Self {
        DiceMetricConfig::new().init()
    }
}

impl<B: Backend> Metric for DiceMetric<B> {
    type Input = DiceInput<B>;

    fn name(&self) -> String {
        "Dice".to_string()
    }

    fn update(&mut self, item: &Self::Input, _metadata: &MetricMetadata) -> MetricEntry {
        let batch_size = item.predictions.dims()[0];
        let value = calculate_dice(
            item.predictions.clone(),
            item.targets.clone(),
            self.smooth,
            self.apply_sigmoid,
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

impl<B: Backend> Numeric for DiceMetric<B> {
    fn value(&self) -> f64 {
        self.state.value()
    }
}

/// Calculate the soft Dice coefficient using a simple function interface.
pub fn calculate_dice<B: Backend>(
    predictions: Tensor<B, 4>,
    targets: Tensor<B, 4>,
    smooth: f32,
    apply_sigmoid: bool,
) -> f32 {
    let predictions = if apply_sigmoid {
        burn::tensor::activation::sigmoid(predictions)
    } else {
        predictions
    };

    let intersection = (predictions.clone() * targets.clone()).sum();
    let total = predictions.sum() + targets.sum();
    let dice = (intersection + smooth) * 2.0 / (total + smooth);

    dice.into_scalar().elem::<f32>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn identical_masks_score_near_one() {
        let device = Default::default();
        let mask = Tensor::<TestBackend, 4>::ones([1, 1, 32, 32], &device);

        let dice = calculate_dice(mask.clone(), mask, 1.0, false);
        assert!((dice - 1.0).abs() < 1e-2);
    }

    #[test]
    fn disjoint_masks_score_near_zero() {
        let device = Default::default();
        let pred = Tensor::<TestBackend, 4>::ones([1, 1, 32, 32], &device);
        let target = Tensor::<TestBackend, 4>::zeros([1, 1, 32, 32], &device);

        let dice = calculate_dice(pred, target, 1.0, false);
        assert!(dice < 0.01);
    }
}
