//! Metric aggregation for whole-split evaluation.

use burn::tensor::{backend::Backend, Tensor};

use crate::metrics::{accuracy::calculate_accuracy, dice::calculate_dice};

/// Accumulates Dice, accuracy, and loss over evaluation batches.
#[derive(Debug, Clone)]
pub struct MetricsAggregator<B: Backend> {
    dice_sum: f32,
    accuracy_sum: f32,
    loss_sum: f32,
    count: usize,
    _phantom: std::marker::PhantomData<B>,
}

impl<B: Backend> MetricsAggregator<B> {
    /// Create a new metrics aggregator.
    pub const fn new() -> Self {
        Self {
            dice_sum: 0.0,
            accuracy_sum: 0.0,
            loss_sum: 0.0,
            count: 0,
            _phantom: std::marker::PhantomData,
        }
    }

    /// Add one batch of logits, targets, and the batch loss.
    pub fn update(&mut self, predictions: Tensor<B, 4>, targets: Tensor<B, 4>, loss: f32) {
        self.dice_sum += calculate_dice(predictions.clone(), targets.clone(), 1.0, true);
        self.accuracy_sum += calculate_accuracy(predictions, targets, 0.5);
        self.loss_sum += loss;
        self.count += 1;
    }

    /// Get the average (dice, accuracy, loss).
    pub fn averages(&self) -> (f32, f32, f32) {
        if self.count == 0 {
            return (0.0, 0.0, 0.0);
        }

        let count = self.count as f32;
        (
            self.dice_sum / count,
            self.accuracy_sum / count,
            self.loss_sum / count,
        )
    }

    /// Reset the aggregator.
    pub const fn reset(&mut self) {
        self.dice_sum = 0.0;
        self.accuracy_sum = 0.0;
        self.loss_sum = 0.0;
        self.count = 0;
    }
}

impl<B: Backend> Default for MetricsAggregator<B> {
    fn default() -> Self {
        Self::new()
    }
}
