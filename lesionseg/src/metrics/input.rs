//! Input structures for the segmentation metrics.

use burn::{prelude::*, tensor::backend::Backend};

pub struct DiceInput<B: Backend> {
    pub predictions: Tensor<B, 4>,
    pub targets: Tensor<B, 4>,
}

impl<B: Backend> DiceInput<B> {
    pub const fn new(predictions: Tensor<B, 4>, targets: Tensor<B, 4>) -> Self {
        Self {
            predictions,
            targets,
        }
    }
}

pub struct AccuracyInput<B: Backend> {
    pub predictions: Tensor<B, 4>,
    pub targets: Tensor<B, 4>,
}

impl<B: Backend> AccuracyInput<B> {
    pub const fn new(predictions: Tensor<B, 4>, targets: Tensor<B, 4>) -> Self {
        Self {
            predictions,
            targets,
        }
    }
}

pub struct LossInput<B: Backend> {
    pub loss: Tensor<B, 1>,
    pub batch_size: usize,
}

impl<B: Backend> LossInput<B> {
    pub const fn new(loss: Tensor<B, 1>, batch_size: usize) -> Self {
        Self { loss, batch_size }
    }
}
