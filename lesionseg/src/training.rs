//! Training integration for the U-Net model.
//!
//! Implements the `TrainStep` and `ValidStep` traits so the model plugs
//! into Burn's learner, wires the step output into every dashboard metric,
//! and provides whole-split evaluation for the held-out test set.

use std::sync::Arc;

use burn::{
    data::dataloader::DataLoader,
    prelude::*,
    tensor::{
        backend::{AutodiffBackend, Backend},
        ElementConversion, Transaction,
    },
    train::{
        metric::{Adaptor, ItemLazy},
        TrainOutput, TrainStep, ValidStep,
    },
};

use crate::{
    dataset::LesionBatch,
    losses::DiceLoss,
    metrics::{AccuracyInput, DiceInput, LossInput, MetricsAggregator},
    models::UNet,
};

/// Output of one training or validation step.
#[derive(Debug, Clone)]
pub struct SegmentationOutput<B: Backend> {
    pub logits: Tensor<B, 4>,
    pub targets: Tensor<B, 4>,
    pub loss: Tensor<B, 1>,
}

impl<B: Backend> ItemLazy for SegmentationOutput<B> {
    type ItemSync = Self;

    fn sync(self) -> Self::ItemSync {
        let transaction_result = Transaction::default()
            .register(self.logits)
            .register(self.targets)
            .register(self.loss)
            .execute();

        let [logits, targets, loss] = transaction_result.try_into().unwrap_or_else(|_| {
            panic!("Expected exactly 3 tensors back from the sync transaction: [logits, targets, loss]")
        });

        let device = &Default::default();

        Self {
            logits: Tensor::from_data(logits, device),
            targets: Tensor::from_data(targets, device),
            loss: Tensor::from_data(loss, device),
        }
    }
}

impl<B: Backend> Adaptor<DiceInput<B>> for SegmentationOutput<B> {
    fn adapt(&self) -> DiceInput<B> {
        DiceInput {
            predictions: self.logits.clone(),
            targets: self.targets.clone(),
        }
    }
}

impl<B: Backend> Adaptor<AccuracyInput<B>> for SegmentationOutput<B> {
    fn adapt(&self) -> AccuracyInput<B> {
        AccuracyInput {
            predictions: self.logits.clone(),
            targets: self.targets.clone(),
        }
    }
}

impl<B: Backend> Adaptor<LossInput<B>> for SegmentationOutput<B> {
    fn adapt(&self) -> LossInput<B> {
        LossInput {
            loss: self.loss.clone(),
            batch_size: self.logits.dims()[0],
        }
    }
}

impl<B: Backend> UNet<B> {
    /// Run the model on a batch and attach the Dice loss.
    pub fn forward_segmentation(
        &self,
        images: Tensor<B, 4>,
        targets: Tensor<B, 4>,
    ) -> SegmentationOutput<B> {
        let logits = self.forward(images);
        let loss = DiceLoss::new().forward(logits.clone(), targets.clone());

        SegmentationOutput {
            logits,
            targets,
            loss,
        }
    }
}

impl<B: AutodiffBackend> TrainStep<LesionBatch<B>, SegmentationOutput<B>> for UNet<B> {
    fn step(&self, batch: LesionBatch<B>) -> TrainOutput<SegmentationOutput<B>> {
        let output = self.forward_segmentation(batch.images, batch.masks);
        let gradients = output.loss.backward();

        TrainOutput::new(self, gradients, output)
    }
}

impl<B: Backend> ValidStep<LesionBatch<B>, SegmentationOutput<B>> for UNet<B> {
    fn step(&self, batch: LesionBatch<B>) -> SegmentationOutput<B> {
        self.forward_segmentation(batch.images, batch.masks)
    }
}

/// Averaged metrics over an evaluation split.
#[derive(Debug, Clone, Copy)]
pub struct EvalReport {
    pub dice: f32,
    pub accuracy: f32,
    pub loss: f32,
}

/// Evaluate a trained model over every batch of a data loader.
pub fn evaluate<B: Backend>(
    model: &UNet<B>,
    loader: Arc<dyn DataLoader<B, LesionBatch<B>>>,
) -> EvalReport {
    let mut aggregator = MetricsAggregator::new();

    for batch in loader.iter() {
        let output = model.forward_segmentation(batch.images, batch.masks);
        let loss = output.loss.into_scalar().elem::<f32>();
        aggregator.update(output.logits, output.targets, loss);
    }

    let (dice, accuracy, loss) = aggregator.averages();
    EvalReport {
        dice,
        accuracy,
        loss,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn forward_segmentation_produces_finite_loss() {
        let device = Default::default();
        let model = crate::models::UNetConfig::new()
            .with_base_channels(2)
            .with_depth(1)
            .init::<TestBackend>(&device)
            .unwrap();

        let images = Tensor::<TestBackend, 4>::zeros([2, 1, 16, 16], &device);
        let masks = Tensor::<TestBackend, 4>::ones([2, 1, 16, 16], &device);

        let output = model.forward_segmentation(images, masks);
        assert_eq!(output.logits.dims(), [2, 1, 16, 16]);

        let loss = output.loss.into_scalar();
        assert!(loss.is_finite());
    }

    #[test]
    fn loss_adaptor_reports_batch_size() {
        let device = Default::default();
        let output = SegmentationOutput {
            logits: Tensor::<TestBackend, 4>::zeros([3, 1, 8, 8], &device),
            targets: Tensor::<TestBackend, 4>::zeros([3, 1, 8, 8], &device),
            loss: Tensor::<TestBackend, 1>::zeros([1], &device),
        };

        let input: LossInput<TestBackend> = output.adapt();
        assert_eq!(input.batch_size, 3);
    }
}
