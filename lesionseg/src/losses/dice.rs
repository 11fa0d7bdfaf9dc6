//! Dice coefficient and its complement as a training loss.

use burn::{
    prelude::*,
    tensor::{backend::Backend, Tensor},
};

use crate::error::{LesionSegError, LesionSegResult};

/// Configuration for the Dice loss function.
#[derive(Config, Debug)]
pub struct DiceLossConfig {
    /// Smoothing constant added to numerator and denominator. Keeps the
    /// ratio well-defined on all-zero inputs.
    #[config(default = 1.0)]
    pub smooth: f32,
    /// Apply a sigmoid to the predictions before computing overlap.
    /// Training operates on logits, so this defaults to `true`.
    #[config(default = true)]
    pub apply_sigmoid: bool,
}

/// Dice loss for binary segmentation.
///
/// The Dice coefficient measures the overlap between two equally-shaped
/// tensors as `2 * (sum(x * y) + s) / (sum(x) + sum(y) + s)` with
/// smoothing constant `s`; the loss is its complement `1 - dice`. Both are
/// pure tensor reductions with no side effects.
#[derive(Module, Debug)]
pub struct DiceLoss<B: Backend> {
    pub smooth: f32,
    pub apply_sigmoid: bool,
    _phantom: std::marker::PhantomData<B>,
}

impl DiceLossConfig {
    /// Initialize a new Dice loss function with the given configuration.
    pub const fn init<B: Backend>(&self) -> DiceLoss<B> {
        DiceLoss {
            smooth: self.smooth,
            apply_sigmoid: self.apply_sigmoid,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<B: Backend> Default for DiceLoss<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> DiceLoss<B> {
    /// Create a new Dice loss function with default configuration.
    pub fn new() -> Self {
        DiceLossConfig::new().init()
    }

    /// Calculate the Dice loss `1 - dice(pred, target)`.
    ///
    /// # Arguments
    /// * `pred` - Predicted segmentation map with shape [N, C, H, W]
    /// * `target` - Ground truth segmentation map with shape [N, C, H, W]
    pub fn forward(&self, pred: Tensor<B, 4>, target: Tensor<B, 4>) -> Tensor<B, 1> {
        let pred = if self.apply_sigmoid {
            burn::tensor::activation::sigmoid(pred)
        } else {
            pred
        };

        let dice = self.dice_coefficient(pred, target);
        Tensor::ones_like(&dice) - dice
    }

    /// Calculate the Dice coefficient between two equally-shaped tensors.
    ///
    /// Inputs are flattened, so only the total element count matters. The
    /// result is a scalar tensor in `(0, 2]`, practically `[0, 1]` for
    /// binary-valued inputs. All-zero inputs yield `1.0` at the default
    /// smoothing of one.
    pub fn dice_coefficient(&self, x: Tensor<B, 4>, y: Tensor<B, 4>) -> Tensor<B, 1> {
        let intersection = (x.clone() * y.clone()).sum();
        let total = x.sum() + y.sum();

        (intersection + self.smooth) * 2.0 / (total + self.smooth)
    }
}

/// Dice coefficient over flat slices, with an explicit length check.
///
/// # Errors
///
/// Returns [`LesionSegError::Shape`] when the slices differ in length.
pub fn dice_coefficient(x: &[f32], y: &[f32], smooth: f32) -> LesionSegResult<f32> {
    if x.len() != y.len() {
        return Err(LesionSegError::Shape {
            expected: x.len().to_string(),
            actual: y.len().to_string(),
        });
    }

    let intersection: f32 = x.iter().zip(y).map(|(a, b)| a * b).sum();
    let total: f32 = x.iter().sum::<f32>() + y.iter().sum::<f32>();

    Ok(2.0 * (intersection + smooth) / (total + smooth))
}

/// Dice loss over flat slices: `1 - dice_coefficient(x, y)`.
pub fn dice_loss(x: &[f32], y: &[f32], smooth: f32) -> LesionSegResult<f32> {
    Ok(1.0 - dice_coefficient(x, y, smooth)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn self_similarity_is_near_one() {
        let device = Default::default();
        let loss = DiceLossConfig::new().with_apply_sigmoid(false).init::<TestBackend>();

        let x = Tensor::<TestBackend, 4>::ones([1, 1, 16, 16], &device);
        let dice = loss.dice_coefficient(x.clone(), x).into_scalar();

        assert!((dice - 1.0).abs() < 1e-2, "dice(x, x) should be close to 1, got {dice}");
    }

    #[test]
    fn all_zero_inputs_are_well_defined() {
        let device = Default::default();
        let loss = DiceLossConfig::new().with_apply_sigmoid(false).init::<TestBackend>();

        let zeros = Tensor::<TestBackend, 4>::zeros([1, 1, 8, 8], &device);
        let dice = loss.dice_coefficient(zeros.clone(), zeros).into_scalar();

        assert_eq!(dice, 1.0, "smoothing should make the empty-mask case exact");
    }

    #[test]
    fn four_element_all_ones() {
        // 2 * (4 + 1) / (4 + 4 + 1) = 10 / 9
        let dice = dice_coefficient(&[1.0; 4], &[1.0; 4], 1.0).unwrap();
        assert!((dice - 10.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn half_overlap() {
        // intersection 1, sums 2 + 2: 2 * (1 + 1) / (2 + 2 + 1) = 0.8
        let x = [1.0, 0.0, 1.0, 0.0];
        let y = [1.0, 1.0, 0.0, 0.0];

        let dice = dice_coefficient(&x, &y, 1.0).unwrap();
        assert!((dice - 0.8).abs() < 1e-6);
    }

    #[test]
    fn loss_is_complement_of_coefficient() {
        let x = [1.0, 0.0, 1.0, 0.0];
        let y = [1.0, 1.0, 0.0, 0.0];

        let dice = dice_coefficient(&x, &y, 1.0).unwrap();
        let loss = dice_loss(&x, &y, 1.0).unwrap();
        assert!((loss - (1.0 - dice)).abs() < 1e-6);
    }

    #[test]
    fn length_mismatch_is_a_shape_error() {
        let result = dice_coefficient(&[1.0, 0.0], &[1.0], 1.0);
        assert!(matches!(result, Err(LesionSegError::Shape { .. })));
    }

    #[test]
    fn forward_matches_manual_complement() {
        let device = Default::default();
        let loss = DiceLossConfig::new().with_apply_sigmoid(false).init::<TestBackend>();

        let x = Tensor::<TestBackend, 4>::ones([1, 1, 2, 2], &device);
        let y = Tensor::<TestBackend, 4>::ones([1, 1, 2, 2], &device);

        let value = loss.forward(x, y).into_scalar();
        assert!((value - (1.0 - 10.0 / 9.0)).abs() < 1e-6);
    }
}
