//! Loss functions for lesion segmentation training.

pub mod dice;

pub use dice::{dice_coefficient, dice_loss, DiceLoss, DiceLossConfig};
