//! Segmentation model for lesion masks.

pub mod blocks;
pub mod unet;

pub use blocks::{ConvBlock, ConvBlockConfig, DownBlock, DownBlockConfig, UpBlock, UpBlockConfig};
pub use unet::{UNet, UNetConfig, UNetRecord};
