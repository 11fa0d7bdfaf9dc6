//! U-Net encoder-decoder for binary lesion segmentation.

use burn::{
    nn::conv::{Conv2d, Conv2dConfig},
    prelude::*,
};

use crate::error::{LesionSegError, LesionSegResult};

use super::blocks::{
    ConvBlock, ConvBlockConfig, DownBlock, DownBlockConfig, UpBlock, UpBlockConfig,
};

/// Configuration for the U-Net model.
#[derive(Config, Debug)]
pub struct UNetConfig {
    /// Number of input channels. Dermoscopy images are decoded as
    /// grayscale, so this defaults to one.
    #[config(default = 1)]
    pub in_channels: usize,
    /// Number of output channels (one logit map for binary masks).
    #[config(default = 1)]
    pub out_channels: usize,
    /// Channel count of the first encoder stage; doubled at every
    /// subsequent stage.
    #[config(default = 64)]
    pub base_channels: usize,
    /// Number of down/up-sampling stages. Input spatial dimensions must be
    /// divisible by `2^depth`.
    #[config(default = 4)]
    pub depth: usize,
}

impl UNetConfig {
    /// Initializes a `UNet` model.
    ///
    /// # Errors
    ///
    /// Returns [`LesionSegError::InvalidConfiguration`] when any dimension
    /// is zero.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> LesionSegResult<UNet<B>> {
        self.validate()?;

        let input_conv = ConvBlockConfig::new(self.in_channels, self.base_channels).init(device);

        let mut channels = self.base_channels;
        let mut down_blocks = Vec::with_capacity(self.depth);
        for _ in 0..self.depth {
            down_blocks.push(DownBlockConfig::new(channels, channels * 2).init(device));
            channels *= 2;
        }

        let mut up_blocks = Vec::with_capacity(self.depth);
        for _ in 0..self.depth {
            up_blocks.push(UpBlockConfig::new(channels, channels / 2).init(device));
            channels /= 2;
        }

        let output_conv = Conv2dConfig::new([channels, self.out_channels], [1, 1]).init(device);

        Ok(UNet {
            input_conv,
            down_blocks,
            up_blocks,
            output_conv,
        })
    }

    /// Check the configuration for logical consistency.
    pub fn validate(&self) -> LesionSegResult<()> {
        for (name, value) in [
            ("in_channels", self.in_channels),
            ("out_channels", self.out_channels),
            ("base_channels", self.base_channels),
            ("depth", self.depth),
        ] {
            if value == 0 {
                return Err(LesionSegError::InvalidConfiguration {
                    reason: format!("{name} must be greater than 0"),
                });
            }
        }
        Ok(())
    }
}

/// U-Net: a contracting path over pooled feature maps, an expanding path
/// of transposed convolutions, and skip connections between the two.
///
/// `forward` maps `[N, in_channels, H, W]` to `[N, out_channels, H, W]`
/// logits; the loss and any mask rendering apply the sigmoid.
#[derive(Module, Debug)]
pub struct UNet<B: Backend> {
    input_conv: ConvBlock<B>,
    down_blocks: Vec<DownBlock<B>>,
    up_blocks: Vec<UpBlock<B>>,
    output_conv: Conv2d<B>,
}

impl<B: Backend> UNet<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let mut skips = Vec::with_capacity(self.down_blocks.len());

        let mut x = self.input_conv.forward(x);
        for down in &self.down_blocks {
            skips.push(x.clone());
            x = down.forward(x);
        }

        for (up, skip) in self.up_blocks.iter().zip(skips.into_iter().rev()) {
            x = up.forward(x, skip);
        }

        self.output_conv.forward(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn forward_preserves_spatial_dims() {
        let device = Default::default();
        let model = UNetConfig::new()
            .with_base_channels(4)
            .with_depth(2)
            .init::<TestBackend>(&device)
            .unwrap();

        let input = Tensor::<TestBackend, 4>::zeros([2, 1, 32, 32], &device);
        let output = model.forward(input);

        assert_eq!(output.dims(), [2, 1, 32, 32]);
    }

    #[test]
    fn zero_depth_is_rejected() {
        let device = Default::default();
        let result = UNetConfig::new().with_depth(0).init::<TestBackend>(&device);

        match result {
            Err(LesionSegError::InvalidConfiguration { reason }) => {
                assert!(reason.contains("depth"));
            }
            _ => panic!("Expected InvalidConfiguration error"),
        }
    }

    #[test]
    fn zero_base_channels_is_rejected() {
        let device = Default::default();
        let result = UNetConfig::new()
            .with_base_channels(0)
            .init::<TestBackend>(&device);

        assert!(matches!(
            result,
            Err(LesionSegError::InvalidConfiguration { .. })
        ));
    }
}
