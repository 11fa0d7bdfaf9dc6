use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig, ConvTranspose2d, ConvTranspose2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        BatchNorm, BatchNormConfig, PaddingConfig2d, Relu,
    },
    prelude::*,
};

/// Configuration for a double 3x3 convolution block.
#[derive(Config, Debug)]
pub struct ConvBlockConfig {
    in_channels: usize,
    out_channels: usize,
}

impl ConvBlockConfig {
    /// Initializes a `ConvBlock` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> ConvBlock<B> {
        let conv1 = Conv2dConfig::new([self.in_channels, self.out_channels], [3, 3])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init(device);
        let bn1 = BatchNormConfig::new(self.out_channels).init(device);

        let conv2 = Conv2dConfig::new([self.out_channels, self.out_channels], [3, 3])
            .with_padding(PaddingConfig2d::Explicit(1, 1))
            .init(device);
        let bn2 = BatchNormConfig::new(self.out_channels).init(device);

        ConvBlock {
            conv1,
            bn1,
            conv2,
            bn2,
            relu: Relu::new(),
        }
    }
}

/// Two 3x3 convolutions, each followed by batch normalization and ReLU.
#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    conv1: Conv2d<B>,
    bn1: BatchNorm<B, 2>,
    conv2: Conv2d<B>,
    bn2: BatchNorm<B, 2>,
    relu: Relu,
}

impl<B: Backend> ConvBlock<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.relu.forward(self.bn1.forward(self.conv1.forward(x)));
        self.relu.forward(self.bn2.forward(self.conv2.forward(x)))
    }
}

/// Configuration for an encoder stage.
#[derive(Config, Debug)]
pub struct DownBlockConfig {
    in_channels: usize,
    out_channels: usize,
}

impl DownBlockConfig {
    /// Initializes a `DownBlock` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> DownBlock<B> {
        DownBlock {
            pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            conv: ConvBlockConfig::new(self.in_channels, self.out_channels).init(device),
        }
    }
}

/// Encoder stage: 2x2 max-pooling followed by a [`ConvBlock`].
#[derive(Module, Debug)]
pub struct DownBlock<B: Backend> {
    pool: MaxPool2d,
    conv: ConvBlock<B>,
}

impl<B: Backend> DownBlock<B> {
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        self.conv.forward(self.pool.forward(x))
    }
}

/// Configuration for a decoder stage. The skip connection is expected to
/// carry `out_channels` channels.
#[derive(Config, Debug)]
pub struct UpBlockConfig {
    in_channels: usize,
    out_channels: usize,
}

impl UpBlockConfig {
    /// Initializes an `UpBlock` module.
    pub fn init<B: Backend>(&self, device: &Device<B>) -> UpBlock<B> {
        let upconv = ConvTranspose2dConfig::new([self.in_channels, self.out_channels], [2, 2])
            .with_stride([2, 2])
            .init(device);
        let conv = ConvBlockConfig::new(self.out_channels * 2, self.out_channels).init(device);

        UpBlock { upconv, conv }
    }
}

/// Decoder stage: 2x2 transposed convolution, skip concatenation, and a
/// [`ConvBlock`].
#[derive(Module, Debug)]
pub struct UpBlock<B: Backend> {
    upconv: ConvTranspose2d<B>,
    conv: ConvBlock<B>,
}

impl<B: Backend> UpBlock<B> {
    pub fn forward(&self, x: Tensor<B, 4>, skip: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.upconv.forward(x);
        self.conv.forward(Tensor::cat(vec![skip, x], 1))
    }
}
