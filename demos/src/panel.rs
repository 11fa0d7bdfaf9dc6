//! Side-by-side panel rendering for prediction review.

use anyhow::{Context, Result};
use burn::tensor::{backend::Backend, DType, Tensor};
use image::{imageops, GrayImage};

/// Convert a `[1, H, W]` tensor with values in `[0, 1]` into a grayscale
/// image.
pub fn to_gray_image<B: Backend>(tensor: Tensor<B, 3>) -> Result<GrayImage> {
    let [channels, height, width] = tensor.dims();
    if channels != 1 {
        anyhow::bail!("Expected a single-channel tensor, got {channels} channels");
    }

    let data = tensor
        .into_data()
        .convert_dtype(DType::F32)
        .to_vec::<f32>()
        .map_err(|err| anyhow::anyhow!("Failed to convert tensor to f32: {err:#?}"))?;

    let pixels = data
        .iter()
        .map(|value| (value.clamp(0.0, 1.0) * 255.0).round() as u8)
        .collect();

    GrayImage::from_raw(width as u32, height as u32, pixels)
        .context("Failed to create grayscale image buffer")
}

/// Place equally-sized columns next to each other on one canvas.
pub fn compose_panel(columns: &[GrayImage]) -> Result<GrayImage> {
    let first = columns.first().context("Panel needs at least one column")?;
    let (width, height) = first.dimensions();

    if columns.iter().any(|img| img.dimensions() != (width, height)) {
        anyhow::bail!("All panel columns must share the same dimensions");
    }

    let mut canvas = GrayImage::new(width * columns.len() as u32, height);
    for (index, column) in columns.iter().enumerate() {
        imageops::replace(&mut canvas, column, i64::from(width) * index as i64, 0);
    }

    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::Tensor;

    type TestBackend = NdArray<f32>;

    #[test]
    fn tensor_renders_to_matching_image() {
        let device = Default::default();
        let tensor = Tensor::<TestBackend, 3>::ones([1, 4, 6], &device);

        let img = to_gray_image(tensor).unwrap();
        assert_eq!(img.dimensions(), (6, 4));
        assert!(img.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn panel_concatenates_columns() {
        let a = GrayImage::from_pixel(2, 2, image::Luma([0]));
        let b = GrayImage::from_pixel(2, 2, image::Luma([255]));

        let panel = compose_panel(&[a, b]).unwrap();
        assert_eq!(panel.dimensions(), (4, 2));
        assert_eq!(panel.get_pixel(0, 0).0[0], 0);
        assert_eq!(panel.get_pixel(2, 0).0[0], 255);
    }

    #[test]
    fn mismatched_columns_are_rejected() {
        let a = GrayImage::new(2, 2);
        let b = GrayImage::new(3, 2);

        assert!(compose_panel(&[a, b]).is_err());
    }
}
