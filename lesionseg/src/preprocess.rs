//! Image and mask preprocessing for the lesion dataset.
//!
//! Every sample is decoded as single-channel luma, resized to a fixed
//! 256x256 grid with bilinear filtering, and scaled into `[0, 1]`. Masks
//! are additionally rounded so their values are exactly `{0, 1}` rather
//! than merely normalized. The functions here are pure per-sample
//! transforms; shuffling, batching, and any parallel loading are owned by
//! the data loader.

use std::path::Path;

use burn::tensor::{backend::Backend, Tensor, TensorData};
use image::imageops::{self, FilterType};

use crate::error::{LesionSegError, LesionSegResult};

/// Height and width every sample is resized to.
pub const TARGET_SIZE: usize = 256;

/// Decode a file as grayscale, resize it to the target grid, and scale the
/// pixel values into `[0, 1]`.
fn decode_luma(path: &Path) -> LesionSegResult<Vec<f32>> {
    let img = image::open(path).map_err(|err| LesionSegError::Decode {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;

    let img = imageops::resize(
        &img.into_luma8(),
        TARGET_SIZE as u32,
        TARGET_SIZE as u32,
        FilterType::Triangle,
    );

    Ok(img.into_raw().iter().map(|&p| f32::from(p) / 255.0).collect())
}

/// Pack normalized pixel values into a `[1, 256, 256]` CHW tensor.
fn to_tensor<B: Backend>(pixels: Vec<f32>, device: &B::Device) -> LesionSegResult<Tensor<B, 3>> {
    if pixels.len() != TARGET_SIZE * TARGET_SIZE {
        return Err(LesionSegError::Shape {
            expected: format!("{} elements for [1, {TARGET_SIZE}, {TARGET_SIZE}]", TARGET_SIZE * TARGET_SIZE),
            actual: pixels.len().to_string(),
        });
    }

    let data = TensorData::new(pixels, [1, TARGET_SIZE, TARGET_SIZE]);
    Ok(Tensor::from_data(data, device))
}

/// Decode a ground-truth mask into a binary `[1, 256, 256]` tensor.
///
/// The mask is resized with the same bilinear filter as the image, scaled
/// into `[0, 1]`, then rounded to the nearest of `{0, 1}`.
///
/// # Errors
///
/// Returns [`LesionSegError::Decode`] when the file is missing or not
/// decodable, and [`LesionSegError::Shape`] when the decoded buffer cannot
/// form the target shape.
pub fn load_mask<B: Backend>(path: &Path, device: &B::Device) -> LesionSegResult<Tensor<B, 3>> {
    let pixels = decode_luma(path)?;
    Ok(to_tensor::<B>(pixels, device)?.round())
}

/// Decode a dermoscopy image and its mask into a matched tensor pair.
///
/// The image branch keeps its normalized intensities; the mask branch is
/// binarized by [`load_mask`]. Both tensors come out as `[1, 256, 256]`.
pub fn load_pair<B: Backend>(
    image_path: &Path,
    mask_path: &Path,
    device: &B::Device,
) -> LesionSegResult<(Tensor<B, 3>, Tensor<B, 3>)> {
    let image = to_tensor::<B>(decode_luma(image_path)?, device)?;
    let mask = load_mask::<B>(mask_path, device)?;
    Ok((image, mask))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use image::{GrayImage, Luma};

    type TestBackend = NdArray<f32>;

    fn write_gradient_png(name: &str) -> std::path::PathBuf {
        let mut img = GrayImage::new(64, 48);
        for (x, y, pixel) in img.enumerate_pixels_mut() {
            *pixel = Luma([((x * 4 + y) % 256) as u8]);
        }
        let path = std::env::temp_dir().join(name);
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn mask_values_are_binary() {
        let device = Default::default();
        let path = write_gradient_png("lesionseg_mask_binary.png");

        let mask = load_mask::<TestBackend>(&path, &device).unwrap();
        assert_eq!(mask.dims(), [1, TARGET_SIZE, TARGET_SIZE]);

        let values = mask.into_data().to_vec::<f32>().unwrap();
        assert!(values.iter().all(|&v| v == 0.0 || v == 1.0));
    }

    #[test]
    fn pair_has_target_shape() {
        let device = Default::default();
        let image_path = write_gradient_png("lesionseg_pair_image.png");
        let mask_path = write_gradient_png("lesionseg_pair_mask.png");

        let (image, mask) = load_pair::<TestBackend>(&image_path, &mask_path, &device).unwrap();
        assert_eq!(image.dims(), [1, TARGET_SIZE, TARGET_SIZE]);
        assert_eq!(mask.dims(), [1, TARGET_SIZE, TARGET_SIZE]);

        let values = image.into_data().to_vec::<f32>().unwrap();
        assert!(values.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let device = Default::default();
        let path = Path::new("/nonexistent/lesionseg_missing.png");

        match load_mask::<TestBackend>(path, &device) {
            Err(LesionSegError::Decode { path, .. }) => {
                assert!(path.contains("lesionseg_missing"));
            }
            other => panic!("expected a decode error, got {other:?}"),
        }
    }
}
