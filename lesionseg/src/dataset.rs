//! Dataset implementation for lesion segmentation training.
//!
//! Image/mask path pairs are discovered once, split into train/val/test
//! lists, and decoded lazily per index. All shuffling-at-batch-time,
//! batching, and worker parallelism belong to Burn's data loader; this
//! module only supplies the per-sample transform.

use std::path::{Path, PathBuf};

use burn::data::{dataloader::batcher::Batcher, dataset::Dataset};
use burn::prelude::*;
use burn::tensor::{backend::Backend, Tensor};

use log::{info, warn};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use walkdir::WalkDir;

use crate::{
    error::{LesionSegError, LesionSegResult},
    isic, preprocess,
};

/// A single preprocessed sample: normalized image and binarized mask, both
/// `[1, 256, 256]`.
#[derive(Debug, Clone)]
pub struct LesionItem<B: Backend> {
    pub image: Tensor<B, 3>,
    pub mask: Tensor<B, 3>,
}

/// A batch of samples stacked along the leading dimension:
/// `[N, 1, 256, 256]` images and masks.
#[derive(Debug, Clone)]
pub struct LesionBatch<B: Backend> {
    pub images: Tensor<B, 4>,
    pub masks: Tensor<B, 4>,
}

/// Batcher converting vectors of [`LesionItem`] into a [`LesionBatch`].
#[derive(Clone, Default)]
pub struct LesionBatcher<B: Backend> {
    _phantom: std::marker::PhantomData<B>,
}

impl<B: Backend> LesionBatcher<B> {
    pub const fn new() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<B: Backend> Batcher<B, LesionItem<B>, LesionBatch<B>> for LesionBatcher<B> {
    fn batch(&self, items: Vec<LesionItem<B>>, _device: &B::Device) -> LesionBatch<B> {
        let mut images = Vec::with_capacity(items.len());
        let mut masks = Vec::with_capacity(items.len());

        for item in items {
            images.push(item.image);
            masks.push(item.mask);
        }

        LesionBatch {
            images: Tensor::stack(images, 0),
            masks: Tensor::stack(masks, 0),
        }
    }
}

/// Collect sorted (image, mask) path pairs from the extracted archive.
///
/// Dermoscopy JPEGs are paired with their `ISIC_<id>_segmentation.png`
/// masks; images without a mask are skipped with a warning. When
/// `sample_limit` is set, only the first N pairs in sorted order are kept.
pub fn collect_pairs(
    data_root: &Path,
    sample_limit: Option<usize>,
) -> LesionSegResult<Vec<(PathBuf, PathBuf)>> {
    let image_root = data_root.join(isic::IMAGE_DIR);
    let mask_root = data_root.join(isic::MASK_DIR);

    if !image_root.is_dir() {
        return Err(LesionSegError::Dataset {
            message: format!("Image directory does not exist: {}", image_root.display()),
        });
    }
    if !mask_root.is_dir() {
        return Err(LesionSegError::Dataset {
            message: format!("Mask directory does not exist: {}", mask_root.display()),
        });
    }

    let mut pairs = Vec::new();
    for entry in WalkDir::new(&image_root)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
    {
        let image_path = entry.path().to_path_buf();
        if !image_path.is_file() {
            continue;
        }

        let is_jpg = image_path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg"));
        if !is_jpg {
            continue;
        }

        let Some(stem) = image_path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };

        let mask_path = mask_root.join(format!("{stem}{}", isic::MASK_SUFFIX));
        if mask_path.is_file() {
            pairs.push((image_path, mask_path));
        } else {
            warn!("No mask found for image: {}", image_path.display());
        }
    }

    pairs.sort();
    if let Some(limit) = sample_limit {
        pairs.truncate(limit);
    }

    if pairs.is_empty() {
        return Err(LesionSegError::Dataset {
            message: format!("No image/mask pairs found in {}", image_root.display()),
        });
    }

    info!(
        "Found {} image/mask pairs in {}",
        pairs.len(),
        image_root.display()
    );
    Ok(pairs)
}

/// Configuration for the train/val/test partition.
///
/// The test split takes `test_ratio` of all pairs, and the validation
/// split takes `val_ratio` of the remainder, after one seeded shuffle.
#[derive(Config, Debug)]
pub struct SplitConfig {
    #[config(default = 0.3)]
    pub test_ratio: f64,
    #[config(default = 0.3)]
    pub val_ratio: f64,
    #[config(default = 42)]
    pub seed: u64,
}

/// The three disjoint path-pair lists produced by [`SplitConfig::split`].
#[derive(Debug, Clone)]
pub struct DatasetSplits {
    pub train: Vec<(PathBuf, PathBuf)>,
    pub val: Vec<(PathBuf, PathBuf)>,
    pub test: Vec<(PathBuf, PathBuf)>,
}

impl SplitConfig {
    /// Partition `pairs` into train/val/test lists.
    ///
    /// # Errors
    ///
    /// Returns [`LesionSegError::InvalidConfiguration`] when a ratio lies
    /// outside `(0, 1)`, and [`LesionSegError::Dataset`] when `pairs` is
    /// empty.
    pub fn split(&self, mut pairs: Vec<(PathBuf, PathBuf)>) -> LesionSegResult<DatasetSplits> {
        for (name, ratio) in [("test_ratio", self.test_ratio), ("val_ratio", self.val_ratio)] {
            if !(ratio > 0.0 && ratio < 1.0) {
                return Err(LesionSegError::InvalidConfiguration {
                    reason: format!("{name} must lie in (0, 1), got {ratio}"),
                });
            }
        }
        if pairs.is_empty() {
            return Err(LesionSegError::Dataset {
                message: "Cannot split an empty pair list".to_string(),
            });
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        pairs.shuffle(&mut rng);

        let test_len = (pairs.len() as f64 * self.test_ratio).round() as usize;
        let test = pairs.split_off(pairs.len() - test_len);

        let val_len = (pairs.len() as f64 * self.val_ratio).round() as usize;
        let val = pairs.split_off(pairs.len() - val_len);

        Ok(DatasetSplits {
            train: pairs,
            val,
            test,
        })
    }
}

/// Lesion dataset decoding image/mask pairs on demand.
pub struct LesionDataset<B: Backend> {
    items: Vec<(PathBuf, PathBuf)>,
    device: B::Device,
}

impl<B: Backend> LesionDataset<B> {
    /// Create a dataset over a list of (image, mask) path pairs.
    pub fn new(items: Vec<(PathBuf, PathBuf)>, device: &B::Device) -> Self {
        Self {
            items,
            device: device.clone(),
        }
    }
}

impl<B: Backend> Dataset<LesionItem<B>> for LesionDataset<B> {
    fn get(&self, index: usize) -> Option<LesionItem<B>> {
        let (image_path, mask_path) = self.items.get(index)?;

        let (image, mask) = preprocess::load_pair(image_path, mask_path, &self.device)
            .map_err(|err| warn!("Skipping sample {}: {err}", image_path.display()))
            .ok()?;

        Some(LesionItem { image, mask })
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    fn fake_pairs(count: usize) -> Vec<(PathBuf, PathBuf)> {
        (0..count)
            .map(|i| {
                (
                    PathBuf::from(format!("ISIC_{i:07}.jpg")),
                    PathBuf::from(format!("ISIC_{i:07}_segmentation.png")),
                )
            })
            .collect()
    }

    #[test]
    fn batcher_stacks_along_leading_dim() {
        let device = burn::backend::ndarray::NdArrayDevice::Cpu;
        let batcher = LesionBatcher::<TestBackend>::new();

        let items = (0..3)
            .map(|_| LesionItem {
                image: Tensor::<TestBackend, 3>::zeros([1, 32, 32], &device),
                mask: Tensor::<TestBackend, 3>::ones([1, 32, 32], &device),
            })
            .collect();

        let batch = batcher.batch(items, &device);
        assert_eq!(batch.images.dims(), [3, 1, 32, 32]);
        assert_eq!(batch.masks.dims(), [3, 1, 32, 32]);
    }

    #[test]
    fn split_sizes_follow_ratios() {
        let splits = SplitConfig::new().split(fake_pairs(100)).unwrap();

        // 30 test, then 30% of the remaining 70.
        assert_eq!(splits.test.len(), 30);
        assert_eq!(splits.val.len(), 21);
        assert_eq!(splits.train.len(), 49);
    }

    #[test]
    fn split_is_deterministic_and_disjoint() {
        let first = SplitConfig::new().split(fake_pairs(50)).unwrap();
        let second = SplitConfig::new().split(fake_pairs(50)).unwrap();

        assert_eq!(first.train, second.train);
        assert_eq!(first.val, second.val);
        assert_eq!(first.test, second.test);

        let mut all: Vec<_> = first
            .train
            .iter()
            .chain(&first.val)
            .chain(&first.test)
            .cloned()
            .collect();
        all.sort();
        all.dedup();
        assert_eq!(all.len(), 50);
    }

    #[test]
    fn split_rejects_out_of_range_ratio() {
        let result = SplitConfig::new().with_test_ratio(1.5).split(fake_pairs(10));
        assert!(matches!(
            result,
            Err(LesionSegError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn dataset_reports_length() {
        let device = burn::backend::ndarray::NdArrayDevice::Cpu;
        let dataset = LesionDataset::<TestBackend>::new(fake_pairs(7), &device);
        assert_eq!(dataset.len(), 7);
    }

    #[test]
    fn undecodable_sample_is_skipped() {
        let device = burn::backend::ndarray::NdArrayDevice::Cpu;
        let dataset = LesionDataset::<TestBackend>::new(fake_pairs(1), &device);
        // The fake paths do not exist on disk.
        assert!(dataset.get(0).is_none());
    }
}
