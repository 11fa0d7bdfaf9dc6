//! Layout constants for the ISIC-2018 Task 1 training data.
//!
//! The archive extracts into two sibling directories under the data root:
//! dermoscopy JPEGs in the input directory, and one `*_segmentation.png`
//! ground-truth mask per image in the ground-truth directory, paired by
//! their `ISIC_<id>` stem.

/// Fixed URL of the ISIC-2018 Task 1-2 training archive.
pub const DATASET_URL: &str =
    "https://cloudstor.aarnet.edu.au/sender/?s=download&token=723595dd-15b0-4d1e-87b8-237a7fe282ff";

/// File name the archive is stored under before extraction.
pub const ARCHIVE_NAME: &str = "ISIC2018_Task1-2_Training_Data.zip";

/// Directory holding the dermoscopy input images (`*.jpg`).
pub const IMAGE_DIR: &str = "ISIC2018_Task1-2_Training_Input_x2";

/// Directory holding the lesion ground-truth masks (`*_segmentation.png`).
pub const MASK_DIR: &str = "ISIC2018_Task1_Training_GroundTruth_x2";

/// Suffix that turns an image stem into its mask file name.
pub const MASK_SUFFIX: &str = "_segmentation.png";
