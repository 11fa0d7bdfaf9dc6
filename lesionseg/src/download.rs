//! Dataset archive download and extraction.
//!
//! Mirrors a cache-and-extract flow: the archive is fetched once into the
//! data root, extracted in place, and both steps are skipped on later runs
//! when their outputs already exist. Any failure surfaces as
//! [`LesionSegError::Download`]; there are no retries.

use std::{fs, io, path::Path};

use log::info;

use crate::{
    error::{LesionSegError, LesionSegResult},
    isic,
};

fn download_error(reason: impl ToString) -> LesionSegError {
    LesionSegError::Download {
        reason: reason.to_string(),
    }
}

/// Ensure the training data is present under `data_root`.
///
/// Downloads the archive from `url` when neither the extracted directories
/// nor the archive file exist yet, then extracts it. Returns once
/// `data_root` contains the extracted input directory.
pub fn fetch_dataset(url: &str, data_root: &Path) -> LesionSegResult<()> {
    fs::create_dir_all(data_root).map_err(download_error)?;

    let image_root = data_root.join(isic::IMAGE_DIR);
    if image_root.is_dir() {
        info!("Dataset already extracted at {}", image_root.display());
        return Ok(());
    }

    let archive_path = data_root.join(isic::ARCHIVE_NAME);
    if !archive_path.is_file() {
        info!("Downloading {url}");

        let mut response = reqwest::blocking::get(url).map_err(download_error)?;
        if !response.status().is_success() {
            return Err(download_error(format!(
                "server returned {} for {url}",
                response.status()
            )));
        }

        let mut file = fs::File::create(&archive_path).map_err(download_error)?;
        io::copy(&mut response, &mut file).map_err(download_error)?;
    }

    info!("Extracting {}", archive_path.display());
    extract_archive(&archive_path, data_root)?;

    if !image_root.is_dir() {
        return Err(download_error(format!(
            "archive did not contain {}",
            isic::IMAGE_DIR
        )));
    }

    Ok(())
}

/// Extract a zip archive into `dest`.
fn extract_archive(archive_path: &Path, dest: &Path) -> LesionSegResult<()> {
    let file = fs::File::open(archive_path).map_err(download_error)?;
    let mut archive = zip::ZipArchive::new(file).map_err(download_error)?;
    archive.extract(dest).map_err(download_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_url_is_a_download_error() {
        let dir = std::env::temp_dir().join("lesionseg_fetch_test");
        let result = fetch_dataset("http://127.0.0.1:9/archive.zip", &dir);
        assert!(matches!(result, Err(LesionSegError::Download { .. })));
    }

    #[test]
    fn corrupt_archive_is_a_download_error() {
        let dir = std::env::temp_dir().join("lesionseg_extract_test");
        fs::create_dir_all(&dir).unwrap();

        let archive_path = dir.join("not_a_zip.zip");
        fs::write(&archive_path, b"definitely not a zip archive").unwrap();

        let result = extract_archive(&archive_path, &dir);
        assert!(matches!(result, Err(LesionSegError::Download { .. })));
    }
}
