//! Dataset fetch entry point.
//!
//! Downloads the ISIC-2018 Task 1 training archive and extracts it under
//! the data root. Both steps are skipped when their outputs already exist.
//!
//! ```bash
//! cargo run --bin fetch
//! cargo run --bin fetch -- --data-root /data/isic2018
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use lesionseg_burn::isic;
use log::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory to download and extract the archive into
    #[arg(long, default_value = "datasets")]
    data_root: PathBuf,

    /// Archive URL
    #[arg(long, default_value = isic::DATASET_URL)]
    url: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    lesionseg_burn::fetch_dataset(&args.url, &args.data_root)
        .with_context(|| format!("Failed to fetch dataset into {}", args.data_root.display()))?;

    info!(
        "Dataset ready under {}",
        args.data_root.join(isic::IMAGE_DIR).display()
    );
    Ok(())
}
