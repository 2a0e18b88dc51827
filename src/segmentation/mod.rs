mod manifest;
pub mod types;

pub use manifest::ManifestSegmenter;
pub use types::{Detection, DetectionResult, ObjectChoice, Segmenter};

use anyhow::Result;
use std::path::Path;

/// Create the default segmentation backend (precomputed mask manifest)
pub fn create_default_segmenter<P: AsRef<Path>>(manifest_path: P) -> Result<Box<dyn Segmenter>> {
    let segmenter = ManifestSegmenter::new(manifest_path)?;
    Ok(Box::new(segmenter))
}
