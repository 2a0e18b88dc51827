use super::types::{Detection, DetectionResult, Segmenter};
use crate::compositing::Mask;
use anyhow::{Context, Result};
use image::{imageops, GrayImage, RgbImage};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct Manifest {
    objects: Vec<ManifestEntry>,
}

#[derive(Debug, Deserialize)]
struct ManifestEntry {
    label: String,
    mask: PathBuf,
}

/// Segmentation backend serving precomputed masks
///
/// Reads a JSON manifest of the form
/// `{"objects": [{"label": "dog", "mask": "dog.png"}]}`, with mask paths
/// relative to the manifest. Masks are 8-bit grayscale images; any whose
/// size differs from the analyzed image is resized to match.
pub struct ManifestSegmenter {
    entries: Vec<(String, PathBuf)>,
}

impl ManifestSegmenter {
    pub fn new<P: AsRef<Path>>(manifest_path: P) -> Result<Self> {
        let path = manifest_path.as_ref();

        tracing::info!("Loading mask manifest from {}", path.display());

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        let manifest: Manifest = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse manifest {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let entries = manifest
            .objects
            .into_iter()
            .map(|entry| (entry.label, base.join(entry.mask)))
            .collect::<Vec<_>>();

        tracing::info!("Manifest lists {} objects", entries.len());

        Ok(Self { entries })
    }

    fn load_mask(path: &Path, width: u32, height: u32) -> Result<Mask> {
        let luma = image::open(path)
            .with_context(|| format!("Failed to load mask {}", path.display()))?
            .to_luma8();

        let luma: GrayImage = if luma.dimensions() != (width, height) {
            tracing::debug!(
                "Resizing mask {} from {:?} to {}x{}",
                path.display(),
                luma.dimensions(),
                width,
                height
            );
            imageops::resize(&luma, width, height, imageops::FilterType::Lanczos3)
        } else {
            luma
        };

        Ok(Mask::from_luma(&luma))
    }
}

impl Segmenter for ManifestSegmenter {
    fn detect(&mut self, image: &RgbImage) -> Result<DetectionResult> {
        let _span = tracing::debug_span!("manifest_detect").entered();

        let (width, height) = image.dimensions();
        let detections = self
            .entries
            .iter()
            .map(|(label, path)| -> Result<Detection> {
                let mask = Self::load_mask(path, width, height)?;
                Ok(Detection::new(label.clone(), mask))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(DetectionResult::new(detections))
    }
}
