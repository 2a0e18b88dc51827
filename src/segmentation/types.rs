use crate::compositing::Mask;
use crate::error::PortraitError;
use anyhow::Result;
use image::RgbImage;
use std::fmt;
use std::str::FromStr;

/// One labeled object found by a segmentation backend
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub label: String,
    pub mask: Mask,
}

impl Detection {
    pub fn new(label: impl Into<String>, mask: Mask) -> Self {
        Self {
            label: label.into(),
            mask,
        }
    }
}

/// Ordered detections for one image; the order defines selection indices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionResult {
    detections: Vec<Detection>,
}

impl DetectionResult {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self { detections }
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Detection> {
        self.detections.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Detection> {
        self.detections.iter()
    }

    /// Selection records in detection order
    pub fn choices(&self) -> Vec<ObjectChoice> {
        self.detections
            .iter()
            .enumerate()
            .map(|(index, d)| ObjectChoice::new(index, d.label.clone()))
            .collect()
    }
}

/// A user-facing handle on one detection
///
/// Displays as `<index>_<label>`, e.g. `1_person`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectChoice {
    pub index: usize,
    pub label: String,
}

impl ObjectChoice {
    pub fn new(index: usize, label: impl Into<String>) -> Self {
        Self {
            index,
            label: label.into(),
        }
    }
}

impl fmt::Display for ObjectChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.index, self.label)
    }
}

impl FromStr for ObjectChoice {
    type Err = PortraitError;

    /// Accepts `<index>_<label>` or a bare `<index>`. Labels may contain `_`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let (index, label) = match s.split_once('_') {
            Some((index, label)) => (index, label),
            None => (s, ""),
        };

        let index = index
            .parse::<usize>()
            .map_err(|_| PortraitError::InvalidSelection(format!("'{}' has no leading index", s)))?;

        Ok(Self::new(index, label))
    }
}

/// Trait for segmentation backends
/// Allows swapping between a real model, precomputed masks, or synthetic
/// masks in tests
pub trait Segmenter {
    /// Detect objects in an image
    ///
    /// Masks must share the image's dimensions, and the order must be stable
    /// for a given image.
    fn detect(&mut self, image: &RgbImage) -> Result<DetectionResult>;
}
