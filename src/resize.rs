use crate::error::{PortraitError, Result};
use image::{imageops, RgbImage};

/// Normalizes input images to a fixed working width
///
/// Masks produced for the resized image share its dimensions, so every
/// later compositing step works on one size.
#[derive(Debug, Clone)]
pub struct Resizer {
    target_width: u32,
    filter: imageops::FilterType,
}

impl Resizer {
    pub fn new(target_width: u32) -> Self {
        Self {
            target_width,
            filter: imageops::FilterType::Lanczos3,
        }
    }

    /// Output dimensions for an input of `width` x `height`
    ///
    /// The height is `round(height * target_width / width)`, never below 1.
    pub fn target_dimensions(&self, width: u32, height: u32) -> Result<(u32, u32)> {
        if width == 0 || height == 0 || self.target_width == 0 {
            return Err(PortraitError::EmptyImage);
        }

        let scale = self.target_width as f64 / width as f64;
        let new_height = (height as f64 * scale).round().max(1.0) as u32;

        Ok((self.target_width, new_height))
    }

    /// Resize to the working width, preserving aspect ratio
    pub fn resize(&self, image: &RgbImage) -> Result<RgbImage> {
        let _span = tracing::debug_span!("resize").entered();

        let (width, height) = image.dimensions();
        let (new_width, new_height) = self.target_dimensions(width, height)?;

        tracing::debug!(
            "Resizing {}x{} -> {}x{}",
            width,
            height,
            new_width,
            new_height
        );

        if (width, height) == (new_width, new_height) {
            return Ok(image.clone());
        }

        Ok(imageops::resize(image, new_width, new_height, self.filter))
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new(crate::config::TARGET_WIDTH)
    }
}
