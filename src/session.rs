use crate::compositing::{composite, BlurStrength};
use crate::config::PortraitConfig;
use crate::error::{PortraitError, Result};
use crate::resize::Resizer;
use crate::segmentation::{Detection, DetectionResult, ObjectChoice, Segmenter};
use image::RgbImage;

/// Detections for the most recently analyzed image of one user session
///
/// Each caller owns its session, so concurrent users never share a slot.
/// Analyzing a new image replaces the previous image and its detections.
pub struct PortraitSession {
    config: PortraitConfig,
    resizer: Resizer,
    current: Option<Analyzed>,
}

struct Analyzed {
    image: RgbImage,
    detections: DetectionResult,
}

impl PortraitSession {
    pub fn new(config: PortraitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            resizer: Resizer::new(config.target_width),
            config,
            current: None,
        })
    }

    pub fn config(&self) -> &PortraitConfig {
        &self.config
    }

    /// Resize `image`, run the segmenter on it and store the result
    pub fn analyze<S>(&mut self, segmenter: &mut S, image: &RgbImage) -> Result<Vec<ObjectChoice>>
    where
        S: Segmenter + ?Sized,
    {
        let _span = tracing::debug_span!("analyze").entered();

        // An older result must not outlive a failed analysis
        self.current = None;

        let resized = self.resizer.resize(image)?;
        let detections = segmenter
            .detect(&resized)
            .map_err(PortraitError::Segmentation)?;

        let (width, height) = resized.dimensions();
        for detection in detections.iter() {
            if detection.mask.dimensions() != (width, height) {
                tracing::warn!(
                    "Mask for '{}' is {:?}, image is {}x{}",
                    detection.label,
                    detection.mask.dimensions(),
                    width,
                    height
                );
            }
        }

        tracing::info!(
            "Analyzed {}x{} image: {} objects",
            width,
            height,
            detections.len()
        );

        let choices = detections.choices();
        self.current = Some(Analyzed {
            image: resized,
            detections,
        });

        Ok(choices)
    }

    /// Choices for the current image, empty before any analysis
    pub fn choices(&self) -> Vec<ObjectChoice> {
        self.current
            .as_ref()
            .map(|a| a.detections.choices())
            .unwrap_or_default()
    }

    /// The resized image detections refer to
    pub fn working_image(&self) -> Option<&RgbImage> {
        self.current.as_ref().map(|a| &a.image)
    }

    pub fn detections(&self) -> Option<&DetectionResult> {
        self.current.as_ref().map(|a| &a.detections)
    }

    /// Look up the detection behind a choice
    ///
    /// A non-empty label must match the stored one, so a choice made for an
    /// earlier image is rejected instead of picking an unrelated object.
    pub fn select(&self, choice: &ObjectChoice) -> Result<&Detection> {
        let analyzed = self.current.as_ref().ok_or(PortraitError::NoDetections)?;

        let detection = analyzed.detections.get(choice.index).ok_or_else(|| {
            PortraitError::InvalidSelection(format!(
                "index {} out of range, {} objects detected",
                choice.index,
                analyzed.detections.len()
            ))
        })?;

        if !choice.label.is_empty() && choice.label != detection.label {
            return Err(PortraitError::InvalidSelection(format!(
                "object {} is '{}', not '{}'",
                choice.index, detection.label, choice.label
            )));
        }

        Ok(detection)
    }

    /// Blur everything except the chosen object
    pub fn render(&self, choice: &ObjectChoice, strength: BlurStrength) -> Result<RgbImage> {
        let detection = self.select(choice)?;
        let image = self.working_image().ok_or(PortraitError::NoDetections)?;

        let output = composite(image, &detection.mask, strength)?;
        tracing::info!(
            "Rendered '{}' with blur strength {}",
            choice,
            strength.radius()
        );

        Ok(output)
    }

    /// Grayscale preview of the chosen object's mask
    pub fn render_mask(&self, choice: &ObjectChoice) -> Result<RgbImage> {
        Ok(self.select(choice)?.mask.to_rgb())
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}
