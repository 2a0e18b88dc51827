use crate::error::{PortraitError, Result};

/// Working width every input image is resized to
pub const TARGET_WIDTH: u32 = 1280;

pub const MIN_BLUR_STRENGTH: f32 = 0.5;
pub const MAX_BLUR_STRENGTH: f32 = 10.0;
pub const DEFAULT_BLUR_STRENGTH: f32 = 3.0;

/// Bounds the caller enforces on the blur radius before compositing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlurRange {
    pub min: f32,
    pub max: f32,
}

impl BlurRange {
    /// Clamp a requested radius into the range, warning when it moves
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            tracing::warn!("Blur strength is NaN, using {}", self.min);
            return self.min;
        }

        let clamped = value.clamp(self.min, self.max);
        if clamped != value {
            tracing::warn!(
                "Blur strength {} outside [{}, {}], clamped to {}",
                value,
                self.min,
                self.max,
                clamped
            );
        }
        clamped
    }
}

impl Default for BlurRange {
    fn default() -> Self {
        Self {
            min: MIN_BLUR_STRENGTH,
            max: MAX_BLUR_STRENGTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortraitConfig {
    pub target_width: u32,
    pub blur_range: BlurRange,
}

impl PortraitConfig {
    pub fn validate(&self) -> Result<()> {
        if self.target_width == 0 {
            return Err(PortraitError::InvalidConfig(
                "target width must be greater than zero".into(),
            ));
        }

        let BlurRange { min, max } = self.blur_range;
        if !(min > 0.0 && min.is_finite() && max.is_finite() && min <= max) {
            return Err(PortraitError::InvalidConfig(format!(
                "blur range [{}, {}] must be positive and non-empty",
                min, max
            )));
        }

        Ok(())
    }
}

impl Default for PortraitConfig {
    fn default() -> Self {
        Self {
            target_width: TARGET_WIDTH,
            blur_range: BlurRange::default(),
        }
    }
}
