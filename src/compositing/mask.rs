use crate::error::{PortraitError, Result};
use image::{GrayImage, Rgb, RgbImage};
use ndarray::Array2;

/// Scale of masks produced by segmentation backends (8-bit grayscale)
pub const LUMA_MAX: f32 = 255.0;

/// Per-pixel membership map for one detected object
///
/// Values are stored in `(height, width)` order alongside the maximum value
/// of their scale: 255 for raw detector output, 1 once normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    values: Array2<f32>,
    max_value: f32,
}

impl Mask {
    pub fn from_array(values: Array2<f32>, max_value: f32) -> Result<Self> {
        if !(max_value > 0.0 && max_value.is_finite()) {
            return Err(PortraitError::InvalidMask(format!(
                "mask scale must be positive, got {}",
                max_value
            )));
        }
        Ok(Self { values, max_value })
    }

    /// Mask from an 8-bit grayscale image, scale 0-255
    pub fn from_luma(image: &GrayImage) -> Self {
        let (width, height) = image.dimensions();
        let values = Array2::from_shape_fn((height as usize, width as usize), |(y, x)| {
            image.get_pixel(x as u32, y as u32)[0] as f32
        });
        Self {
            values,
            max_value: LUMA_MAX,
        }
    }

    /// Mask from weights already in [0, 1], flattened in row-major order
    pub fn from_weights(width: u32, height: u32, weights: Vec<f32>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if weights.len() != expected {
            return Err(PortraitError::InvalidMask(format!(
                "expected {} weights for {}x{}, got {}",
                expected,
                width,
                height,
                weights.len()
            )));
        }

        let values = Array2::from_shape_vec((height as usize, width as usize), weights)
            .map_err(|e| PortraitError::InvalidMask(e.to_string()))?;

        Ok(Self {
            values,
            max_value: 1.0,
        })
    }

    /// (width, height), matching `RgbImage::dimensions`
    pub fn dimensions(&self) -> (u32, u32) {
        let (height, width) = self.values.dim();
        (width as u32, height as u32)
    }

    pub fn max_value(&self) -> f32 {
        self.max_value
    }

    pub fn values(&self) -> &Array2<f32> {
        &self.values
    }

    /// Normalized weight at (x, y); `None` outside the mask
    pub fn weight(&self, x: u32, y: u32) -> Option<f32> {
        self.values
            .get((y as usize, x as usize))
            .map(|&v| normalize_value(v, self.max_value))
    }

    /// Rescale to weights in [0, 1]
    ///
    /// Values outside the scale are clamped and reported as a warning, NaN
    /// cells become 0. Normalizing a normalized mask returns it unchanged.
    pub fn normalized(&self) -> Mask {
        let _span = tracing::debug_span!("normalize_mask").entered();

        let max_value = self.max_value;
        let out_of_range = self
            .values
            .iter()
            .filter(|&&v| !(0.0..=max_value).contains(&v))
            .count();

        if out_of_range > 0 {
            tracing::warn!(
                "{} mask values outside [0, {}], clamping",
                out_of_range,
                max_value
            );
        }

        Mask {
            values: self.values.mapv(|v| normalize_value(v, max_value)),
            max_value: 1.0,
        }
    }

    /// Grayscale visualization of the mask (white = foreground)
    pub fn to_rgb(&self) -> RgbImage {
        let (width, height) = self.dimensions();
        RgbImage::from_fn(width, height, |x, y| {
            let weight = normalize_value(self.values[[y as usize, x as usize]], self.max_value);
            let value = (weight * 255.0).round().clamp(0.0, 255.0) as u8;
            Rgb([value, value, value])
        })
    }
}

fn normalize_value(value: f32, max_value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    (value / max_value).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_from_luma_dimensions_and_scale() {
        let luma = GrayImage::from_fn(3, 2, |x, _| Luma([(x * 100) as u8]));
        let mask = Mask::from_luma(&luma);

        assert_eq!(mask.dimensions(), (3, 2));
        assert_eq!(mask.max_value(), 255.0);
        assert_eq!(mask.weight(0, 0), Some(0.0));
        assert_eq!(mask.weight(2, 1), Some(200.0 / 255.0));
        assert_eq!(mask.weight(3, 0), None);
    }

    #[test]
    fn test_normalize_divides_by_scale() {
        let luma = GrayImage::from_fn(2, 1, |x, _| Luma([if x == 0 { 0 } else { 255 }]));
        let normalized = Mask::from_luma(&luma).normalized();

        assert_eq!(normalized.max_value(), 1.0);
        assert_eq!(normalized.values()[[0, 0]], 0.0);
        assert_eq!(normalized.values()[[0, 1]], 1.0);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mask = Mask::from_weights(2, 2, vec![0.0, 0.25, 0.5, 1.0]).unwrap();
        assert_eq!(mask.normalized(), mask);

        let luma = GrayImage::from_fn(4, 4, |x, y| Luma([(x * 60 + y * 3) as u8]));
        let once = Mask::from_luma(&luma).normalized();
        assert_eq!(once.normalized(), once);
    }

    #[test]
    fn test_normalize_clamps_noisy_values() {
        let mask = Mask::from_weights(4, 1, vec![-0.5, 1.5, f32::NAN, 0.5]).unwrap();
        let normalized = mask.normalized();

        let values: Vec<f32> = normalized.values().iter().copied().collect();
        assert_eq!(values, vec![0.0, 1.0, 0.0, 0.5]);
    }

    #[test]
    fn test_from_weights_rejects_wrong_length() {
        assert!(matches!(
            Mask::from_weights(2, 2, vec![0.0; 3]),
            Err(PortraitError::InvalidMask(_))
        ));
    }

    #[test]
    fn test_from_array_rejects_bad_scale() {
        assert!(Mask::from_array(Array2::zeros((1, 1)), 0.0).is_err());
        assert!(Mask::from_array(Array2::zeros((1, 1)), f32::INFINITY).is_err());
    }

    #[test]
    fn test_to_rgb_visualizes_weights() {
        let mask = Mask::from_weights(2, 1, vec![1.0, 0.0]).unwrap();
        let rgb = mask.to_rgb();

        assert_eq!(rgb.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(rgb.get_pixel(1, 0), &Rgb([0, 0, 0]));
    }
}
