use super::mask::Mask;
use crate::error::{PortraitError, Result};
use image::{imageops, Rgb, RgbImage};
use ndarray::{Array3, Axis};

/// Gaussian blur radius applied to the background layer
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct BlurStrength(f32);

impl BlurStrength {
    pub fn new(radius: f32) -> Result<Self> {
        if radius > 0.0 && radius.is_finite() {
            Ok(Self(radius))
        } else {
            Err(PortraitError::InvalidBlurStrength(radius))
        }
    }

    pub fn radius(&self) -> f32 {
        self.0
    }
}

impl Default for BlurStrength {
    fn default() -> Self {
        Self(crate::config::DEFAULT_BLUR_STRENGTH)
    }
}

/// Keep the masked object sharp and Gaussian-blur everything else
///
/// Per channel the output is `image * w + blur(image) * (1 - w)` where `w` is
/// the normalized mask weight. Both layers are summed in f32 and converted
/// to 8 bits once, rounding and clamping to [0, 255]. Values are rounded to
/// nearest, not truncated, so results can differ by one from a truncating
/// implementation.
///
/// The mask must have the image's dimensions; no resizing is attempted.
pub fn composite(image: &RgbImage, mask: &Mask, strength: BlurStrength) -> Result<RgbImage> {
    let _span = tracing::debug_span!("composite").entered();

    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(PortraitError::EmptyImage);
    }
    if mask.dimensions() != (width, height) {
        return Err(PortraitError::DimensionMismatch {
            expected: (width, height),
            actual: mask.dimensions(),
        });
    }

    // (H, W, 1), broadcast across the color channels
    let weights = mask.normalized().values().clone().insert_axis(Axis(2));
    let inverse = weights.mapv(|w| 1.0 - w);

    let blurred = {
        let _blur_span = tracing::debug_span!("gaussian_blur", radius = strength.radius()).entered();
        imageops::blur(image, strength.radius())
    };

    let foreground = to_array(image) * &weights;
    let background = to_array(&blurred) * &inverse;
    let blended = foreground + background;

    Ok(RgbImage::from_fn(width, height, |x, y| {
        let (x, y) = (x as usize, y as usize);
        Rgb([
            to_u8(blended[[y, x, 0]]),
            to_u8(blended[[y, x, 1]]),
            to_u8(blended[[y, x, 2]]),
        ])
    }))
}

/// Like [`composite`], validating a raw radius first
pub fn blur_background(image: &RgbImage, mask: &Mask, radius: f32) -> Result<RgbImage> {
    composite(image, mask, BlurStrength::new(radius)?)
}

fn to_array(image: &RgbImage) -> Array3<f32> {
    let (width, height) = image.dimensions();
    Array3::from_shape_fn((height as usize, width as usize, 3), |(y, x, c)| {
        image.get_pixel(x as u32, y as u32)[c] as f32
    })
}

fn to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 37 % 256) as u8, (y * 53 % 256) as u8, ((x + y) * 11 % 256) as u8])
        })
    }

    fn uniform_mask(width: u32, height: u32, weight: f32) -> Mask {
        Mask::from_weights(width, height, vec![weight; (width * height) as usize]).unwrap()
    }

    #[test]
    fn test_full_mask_returns_input() {
        let image = gradient(9, 7);
        let mask = uniform_mask(9, 7, 1.0);

        for radius in [0.5, 3.0, 10.0] {
            let output = blur_background(&image, &mask, radius).unwrap();
            assert_eq!(output, image);
        }
    }

    #[test]
    fn test_empty_mask_returns_blur() {
        let image = gradient(9, 7);
        let mask = uniform_mask(9, 7, 0.0);

        let output = blur_background(&image, &mask, 2.0).unwrap();
        assert_eq!(output, imageops::blur(&image, 2.0));
    }

    #[test]
    fn test_luma_mask_is_normalized_before_blending() {
        let image = gradient(6, 4);
        let luma = image::GrayImage::from_pixel(6, 4, image::Luma([255]));

        let output = blur_background(&image, &Mask::from_luma(&luma), 4.0).unwrap();
        assert_eq!(output, image);
    }

    #[test]
    fn test_half_mask_sums_layers_before_rounding() {
        // Each layer alone is x.5 here; converting layers separately would drift by one
        let image = RgbImage::from_pixel(4, 4, Rgb([101, 101, 101]));
        let mask = uniform_mask(4, 4, 0.5);

        let output = blur_background(&image, &mask, 1.0).unwrap();
        for pixel in output.pixels() {
            assert_eq!(pixel, &Rgb([101, 101, 101]));
        }
    }

    #[test]
    fn test_dimension_mismatch_fails() {
        let image = gradient(4, 4);
        let mask = uniform_mask(4, 3, 1.0);

        let err = blur_background(&image, &mask, 1.0).unwrap_err();
        assert!(matches!(
            err,
            PortraitError::DimensionMismatch {
                expected: (4, 4),
                actual: (4, 3)
            }
        ));
    }

    #[test]
    fn test_empty_image_rejected() {
        let mask = Mask::from_weights(0, 0, vec![]).unwrap();
        assert!(matches!(
            blur_background(&RgbImage::new(0, 0), &mask, 1.0),
            Err(PortraitError::EmptyImage)
        ));

        let mask = Mask::from_weights(0, 4, vec![]).unwrap();
        assert!(matches!(
            blur_background(&RgbImage::new(0, 4), &mask, 1.0),
            Err(PortraitError::EmptyImage)
        ));
    }

    #[test]
    fn test_non_positive_strength_rejected() {
        let image = gradient(2, 2);
        let mask = uniform_mask(2, 2, 1.0);

        for radius in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                blur_background(&image, &mask, radius),
                Err(PortraitError::InvalidBlurStrength(_))
            ));
        }
    }

    #[test]
    fn test_saturated_image_never_overflows() {
        let image = RgbImage::from_pixel(16, 16, Rgb([255, 255, 255]));
        let weights = (0..256).map(|i| i as f32 / 255.0).collect();
        let mask = Mask::from_weights(16, 16, weights).unwrap();

        let output = blur_background(&image, &mask, 5.0).unwrap();
        assert!(output.pixels().all(|p| p.0.iter().all(|&c| c >= 250)));
    }

    #[test]
    fn test_white_checkerboard_mask_is_identity() {
        let image = RgbImage::from_pixel(2, 2, Rgb([255, 255, 255]));
        let mask = Mask::from_weights(2, 2, vec![1.0, 0.0, 0.0, 1.0]).unwrap();

        let output = blur_background(&image, &mask, 1.0).unwrap();
        assert_eq!(output, image);
    }

    #[test]
    fn test_inputs_are_not_mutated() {
        let image = gradient(5, 5);
        let copy = image.clone();
        let mask = uniform_mask(5, 5, 0.3);
        let mask_copy = mask.clone();

        let _ = blur_background(&image, &mask, 2.0).unwrap();
        assert_eq!(image, copy);
        assert_eq!(mask, mask_copy);
    }
}
