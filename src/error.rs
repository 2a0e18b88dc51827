use thiserror::Error;

/// Errors raised by the resize / composite / session pipeline.
///
/// None of these are fatal to an interactive session: a failed call simply
/// produces no image and the caller may retry with corrected input.
#[derive(Debug, Error)]
pub enum PortraitError {
    #[error("image has zero width or height")]
    EmptyImage,

    #[error("mask is {actual:?} but image is {expected:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("blur strength must be positive and finite, got {0}")]
    InvalidBlurStrength(f32),

    #[error("invalid object selection: {0}")]
    InvalidSelection(String),

    #[error("no detection results available, analyze an image first")]
    NoDetections,

    #[error("invalid mask: {0}")]
    InvalidMask(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("segmentation failed: {0:#}")]
    Segmentation(anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PortraitError>;
