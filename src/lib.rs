//! Portrait-mode compositing: keep one segmented object sharp and
//! Gaussian-blur the rest of the photo.
//!
//! The flow per image is resize -> segment -> select -> composite. The
//! segmentation backend is pluggable through [`segmentation::Segmenter`].

pub mod compositing;
pub mod config;
pub mod error;
pub mod resize;
pub mod segmentation;
pub mod session;

pub use compositing::{blur_background, composite, BlurStrength, Mask};
pub use config::PortraitConfig;
pub use error::{PortraitError, Result};
pub use resize::Resizer;
pub use segmentation::{Detection, DetectionResult, ObjectChoice, Segmenter};
pub use session::PortraitSession;
