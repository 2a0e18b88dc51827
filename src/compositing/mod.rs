mod mask;
mod portrait;

pub use mask::{Mask, LUMA_MAX};
pub use portrait::{blur_background, composite, BlurStrength};
