//! Value types for light control parameters and color conversion.

mod brightness;
mod cie;
mod color;
mod hsb;

pub use brightness::{Brightness, IntoBrightness};
pub use cie::CieColor;
pub use color::Color;
pub use hsb::Hsb;
