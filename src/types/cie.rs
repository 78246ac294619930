//! CIE 1931 xy chromaticity plus bridge brightness.
//!
//! Conversions use the Wide Gamut RGB D65 matrix documented for Hue lamps.
//! No gamut clipping is applied; the bridge maps out-of-gamut points to the
//! closest reachable color itself.

use serde::{Deserialize, Serialize};

use super::{Color, Hsb};

const RGB_TO_XYZ: [[f64; 3]; 3] = [
    [0.649926, 0.103455, 0.197109],
    [0.234327, 0.743075, 0.022598],
    [0.0, 0.053077, 1.035763],
];

const XYZ_TO_RGB: [[f64; 3]; 3] = [
    [1.611757, -0.202805, -0.302298],
    [-0.509057, 1.411914, 0.066070],
    [0.026086, -0.072353, 0.962086],
];

/// A color in the bridge's native `xy` + `bri` form.
///
/// `x` and `y` are kept to four decimals, the precision the bridge reports.
/// Brightness runs from 0 to 254.
///
/// # Examples
///
/// ```
/// use hue_bridge_rs::{CieColor, Color};
///
/// let cie = CieColor::from(&Color::rgb(255, 0, 0));
/// assert_eq!((cie.x(), cie.y(), cie.brightness()), (0.735, 0.265, 60));
/// assert_eq!(cie.to_color(), Color::rgb(255, 0, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CieColor {
    x: f64,
    y: f64,
    brightness: u8,
}

impl CieColor {
    pub const MAX_BRIGHTNESS: u8 = 254;

    pub fn new(x: f64, y: f64, brightness: u8) -> Self {
        CieColor {
            x,
            y,
            brightness: brightness.min(Self::MAX_BRIGHTNESS),
        }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    /// The `[x, y, brightness]` triple.
    pub fn to_cie(&self) -> [f64; 3] {
        [self.x, self.y, f64::from(self.brightness)]
    }

    pub fn xy(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    pub fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        let linear = [red, green, blue].map(|c| gamma_expand(f64::from(c) / 255.0));
        let [x, y, z] = mul(&RGB_TO_XYZ, linear);

        let sum = x + y + z;
        if sum <= 0.0 {
            return CieColor::default();
        }

        let brightness = (y * f64::from(Self::MAX_BRIGHTNESS)).round() as u8;
        CieColor::new(round4(x / sum), round4(y / sum), brightness)
    }

    pub fn to_color(&self) -> Color {
        if self.brightness == 0 {
            return Color::new();
        }

        let big_y = f64::from(self.brightness) / f64::from(Self::MAX_BRIGHTNESS);
        let y = if self.y == 0.0 { 1e-11 } else { self.y };
        let big_x = (big_y / y) * self.x;
        let big_z = (big_y / y) * (1.0 - self.x - y);

        let mut rgb = mul(&XYZ_TO_RGB, [big_x, big_y, big_z]).map(|c| gamma_compress(c).max(0.0));

        // Scale down uniformly if one channel overflows.
        let max = rgb.iter().cloned().fold(0.0, f64::max);
        if max > 1.0 {
            rgb = rgb.map(|c| c / max);
        }

        let [r, g, b] = rgb.map(|c| (c * 255.0).round() as u8);
        Color::rgb(r, g, b)
    }

    pub fn to_hex(&self) -> String {
        self.to_color().to_hex()
    }
}

impl From<&Color> for CieColor {
    fn from(color: &Color) -> Self {
        CieColor::from_rgb(color.red, color.green, color.blue)
    }
}

impl From<&Hsb> for CieColor {
    fn from(hsb: &Hsb) -> Self {
        CieColor::from(&hsb.to_color())
    }
}

impl From<&CieColor> for Color {
    fn from(cie: &CieColor) -> Self {
        cie.to_color()
    }
}

fn gamma_expand(v: f64) -> f64 {
    if v > 0.04045 {
        ((v + 0.055) / 1.055).powf(2.4)
    } else {
        v / 12.92
    }
}

fn gamma_compress(v: f64) -> f64 {
    if v <= 0.0031308 {
        12.92 * v
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

fn mul(m: &[[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    m.map(|row| row[0] * v[0] + row[1] * v[1] + row[2] * v[2])
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-4, "{} != {}", a, b);
    }

    #[test]
    fn test_white_point() {
        let cie = CieColor::from_rgb(255, 255, 255);
        assert_close(cie.x(), 0.3127);
        assert_close(cie.y(), 0.329);
        assert_eq!(cie.brightness(), 254);
        assert_eq!(cie.to_color(), Color::rgb(255, 255, 255));
    }

    #[test]
    fn test_black_has_no_brightness() {
        let cie = CieColor::from(&Color::new());
        assert_eq!(cie, CieColor::default());
        assert_eq!(cie.to_color(), Color::new());
    }

    #[test]
    fn test_primaries() {
        let green = CieColor::from_rgb(0, 255, 0);
        assert_close(green.x(), 0.115);
        assert_close(green.y(), 0.826);

        let blue = CieColor::from_rgb(0, 0, 255);
        assert_close(blue.x(), 0.157);
        assert_close(blue.y(), 0.018);
        assert_eq!(blue.to_color(), Color::rgb(0, 0, 255));
    }

    #[test]
    fn test_to_cie_triple() {
        let cie = CieColor::new(0.5, 0.4, 255);
        assert_eq!(cie.to_cie(), [0.5, 0.4, 254.0]);
        assert_eq!(cie.xy(), [0.5, 0.4]);
    }

    #[test]
    fn test_zero_y_does_not_divide_by_zero() {
        let color = CieColor::new(0.3, 0.0, 100).to_color();
        assert_eq!(color.red().max(color.green()).max(color.blue()), 255);
    }
}
