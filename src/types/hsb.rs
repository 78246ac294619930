//! Hue, saturation and brightness in bridge units.

use serde::{Deserialize, Serialize};

use super::Color;

/// Hue/saturation/brightness as the bridge understands them.
///
/// - Hue: position on the color wheel, 0-65535 (both ends are red)
/// - Saturation: 0 (white) to 254 (fully colored)
/// - Brightness: 0 to 254
///
/// Values are sent to the bridge unchanged; [`Hsb::to_color`] is only used
/// for display purposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hsb {
    hue: u16,
    saturation: u8,
    brightness: u8,
}

impl Hsb {
    pub const MAX_SATURATION: u8 = 254;
    pub const MAX_BRIGHTNESS: u8 = 254;

    /// Create a new value, returning `None` if saturation or brightness
    /// exceed 254.
    ///
    /// # Examples
    ///
    /// ```
    /// use hue_bridge_rs::Hsb;
    ///
    /// assert!(Hsb::create(0, 254, 254).is_some());
    /// assert!(Hsb::create(65535, 0, 1).is_some());
    /// assert!(Hsb::create(100, 255, 10).is_none());
    /// ```
    pub fn create(hue: u16, saturation: u8, brightness: u8) -> Option<Self> {
        if saturation <= Self::MAX_SATURATION && brightness <= Self::MAX_BRIGHTNESS {
            Some(Hsb {
                hue,
                saturation,
                brightness,
            })
        } else {
            None
        }
    }

    pub fn hue(&self) -> u16 {
        self.hue
    }

    pub fn saturation(&self) -> u8 {
        self.saturation
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Convert to an RGB [`Color`].
    ///
    /// # Examples
    ///
    /// ```
    /// use hue_bridge_rs::{Color, Hsb};
    ///
    /// let hsb = Hsb::create(0, 254, 254).unwrap();
    /// assert_eq!(hsb.to_color(), Color::rgb(255, 0, 0));
    /// ```
    pub fn to_color(&self) -> Color {
        let h = f64::from(self.hue) / 65535.0 * 360.0;
        let s = f64::from(self.saturation) / f64::from(Self::MAX_SATURATION);
        let v = f64::from(self.brightness) / f64::from(Self::MAX_BRIGHTNESS);

        if s == 0.0 {
            let gray = (v * 255.0).round() as u8;
            return Color::rgb(gray, gray, gray);
        }

        let h = h / 60.0;
        let i = h.floor() as i32;
        let f = h - f64::from(i);
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));

        let (r, g, b) = match i % 6 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };

        Color::rgb(
            (r * 255.0).round() as u8,
            (g * 255.0).round() as u8,
            (b * 255.0).round() as u8,
        )
    }
}

impl From<&Hsb> for Color {
    fn from(hsb: &Hsb) -> Self {
        hsb.to_color()
    }
}

impl From<&Color> for Hsb {
    fn from(color: &Color) -> Self {
        let r = f64::from(color.red) / 255.0;
        let g = f64::from(color.green) / 255.0;
        let b = f64::from(color.blue) / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let degrees = if delta == 0.0 {
            0.0
        } else if max == r {
            60.0 * ((g - b) / delta).rem_euclid(6.0)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };
        let saturation = if max == 0.0 { 0.0 } else { delta / max };

        Hsb {
            hue: (degrees / 360.0 * 65535.0).round() as u16,
            saturation: (saturation * f64::from(Self::MAX_SATURATION)).round() as u8,
            brightness: (max * f64::from(Self::MAX_BRIGHTNESS)).round() as u8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gray_when_unsaturated() {
        let hsb = Hsb::create(12345, 0, 127).unwrap();
        let color = hsb.to_color();
        assert_eq!(color.red(), color.green());
        assert_eq!(color.green(), color.blue());
    }

    #[test]
    fn test_from_color() {
        let hsb = Hsb::from(&Color::rgb(0, 0, 255));
        assert_eq!(hsb.hue(), 43690);
        assert_eq!(hsb.saturation(), 254);
        assert_eq!(hsb.brightness(), 254);

        let hsb = Hsb::from(&Color::rgb(0, 255, 0));
        assert_eq!(hsb.to_color(), Color::rgb(0, 255, 0));
    }
}
