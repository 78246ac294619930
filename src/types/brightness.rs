//! Brightness coercion for bridge requests.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// A brightness level in bridge units (the bridge accepts 1 to 254).
///
/// The value itself is not range checked beyond fitting a byte; the bridge
/// clamps it.
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(transparent)]
pub struct Brightness {
    pub(crate) value: u8,
}

impl Brightness {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 254;

    pub fn new(value: u8) -> Self {
        Brightness { value }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Returns None if value is outside the range the bridge accepts (1-254).
    pub fn create(value: u8) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Some(Brightness { value })
        } else {
            None
        }
    }
}

impl From<u8> for Brightness {
    fn from(value: u8) -> Self {
        Brightness::new(value)
    }
}

impl FromStr for Brightness {
    type Err = Error;

    /// Parse the leading integer of a string, ignoring anything after it.
    ///
    /// # Examples
    ///
    /// ```
    /// use hue_bridge_rs::Brightness;
    ///
    /// assert_eq!("254".parse::<Brightness>().unwrap().value(), 254);
    /// assert_eq!(" 12.7".parse::<Brightness>().unwrap().value(), 12);
    /// assert!("bright".parse::<Brightness>().is_err());
    /// assert!("300".parse::<Brightness>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Error> {
        let trimmed = s.trim_start();
        let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
        let end = unsigned
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(unsigned.len());

        unsigned[..end]
            .parse::<u8>()
            .map(Brightness::new)
            .map_err(|_| Error::InvalidBrightness(s.to_string()))
    }
}

/// Conversion into a [`Brightness`], truncating fractional values.
///
/// Implemented for integers, floats and strings so that values coming from
/// form inputs can be passed straight to
/// [`Light::set_brightness`](crate::Light::set_brightness).
pub trait IntoBrightness {
    fn into_brightness(self) -> Result<Brightness, Error>;
}

impl IntoBrightness for Brightness {
    fn into_brightness(self) -> Result<Brightness, Error> {
        Ok(self)
    }
}

impl IntoBrightness for u8 {
    fn into_brightness(self) -> Result<Brightness, Error> {
        Ok(Brightness::new(self))
    }
}

macro_rules! impl_into_brightness_int {
    ($($t:ty),*) => {
        $(
            impl IntoBrightness for $t {
                fn into_brightness(self) -> Result<Brightness, Error> {
                    u8::try_from(self)
                        .map(Brightness::new)
                        .map_err(|_| Error::InvalidBrightness(self.to_string()))
                }
            }
        )*
    };
}

impl_into_brightness_int!(u16, u32, u64, i8, i16, i32, i64, usize);

impl IntoBrightness for f64 {
    fn into_brightness(self) -> Result<Brightness, Error> {
        let truncated = self.trunc();
        if truncated.is_finite() && (0.0..=f64::from(u8::MAX)).contains(&truncated) {
            Ok(Brightness::new(truncated as u8))
        } else {
            Err(Error::InvalidBrightness(self.to_string()))
        }
    }
}

impl IntoBrightness for f32 {
    fn into_brightness(self) -> Result<Brightness, Error> {
        f64::from(self).into_brightness()
    }
}

impl IntoBrightness for &str {
    fn into_brightness(self) -> Result<Brightness, Error> {
        self.parse()
    }
}

impl IntoBrightness for String {
    fn into_brightness(self) -> Result<Brightness, Error> {
        self.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_range() {
        assert!(Brightness::create(0).is_none());
        assert!(Brightness::create(1).is_some());
        assert!(Brightness::create(254).is_some());
        assert!(Brightness::create(255).is_none());
    }

    #[test]
    fn test_into_brightness() {
        assert_eq!(200u32.into_brightness().unwrap().value(), 200);
        assert_eq!(99.9f64.into_brightness().unwrap().value(), 99);
        assert_eq!(String::from("42abc").into_brightness().unwrap().value(), 42);
        assert!((-1i32).into_brightness().is_err());
        assert!(f64::NAN.into_brightness().is_err());
        assert!("".into_brightness().is_err());
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_value(Brightness::new(128)).unwrap();
        assert_eq!(json, serde_json::json!(128));
    }
}
