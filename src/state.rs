//! Light state as read from and written to the bridge.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::types::{Brightness, CieColor, Hsb};

/// Temporary alert effect of a light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Alert {
    /// No alert
    None,
    /// One breathe cycle
    Select,
    /// Breathe cycles for 15 seconds
    #[serde(rename = "lselect")]
    #[strum(serialize = "lselect")]
    LSelect,
}

/// Dynamic effect of a light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Effect {
    None,
    /// Cycle through all hues at the current brightness and saturation
    ColorLoop,
}

/// Which attribute set the light's current color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ColorMode {
    /// Hue and saturation
    Hs,
    /// CIE xy
    Xy,
    /// Color temperature
    Ct,
}

/// The `state` object of a light as reported by the bridge.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LightState {
    pub on: bool,
    pub bri: Option<u8>,
    pub hue: Option<u16>,
    pub sat: Option<u8>,
    pub xy: Option<[f64; 2]>,
    pub ct: Option<u16>,
    pub alert: Option<Alert>,
    pub effect: Option<Effect>,
    pub colormode: Option<ColorMode>,
    #[serde(default)]
    pub reachable: bool,
}

impl LightState {
    /// The current color in CIE form, if the light reports `xy`.
    ///
    /// A missing `bri` is treated as full brightness.
    pub fn cie(&self) -> Option<CieColor> {
        self.xy
            .map(|[x, y]| CieColor::new(x, y, self.bri.unwrap_or(CieColor::MAX_BRIGHTNESS)))
    }
}

/// A partial light state to send to the bridge.
///
/// Only the attributes that were set are serialized. The transition time is
/// expressed in deciseconds; [`Light::set_state`](crate::Light::set_state)
/// fills it in from a millisecond duration.
///
/// # Examples
///
/// ```
/// use hue_bridge_rs::LightStateUpdate;
///
/// let mut update = LightStateUpdate::new();
/// update.on(true).bri(200);
/// assert_eq!(
///     serde_json::to_value(&update).unwrap(),
///     serde_json::json!({"on": true, "bri": 200})
/// );
/// ```
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LightStateUpdate {
    pub(crate) on: Option<bool>,
    pub(crate) bri: Option<u8>,
    pub(crate) hue: Option<u16>,
    pub(crate) sat: Option<u8>,
    pub(crate) xy: Option<[f64; 2]>,
    pub(crate) ct: Option<u16>,
    pub(crate) alert: Option<Alert>,
    pub(crate) effect: Option<Effect>,
    #[serde(rename = "transitionTime")]
    pub(crate) transition_time: Option<u16>,
    pub(crate) bri_inc: Option<i16>,
    pub(crate) sat_inc: Option<i16>,
    pub(crate) hue_inc: Option<i32>,
    pub(crate) ct_inc: Option<i16>,
    pub(crate) xy_inc: Option<f64>,
}

impl LightStateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if no attribute has been set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn on(&mut self, on: bool) -> &mut Self {
        self.on = Some(on);
        self
    }

    pub fn bri(&mut self, bri: u8) -> &mut Self {
        self.bri = Some(bri);
        self
    }

    pub fn brightness(&mut self, brightness: &Brightness) -> &mut Self {
        self.bri(brightness.value)
    }

    pub fn hue(&mut self, hue: u16) -> &mut Self {
        self.hue = Some(hue);
        self
    }

    pub fn sat(&mut self, sat: u8) -> &mut Self {
        self.sat = Some(sat);
        self
    }

    pub fn xy(&mut self, x: f64, y: f64) -> &mut Self {
        self.xy = Some([x, y]);
        self
    }

    /// Color temperature in mired (153-500 on most lights).
    pub fn ct(&mut self, ct: u16) -> &mut Self {
        self.ct = Some(ct);
        self
    }

    pub fn alert(&mut self, alert: Alert) -> &mut Self {
        self.alert = Some(alert);
        self
    }

    pub fn effect(&mut self, effect: Effect) -> &mut Self {
        self.effect = Some(effect);
        self
    }

    /// Transition time in deciseconds.
    pub fn transition_time(&mut self, deciseconds: u16) -> &mut Self {
        self.transition_time = Some(deciseconds);
        self
    }

    pub fn bri_inc(&mut self, delta: i16) -> &mut Self {
        self.bri_inc = Some(delta);
        self
    }

    pub fn sat_inc(&mut self, delta: i16) -> &mut Self {
        self.sat_inc = Some(delta);
        self
    }

    pub fn hue_inc(&mut self, delta: i32) -> &mut Self {
        self.hue_inc = Some(delta);
        self
    }

    pub fn ct_inc(&mut self, delta: i16) -> &mut Self {
        self.ct_inc = Some(delta);
        self
    }

    pub fn xy_inc(&mut self, delta: f64) -> &mut Self {
        self.xy_inc = Some(delta);
        self
    }

    /// Set `xy` and `bri` from a CIE color.
    pub fn cie(&mut self, color: &CieColor) -> &mut Self {
        self.xy(color.x(), color.y()).bri(color.brightness())
    }

    /// Set `hue`, `sat` and `bri` in bridge units.
    pub fn hsb(&mut self, hsb: &Hsb) -> &mut Self {
        self.hue(hsb.hue()).sat(hsb.saturation()).bri(hsb.brightness())
    }
}

impl From<&CieColor> for LightStateUpdate {
    fn from(color: &CieColor) -> Self {
        let mut update = LightStateUpdate::new();
        update.cie(color);
        update
    }
}

impl From<&Hsb> for LightStateUpdate {
    fn from(hsb: &Hsb) -> Self {
        let mut update = LightStateUpdate::new();
        update.hsb(hsb);
        update
    }
}
