//! Individual light control.

use std::fmt;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::bridge::Bridge;
use crate::errors::Error;
use crate::state::{LightState, LightStateUpdate};
use crate::transport::Method;
use crate::types::{CieColor, Color, Hsb, IntoBrightness};

type Result<T> = std::result::Result<T, Error>;

/// A light descriptor as returned by the `lights` endpoint.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LightData {
    #[serde(rename = "type", default)]
    pub light_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub state: LightState,
    pub modelid: Option<String>,
    pub manufacturername: Option<String>,
    pub uniqueid: Option<String>,
    pub swversion: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Represents a single light connected to a [`Bridge`].
///
/// A `Light` has no network identity of its own: every operation is a call
/// through the bridge it borrows, scoped to `lights/{id}`. Handles are
/// obtained from [`Bridge::get_lights`] or [`Bridge::light`].
///
/// The `name` is a snapshot refreshed whenever [`Light::get_state`] runs; it
/// may be stale if the light is renamed elsewhere.
///
/// Serializes to `{"lightId", "type", "name"}`.
#[derive(Clone, Serialize)]
pub struct Light<'a> {
    #[serde(skip)]
    bridge: &'a Bridge,
    #[serde(rename = "lightId")]
    light_id: String,
    #[serde(rename = "type")]
    light_type: String,
    name: String,
}

impl<'a> Light<'a> {
    pub fn new(bridge: &'a Bridge, light_id: &str, light_data: &LightData) -> Self {
        Light {
            bridge,
            light_id: light_id.to_string(),
            light_type: light_data.light_type.clone(),
            name: light_data.name.clone(),
        }
    }

    pub fn bridge(&self) -> &'a Bridge {
        self.bridge
    }

    pub fn light_id(&self) -> &str {
        &self.light_id
    }

    pub fn light_type(&self) -> &str {
        &self.light_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Performs an API call against `lights/{id}` or, when `endpoint` is not
    /// empty, `lights/{id}/{endpoint}`.
    pub async fn do_api_call(
        &self,
        method: Method,
        endpoint: &str,
        data: Option<Value>,
    ) -> Result<Value> {
        let mut bridge_endpoint = format!("lights/{}", self.light_id);
        if !endpoint.is_empty() {
            bridge_endpoint.push('/');
            bridge_endpoint.push_str(endpoint);
        }
        self.bridge.do_api_call(method, &bridge_endpoint, data).await
    }

    /// Reads the light and returns its `state`.
    ///
    /// Light names are editable, so the cached name is refreshed on every
    /// read, here and in the bridge's light cache.
    pub async fn get_state(&mut self) -> Result<LightState> {
        let value = self.do_api_call(Method::Get, "", None).await?;
        let data: LightData = serde_json::from_value(value).map_err(Error::JsonLoad)?;

        if data.name != self.name {
            debug!("light {} renamed to {:?}", self.light_id, data.name);
            self.name.clone_from(&data.name);
            self.bridge.update_light(&self.light_id, &data).await;
        }
        Ok(data.state)
    }

    /// Sends a partial state. `time` is the transition duration; the bridge
    /// counts in deciseconds, so it is floored to a multiple of 100ms.
    pub async fn set_state(
        &self,
        mut state: LightStateUpdate,
        time: Option<Duration>,
    ) -> Result<Value> {
        if let Some(time) = time {
            let deciseconds = time.as_millis() / 100;
            state.transition_time = Some(u16::try_from(deciseconds).unwrap_or(u16::MAX));
        }

        let body = serde_json::to_value(&state).map_err(Error::JsonDump)?;
        self.do_api_call(Method::Put, "state", Some(body)).await
    }

    pub async fn set_on(&self, on: bool, time: Option<Duration>) -> Result<Value> {
        let mut state = LightStateUpdate::new();
        state.on(on);
        self.set_state(state, time).await
    }

    pub async fn set_color_rgb(
        &self,
        red: u8,
        green: u8,
        blue: u8,
        time: Option<Duration>,
    ) -> Result<Value> {
        self.set_color(&CieColor::from_rgb(red, green, blue), time)
            .await
    }

    /// Sets the color from a CSS-style hex code such as `#ff8000`.
    pub async fn set_color_hex(&self, hex: &str, time: Option<Duration>) -> Result<Value> {
        let color = Color::from_hex(hex)?;
        self.set_color(&CieColor::from(&color), time).await
    }

    /// Sends `xy` and `bri` from the given color.
    pub async fn set_color(&self, color: &CieColor, time: Option<Duration>) -> Result<Value> {
        self.set_state(LightStateUpdate::from(color), time).await
    }

    /// Sets hue (0-65535), saturation (0-254) and brightness (1-254) as is.
    pub async fn set_color_hsb(
        &self,
        hue: u16,
        saturation: u8,
        brightness: u8,
        time: Option<Duration>,
    ) -> Result<Value> {
        let mut state = LightStateUpdate::new();
        state.hue(hue).sat(saturation).bri(brightness);
        self.set_state(state, time).await
    }

    pub async fn set_hsb(&self, hsb: &Hsb, time: Option<Duration>) -> Result<Value> {
        self.set_state(LightStateUpdate::from(hsb), time).await
    }

    /// Sets the color temperature in mired, from 153 (cold) to 500 (warm).
    ///
    /// The value is not validated; the bridge rejects or clamps it.
    pub async fn set_color_temperature(
        &self,
        temperature: u16,
        time: Option<Duration>,
    ) -> Result<Value> {
        let mut state = LightStateUpdate::new();
        state.ct(temperature);
        self.set_state(state, time).await
    }

    /// Sets the brightness (1-254). Accepts numbers and numeric strings.
    pub async fn set_brightness(
        &self,
        brightness: impl IntoBrightness,
        time: Option<Duration>,
    ) -> Result<Value> {
        let brightness = brightness.into_brightness()?;
        let mut state = LightStateUpdate::new();
        state.brightness(&brightness);
        self.set_state(state, time).await
    }

    pub async fn get_color_rgb(&mut self) -> Result<Color> {
        Ok(self.get_color_cie().await?.to_color())
    }

    pub async fn get_color_hex(&mut self) -> Result<String> {
        Ok(self.get_color_cie().await?.to_hex())
    }

    async fn get_color_cie(&mut self) -> Result<CieColor> {
        let state = self.get_state().await?;
        state
            .cie()
            .ok_or_else(|| Error::MissingColor(self.light_id.clone()))
    }
}

impl fmt::Debug for Light<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Light")
            .field("bridge", &self.bridge.id())
            .field("light_id", &self.light_id)
            .field("light_type", &self.light_type)
            .field("name", &self.name)
            .finish()
    }
}
