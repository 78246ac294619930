//! The bridge: location, authorization, configuration and light enumeration.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::BridgeConfig;
use crate::discovery::{self, BridgeData, SavedBridge};
use crate::errors::{ApiError, Error};
use crate::light::{Light, LightData};
use crate::runtime::{self, Mutex};
use crate::state::LightStateUpdate;
use crate::transport::{Method, Request, Transport};

#[cfg(feature = "http-reqwest")]
use crate::transport::HttpTransport;

type Result<T> = std::result::Result<T, Error>;

/// Body of a successful authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationSuccess {
    pub username: String,
}

/// First element of the bridge's answer to an authorization request.
///
/// Either `success` carries the new username, or `error` says why the
/// request was refused. A refusal of type 101 (link button not pressed) is
/// the normal state while the user walks over to the bridge.
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthorizationResponse {
    pub success: Option<AuthorizationSuccess>,
    pub error: Option<ApiError>,
}

impl AuthorizationResponse {
    pub fn is_success(&self) -> bool {
        self.success.is_some()
    }

    pub fn username(&self) -> Option<&str> {
        self.success.as_ref().map(|s| s.username.as_str())
    }
}

#[derive(Debug, Default)]
struct BridgeState {
    ip_address: Option<String>,
    username: String,
    config: Option<BridgeConfig>,
    lights: Option<Vec<(String, LightData)>>,
}

/// A Philips Hue bridge.
///
/// A bridge goes through three stages:
///
/// 1. *unidentified*: only its id is known;
/// 2. *located*: its IP address is known, either from the constructor or
///    from [`Bridge::find_bridge`];
/// 3. *authorized*: a username has been granted by [`Bridge::authorize`].
///
/// Every call that needs the IP address resolves it first, so an
/// unidentified bridge is located on first use. A known IP address is never
/// looked up again.
///
/// Configuration and the light list are cached in memory after the first
/// successful read. Only the configuration can be refreshed, with
/// `get_config(true)`.
///
/// # Example
///
/// ```ignore
/// use hue_bridge_rs::{Bridge, BridgeData};
///
/// let bridge = Bridge::new(BridgeData::new("001788fffe100491"), "my_app", "kitchen_tablet");
/// bridge.wait_for_authorization().await?; // press the link button now
/// for light in bridge.get_lights().await? {
///     light.set_color_hex("#ff8000", None).await?;
/// }
/// ```
pub struct Bridge {
    id: String,
    app_name: String,
    device_name: String,
    transport: Arc<dyn Transport>,
    state: Mutex<BridgeState>,
}

impl Bridge {
    /// Delay between two authorization attempts.
    pub const AUTHORIZATION_INTERVAL_MS: u64 = 1000;
    /// Number of authorization attempts before giving up.
    pub const AUTHORIZATION_ATTEMPTS: u32 = 60;

    /// Create a bridge talking over the default [`HttpTransport`].
    ///
    /// This does not trigger discovery; an address missing from
    /// `bridge_data` is looked up on first use.
    #[cfg(feature = "http-reqwest")]
    pub fn new(bridge_data: BridgeData, app_name: &str, device_name: &str) -> Self {
        Self::with_transport(
            bridge_data,
            app_name,
            device_name,
            Arc::new(HttpTransport::new()),
        )
    }

    pub fn with_transport(
        bridge_data: BridgeData,
        app_name: &str,
        device_name: &str,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Bridge {
            id: bridge_data.id,
            app_name: app_name.to_string(),
            device_name: device_name.to_string(),
            transport,
            state: Mutex::new(BridgeState {
                ip_address: bridge_data.internalipaddress.filter(|ip| !ip.is_empty()),
                username: bridge_data.username.unwrap_or_default(),
                ..Default::default()
            }),
        }
    }

    /// Lists the bridges known to the discovery service, over the default
    /// transport.
    #[cfg(feature = "http-reqwest")]
    pub async fn discover_bridges() -> Result<Vec<BridgeData>> {
        discovery::discover_bridges(&HttpTransport::new()).await
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// The cached IP address, without triggering discovery.
    pub async fn ip_address(&self) -> Option<String> {
        self.state.lock().await.ip_address.clone()
    }

    /// The username granted by the bridge, or an empty string.
    pub async fn username(&self) -> String {
        self.state.lock().await.username.clone()
    }

    pub async fn is_authorized(&self) -> bool {
        !self.state.lock().await.username.is_empty()
    }

    /// The data needed to rebuild this bridge later without authorizing again.
    pub async fn serialize(&self) -> SavedBridge {
        SavedBridge {
            id: self.id.clone(),
            username: self.username().await,
        }
    }

    /// Looks this bridge up through discovery and stores its IP address.
    pub async fn find_bridge(&self) -> Result<String> {
        let bridges = discovery::discover_bridges(&*self.transport).await?;

        let ip_address = bridges
            .into_iter()
            .find(|b| b.id.eq_ignore_ascii_case(&self.id))
            .and_then(|b| b.internalipaddress)
            .filter(|ip| !ip.is_empty());

        match ip_address {
            Some(ip) => {
                debug!("bridge {} found at {}", self.id, ip);
                self.state.lock().await.ip_address = Some(ip.clone());
                Ok(ip)
            }
            None => {
                warn!("bridge {} not found by discovery", self.id);
                Err(Error::BridgeNotFound(self.id.clone()))
            }
        }
    }

    /// Returns the IP address, running discovery only if it is not known yet.
    pub async fn get_ip_address(&self) -> Result<String> {
        let cached = self.state.lock().await.ip_address.clone();
        match cached {
            Some(ip) => Ok(ip),
            None => self.find_bridge().await,
        }
    }

    /// Performs an API call against `http://{ip}/api/{username}/{endpoint}`.
    ///
    /// When the bridge answers with an array only its first element is
    /// considered. A missing element or one carrying an `error` key fails
    /// the call.
    pub async fn do_api_call(
        &self,
        method: Method,
        endpoint: &str,
        data: Option<Value>,
    ) -> Result<Value> {
        let url = self.endpoint_url(endpoint).await?;
        debug!("{} {}", method, url);

        let response = self.transport.perform(Request::new(method, url, data)).await?;
        let Some(result) = first_element(response) else {
            warn!("empty response for {} {}", method, endpoint);
            return Err(Error::EmptyResponse);
        };

        if let Some(error) = result.get("error") {
            let error = serde_json::from_value::<ApiError>(error.clone()).unwrap_or_else(|_| {
                ApiError {
                    description: error
                        .as_str()
                        .map_or_else(|| error.to_string(), str::to_string),
                    ..Default::default()
                }
            });
            warn!("{} {} failed: {}", method, endpoint, error);
            return Err(Error::Api(error));
        }

        debug!("{} {} -> {}", method, endpoint, result);
        Ok(result)
    }

    async fn endpoint_url(&self, endpoint: &str) -> Result<String> {
        let ip = self.get_ip_address().await?;
        let username = self.username().await;
        Ok(construct_endpoint_url(&ip, &username, endpoint))
    }

    /// Returns the bridge configuration, reading it from the bridge only if
    /// it is not cached yet or `force_refresh` is set.
    pub async fn get_config(&self, force_refresh: bool) -> Result<BridgeConfig> {
        if !force_refresh {
            if let Some(config) = self.state.lock().await.config.clone() {
                return Ok(config);
            }
        }

        let value = self.do_api_call(Method::Get, "config", None).await?;
        let config: BridgeConfig = serde_json::from_value(value).map_err(Error::JsonLoad)?;
        self.state.lock().await.config = Some(config.clone());
        Ok(config)
    }

    pub async fn get_name(&self) -> Result<String> {
        Ok(self.get_config(false).await?.name)
    }

    /// Returns the bridge's lights, reading them only on the first call.
    pub async fn get_lights(&self) -> Result<Vec<Light<'_>>> {
        let cached = self.state.lock().await.lights.clone();
        let lights = match cached {
            Some(lights) => lights,
            None => {
                let value = self.do_api_call(Method::Get, "lights", None).await?;
                let by_id: BTreeMap<String, LightData> =
                    serde_json::from_value(value).map_err(Error::JsonLoad)?;

                let mut lights: Vec<(String, LightData)> = by_id.into_iter().collect();
                lights.sort_by(|(a, _), (b, _)| (a.len(), a).cmp(&(b.len(), b)));
                debug!("bridge {} has {} light(s)", self.id, lights.len());

                self.state.lock().await.lights = Some(lights.clone());
                lights
            }
        };

        Ok(lights
            .iter()
            .map(|(id, data)| Light::new(self, id, data))
            .collect())
    }

    /// Looks up a light by id in the cache filled by [`Bridge::get_lights`].
    ///
    /// Ids are compared as strings, so both `light(3)` and `light("3")` work.
    pub async fn light(&self, light_id: impl fmt::Display) -> Option<Light<'_>> {
        let light_id = light_id.to_string();
        let state = self.state.lock().await;
        state
            .lights
            .as_ref()?
            .iter()
            .find(|(id, _)| *id == light_id)
            .map(|(id, data)| Light::new(self, id, data))
    }

    pub(crate) async fn update_light(&self, light_id: &str, light_data: &LightData) {
        let mut state = self.state.lock().await;
        if let Some(lights) = state.lights.as_mut() {
            if let Some((_, cached)) = lights.iter_mut().find(|(id, _)| id == light_id) {
                *cached = light_data.clone();
            }
        }
    }

    /// Sets the state of a cached light.
    #[deprecated(note = "use the light's methods instead")]
    pub async fn set_light_state(
        &self,
        light_id: impl fmt::Display,
        state: LightStateUpdate,
    ) -> Result<Value> {
        let light_id = light_id.to_string();
        match self.light(&light_id).await {
            Some(light) => light.set_state(state, None).await,
            None => {
                warn!("cannot find light {} on bridge {}", light_id, self.id);
                Err(Error::LightNotFound(light_id))
            }
        }
    }

    /// Revokes the authorization of `username`. Returns the bridge's raw
    /// answer.
    pub async fn remove_authorization(&self, username: &str) -> Result<Value> {
        let url = self
            .endpoint_url(&format!("config/whitelist/{}", username))
            .await?;
        debug!("DELETE {}", url);
        self.transport
            .perform(Request::new(Method::Delete, url, None))
            .await
    }

    fn check_names(&self) -> Result<()> {
        if self.app_name.is_empty() || self.device_name.is_empty() {
            return Err(Error::InvalidAppOrDeviceName);
        }
        Ok(())
    }

    /// Asks the bridge once for a username.
    ///
    /// Succeeds with the bridge's answer both when a username was granted
    /// (it is stored on the bridge) and when the link button has not been
    /// pressed yet. Any other refusal is returned as
    /// [`Error::Authorization`].
    pub async fn authorize(&self) -> Result<AuthorizationResponse> {
        self.check_names()?;

        let body = json!({
            "devicetype": format!("{}#{}", self.app_name, self.device_name),
        });
        let ip = self.get_ip_address().await?;
        let url = construct_endpoint_url(&ip, "", "");
        debug!("POST {}", url);

        let response = self
            .transport
            .perform(Request::new(Method::Post, url, Some(body)))
            .await?;
        let first = first_element(response).ok_or(Error::EmptyResponse)?;
        let result: AuthorizationResponse =
            serde_json::from_value(first).map_err(Error::JsonLoad)?;

        if let Some(error) = &result.error {
            if !error.is_link_button_not_pressed() {
                warn!("bridge {} refused authorization: {}", self.id, error);
                return Err(Error::Authorization(error.clone()));
            }
            debug!("bridge {}: link button not pressed", self.id);
        } else if let Some(success) = &result.success {
            info!("bridge {} authorized {}", self.id, self.app_name);
            self.state.lock().await.username = success.username.clone();
        }

        Ok(result)
    }

    /// Polls [`Bridge::authorize`] once per second until the link button is
    /// pressed.
    ///
    /// Returns immediately if the bridge already has a username. Gives up
    /// with [`Error::AuthorizationTimeout`] after 60 attempts. Each attempt
    /// starts only after the previous one finished. Transport failures are
    /// retried on the next tick; a refusal other than "link button not
    /// pressed" ends the wait.
    pub async fn wait_for_authorization(&self) -> Result<()> {
        if self.is_authorized().await {
            return Ok(());
        }
        self.check_names()?;

        for attempt in 1..=Self::AUTHORIZATION_ATTEMPTS {
            runtime::sleep(Duration::from_millis(Self::AUTHORIZATION_INTERVAL_MS)).await;

            match self.authorize().await {
                Ok(result) if result.is_success() => return Ok(()),
                Ok(_) => debug!(
                    "authorization attempt {}/{} pending",
                    attempt,
                    Self::AUTHORIZATION_ATTEMPTS
                ),
                Err(e @ Error::Authorization(_)) => return Err(e),
                Err(e) => warn!("authorization attempt {} failed: {}", attempt, e),
            }
        }

        Err(Error::AuthorizationTimeout)
    }
}

impl fmt::Debug for Bridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bridge")
            .field("id", &self.id)
            .field("app_name", &self.app_name)
            .field("device_name", &self.device_name)
            .finish_non_exhaustive()
    }
}

/// Builds `http://{ip}/api/{username}/{endpoint}`, leaving out empty segments.
fn construct_endpoint_url(ip_address: &str, username: &str, endpoint: &str) -> String {
    let path = ["api", username, endpoint]
        .iter()
        .map(|segment| segment.trim_matches('/'))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    format!("http://{}/{}", ip_address, path)
}

/// Bridge answers may wrap the result in a one element array.
fn first_element(response: Value) -> Option<Value> {
    let first = match response {
        Value::Array(items) => items.into_iter().next()?,
        other => other,
    };
    (!first.is_null()).then_some(first)
}
