//! Bridge discovery via the vendor's public lookup service.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[cfg(feature = "http-reqwest")]
use crate::bridge::Bridge;
use crate::errors::Error;
use crate::transport::{Request, Transport};

type Result<T> = std::result::Result<T, Error>;

/// Lookup service listing the bridges registered from the caller's network.
pub const DISCOVERY_URL: &str = "https://www.meethue.com/api/nupnp";

/// Data describing a bridge, as returned by discovery or restored from
/// [`SavedBridge`].
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BridgeData {
    /// Vendor assigned bridge id
    pub id: String,
    /// Local IP address of the bridge, if known
    pub internalipaddress: Option<String>,
    /// Username obtained from a previous authorization
    pub username: Option<String>,
    /// Any other field reported by the discovery service
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BridgeData {
    pub fn new(id: &str) -> Self {
        BridgeData {
            id: id.to_string(),
            ..Default::default()
        }
    }

    /// Set the known IP address.
    pub fn with_ip_address(mut self, ip_address: &str) -> Self {
        self.internalipaddress = Some(ip_address.to_string());
        self
    }

    /// Set the username from a previous authorization.
    pub fn with_username(mut self, username: &str) -> Self {
        self.username = Some(username.to_string());
        self
    }

    /// Convert this descriptor into a [`Bridge`](crate::Bridge) using the default transport.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let bridges = Bridge::discover_bridges().await?;
    /// for data in bridges {
    ///     let bridge = data.into_bridge("my_app", "living_room_tablet");
    /// }
    /// ```
    #[cfg(feature = "http-reqwest")]
    pub fn into_bridge(self, app_name: &str, device_name: &str) -> Bridge {
        Bridge::new(self, app_name, device_name)
    }
}

/// The persistent part of a bridge: enough to rebuild it without running
/// the authorization flow again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedBridge {
    pub id: String,
    pub username: String,
}

impl From<SavedBridge> for BridgeData {
    fn from(saved: SavedBridge) -> Self {
        let username = (!saved.username.is_empty()).then_some(saved.username);
        BridgeData {
            id: saved.id,
            username,
            ..Default::default()
        }
    }
}

/// List the bridges known to the discovery service.
///
/// Issues a single GET to [`DISCOVERY_URL`] and returns the descriptors
/// exactly as reported. Transport errors are returned as-is; there is no
/// retry.
pub async fn discover_bridges(transport: &dyn Transport) -> Result<Vec<BridgeData>> {
    let response = transport.perform(Request::get(DISCOVERY_URL)).await?;
    debug!("discovery response: {:?}", response);
    serde_json::from_value(response).map_err(Error::JsonLoad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;
    use crate::transport::Method;
    use serde_json::json;

    #[tokio::test]
    async fn test_discover_bridges_single_get() {
        let transport = MockTransport::new();
        transport.reply(json!([
            {"id": "001788fffe100491", "internalipaddress": "192.168.2.23", "macaddress": "00:17:88:10:04:91"},
            {"id": "001788fffe09a1b2", "internalipaddress": "10.0.0.4"}
        ]));

        let bridges = discover_bridges(&*transport).await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Get);
        assert_eq!(requests[0].url, DISCOVERY_URL);
        assert!(requests[0].body.is_none());

        assert_eq!(bridges.len(), 2);
        assert_eq!(bridges[0].id, "001788fffe100491");
        assert_eq!(bridges[0].internalipaddress.as_deref(), Some("192.168.2.23"));
        assert_eq!(
            bridges[0].extra.get("macaddress"),
            Some(&json!("00:17:88:10:04:91"))
        );
        assert_eq!(bridges[1].id, "001788fffe09a1b2");
    }

    #[tokio::test]
    async fn test_discover_bridges_transport_error() {
        let transport = MockTransport::new();
        transport.fail(DISCOVERY_URL);

        let err = discover_bridges(&*transport).await.unwrap_err();
        assert_eq!(err, Error::timed_out(DISCOVERY_URL));
        assert_eq!(transport.request_count(), 1);
    }

    #[test]
    fn test_saved_bridge_round_trip() {
        let data = BridgeData::from(SavedBridge {
            id: "abc".into(),
            username: "user".into(),
        });
        assert_eq!(data, BridgeData::new("abc").with_username("user"));

        let data = BridgeData::from(SavedBridge {
            id: "abc".into(),
            username: String::new(),
        });
        assert!(data.username.is_none());
    }
}
