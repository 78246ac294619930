//! Bridge configuration as returned by the `config` endpoint.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An application registered on the bridge.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WhitelistEntry {
    #[serde(rename = "last use date", default)]
    pub last_use_date: Option<String>,
    #[serde(rename = "create date", default)]
    pub create_date: Option<String>,
    #[serde(default)]
    pub name: String,
}

/// Configuration of a Hue bridge.
///
/// Unauthorized requests only receive a subset of these fields, so all of
/// them are optional. Anything the bridge reports beyond the known fields
/// ends up in [`BridgeConfig::extra`].
#[serde_with::skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub name: String,
    pub swupdate: Option<Value>,
    #[serde(default)]
    pub whitelist: BTreeMap<String, WhitelistEntry>,
    pub apiversion: Option<String>,
    pub swversion: Option<String>,
    pub proxyaddress: Option<String>,
    pub proxyport: Option<u16>,
    pub linkbutton: Option<bool>,
    pub ipaddress: Option<String>,
    pub mac: Option<String>,
    pub netmask: Option<String>,
    pub gateway: Option<String>,
    pub dhcp: Option<bool>,
    pub portalservices: Option<bool>,
    #[serde(rename = "UTC")]
    pub utc: Option<String>,
    pub localtime: Option<String>,
    pub timezone: Option<String>,
    pub zigbeechannel: Option<u8>,
    pub modelid: Option<String>,
    pub bridgeid: Option<String>,
    pub factorynew: Option<bool>,
    pub replacesbridgeid: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BridgeConfig {
    /// Whether `username` is registered on this bridge.
    pub fn is_whitelisted(&self, username: &str) -> bool {
        self.whitelist.contains_key(username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_config() {
        let config: BridgeConfig = serde_json::from_value(json!({
            "name": "Philips hue",
            "zigbeechannel": 15,
            "bridgeid": "001788FFFE100491",
            "mac": "00:17:88:10:04:91",
            "dhcp": true,
            "ipaddress": "192.168.1.7",
            "UTC": "2017-05-01T12:00:00",
            "whitelist": {
                "83b7780291a6ceffbe0bd049104df": {
                    "last use date": "2017-05-01T11:59:01",
                    "create date": "2017-04-28T10:00:00",
                    "name": "lightboard#webapp"
                }
            },
            "apiversion": "1.16.0",
            "swversion": "01038802",
            "linkbutton": false,
            "starterkitid": ""
        }))
        .unwrap();

        assert_eq!(config.name, "Philips hue");
        assert_eq!(config.zigbeechannel, Some(15));
        assert_eq!(config.utc.as_deref(), Some("2017-05-01T12:00:00"));
        assert!(config.is_whitelisted("83b7780291a6ceffbe0bd049104df"));
        assert_eq!(
            config.whitelist["83b7780291a6ceffbe0bd049104df"].name,
            "lightboard#webapp"
        );
        assert_eq!(config.extra.get("starterkitid"), Some(&json!("")));
    }

    #[test]
    fn test_unauthorized_subset() {
        let config: BridgeConfig = serde_json::from_value(json!({
            "name": "Hue",
            "swversion": "1941132080",
            "apiversion": "1.41.0"
        }))
        .unwrap();
        assert!(config.whitelist.is_empty());
        assert!(!config.is_whitelisted("anyone"));
        assert!(config.extra.is_empty());
    }
}
