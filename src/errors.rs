use std::fmt;

use serde::{Deserialize, Serialize};

/// Boxed source error carried by transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// All error types that can occur when talking to a Hue bridge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to serialize data to JSON.
    #[error("failed to dump json: {0:?}")]
    JsonDump(serde_json::Error),

    /// Failed to deserialize JSON data.
    #[error("failed to load json: {0:?}")]
    JsonLoad(serde_json::Error),

    /// The HTTP request could not be completed.
    #[error("http request to {url} failed: {err}")]
    Http { url: String, err: BoxError },

    /// The HTTP request did not complete in time.
    #[error("http request to {url} timed out")]
    TimedOut { url: String },

    /// Discovery did not return a bridge with the requested id.
    #[error("bridge not found: {0}")]
    BridgeNotFound(String),

    /// The bridge answered with an empty response array.
    #[error("empty response from bridge")]
    EmptyResponse,

    /// The bridge answered with an error object.
    #[error("bridge api error: {0}")]
    Api(ApiError),

    /// The bridge refused the authorization request for a reason other
    /// than the link button not being pressed.
    #[error("authorization error: {0}")]
    Authorization(ApiError),

    /// `authorize` was called without an app or device name.
    #[error("Invalid app or device name.")]
    InvalidAppOrDeviceName,

    /// The link button was not pressed within the polling window.
    #[error("authorization was not granted in time")]
    AuthorizationTimeout,

    /// The requested light is not in the bridge's light cache.
    #[error("light not found: {0}")]
    LightNotFound(String),

    /// The light did not report a color (e.g. a white-only lamp).
    #[error("light {0} does not report a color")]
    MissingColor(String),

    /// Failed to parse a [`crate::Color`] from a string.
    #[error("invalid color string: {0}")]
    InvalidColorString(String),

    /// Failed to coerce a value into a brightness level.
    #[error("invalid brightness: {0}")]
    InvalidBrightness(String),
}

impl Error {
    /// Create a new HTTP error
    pub fn http(url: &str, err: impl Into<BoxError>) -> Self {
        Error::Http {
            url: url.to_string(),
            err: err.into(),
        }
    }

    /// Create a new timeout error
    pub fn timed_out(url: &str) -> Self {
        Error::TimedOut {
            url: url.to_string(),
        }
    }

    /// Returns the API error payload, if this error carries one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) | Error::Authorization(err) => Some(err),
            _ => None,
        }
    }
}

/// An error object as returned by the bridge, e.g.
/// `{"type": 101, "address": "", "description": "link button not pressed"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ApiError {
    #[serde(rename = "type")]
    pub error_type: u16,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub description: String,
}

impl ApiError {
    /// The bridge is waiting for its physical link button to be pressed.
    pub const LINK_BUTTON_NOT_PRESSED: u16 = 101;

    pub fn is_link_button_not_pressed(&self) -> bool {
        self.error_type == Self::LINK_BUTTON_NOT_PRESSED
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type {}", self.error_type)?;
        if !self.address.is_empty() {
            write!(f, " at {}", self.address)?;
        }
        if !self.description.is_empty() {
            write!(f, ": {}", self.description)?;
        }
        Ok(())
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_app_or_device_name_message() {
        assert_eq!(
            Error::InvalidAppOrDeviceName.to_string(),
            "Invalid app or device name."
        );
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError {
            error_type: 101,
            address: String::new(),
            description: "link button not pressed".into(),
        };
        assert!(err.is_link_button_not_pressed());
        assert_eq!(err.to_string(), "type 101: link button not pressed");

        let err = ApiError {
            error_type: 3,
            address: "/lights/9".into(),
            description: "resource, /lights/9, not available".into(),
        };
        assert_eq!(
            Error::Api(err).to_string(),
            "bridge api error: type 3 at /lights/9: resource, /lights/9, not available"
        );
    }

    #[test]
    fn test_api_error_accessor() {
        let err = Error::Authorization(ApiError {
            error_type: 7,
            ..Default::default()
        });
        assert_eq!(err.api_error().map(|e| e.error_type), Some(7));
        assert!(Error::EmptyResponse.api_error().is_none());
    }
}
