//! # hue_bridge_rs
//!
//! An async Rust client for the Philips Hue bridge REST API.
//!
//! This crate finds a bridge on your local network, authorizes an
//! application against it through the link-button flow, and exposes each
//! light's state as simple get/set operations with color conversions between
//! RGB, hex, HSB and the bridge's native CIE xy + brightness.
//!
//! ## Quick Start
//!
//! ```ignore
//! use hue_bridge_rs::Bridge;
//!
//! async fn control_lights() -> Result<(), Box<dyn std::error::Error>> {
//!     // Find the first bridge registered from this network
//!     let data = Bridge::discover_bridges().await?.remove(0);
//!     let bridge = data.into_bridge("my_app", "my_device");
//!
//!     // Press the link button on the bridge within 60 seconds
//!     bridge.wait_for_authorization().await?;
//!     println!("save this username: {}", bridge.username().await);
//!
//!     for light in bridge.get_lights().await? {
//!         light.set_color_rgb(255, 128, 0, None).await?;
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Discovery**: Find bridges with [`Bridge::discover_bridges`]
//! - **Authorization**: Poll for the link button with [`Bridge::wait_for_authorization`]
//! - **Lights**: Enumerate with [`Bridge::get_lights`], control through [`Light`]
//! - **Colors**: Convert between [`Color`], [`Hsb`] and [`CieColor`]
//! - **Pluggable transport**: Drive a bridge through any [`Transport`]
//!
//! ## Communication
//!
//! Discovery goes through the vendor's public service over HTTPS. Everything
//! else is plain HTTP to `http://{bridge ip}/api/{username}/...` with JSON
//! bodies. Transition times are given as [`std::time::Duration`] and sent in
//! deciseconds.
//!
//! ## Feature Flags
//!
//! - `runtime-tokio` (default): Use the tokio async runtime
//! - `runtime-async-std`: Use the async-std runtime
//! - `runtime-smol`: Use the smol runtime
//! - `http-reqwest` (default): Provide [`HttpTransport`] and the
//!   constructors that use it

mod bridge;
mod config;
mod discovery;
mod errors;
mod light;
pub mod runtime;
mod state;
mod transport;
mod types;

#[cfg(test)]
mod mock;

// Re-export public API
pub use bridge::{AuthorizationResponse, AuthorizationSuccess, Bridge};
pub use config::{BridgeConfig, WhitelistEntry};
pub use discovery::{BridgeData, DISCOVERY_URL, SavedBridge, discover_bridges};
pub use errors::{ApiError, BoxError, Error};
pub use light::{Light, LightData};
pub use state::{Alert, ColorMode, Effect, LightState, LightStateUpdate};
#[cfg(feature = "http-reqwest")]
pub use transport::HttpTransport;
pub use transport::{Method, Request, Transport};
pub use types::{Brightness, CieColor, Color, Hsb, IntoBrightness};
