//! HTTP transport used to reach bridges and the discovery service.
//!
//! A [`Transport`] turns a [`Request`] into the parsed JSON body of the
//! response. It holds no per-bridge state, so a bridge can be driven by any
//! implementation, including a scripted one in tests.

use futures::future::BoxFuture;
use serde_json::Value;
use strum_macros::{Display, EnumString};

use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// HTTP methods understood by the bridge API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
}

/// A single call against a bridge or the discovery service.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub body: Option<Value>,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>, body: Option<Value>) -> Self {
        Request {
            method,
            url: url.into(),
            body,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url, None)
    }
}

/// Performs one request and yields the parsed JSON response.
///
/// Implementations must report network failures as [`Error::Http`] or
/// [`Error::TimedOut`] and undecodable bodies as [`Error::JsonLoad`]. Bridge
/// level error objects are *not* errors at this layer; they are returned as
/// ordinary JSON and interpreted by [`crate::Bridge`].
pub trait Transport: Send + Sync {
    fn perform(&self, request: Request) -> BoxFuture<'_, Result<Value>>;
}

#[cfg(feature = "http-reqwest")]
pub use self::http::HttpTransport;

#[cfg(feature = "http-reqwest")]
mod http {
    use std::time::Duration;

    use futures::FutureExt;
    use futures::future::BoxFuture;
    use log::debug;
    use serde_json::Value;

    use super::{Method, Request, Result, Transport};
    use crate::errors::Error;
    use crate::runtime;

    /// [`Transport`] backed by a reqwest client.
    #[derive(Debug, Clone)]
    pub struct HttpTransport {
        client: reqwest::Client,
        timeout: Duration,
    }

    impl HttpTransport {
        const DEFAULT_TIMEOUT_MS: u64 = 10_000;

        pub fn new() -> Self {
            Self::with_timeout(Duration::from_millis(Self::DEFAULT_TIMEOUT_MS))
        }

        /// Create a transport that gives up on requests after `timeout`.
        pub fn with_timeout(timeout: Duration) -> Self {
            HttpTransport {
                client: reqwest::Client::new(),
                timeout,
            }
        }

        pub fn timeout(&self) -> Duration {
            self.timeout
        }

        async fn send(&self, request: Request) -> Result<Value> {
            let method = match request.method {
                Method::Get => reqwest::Method::GET,
                Method::Put => reqwest::Method::PUT,
                Method::Post => reqwest::Method::POST,
                Method::Delete => reqwest::Method::DELETE,
            };

            let mut builder = self.client.request(method, &request.url);
            if let Some(body) = &request.body {
                let body = serde_json::to_string(body).map_err(Error::JsonDump)?;
                builder = builder
                    .header(reqwest::header::CONTENT_TYPE, "application/json")
                    .body(body);
            }

            let url = request.url.as_str();
            let text = runtime::timeout(self.timeout, async {
                let response = builder.send().await.map_err(|e| Error::http(url, e))?;
                response.text().await.map_err(|e| Error::http(url, e))
            })
            .await
            .map_err(|_| Error::timed_out(url))??;

            debug!("HTTP response from {}: {}", url, text);
            serde_json::from_str(&text).map_err(Error::JsonLoad)
        }
    }

    impl Default for HttpTransport {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Transport for HttpTransport {
        fn perform(&self, request: Request) -> BoxFuture<'_, Result<Value>> {
            self.send(request).boxed()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Delete.to_string(), "DELETE");
        assert_eq!(Method::from_str("PUT").unwrap(), Method::Put);
    }

    #[test]
    fn test_get_request_has_no_body() {
        let request = Request::get("https://example.invalid/");
        assert_eq!(request.method, Method::Get);
        assert!(request.body.is_none());
    }

    #[cfg(feature = "http-reqwest")]
    #[test]
    fn test_http_transport_default_timeout() {
        let transport = HttpTransport::default();
        assert_eq!(transport.timeout(), std::time::Duration::from_secs(10));
    }

    /// Answers a single HTTP request with `body` and returns the URL to hit.
    #[cfg(feature = "http-reqwest")]
    fn serve_once(body: &'static str) -> String {
        use std::io::{Read, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 512];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
        });
        format!("http://{}/api", addr)
    }

    #[cfg(feature = "http-reqwest")]
    #[tokio::test]
    async fn test_http_transport_parses_json() {
        let url = serve_once(r#"[{"success":{"username":"abc"}}]"#);
        let value = HttpTransport::new().perform(Request::get(url)).await.unwrap();
        assert_eq!(value, serde_json::json!([{"success": {"username": "abc"}}]));
    }

    #[cfg(feature = "http-reqwest")]
    #[tokio::test]
    async fn test_http_transport_rejects_non_json_body() {
        let url = serve_once("not json");
        let err = HttpTransport::new().perform(Request::get(url)).await.unwrap_err();
        assert!(matches!(err, Error::JsonLoad(_)), "{:?}", err);
    }

    #[cfg(feature = "http-reqwest")]
    #[tokio::test]
    async fn test_http_transport_connection_refused() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/api", listener.local_addr().unwrap());
        drop(listener);

        let err = HttpTransport::new()
            .perform(Request::get(url.as_str()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http { url: ref u, .. } if *u == url), "{:?}", err);
    }

    #[cfg(feature = "http-reqwest")]
    #[tokio::test]
    async fn test_http_transport_times_out() {
        // Connections queue in the backlog but are never answered.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/api", listener.local_addr().unwrap());

        let transport = HttpTransport::with_timeout(std::time::Duration::from_millis(10));
        let err = transport.perform(Request::get(url.as_str())).await.unwrap_err();
        assert_eq!(err, Error::timed_out(&url));
        drop(listener);
    }
}
