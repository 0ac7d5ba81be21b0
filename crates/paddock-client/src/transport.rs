//! HTTP transport seam
//!
//! The connection layer only needs an opaque session that can send one
//! request and return one response. [`Transport`] is that seam:
//! [`ReqwestTransport`] is the production implementation, and tests swap in
//! scripted mocks to observe and script every exchange.
//!
//! Connection pooling, TLS, and redirects live entirely behind the trait.

use async_trait::async_trait;
use paddock_core::{PaddockError, Result};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// HTTP methods the client issues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Put,
    Delete,
}

impl Method {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Patch => write!(f, "PATCH"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
        }
    }
}

/// Request body variants
#[derive(Debug, Clone, Default)]
pub enum Body {
    #[default]
    Empty,
    Json(serde_json::Value),
    Bytes {
        content_type: String,
        data: Vec<u8>,
    },
}

/// A request as seen by the transport
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

impl HttpRequest {
    pub fn new(method: Method, url: String) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: Body::Empty,
        }
    }

    pub fn with_json(mut self, value: serde_json::Value) -> Self {
        self.body = Body::Json(value);
        self
    }

    pub fn with_bytes(mut self, content_type: &str, data: Vec<u8>) -> Self {
        self.body = Body::Bytes {
            content_type: content_type.to_string(),
            data,
        };
        self
    }

    /// Set a header, replacing any existing value for the same name
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value));
    }

    /// Get a header value by name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A response as seen by the transport
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Response body as UTF-8 text (lossy)
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Deserialize the response body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| PaddockError::Protocol(format!("Unexpected response body: {}", e)))
    }
}

/// Opaque HTTP session: one request in, one response out.
///
/// A non-2xx status is a normal response, not an error; errors are reserved
/// for transport-level failures (connect, TLS, timeout).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// Production transport backed by one shared `reqwest::Client`.
///
/// The inner client is created once and pools connections for its lifetime;
/// replacing server URLs or credentials on the connection never recreates it.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PaddockError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let mut req = self
            .client
            .request(request.method.as_reqwest(), &request.url);

        for (name, value) in &request.headers {
            req = req.header(name, value);
        }

        match &request.body {
            Body::Empty => {}
            Body::Json(value) => req = req.json(value),
            Body::Bytes { content_type, data } => {
                req = req.header("content-type", content_type).body(data.clone());
            }
        }

        let response = req
            .send()
            .await
            .map_err(|e| PaddockError::Transport(format!("Failed to send request: {}", e)))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(n, v)| {
                (
                    n.as_str().to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| PaddockError::Transport(format!("Failed to read response body: {}", e)))?
            .to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_header_replaces_existing() {
        let mut req = HttpRequest::new(Method::Get, "http://x/v1/users".to_string());
        req.set_header("Authorization", "Bearer a".to_string());
        req.set_header("authorization", "Bearer b".to_string());

        assert_eq!(req.header("Authorization"), Some("Bearer b"));
        assert_eq!(
            req.headers
                .iter()
                .filter(|(n, _)| n.eq_ignore_ascii_case("authorization"))
                .count(),
            1
        );
    }

    #[test]
    fn test_response_json() {
        let resp = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: br#"{"pk": 1, "name": "t", "version": "2.0"}"#.to_vec(),
        };
        let fw: paddock_core::Framework = resp.json().unwrap();
        assert_eq!(fw.pk, 1);
    }

    #[test]
    fn test_response_json_malformed_is_protocol_error() {
        let resp = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: b"not json".to_vec(),
        };
        let err = resp.json::<paddock_core::User>().unwrap_err();
        assert!(matches!(err, paddock_core::PaddockError::Protocol(_)));
    }

    #[test]
    fn test_status_classes() {
        let ok = HttpResponse {
            status: 204,
            headers: Vec::new(),
            body: Vec::new(),
        };
        assert!(ok.is_success());

        let unauthorized = HttpResponse {
            status: 401,
            headers: Vec::new(),
            body: Vec::new(),
        };
        assert!(!unauthorized.is_success());
    }
}
