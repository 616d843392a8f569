//! HTTP request types.

use crate::FetchError;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// HTTP methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl Method {
    /// Convert to HTTP method string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully configured outbound request, as seen by interceptors and transports.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// HTTP method.
    pub method: Method,
    /// Request URL. Relative when the client has no base URL (same-origin).
    pub url: String,
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Optional body.
    pub body: Option<Vec<u8>>,
    /// Whether cookies/credentials travel with the request.
    pub with_credentials: bool,
    /// Timeout ceiling applied by the client.
    pub timeout: Duration,
}

impl Request {
    /// Get a header value (case-insensitive).
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// A builder for constructing HTTP requests.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    pub(crate) method: Method,
    pub(crate) url: String,
    pub(crate) headers: HashMap<String, String>,
    pub(crate) body: Option<Vec<u8>>,
}

impl RequestBuilder {
    /// Create a new request builder.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set the request body as raw bytes.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: Serialize>(mut self, value: &T) -> Result<Self, FetchError> {
        let json = serde_json::to_vec(value)?;
        self.headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        self.body = Some(json);
        Ok(self)
    }

    /// Finish the request with the client-wide settings.
    pub(crate) fn build(self, with_credentials: bool, timeout: Duration) -> Request {
        Request {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
            with_credentials,
            timeout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_body_sets_content_type() {
        let req = RequestBuilder::new(Method::Post, "/api/orders")
            .json(&serde_json::json!({ "product_id": 7 }))
            .unwrap()
            .build(true, Duration::from_secs(30));

        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.body.as_deref(), Some(br#"{"product_id":7}"#.as_slice()));
        assert!(req.with_credentials);
    }

    #[test]
    fn test_raw_body_keeps_explicit_content_type() {
        let req = RequestBuilder::new(Method::Put, "/notes")
            .header("Content-Type", "text/markdown")
            .body("# hi")
            .build(false, Duration::from_secs(1));

        assert_eq!(req.header("Content-Type"), Some("text/markdown"));
        assert_eq!(req.body.as_deref(), Some(b"# hi".as_slice()));
        assert!(!req.with_credentials);
    }

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }
}
