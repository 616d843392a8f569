//! HTTP client for the storefront shell.
//!
//! One [`HttpClient`] is shared by every store. It carries the base URL,
//! timeout ceiling and credential policy, and runs each call through the
//! interceptor chain:
//!
//! ```text
//! RequestBuilder -> request interceptors -> Transport -> status check
//!                                                      -> response interceptors -> caller
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use shop_data::{HttpClient, MockTransport, StatusInterceptor};
//!
//! let client = HttpClient::builder(Arc::new(MockTransport::new()))
//!     .base_url("https://shop.example.com")
//!     .response_interceptor(Arc::new(StatusInterceptor::new(listener)))
//!     .build();
//!
//! let info: serde_json::Value = client.get_json("/api/user/info").await?;
//! ```

mod error;
mod interceptor;
mod request;
mod response;
mod transport;

use std::sync::Arc;
use std::time::Duration;

pub use error::FetchError;
pub use interceptor::{
    AuthFailureListener, RequestInterceptor, ResponseInterceptor, StatusInterceptor,
};
pub use request::{Method, Request, RequestBuilder};
pub use response::Response;
pub use transport::{MockTransport, ReqwestTransport, Transport};

/// Default timeout ceiling for every request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client-wide request settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Prepended to relative URLs. `None` keeps URLs same-origin.
    pub base_url: Option<String>,
    /// Timeout ceiling for a single call.
    pub timeout: Duration,
    /// Include credentials (cookies) on every request.
    pub with_credentials: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            with_credentials: true,
        }
    }
}

struct ClientInner {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
}

/// Shared HTTP client. Cloning is cheap and yields the same client.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<ClientInner>,
}

impl HttpClient {
    /// Start building a client on top of `transport`.
    pub fn builder(transport: Arc<dyn Transport>) -> HttpClientBuilder {
        HttpClientBuilder {
            config: ClientConfig::default(),
            transport,
            request_interceptors: Vec::new(),
            response_interceptors: Vec::new(),
        }
    }

    /// Client settings.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Create a GET request.
    pub fn get(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Get, url)
    }

    /// Create a POST request.
    pub fn post(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Post, url)
    }

    /// Create a PUT request.
    pub fn put(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Put, url)
    }

    /// Create a DELETE request.
    pub fn delete(&self, url: impl Into<String>) -> ClientRequestBuilder {
        self.request(Method::Delete, url)
    }

    /// Create a request with a custom method.
    pub fn request(&self, method: Method, url: impl Into<String>) -> ClientRequestBuilder {
        let url = self.resolve_url(url.into());
        ClientRequestBuilder {
            client: self.clone(),
            builder: RequestBuilder::new(method, url),
        }
    }

    /// GET `url` and decode the JSON body.
    pub async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: impl Into<String>,
    ) -> Result<T, FetchError> {
        self.get(url).send().await?.json()
    }

    fn resolve_url(&self, url: String) -> String {
        match &self.inner.config.base_url {
            Some(base) if !url.starts_with("http://") && !url.starts_with("https://") => {
                format!(
                    "{}/{}",
                    base.trim_end_matches('/'),
                    url.trim_start_matches('/')
                )
            }
            _ => url,
        }
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response, FetchError> {
        let config = &self.inner.config;
        let mut request = builder.build(config.with_credentials, config.timeout);
        for interceptor in &self.inner.request_interceptors {
            request = interceptor.on_request(request)?;
        }

        let timeout = request.timeout;
        let sent = self.inner.transport.send(request.clone());
        let result = match tokio::time::timeout(timeout, sent).await {
            Ok(result) => result.and_then(Response::error_for_status),
            Err(_) => Err(FetchError::Timeout(timeout.as_millis() as u64)),
        };

        match &result {
            Ok(response) => {
                for interceptor in &self.inner.response_interceptors {
                    interceptor.on_response(&request, response);
                }
            }
            Err(error) => {
                tracing::debug!(
                    method = %request.method,
                    url = %request.url,
                    %error,
                    "request failed"
                );
                for interceptor in &self.inner.response_interceptors {
                    interceptor.on_error(&request, error);
                }
            }
        }
        result
    }
}

/// Builder for [`HttpClient`].
pub struct HttpClientBuilder {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
}

impl HttpClientBuilder {
    /// Replace all settings at once.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the base URL prepended to relative request paths.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = Some(base_url.into());
        self
    }

    /// Set the timeout ceiling.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Include or omit credentials.
    pub fn with_credentials(mut self, with_credentials: bool) -> Self {
        self.config.with_credentials = with_credentials;
        self
    }

    /// Append a request interceptor. Interceptors run in insertion order.
    pub fn request_interceptor(mut self, interceptor: Arc<dyn RequestInterceptor>) -> Self {
        self.request_interceptors.push(interceptor);
        self
    }

    /// Append a response interceptor. Interceptors run in insertion order.
    pub fn response_interceptor(mut self, interceptor: Arc<dyn ResponseInterceptor>) -> Self {
        self.response_interceptors.push(interceptor);
        self
    }

    pub fn build(self) -> HttpClient {
        HttpClient {
            inner: Arc::new(ClientInner {
                config: self.config,
                transport: self.transport,
                request_interceptors: self.request_interceptors,
                response_interceptors: self.response_interceptors,
            }),
        }
    }
}

/// A request builder bound to a client.
pub struct ClientRequestBuilder {
    client: HttpClient,
    builder: RequestBuilder,
}

impl ClientRequestBuilder {
    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.header(key, value);
        self
    }

    /// Set the request body as raw bytes.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: serde::Serialize>(mut self, value: &T) -> Result<Self, FetchError> {
        self.builder = self.builder.json(value)?;
        Ok(self)
    }

    /// Send the request through the interceptor chain.
    pub async fn send(self) -> Result<Response, FetchError> {
        self.client.execute(self.builder).await
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{FetchError, HttpClient, Method, Response, Transport};
}
