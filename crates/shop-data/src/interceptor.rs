//! Request and response interception.
//!
//! Interceptors observe every call made through an [`HttpClient`](crate::HttpClient).
//! Response interceptors only receive borrowed results: they can log or raise
//! side effects, but a failed call always reaches the caller as an `Err`.

use std::sync::Arc;

use crate::{FetchError, Request, Response};

/// Hook run on every outbound request before it reaches the transport.
pub trait RequestInterceptor: Send + Sync {
    /// Inspect or rewrite the request. Returning an error aborts the call.
    fn on_request(&self, request: Request) -> Result<Request, FetchError>;
}

/// Hook run on every completed call.
pub trait ResponseInterceptor: Send + Sync {
    /// Called for 2xx responses.
    fn on_response(&self, _request: &Request, _response: &Response) {}

    /// Called for non-2xx responses and transport failures.
    fn on_error(&self, request: &Request, error: &FetchError);
}

/// Receives authentication failures detected at the transport layer.
pub trait AuthFailureListener: Send + Sync {
    /// A request came back 401.
    fn on_unauthorized(&self, request: &Request);
}

/// Status-code table applied to every failed response.
///
/// | Status | Action |
/// |---|---|
/// | 401 | notify the [`AuthFailureListener`] |
/// | 403, 404, 500 | log |
/// | anything else | nothing |
pub struct StatusInterceptor {
    listener: Arc<dyn AuthFailureListener>,
}

impl StatusInterceptor {
    /// Create an interceptor reporting 401s to `listener`.
    pub fn new(listener: Arc<dyn AuthFailureListener>) -> Self {
        Self { listener }
    }
}

impl ResponseInterceptor for StatusInterceptor {
    fn on_error(&self, request: &Request, error: &FetchError) {
        match error.status() {
            Some(401) => {
                tracing::info!(
                    method = %request.method,
                    url = %request.url,
                    "unauthorized response"
                );
                self.listener.on_unauthorized(request);
            }
            Some(403) => {
                tracing::error!(method = %request.method, url = %request.url, "Access denied");
            }
            Some(404) => {
                tracing::error!(method = %request.method, url = %request.url, "Resource not found");
            }
            Some(500) => {
                tracing::error!(method = %request.method, url = %request.url, "Server error");
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Method;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct CountingListener(AtomicUsize);

    impl AuthFailureListener for CountingListener {
        fn on_unauthorized(&self, _request: &Request) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn request() -> Request {
        Request {
            method: Method::Get,
            url: "/api/orders".to_string(),
            headers: HashMap::new(),
            body: None,
            with_credentials: true,
            timeout: Duration::from_secs(30),
        }
    }

    fn http(status: u16) -> FetchError {
        FetchError::HttpError {
            status,
            message: String::new(),
        }
    }

    #[test]
    fn test_only_401_reaches_listener() {
        let listener = Arc::new(CountingListener::default());
        let interceptor = StatusInterceptor::new(listener.clone());

        for status in [400, 403, 404, 409, 500, 502] {
            interceptor.on_error(&request(), &http(status));
        }
        interceptor.on_error(&request(), &FetchError::RequestError("refused".into()));
        assert_eq!(listener.0.load(Ordering::SeqCst), 0);

        interceptor.on_error(&request(), &http(401));
        assert_eq!(listener.0.load(Ordering::SeqCst), 1);
    }
}
