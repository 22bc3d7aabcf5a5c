//! HTTP request type and builder.
//!
//! Every request this crate sends is a JSON POST, so [`HttpRequest`] only
//! carries what varies between calls: the path, the body and an optional
//! request-scoped timeout.

use std::time::Duration;

/// Content type sent with every request body.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// A JSON POST request relative to the client's host.
///
/// # Example
///
/// ```rust
/// use circleci_core::clients::HttpRequest;
/// use serde_json::json;
/// use std::time::Duration;
///
/// let request = HttpRequest::builder("graphql-unstable", json!({"query": "{ me { id } }"}))
///     .timeout(Duration::from_secs(5))
///     .build();
///
/// assert_eq!(request.path, "graphql-unstable");
/// assert_eq!(request.timeout, Some(Duration::from_secs(5)));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    /// The path, relative to the host.
    pub path: String,
    /// The JSON body.
    pub body: serde_json::Value,
    /// Overrides the client's default timeout for this request.
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Creates a new builder for a POST to `path` with `body`.
    #[must_use]
    pub fn builder(path: impl Into<String>, body: impl Into<serde_json::Value>) -> HttpRequestBuilder {
        HttpRequestBuilder::new(path, body)
    }
}

/// Builder for constructing [`HttpRequest`] instances.
#[derive(Debug)]
pub struct HttpRequestBuilder {
    path: String,
    body: serde_json::Value,
    timeout: Option<Duration>,
}

impl HttpRequestBuilder {
    fn new(path: impl Into<String>, body: impl Into<serde_json::Value>) -> Self {
        Self {
            path: path.into(),
            body: body.into(),
            timeout: None,
        }
    }

    /// Sets a timeout for this request only.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the [`HttpRequest`].
    #[must_use]
    pub fn build(self) -> HttpRequest {
        HttpRequest {
            path: self.path,
            body: self.body,
            timeout: self.timeout,
        }
    }
}
