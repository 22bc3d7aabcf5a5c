//! HTTP client for the remote service.
//!
//! This module provides the [`HttpClient`] type, which sends JSON POST
//! requests with the default headers every call needs.

use std::collections::HashMap;

use crate::clients::errors::{HttpResponseError, TransportError};
use crate::clients::http_request::{HttpRequest, JSON_CONTENT_TYPE};
use crate::clients::http_response::HttpResponse;
use crate::config::{ClientConfig, HostUrl};
use crate::error::ConfigError;

/// Crate version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Low-level HTTP client.
///
/// The client handles:
/// - URL construction from the configured host
/// - Default headers: `User-Agent`, `Accept`, `Content-Type` and, only when a
///   token is configured, `Authorization` carrying the raw token
/// - The configured default timeout
///
/// It performs exactly one attempt per call; there is no retry logic.
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`; concurrent calls share only immutable
/// state and reqwest's connection pool.
#[derive(Debug)]
pub struct HttpClient {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// Base URL of the service.
    host: HostUrl,
    /// Default headers to include in all requests.
    default_headers: HashMap<String, String>,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new HTTP client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClientInit`] if the underlying reqwest
    /// client cannot be created (e.g., TLS initialization failure).
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent =
            format!("{user_agent_prefix}circleci-core v{SDK_VERSION} | Rust {rust_version}");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());
        default_headers.insert("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string());

        // Unauthenticated calls carry no Authorization header at all.
        if !config.token().is_empty() {
            default_headers.insert(
                "Authorization".to_string(),
                config.token().as_ref().to_string(),
            );
        }

        let mut builder = reqwest::Client::builder().use_rustls_tls();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| ConfigError::HttpClientInit {
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            host: config.host().clone(),
            default_headers,
        })
    }

    /// Returns the host this client sends requests to.
    #[must_use]
    pub const fn host(&self) -> &HostUrl {
        &self.host
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Sends `request` as a JSON POST and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Status`] for a non-2xx response,
    /// [`TransportError::Timeout`] if the request or the configured
    /// timeout elapsed, and [`TransportError::Network`] for any other
    /// connection failure.
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = self.host.join(&request.path);

        let mut req_builder = self.client.post(&url);
        for (key, value) in &self.default_headers {
            req_builder = req_builder.header(key, value);
        }
        if let Some(timeout) = request.timeout {
            req_builder = req_builder.timeout(timeout);
        }
        req_builder = req_builder.body(request.body.to_string());

        tracing::debug!(%url, "Sending request");
        let res = req_builder.send().await?;

        let code = res.status().as_u16();
        let headers = Self::parse_response_headers(res.headers());
        let body = res.text().await?;
        let response = HttpResponse::new(code, headers, body);

        tracing::debug!(
            %url,
            status = code,
            request_id = response.request_id().unwrap_or_default(),
            "Received response"
        );

        if response.is_ok() {
            return Ok(response);
        }

        Err(TransportError::Status(HttpResponseError {
            code,
            request_id: response.request_id().map(String::from),
            body: response.body,
        }))
    }

    /// Parses response headers into a `HashMap`.
    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }
}
