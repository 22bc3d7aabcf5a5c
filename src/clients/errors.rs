//! Transport-level error types.
//!
//! A [`TransportError`] means the request never produced a usable 2xx
//! response: the server answered with a non-success status, the connection
//! failed, or the request timed out. These are never retried here; retry
//! policy belongs to the caller.
//!
//! # Example
//!
//! ```rust,ignore
//! use circleci_core::{ApiError, TransportError};
//!
//! match client.execute(query, variables).await {
//!     Err(ApiError::Transport(e)) if e.is_timeout() => println!("timed out"),
//!     Err(ApiError::Transport(e)) => {
//!         println!("HTTP {:?}: {}", e.status_code(), e.raw_body().unwrap_or_default());
//!     }
//!     other => { /* ... */ }
//! }
//! ```

use thiserror::Error;

/// Error returned when the endpoint answers with a non-2xx status.
///
/// Carries the raw body verbatim for diagnosis.
///
/// # Example
///
/// ```rust
/// use circleci_core::clients::HttpResponseError;
///
/// let error = HttpResponseError {
///     code: 500,
///     body: "upstream failure".to_string(),
///     request_id: Some("abc-123".to_string()),
/// };
///
/// assert!(error.to_string().contains("500"));
/// assert!(error.to_string().contains("upstream failure"));
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Request failed with HTTP status {code}: {body}")]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// The unparsed response body.
    pub body: String,
    /// Value of the `X-Request-Id` response header, if present.
    pub request_id: Option<String>,
}

/// Network or HTTP-status failure while executing a request.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The endpoint returned a non-2xx status.
    #[error(transparent)]
    Status(#[from] HttpResponseError),

    /// The request did not complete within its timeout.
    #[error("Request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// Connection, TLS or body-read failure.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),
}

impl TransportError {
    /// Returns the HTTP status code, when the server responded.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status(e) => Some(e.code),
            Self::Timeout(e) | Self::Network(e) => e.status().map(|s| s.as_u16()),
        }
    }

    /// Returns the raw response body, when the server responded.
    #[must_use]
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            Self::Status(e) => Some(&e.body),
            Self::Timeout(_) | Self::Network(_) => None,
        }
    }

    /// Returns `true` if the request was abandoned because of a timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout(error)
        } else {
            Self::Network(error)
        }
    }
}
