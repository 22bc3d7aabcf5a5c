//! Client configuration types.
//!
//! This module provides the explicit configuration handle that the command
//! layer constructs once at process start and passes to
//! [`ApiClient`](crate::ApiClient).
//!
//! # Overview
//!
//! - [`ClientConfig`]: immutable host, token and transport settings
//! - [`ClientConfigBuilder`]: a builder for [`ClientConfig`]
//! - [`HostUrl`]: a validated base URL of the remote service
//! - [`AuthToken`]: a bearer credential with masked debug output
//!
//! # Example
//!
//! ```rust
//! use circleci_core::{AuthToken, ClientConfig, HostUrl};
//! use std::time::Duration;
//!
//! let config = ClientConfig::builder()
//!     .host(HostUrl::new("https://circleci.com").unwrap())
//!     .token(AuthToken::new("my-token"))
//!     .timeout(Duration::from_secs(30))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.graphql_url(), "https://circleci.com/graphql-unstable");
//! ```

mod newtypes;

pub use newtypes::{AuthToken, HostUrl};

use std::time::Duration;

use crate::error::ConfigError;
use crate::settings::Settings;

/// Host used when the settings file does not name one.
pub const DEFAULT_HOST: &str = "https://circleci.com";

/// Path of the GraphQL endpoint, relative to the host.
pub const GRAPHQL_ENDPOINT: &str = "graphql-unstable";

/// Configuration for an [`ApiClient`](crate::ApiClient).
///
/// `ClientConfig` is `Clone + Send + Sync` and is never mutated after
/// construction; every client built from it captures the same host and
/// token.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    host: HostUrl,
    token: AuthToken,
    timeout: Option<Duration>,
    user_agent_prefix: Option<String>,
}

impl ClientConfig {
    /// Creates a new builder for constructing a `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Builds a configuration from loaded settings.
    ///
    /// An empty `host` falls back to [`DEFAULT_HOST`]; an empty token yields
    /// an unauthenticated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidHostUrl`] if the stored host is not a URL.
    ///
    /// # Example
    ///
    /// ```rust
    /// use circleci_core::{ClientConfig, Settings};
    ///
    /// let config = ClientConfig::from_settings(&Settings::default()).unwrap();
    /// assert_eq!(config.host().as_ref(), "https://circleci.com");
    /// assert!(config.token().is_empty());
    /// ```
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let host = if settings.host.trim().is_empty() {
            HostUrl::new(DEFAULT_HOST)?
        } else {
            HostUrl::new(settings.host.as_str())?
        };

        Self::builder()
            .host(host)
            .token(settings.token.clone())
            .build()
    }

    /// Returns the service base URL.
    #[must_use]
    pub const fn host(&self) -> &HostUrl {
        &self.host
    }

    /// Returns the bearer token (possibly empty).
    #[must_use]
    pub const fn token(&self) -> &AuthToken {
        &self.token
    }

    /// Returns the default timeout applied to every request, if any.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the full URL of the GraphQL endpoint.
    #[must_use]
    pub fn graphql_url(&self) -> String {
        self.host.join(GRAPHQL_ENDPOINT)
    }
}

// Verify ClientConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientConfig>();
};

/// Builder for constructing [`ClientConfig`] instances.
///
/// `host` is required. Defaults: empty token, no timeout, no user agent
/// prefix.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    host: Option<HostUrl>,
    token: Option<AuthToken>,
    timeout: Option<Duration>,
    user_agent_prefix: Option<String>,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the service base URL (required).
    #[must_use]
    pub fn host(mut self, host: HostUrl) -> Self {
        self.host = Some(host);
        self
    }

    /// Sets the bearer token. An empty token disables the auth header.
    #[must_use]
    pub fn token(mut self, token: AuthToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Sets the default timeout for each request.
    ///
    /// A request that exceeds it fails with a timeout
    /// [`TransportError`](crate::TransportError).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`ClientConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `host` is not set.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let host = self
            .host
            .ok_or(ConfigError::MissingRequiredField { field: "host" })?;

        Ok(ClientConfig {
            host,
            token: self.token.unwrap_or_default(),
            timeout: self.timeout,
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}
