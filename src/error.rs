//! Configuration error types.
//!
//! [`ConfigError`] covers everything that can go wrong while turning
//! user-provided values into a [`ClientConfig`](crate::ClientConfig):
//! an empty or malformed host, a builder missing a required field, or the
//! underlying HTTP client refusing to initialize.
//!
//! Errors from reading and writing the local settings files live in
//! [`crate::settings::SettingsError`]; errors from executing requests live
//! in [`crate::clients::graphql::ApiError`].
//!
//! # Example
//!
//! ```rust
//! use circleci_core::{ConfigError, HostUrl};
//!
//! let result = HostUrl::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyHost)));
//! ```

use thiserror::Error;

/// Errors that can occur while building a client configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Host cannot be empty.
    #[error("Host cannot be empty. Run setup or set CIRCLECI_CLI_HOST to a URL such as 'https://circleci.com'.")]
    EmptyHost,

    /// Host URL is invalid.
    #[error("Invalid host URL '{url}'. Please provide a valid URL with scheme (e.g., 'https://circleci.com').")]
    InvalidHostUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// The HTTP client could not be created.
    #[error("Failed to initialize HTTP client: {reason}")]
    HttpClientInit {
        /// Why initialization failed.
        reason: String,
    },
}
