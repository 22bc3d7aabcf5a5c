//! # CircleCI CLI core
//!
//! The request/response core and local settings store of the CircleCI
//! command-line client.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`SettingsStore`]: crash-safe persistence of [`Settings`] (host, token)
//!   and [`UpdateCheckState`] under `~/.circleci`
//! - [`ApiClient`]: authenticated GraphQL requests with partial-success
//!   handling
//! - [`ClientConfig`]: the explicit configuration handle connecting the two
//!
//! Argument parsing, subcommands and output rendering live in the command
//! layer, which calls into this crate and receives typed results.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use circleci_core::{ApiClient, ApiError, SettingsStore, Variables};
//!
//! let store = SettingsStore::from_home()?;
//! let settings = store.load()?.with_process_env();
//! let client = ApiClient::from_settings(&settings)?;
//!
//! match client.execute("query { me { id } }", Variables::new()).await {
//!     Ok(response) => {
//!         for warning in &response.warnings {
//!             eprintln!("warning: {warning}");
//!         }
//!         println!("{}", response.data);
//!     }
//!     Err(ApiError::Graphql(errors)) => eprintln!("{errors}"),
//!     Err(other) => eprintln!("{other}"),
//! }
//! ```
//!
//! ## Update Checks
//!
//! ```rust
//! use circleci_core::{SettingsStore, UpdateCheckState, DEFAULT_UPDATE_CHECK_INTERVAL};
//! use chrono::Utc;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let store = SettingsStore::new(dir.path());
//!
//! let now = Utc::now();
//! if store.load_update_check().unwrap().is_due(now, DEFAULT_UPDATE_CHECK_INTERVAL) {
//!     // ... look for a newer release; the outcome does not matter here ...
//!     store.save_update_check(&UpdateCheckState::checked_at(now)).unwrap();
//! }
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: stores, configs and clients are values passed explicitly
//! - **Atomic writes**: settings files are replaced by rename, never rewritten in place
//! - **Nothing is fatal**: every failure is returned to the caller
//! - **Thread-safe**: all public types are `Send + Sync`

pub mod clients;
pub mod config;
pub mod error;
pub mod settings;

pub use config::{
    AuthToken, ClientConfig, ClientConfigBuilder, HostUrl, DEFAULT_HOST, GRAPHQL_ENDPOINT,
};
pub use error::ConfigError;
pub use settings::{
    Settings, SettingsError, SettingsStore, UpdateCheckState, DEFAULT_UPDATE_CHECK_INTERVAL,
    HOST_ENV_VAR, TOKEN_ENV_VAR,
};

pub use clients::graphql::{
    ApiClient, ApiError, GraphqlErrorEntry, GraphqlErrors, GraphqlResponse, ProtocolError,
    Variables,
};
pub use clients::{HttpResponseError, TransportError};
