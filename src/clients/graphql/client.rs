//! GraphQL client implementation.
//!
//! This module provides the [`ApiClient`] type for executing GraphQL
//! operations against the service's `graphql-unstable` endpoint.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::clients::graphql::envelope::{GraphqlEnvelope, GraphqlResponse};
use crate::clients::graphql::errors::{ApiError, ProtocolError};
use crate::clients::{HttpClient, HttpRequest};
use crate::config::{ClientConfig, GRAPHQL_ENDPOINT};
use crate::error::ConfigError;
use crate::settings::Settings;

/// Variables passed alongside a query.
pub type Variables = serde_json::Map<String, Value>;

/// GraphQL API client.
///
/// Each call sends one POST to `{host}/graphql-unstable` with body
/// `{"query": ..., "variables": ...}` and classifies the response:
///
/// - full success: `Ok` with empty `warnings`
/// - partial success (`data` and `errors`): `Ok` with the errors in `warnings`
/// - failure: `Err(ApiError::Graphql)` when there are errors and no data
///
/// Nothing is retried. Timeouts come from the [`ClientConfig`] or from
/// [`execute_with_timeout`](Self::execute_with_timeout).
///
/// # Thread Safety
///
/// `ApiClient` is `Send + Sync`; host and token are captured at
/// construction and never change, so calls may run concurrently.
///
/// # Example
///
/// ```rust,ignore
/// use circleci_core::{ApiClient, SettingsStore, Variables};
/// use serde_json::json;
///
/// let settings = SettingsStore::from_home()?.load()?.with_process_env();
/// let client = ApiClient::from_settings(&settings)?;
///
/// let mut variables = Variables::new();
/// variables.insert("name".to_string(), json!("circleci/node"));
///
/// let response = client
///     .execute("query($name: String!) { orb(name: $name) { id } }", variables)
///     .await?;
/// for warning in &response.warnings {
///     eprintln!("warning: {warning}");
/// }
/// println!("{}", response.data["orb"]["id"]);
/// ```
#[derive(Debug)]
pub struct ApiClient {
    /// The internal HTTP client for making requests.
    http_client: HttpClient,
    graphql_url: String,
}

// Verify ApiClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ApiClient>();
};

impl ApiClient {
    /// Creates a new client from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClientInit`] if the HTTP client cannot be
    /// created.
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let http_client = HttpClient::new(config)?;
        tracing::debug!(
            url = %config.graphql_url(),
            authenticated = !config.token().is_empty(),
            "Created GraphQL client"
        );
        Ok(Self {
            http_client,
            graphql_url: config.graphql_url(),
        })
    }

    /// Creates a new client from loaded settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the stored host is invalid or the HTTP
    /// client cannot be created.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        Self::new(&ClientConfig::from_settings(settings)?)
    }

    /// Returns the full URL of the GraphQL endpoint.
    #[must_use]
    pub fn graphql_url(&self) -> &str {
        &self.graphql_url
    }

    /// Returns `true` if requests carry an `Authorization` header.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.http_client
            .default_headers()
            .contains_key("Authorization")
    }

    /// Executes a GraphQL operation.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Transport`] for network failures, timeouts and non-2xx
    ///   responses (status and raw body included)
    /// - [`ApiError::Protocol`] if a 2xx body is not a GraphQL envelope
    /// - [`ApiError::Graphql`] if errors were returned without data
    pub async fn execute(
        &self,
        query: &str,
        variables: Variables,
    ) -> Result<GraphqlResponse, ApiError> {
        self.execute_request(query, variables, None).await
    }

    /// Executes a GraphQL operation with a timeout for this call only.
    ///
    /// A timeout surfaces as a [`TransportError`](crate::TransportError) for
    /// which `is_timeout()` returns `true`.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute).
    pub async fn execute_with_timeout(
        &self,
        query: &str,
        variables: Variables,
        timeout: Duration,
    ) -> Result<GraphqlResponse, ApiError> {
        self.execute_request(query, variables, Some(timeout)).await
    }

    /// Executes a GraphQL operation and decodes `data` into `T`.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute); additionally returns
    /// [`ApiError::Protocol`] if `data` does not match `T`.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// #[derive(serde::Deserialize)]
    /// struct Me { me: User }
    ///
    /// let response = client.execute_as::<Me>("query { me { id name } }", Variables::new()).await?;
    /// println!("{}", response.data.me.name);
    /// ```
    pub async fn execute_as<T>(
        &self,
        query: &str,
        variables: Variables,
    ) -> Result<GraphqlResponse<T>, ApiError>
    where
        T: DeserializeOwned,
    {
        let response = self.execute_request(query, variables, None).await?;
        let data = T::deserialize(&response.data).map_err(|e| {
            ProtocolError::new(
                response.data.to_string(),
                format!("response data does not match the expected type: {e}"),
            )
        })?;

        Ok(GraphqlResponse {
            data,
            warnings: response.warnings,
        })
    }

    async fn execute_request(
        &self,
        query: &str,
        variables: Variables,
        timeout: Option<Duration>,
    ) -> Result<GraphqlResponse, ApiError> {
        let body = serde_json::json!({
            "query": query,
            "variables": variables,
        });

        let mut builder = HttpRequest::builder(GRAPHQL_ENDPOINT, body);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let response = self.http_client.request(builder.build()).await?;
        let envelope = GraphqlEnvelope::parse(&response.body)?;
        let result = envelope.classify()?;

        if result.is_partial() {
            tracing::debug!(
                url = %self.graphql_url,
                warnings = result.warnings.len(),
                "GraphQL response carried errors alongside data"
            );
        }

        Ok(result)
    }
}
