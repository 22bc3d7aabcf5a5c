//! Error types for GraphQL operations.
//!
//! [`ApiError`] is what [`ApiClient`](crate::ApiClient) returns. It
//! separates three failure domains so callers can react differently:
//!
//! - [`ApiError::Transport`]: the request failed or got a non-2xx status
//! - [`ApiError::Protocol`]: a 2xx body was not a GraphQL envelope, which
//!   points at client/server version skew
//! - [`ApiError::Graphql`]: the endpoint rejected the operation outright
//!
//! A response carrying both `data` and `errors` is not an error; see
//! [`GraphqlResponse`](super::GraphqlResponse).
//!
//! # Example
//!
//! ```rust,ignore
//! use circleci_core::ApiError;
//!
//! match client.execute("query { me { id } }", Default::default()).await {
//!     Ok(response) if response.is_partial() => { /* data plus warnings */ }
//!     Ok(response) => println!("{}", response.data),
//!     Err(ApiError::Graphql(errors)) => eprintln!("{errors}"),
//!     Err(ApiError::Transport(e)) => eprintln!("{e}"),
//!     Err(ApiError::Protocol(e)) => eprintln!("{e}"),
//! }
//! ```

use std::fmt;

use thiserror::Error;

use crate::clients::errors::TransportError;
use crate::clients::graphql::envelope::GraphqlErrorEntry;

/// A 2xx response body that is not a GraphQL envelope.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unexpected response from the API ({reason}). The CLI may be out of date.")]
pub struct ProtocolError {
    /// The raw response body.
    pub body: String,
    /// What was wrong with it.
    pub reason: String,
}

impl ProtocolError {
    pub(crate) fn new(body: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            reason: reason.into(),
        }
    }
}

/// The structured error list of a rejected operation, kept verbatim.
///
/// Displays as the error messages, one per line.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphqlErrors(pub Vec<GraphqlErrorEntry>);

impl GraphqlErrors {
    /// Returns the error messages in order.
    #[must_use]
    pub fn messages(&self) -> Vec<&str> {
        self.0.iter().map(|entry| entry.message.as_str()).collect()
    }

    /// Returns the number of errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, GraphqlErrorEntry> {
        self.0.iter()
    }
}

impl fmt::Display for GraphqlErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

impl std::error::Error for GraphqlErrors {}

impl<'a> IntoIterator for &'a GraphqlErrors {
    type Item = &'a GraphqlErrorEntry;
    type IntoIter = std::slice::Iter<'a, GraphqlErrorEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Error type for GraphQL API operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network failure, timeout, or non-2xx status.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body did not match the GraphQL envelope.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The endpoint returned errors and no usable data.
    #[error(transparent)]
    Graphql(#[from] GraphqlErrors),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::errors::HttpResponseError;

    #[test]
    fn test_graphql_errors_display_one_message_per_line() {
        let errors = GraphqlErrors(vec![
            GraphqlErrorEntry::new("first problem"),
            GraphqlErrorEntry::new("second problem"),
        ]);

        assert_eq!(errors.to_string(), "first problem\nsecond problem");
        assert_eq!(errors.messages(), vec!["first problem", "second problem"]);
    }

    #[test]
    fn test_api_error_wraps_transport_error() {
        let error: ApiError = TransportError::Status(HttpResponseError {
            code: 500,
            body: "boom".to_string(),
            request_id: None,
        })
        .into();

        assert!(matches!(error, ApiError::Transport(_)));
        assert!(error.to_string().contains("500"));
    }

    #[test]
    fn test_protocol_error_mentions_version_skew() {
        let error = ProtocolError::new("<html>", "response is not valid JSON");
        let message = error.to_string();

        assert!(message.contains("not valid JSON"));
        assert!(message.contains("out of date"));
    }

    #[test]
    fn test_all_error_variants_implement_std_error() {
        let error: &dyn std::error::Error =
            &ApiError::Graphql(GraphqlErrors(vec![GraphqlErrorEntry::new("bad query")]));
        assert_eq!(error.to_string(), "bad query");
    }
}
