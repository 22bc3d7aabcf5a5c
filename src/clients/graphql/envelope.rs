//! The GraphQL response envelope and its classification.
//!
//! Every response is an object with optional `data` and `errors` fields.
//! They are not mutually exclusive: a server may resolve some fields and
//! fail others in the same response. [`GraphqlEnvelope::classify`] sorts a
//! decoded envelope into one of three outcomes:
//!
//! | `errors`     | `data`          | Outcome                                  |
//! |--------------|-----------------|------------------------------------------|
//! | absent/empty | anything        | success, no warnings                     |
//! | non-empty    | present         | partial success, errors become warnings  |
//! | non-empty    | absent or null  | failure ([`GraphqlErrors`])              |

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clients::graphql::errors::{ApiError, GraphqlErrors, ProtocolError};

/// A source location attached to a GraphQL error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphqlLocation {
    /// 1-based line in the query document.
    pub line: u32,
    /// 1-based column in the query document.
    pub column: u32,
}

/// One entry of the `errors` list.
///
/// Fields other than `message`, `path`, `locations` and `extensions` are
/// ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphqlErrorEntry {
    /// Human-readable description of the error.
    pub message: String,

    /// Path to the response field that failed (keys and list indices).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Value>>,

    /// Locations in the query document the error refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<GraphqlLocation>>,

    /// Server-specific details such as an error code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<serde_json::Map<String, Value>>,
}

impl GraphqlErrorEntry {
    /// Creates an entry with only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
            locations: None,
            extensions: None,
        }
    }
}

impl fmt::Display for GraphqlErrorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(path) = self.path.as_deref().filter(|path| !path.is_empty()) {
            let joined = path
                .iter()
                .map(|segment| match segment {
                    Value::String(key) => key.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(".");
            write!(f, " (at {joined})")?;
        }
        Ok(())
    }
}

/// The decoded top-level response object.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GraphqlEnvelope {
    /// Operation payload; `None` when absent or `null`.
    #[serde(default)]
    pub data: Option<Value>,

    /// Errors reported by the endpoint; `None` when absent or `null`.
    #[serde(default)]
    pub errors: Option<Vec<GraphqlErrorEntry>>,
}

impl GraphqlEnvelope {
    /// Decodes a 2xx response body.
    ///
    /// The body must be a JSON object containing at least one of `data` or
    /// `errors`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] carrying the raw body if it does not have
    /// the envelope shape.
    pub fn parse(body: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| ProtocolError::new(body, format!("response is not valid JSON: {e}")))?;

        let Value::Object(object) = &value else {
            return Err(ProtocolError::new(body, "response is not a JSON object"));
        };
        if !object.contains_key("data") && !object.contains_key("errors") {
            return Err(ProtocolError::new(
                body,
                "response has neither `data` nor `errors`",
            ));
        }

        serde_json::from_value(value)
            .map_err(|e| ProtocolError::new(body, format!("unexpected response shape: {e}")))
    }

    /// Applies the partial-success rule.
    ///
    /// # Errors
    ///
    /// Returns [`GraphqlErrors`] when errors are reported and there is no
    /// usable `data`.
    pub fn classify(self) -> Result<GraphqlResponse, GraphqlErrors> {
        let errors = self.errors.unwrap_or_default();

        if errors.is_empty() {
            return Ok(GraphqlResponse {
                data: self.data.unwrap_or(Value::Null),
                warnings: Vec::new(),
            });
        }

        match self.data {
            Some(data) if !data.is_null() => Ok(GraphqlResponse {
                data,
                warnings: errors,
            }),
            _ => Err(GraphqlErrors(errors)),
        }
    }
}

/// A successful (possibly partial) GraphQL result.
///
/// `warnings` holds the errors that accompanied usable `data`; it is empty on
/// full success. Whether warnings are fatal is the caller's decision, see
/// [`into_data_strict`](Self::into_data_strict).
#[derive(Clone, Debug, PartialEq)]
pub struct GraphqlResponse<T = Value> {
    /// The operation payload.
    pub data: T,
    /// Errors reported alongside `data`.
    pub warnings: Vec<GraphqlErrorEntry>,
}

impl<T> GraphqlResponse<T> {
    /// Returns `true` if errors accompanied the data.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns the data, treating any warning as a failure.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Graphql`] with the warnings if there are any.
    pub fn into_data_strict(self) -> Result<T, ApiError> {
        if self.warnings.is_empty() {
            Ok(self.data)
        } else {
            Err(ApiError::Graphql(GraphqlErrors(self.warnings)))
        }
    }
}
