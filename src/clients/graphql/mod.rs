//! GraphQL API client.
//!
//! This module provides the higher-level client built on top of the
//! [`HttpClient`](crate::clients::HttpClient) that the rest of the CLI uses
//! to talk to the service.
//!
//! # Overview
//!
//! - [`ApiClient`]: executes one GraphQL operation per call
//! - [`GraphqlResponse`]: data plus any errors that accompanied it
//! - [`GraphqlEnvelope`]: the decoded `{data, errors}` wire object
//! - [`ApiError`]: transport, protocol and GraphQL failures
//!
//! # Partial Success
//!
//! A response may carry both `data` and `errors`. That is returned as `Ok`
//! with the errors in [`GraphqlResponse::warnings`], because a mutation that
//! partly succeeded still has results the caller needs. Only `errors` with no
//! usable `data` becomes [`ApiError::Graphql`]. Callers that want any error
//! to be fatal can use [`GraphqlResponse::into_data_strict`].

mod client;
mod envelope;
mod errors;

pub use client::{ApiClient, Variables};
pub use envelope::{GraphqlEnvelope, GraphqlErrorEntry, GraphqlLocation, GraphqlResponse};
pub use errors::{ApiError, GraphqlErrors, ProtocolError};
