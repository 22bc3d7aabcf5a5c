//! HTTP and GraphQL client types.
//!
//! # Overview
//!
//! - [`HttpClient`]: sends JSON POST requests with the default headers
//! - [`HttpRequest`]: a request to be sent
//! - [`HttpResponse`]: the raw status, headers and body
//! - [`TransportError`]: network, timeout and non-2xx failures
//! - [`graphql::ApiClient`]: the GraphQL client built on top
//!
//! # Retry Behavior
//!
//! There is none. Each call makes exactly one attempt and surfaces failures
//! immediately; retry policy belongs to the caller.

mod errors;
pub mod graphql;
mod http_client;
mod http_request;
mod http_response;

pub use errors::{HttpResponseError, TransportError};
pub use http_client::{HttpClient, SDK_VERSION};
pub use http_request::{HttpRequest, HttpRequestBuilder, JSON_CONTENT_TYPE};
pub use http_response::HttpResponse;

pub use graphql::{ApiClient, ApiError};
