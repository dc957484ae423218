//! HTTP-specific error types for the Recurly API client.
//!
//! This module contains error types for transport-level failures. Non-2xx
//! responses are not errors at this layer: the client hands every response
//! back to the resource layer, which maps status codes to semantic errors
//! with the decoded error payload attached.
//!
//! # Example
//!
//! ```rust,ignore
//! use recurly_api::clients::HttpError;
//!
//! match client.request(request).await {
//!     Ok(response) => println!("Status: {}", response.code),
//!     Err(HttpError::InvalidRequest(e)) => println!("Invalid request: {e}"),
//!     Err(HttpError::Network(e)) => println!("Network error: {e}"),
//! }
//! ```

use thiserror::Error;

/// Error returned when an HTTP request fails validation.
///
/// This error is raised before a request is sent if it fails validation
/// checks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// A request body was provided without specifying the body type.
    #[error("Cannot set a body without also setting body_type.")]
    MissingBodyType,

    /// The request URL is empty.
    #[error("Cannot send a request to an empty URL.")]
    EmptyUrl,
}

/// Unified error type for transport-level failures.
///
/// This enum provides a single error type for HTTP operations, making it
/// easier to handle errors at API boundaries. Use pattern matching to
/// handle specific error types.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}
