//! HTTP transport for the Recurly API.
//!
//! This module is the transport gateway the resource layer calls through a
//! narrow interface: build an [`HttpRequest`], send it with [`HttpClient`],
//! get back an [`HttpResponse`] with status, headers, and raw body. The
//! transport never interprets response bodies and never retries; semantic
//! error mapping lives in [`crate::resource`].
//!
//! # Key Types
//!
//! - [`HttpClient`]: Authenticated async client over reqwest
//! - [`HttpRequest`] / [`HttpRequestBuilder`]: Request construction
//! - [`HttpResponse`]: Status, headers, body, and parsed pagination headers
//! - [`HttpError`]: Transport-level failures (network, invalid request)

mod errors;
mod http_client;
mod http_request;
mod http_response;

pub use errors::{HttpError, InvalidHttpRequestError};
pub use http_client::{HttpClient, SDK_VERSION};
pub use http_request::{DataType, HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::{HttpResponse, PageLinks};
