//! HTTP client for Recurly API communication.
//!
//! This module provides the [`HttpClient`] type for making authenticated
//! requests to the Recurly API. It is the transport gateway the resource
//! layer calls through: it issues a request, parses status, headers, and
//! body, and hands the result back without interpreting it. Semantic error
//! mapping for non-2xx responses happens in the resource layer, which needs
//! the response body to decode the server's structured error document.

use std::collections::HashMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::clients::errors::HttpError;
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::RecurlyConfig;

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// HTTP client for making requests to the Recurly API.
///
/// The client handles:
/// - URL resolution against the configured base URL (hypermedia `href`
///   values are absolute and pass through unchanged)
/// - Default headers including User-Agent, Accept, and HTTP Basic
///   authorization with the private API key
/// - Response header parsing
///
/// The client never retries: hypermedia links and actions are resolved
/// strictly on demand and each call is a single request-and-decode step.
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use recurly_api::{RecurlyConfig, ApiKey};
/// use recurly_api::clients::{HttpClient, HttpRequest, HttpMethod};
///
/// let config = RecurlyConfig::builder()
///     .api_key(ApiKey::new("my-private-key").unwrap())
///     .build()
///     .unwrap();
///
/// let client = HttpClient::new(config);
/// let request = HttpRequest::builder(HttpMethod::Get, "accounts").build().unwrap();
/// let response = client.request(request).await?;
/// ```
#[derive(Debug)]
pub struct HttpClient {
    /// The internal reqwest HTTP client.
    client: reqwest::Client,
    /// Client configuration (base URL, API key, default currency).
    config: RecurlyConfig,
    /// Default headers to include in all requests.
    default_headers: HashMap<String, String>,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new HTTP client for the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created. This should
    /// only happen in extremely unusual circumstances (e.g., TLS initialization failure).
    #[must_use]
    pub fn new(config: RecurlyConfig) -> Self {
        // Build User-Agent header
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent =
            format!("{user_agent_prefix}Recurly API Client v{SDK_VERSION} | Rust {rust_version}");

        // The API key is the username of a basic credential with no password.
        let credential = BASE64.encode(format!("{}:", config.api_key().as_ref()));

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/xml".to_string());
        default_headers.insert("Authorization".to_string(), format!("Basic {credential}"));

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config,
            default_headers,
        }
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &RecurlyConfig {
        &self.config
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Resolves a request URL against the configured base URL.
    ///
    /// Absolute URLs (hypermedia `href` values, `Location` headers) pass
    /// through unchanged; relative paths are joined to the base URL.
    #[must_use]
    pub fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}{}", self.config.base_url(), url.trim_start_matches('/'))
        }
    }

    /// Sends an HTTP request to the Recurly API.
    ///
    /// The response is returned for any status code; callers inspect
    /// [`HttpResponse::is_ok`] and map failures themselves.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if request validation fails (`InvalidRequest`)
    /// or a network error occurs (`Network`).
    pub async fn request(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let url = self.resolve_url(&request.url);

        let mut headers = self.default_headers.clone();
        if let Some(body_type) = &request.body_type {
            headers.insert(
                "Content-Type".to_string(),
                body_type.as_content_type().to_string(),
            );
        }
        if let Some(extra) = &request.extra_headers {
            for (key, value) in extra {
                headers.insert(key.clone(), value.clone());
            }
        }

        let mut req_builder = match request.http_method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Put => self.client.put(&url),
            HttpMethod::Delete => self.client.delete(&url),
        };

        for (key, value) in &headers {
            req_builder = req_builder.header(key, value);
        }

        if let Some(query) = &request.query {
            req_builder = req_builder.query(query);
        }

        if let Some(body) = &request.body {
            tracing::debug!(method = %request.http_method, url = %url, body = %body, "request");
            req_builder = req_builder.body(body.clone());
        } else {
            tracing::debug!(method = %request.http_method, url = %url, "request");
        }

        let res = req_builder.send().await?;

        let code = res.status().as_u16();
        let res_headers = Self::parse_response_headers(res.headers());
        let body = res.bytes().await.map(|b| b.to_vec()).unwrap_or_default();

        let response = HttpResponse::new(code, res_headers, body);
        tracing::debug!(code = response.code, body = %response.text(), "response");

        Ok(response)
    }

    /// Sends a GET request to the given URL.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] on validation or network failure.
    pub async fn get(&self, url: &str) -> Result<HttpResponse, HttpError> {
        self.request(HttpRequest::builder(HttpMethod::Get, url).build()?)
            .await
    }

    /// Sends a GET request with query parameters.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] on validation or network failure.
    pub async fn get_with(
        &self,
        url: &str,
        query: HashMap<String, String>,
    ) -> Result<HttpResponse, HttpError> {
        self.request(HttpRequest::builder(HttpMethod::Get, url).query(query).build()?)
            .await
    }

    /// Sends a POST request with an XML body.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] on validation or network failure.
    pub async fn post(&self, url: &str, body: String) -> Result<HttpResponse, HttpError> {
        self.request(
            HttpRequest::builder(HttpMethod::Post, url)
                .body(body)
                .body_type(crate::clients::DataType::Xml)
                .build()?,
        )
        .await
    }

    /// Sends a PUT request, with an optional XML body.
    ///
    /// Some member actions (e.g. reopening an account) are bodyless PUTs.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] on validation or network failure.
    pub async fn put(&self, url: &str, body: Option<String>) -> Result<HttpResponse, HttpError> {
        let mut builder = HttpRequest::builder(HttpMethod::Put, url);
        if let Some(body) = body {
            builder = builder.body(body).body_type(crate::clients::DataType::Xml);
        }
        self.request(builder.build()?).await
    }

    /// Sends a DELETE request to the given URL.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] on validation or network failure.
    pub async fn delete(&self, url: &str) -> Result<HttpResponse, HttpError> {
        self.request(HttpRequest::builder(HttpMethod::Delete, url).build()?)
            .await
    }

    /// Parses response headers into a `HashMap`.
    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }
}
