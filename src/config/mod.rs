//! Configuration types for the Recurly API client.
//!
//! This module provides the core configuration types used to initialize
//! and configure the client for API communication with Recurly.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`RecurlyConfig`]: The main configuration struct holding all client settings
//! - [`RecurlyConfigBuilder`]: A builder for constructing [`RecurlyConfig`] instances
//! - [`ApiKey`]: A validated private API key newtype with masked debug output
//! - [`CurrencyCode`]: A validated three-letter currency code
//!
//! # Example
//!
//! ```rust
//! use recurly_api::{RecurlyConfig, ApiKey, CurrencyCode};
//!
//! let config = RecurlyConfig::builder()
//!     .api_key(ApiKey::new("my-private-key").unwrap())
//!     .default_currency(CurrencyCode::new("EUR").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.default_currency().as_ref(), "EUR");
//! ```

mod newtypes;

pub use newtypes::{ApiKey, CurrencyCode};

use crate::error::ConfigError;

/// The default API endpoint requests are sent to.
pub const DEFAULT_BASE_URL: &str = "https://api.recurly.com/v2/";

/// Configuration for the Recurly API client.
///
/// This struct holds all configuration needed for client operations: the
/// private API key, the API endpoint, and the default currency used when
/// decoding and encoding monetary values that carry no explicit currency.
///
/// # Thread Safety
///
/// `RecurlyConfig` is `Clone`, `Send`, and `Sync`, making it safe to share
/// across threads and async tasks.
///
/// # Example
///
/// ```rust
/// use recurly_api::{RecurlyConfig, ApiKey};
///
/// let config = RecurlyConfig::builder()
///     .api_key(ApiKey::new("my-private-key").unwrap())
///     .build()
///     .unwrap();
///
/// assert_eq!(config.base_url(), "https://api.recurly.com/v2/");
/// ```
#[derive(Clone, Debug)]
pub struct RecurlyConfig {
    api_key: ApiKey,
    base_url: String,
    default_currency: CurrencyCode,
    user_agent_prefix: Option<String>,
}

impl RecurlyConfig {
    /// Creates a new builder for constructing a `RecurlyConfig`.
    #[must_use]
    pub fn builder() -> RecurlyConfigBuilder {
        RecurlyConfigBuilder::new()
    }

    /// Returns the private API key.
    #[must_use]
    pub const fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Returns the API base URL. Always ends with a `/`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the currency used for monetary values without an explicit
    /// currency.
    #[must_use]
    pub const fn default_currency(&self) -> &CurrencyCode {
        &self.default_currency
    }

    /// Returns the configured User-Agent prefix, if any.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

/// Builder for constructing [`RecurlyConfig`] instances.
///
/// Only the API key is required; the base URL defaults to
/// [`DEFAULT_BASE_URL`] and the default currency to `USD`.
#[derive(Debug, Default)]
pub struct RecurlyConfigBuilder {
    api_key: Option<ApiKey>,
    base_url: Option<String>,
    default_currency: Option<CurrencyCode>,
    user_agent_prefix: Option<String>,
}

impl RecurlyConfigBuilder {
    fn new() -> Self {
        Self::default()
    }

    /// Sets the private API key (required).
    #[must_use]
    pub fn api_key(mut self, api_key: ApiKey) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Sets the API base URL.
    ///
    /// Useful for pointing the client at a mock server in tests. A trailing
    /// slash is appended if missing.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the default currency for monetary values.
    #[must_use]
    pub fn default_currency(mut self, currency: CurrencyCode) -> Self {
        self.default_currency = Some(currency);
        self
    }

    /// Sets a prefix for the User-Agent header.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`RecurlyConfig`], validating it in the process.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if the API key is unset,
    /// or [`ConfigError::InvalidBaseUrl`] if a base URL was provided that is
    /// not an absolute HTTP(S) URL.
    pub fn build(self) -> Result<RecurlyConfig, ConfigError> {
        let api_key = self
            .api_key
            .ok_or(ConfigError::MissingRequiredField { field: "api_key" })?;

        let mut base_url = self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::InvalidBaseUrl { url: base_url });
        }
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(RecurlyConfig {
            api_key,
            base_url,
            default_currency: self.default_currency.unwrap_or_default(),
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}

// Verify RecurlyConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RecurlyConfig>();
};
