//! Error types for SDK configuration.
//!
//! This module contains error types used for configuration and validation
//! errors.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Error messages are designed to be clear and actionable.
//!
//! # Example
//!
//! ```rust
//! use recurly_api::{ApiKey, ConfigError};
//!
//! let result = ApiKey::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyApiKey)));
//! ```

use thiserror::Error;

/// Errors that can occur during SDK configuration.
///
/// This enum represents all possible errors that can occur when creating
/// or validating configuration types. Each variant provides a clear,
/// actionable error message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// API key cannot be empty.
    #[error("API key cannot be empty. Please provide a valid Recurly private API key.")]
    EmptyApiKey,

    /// Currency code is not a three-letter uppercase ISO 4217 code.
    #[error("Invalid currency code '{code}'. Expected a three-letter uppercase code (e.g., 'USD').")]
    InvalidCurrencyCode {
        /// The invalid code that was provided.
        code: String,
    },

    /// Base URL is not an absolute HTTP(S) URL.
    #[error("Invalid base URL '{url}'. Expected an absolute http:// or https:// URL.")]
    InvalidBaseUrl {
        /// The invalid URL that was provided.
        url: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },
}
