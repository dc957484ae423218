//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;

/// A validated Recurly private API key.
///
/// This newtype ensures the API key is non-empty and masks its value in
/// debug output to prevent accidental exposure in logs. The key is sent
/// as the username of an HTTP Basic `Authorization` header on every
/// request, so it must be treated as a secret.
///
/// # Security
///
/// The `Debug` implementation masks the key value, displaying only
/// `ApiKey(*****)` instead of the actual key.
///
/// # Example
///
/// ```rust
/// use recurly_api::ApiKey;
///
/// let key = ApiKey::new("my-private-key").unwrap();
/// assert_eq!(key.as_ref(), "my-private-key");
/// assert_eq!(format!("{:?}", key), "ApiKey(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Creates a new validated API key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for ApiKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(*****)")
    }
}

/// A validated three-letter currency code.
///
/// Currency codes select among currency-tagged monetary values on the wire
/// and provide the default currency for bare monetary scalars. Codes are
/// validated to be exactly three uppercase ASCII letters (the ISO 4217
/// shape the API uses as element tags, e.g. `<USD>` or `<EUR>`).
///
/// # Example
///
/// ```rust
/// use recurly_api::CurrencyCode;
///
/// let usd = CurrencyCode::new("USD").unwrap();
/// assert_eq!(usd.as_ref(), "USD");
///
/// assert!(CurrencyCode::new("usd").is_err());
/// assert!(CurrencyCode::new("DOLLARS").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Creates a new validated currency code.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCurrencyCode`] if the code is not
    /// exactly three uppercase ASCII letters.
    pub fn new(code: impl Into<String>) -> Result<Self, ConfigError> {
        let code = code.into();
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(ConfigError::InvalidCurrencyCode { code });
        }
        Ok(Self(code))
    }

    /// Returns `true` if `tag` has the shape of a currency code.
    ///
    /// Used when decoding monetary elements to distinguish currency-tagged
    /// children (`<USD>`, `<EUR>`) from ordinary child elements.
    #[must_use]
    pub fn is_currency_tag(tag: &str) -> bool {
        tag.len() == 3 && tag.bytes().all(|b| b.is_ascii_uppercase())
    }
}

impl Default for CurrencyCode {
    /// Returns the default currency, `USD`.
    fn default() -> Self {
        Self("USD".to_string())
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CurrencyCode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Verify newtypes are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ApiKey>();
    assert_send_sync::<CurrencyCode>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_rejects_empty_string() {
        assert!(matches!(ApiKey::new(""), Err(ConfigError::EmptyApiKey)));
    }

    #[test]
    fn test_api_key_accepts_non_empty_string() {
        let key = ApiKey::new("abc123").unwrap();
        assert_eq!(key.as_ref(), "abc123");
    }

    #[test]
    fn test_api_key_debug_is_masked() {
        let key = ApiKey::new("super-secret").unwrap();
        let debug = format!("{key:?}");
        assert_eq!(debug, "ApiKey(*****)");
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_currency_code_accepts_uppercase_three_letter_codes() {
        for code in ["USD", "EUR", "GBP", "JPY"] {
            assert_eq!(CurrencyCode::new(code).unwrap().as_ref(), code);
        }
    }

    #[test]
    fn test_currency_code_rejects_invalid_shapes() {
        for code in ["usd", "US", "USDX", "U$D", ""] {
            assert!(
                CurrencyCode::new(code).is_err(),
                "expected '{code}' to be rejected"
            );
        }
    }

    #[test]
    fn test_currency_code_default_is_usd() {
        assert_eq!(CurrencyCode::default().as_ref(), "USD");
    }

    #[test]
    fn test_currency_code_from_str() {
        let code: CurrencyCode = "EUR".parse().unwrap();
        assert_eq!(code.to_string(), "EUR");

        let result: Result<CurrencyCode, _> = "euro".parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_is_currency_tag() {
        assert!(CurrencyCode::is_currency_tag("USD"));
        assert!(CurrencyCode::is_currency_tag("SEK"));
        assert!(!CurrencyCode::is_currency_tag("usd"));
        assert!(!CurrencyCode::is_currency_tag("unit_amount_in_cents"));
        assert!(!CurrencyCode::is_currency_tag("a"));
    }
}
