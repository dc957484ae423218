//! Signature generation for the browser-side payment form helper.
//!
//! The hosted JavaScript payment form submits billing data straight to the
//! API, so the server-side application vouches for the request by signing
//! the protected parameters with its private API key. The token format is
//! `signature|message`, where the message is the sorted, url-encoded
//! claims plus a nonce and a timestamp, and the signature is an
//! HMAC-SHA256 over the message.
//!
//! # Security
//!
//! Signature verification uses constant-time comparison to prevent timing
//! attacks.
//!
//! # Example
//!
//! ```rust
//! use recurly_api::{js, ApiKey, RecurlyConfig};
//!
//! let config = RecurlyConfig::builder()
//!     .api_key(ApiKey::new("my-private-key").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let token = js::sign(&config, &[("account_code", "acme")]);
//! assert!(js::verify(&config, &token));
//! ```

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::config::RecurlyConfig;
use crate::resource::Resource;

type HmacSha256 = Hmac<Sha256>;

/// Signs the given claims, returning a `signature|message` token.
///
/// A random nonce and the current timestamp are mixed into the message, so
/// two tokens over the same claims never collide and stale tokens can be
/// rejected server-side.
#[must_use]
pub fn sign(config: &RecurlyConfig, claims: &[(&str, &str)]) -> String {
    let nonce = format!("{:032x}", rand::random::<u128>());
    let timestamp = chrono::Utc::now().timestamp().to_string();

    let mut pairs: Vec<(String, String)> = claims
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect();
    pairs.push(("nonce".to_string(), nonce));
    pairs.push(("timestamp".to_string(), timestamp));
    pairs.sort();

    let message = pairs
        .iter()
        .map(|(key, value)| {
            format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
        })
        .collect::<Vec<_>>()
        .join("&");

    let signature = compute_signature(&message, config.api_key().as_ref());
    format!("{signature}|{message}")
}

/// Signs a locally constructed resource's signable attributes.
///
/// Only attributes the schema declares signable and which are locally
/// assigned are included, each prefixed with the entity's tag name
/// (`account.account_code=acme`).
#[must_use]
pub fn sign_resource(config: &RecurlyConfig, resource: &Resource) -> String {
    let schema = resource.schema();
    let pairs: Vec<(String, String)> = schema
        .js_attributes
        .iter()
        .filter_map(|&name| {
            resource
                .local_value(name)
                .map(|value| (format!("{}.{}", schema.nodename, name), value.to_text()))
        })
        .collect();

    let claims: Vec<(&str, &str)> = pairs
        .iter()
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();
    sign(config, &claims)
}

/// Verifies a `signature|message` token in constant time.
#[must_use]
pub fn verify(config: &RecurlyConfig, token: &str) -> bool {
    let Some((signature, message)) = token.split_once('|') else {
        return false;
    };
    let expected = compute_signature(message, config.api_key().as_ref());
    constant_time_compare(signature, &expected)
}

/// Computes a base64-encoded HMAC-SHA256 signature for the message.
#[must_use]
#[allow(clippy::missing_panics_doc)] // HMAC accepts any key size, so this never panics
pub fn compute_signature(message: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(message.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

/// Performs constant-time comparison of two strings.
#[must_use]
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
