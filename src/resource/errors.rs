//! Error types for resource operations.
//!
//! This module contains the semantic error taxonomy for entity marshaling
//! and API operations, plus the decoder for the server's structured error
//! documents.
//!
//! # Error Handling
//!
//! The client maps HTTP status codes to semantic error variants:
//!
//! - **404**: [`ResourceError::NotFound`], the resource doesn't exist
//! - **Other non-2xx**: [`ResourceError::Request`], carrying the decoded
//!   [`ErrorDocument`] when the body parses, and the raw body either way
//!
//! Attribute and action lookups have their own variants so callers can
//! distinguish "field absent" from "action unavailable in current state":
//! action availability is hypermedia-driven and state-dependent (an already
//! refunded transaction advertises no refund anchor).
//!
//! # Example
//!
//! ```rust,ignore
//! use recurly_api::resource::{Resource, ResourceError};
//!
//! match Resource::fetch(&client, "accounts/acme").await {
//!     Ok(account) => println!("found"),
//!     Err(ResourceError::NotFound { url }) => println!("no account at {url}"),
//!     Err(ResourceError::Request { code, error, .. }) => {
//!         println!("request failed with {code}: {error:?}");
//!     }
//!     Err(e) => println!("other error: {e}"),
//! }
//! ```

use thiserror::Error;

use crate::clients::{HttpError, HttpResponse};
use crate::xml::{Element, XmlError};

/// A single field-level validation error from the server.
///
/// Validation failures arrive as repeated `<error>` children:
///
/// ```xml
/// <errors>
///   <error field="account.account_code" symbol="blank">can't be blank</error>
/// </errors>
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    /// The dotted path of the offending field, if given.
    pub field: Option<String>,
    /// The machine-readable error symbol, if given.
    pub symbol: Option<String>,
    /// The human-readable message.
    pub message: String,
}

/// The structured error document carried by non-2xx response bodies.
///
/// Single errors arrive as `<error><symbol>..</symbol><description>..</description></error>`;
/// validation failures as an `<errors>` list of [`FieldError`]s; declined
/// payments additionally carry a `<transaction_error>` block with a gateway
/// error code, a category, and separate merchant- and customer-facing
/// messages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorDocument {
    /// Machine-readable error symbol (e.g. `not_found`).
    pub symbol: Option<String>,
    /// Human-readable description of the error.
    pub description: Option<String>,
    /// Gateway error code for declined transactions (e.g. `insufficient_funds`).
    pub error_code: Option<String>,
    /// Gateway error category for declined transactions (e.g. `soft`).
    pub error_category: Option<String>,
    /// Message intended for the merchant.
    pub merchant_message: Option<String>,
    /// Message safe to show to the customer.
    pub customer_message: Option<String>,
    /// Field-level validation errors.
    pub field_errors: Vec<FieldError>,
}

impl ErrorDocument {
    /// Decodes an error document from a response body.
    ///
    /// Returns `None` if the body is not a recognizable error document;
    /// callers keep the raw body for that case.
    #[must_use]
    pub fn from_xml(body: &str) -> Option<Self> {
        let root = Element::parse(body).ok()?;
        match root.tag() {
            "error" => Some(Self::from_single(&root)),
            "errors" => Some(Self::from_list(&root)),
            _ => None,
        }
    }

    fn from_single(root: &Element) -> Self {
        Self {
            symbol: child_text(root, "symbol"),
            description: child_text(root, "description"),
            ..Self::default()
        }
    }

    fn from_list(root: &Element) -> Self {
        let mut doc = Self::default();

        if let Some(transaction_error) = root.find("transaction_error") {
            doc.error_code = child_text(transaction_error, "error_code");
            doc.error_category = child_text(transaction_error, "error_category");
            doc.merchant_message = child_text(transaction_error, "merchant_message");
            doc.customer_message = child_text(transaction_error, "customer_message");
        }

        for error in root.find_all("error") {
            doc.field_errors.push(FieldError {
                field: error.attr("field").map(ToString::to_string),
                symbol: error.attr("symbol").map(ToString::to_string),
                message: error.text().unwrap_or_default().to_string(),
            });
        }

        doc
    }
}

fn child_text(elem: &Element, tag: &str) -> Option<String> {
    elem.find(tag)
        .and_then(Element::text)
        .map(ToString::to_string)
}

/// Errors raised while decoding scalar values from elements.
///
/// Decode leniency is deliberately narrow: an absent or unparseable
/// timestamp decodes to a null value because optional timestamps are
/// common, while malformed boolean or integer text is an error.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Boolean text was not the literal `true` or `false`.
    #[error("Invalid boolean text '{text}'")]
    Boolean {
        /// The offending text.
        text: String,
    },

    /// Integer text could not be parsed.
    #[error("Invalid integer text '{text}'")]
    Integer {
        /// The offending text.
        text: String,
    },

    /// The document itself was malformed. Fatal; never absorbed.
    #[error(transparent)]
    Xml(#[from] XmlError),
}

/// Error type for resource operations.
///
/// This enum provides semantic error types for entity marshaling and API
/// operations, carrying enough of the server's error payload for callers
/// to render it.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// A reading call returned 404.
    #[error("Resource not found at {url}")]
    NotFound {
        /// The URL that was requested.
        url: String,
    },

    /// A request returned a non-2xx status other than 404.
    #[error("Request failed with status {code}")]
    Request {
        /// The HTTP status code.
        code: u16,
        /// The decoded error document, when the body parsed as one.
        error: Option<ErrorDocument>,
        /// The raw response body.
        body: String,
    },

    /// The requested field exists in neither the local assignments nor the
    /// retained element.
    #[error("No such attribute '{attribute}'")]
    UnsupportedAttribute {
        /// The requested attribute name.
        attribute: String,
    },

    /// The requested action is not advertised by this instance's retained
    /// element. Availability is state-dependent.
    #[error("Action '{action}' is not available on this resource")]
    UnsupportedAction {
        /// The requested action name.
        action: String,
    },

    /// A linked attribute has not been resolved yet and resolving it would
    /// require the network. Use `attribute_fetch` to resolve it.
    #[error("Linked attribute '{attribute}' is unresolved; resolve it with attribute_fetch")]
    UnresolvedLink {
        /// The linked attribute name.
        attribute: String,
    },

    /// The instance has no canonical URL to address a write to.
    #[error("Resource has no canonical URL; fetch or create it first")]
    MissingUrl,

    /// A binary-body endpoint returned an unexpected content type.
    #[error("Expected {expected} response, got '{actual}'")]
    ProtocolMismatch {
        /// The expected content type.
        expected: &'static str,
        /// The content type the server sent.
        actual: String,
    },

    /// Query parameters could not be serialized.
    #[error("Failed to serialize query parameters: {0}")]
    Params(#[from] serde_json::Error),

    /// A value or document failed to decode.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A transport-level error occurred.
    #[error(transparent)]
    Http(#[from] HttpError),
}

impl From<XmlError> for ResourceError {
    fn from(error: XmlError) -> Self {
        Self::Decode(DecodeError::Xml(error))
    }
}

impl ResourceError {
    /// Creates a `ResourceError` from a non-2xx HTTP response.
    ///
    /// Maps 404 to [`NotFound`](Self::NotFound); every other status becomes
    /// [`Request`](Self::Request) with the decoded error document attached
    /// when the body parses as one. Non-2xx statuses are never silently
    /// swallowed on fetch or write paths.
    #[must_use]
    pub fn from_response(response: &HttpResponse, url: &str) -> Self {
        if response.code == 404 {
            return Self::NotFound {
                url: url.to_string(),
            };
        }
        let body = response.text().into_owned();
        Self::Request {
            code: response.code,
            error: ErrorDocument::from_xml(&body),
            body,
        }
    }
}

// Verify ResourceError is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceError>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_error_document_decodes_single_error() {
        let body = "<error><symbol>not_found</symbol><description>The record could not be located.</description></error>";
        let doc = ErrorDocument::from_xml(body).unwrap();

        assert_eq!(doc.symbol.as_deref(), Some("not_found"));
        assert_eq!(
            doc.description.as_deref(),
            Some("The record could not be located.")
        );
        assert!(doc.field_errors.is_empty());
    }

    #[test]
    fn test_error_document_decodes_validation_errors() {
        let body = r#"<errors>
            <error field="account.account_code" symbol="blank">can't be blank</error>
            <error field="account.email" symbol="invalid_email">is not a valid email address</error>
        </errors>"#;
        let doc = ErrorDocument::from_xml(body).unwrap();

        assert_eq!(doc.field_errors.len(), 2);
        assert_eq!(
            doc.field_errors[0].field.as_deref(),
            Some("account.account_code")
        );
        assert_eq!(doc.field_errors[0].symbol.as_deref(), Some("blank"));
        assert_eq!(doc.field_errors[0].message, "can't be blank");
    }

    #[test]
    fn test_error_document_decodes_transaction_error() {
        let body = r#"<errors>
            <transaction_error>
                <error_code>insufficient_funds</error_code>
                <error_category>soft</error_category>
                <merchant_message>The card has insufficient funds.</merchant_message>
                <customer_message>Your card was declined.</customer_message>
            </transaction_error>
            <error field="transaction.base" symbol="declined">Your card was declined.</error>
        </errors>"#;
        let doc = ErrorDocument::from_xml(body).unwrap();

        assert_eq!(doc.error_code.as_deref(), Some("insufficient_funds"));
        assert_eq!(doc.error_category.as_deref(), Some("soft"));
        assert_eq!(
            doc.merchant_message.as_deref(),
            Some("The card has insufficient funds.")
        );
        assert_eq!(
            doc.customer_message.as_deref(),
            Some("Your card was declined.")
        );
        assert_eq!(doc.field_errors.len(), 1);
    }

    #[test]
    fn test_error_document_tolerates_unrecognizable_bodies() {
        assert!(ErrorDocument::from_xml("not xml at all").is_none());
        assert!(ErrorDocument::from_xml("<account/>").is_none());
        assert!(ErrorDocument::from_xml("").is_none());
    }

    #[test]
    fn test_from_response_maps_404_to_not_found() {
        let response = HttpResponse::new(404, HashMap::new(), Vec::new());
        let error = ResourceError::from_response(&response, "accounts/missing");

        assert!(matches!(
            error,
            ResourceError::NotFound { url } if url == "accounts/missing"
        ));
    }

    #[test]
    fn test_from_response_maps_other_codes_to_request() {
        let body = b"<errors><error field=\"account.email\" symbol=\"invalid_email\">is invalid</error></errors>";
        let response = HttpResponse::new(422, HashMap::new(), body.to_vec());
        let error = ResourceError::from_response(&response, "accounts");

        if let ResourceError::Request { code, error, body } = error {
            assert_eq!(code, 422);
            assert_eq!(error.unwrap().field_errors.len(), 1);
            assert!(body.contains("invalid_email"));
        } else {
            panic!("Expected Request variant");
        }
    }

    #[test]
    fn test_from_response_keeps_raw_body_when_undecodable() {
        let response = HttpResponse::new(500, HashMap::new(), b"oops".to_vec());
        let error = ResourceError::from_response(&response, "accounts");

        if let ResourceError::Request { code, error, body } = error {
            assert_eq!(code, 500);
            assert!(error.is_none());
            assert_eq!(body, "oops");
        } else {
            panic!("Expected Request variant");
        }
    }

    #[test]
    fn test_unsupported_attribute_and_action_are_distinct() {
        let attribute_error = ResourceError::UnsupportedAttribute {
            attribute: "email".to_string(),
        };
        let action_error = ResourceError::UnsupportedAction {
            action: "refund".to_string(),
        };

        assert!(attribute_error.to_string().contains("attribute"));
        assert!(action_error.to_string().contains("not available"));
    }

    #[test]
    fn test_xml_error_converts_to_decode_error() {
        let xml_error = XmlError::NoRoot;
        let resource_error: ResourceError = xml_error.into();
        assert!(matches!(
            resource_error,
            ResourceError::Decode(DecodeError::Xml(_))
        ));
    }
}
