//! Push notification decoding.
//!
//! The billing service pushes server-initiated XML notifications (account
//! created, subscription renewed, payment failed, ...) with no
//! request/response pairing. The document's root tag names the event kind
//! and each child element is decoded polymorphically through the type
//! registry:
//!
//! ```xml
//! <new_account_notification>
//!   <account>
//!     <account_code>acme</account_code>
//!   </account>
//! </new_account_notification>
//! ```
//!
//! Notification payloads are trimmed projections of the full entities;
//! some attributes present on the real resource will be absent here.
//!
//! # Example
//!
//! ```rust
//! use recurly_api::webhooks;
//!
//! let body = "<new_account_notification><account><account_code>acme</account_code></account></new_account_notification>";
//! let notification = webhooks::parse(body).unwrap();
//!
//! assert_eq!(notification.kind(), "new_account_notification");
//! let account = notification.object("account").unwrap().as_resource().unwrap();
//! assert_eq!(account.attribute_get("account_code").unwrap().as_str(), Some("acme"));
//! ```

use std::collections::BTreeMap;

use crate::config::CurrencyCode;
use crate::resource::registry;
use crate::resource::{value_for_element, DecodeError, TypeRegistry, Value};
use crate::xml::Element;

/// A decoded push notification: the event kind plus its constituent
/// objects, keyed by child tag.
#[derive(Clone, Debug, PartialEq)]
pub struct PushNotification {
    kind: String,
    objects: BTreeMap<String, Value>,
}

impl PushNotification {
    /// Returns the event kind (the document's root tag).
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the decoded object for a child tag, if present.
    #[must_use]
    pub fn object(&self, tag: &str) -> Option<&Value> {
        self.objects.get(tag)
    }

    /// Returns all decoded objects, keyed by child tag.
    #[must_use]
    pub const fn objects(&self) -> &BTreeMap<String, Value> {
        &self.objects
    }
}

/// Decodes a push notification body through the process-wide registry.
///
/// # Errors
///
/// Returns [`DecodeError`] if the document is malformed or a child value
/// fails to decode.
pub fn parse(body: &str) -> Result<PushNotification, DecodeError> {
    parse_with(registry::global(), body)
}

/// Decodes a push notification body through an explicit registry.
///
/// # Errors
///
/// Returns [`DecodeError`] if the document is malformed or a child value
/// fails to decode.
pub fn parse_with(registry: &TypeRegistry, body: &str) -> Result<PushNotification, DecodeError> {
    let root = Element::parse(body)?;
    let default_currency = CurrencyCode::default();

    let mut objects = BTreeMap::new();
    for child in root.children() {
        let value = value_for_element(registry, child, None, &default_currency)?;
        objects.insert(child.tag().to_string(), value);
    }

    Ok(PushNotification {
        kind: root.tag().to_string(),
        objects,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decodes_kind_and_objects() {
        let body = r#"<successful_payment_notification>
            <account>
                <account_code>acme</account_code>
            </account>
            <transaction>
                <id>a5143c1d3a6f4a8287d0e2cc1d4c0427</id>
                <amount_in_cents type="integer">1000</amount_in_cents>
            </transaction>
        </successful_payment_notification>"#;

        let notification = parse(body).unwrap();
        assert_eq!(notification.kind(), "successful_payment_notification");
        assert_eq!(notification.objects().len(), 2);

        let account = notification.object("account").unwrap().as_resource().unwrap();
        assert_eq!(account.schema().nodename, "account");
        assert_eq!(
            account.attribute_get("account_code").unwrap().as_str(),
            Some("acme")
        );

        let transaction = notification
            .object("transaction")
            .unwrap()
            .as_resource()
            .unwrap();
        assert_eq!(
            transaction
                .attribute_get("amount_in_cents")
                .unwrap()
                .as_i64(),
            Some(1000)
        );
    }

    #[test]
    fn test_unknown_child_tags_decode_through_fallback() {
        let body = "<mystery_notification><gift_card><code>XYZ</code></gift_card></mystery_notification>";

        let notification = parse(body).unwrap();
        let gift_card = notification.object("gift_card").unwrap().as_resource().unwrap();
        assert_eq!(
            gift_card.attribute_get("code").unwrap().as_str(),
            Some("XYZ")
        );
    }

    #[test]
    fn test_parse_with_explicit_registry() {
        let registry = TypeRegistry::with_default_schemas().unwrap();
        let notification =
            parse_with(&registry, "<canceled_account_notification/>").unwrap();
        assert_eq!(notification.kind(), "canceled_account_notification");
        assert!(notification.objects().is_empty());
    }

    #[test]
    fn test_malformed_notification_is_fatal() {
        assert!(parse("<oops><account></oops>").is_err());
        assert!(parse("").is_err());
    }
}
