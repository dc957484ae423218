//! Static entity schemas: field classification and addressing.
//!
//! A [`ResourceSchema`] is the per-type declaration the marshaling engine
//! consults: which fields are plain children, which are write-only
//! sensitive values, which resolve through an `href` link, which live as
//! XML attributes on the entity element, and where a top-level entity is
//! addressed. Schemas are plain static configuration data; all behavior
//! lives in the generic [`Resource`](crate::resource::Resource) engine.
//!
//! # Example
//!
//! ```rust
//! use recurly_api::resource::ResourceSchema;
//!
//! static COUPON: ResourceSchema = ResourceSchema::new("coupon")
//!     .member_path("coupons/{id}")
//!     .collection_path("coupons")
//!     .attributes(&["coupon_code", "name", "discount_type"])
//!     .linked_attributes(&["redemptions"]);
//!
//! assert!(COUPON.declares("coupon_code"));
//! assert_eq!(COUPON.member_url("free trial"), Some("coupons/free%20trial".to_string()));
//! ```

use crate::clients::HttpClient;
use crate::resource::errors::{DecodeError, ResourceError};
use crate::resource::instance::Resource;
use crate::resource::page::Pager;
use crate::resource::value::Value;
use crate::xml::Element;

/// How a field is stored on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// A scalar or structured child element.
    Plain,
    /// A child element carrying an `href` to the real value.
    Linked,
    /// An XML attribute on the entity's own element.
    XmlAttribute,
}

/// A per-field codec override.
///
/// Overrides take precedence over the generic value codec. Used for fields
/// whose wire shape the generic rules cannot pin down, e.g. a list of codes
/// structured as sibling elements.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FieldOverride {
    /// Decodes the field's element into a value.
    pub decode: fn(&Element) -> Result<Value, DecodeError>,
    /// Encodes a value into the field's element.
    pub encode: fn(&str, &Value) -> Element,
}

impl std::fmt::Debug for FieldOverride {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FieldOverride(..)")
    }
}

/// The static declaration of one entity type.
///
/// Declared as `static` items with the `const` builder methods; the type
/// registry maps each schema's tag name to the schema.
///
/// Classification invariants:
/// - `sensitive_attributes` are a subset of `attributes` and are only ever
///   serialized from explicit local assignments, never from a retained
///   server element.
/// - `xml_attribute_attributes` are serialized as attributes on the entity
///   element and always re-emitted (type discriminators must survive
///   serialize-after-partial-hydrate).
/// - `member_path` / `collection_path` are present only for top-level,
///   independently addressable entities.
#[derive(Debug, PartialEq, Eq)]
pub struct ResourceSchema {
    /// The XML tag identifying this entity type.
    pub nodename: &'static str,
    /// Template for a member URL, with an `{id}` placeholder.
    pub member_path: Option<&'static str>,
    /// Relative URL of the entity's collection.
    pub collection_path: Option<&'static str>,
    /// Declared plain attributes, in serialization order.
    pub attributes: &'static [&'static str],
    /// Write-only attributes, never read back from a server element.
    pub sensitive_attributes: &'static [&'static str],
    /// Attributes resolved through an `href`-bearing child element.
    pub linked_attributes: &'static [&'static str],
    /// Attributes stored as XML attributes of the entity element.
    pub xml_attribute_attributes: &'static [&'static str],
    /// Attributes included in recurly.js signatures.
    pub js_attributes: &'static [&'static str],
    /// Whether monetary children without an explicit currency inherit the
    /// entity's (or its embedding parent's) currency context.
    pub inherits_currency: bool,
    /// Field name to child-path overrides (e.g. `plan_code` -> `plan/plan_code`).
    pub attribute_paths: &'static [(&'static str, &'static str)],
    /// Field codec overrides.
    pub overrides: &'static [(&'static str, FieldOverride)],
}

impl ResourceSchema {
    /// Creates a schema with the given tag name and no declared fields.
    #[must_use]
    pub const fn new(nodename: &'static str) -> Self {
        Self {
            nodename,
            member_path: None,
            collection_path: None,
            attributes: &[],
            sensitive_attributes: &[],
            linked_attributes: &[],
            xml_attribute_attributes: &[],
            js_attributes: &[],
            inherits_currency: true,
            attribute_paths: &[],
            overrides: &[],
        }
    }

    /// Sets the member URL template (`{id}` placeholder).
    #[must_use]
    pub const fn member_path(mut self, path: &'static str) -> Self {
        self.member_path = Some(path);
        self
    }

    /// Sets the collection URL.
    #[must_use]
    pub const fn collection_path(mut self, path: &'static str) -> Self {
        self.collection_path = Some(path);
        self
    }

    /// Sets the declared plain attributes.
    #[must_use]
    pub const fn attributes(mut self, attributes: &'static [&'static str]) -> Self {
        self.attributes = attributes;
        self
    }

    /// Sets the sensitive attributes.
    #[must_use]
    pub const fn sensitive_attributes(mut self, attributes: &'static [&'static str]) -> Self {
        self.sensitive_attributes = attributes;
        self
    }

    /// Sets the linked attributes.
    #[must_use]
    pub const fn linked_attributes(mut self, attributes: &'static [&'static str]) -> Self {
        self.linked_attributes = attributes;
        self
    }

    /// Sets the XML-attribute attributes.
    #[must_use]
    pub const fn xml_attribute_attributes(mut self, attributes: &'static [&'static str]) -> Self {
        self.xml_attribute_attributes = attributes;
        self
    }

    /// Sets the recurly.js-signable attributes.
    #[must_use]
    pub const fn js_attributes(mut self, attributes: &'static [&'static str]) -> Self {
        self.js_attributes = attributes;
        self
    }

    /// Marks this type as not inheriting a currency context.
    #[must_use]
    pub const fn no_currency_inheritance(mut self) -> Self {
        self.inherits_currency = false;
        self
    }

    /// Sets field-to-child-path overrides.
    #[must_use]
    pub const fn attribute_paths(mut self, paths: &'static [(&'static str, &'static str)]) -> Self {
        self.attribute_paths = paths;
        self
    }

    /// Sets field codec overrides.
    #[must_use]
    pub const fn overrides(mut self, overrides: &'static [(&'static str, FieldOverride)]) -> Self {
        self.overrides = overrides;
        self
    }

    /// Returns `true` if `name` is declared as a plain or XML attribute.
    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        self.attributes.iter().any(|&attr| attr == name)
            || self.xml_attribute_attributes.iter().any(|&attr| attr == name)
    }

    /// Returns `true` if `name` is a sensitive attribute.
    #[must_use]
    pub fn is_sensitive(&self, name: &str) -> bool {
        self.sensitive_attributes.iter().any(|&attr| attr == name)
    }

    /// Returns `true` if `name` is a linked attribute.
    #[must_use]
    pub fn is_linked(&self, name: &str) -> bool {
        self.linked_attributes.iter().any(|&attr| attr == name)
    }

    /// Returns `true` if `name` is stored as an XML attribute.
    #[must_use]
    pub fn is_xml_attribute(&self, name: &str) -> bool {
        self.xml_attribute_attributes.iter().any(|&attr| attr == name)
    }

    /// Returns how `name` is stored on the wire.
    #[must_use]
    pub fn field_kind(&self, name: &str) -> FieldKind {
        if self.is_linked(name) {
            FieldKind::Linked
        } else if self.is_xml_attribute(name) {
            FieldKind::XmlAttribute
        } else {
            FieldKind::Plain
        }
    }

    /// Returns the child path for `name`, honoring any path override.
    #[must_use]
    pub fn path_for<'a>(&self, name: &'a str) -> &'a str {
        self.attribute_paths
            .iter()
            .find(|(attr, _)| *attr == name)
            .map_or(name, |(_, path)| *path)
    }

    /// Returns the codec override for `name`, if declared.
    #[must_use]
    pub fn override_for(&self, name: &str) -> Option<&FieldOverride> {
        self.overrides
            .iter()
            .find(|(attr, _)| *attr == name)
            .map(|(_, field_override)| field_override)
    }

    /// Builds the member URL for an identifier, percent-encoding it.
    ///
    /// Returns `None` for embedded-only entities with no member path.
    #[must_use]
    pub fn member_url(&self, id: &str) -> Option<String> {
        self.member_path
            .map(|template| template.replace("{id}", &urlencoding::encode(id)))
    }

    /// Fetches the entity with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] for a 404,
    /// [`ResourceError::Request`] for any other non-2xx response, and
    /// [`ResourceError::MissingUrl`] if this type has no member path.
    pub async fn find(
        &'static self,
        client: &HttpClient,
        id: &str,
    ) -> Result<Resource, ResourceError> {
        let url = self.member_url(id).ok_or(ResourceError::MissingUrl)?;
        Resource::fetch(client, &url).await
    }

    /// Returns a pager over this type's collection.
    ///
    /// Returns `None` for embedded-only entities with no collection path.
    #[must_use]
    pub fn all(&'static self) -> Option<Pager> {
        self.collection_path.map(Pager::new)
    }

    /// Returns a pager over this type's collection filtered by state.
    ///
    /// The original API exposes state-filtered listings for most top-level
    /// entities (`active`, `closed`, `past_due`, ...).
    #[must_use]
    pub fn all_with_state(&'static self, state: &str) -> Option<Pager> {
        self.collection_path
            .map(|path| Pager::new(path).query_param("state", state))
    }
}

/// The fallback schema for tags the registry does not recognize.
///
/// Declares no fields, so every attribute is treated as a plain field and
/// resolved dynamically against the retained element. Keeps decoding
/// forward compatible with server-added resource kinds.
pub static GENERIC: ResourceSchema = ResourceSchema::new("resource");

// Verify schema types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceSchema>();
    assert_send_sync::<FieldOverride>();
};
