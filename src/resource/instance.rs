//! The entity instance: lazily decoded, locally assignable, serializable.
//!
//! A [`Resource`] is backed by a retained source element (when hydrated
//! from a response) and/or a map of explicit local assignments (when
//! constructed for a create, mutated, or after a linked attribute was
//! resolved). Local assignments always shadow values re-derived from the
//! retained element. Nothing is decoded eagerly: hydrating from an element
//! is free, and each field decodes on access.
//!
//! Instances are not designed for concurrent mutation; callers must
//! serialize access to a shared instance.
//!
//! # Example
//!
//! ```rust
//! use recurly_api::resource::{registry, Resource, Value};
//! use recurly_api::xml::Element;
//!
//! let elem = Element::parse(
//!     "<account><account_code>acme</account_code><state>active</state></account>",
//! ).unwrap();
//! let account = registry::global().hydrate(elem);
//!
//! assert_eq!(account.attribute_get("account_code").unwrap().as_str(), Some("acme"));
//! assert_eq!(account.attribute_get("state").unwrap().as_str(), Some("active"));
//! assert!(account.attribute_get("email").is_err());
//! ```

use std::collections::BTreeMap;

use crate::clients::HttpClient;
use crate::config::CurrencyCode;
use crate::resource::errors::ResourceError;
use crate::resource::registry;
use crate::resource::schema::ResourceSchema;
use crate::resource::value::{element_for_value, value_for_element, Value};
use crate::xml::Element;

/// A lazily populated entity instance.
///
/// Holds the retained source element (if hydrated from the wire), the
/// local-assignment map (if constructed or mutated), and the canonical URL
/// once known (from a fetch, or from the `Location` header after a create).
#[derive(Clone, Debug, PartialEq)]
pub struct Resource {
    schema: &'static ResourceSchema,
    elem: Option<Element>,
    values: BTreeMap<String, Value>,
    url: Option<String>,
    default_currency: CurrencyCode,
    inherited_currency: Option<String>,
}

impl Resource {
    /// Creates an empty instance for local construction before a create.
    #[must_use]
    pub fn new(schema: &'static ResourceSchema) -> Self {
        Self {
            schema,
            elem: None,
            values: BTreeMap::new(),
            url: None,
            default_currency: CurrencyCode::default(),
            inherited_currency: None,
        }
    }

    /// Wraps an element without decoding any field.
    #[must_use]
    pub fn from_element(schema: &'static ResourceSchema, elem: Element) -> Self {
        let mut resource = Self::new(schema);
        resource.elem = Some(elem);
        resource
    }

    /// Returns this instance's schema.
    #[must_use]
    pub const fn schema(&self) -> &'static ResourceSchema {
        self.schema
    }

    /// Returns the retained source element, if hydrated from a response.
    #[must_use]
    pub const fn element(&self) -> Option<&Element> {
        self.elem.as_ref()
    }

    /// Returns the canonical URL, if known.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Sets the canonical URL.
    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = Some(url.into());
    }

    /// Sets the default currency used when decoding monetary fields.
    ///
    /// Instances obtained through a client carry the client's configured
    /// default automatically.
    pub fn set_default_currency(&mut self, currency: CurrencyCode) {
        self.default_currency = currency;
    }

    /// Records the embedding parent's currency context.
    pub(crate) fn inherit_currency(&mut self, code: &str) {
        self.inherited_currency = Some(code.to_string());
    }

    /// Returns a locally assigned value without consulting the retained
    /// element.
    #[must_use]
    pub fn local_value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Stores a local assignment. The retained element is never touched;
    /// writes are serialized from local assignments only.
    pub fn attribute_set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Returns the value of an attribute.
    ///
    /// Resolution order: the local assignment if one exists, else the
    /// retained element: an XML attribute for declared XML-attribute
    /// fields, otherwise the child element at the field's (possibly
    /// overridden) path, decoded through the value codec or the field's
    /// codec override.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnresolvedLink`] for a linked attribute
    /// whose resolution would require the network (use
    /// [`attribute_fetch`](Self::attribute_fetch)), and
    /// [`ResourceError::UnsupportedAttribute`] when neither source has the
    /// field.
    pub fn attribute_get(&self, name: &str) -> Result<Value, ResourceError> {
        if let Some(value) = self.values.get(name) {
            return Ok(value.clone());
        }

        if self.schema.is_linked(name) {
            if let Some(child) = self.elem.as_ref().and_then(|elem| elem.find(name)) {
                if child.attr("href").is_some() {
                    return Err(ResourceError::UnresolvedLink {
                        attribute: name.to_string(),
                    });
                }
                // No href means the related resource arrived embedded;
                // fall through to a plain decode.
            }
        }

        if self.schema.is_xml_attribute(name) {
            return self
                .elem
                .as_ref()
                .and_then(|elem| elem.attr(name))
                .map(|text| Value::Text(text.to_string()))
                .ok_or_else(|| ResourceError::UnsupportedAttribute {
                    attribute: name.to_string(),
                });
        }

        let child = self
            .elem
            .as_ref()
            .and_then(|elem| elem.find_path(self.schema.path_for(name)))
            .ok_or_else(|| ResourceError::UnsupportedAttribute {
                attribute: name.to_string(),
            })?;

        let value = if let Some(field_override) = self.schema.override_for(name) {
            (field_override.decode)(child)?
        } else {
            value_for_element(
                registry::global(),
                child,
                self.currency_context().as_deref(),
                &self.default_currency,
            )?
        };
        Ok(value)
    }

    /// Returns the value of an attribute, resolving linked attributes over
    /// the transport on first access.
    ///
    /// A resolved link is cached as a local assignment, so a second access
    /// does not re-fetch. [`update_from_element`](Self::update_from_element)
    /// invalidates the cache.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`attribute_get`](Self::attribute_get),
    /// plus any fetch failure from resolving the link.
    pub async fn attribute_fetch(
        &mut self,
        client: &HttpClient,
        name: &str,
    ) -> Result<Value, ResourceError> {
        match self.attribute_get(name) {
            Err(ResourceError::UnresolvedLink { .. }) => {}
            other => return other,
        }

        let href = self
            .elem
            .as_ref()
            .and_then(|elem| elem.find(name))
            .and_then(|child| child.attr("href"))
            .ok_or_else(|| ResourceError::UnsupportedAttribute {
                attribute: name.to_string(),
            })?
            .to_string();

        let resource = Self::fetch(client, &href).await?;
        let value = Value::Resource(Box::new(resource));
        self.values.insert(name.to_string(), value.clone());
        Ok(value)
    }

    /// Serializes the instance into a fresh element.
    ///
    /// With `full` unset, only local assignments are emitted (the
    /// write-then-serialize model for creates and updates). With `full` set,
    /// every declared plain attribute present in either source is emitted.
    ///
    /// Sensitive attributes are included only when locally assigned; a
    /// value that came from a retained server element is never re-emitted,
    /// so masked secrets cannot be resubmitted by accident. Declared
    /// XML-attribute fields (type discriminators) are always emitted,
    /// recovered from the retained element when not locally assigned.
    #[must_use]
    pub fn to_element(&self, full: bool) -> Element {
        let tag = self
            .elem
            .as_ref()
            .map_or(self.schema.nodename, Element::tag)
            .to_string();
        let mut out = Element::new(tag);

        for &name in self.schema.xml_attribute_attributes {
            let text = self.values.get(name).map_or_else(
                || {
                    self.elem
                        .as_ref()
                        .and_then(|elem| elem.attr(name))
                        .map(ToString::to_string)
                },
                |value| Some(value.to_text()),
            );
            if let Some(text) = text {
                out.set_attr(name, text);
            }
        }

        if self.schema.attributes.is_empty() {
            // Generic fallback type: no declared order, serialize every
            // local assignment.
            for (name, value) in &self.values {
                out.push(self.encode_field(name, value));
            }
            return out;
        }

        for &name in self.schema.attributes {
            if self.schema.is_xml_attribute(name) {
                continue;
            }
            if let Some(value) = self.values.get(name) {
                out.push(self.encode_field(name, value));
                continue;
            }
            if !full || self.schema.is_sensitive(name) {
                continue;
            }
            if let Ok(value) = self.attribute_get(name) {
                out.push(self.encode_field(name, &value));
            }
        }

        out
    }

    fn encode_field(&self, name: &str, value: &Value) -> Element {
        self.schema.override_for(name).map_or_else(
            || element_for_value(name, value),
            |field_override| (field_override.encode)(name, value),
        )
    }

    /// Replaces the retained element and drops every local assignment,
    /// including cached linked-attribute resolutions.
    ///
    /// Used after a write to fold the response back into the instance: the
    /// response supersedes both the old element and the assignments that
    /// produced the write.
    pub fn update_from_element(&mut self, elem: Element) {
        self.elem = Some(elem);
        self.values.clear();
    }

    /// Returns the currency context for monetary fields: the entity's own
    /// `currency` field, else a context inherited from the embedding
    /// parent. `None` when the schema opts out of inheritance.
    #[must_use]
    pub fn currency_context(&self) -> Option<String> {
        if !self.schema.inherits_currency {
            return None;
        }
        if let Some(value) = self.values.get("currency") {
            if let Some(code) = value.as_str() {
                return Some(code.to_string());
            }
        }
        if let Some(text) = self
            .elem
            .as_ref()
            .and_then(|elem| elem.find("currency"))
            .and_then(Element::text)
        {
            return Some(text.to_string());
        }
        self.inherited_currency.clone()
    }

    /// Fetches and decodes the resource at a URL.
    ///
    /// The response element is decoded polymorphically through the global
    /// type registry, so the result's type is whatever the server returned.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] for a 404 and
    /// [`ResourceError::Request`] for any other non-2xx response, carrying
    /// the decoded error payload.
    pub async fn fetch(client: &HttpClient, url: &str) -> Result<Self, ResourceError> {
        let response = client.get(url).await?;
        if !response.is_ok() {
            return Err(ResourceError::from_response(&response, url));
        }

        let elem = Element::parse(&response.text())?;
        let mut resource = registry::global().hydrate(elem);
        resource.default_currency = client.config().default_currency().clone();
        resource.url = Some(client.resolve_url(url));
        Ok(resource)
    }

    /// Creates this resource by POSTing its local assignments to a URL.
    ///
    /// On success the `Location` response header becomes the canonical URL
    /// and the decoded response body replaces the retained element.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Request`] for any non-2xx response,
    /// carrying the decoded error payload.
    pub async fn post(&mut self, client: &HttpClient, url: &str) -> Result<(), ResourceError> {
        let body = self.to_element(false).to_xml_document()?;
        let response = client.post(url, body).await?;
        if !response.is_ok() {
            return Err(ResourceError::from_response(&response, url));
        }

        if let Some(location) = response.location() {
            self.url = Some(location.to_string());
        }
        self.default_currency = client.config().default_currency().clone();
        if !response.body.is_empty() {
            let elem = Element::parse(&response.text())?;
            self.update_from_element(elem);
        }
        Ok(())
    }

    /// Creates this resource by POSTing to its type's collection.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingUrl`] for embedded-only types with
    /// no collection path, or any error from [`post`](Self::post).
    pub async fn create(&mut self, client: &HttpClient) -> Result<(), ResourceError> {
        let url = self
            .schema
            .collection_path
            .ok_or(ResourceError::MissingUrl)?;
        self.post(client, url).await
    }

    /// Updates this resource by PUTting its local assignments to the
    /// canonical URL, folding the response back in.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingUrl`] if the instance has no
    /// canonical URL, or [`ResourceError::Request`] for a non-2xx response.
    pub async fn save(&mut self, client: &HttpClient) -> Result<(), ResourceError> {
        let url = self.url.clone().ok_or(ResourceError::MissingUrl)?;
        let body = self.to_element(false).to_xml_document()?;
        let response = client.put(&url, Some(body)).await?;
        if !response.is_ok() {
            return Err(ResourceError::from_response(&response, &url));
        }

        if !response.body.is_empty() {
            let elem = Element::parse(&response.text())?;
            self.update_from_element(elem);
        }
        Ok(())
    }

    /// Deletes this resource at its canonical URL.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingUrl`] if the instance has no
    /// canonical URL, or [`ResourceError::Request`] for a non-2xx response.
    pub async fn delete(&self, client: &HttpClient) -> Result<(), ResourceError> {
        let url = self.url.as_deref().ok_or(ResourceError::MissingUrl)?;
        let response = client.delete(url).await?;
        if !response.is_ok() {
            return Err(ResourceError::from_response(&response, url));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{ACCOUNT, BILLING_INFO, SUBSCRIPTION};

    fn account_from(xml: &str) -> Resource {
        Resource::from_element(&ACCOUNT, Element::parse(xml).unwrap())
    }

    #[test]
    fn test_attribute_get_decodes_from_retained_element() {
        let account = account_from(
            "<account><account_code>acme</account_code><state>active</state></account>",
        );

        assert_eq!(
            account.attribute_get("account_code").unwrap(),
            Value::Text("acme".to_string())
        );
        assert_eq!(
            account.attribute_get("state").unwrap(),
            Value::Text("active".to_string())
        );
    }

    #[test]
    fn test_attribute_get_raises_for_absent_field() {
        let account = account_from(
            "<account><account_code>acme</account_code><state>active</state></account>",
        );

        assert!(matches!(
            account.attribute_get("email"),
            Err(ResourceError::UnsupportedAttribute { attribute }) if attribute == "email"
        ));
    }

    #[test]
    fn test_local_assignment_shadows_retained_element() {
        let mut account = account_from("<account><account_code>acme</account_code></account>");
        account.attribute_set("account_code", "emca");

        assert_eq!(
            account.attribute_get("account_code").unwrap().as_str(),
            Some("emca")
        );
        // The retained element itself is untouched.
        assert_eq!(
            account
                .element()
                .unwrap()
                .find("account_code")
                .and_then(Element::text),
            Some("acme")
        );
    }

    #[test]
    fn test_linked_attribute_with_href_requires_fetch() {
        let account = account_from(
            r#"<account><account_code>acme</account_code><invoices href="https://api.recurly.com/v2/accounts/acme/invoices"/></account>"#,
        );

        assert!(matches!(
            account.attribute_get("invoices"),
            Err(ResourceError::UnresolvedLink { attribute }) if attribute == "invoices"
        ));
    }

    #[test]
    fn test_embedded_linked_attribute_decodes_inline() {
        let account = account_from(
            "<account><billing_info><first_name>Jane</first_name></billing_info></account>",
        );

        let value = account.attribute_get("billing_info").unwrap();
        let billing = value.as_resource().unwrap();
        assert_eq!(billing.schema().nodename, "billing_info");
        assert_eq!(
            billing.attribute_get("first_name").unwrap().as_str(),
            Some("Jane")
        );
    }

    #[test]
    fn test_xml_attribute_field_reads_element_attribute() {
        let billing = Resource::from_element(
            &BILLING_INFO,
            Element::parse(r#"<billing_info type="credit_card"><first_name>Jane</first_name></billing_info>"#).unwrap(),
        );

        assert_eq!(
            billing.attribute_get("type").unwrap().as_str(),
            Some("credit_card")
        );
    }

    #[test]
    fn test_path_override_reads_nested_child() {
        let subscription = Resource::from_element(
            &SUBSCRIPTION,
            Element::parse(
                "<subscription><plan><plan_code>gold</plan_code></plan></subscription>",
            )
            .unwrap(),
        );

        assert_eq!(
            subscription.attribute_get("plan_code").unwrap().as_str(),
            Some("gold")
        );
    }

    #[test]
    fn test_to_element_serializes_local_assignments_only() {
        let mut account = account_from("<account><state>active</state></account>");
        account.attribute_set("account_code", "acme");

        let elem = account.to_element(false);
        assert!(elem.find("account_code").is_some());
        assert!(elem.find("state").is_none());
    }

    #[test]
    fn test_to_element_full_reproduces_declared_source_fields() {
        let account = account_from(
            "<account><account_code>acme</account_code><state>active</state><email>a@example.com</email></account>",
        );

        let elem = account.to_element(true);
        assert_eq!(elem.find("account_code").and_then(Element::text), Some("acme"));
        assert_eq!(elem.find("state").and_then(Element::text), Some("active"));
        assert_eq!(elem.find("email").and_then(Element::text), Some("a@example.com"));
    }

    #[test]
    fn test_sensitive_attribute_never_reemitted_from_server_element() {
        let billing = Resource::from_element(
            &BILLING_INFO,
            Element::parse(
                "<billing_info><first_name>Jane</first_name><number>4111-1111-1111-1111</number></billing_info>",
            )
            .unwrap(),
        );

        let elem = billing.to_element(true);
        assert!(elem.find("number").is_none());
        assert!(elem.find("first_name").is_some());
    }

    #[test]
    fn test_sensitive_attribute_emitted_when_locally_set() {
        let mut billing = Resource::new(&BILLING_INFO);
        billing.attribute_set("number", "4111-1111-1111-1111");

        let elem = billing.to_element(false);
        assert_eq!(
            elem.find("number").and_then(Element::text),
            Some("4111-1111-1111-1111")
        );
    }

    #[test]
    fn test_type_discriminator_recovered_from_retained_element() {
        let mut billing = Resource::from_element(
            &BILLING_INFO,
            Element::parse(r#"<billing_info type="paypal"><company>ACME</company></billing_info>"#)
                .unwrap(),
        );
        // A partial hydrate-then-update must not lose the discriminator.
        billing.attribute_set("company", "ACME Ltd");

        let elem = billing.to_element(false);
        assert_eq!(elem.attr("type"), Some("paypal"));
    }

    #[test]
    fn test_update_from_element_clears_assignments_and_caches() {
        let mut account = account_from("<account><account_code>acme</account_code></account>");
        account.attribute_set("email", "a@example.com");

        account.update_from_element(
            Element::parse("<account><account_code>acme</account_code><state>active</state></account>")
                .unwrap(),
        );

        assert!(account.local_value("email").is_none());
        assert_eq!(account.attribute_get("state").unwrap().as_str(), Some("active"));
    }

    #[test]
    fn test_currency_context_reads_own_currency_field() {
        let subscription = Resource::from_element(
            &SUBSCRIPTION,
            Element::parse("<subscription><currency>EUR</currency></subscription>").unwrap(),
        );

        assert_eq!(subscription.currency_context().as_deref(), Some("EUR"));
    }

    #[test]
    fn test_money_field_uses_entity_currency_context() {
        let subscription = Resource::from_element(
            &SUBSCRIPTION,
            Element::parse(
                "<subscription><currency>EUR</currency><unit_amount_in_cents><USD>1000</USD><EUR>800</EUR></unit_amount_in_cents></subscription>",
            )
            .unwrap(),
        );

        let value = subscription.attribute_get("unit_amount_in_cents").unwrap();
        let money = value.as_money().unwrap();
        assert_eq!(money.amount_in_cents, 800);
        assert_eq!(money.currency.as_ref(), "EUR");
    }

    #[test]
    fn test_embedded_child_inherits_parent_currency() {
        let subscription = Resource::from_element(
            &SUBSCRIPTION,
            Element::parse(
                r#"<subscription><currency>EUR</currency><subscription_add_ons type="array"><subscription_add_on><add_on_code>ip</add_on_code><unit_amount_in_cents><USD>200</USD><EUR>150</EUR></unit_amount_in_cents></subscription_add_on></subscription_add_ons></subscription>"#,
            )
            .unwrap(),
        );

        let add_ons = subscription.attribute_get("subscription_add_ons").unwrap();
        let items = add_ons.as_list().unwrap();
        let add_on = items[0].as_resource().unwrap();

        let money = add_on
            .attribute_get("unit_amount_in_cents")
            .unwrap()
            .as_money()
            .cloned()
            .unwrap();
        assert_eq!(money.amount_in_cents, 150);
        assert_eq!(money.currency.as_ref(), "EUR");
    }

    #[test]
    fn test_round_trip_preserves_declared_plain_attributes() {
        let source = "<account><account_code>acme</account_code><username>doge</username><email>a@example.com</email><first_name>A</first_name><state>active</state></account>";
        let account = account_from(source);

        let rewritten = account.to_element(true);
        let original = Element::parse(source).unwrap();
        for child in original.children() {
            assert_eq!(
                rewritten.find(child.tag()).and_then(Element::text),
                child.text(),
                "attribute '{}' did not survive the round trip",
                child.tag()
            );
        }
    }

    #[test]
    fn test_new_instance_has_no_canonical_url() {
        let account = Resource::new(&ACCOUNT);
        assert!(account.url().is_none());
        assert!(account.element().is_none());
    }
}
