//! Hypermedia action discovery and invocation.
//!
//! Actions are operations the server advertises per instance as sibling
//! anchor elements inside the entity's element:
//!
//! ```xml
//! <transaction>
//!   <a name="refund" href="https://api.recurly.com/v2/transactions/a13a/refund" method="post"/>
//! </transaction>
//! ```
//!
//! Availability is genuinely data-dependent (an already refunded
//! transaction exposes no refund anchor), so actions are modeled as a
//! capability query returning a bound [`Action`] value rather than fixed
//! methods: [`Resource::action`] either finds the anchor or raises
//! [`ResourceError::UnsupportedAction`], which callers can distinguish from
//! a missing field.

use crate::clients::{DataType, HttpClient, HttpError, HttpMethod, HttpRequest};
use crate::resource::errors::ResourceError;
use crate::resource::instance::Resource;
use crate::resource::registry;
use crate::xml::Element;

/// An action bound to the URL and HTTP method the server advertised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Action {
    name: String,
    url: String,
    method: HttpMethod,
}

impl Action {
    /// Returns the action's advertised name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the URL the action is bound to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the HTTP method the action is bound to.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.method
    }

    /// Invokes the action, serializing the optional payload as the request
    /// body.
    ///
    /// Any 2xx status is success; a 202-Accepted response typically carries
    /// a `Location` header with a follow-up URL for retrieving the deferred
    /// result, surfaced as [`ActionOutcome::follow_up_url`].
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Request`] for any non-2xx response,
    /// carrying the decoded error payload.
    pub async fn invoke(
        &self,
        client: &HttpClient,
        payload: Option<&Resource>,
    ) -> Result<ActionOutcome, ResourceError> {
        let body = payload
            .map(|resource| resource.to_element(false).to_xml_document())
            .transpose()?;

        let mut builder = HttpRequest::builder(self.method, &self.url);
        if let Some(body) = body {
            builder = builder.body(body).body_type(DataType::Xml);
        }
        let request = builder.build().map_err(HttpError::from)?;

        let response = client.request(request).await?;
        if !response.is_ok() {
            return Err(ResourceError::from_response(&response, &self.url));
        }

        let resource = if response.body.is_empty() {
            None
        } else {
            let elem = Element::parse(&response.text())?;
            let mut resource = registry::global().hydrate(elem);
            resource.set_default_currency(client.config().default_currency().clone());
            Some(resource)
        };

        Ok(ActionOutcome {
            status: response.code,
            resource,
            follow_up_url: response.location().map(ToString::to_string),
        })
    }
}

/// The result of invoking an action.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionOutcome {
    /// The response status code.
    pub status: u16,
    /// The decoded response body, when the server sent one.
    pub resource: Option<Resource>,
    /// The `Location` header, when the server deferred the result.
    pub follow_up_url: Option<String>,
}

impl Resource {
    /// Looks up an advertised action by name.
    ///
    /// Scans the retained element for an `<a>` anchor whose `name`
    /// attribute matches and which carries `href` and `method` attributes.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnsupportedAction`] when the instance's
    /// retained state advertises no such action.
    pub fn action(&self, name: &str) -> Result<Action, ResourceError> {
        let unsupported = || ResourceError::UnsupportedAction {
            action: name.to_string(),
        };

        let elem = self.element().ok_or_else(unsupported)?;
        for anchor in elem.find_all("a") {
            if anchor.attr("name") != Some(name) {
                continue;
            }
            let (Some(href), Some(method)) = (anchor.attr("href"), anchor.attr("method")) else {
                continue;
            };
            let Some(method) = HttpMethod::parse(method) else {
                continue;
            };
            return Ok(Action {
                name: name.to_string(),
                url: href.to_string(),
                method,
            });
        }
        Err(unsupported())
    }

    /// Returns `true` if the instance's retained state advertises the
    /// action.
    #[must_use]
    pub fn has_action(&self, name: &str) -> bool {
        self.action(name).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::TRANSACTION;

    fn transaction_from(xml: &str) -> Resource {
        Resource::from_element(&TRANSACTION, Element::parse(xml).unwrap())
    }

    #[test]
    fn test_action_resolves_advertised_anchor() {
        let transaction = transaction_from(
            r#"<transaction><uuid>a13a</uuid><a name="refund" href="https://api.recurly.com/v2/transactions/a13a/refund" method="post"/></transaction>"#,
        );

        let action = transaction.action("refund").unwrap();
        assert_eq!(action.name(), "refund");
        assert_eq!(
            action.url(),
            "https://api.recurly.com/v2/transactions/a13a/refund"
        );
        assert_eq!(action.method(), HttpMethod::Post);
    }

    #[test]
    fn test_absent_anchor_raises_unsupported_action() {
        let transaction = transaction_from("<transaction><uuid>a13a</uuid></transaction>");

        assert!(matches!(
            transaction.action("refund"),
            Err(ResourceError::UnsupportedAction { action }) if action == "refund"
        ));
        assert!(!transaction.has_action("refund"));
    }

    #[test]
    fn test_anchor_for_other_action_does_not_match() {
        let transaction = transaction_from(
            r#"<transaction><a name="void" href="https://api.recurly.com/v2/transactions/a13a/void" method="put"/></transaction>"#,
        );

        assert!(transaction.has_action("void"));
        assert!(!transaction.has_action("refund"));
    }

    #[test]
    fn test_anchor_without_href_or_method_is_unusable() {
        let transaction =
            transaction_from(r#"<transaction><a name="refund" href="https://x/refund"/></transaction>"#);

        assert!(matches!(
            transaction.action("refund"),
            Err(ResourceError::UnsupportedAction { .. })
        ));
    }

    #[test]
    fn test_instance_without_retained_element_has_no_actions() {
        let transaction = Resource::new(&TRANSACTION);
        assert!(!transaction.has_action("refund"));
    }
}
