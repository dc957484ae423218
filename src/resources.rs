//! The built-in entity taxonomy.
//!
//! Entity types are configuration data over the generic marshaling engine:
//! each is a static [`ResourceSchema`] declaring its tag name, attribute
//! classification, addressing templates, and codec quirks. The behavioral
//! helpers in the submodules cover the operations that go beyond plain
//! CRUD: member actions, the refund flow, PDF download.
//!
//! # Example
//!
//! ```rust,ignore
//! use recurly_api::resources::{self, ACCOUNT};
//!
//! // Fetch by identifier.
//! let mut account = ACCOUNT.find(&client, "acme").await?;
//!
//! // State-filtered listing.
//! let mut pager = ACCOUNT.all_with_state("past_due").unwrap();
//! while let Some(account) = pager.next(&client).await? { /* ... */ }
//!
//! // Member action.
//! resources::account::reopen(&client, &mut account).await?;
//! ```

use crate::clients::{HttpClient, HttpError, HttpMethod, HttpRequest};
use crate::resource::{
    registry, DecodeError, FieldOverride, Resource, ResourceError, ResourceSchema, Value,
};
use crate::xml::Element;

/// A customer account.
pub static ACCOUNT: ResourceSchema = ResourceSchema::new("account")
    .member_path("accounts/{id}")
    .collection_path("accounts")
    .attributes(&[
        "account_code",
        "billing_info",
        "state",
        "username",
        "email",
        "first_name",
        "last_name",
        "company_name",
        "accept_language",
        "hosted_login_token",
        "created_at",
    ])
    .sensitive_attributes(&["number", "verification_value"])
    .linked_attributes(&[
        "adjustments",
        "billing_info",
        "invoices",
        "redemption",
        "subscriptions",
        "transactions",
    ])
    .js_attributes(&[
        "account_code",
        "username",
        "email",
        "first_name",
        "last_name",
        "company_name",
    ]);

/// A set of billing information for an account.
pub static BILLING_INFO: ResourceSchema = ResourceSchema::new("billing_info")
    .attributes(&[
        "type",
        "first_name",
        "last_name",
        "number",
        "verification_value",
        "year",
        "month",
        "start_month",
        "start_year",
        "issue_number",
        "company",
        "address1",
        "address2",
        "city",
        "state",
        "zip",
        "country",
        "phone",
        "vat_number",
        "ip_address",
        "ip_address_country",
        "card_type",
        "first_six",
        "last_four",
        "billing_agreement_id",
    ])
    .sensitive_attributes(&["number", "verification_value"])
    .xml_attribute_attributes(&["type"])
    .linked_attributes(&["account"])
    .js_attributes(&[
        "first_name",
        "last_name",
        "company",
        "address1",
        "address2",
        "city",
        "state",
        "zip",
        "country",
        "phone",
        "vat_number",
    ]);

/// A coupon for a customer to apply to their account.
pub static COUPON: ResourceSchema = ResourceSchema::new("coupon")
    .member_path("coupons/{id}")
    .collection_path("coupons")
    .attributes(&[
        "coupon_code",
        "name",
        "discount_type",
        "discount_percent",
        "discount_in_cents",
        "redeem_by_date",
        "single_use",
        "applies_for_months",
        "max_redemptions",
        "applies_to_all_plans",
        "created_at",
        "plan_codes",
    ])
    .linked_attributes(&["redemptions"])
    .overrides(&[(
        "plan_codes",
        FieldOverride {
            decode: decode_plan_codes,
            encode: encode_plan_codes,
        },
    )]);

/// A particular application of a coupon to a customer account.
pub static REDEMPTION: ResourceSchema = ResourceSchema::new("redemption")
    .attributes(&[
        "account_code",
        "single_use",
        "total_discounted_in_cents",
        "currency",
        "created_at",
    ])
    .linked_attributes(&["account", "coupon"]);

/// A charge or credit applied (or to be applied) to an account's invoice.
pub static ADJUSTMENT: ResourceSchema = ResourceSchema::new("adjustment")
    .attributes(&[
        "uuid",
        "description",
        "accounting_code",
        "quantity",
        "unit_amount_in_cents",
        "discount_in_cents",
        "tax_in_cents",
        "total_in_cents",
        "currency",
        "taxable",
        "start_date",
        "end_date",
        "created_at",
        "type",
    ])
    .xml_attribute_attributes(&["type"])
    .linked_attributes(&["account"]);

/// A payable charge to an account for the customer's charges and
/// subscriptions.
pub static INVOICE: ResourceSchema = ResourceSchema::new("invoice")
    .member_path("invoices/{id}")
    .collection_path("invoices")
    .attributes(&[
        "uuid",
        "state",
        "invoice_number",
        "po_number",
        "vat_number",
        "subtotal_in_cents",
        "tax_in_cents",
        "total_in_cents",
        "currency",
        "created_at",
        "line_items",
        "transactions",
    ])
    .linked_attributes(&["account"]);

/// A customer account's subscription to your service.
pub static SUBSCRIPTION: ResourceSchema = ResourceSchema::new("subscription")
    .member_path("subscriptions/{id}")
    .collection_path("subscriptions")
    .attributes(&[
        "uuid",
        "state",
        "plan_code",
        "coupon_code",
        "quantity",
        "activated_at",
        "canceled_at",
        "starts_at",
        "expires_at",
        "current_period_started_at",
        "current_period_ends_at",
        "trial_started_at",
        "trial_ends_at",
        "unit_amount_in_cents",
        "total_billing_cycles",
        "first_renewal_date",
        "timeframe",
        "currency",
        "pending_subscription",
        "subscription_add_ons",
        "account",
    ])
    .sensitive_attributes(&["number", "verification_value"])
    .linked_attributes(&["account"])
    .js_attributes(&[
        "plan_code",
        "coupon_code",
        "quantity",
        "starts_at",
        "trial_ends_at",
        "unit_amount_in_cents",
        "total_billing_cycles",
        "first_renewal_date",
    ])
    .attribute_paths(&[("plan_code", "plan/plan_code")]);

/// An immediate one-time charge made to a customer's account.
pub static TRANSACTION: ResourceSchema = ResourceSchema::new("transaction")
    .member_path("transactions/{id}")
    .collection_path("transactions")
    .attributes(&[
        "uuid",
        "action",
        "currency",
        "amount_in_cents",
        "tax_in_cents",
        "status",
        "source",
        "reference",
        "test",
        "voidable",
        "description",
        "refundable",
        "cvv_result",
        "avs_result",
        "avs_result_street",
        "avs_result_postal",
        "created_at",
        "details",
        "transaction_error",
        "type",
        "account",
    ])
    .xml_attribute_attributes(&["type"])
    .sensitive_attributes(&["number", "verification_value"])
    .linked_attributes(&["account", "invoice", "subscription"])
    .js_attributes(&["currency", "amount_in_cents"]);

/// Account and billing information as recorded at the time a transaction
/// was submitted. Does not inherit a currency context.
pub static TRANSACTION_DETAILS: ResourceSchema = ResourceSchema::new("details")
    .no_currency_inheritance()
    .attributes(&["account", "transaction_error"]);

/// The parsed gateway error for a declined transaction. Does not inherit a
/// currency context.
pub static TRANSACTION_ERROR: ResourceSchema = ResourceSchema::new("transaction_error")
    .no_currency_inheritance()
    .attributes(&[
        "error_code",
        "error_category",
        "merchant_message",
        "customer_message",
    ]);

/// A service level to which a customer account can subscribe.
pub static PLAN: ResourceSchema = ResourceSchema::new("plan")
    .member_path("plans/{id}")
    .collection_path("plans")
    .attributes(&[
        "plan_code",
        "name",
        "description",
        "success_url",
        "cancel_url",
        "display_donation_amounts",
        "display_quantity",
        "display_phone_number",
        "bypass_hosted_confirmation",
        "unit_name",
        "payment_page_tos_link",
        "plan_interval_length",
        "plan_interval_unit",
        "trial_interval_length",
        "trial_interval_unit",
        "accounting_code",
        "created_at",
        "unit_amount_in_cents",
        "setup_fee_in_cents",
    ])
    .linked_attributes(&["add_ons"])
    .js_attributes(&[
        "plan_code",
        "name",
        "description",
        "accounting_code",
        "unit_amount_in_cents",
        "setup_fee_in_cents",
    ]);

/// An additional benefit subscribers to a particular plan can also
/// subscribe to.
pub static ADD_ON: ResourceSchema = ResourceSchema::new("add_on")
    .attributes(&[
        "add_on_code",
        "name",
        "display_quantity_on_hosted_page",
        "display_quantity",
        "default_quantity",
        "accounting_code",
        "unit_amount_in_cents",
        "created_at",
    ])
    .linked_attributes(&["plan"]);

/// A plan add-on as added to a customer's subscription. Inherits the
/// subscription's currency context.
pub static SUBSCRIPTION_ADD_ON: ResourceSchema = ResourceSchema::new("subscription_add_on")
    .attributes(&["add_on_code", "quantity", "unit_amount_in_cents"]);

/// Returns every built-in schema, in registration order.
#[must_use]
pub fn default_schemas() -> &'static [&'static ResourceSchema] {
    static SCHEMAS: &[&ResourceSchema] = &[
        &ACCOUNT,
        &BILLING_INFO,
        &COUPON,
        &REDEMPTION,
        &ADJUSTMENT,
        &INVOICE,
        &SUBSCRIPTION,
        &TRANSACTION,
        &TRANSACTION_DETAILS,
        &TRANSACTION_ERROR,
        &PLAN,
        &ADD_ON,
        &SUBSCRIPTION_ADD_ON,
    ];
    SCHEMAS
}

// The coupon's plan code list arrives as sibling scalar elements; the
// generic codec cannot pin the item tag on encode, so the field carries its
// own codec.
fn decode_plan_codes(elem: &Element) -> Result<Value, DecodeError> {
    let items = elem
        .children()
        .iter()
        .map(|child| Value::Text(child.text().unwrap_or_default().to_string()))
        .collect();
    Ok(Value::List(items))
}

fn encode_plan_codes(name: &str, value: &Value) -> Element {
    let mut elem = Element::new(name);
    elem.set_attr("type", "array");
    if let Value::List(items) = value {
        for item in items {
            if let Some(code) = item.as_str() {
                elem.push(Element::with_text("plan_code", code));
            }
        }
    }
    elem
}

/// Builds the member URL for a resource, preferring its canonical URL and
/// falling back to the member template keyed by `id_attribute`.
fn member_url_for(resource: &Resource, id_attribute: &str) -> Result<String, ResourceError> {
    if let Some(url) = resource.url() {
        return Ok(url.to_string());
    }
    let id = resource.attribute_get(id_attribute)?;
    let id = id
        .as_str()
        .ok_or_else(|| ResourceError::UnsupportedAttribute {
            attribute: id_attribute.to_string(),
        })?;
    resource
        .schema()
        .member_url(id)
        .ok_or(ResourceError::MissingUrl)
}

/// Account member operations.
pub mod account {
    use super::{member_url_for, registry, Element, HttpClient, HttpError, HttpMethod, HttpRequest, Resource, ResourceError};

    /// Reopens a closed account, refreshing the instance in place.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Request`] for a non-2xx response.
    pub async fn reopen(client: &HttpClient, account: &mut Resource) -> Result<(), ResourceError> {
        let url = format!("{}/reopen", member_url_for(account, "account_code")?);
        let response = client.put(&url, None).await?;
        if !response.is_ok() {
            return Err(ResourceError::from_response(&response, &url));
        }
        account.update_from_element(Element::parse(&response.text())?);
        Ok(())
    }

    /// Charges (or credits) the account with the given adjustment.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Request`] for a non-2xx response.
    pub async fn charge(
        client: &HttpClient,
        account: &Resource,
        adjustment: &mut Resource,
    ) -> Result<(), ResourceError> {
        let url = format!("{}/adjustments", member_url_for(account, "account_code")?);
        adjustment.post(client, &url).await
    }

    /// Creates an invoice for any outstanding adjustments the account has.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Request`] for a non-2xx response.
    pub async fn create_invoice(
        client: &HttpClient,
        account: &Resource,
    ) -> Result<Resource, ResourceError> {
        let url = format!("{}/invoices", member_url_for(account, "account_code")?);
        let request = HttpRequest::builder(HttpMethod::Post, &url)
            .build()
            .map_err(HttpError::from)?;
        let response = client.request(request).await?;
        if !response.is_ok() {
            return Err(ResourceError::from_response(&response, &url));
        }

        let elem = Element::parse(&response.text())?;
        let mut invoice = registry::global().hydrate(elem);
        invoice.set_default_currency(client.config().default_currency().clone());
        if let Some(location) = response.location() {
            invoice.set_url(location);
        }
        Ok(invoice)
    }

    /// Creates the given subscription for this existing account.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Request`] for a non-2xx response.
    pub async fn subscribe(
        client: &HttpClient,
        account: &Resource,
        subscription: &mut Resource,
    ) -> Result<(), ResourceError> {
        let url = format!("{}/subscriptions", member_url_for(account, "account_code")?);
        subscription.post(client, &url).await
    }

    /// Replaces the account's billing information.
    ///
    /// On a 201 the new billing info's `Location` becomes its canonical
    /// URL; either way the response is folded back into `billing_info`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Request`] for a non-2xx response.
    pub async fn update_billing_info(
        client: &HttpClient,
        account: &Resource,
        billing_info: &mut Resource,
    ) -> Result<(), ResourceError> {
        let url = format!("{}/billing_info", member_url_for(account, "account_code")?);
        let body = billing_info.to_element(false).to_xml_document()?;
        let response = client.put(&url, Some(body)).await?;
        if !response.is_ok() {
            return Err(ResourceError::from_response(&response, &url));
        }

        if response.code == 201 {
            if let Some(location) = response.location() {
                billing_info.set_url(location);
            }
        }
        billing_info.update_from_element(Element::parse(&response.text())?);
        Ok(())
    }
}

/// Transaction member operations.
pub mod transaction {
    use crate::resource::{ActionOutcome, Resource, ResourceError};
    use crate::clients::HttpClient;

    /// Refunds the transaction through its advertised `refund` action.
    ///
    /// The server defers the refund: a 202-Accepted outcome carries a
    /// follow-up URL for the new transaction representing the refund, which
    /// [`refund_transaction`] retrieves.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnsupportedAction`] if the transaction's
    /// current state advertises no refund action (e.g. it was already
    /// refunded), or [`ResourceError::Request`] for a non-2xx response.
    pub async fn refund(
        client: &HttpClient,
        transaction: &Resource,
    ) -> Result<ActionOutcome, ResourceError> {
        let action = transaction.action("refund")?;
        action.invoke(client, None).await
    }

    /// Retrieves the refund transaction from a refund outcome's follow-up
    /// URL.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] or [`ResourceError::Request`]
    /// per the fetch rules.
    pub async fn refund_transaction(
        client: &HttpClient,
        follow_up_url: &str,
    ) -> Result<Resource, ResourceError> {
        Resource::fetch(client, follow_up_url).await
    }
}

/// Invoice member operations.
pub mod invoice {
    use super::{member_url_for, HttpClient, HttpError, HttpMethod, HttpRequest, Resource, ResourceError};

    /// Downloads the invoice as a PDF document.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::ProtocolMismatch`] if the server responds
    /// with anything but a PDF body, and [`ResourceError::Request`] for a
    /// non-2xx response.
    pub async fn as_pdf(client: &HttpClient, invoice: &Resource) -> Result<Vec<u8>, ResourceError> {
        let url = member_url_for(invoice, "invoice_number")?;
        let request = HttpRequest::builder(HttpMethod::Get, &url)
            .header("Accept", "application/pdf")
            .build()
            .map_err(HttpError::from)?;
        let response = client.request(request).await?;
        if !response.is_ok() {
            return Err(ResourceError::from_response(&response, &url));
        }

        let content_type = response.content_type().unwrap_or_default();
        if !content_type.starts_with("application/pdf") {
            return Err(ResourceError::ProtocolMismatch {
                expected: "application/pdf",
                actual: content_type.to_string(),
            });
        }
        Ok(response.body)
    }
}

/// Subscription member operations.
pub mod subscription {
    use crate::clients::HttpClient;
    use crate::resource::{Resource, ResourceError};

    /// Updates the subscription, defaulting the change timeframe to `now`.
    ///
    /// The API requires a timeframe on every subscription change; callers
    /// that want the change at renewal set `timeframe` to `renewal` first.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::MissingUrl`] if the subscription has no
    /// canonical URL, or [`ResourceError::Request`] for a non-2xx response.
    pub async fn update(
        client: &HttpClient,
        subscription: &mut Resource,
    ) -> Result<(), ResourceError> {
        if subscription.local_value("timeframe").is_none() {
            subscription.attribute_set("timeframe", "now");
        }
        subscription.save(client).await
    }
}

/// Plan member operations.
pub mod plan {
    use super::{member_url_for, HttpClient, Resource, ResourceError};

    /// Returns the plan's add-on with the given add-on code.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::NotFound`] or [`ResourceError::Request`]
    /// per the fetch rules.
    pub async fn add_on(
        client: &HttpClient,
        plan: &Resource,
        add_on_code: &str,
    ) -> Result<Resource, ResourceError> {
        let url = format!(
            "{}/add_ons/{}",
            member_url_for(plan, "plan_code")?,
            urlencoding::encode(add_on_code)
        );
        Resource::fetch(client, &url).await
    }

    /// Makes the given add-on available to subscribers on this plan.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Request`] for a non-2xx response.
    pub async fn create_add_on(
        client: &HttpClient,
        plan: &Resource,
        add_on: &mut Resource,
    ) -> Result<(), ResourceError> {
        let url = format!("{}/add_ons", member_url_for(plan, "plan_code")?);
        add_on.post(client, &url).await
    }
}
