//! # Recurly API Rust Client
//!
//! A Rust client for the Recurly subscription billing XML API, built around
//! a generic resource-marshaling engine: entities are decoded lazily from
//! retained XML elements, related resources and actions are discovered
//! through hypermedia links, and collections are traversed page by page.
//!
//! ## Overview
//!
//! This client provides:
//! - Type-safe configuration via [`RecurlyConfig`] and [`RecurlyConfigBuilder`]
//! - Validated newtypes for the API key and currency codes
//! - An async HTTP transport over the XML wire format
//! - Schema-driven entity marshaling with field classification
//!   (plain / sensitive / linked / XML-attribute) via [`resource`]
//! - A tag-name registry for polymorphic decoding with a generic fallback
//! - Lazy hypermedia link resolution and data-dependent action discovery
//! - Paginated collection traversal via [`Pager`]
//! - The built-in entity taxonomy (accounts, invoices, subscriptions,
//!   transactions, plans, coupons, ...) via [`resources`]
//! - Push notification decoding via [`webhooks`]
//! - Payment form signature generation via [`js`]
//!
//! ## Quick Start
//!
//! ```rust
//! use recurly_api::{ApiKey, CurrencyCode, RecurlyConfig};
//!
//! let config = RecurlyConfig::builder()
//!     .api_key(ApiKey::new("your-private-api-key").unwrap())
//!     .default_currency(CurrencyCode::new("USD").unwrap())
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## Fetching and Reading Entities
//!
//! Entities decode on access: hydrating an instance from a response is
//! free, and each field is decoded from the retained element when read.
//!
//! ```rust,ignore
//! use recurly_api::{HttpClient, RecurlyConfig};
//! use recurly_api::resources::ACCOUNT;
//!
//! let client = HttpClient::new(config);
//!
//! let mut account = ACCOUNT.find(&client, "acme").await?;
//! let state = account.attribute_get("state")?;
//!
//! // Linked attributes resolve over the network on first access and are
//! // cached afterwards.
//! let billing_info = account.attribute_fetch(&client, "billing_info").await?;
//! ```
//!
//! ## Creating and Updating
//!
//! ```rust,ignore
//! use recurly_api::resource::Resource;
//! use recurly_api::resources::ACCOUNT;
//!
//! let mut account = Resource::new(&ACCOUNT);
//! account.attribute_set("account_code", "acme");
//! account.attribute_set("email", "ops@acme.test");
//! account.create(&client).await?;        // POST; Location becomes the canonical URL
//!
//! account.attribute_set("company_name", "ACME Ltd");
//! account.save(&client).await?;          // PUT to the canonical URL
//! ```
//!
//! ## Collections
//!
//! ```rust,ignore
//! let mut pager = ACCOUNT.all_with_state("past_due").unwrap();
//! while let Some(account) = pager.next(&client).await? {
//!     println!("{:?}", account.attribute_get("account_code")?);
//! }
//! ```
//!
//! ## Actions
//!
//! Operations the server advertises per instance (refund, void, ...) are
//! discovered from the retained element, so availability follows the
//! entity's state:
//!
//! ```rust,ignore
//! use recurly_api::resources::transaction;
//!
//! if transaction_resource.has_action("refund") {
//!     let outcome = transaction::refund(&client, &transaction_resource).await?;
//!     if let Some(url) = outcome.follow_up_url {
//!         let refund = transaction::refund_transaction(&client, &url).await?;
//!     }
//! }
//! ```
//!
//! ## Design Principles
//!
//! - **Lazy everywhere**: nothing is decoded or fetched before it is asked for
//! - **Fail-fast validation**: configuration newtypes validate on construction
//! - **No silent failures**: every non-2xx response surfaces as a typed error
//!   carrying the server's structured error document
//! - **Forward compatible**: unknown entity tags decode through a generic
//!   fallback type instead of failing
//! - **No internal concurrency**: every network operation is a single
//!   call-and-decode step; retries and timeouts belong to the caller

pub mod clients;
pub mod config;
pub mod error;
pub mod js;
pub mod resource;
pub mod resources;
pub mod webhooks;
pub mod xml;

// Re-export public types at crate root for convenience
pub use config::{ApiKey, CurrencyCode, RecurlyConfig, RecurlyConfigBuilder, DEFAULT_BASE_URL};
pub use error::ConfigError;

// Re-export HTTP client types
pub use clients::{
    DataType, HttpClient, HttpError, HttpMethod, HttpRequest, HttpRequestBuilder, HttpResponse,
    InvalidHttpRequestError, PageLinks,
};

// Re-export the marshaling core
pub use resource::{
    Action, ActionOutcome, ErrorDocument, FieldError, ListParams, Money, Pager, Resource,
    ResourceError, ResourceSchema, TypeRegistry, Value,
};
