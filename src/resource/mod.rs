//! The generic resource-marshaling engine.
//!
//! This module is the core of the crate: the machinery that maps between
//! the API's XML hypermedia documents and in-process entity instances
//! without a fixed, compile-time schema.
//!
//! - **[`ResourceSchema`]**: per-type static classification of fields into
//!   plain, sensitive, linked, and XML-attribute categories, plus
//!   addressing templates and codec overrides
//! - **[`TypeRegistry`] / [`registry`]**: tag-name dispatch for decoding an
//!   arbitrary element into the right entity type, with a generic fallback
//!   for unrecognized tags
//! - **[`Resource`]**: the lazily populated entity instance: retained
//!   source element, shadowing local assignments, decode-on-access,
//!   serialization, and the create/update/fetch operations
//! - **[`Value`] / [`Money`]**: the typed values the codec produces and
//!   consumes, including currency-context-aware monetary values
//! - **[`Action`]**: hypermedia-advertised operations, discovered per
//!   instance and bound to the URL and method the server supplied
//! - **[`Pager`]**: lazy traversal of paginated collections
//! - **[`ResourceError`]**: the semantic error taxonomy, carrying the
//!   server's structured [`ErrorDocument`] on request failures
//!
//! # Example
//!
//! ```rust,ignore
//! use recurly_api::resource::{registry, Pager, Resource};
//!
//! // Fetch one entity and read fields lazily.
//! let mut account = Resource::fetch(&client, "accounts/acme").await?;
//! let code = account.attribute_get("account_code")?;
//!
//! // Resolve a hypermedia link on first access; cached afterwards.
//! let billing = account.attribute_fetch(&client, "billing_info").await?;
//!
//! // Traverse a collection across pages.
//! let mut pager = Pager::new("accounts").query_param("state", "active");
//! while let Some(account) = pager.next(&client).await? {
//!     // ...
//! }
//! ```

mod errors;
mod instance;
mod links;
mod page;
pub mod registry;
mod schema;
mod value;

pub use errors::{DecodeError, ErrorDocument, FieldError, ResourceError};
pub use instance::Resource;
pub use links::{Action, ActionOutcome};
pub use page::{serialize_to_query, ListParams, Pager};
pub use registry::{RegistryError, TypeRegistry};
pub use schema::{FieldKind, FieldOverride, ResourceSchema};
pub use value::{element_for_value, value_for_element, Money, Value};
