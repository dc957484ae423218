//! XML element tree support.
//!
//! The wire format is XML, and entity marshaling works over retained element
//! trees rather than streaming events: a hydrated resource keeps its source
//! element and decodes fields from it on access. This module provides the
//! owned [`Element`] tree plus parsing and writing over `quick-xml` events.

mod element;

pub use element::{Element, XmlError};
