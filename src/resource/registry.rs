//! The tag-name registry for polymorphic decoding.
//!
//! A [`TypeRegistry`] maps XML tag names to entity schemas so that an
//! arbitrary element can be decoded without the caller knowing its type in
//! advance (link resolution, collection pages, push notifications).
//!
//! The process-wide registry is populated exactly once, either implicitly
//! with the built-in schema set on first use of [`global`] or explicitly
//! via [`install`] during application startup, and is read-only
//! thereafter, so concurrent reads need no synchronization. Tests build
//! fresh `TypeRegistry` instances instead of relying on the shared global.

use std::collections::HashMap;
use std::sync::OnceLock;

use thiserror::Error;

use crate::resource::instance::Resource;
use crate::resource::schema::{ResourceSchema, GENERIC};
use crate::xml::Element;

/// Errors raised while populating a registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Two schemas declare the same tag name. A configuration error,
    /// detected at startup.
    #[error("A schema is already registered for tag '{tag}'")]
    DuplicateTag {
        /// The contested tag name.
        tag: &'static str,
    },

    /// The process-wide registry was already installed.
    #[error("The global type registry has already been installed")]
    AlreadyInstalled,
}

/// A mapping from XML tag name to entity schema.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    by_tag: HashMap<&'static str, &'static ResourceSchema>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry populated with the built-in entity schemas.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateTag`] if two built-in schemas share
    /// a tag name.
    pub fn with_default_schemas() -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for schema in crate::resources::default_schemas().iter().copied() {
            registry.register(schema)?;
        }
        Ok(registry)
    }

    /// Registers a schema under its tag name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateTag`] if a schema is already
    /// registered for the tag.
    pub fn register(&mut self, schema: &'static ResourceSchema) -> Result<(), RegistryError> {
        if self.by_tag.contains_key(schema.nodename) {
            return Err(RegistryError::DuplicateTag {
                tag: schema.nodename,
            });
        }
        self.by_tag.insert(schema.nodename, schema);
        Ok(())
    }

    /// Returns `true` if a schema is registered for the tag.
    #[must_use]
    pub fn is_registered(&self, tag: &str) -> bool {
        self.by_tag.contains_key(tag)
    }

    /// Resolves a tag name to its schema.
    ///
    /// Never fails: unrecognized tags resolve to the generic fallback
    /// schema, keeping decoding forward compatible with resource kinds the
    /// server adds later.
    #[must_use]
    pub fn resolve(&self, tag: &str) -> &'static ResourceSchema {
        self.by_tag.get(tag).copied().unwrap_or(&GENERIC)
    }

    /// Wraps an element in a resource of the type its tag resolves to.
    ///
    /// No field is decoded eagerly; the element is retained and consulted
    /// on attribute access.
    #[must_use]
    pub fn hydrate(&self, elem: Element) -> Resource {
        let schema = self.resolve(elem.tag());
        Resource::from_element(schema, elem)
    }

    /// Returns the number of registered schemas.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_tag.len()
    }

    /// Returns `true` if no schemas are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_tag.is_empty()
    }
}

static GLOBAL: OnceLock<TypeRegistry> = OnceLock::new();

/// Installs a custom registry as the process-wide registry.
///
/// Call during application startup, before any decoding occurs. After the
/// first use of [`global`] the built-in registry is in place and
/// installation fails.
///
/// # Errors
///
/// Returns [`RegistryError::AlreadyInstalled`] if a registry is already
/// installed.
pub fn install(registry: TypeRegistry) -> Result<(), RegistryError> {
    GLOBAL
        .set(registry)
        .map_err(|_| RegistryError::AlreadyInstalled)
}

/// Returns the process-wide registry, installing the built-in schema set on
/// first use.
///
/// # Panics
///
/// Panics if two built-in schemas declare the same tag name. That is a
/// configuration error and is detected the first time the registry is
/// touched.
#[must_use]
pub fn global() -> &'static TypeRegistry {
    GLOBAL.get_or_init(|| {
        TypeRegistry::with_default_schemas().expect("built-in schemas must have unique tags")
    })
}

// Verify TypeRegistry is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<TypeRegistry>();
};

#[cfg(test)]
mod tests {
    use super::*;

    static WIDGET: ResourceSchema =
        ResourceSchema::new("widget").attributes(&["widget_code", "name"]);
    static WIDGET_CLONE: ResourceSchema = ResourceSchema::new("widget");

    #[test]
    fn test_register_and_resolve() {
        let mut registry = TypeRegistry::new();
        registry.register(&WIDGET).unwrap();

        assert!(registry.is_registered("widget"));
        assert_eq!(registry.resolve("widget").nodename, "widget");
    }

    #[test]
    fn test_duplicate_tag_is_a_configuration_error() {
        let mut registry = TypeRegistry::new();
        registry.register(&WIDGET).unwrap();

        assert_eq!(
            registry.register(&WIDGET_CLONE),
            Err(RegistryError::DuplicateTag { tag: "widget" })
        );
    }

    #[test]
    fn test_unregistered_tag_resolves_to_generic_fallback() {
        let registry = TypeRegistry::new();
        let schema = registry.resolve("gift_card");

        assert_eq!(schema.nodename, "resource");
        assert!(schema.attributes.is_empty());
    }

    #[test]
    fn test_generic_fallback_is_usable_for_decoding() {
        let registry = TypeRegistry::new();
        let elem = Element::parse("<gift_card><code>XYZ</code></gift_card>").unwrap();
        let resource = registry.hydrate(elem);

        assert_eq!(
            resource.attribute_get("code").unwrap().as_str(),
            Some("XYZ")
        );
    }

    #[test]
    fn test_hydrate_selects_registered_schema() {
        let mut registry = TypeRegistry::new();
        registry.register(&WIDGET).unwrap();

        let elem = Element::parse("<widget><widget_code>w1</widget_code></widget>").unwrap();
        let resource = registry.hydrate(elem);
        assert_eq!(resource.schema().nodename, "widget");
    }

    #[test]
    fn test_with_default_schemas_registers_builtin_taxonomy() {
        let registry = TypeRegistry::with_default_schemas().unwrap();

        for tag in ["account", "invoice", "subscription", "transaction", "plan"] {
            assert!(registry.is_registered(tag), "expected '{tag}' registered");
        }
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_global_registry_is_shared_and_populated() {
        let registry = global();
        assert!(registry.is_registered("account"));

        // Same instance on every call.
        assert!(std::ptr::eq(registry, global()));
    }
}
