//! Explicit registry of token variants.
//!
//! Variants are registered under string keys at startup and looked up by
//! deployment configuration. Nothing is discovered dynamically: a key that
//! was never registered simply resolves to `None`.

use std::sync::Arc;

use dashmap::DashMap;

use crate::saml2::Saml2Variant;
use crate::variant::SecurityTokenVariant;

type VariantFactory = Arc<dyn Fn() -> Arc<dyn SecurityTokenVariant> + Send + Sync>;

/// Registry key of the built-in SAML 2.0 variant.
pub const SAML2_VARIANT: &str = "saml2";

/// String-keyed map from variant names to variant constructors.
pub struct VariantRegistry {
    factories: DashMap<String, VariantFactory>,
}

impl VariantRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            factories: DashMap::new(),
        }
    }

    /// Registers a variant constructor under the given key, replacing any
    /// previous registration.
    pub fn register<F, V>(&self, key: impl Into<String>, factory: F)
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: SecurityTokenVariant + 'static,
    {
        self.factories.insert(
            key.into(),
            Arc::new(move || Arc::new(factory()) as Arc<dyn SecurityTokenVariant>),
        );
    }

    /// Constructs the variant registered under the given key.
    #[must_use]
    pub fn resolve(&self, key: &str) -> Option<Arc<dyn SecurityTokenVariant>> {
        self.factories.get(key).map(|factory| factory())
    }

    /// Returns true iff a variant is registered under the given key.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }

    /// Registered variant keys, in no particular order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.factories
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }
}

impl Default for VariantRegistry {
    /// A registry with the built-in `saml2` variant pre-registered.
    fn default() -> Self {
        let registry = Self::empty();
        registry.register(SAML2_VARIANT, Saml2Variant::new);
        registry
    }
}
