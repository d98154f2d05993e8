//! The opaque security token model.
//!
//! The protocol core never interprets token contents. A token is an owned
//! XML element tree produced by the codec boundary and round-tripped through
//! RST/RSTR exchanges unchanged.

use serde::{Deserialize, Serialize};

use crate::constants::QName;

/// An owned XML element tree.
///
/// Attribute order is preserved so that `decode(encode(t)) == t` holds for
/// codec round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlElement {
    /// Qualified name of this element.
    pub name: QName,
    /// Attributes in document order. Names are local (prefixes resolved away).
    pub attributes: Vec<(String, String)>,
    /// Concatenated character data, trimmed. `None` when empty.
    pub text: Option<String>,
    /// Child elements in document order.
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Creates an empty element.
    #[must_use]
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Sets the text content.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Appends a child element.
    #[must_use]
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    /// Appends a child element in place.
    pub fn push_child(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    /// Returns the value of an attribute by local name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the first child with the given qualified name.
    #[must_use]
    pub fn child(&self, name: &QName) -> Option<&XmlElement> {
        self.children.iter().find(|c| &c.name == name)
    }

    /// Returns the first child element, if any.
    #[must_use]
    pub fn first_child(&self) -> Option<&XmlElement> {
        self.children.first()
    }

    /// Searches the subtree (depth first, self included) for the first
    /// element with the given qualified name.
    #[must_use]
    pub fn find(&self, name: &QName) -> Option<&XmlElement> {
        if &self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    /// Searches the subtree (depth first, self included) for the first
    /// element whose local name matches, ignoring namespaces.
    ///
    /// Fallback lookup for responses from implementations that omit the
    /// expected namespace on result elements.
    #[must_use]
    pub fn find_by_local_name(&self, local: &str) -> Option<&XmlElement> {
        if self.name.local == local {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_local_name(local))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{SAML2_ASSERTION_NS, WST_NS};

    fn sample() -> XmlElement {
        XmlElement::new(QName::new(WST_NS, "RequestedSecurityToken")).with_child(
            XmlElement::new(QName::new(SAML2_ASSERTION_NS, "Assertion"))
                .with_attribute("ID", "_a1")
                .with_child(
                    XmlElement::new(QName::new(SAML2_ASSERTION_NS, "Issuer"))
                        .with_text("https://idp.example.org"),
                ),
        )
    }

    #[test]
    fn child_lookup_is_namespace_aware() {
        let root = sample();
        let assertion = QName::new(SAML2_ASSERTION_NS, "Assertion");
        assert!(root.child(&assertion).is_some());
        assert!(root.child(&QName::unqualified("Assertion")).is_none());
    }

    #[test]
    fn find_descends() {
        let root = sample();
        let issuer = root.find(&QName::new(SAML2_ASSERTION_NS, "Issuer")).unwrap();
        assert_eq!(issuer.text.as_deref(), Some("https://idp.example.org"));
    }

    #[test]
    fn local_name_fallback_ignores_namespace() {
        let root = sample();
        assert!(root.find_by_local_name("Issuer").is_some());
        assert!(root.find_by_local_name("Subject").is_none());
    }

    #[test]
    fn attribute_lookup() {
        let root = sample();
        let assertion = root.first_child().unwrap();
        assert_eq!(assertion.attribute("ID"), Some("_a1"));
        assert_eq!(assertion.attribute("Version"), None);
    }
}
