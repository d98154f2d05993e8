//! SAML 2.0 token variant.

use wst_core::constants::{QName, SAML2_ASSERTION_NS, WSSE_NS};

use crate::variant::SecurityTokenVariant;

/// SAML 2.0 assertions carried in a `wsse:Security` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct Saml2Variant;

impl Saml2Variant {
    /// Creates the SAML 2.0 variant.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SecurityTokenVariant for Saml2Variant {
    fn security_header_qname(&self) -> QName {
        QName::new(WSSE_NS, "Security")
    }

    fn token_qname(&self) -> QName {
        QName::new(SAML2_ASSERTION_NS, "Assertion")
    }
}
