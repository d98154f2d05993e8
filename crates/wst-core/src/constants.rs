//! WS-Trust, WS-Security, and SAML namespace constants.

use std::fmt;

use serde::{Deserialize, Serialize};

/// WS-Trust 1.3 base namespace.
pub const WST_NS: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512";

/// WS-Trust Issue request type URI.
pub const ISSUE_REQUEST: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/Issue";

/// WS-Trust batch Issue request type URI.
pub const BATCH_ISSUE_REQUEST: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/BatchIssue";

/// WS-Trust Renew request type URI.
pub const RENEW_REQUEST: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/Renew";

/// WS-Trust Validate request type URI.
pub const VALIDATE_REQUEST: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/Validate";

/// WS-Trust batch Validate request type URI.
pub const BATCH_VALIDATE_REQUEST: &str =
    "http://docs.oasis-open.org/ws-sx/ws-trust/200512/BatchValidate";

/// WS-Trust Cancel request type URI.
pub const CANCEL_REQUEST: &str = "http://docs.oasis-open.org/ws-sx/ws-trust/200512/Cancel";

/// Token type URI requesting an RSTR that carries only a Status element.
pub const STATUS_TOKEN_TYPE: &str =
    "http://docs.oasis-open.org/ws-sx/ws-trust/200512/RSTR/Status";

/// Status code returned for a valid token.
pub const STATUS_CODE_VALID: &str =
    "http://docs.oasis-open.org/ws-sx/ws-trust/200512/status/valid";

/// Status code returned for an invalid token.
pub const STATUS_CODE_INVALID: &str =
    "http://docs.oasis-open.org/ws-sx/ws-trust/200512/status/invalid";

/// WS-Security extension namespace (wsse).
pub const WSSE_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd";

/// WS-Security utility namespace (wsu).
pub const WSU_NS: &str =
    "http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd";

/// SAML 2.0 assertion namespace.
pub const SAML2_ASSERTION_NS: &str = "urn:oasis:names:tc:SAML:2.0:assertion";

/// SAML 2.0 token type URI.
pub const SAML2_TOKEN_TYPE: &str =
    "http://docs.oasis-open.org/wss/oasis-wss-saml-token-profile-1.1#SAMLV2.0";

/// WS-Addressing namespace.
pub const WSA_NS: &str = "http://www.w3.org/2005/08/addressing";

/// WS-Policy namespace (AppliesTo).
pub const WSP_NS: &str = "http://schemas.xmlsoap.org/ws/2004/09/policy";

/// SOAP 1.1 envelope namespace.
pub const SOAP_11_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// A qualified XML name: namespace URI plus local part.
///
/// Equality is structural, so qualified names can key maps and drive
/// header/token matching in the security handler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QName {
    /// Namespace URI. Empty for unqualified names.
    pub namespace: String,
    /// Local part of the name.
    pub local: String,
}

impl QName {
    /// Creates a qualified name.
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local: local.into(),
        }
    }

    /// Creates an unqualified name (empty namespace).
    pub fn unqualified(local: impl Into<String>) -> Self {
        Self {
            namespace: String::new(),
            local: local.into(),
        }
    }

    /// Returns true if this name has no namespace.
    #[must_use]
    pub fn is_unqualified(&self) -> bool {
        self.namespace.is_empty()
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.local)
        } else {
            write!(f, "{{{}}}{}", self.namespace, self.local)
        }
    }
}

/// Fault subcode raised when no security token is present in a message.
#[must_use]
pub fn security_token_unavailable() -> QName {
    QName::new(WSSE_NS, "SecurityTokenUnavailable")
}

/// Fault subcode raised when a security token fails authentication.
#[must_use]
pub fn failed_authentication() -> QName {
    QName::new(WSSE_NS, "FailedAuthentication")
}

/// Fault subcode raised when an error occurs while processing security headers.
#[must_use]
pub fn invalid_security() -> QName {
    QName::new(WSSE_NS, "InvalidSecurity")
}
