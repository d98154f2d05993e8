//! SOAP 1.1 envelope model and message context.
//!
//! The envelope is a thin structural view over the element tree: a list of
//! header elements and a list of body elements. Fault extraction gives the
//! client enough to classify an STS rejection without schema validation.

use std::collections::HashMap;

use crate::constants::{self, QName, SOAP_11_NS};
use crate::error::{WstError, WstResult};
use crate::token::XmlElement;

/// A SOAP 1.1 envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoapEnvelope {
    /// Header elements in document order. Empty when no Header is present.
    pub header: Vec<XmlElement>,
    /// Body elements in document order.
    pub body: Vec<XmlElement>,
}

impl SoapEnvelope {
    /// Creates an empty envelope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a body element.
    #[must_use]
    pub fn with_body_element(mut self, element: XmlElement) -> Self {
        self.body.push(element);
        self
    }

    /// Appends a header element.
    #[must_use]
    pub fn with_header_element(mut self, element: XmlElement) -> Self {
        self.header.push(element);
        self
    }

    /// Returns the first header element with the given qualified name.
    #[must_use]
    pub fn header_element(&self, name: &QName) -> Option<&XmlElement> {
        self.header.iter().find(|e| &e.name == name)
    }

    /// Returns the first body element, if any.
    #[must_use]
    pub fn body_first(&self) -> Option<&XmlElement> {
        self.body.first()
    }

    /// Converts the envelope into its element representation.
    #[must_use]
    pub fn to_element(&self) -> XmlElement {
        let mut envelope = XmlElement::new(QName::new(SOAP_11_NS, "Envelope"));
        if !self.header.is_empty() {
            let mut header = XmlElement::new(QName::new(SOAP_11_NS, "Header"));
            header.children = self.header.clone();
            envelope.push_child(header);
        }
        let mut body = XmlElement::new(QName::new(SOAP_11_NS, "Body"));
        body.children = self.body.clone();
        envelope.push_child(body);
        envelope
    }

    /// Parses an envelope from its element representation.
    ///
    /// ## Errors
    ///
    /// Fails with [`WstError::Codec`] if the element is not a SOAP 1.1
    /// Envelope or has no Body.
    pub fn from_element(element: &XmlElement) -> WstResult<Self> {
        let expected = QName::new(SOAP_11_NS, "Envelope");
        if element.name != expected {
            return Err(WstError::codec(format!(
                "expected {expected}, found {}",
                element.name
            )));
        }
        let header = element
            .child(&QName::new(SOAP_11_NS, "Header"))
            .map(|h| h.children.clone())
            .unwrap_or_default();
        let body = element
            .child(&QName::new(SOAP_11_NS, "Body"))
            .map(|b| b.children.clone())
            .ok_or_else(|| WstError::codec("SOAP envelope has no Body"))?;
        Ok(Self { header, body })
    }

    /// Extracts a SOAP Fault from the body, if present.
    #[must_use]
    pub fn fault(&self) -> Option<SoapFault> {
        let fault = self
            .body
            .iter()
            .find(|e| e.name == QName::new(SOAP_11_NS, "Fault"))?;
        let code = fault
            .find_by_local_name("faultcode")
            .and_then(|c| c.text.clone())
            .unwrap_or_default();
        let reason = fault
            .find_by_local_name("faultstring")
            .and_then(|s| s.text.clone())
            .unwrap_or_default();
        Some(SoapFault { code, reason })
    }
}

/// A SOAP 1.1 Fault as received on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoapFault {
    /// Raw faultcode text, prefix included (e.g. `wsse:FailedAuthentication`).
    pub code: String,
    /// Fault reason text.
    pub reason: String,
}

impl SoapFault {
    /// Resolves the faultcode into a qualified name.
    ///
    /// Known WS-Security fault locals resolve into the wsse namespace; any
    /// other code keeps its local part unqualified, since the envelope model
    /// does not retain prefix bindings for text content.
    #[must_use]
    pub fn subcode(&self) -> QName {
        let local = self.code.rsplit(':').next().unwrap_or(&self.code);
        match local {
            "SecurityTokenUnavailable" => constants::security_token_unavailable(),
            "FailedAuthentication" => constants::failed_authentication(),
            "InvalidSecurity" => constants::invalid_security(),
            other => QName::unqualified(other),
        }
    }
}

/// Direction of a message flowing through the interceptor chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageDirection {
    /// A request arriving at the server.
    Inbound,
    /// A response leaving the server.
    Outbound,
}

/// Context property key carrying a per-message STS username override.
pub const USERNAME_PROPERTY: &str = "wst.handler.username";

/// Context property key carrying a per-message STS password override.
pub const PASSWORD_PROPERTY: &str = "wst.handler.password";

/// The interceptor's view of one message: direction, envelope, and a string
/// property map populated by earlier handlers in the chain.
#[derive(Debug, Clone)]
pub struct MessageContext {
    direction: MessageDirection,
    envelope: SoapEnvelope,
    properties: HashMap<String, String>,
}

impl MessageContext {
    /// Creates an inbound message context.
    #[must_use]
    pub fn inbound(envelope: SoapEnvelope) -> Self {
        Self {
            direction: MessageDirection::Inbound,
            envelope,
            properties: HashMap::new(),
        }
    }

    /// Creates an outbound message context.
    #[must_use]
    pub fn outbound(envelope: SoapEnvelope) -> Self {
        Self {
            direction: MessageDirection::Outbound,
            envelope,
            properties: HashMap::new(),
        }
    }

    /// Returns true for outbound messages.
    #[must_use]
    pub fn is_outbound(&self) -> bool {
        self.direction == MessageDirection::Outbound
    }

    /// The message envelope.
    #[must_use]
    pub fn envelope(&self) -> &SoapEnvelope {
        &self.envelope
    }

    /// Returns a context property.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Sets a context property.
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }
}
