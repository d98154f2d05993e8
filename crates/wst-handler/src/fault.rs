//! Terminal faults raised by the security handler.

use thiserror::Error;

use wst_core::constants::{self, QName};

/// The three terminal outcomes of a failed inbound validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultCode {
    /// No security token was found in the message.
    SecurityTokenUnavailable,
    /// The STS judged the token invalid.
    FailedAuthentication,
    /// Validation could not be carried out.
    InvalidSecurity,
}

impl FaultCode {
    /// The WS-Security fault subcode this outcome maps to.
    #[must_use]
    pub fn subcode(self) -> QName {
        match self {
            Self::SecurityTokenUnavailable => constants::security_token_unavailable(),
            Self::FailedAuthentication => constants::failed_authentication(),
            Self::InvalidSecurity => constants::invalid_security(),
        }
    }
}

/// A fault terminating message processing.
///
/// Each code carries its wsse subcode and an operator-readable reason. The
/// reason is for logs; the subcode is what goes on the wire.
#[derive(Debug, Clone, Error)]
#[error("{subcode}: {reason}")]
pub struct HandlerFault {
    /// Which terminal outcome occurred.
    pub code: FaultCode,
    /// The wsse fault subcode for the SOAP fault response.
    pub subcode: QName,
    /// Operator-readable reason.
    pub reason: String,
}

impl HandlerFault {
    fn new(code: FaultCode, reason: impl Into<String>) -> Self {
        Self {
            code,
            subcode: code.subcode(),
            reason: reason.into(),
        }
    }

    /// The message carries no security token.
    pub fn token_unavailable(reason: impl Into<String>) -> Self {
        Self::new(FaultCode::SecurityTokenUnavailable, reason)
    }

    /// The STS judged the token invalid.
    pub fn failed_authentication(reason: impl Into<String>) -> Self {
        Self::new(FaultCode::FailedAuthentication, reason)
    }

    /// Validation could not be carried out.
    pub fn invalid_security(reason: impl Into<String>) -> Self {
        Self::new(FaultCode::InvalidSecurity, reason)
    }
}
