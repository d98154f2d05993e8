//! Error types for WS-Trust operations.
//!
//! Failures are classified at the source rather than inspected after the
//! fact: transports report a [`TransportErrorKind`], STS rejections carry a
//! [`ProtocolFault`], and failover logic consults
//! [`WstError::is_connection_failure`] instead of walking cause chains.

use thiserror::Error;

use crate::constants::QName;
use crate::credential::CredentialError;

/// Result type alias for WS-Trust operations.
pub type WstResult<T> = std::result::Result<T, WstError>;

/// Classification of a transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The remote endpoint refused the connection.
    ConnectionRefused,
    /// The exchange did not complete within the configured timeout.
    Timeout,
    /// Any other I/O failure (DNS, TLS, broken pipe, ...).
    Io,
}

/// A failure raised by the transport while exchanging envelopes.
#[derive(Debug, Clone, Error)]
#[error("transport error ({kind:?}): {detail}")]
pub struct TransportError {
    /// Failure classification, assigned by the transport implementation.
    pub kind: TransportErrorKind,
    /// Human-readable detail for logs.
    pub detail: String,
}

impl TransportError {
    /// Creates a connection-refused transport error.
    pub fn connection_refused(detail: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::ConnectionRefused,
            detail: detail.into(),
        }
    }

    /// Creates a timeout transport error.
    pub fn timeout(detail: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Timeout,
            detail: detail.into(),
        }
    }

    /// Creates a generic I/O transport error.
    pub fn io(detail: impl Into<String>) -> Self {
        Self {
            kind: TransportErrorKind::Io,
            detail: detail.into(),
        }
    }

    /// Returns true if retrying against a different endpoint could succeed.
    ///
    /// Connection refusals and timeouts indicate an unreachable endpoint;
    /// other I/O failures are not assumed to be endpoint-specific.
    #[must_use]
    pub const fn is_connection_failure(&self) -> bool {
        matches!(
            self.kind,
            TransportErrorKind::ConnectionRefused | TransportErrorKind::Timeout
        )
    }
}

/// A WS-Trust or SOAP fault actively returned by a reachable STS.
#[derive(Debug, Clone, Error)]
#[error("protocol fault {code}: {reason}")]
pub struct ProtocolFault {
    /// Fault code or subcode qualified name.
    pub code: QName,
    /// Fault reason text.
    pub reason: String,
}

impl ProtocolFault {
    /// Creates a protocol fault.
    pub fn new(code: QName, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }
}

/// Main error type for the WS-Trust protocol core.
#[derive(Debug, Error)]
pub enum WstError {
    /// Malformed or incomplete client configuration. Fatal, never retried.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport-level failure. Failover-eligible when the kind is a
    /// connection failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The STS rejected the request. Never failover-eligible: a rejection
    /// from a reachable STS is not grounds for trying another endpoint.
    #[error(transparent)]
    Protocol(#[from] ProtocolFault),

    /// Invalid argument or request state.
    #[error("validation error: {0}")]
    Validation(String),

    /// Failure encoding or decoding a token or envelope.
    #[error("codec error: {0}")]
    Codec(String),

    /// A credential was used after being cleared, or is otherwise unusable.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// The pool has no sub-pool registered for the requested configuration.
    #[error("no client pool registered for configuration: {0}")]
    PoolNotFound(String),

    /// The pool has no capacity and waiting was not possible.
    #[error("client pool exhausted")]
    PoolExhausted,
}

impl WstError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a codec error.
    pub fn codec(msg: impl Into<String>) -> Self {
        Self::Codec(msg.into())
    }

    /// Returns true if this failure is eligible for endpoint failover.
    ///
    /// Only transport failures whose kind marks the endpoint as unreachable
    /// qualify. Protocol faults, configuration errors, and validation errors
    /// never do.
    #[must_use]
    pub const fn is_connection_failure(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connection_failure(),
            _ => false,
        }
    }

    /// Returns true if this is a protocol-level fault from the STS.
    #[must_use]
    pub const fn is_protocol_fault(&self) -> bool {
        matches!(self, Self::Protocol(_))
    }
}
