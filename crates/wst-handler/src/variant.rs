//! The protocol-variant contract.

use wst_core::constants::QName;

/// Names the two elements a handler needs to locate a security token: the
/// header that carries it and the token element itself.
///
/// This is the only extension point a new token profile needs to implement;
/// extraction, validation, and fault mapping are shared by
/// [`SecurityHandler`](crate::SecurityHandler).
pub trait SecurityTokenVariant: Send + Sync {
    /// Qualified name of the security header element to search for among the
    /// envelope's headers.
    fn security_header_qname(&self) -> QName;

    /// Qualified name of the token element expected inside that header.
    fn token_qname(&self) -> QName;
}
