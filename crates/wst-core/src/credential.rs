//! Clearable credential types.
//!
//! Secret material lives in mutable buffers that are zeroed on [`clear`]
//! and on drop. Clearing is terminal: a cleared credential fails fast on
//! every later read instead of silently handing back zeroed bytes.
//!
//! [`clear`]: Password::clear

use std::fmt;

use thiserror::Error;
use zeroize::Zeroize;

/// Errors raised by credential access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// The credential was cleared and can no longer be read.
    #[error("credential has been cleared")]
    Cleared,
    /// The credential bytes are not valid UTF-8.
    #[error("credential bytes are not valid UTF-8")]
    NotUtf8,
}

/// A password credential backed by a zeroize-on-drop buffer.
///
/// The buffer is exclusively owned by the holder. After [`Password::clear`]
/// the credential is terminal and [`Password::value`] fails with
/// [`CredentialError::Cleared`].
pub struct Password {
    buf: Option<Vec<u8>>,
}

impl Password {
    /// Creates a password credential from a string value.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            buf: Some(value.into().into_bytes()),
        }
    }

    /// Creates a password credential taking ownership of raw bytes.
    #[must_use]
    pub fn from_bytes(value: Vec<u8>) -> Self {
        Self { buf: Some(value) }
    }

    /// Returns the secret bytes.
    ///
    /// ## Errors
    ///
    /// Fails with [`CredentialError::Cleared`] if the credential was cleared.
    pub fn value(&self) -> Result<&[u8], CredentialError> {
        self.buf.as_deref().ok_or(CredentialError::Cleared)
    }

    /// Returns the secret as UTF-8, if it is valid UTF-8.
    ///
    /// ## Errors
    ///
    /// Fails with [`CredentialError::Cleared`] if the credential was cleared
    /// and [`CredentialError::NotUtf8`] if the bytes are not valid UTF-8.
    pub fn as_str(&self) -> Result<&str, CredentialError> {
        let bytes = self.value()?;
        std::str::from_utf8(bytes).map_err(|_| CredentialError::NotUtf8)
    }

    /// Zeroes the buffer and releases it. Irreversible.
    pub fn clear(&mut self) {
        if let Some(mut buf) = self.buf.take() {
            buf.zeroize();
        }
    }

    /// Returns true if the credential was cleared.
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.buf.is_none()
    }
}

impl Drop for Password {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Password")
            .field("cleared", &self.is_cleared())
            .finish_non_exhaustive()
    }
}

/// A digest credential: pre-hashed secret bytes plus the algorithm that
/// produced them. Same clearing contract as [`Password`].
pub struct Digest {
    algorithm: String,
    buf: Option<Vec<u8>>,
}

impl Digest {
    /// Creates a digest credential.
    pub fn new(algorithm: impl Into<String>, digest: Vec<u8>) -> Self {
        Self {
            algorithm: algorithm.into(),
            buf: Some(digest),
        }
    }

    /// Returns the digest algorithm identifier.
    #[must_use]
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Returns the digest bytes.
    ///
    /// ## Errors
    ///
    /// Fails with [`CredentialError::Cleared`] if the credential was cleared.
    pub fn value(&self) -> Result<&[u8], CredentialError> {
        self.buf.as_deref().ok_or(CredentialError::Cleared)
    }

    /// Zeroes the buffer and releases it. Irreversible.
    pub fn clear(&mut self) {
        if let Some(mut buf) = self.buf.take() {
            buf.zeroize();
        }
    }

    /// Returns true if the credential was cleared.
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.buf.is_none()
    }
}

impl Drop for Digest {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Digest")
            .field("algorithm", &self.algorithm)
            .field("cleared", &self.is_cleared())
            .finish_non_exhaustive()
    }
}

/// An X.509 certificate credential holding DER-encoded bytes.
///
/// Certificates are public material, but the holder may still clear them to
/// release the buffer; the terminal contract matches the other credentials.
pub struct X509CertCredential {
    der: Option<Vec<u8>>,
}

impl X509CertCredential {
    /// Creates a certificate credential from DER bytes.
    #[must_use]
    pub fn new(der: Vec<u8>) -> Self {
        Self { der: Some(der) }
    }

    /// Returns the DER-encoded certificate bytes.
    ///
    /// ## Errors
    ///
    /// Fails with [`CredentialError::Cleared`] if the credential was cleared.
    pub fn value(&self) -> Result<&[u8], CredentialError> {
        self.der.as_deref().ok_or(CredentialError::Cleared)
    }

    /// Zeroes the buffer and releases it. Irreversible.
    pub fn clear(&mut self) {
        if let Some(mut der) = self.der.take() {
            der.zeroize();
        }
    }

    /// Returns true if the credential was cleared.
    #[must_use]
    pub fn is_cleared(&self) -> bool {
        self.der.is_none()
    }
}

impl fmt::Debug for X509CertCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("X509CertCredential")
            .field("cleared", &self.is_cleared())
            .finish_non_exhaustive()
    }
}

/// Username plus password pair supplied to the failover client.
#[derive(Debug)]
pub struct SecurityInfo {
    /// Username presented to the STS.
    pub username: String,
    /// Password credential. Read once at client construction.
    pub password: Password,
}

impl SecurityInfo {
    /// Creates a security info pair.
    pub fn new(username: impl Into<String>, password: Password) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}
