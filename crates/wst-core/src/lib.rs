//! # wst-core
//!
//! Core types for the WS-Trust protocol stack:
//!
//! - **Constants** - WS-Trust 1.3 / WS-Security / SAML 2.0 namespace URIs and
//!   fault subcodes
//! - **Errors** - the transport/protocol/configuration error taxonomy used by
//!   the client and handler crates
//! - **Credentials** - clearable secret buffers with a terminal `clear()`
//! - **RST/RSTR wrappers** - typed request/response envelopes for
//!   Issue/Renew/Validate/Cancel exchanges
//! - **Token model** - an owned XML element tree treated as the opaque
//!   security token, plus the [`codec::TokenCodec`] wire boundary
//! - **SOAP model** - envelope, message context, and fault extraction
//!
//! # WS-Trust Specifications
//!
//! - [WS-Trust 1.3](https://docs.oasis-open.org/ws-sx/ws-trust/200512/ws-trust-1.3-os.html)
//! - [WS-Security 1.0](https://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-soap-message-security-1.0.pdf)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod codec;
pub mod constants;
pub mod credential;
pub mod error;
pub mod rst;
pub mod soap;
pub mod token;

pub use codec::{TokenCodec, XmlCodec};
pub use constants::QName;
pub use credential::{CredentialError, Digest, Password, SecurityInfo, X509CertCredential};
pub use error::{ProtocolFault, TransportError, TransportErrorKind, WstError, WstResult};
pub use rst::{Lifetime, RequestSecurityToken, RequestSecurityTokenResponse, RequestType, Status};
pub use soap::{MessageContext, MessageDirection, SoapEnvelope, SoapFault};
pub use token::XmlElement;
