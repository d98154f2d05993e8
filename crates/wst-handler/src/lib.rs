//! # wst-handler
//!
//! Inbound security-token validation for SOAP services that trust an STS:
//!
//! - [`SecurityTokenVariant`] - the protocol-variant contract (which header
//!   carries the token, which element is the token)
//! - [`Saml2Variant`] - SAML 2.0 assertions inside a `wsse:Security` header
//! - [`VariantRegistry`] - explicit string-keyed variant construction
//! - [`SecurityHandler`] - the interceptor: extract the token from an inbound
//!   envelope, validate it against the STS through a pooled client, and map
//!   the outcome to one of three terminal WS-Security faults
//!
//! Outbound messages pass through untouched. Handler instances hold no
//! per-message state and are safe to share across concurrent requests.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fault;
pub mod handler;
pub mod registry;
pub mod saml2;
pub mod variant;

pub use fault::{FaultCode, HandlerFault};
pub use handler::SecurityHandler;
pub use registry::VariantRegistry;
pub use saml2::Saml2Variant;
pub use variant::SecurityTokenVariant;
