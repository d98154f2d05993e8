//! # wst-client
//!
//! Client side of the WS-Trust protocol core:
//!
//! - [`StsClientConfig`] - endpoint/credential configuration with builder and
//!   TOML file loading; value equality is the pooling identity
//! - [`StsTransport`] - the pluggable RPC transport seam, with an HTTP/SOAP
//!   implementation in [`transport::HttpSoapTransport`]
//! - [`StsClient`] - one Issue/Renew/Validate/Cancel exchange per call
//!   against one configured endpoint
//! - [`StsClientPool`] - a bounded, keyed pool of configured clients with
//!   RAII borrow/return
//! - [`WsTrustClient`] - ordered multi-endpoint failover over pooled clients
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wst_client::{HttpSoapTransport, StsClientPool, WsTrustClient};
//! use wst_core::{Password, SecurityInfo};
//!
//! let transport = Arc::new(HttpSoapTransport::new()?);
//! let pool = Arc::new(StsClientPool::new(transport, 10));
//! let client = WsTrustClient::new(
//!     pool,
//!     "SecurityTokenService",
//!     "SecurityTokenServicePort",
//!     &["https://sts1.example.org/sts", "https://sts2.example.org/sts"],
//!     SecurityInfo::new("admin", Password::new("admin")),
//! )?;
//! let token = client.issue_token_for_type(wst_core::constants::SAML2_TOKEN_TYPE).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod config;
pub mod failover;
pub mod pool;
pub mod transport;

pub use client::StsClient;
pub use config::{StsClientConfig, StsClientConfigBuilder};
pub use failover::WsTrustClient;
pub use pool::{PooledStsClient, StsClientPool};
pub use transport::{HttpSoapTransport, StsTransport};
