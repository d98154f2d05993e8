//! The RPC transport seam.
//!
//! Transports exchange SOAP envelopes with one endpoint and classify their
//! own failures: a [`TransportError`] kind is assigned at the point the
//! failure is observed, so callers never inspect error source chains to
//! decide whether an endpoint was reachable.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use wst_core::codec::{TokenCodec, XmlCodec};
use wst_core::error::TransportError;
use wst_core::soap::SoapEnvelope;

/// One outgoing RPC exchange.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// Target endpoint address.
    pub endpoint: String,
    /// Request envelope.
    pub envelope: SoapEnvelope,
    /// Per-call timeout. A timeout surfaces as
    /// [`TransportErrorKind::Timeout`](wst_core::TransportErrorKind::Timeout)
    /// and is failover-eligible.
    pub timeout: Duration,
    /// HTTP basic-auth credentials, when the binding supports them.
    pub basic_auth: Option<(String, String)>,
    /// SOAPAction header value.
    pub soap_action: Option<String>,
}

/// Pluggable envelope transport.
#[async_trait]
pub trait StsTransport: Send + Sync {
    /// Sends a request envelope and returns the response envelope.
    ///
    /// SOAP faults are not transport failures: a fault body from a reachable
    /// endpoint is returned as an ordinary response envelope for the caller
    /// to classify.
    ///
    /// ## Errors
    ///
    /// Fails with a classified [`TransportError`] when the exchange itself
    /// fails (connection refused, timeout, I/O).
    async fn send(&self, request: TransportRequest) -> Result<SoapEnvelope, TransportError>;
}

/// SOAP-over-HTTP(S) transport backed by reqwest.
pub struct HttpSoapTransport {
    http: reqwest::Client,
    codec: Arc<dyn TokenCodec>,
}

impl HttpSoapTransport {
    /// Creates a transport with a default HTTP client and XML codec.
    ///
    /// ## Errors
    ///
    /// Fails with [`TransportError`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportError::io(format!("cannot build HTTP client: {e}")))?;
        Ok(Self {
            http,
            codec: Arc::new(XmlCodec::new()),
        })
    }

    /// Creates a transport over an existing HTTP client and codec.
    #[must_use]
    pub fn with_parts(http: reqwest::Client, codec: Arc<dyn TokenCodec>) -> Self {
        Self { http, codec }
    }

    fn classify(e: &reqwest::Error) -> TransportError {
        if e.is_timeout() {
            TransportError::timeout(e.to_string())
        } else if e.is_connect() {
            TransportError::connection_refused(e.to_string())
        } else {
            TransportError::io(e.to_string())
        }
    }
}

#[async_trait]
impl StsTransport for HttpSoapTransport {
    async fn send(&self, request: TransportRequest) -> Result<SoapEnvelope, TransportError> {
        let body = self
            .codec
            .encode(&request.envelope.to_element())
            .map_err(|e| TransportError::io(format!("request encoding failed: {e}")))?;

        let mut builder = self
            .http
            .post(&request.endpoint)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", request.soap_action.as_deref().unwrap_or("\"\""))
            .timeout(request.timeout)
            .body(body);
        if let Some((username, password)) = &request.basic_auth {
            builder = builder.basic_auth(username, Some(password));
        }

        let response = builder.send().await.map_err(|e| Self::classify(&e))?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| Self::classify(&e))?;

        // SOAP faults ride on HTTP 500; decode the body regardless of status
        // and let the caller classify the fault. Only an undecodable body is
        // a transport failure.
        let element = self.codec.decode(&bytes).map_err(|e| {
            TransportError::io(format!(
                "response (HTTP {status}) is not a SOAP envelope: {e}"
            ))
        })?;
        SoapEnvelope::from_element(&element)
            .map_err(|e| TransportError::io(format!("malformed response envelope: {e}")))
    }
}
