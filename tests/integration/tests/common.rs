//! Shared fixtures: an in-process STS stub behind the transport seam.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use wst_client::config::StsClientConfig;
use wst_client::transport::{StsTransport, TransportRequest};
use wst_core::constants::{self, QName, SAML2_ASSERTION_NS, WST_NS};
use wst_core::error::TransportError;
use wst_core::soap::SoapEnvelope;
use wst_core::token::XmlElement;

/// Installs a test subscriber once per process.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("wst_client=debug,wst_handler=debug")
        .try_init();
}

/// An STS implemented directly behind the transport seam.
///
/// Issued assertion IDs are remembered; Validate answers valid exactly for
/// remembered IDs, Cancel forgets them, Renew replaces them. Endpoints
/// listed as down refuse every connection.
pub struct StubSts {
    down: Mutex<HashSet<String>>,
    issued: Mutex<HashSet<String>>,
    serial: AtomicUsize,
    requests: Mutex<Vec<TransportRequest>>,
}

impl StubSts {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            down: Mutex::new(HashSet::new()),
            issued: Mutex::new(HashSet::new()),
            serial: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Marks an endpoint as refusing connections.
    pub fn take_down(&self, endpoint: &str) {
        self.down.lock().insert(endpoint.to_string());
    }

    /// Endpoints contacted so far, in order.
    pub fn contacted(&self) -> Vec<String> {
        self.requests.lock().iter().map(|r| r.endpoint.clone()).collect()
    }

    /// True iff the assertion ID is currently honored.
    pub fn honors(&self, id: &str) -> bool {
        self.issued.lock().contains(id)
    }

    fn mint_assertion(&self) -> XmlElement {
        let id = format!("assertion-{}", self.serial.fetch_add(1, Ordering::Relaxed));
        self.issued.lock().insert(id.clone());
        XmlElement::new(QName::new(SAML2_ASSERTION_NS, "Assertion"))
            .with_attribute("ID", id)
            .with_attribute("Version", "2.0")
    }

    fn target_id(rst: &XmlElement, target: &str) -> Option<String> {
        rst.child(&QName::new(WST_NS, target))
            .and_then(XmlElement::first_child)
            .and_then(|token| token.attribute("ID"))
            .map(str::to_string)
    }

    fn answer(&self, rst: &XmlElement) -> SoapEnvelope {
        let request_type = rst
            .child(&QName::new(WST_NS, "RequestType"))
            .and_then(|e| e.text.as_deref())
            .unwrap_or_default();

        let mut rstr = XmlElement::new(QName::new(WST_NS, "RequestSecurityTokenResponse"));
        match request_type {
            constants::ISSUE_REQUEST | constants::BATCH_ISSUE_REQUEST => {
                rstr.push_child(
                    XmlElement::new(QName::new(WST_NS, "RequestedSecurityToken"))
                        .with_child(self.mint_assertion()),
                );
            }
            constants::RENEW_REQUEST => {
                let known = Self::target_id(rst, "RenewTarget")
                    .is_some_and(|id| self.issued.lock().remove(&id));
                if known {
                    rstr.push_child(
                        XmlElement::new(QName::new(WST_NS, "RequestedSecurityToken"))
                            .with_child(self.mint_assertion()),
                    );
                }
            }
            constants::VALIDATE_REQUEST | constants::BATCH_VALIDATE_REQUEST => {
                let valid = Self::target_id(rst, "ValidateTarget")
                    .is_some_and(|id| self.issued.lock().contains(&id));
                let code = if valid {
                    constants::STATUS_CODE_VALID
                } else {
                    constants::STATUS_CODE_INVALID
                };
                rstr.push_child(
                    XmlElement::new(QName::new(WST_NS, "Status")).with_child(
                        XmlElement::new(QName::new(WST_NS, "Code")).with_text(code),
                    ),
                );
            }
            constants::CANCEL_REQUEST => {
                let cancelled = Self::target_id(rst, "CancelTarget")
                    .is_some_and(|id| self.issued.lock().remove(&id));
                if cancelled {
                    rstr.push_child(XmlElement::new(QName::new(
                        WST_NS,
                        "RequestedTokenCancelled",
                    )));
                }
            }
            _ => {}
        }

        SoapEnvelope::new().with_body_element(
            XmlElement::new(QName::new(WST_NS, "RequestSecurityTokenResponseCollection"))
                .with_child(rstr),
        )
    }
}

#[async_trait]
impl StsTransport for StubSts {
    async fn send(&self, request: TransportRequest) -> Result<SoapEnvelope, TransportError> {
        if self.down.lock().contains(&request.endpoint) {
            self.requests.lock().push(request);
            return Err(TransportError::connection_refused("stub endpoint is down"));
        }
        let rst = request
            .envelope
            .body_first()
            .cloned()
            .ok_or_else(|| TransportError::io("request has no body"))?;
        self.requests.lock().push(request);
        Ok(self.answer(&rst))
    }
}

/// A valid client configuration pointing at the stub.
pub fn config_for(endpoint: &str) -> StsClientConfig {
    StsClientConfig::builder()
        .service_name("SecurityTokenService")
        .port_name("SecurityTokenServicePort")
        .endpoint_address(endpoint)
        .username("admin")
        .password("admin-secret")
        .build()
        .expect("valid test config")
}
