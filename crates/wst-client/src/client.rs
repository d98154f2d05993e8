//! The STS client: one WS-Trust RPC exchange per call.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use wst_core::constants::{self, QName, WST_NS};
use wst_core::error::{ProtocolFault, WstError, WstResult};
use wst_core::rst::{RequestSecurityToken, RequestSecurityTokenResponse, RequestType};
use wst_core::soap::SoapEnvelope;
use wst_core::token::XmlElement;

use crate::config::StsClientConfig;
use crate::transport::{StsTransport, TransportRequest};

/// Context identifier used when the caller sets none.
const DEFAULT_CONTEXT: &str = "default-context";

/// A client for one configured STS endpoint.
///
/// Each method performs a single Issue/Renew/Validate/Cancel exchange. The
/// two failure classes stay distinguishable: a transport failure marks the
/// endpoint unreachable (failover-eligible), a protocol fault is an active
/// rejection from a reachable STS (never failover-eligible).
pub struct StsClient {
    config: StsClientConfig,
    transport: Arc<dyn StsTransport>,
}

impl StsClient {
    /// Creates a client over the given configuration and transport.
    #[must_use]
    pub fn new(config: StsClientConfig, transport: Arc<dyn StsTransport>) -> Self {
        Self { config, transport }
    }

    /// The client's configuration.
    #[must_use]
    pub fn config(&self) -> &StsClientConfig {
        &self.config
    }

    /// Issues a token of the given type.
    ///
    /// ## Errors
    ///
    /// See [`StsClient::issue_token`].
    pub async fn issue_token_for_type(&self, token_type: &str) -> WstResult<XmlElement> {
        self.issue_token(RequestSecurityToken::new().with_token_type(token_type))
            .await
    }

    /// Issues a token for the ultimate recipient endpoint.
    ///
    /// ## Errors
    ///
    /// See [`StsClient::issue_token`].
    pub async fn issue_token_for_endpoint(&self, endpoint: &str) -> WstResult<XmlElement> {
        self.issue_token(RequestSecurityToken::new().with_applies_to(endpoint))
            .await
    }

    /// Issues a token specifying recipient endpoint and/or token type; at
    /// least one must be given.
    ///
    /// ## Errors
    ///
    /// Fails with [`WstError::Validation`] when both are absent; otherwise
    /// see [`StsClient::issue_token`].
    pub async fn issue_token_for(
        &self,
        endpoint: Option<&str>,
        token_type: Option<&str>,
    ) -> WstResult<XmlElement> {
        if endpoint.is_none() && token_type.is_none() {
            return Err(WstError::validation(
                "either the endpoint or the token type must be specified",
            ));
        }
        let mut request = RequestSecurityToken::new();
        request.applies_to = endpoint.map(str::to_string);
        request.token_type = token_type.map(str::to_string);
        self.issue_token(request).await
    }

    /// Issues a token on behalf of the given principal.
    ///
    /// ## Errors
    ///
    /// Fails with [`WstError::Validation`] when both endpoint and token type
    /// are absent; otherwise see [`StsClient::issue_token`].
    pub async fn issue_token_on_behalf_of(
        &self,
        endpoint: Option<&str>,
        token_type: Option<&str>,
        principal: &str,
    ) -> WstResult<XmlElement> {
        if endpoint.is_none() && token_type.is_none() {
            return Err(WstError::validation(
                "either the endpoint or the token type must be specified",
            ));
        }
        let mut request = RequestSecurityToken::new().with_on_behalf_of(principal);
        request.applies_to = endpoint.map(str::to_string);
        request.token_type = token_type.map(str::to_string);
        self.issue_token(request).await
    }

    /// Sends an Issue RST and returns the issued token element.
    ///
    /// When the request carries no request type it defaults to Issue (or
    /// BatchIssue for a batch config); an unset context gets the default
    /// context identifier; configured issuer and AppliesTo defaults fill
    /// unset fields.
    ///
    /// ## Errors
    ///
    /// Fails with [`WstError::Protocol`] on an STS fault,
    /// [`WstError::Transport`] on network failure, and [`WstError::Codec`]
    /// when the response carries no requested token.
    pub async fn issue_token(&self, mut request: RequestSecurityToken) -> WstResult<XmlElement> {
        if request.request_type.is_none() {
            request.request_type = Some(if self.config.is_batch() {
                RequestType::BatchIssue
            } else {
                RequestType::Issue
            });
        }
        self.apply_config_defaults(&mut request);

        let response = self.exchange(&mut request).await?;
        let body = response
            .body_first()
            .ok_or_else(|| WstError::codec("response has an empty body"))?;

        // Namespace-qualified lookup first, unqualified fallback for STS
        // implementations that omit the namespace on result elements.
        let requested = body
            .find(&QName::new(WST_NS, "RequestedSecurityToken"))
            .or_else(|| body.find_by_local_name("RequestedSecurityToken"))
            .ok_or_else(|| WstError::codec("response contains no RequestedSecurityToken"))?;
        requested
            .first_child()
            .cloned()
            .ok_or_else(|| WstError::codec("RequestedSecurityToken is empty"))
    }

    /// Sends a Renew RST for the given token and returns the renewed token
    /// element.
    ///
    /// ## Errors
    ///
    /// Same failure classes as [`StsClient::issue_token`].
    pub async fn renew_token(&self, token_type: &str, token: &XmlElement) -> WstResult<XmlElement> {
        let mut request = RequestSecurityToken::new().with_token_type(token_type);
        request.request_type = Some(RequestType::Renew);
        request.renew_target = Some(token.clone());

        let response = self.exchange(&mut request).await?;
        let body = response
            .body_first()
            .ok_or_else(|| WstError::codec("response has an empty body"))?;
        let requested = body
            .find(&QName::new(WST_NS, "RequestedSecurityToken"))
            .or_else(|| body.find_by_local_name("RequestedSecurityToken"))
            .ok_or_else(|| WstError::codec("response contains no RequestedSecurityToken"))?;
        requested
            .first_child()
            .cloned()
            .ok_or_else(|| WstError::codec("RequestedSecurityToken is empty"))
    }

    /// Sends a Validate RST for the given token.
    ///
    /// Returns true for a valid status, false for an invalid status.
    ///
    /// ## Errors
    ///
    /// Fails with [`WstError::Protocol`] for any other status or fault,
    /// [`WstError::Transport`] on network failure, and [`WstError::Codec`]
    /// when the response carries no status at all.
    pub async fn validate_token(&self, token: &XmlElement) -> WstResult<bool> {
        let mut request =
            RequestSecurityToken::new().with_token_type(constants::STATUS_TOKEN_TYPE);
        request.request_type = Some(RequestType::Validate);
        request.validate_target = Some(token.clone());

        let response = self.exchange(&mut request).await?;
        let rstr = parse_first_response(&response)?;
        let status = rstr
            .status
            .ok_or_else(|| WstError::codec("validation response carries no Status"))?;

        if status.is_valid() {
            return Ok(true);
        }
        if status.code == constants::STATUS_CODE_INVALID {
            return Ok(false);
        }
        Err(ProtocolFault::new(
            QName::unqualified(status.code),
            status
                .reason
                .unwrap_or_else(|| "unrecognized validation status".to_string()),
        )
        .into())
    }

    /// Sends a Cancel RST for the given token.
    ///
    /// Returns true iff the STS confirmed cancellation.
    ///
    /// ## Errors
    ///
    /// Same failure classes as [`StsClient::validate_token`].
    pub async fn cancel_token(&self, token: &XmlElement) -> WstResult<bool> {
        let mut request = RequestSecurityToken::new();
        request.request_type = Some(RequestType::Cancel);
        request.cancel_target = Some(token.clone());

        let response = self.exchange(&mut request).await?;
        let rstr = parse_first_response(&response)?;
        Ok(rstr.token_cancelled)
    }

    fn apply_config_defaults(&self, request: &mut RequestSecurityToken) {
        if request.issuer.is_none() {
            request.issuer = self.config.wsa_issuer().map(str::to_string);
        }
        // A configured AppliesTo wins over a per-call endpoint.
        if let Some(applies_to) = self.config.wsp_applies_to() {
            request.applies_to = Some(applies_to.to_string());
        }
    }

    async fn exchange(&self, request: &mut RequestSecurityToken) -> WstResult<SoapEnvelope> {
        if request.context.is_none() {
            request.context = Some(DEFAULT_CONTEXT.to_string());
        }
        let request_type = request.request_type;
        let envelope = SoapEnvelope::new().with_body_element(request.to_element()?);

        debug!(
            endpoint = self.config.endpoint_address(),
            request_type = ?request_type,
            context = request.context.as_deref(),
            "sending WS-Trust request"
        );

        let basic_auth = match (self.config.username(), self.config.password()) {
            (Some(username), Some(password)) => {
                Some((username.to_string(), password.to_string()))
            }
            _ => None,
        };
        let response = self
            .transport
            .send(TransportRequest {
                endpoint: self.config.endpoint_address().to_string(),
                envelope,
                timeout: self.config.request_timeout(),
                basic_auth,
                soap_action: request_type.map(|rt| rt.as_uri().to_string()),
            })
            .await?;

        if let Some(fault) = response.fault() {
            debug!(
                endpoint = self.config.endpoint_address(),
                code = %fault.code,
                "STS returned a fault"
            );
            return Err(ProtocolFault::new(fault.subcode(), fault.reason).into());
        }
        Ok(response)
    }
}

impl fmt::Debug for StsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Defers to the config's Debug, which redacts the password.
        f.debug_struct("StsClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn parse_first_response(envelope: &SoapEnvelope) -> WstResult<RequestSecurityTokenResponse> {
    let body = envelope
        .body_first()
        .ok_or_else(|| WstError::codec("response has an empty body"))?;
    RequestSecurityTokenResponse::first_from(body)
}
