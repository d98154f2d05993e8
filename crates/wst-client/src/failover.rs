//! Multi-endpoint failover over pooled STS clients.
//!
//! One logical client backed by N candidate endpoints, tried strictly in
//! construction order. Failover exists only to skip endpoints that are down:
//! a connection-level failure advances to the next endpoint, while a
//! rejection from a reachable STS propagates immediately.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use wst_core::credential::SecurityInfo;
use wst_core::error::{WstError, WstResult};
use wst_core::rst::RequestSecurityToken;
use wst_core::token::XmlElement;

use crate::config::StsClientConfig;
use crate::pool::StsClientPool;

/// WS-Trust client with ordered endpoint failover.
///
/// Operations walk the endpoint list sequentially: no randomization, no
/// circuit breaking, no concurrent racing. An operation fails over to the
/// next endpoint only when the current one is unreachable (connection
/// refused or timed out) and a later endpoint exists.
pub struct WsTrustClient {
    pool: Arc<StsClientPool>,
    configs: Vec<StsClientConfig>,
}

impl WsTrustClient {
    /// Creates a failover client for the given endpoints, in order.
    ///
    /// Registers one pool entry per endpoint. The password is read from the
    /// credential once, at construction.
    ///
    /// ## Errors
    ///
    /// Fails with [`WstError::Validation`] when the endpoint list is empty,
    /// [`WstError::Credential`] when the password was already cleared, and
    /// [`WstError::Config`] when an endpoint address is malformed.
    pub fn new(
        pool: Arc<StsClientPool>,
        service_name: &str,
        port_name: &str,
        endpoints: &[&str],
        security_info: SecurityInfo,
    ) -> WstResult<Self> {
        if service_name.is_empty() || port_name.is_empty() {
            return Err(WstError::validation(
                "service name and port name are required",
            ));
        }
        if endpoints.is_empty() {
            return Err(WstError::validation(
                "at least one endpoint URI must be provided",
            ));
        }
        let password = security_info.password.as_str().map_err(WstError::from)?;

        let mut configs = Vec::with_capacity(endpoints.len());
        for endpoint in endpoints {
            let config = StsClientConfig::builder()
                .service_name(service_name)
                .port_name(port_name)
                .endpoint_address(*endpoint)
                .username(&security_info.username)
                .password(password)
                .build()?;
            pool.create_pool(&config)?;
            configs.push(config);
        }
        Ok(Self { pool, configs })
    }

    /// The configured endpoints, in failover order.
    #[must_use]
    pub fn endpoints(&self) -> Vec<&str> {
        self.configs
            .iter()
            .map(StsClientConfig::endpoint_address)
            .collect()
    }

    /// Issues a token of the given type.
    ///
    /// ## Errors
    ///
    /// See [`WsTrustClient::issue_token`].
    pub async fn issue_token_for_type(&self, token_type: &str) -> WstResult<XmlElement> {
        self.issue_token(RequestSecurityToken::new().with_token_type(token_type))
            .await
    }

    /// Issues a token for the ultimate recipient endpoint.
    ///
    /// ## Errors
    ///
    /// See [`WsTrustClient::issue_token`].
    pub async fn issue_token_for_endpoint(&self, endpoint: &str) -> WstResult<XmlElement> {
        self.issue_token(RequestSecurityToken::new().with_applies_to(endpoint))
            .await
    }

    /// Issues a token on behalf of the given principal. At least one of
    /// recipient endpoint and token type must be given.
    ///
    /// ## Errors
    ///
    /// Fails with [`WstError::Validation`] when both are absent; otherwise
    /// see [`WsTrustClient::issue_token`].
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

    /// Issues a token using the given request, with failover.
    ///
    /// ## Errors
    ///
    /// The last attempt's error when every endpoint is unreachable; the
    /// first non-connection error otherwise.
    pub async fn issue_token(&self, request: RequestSecurityToken) -> WstResult<XmlElement> {
        let mut index = 0;
        loop {
            let client = self.pool.get_client(&self.configs[index]).await?;
            match client.issue_token(request.clone()).await {
                Ok(token) => return Ok(token),
                Err(e) => index = self.next_index(index, e)?,
            }
        }
    }

    /// Renews the given token, with failover.
    ///
    /// ## Errors
    ///
    /// Same propagation policy as [`WsTrustClient::issue_token`].
    pub async fn renew_token(
        &self,
        token_type: &str,
        token: &XmlElement,
    ) -> WstResult<XmlElement> {
        let mut index = 0;
        loop {
            let client = self.pool.get_client(&self.configs[index]).await?;
            match client.renew_token(token_type, token).await {
                Ok(renewed) => return Ok(renewed),
                Err(e) => index = self.next_index(index, e)?,
            }
        }
    }

    /// Validates the given token, with failover.
    ///
    /// ## Errors
    ///
    /// Same propagation policy as [`WsTrustClient::issue_token`].
    pub async fn validate_token(&self, token: &XmlElement) -> WstResult<bool> {
        let mut index = 0;
        loop {
            let client = self.pool.get_client(&self.configs[index]).await?;
            match client.validate_token(token).await {
                Ok(valid) => return Ok(valid),
                Err(e) => index = self.next_index(index, e)?,
            }
        }
    }

    /// Cancels the given token, with failover.
    ///
    /// ## Errors
    ///
    /// Same propagation policy as [`WsTrustClient::issue_token`].
    pub async fn cancel_token(&self, token: &XmlElement) -> WstResult<bool> {
        let mut index = 0;
        loop {
            let client = self.pool.get_client(&self.configs[index]).await?;
            match client.cancel_token(token).await {
                Ok(cancelled) => return Ok(cancelled),
                Err(e) => index = self.next_index(index, e)?,
            }
        }
    }

    /// Decides whether to advance to the next endpoint or propagate.
    ///
    /// Only a connection failure with a later endpoint remaining advances.
    fn next_index(&self, index: usize, error: WstError) -> WstResult<usize> {
        if error.is_connection_failure() && index + 1 < self.configs.len() {
            debug!(
                failed = self.configs[index].endpoint_address(),
                next = self.configs[index + 1].endpoint_address(),
                "endpoint unreachable, failing over"
            );
            return Ok(index + 1);
        }
        if error.is_connection_failure() {
            warn!(
                endpoint = self.configs[index].endpoint_address(),
                "endpoint unreachable and no alternates remain"
            );
        }
        Err(error)
    }
}

impl fmt::Debug for WsTrustClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WsTrustClient")
            .field("endpoints", &self.endpoints())
            .finish_non_exhaustive()
    }
}
