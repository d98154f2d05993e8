//! The inbound validation handler.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use wst_client::config::{StsClientConfig, StsClientConfigBuilder};
use wst_client::pool::StsClientPool;
use wst_core::error::WstResult;
use wst_core::soap::{MessageContext, PASSWORD_PROPERTY, USERNAME_PROPERTY};

use crate::fault::HandlerFault;
use crate::variant::SecurityTokenVariant;

/// Validates the security token of inbound messages against an STS.
///
/// One handler serves a whole deployment: it holds the base client
/// configuration, the shared pool, and the token variant, and nothing
/// per-message. Every borrowed client is returned when the borrow guard
/// drops, on success and on every fault path.
pub struct SecurityHandler {
    pool: Arc<StsClientPool>,
    base_config: StsClientConfig,
    variant: Arc<dyn SecurityTokenVariant>,
}

impl SecurityHandler {
    /// Creates a handler over a shared pool, a base configuration, and a
    /// token variant.
    #[must_use]
    pub fn new(
        pool: Arc<StsClientPool>,
        base_config: StsClientConfig,
        variant: Arc<dyn SecurityTokenVariant>,
    ) -> Self {
        Self {
            pool,
            base_config,
            variant,
        }
    }

    /// Creates a handler with its base configuration loaded from a TOML
    /// file.
    ///
    /// ## Errors
    ///
    /// Fails with [`WstError::Config`](wst_core::WstError::Config) when the
    /// file is missing, malformed, or incomplete.
    pub fn from_config_file(
        pool: Arc<StsClientPool>,
        path: impl AsRef<Path>,
        variant: Arc<dyn SecurityTokenVariant>,
    ) -> WstResult<Self> {
        let base_config = StsClientConfigBuilder::from_file(path)?.build()?;
        Ok(Self::new(pool, base_config, variant))
    }

    /// Processes one message.
    ///
    /// Outbound messages pass through unconditionally. For inbound messages
    /// the variant's token is extracted from the security header and
    /// validated against the STS.
    ///
    /// ## Errors
    ///
    /// - [`SecurityTokenUnavailable`](crate::FaultCode::SecurityTokenUnavailable)
    ///   when the header or the token element is missing
    /// - [`FailedAuthentication`](crate::FaultCode::FailedAuthentication)
    ///   when the STS judged the token invalid
    /// - [`InvalidSecurity`](crate::FaultCode::InvalidSecurity) when
    ///   validation could not be carried out at all
    pub async fn handle_message(&self, context: &MessageContext) -> Result<(), HandlerFault> {
        if context.is_outbound() {
            return Ok(());
        }

        let header_name = self.variant.security_header_qname();
        let token_name = self.variant.token_qname();

        let header = context
            .envelope()
            .header_element(&header_name)
            .ok_or_else(|| {
                HandlerFault::token_unavailable(format!("no {header_name} header in message"))
            })?;
        let token = header.child(&token_name).ok_or_else(|| {
            HandlerFault::token_unavailable(format!("no {token_name} token in security header"))
        })?;

        let config = self.message_config(context)?;
        if !self.pool.config_exists(&config) {
            self.pool.create_pool(&config).map_err(|e| {
                HandlerFault::invalid_security(format!("cannot set up STS client pool: {e}"))
            })?;
        }
        let client = self.pool.get_client(&config).await.map_err(|e| {
            HandlerFault::invalid_security(format!("cannot obtain STS client: {e}"))
        })?;

        match client.validate_token(token).await {
            Ok(true) => {
                debug!(token = %token_name, "security token validated");
                Ok(())
            }
            Ok(false) => Err(HandlerFault::failed_authentication(
                "the STS judged the security token invalid",
            )),
            Err(e) => Err(HandlerFault::invalid_security(format!(
                "security token validation failed: {e}"
            ))),
        }
    }

    /// The effective client configuration for one message: the base config
    /// with any per-message credential overrides applied.
    fn message_config(&self, context: &MessageContext) -> Result<StsClientConfig, HandlerFault> {
        let username = context.property(USERNAME_PROPERTY);
        let password = context.property(PASSWORD_PROPERTY);
        if username.is_none() && password.is_none() {
            return Ok(self.base_config.clone());
        }

        let mut builder = self.base_config.to_builder();
        if let Some(username) = username {
            builder = builder.username(username);
        }
        if let Some(password) = password {
            builder = builder.password(password);
        }
        builder.build().map_err(|e| {
            HandlerFault::invalid_security(format!("invalid credential override: {e}"))
        })
    }
}
