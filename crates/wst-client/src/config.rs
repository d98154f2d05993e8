//! STS client configuration.
//!
//! Configuration can be built programmatically or loaded from a TOML file
//! and then overridden field by field. Validation happens once at
//! [`StsClientConfigBuilder::build`]; a config that exists is a config a
//! client can be constructed from.
//!
//! Two configs are equal iff all fields match structurally; that value
//! equality is the pool's keying identity.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use wst_core::error::{WstError, WstResult};

/// Default RPC timeout when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for one STS endpoint and its credentials.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StsClientConfig {
    service_name: String,
    port_name: String,
    endpoint_address: String,
    username: Option<String>,
    password: Option<String>,
    wsa_issuer: Option<String>,
    wsp_applies_to: Option<String>,
    batch: bool,
    truststore: Option<PathBuf>,
    keystore: Option<PathBuf>,
    request_timeout: Duration,
}

impl StsClientConfig {
    /// Starts a builder.
    #[must_use]
    pub fn builder() -> StsClientConfigBuilder {
        StsClientConfigBuilder::default()
    }

    /// The STS service name.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// The STS port name.
    #[must_use]
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// The endpoint address.
    #[must_use]
    pub fn endpoint_address(&self) -> &str {
        &self.endpoint_address
    }

    /// The authentication username, if configured.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// The authentication password, if configured.
    #[must_use]
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// The wsa issuer address, if configured.
    #[must_use]
    pub fn wsa_issuer(&self) -> Option<&str> {
        self.wsa_issuer.as_deref()
    }

    /// The default AppliesTo target, if configured.
    #[must_use]
    pub fn wsp_applies_to(&self) -> Option<&str> {
        self.wsp_applies_to.as_deref()
    }

    /// Whether requests default to the batch request types.
    #[must_use]
    pub fn is_batch(&self) -> bool {
        self.batch
    }

    /// The truststore path, if configured.
    #[must_use]
    pub fn truststore(&self) -> Option<&Path> {
        self.truststore.as_deref()
    }

    /// The keystore path, if configured.
    #[must_use]
    pub fn keystore(&self) -> Option<&Path> {
        self.keystore.as_deref()
    }

    /// The per-RPC timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns a builder pre-populated with this config's fields, for
    /// per-message overrides.
    #[must_use]
    pub fn to_builder(&self) -> StsClientConfigBuilder {
        StsClientConfigBuilder {
            service_name: Some(self.service_name.clone()),
            port_name: Some(self.port_name.clone()),
            endpoint_address: Some(self.endpoint_address.clone()),
            username: self.username.clone(),
            password: self.password.clone(),
            wsa_issuer: self.wsa_issuer.clone(),
            wsp_applies_to: self.wsp_applies_to.clone(),
            batch: self.batch,
            truststore: self.truststore.clone(),
            keystore: self.keystore.clone(),
            request_timeout: Some(self.request_timeout),
        }
    }
}

impl fmt::Debug for StsClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StsClientConfig")
            .field("service_name", &self.service_name)
            .field("port_name", &self.port_name)
            .field("endpoint_address", &self.endpoint_address)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("batch", &self.batch)
            .finish_non_exhaustive()
    }
}

/// On-disk shape of an STS client config file.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    service_name: Option<String>,
    port_name: Option<String>,
    endpoint_address: Option<String>,
    username: Option<String>,
    password: Option<String>,
    wsa_issuer: Option<String>,
    wsp_applies_to: Option<String>,
    batch: Option<bool>,
    truststore: Option<PathBuf>,
    keystore: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
}

/// Builder for [`StsClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct StsClientConfigBuilder {
    service_name: Option<String>,
    port_name: Option<String>,
    endpoint_address: Option<String>,
    username: Option<String>,
    password: Option<String>,
    wsa_issuer: Option<String>,
    wsp_applies_to: Option<String>,
    batch: bool,
    truststore: Option<PathBuf>,
    keystore: Option<PathBuf>,
    request_timeout: Option<Duration>,
}

impl StsClientConfigBuilder {
    /// Loads builder defaults from a TOML config file.
    ///
    /// ## Errors
    ///
    /// Fails with [`WstError::Config`] when the file is unreadable or not
    /// valid TOML.
    pub fn from_file(path: impl AsRef<Path>) -> WstResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| WstError::config(format!("cannot read {}: {e}", path.display())))?;
        let file: ConfigFile = toml::from_str(&raw)
            .map_err(|e| WstError::config(format!("cannot parse {}: {e}", path.display())))?;
        Ok(Self {
            service_name: file.service_name,
            port_name: file.port_name,
            endpoint_address: file.endpoint_address,
            username: file.username,
            password: file.password,
            wsa_issuer: file.wsa_issuer,
            wsp_applies_to: file.wsp_applies_to,
            batch: file.batch.unwrap_or(false),
            truststore: file.truststore,
            keystore: file.keystore,
            request_timeout: file.request_timeout_secs.map(Duration::from_secs),
        })
    }

    /// Sets the service name.
    #[must_use]
    pub fn service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Sets the port name.
    #[must_use]
    pub fn port_name(mut self, name: impl Into<String>) -> Self {
        self.port_name = Some(name.into());
        self
    }

    /// Sets the endpoint address.
    #[must_use]
    pub fn endpoint_address(mut self, address: impl Into<String>) -> Self {
        self.endpoint_address = Some(address.into());
        self
    }

    /// Sets the authentication username.
    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the authentication password.
    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the wsa issuer address.
    #[must_use]
    pub fn wsa_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.wsa_issuer = Some(issuer.into());
        self
    }

    /// Sets the default AppliesTo target.
    #[must_use]
    pub fn wsp_applies_to(mut self, applies_to: impl Into<String>) -> Self {
        self.wsp_applies_to = Some(applies_to.into());
        self
    }

    /// Marks requests as batch requests.
    #[must_use]
    pub fn batch(mut self, batch: bool) -> Self {
        self.batch = batch;
        self
    }

    /// Sets the truststore path.
    #[must_use]
    pub fn truststore(mut self, path: impl Into<PathBuf>) -> Self {
        self.truststore = Some(path.into());
        self
    }

    /// Sets the keystore path.
    #[must_use]
    pub fn keystore(mut self, path: impl Into<PathBuf>) -> Self {
        self.keystore = Some(path.into());
        self
    }

    /// Sets the per-RPC timeout.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Validates and builds the configuration.
    ///
    /// ## Errors
    ///
    /// Fails with [`WstError::Config`] when a required field is missing, the
    /// endpoint address has an unsupported scheme, or a referenced
    /// truststore/keystore does not exist.
    pub fn build(self) -> WstResult<StsClientConfig> {
        let service_name = self
            .service_name
            .ok_or_else(|| WstError::config("service name is required"))?;
        let port_name = self
            .port_name
            .ok_or_else(|| WstError::config("port name is required"))?;
        let endpoint_address = self
            .endpoint_address
            .ok_or_else(|| WstError::config("endpoint address is required"))?;

        if !endpoint_address.starts_with("http://") && !endpoint_address.starts_with("https://") {
            return Err(WstError::config(format!(
                "endpoint address must be http:// or https://, got {endpoint_address}"
            )));
        }
        for (label, path) in [("truststore", &self.truststore), ("keystore", &self.keystore)] {
            if let Some(path) = path {
                if !path.exists() {
                    return Err(WstError::config(format!(
                        "{label} not found: {}",
                        path.display()
                    )));
                }
            }
        }

        Ok(StsClientConfig {
            service_name,
            port_name,
            endpoint_address,
            username: self.username,
            password: self.password,
            wsa_issuer: self.wsa_issuer,
            wsp_applies_to: self.wsp_applies_to,
            batch: self.batch,
            truststore: self.truststore,
            keystore: self.keystore,
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        })
    }
}
