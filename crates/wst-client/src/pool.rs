//! Keyed, bounded pool of configured STS clients.
//!
//! Client construction is the expensive step of a validation round trip, so
//! clients are cached per configuration and borrowed for the duration of one
//! exchange. Borrow and return are expressed as a scoped guard: dropping a
//! [`PooledStsClient`] always returns the client, on every exit path.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use wst_core::error::{WstError, WstResult};

use crate::client::StsClient;
use crate::config::StsClientConfig;
use crate::transport::StsTransport;

/// Default cap on live clients per configuration.
pub const DEFAULT_MAX_CLIENTS_PER_CONFIG: usize = 10;

struct SubPool {
    idle: Mutex<Vec<StsClient>>,
    permits: Arc<Semaphore>,
}

impl SubPool {
    fn new(capacity: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            permits: Arc::new(Semaphore::new(capacity)),
        }
    }
}

/// A pool of STS clients keyed by configuration value equality.
///
/// At most one sub-pool exists per distinct configuration, including under
/// concurrent first use. Each sub-pool holds at most
/// `max_clients_per_config` live clients; when all are borrowed,
/// [`StsClientPool::get_client`] waits for one to be returned.
///
/// The pool is constructed explicitly and shared by reference; there is no
/// process-global instance.
pub struct StsClientPool {
    transport: Arc<dyn StsTransport>,
    max_clients_per_config: usize,
    pools: DashMap<StsClientConfig, Arc<SubPool>>,
}

impl StsClientPool {
    /// Creates a pool over the given transport with a per-config capacity.
    #[must_use]
    pub fn new(transport: Arc<dyn StsTransport>, max_clients_per_config: usize) -> Self {
        Self {
            transport,
            max_clients_per_config: max_clients_per_config.max(1),
            pools: DashMap::new(),
        }
    }

    /// Creates a pool with [`DEFAULT_MAX_CLIENTS_PER_CONFIG`].
    #[must_use]
    pub fn with_default_capacity(transport: Arc<dyn StsTransport>) -> Self {
        Self::new(transport, DEFAULT_MAX_CLIENTS_PER_CONFIG)
    }

    /// Returns true iff a sub-pool exists for a value-equal configuration.
    #[must_use]
    pub fn config_exists(&self, config: &StsClientConfig) -> bool {
        self.pools.contains_key(config)
    }

    /// Registers a sub-pool for the configuration. Idempotent: a second call
    /// with a value-equal config is a no-op, and a concurrent first-use race
    /// installs exactly one sub-pool.
    ///
    /// ## Errors
    ///
    /// Fails with [`WstError::Config`] when a keystore or truststore the
    /// config references has disappeared since the config was built.
    pub fn create_pool(&self, config: &StsClientConfig) -> WstResult<()> {
        for (label, path) in [
            ("truststore", config.truststore()),
            ("keystore", config.keystore()),
        ] {
            if let Some(path) = path {
                if !path.exists() {
                    return Err(WstError::config(format!(
                        "{label} not found: {}",
                        path.display()
                    )));
                }
            }
        }

        let capacity = self.max_clients_per_config;
        let mut created = false;
        self.pools.entry(config.clone()).or_insert_with(|| {
            created = true;
            Arc::new(SubPool::new(capacity))
        });
        if created {
            debug!(
                endpoint = config.endpoint_address(),
                capacity, "registered STS client sub-pool"
            );
        }
        Ok(())
    }

    /// Borrows a client for the configuration.
    ///
    /// Reuses an idle client when one exists, constructs a new one while the
    /// sub-pool has capacity, and otherwise waits until a borrower returns.
    /// The returned guard gives the client back on drop.
    ///
    /// ## Errors
    ///
    /// Fails with [`WstError::PoolNotFound`] when no sub-pool was registered
    /// for a value-equal config, and [`WstError::PoolExhausted`] if the
    /// sub-pool was torn down while waiting.
    pub async fn get_client(&self, config: &StsClientConfig) -> WstResult<PooledStsClient> {
        let sub = self
            .pools
            .get(config)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| WstError::PoolNotFound(config.endpoint_address().to_string()))?;

        let permit = Arc::clone(&sub.permits)
            .acquire_owned()
            .await
            .map_err(|_| WstError::PoolExhausted)?;

        let client = sub.idle.lock().pop();
        let client =
            client.unwrap_or_else(|| StsClient::new(config.clone(), Arc::clone(&self.transport)));

        Ok(PooledStsClient {
            client: Some(client),
            sub,
            _permit: permit,
        })
    }

    /// Number of registered sub-pools.
    #[must_use]
    pub fn registered_configs(&self) -> usize {
        self.pools.len()
    }

    /// Number of idle clients waiting in the sub-pool for this config.
    #[must_use]
    pub fn idle_count(&self, config: &StsClientConfig) -> usize {
        self.pools
            .get(config)
            .map_or(0, |entry| entry.idle.lock().len())
    }
}

/// A borrowed STS client.
///
/// Derefs to [`StsClient`]. Dropping the guard returns the client to its
/// sub-pool and frees its capacity slot; the borrow/return discipline means
/// a client is never held by two borrowers at once and can never be
/// returned twice.
pub struct PooledStsClient {
    client: Option<StsClient>,
    sub: Arc<SubPool>,
    _permit: OwnedSemaphorePermit,
}

impl PooledStsClient {
    /// Drops the client instead of returning it to the idle list.
    ///
    /// Use after an exchange that may have left the underlying connection in
    /// an unusable state. The capacity slot is still freed.
    pub fn discard(mut self) {
        self.client.take();
    }
}

impl Deref for PooledStsClient {
    type Target = StsClient;

    fn deref(&self) -> &Self::Target {
        // Present except after discard(), which consumes self.
        self.client.as_ref().expect("borrowed client missing")
    }
}

impl DerefMut for PooledStsClient {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.client.as_mut().expect("borrowed client missing")
    }
}

impl fmt::Debug for PooledStsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledStsClient")
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl Drop for PooledStsClient {
    fn drop(&mut self) {
        if let Some(client) = self.client.take() {
            self.sub.idle.lock().push(client);
        }
        // The permit releases after this body, so a waiter that wakes up
        // always sees the returned client.
    }
}
