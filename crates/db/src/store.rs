//! Process-wide store handle.
//!
//! [`StoreClient`] is built once at startup and shared by reference
//! (`Arc<StoreClient>`). The underlying pool is created lazily on first use
//! behind a [`OnceCell`]; concurrent first users wait on the same
//! initialisation, and a failed attempt leaves the cell empty so the next
//! caller tries again.

use std::time::Duration;

use fineguard_core::config::{self, env_lookup};
use fineguard_core::error::CoreError;
use tokio::sync::OnceCell;

use crate::collection::Collection;
use crate::DbPool;

/// Default pool acquire (and therefore connect) timeout.
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default maximum pool size.
const DEFAULT_MAX_CONNECTIONS: u64 = 5;

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

/// Store connection settings.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// PostgreSQL connection URL.
    pub url: String,
    /// Upper bound on establishing (or acquiring) a connection.
    pub connect_timeout: Duration,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
}

impl StoreConfig {
    /// Load from the process environment.
    ///
    /// | Env Var                      | Default |
    /// |------------------------------|---------|
    /// | `DATABASE_URL`               | required |
    /// | `STORE_CONNECT_TIMEOUT_SECS` | `10`    |
    /// | `STORE_MAX_CONNECTIONS`      | `5`     |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(env_lookup)
    }

    /// Load through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = config::required_url(&lookup, "DATABASE_URL", &["postgres", "postgresql"])?;
        let connect_timeout = config::secs_or(
            &lookup,
            "STORE_CONNECT_TIMEOUT_SECS",
            DEFAULT_CONNECT_TIMEOUT_SECS,
        )?;
        let max_connections =
            config::parse_or(&lookup, "STORE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        let max_connections = u32::try_from(max_connections)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                CoreError::Configuration("STORE_MAX_CONNECTIONS must be between 1 and 2^32-1".into())
            })?;

        Ok(Self {
            url,
            connect_timeout,
            max_connections,
        })
    }
}

// ---------------------------------------------------------------------------
// StoreClient
// ---------------------------------------------------------------------------

/// Shared, lazily connected handle to the document store.
pub struct StoreClient {
    config: Option<StoreConfig>,
    pool: OnceCell<DbPool>,
}

impl StoreClient {
    /// Create an unconnected client. Nothing touches the network until the
    /// first [`collection`](Self::collection) call.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config: Some(config),
            pool: OnceCell::new(),
        }
    }

    /// Wrap an already established pool (tests and tooling).
    pub fn from_pool(pool: DbPool) -> Self {
        Self {
            config: None,
            pool: OnceCell::new_with(Some(pool)),
        }
    }

    /// Whether the pool has been established.
    pub fn is_connected(&self) -> bool {
        self.pool.initialized()
    }

    /// The shared pool, connecting (and migrating) on first use.
    pub async fn pool(&self) -> Result<&DbPool, CoreError> {
        self.pool.get_or_try_init(|| self.connect()).await
    }

    /// Look up a collection by name.
    pub async fn collection(&self, name: &str) -> Result<Collection, CoreError> {
        let pool = self.pool().await?;
        Ok(Collection::new(pool.clone(), name))
    }

    async fn connect(&self) -> Result<DbPool, CoreError> {
        let config = self.config.as_ref().ok_or_else(|| {
            CoreError::Internal("store client has neither a pool nor a configuration".into())
        })?;

        tracing::info!(
            max_connections = config.max_connections,
            connect_timeout_secs = config.connect_timeout.as_secs(),
            "Connecting to document store",
        );

        let pool = crate::create_pool(&config.url, config.max_connections, config.connect_timeout)
            .await
            .map_err(|e| match e {
                sqlx::Error::PoolTimedOut => CoreError::Timeout {
                    operation: "store connect",
                    after: config.connect_timeout,
                },
                other => crate::store_error(other),
            })
            .inspect_err(|e| tracing::error!(error = %e, "Document store connection failed"))?;

        crate::health_check(&pool).await.map_err(crate::store_error)?;

        crate::run_migrations(&pool)
            .await
            .map_err(|e| CoreError::Internal(format!("failed to apply store migrations: {e}")))?;

        tracing::info!("Document store connected and migrated");
        Ok(pool)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
