//! Document store access for the FineGuard event core.
//!
//! [`StoreClient`] is the process-wide store handle; [`Collection`] is a
//! cheap per-call view of one named collection.

use std::time::Duration;

use fineguard_core::error::CoreError;
use sqlx::postgres::PgPoolOptions;

pub mod collection;
pub mod models;
pub mod repositories;
pub mod store;

pub use collection::Collection;
pub use store::{StoreClient, StoreConfig};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(
    database_url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the store is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations. Safe to call repeatedly.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Map a sqlx error onto the core taxonomy.
pub fn store_error(err: sqlx::Error) -> CoreError {
    match err {
        sqlx::Error::Configuration(e) => {
            CoreError::Configuration(format!("invalid store configuration: {e}"))
        }
        sqlx::Error::Io(e) => CoreError::Connectivity(format!("store unreachable: {e}")),
        sqlx::Error::Tls(e) => CoreError::Connectivity(format!("store TLS failure: {e}")),
        sqlx::Error::PoolTimedOut => {
            CoreError::Connectivity("timed out waiting for a store connection".into())
        }
        sqlx::Error::PoolClosed => CoreError::Connectivity("store pool is closed".into()),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            CoreError::Protocol(format!("malformed store row: {err}"))
        }
        other => CoreError::Internal(format!("store query failed: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn pool_failures_are_connectivity_errors() {
        assert_matches!(
            store_error(sqlx::Error::PoolTimedOut),
            CoreError::Connectivity(_)
        );
        assert_matches!(
            store_error(sqlx::Error::PoolClosed),
            CoreError::Connectivity(_)
        );
    }

    #[test]
    fn io_failure_is_retryable() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert!(store_error(sqlx::Error::Io(io)).is_retryable());
    }

    #[test]
    fn missing_row_is_internal() {
        assert_matches!(
            store_error(sqlx::Error::RowNotFound),
            CoreError::Internal(_)
        );
    }
}
