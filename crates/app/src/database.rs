//! Database connection management

use sqlx::{PgPool, Postgres, Transaction};
use tokio::sync::OnceCell;
use tracing::info;

static SHARED_POOL: OnceCell<PgPool> = OnceCell::const_new();

#[derive(Debug, Clone)]
pub struct Db {
    pool: PgPool,
}

impl Db {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Begin a transaction.
    ///
    /// # Errors
    ///
    /// Returns an error when a connection cannot be acquired or the
    /// transaction cannot be started.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    /// The underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Connect to `PostgreSQL`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPool::connect(database_url).await
}

/// Process-wide pool, connected on first use.
///
/// Concurrent first callers wait on the same connection attempt. A failed
/// attempt leaves the cell empty so the next caller retries. Later calls
/// return the existing pool whatever `database_url` they pass.
///
/// # Errors
///
/// Returns an error if the first connection attempt fails.
pub async fn shared_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    SHARED_POOL
        .get_or_try_init(|| async {
            info!("connecting shared database pool");

            connect(database_url).await
        })
        .await
        .cloned()
}

/// Close the shared pool if it was ever opened.
pub async fn close_shared_pool() {
    if let Some(pool) = SHARED_POOL.get() {
        pool.close().await;
    }
}
