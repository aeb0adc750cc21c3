//! Connection pool for the gradebook database.
//!
//! Uses r2d2 with r2d2_sqlite. Every pooled connection gets the same pragmas,
//! and the schema is applied once when the pool is opened.

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::Path;
use std::time::{Duration, Instant};

use super::gateway::Gateway;
use super::schema::{apply_pragmas, initialize_schema};
use super::{StorageError, StorageResult};
use crate::config::DatabaseConfig;

pub type SqliteConnection = PooledConnection<SqliteConnectionManager>;

/// Shared handle to the connection pool. Cheap to clone.
#[derive(Clone)]
pub struct DbPool {
    pool: Pool<SqliteConnectionManager>,
}

impl DbPool {
    /// Open (creating if needed) the database described by `config`.
    pub fn open(config: &DatabaseConfig) -> StorageResult<Self> {
        Self::open_path(
            &config.path,
            config.pool_size,
            Duration::from_millis(config.busy_timeout_ms),
        )
    }

    /// Open a pool on `path` and make sure the tables exist.
    pub fn open_path<P: AsRef<Path>>(
        path: P,
        max_size: u32,
        busy_timeout: Duration,
    ) -> StorageResult<Self> {
        let started_at = Instant::now();
        let path = path.as_ref();

        let manager = SqliteConnectionManager::file(path)
            .with_init(move |conn| apply_pragmas(conn, busy_timeout));
        let pool = Pool::builder().max_size(max_size).build(manager)?;

        {
            let conn = pool.get()?;
            initialize_schema(&conn)?;
        }

        tracing::info!(
            path = %path.display(),
            pool_size = max_size,
            duration_ms = started_at.elapsed().as_millis() as u64,
            "Database opened"
        );
        Ok(Self { pool })
    }

    /// Take a connection out of the pool.
    pub fn acquire(&self) -> StorageResult<SqliteConnection> {
        Ok(self.pool.get()?)
    }

    /// A gateway that will borrow a connection on first use.
    pub fn gateway(&self) -> Gateway {
        Gateway::new(self.clone())
    }

    /// Run `f` against a fresh gateway on the blocking thread pool.
    ///
    /// The gateway and any connection it acquired are dropped when `f`
    /// returns, whatever the outcome.
    pub async fn run<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&mut Gateway) -> StorageResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let mut gateway = self.gateway();
        tokio::task::spawn_blocking(move || f(&mut gateway))
            .await
            .map_err(StorageError::Task)?
    }

    /// Current pool state for monitoring.
    pub fn state(&self) -> r2d2::State {
        self.pool.state()
    }
}
