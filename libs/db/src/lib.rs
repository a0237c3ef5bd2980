//! SQLite connection handle shared by the server and its modules.
//!
//! `DbHandle` owns one sqlx pool and a SeaORM connection built on top of it.
//! Every pooled connection gets the same PRAGMAs, so foreign keys (and with
//! them `ON DELETE CASCADE`) behave identically no matter which connection a
//! query lands on.
//!
//! # Example
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> db::Result<()> {
//!     use db::{ConnectOpts, DbHandle};
//!     use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};
//!
//!     let db = DbHandle::connect("sqlite::memory:", ConnectOpts::default()).await?;
//!     db.sea()
//!         .execute(Statement::from_string(DatabaseBackend::Sqlite, "SELECT 1"))
//!         .await?;
//!     db.close().await;
//!     Ok(())
//! }
//! ```

pub mod errors;

use std::time::Duration;

use sea_orm::{DatabaseConnection, SqlxSqliteConnector};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use thiserror::Error;

/// Library-local result type.
pub type Result<T> = std::result::Result<T, DbError>;

/// Typed error for the DB handle and helpers.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Unsupported DSN (only sqlite is available): {0}")]
    UnsupportedDsn(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Sea(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Connection options.
#[derive(Clone, Debug)]
pub struct ConnectOpts {
    /// Maximum number of connections in the pool. In-memory databases always use one.
    pub max_conns: Option<u32>,
    /// Minimum number of connections in the pool.
    pub min_conns: Option<u32>,
    /// Timeout to acquire a connection from the pool.
    pub acquire_timeout: Option<Duration>,
    /// Idle timeout before a connection is closed.
    pub idle_timeout: Option<Duration>,
    /// Busy timeout applied through `PRAGMA busy_timeout`.
    pub sqlite_busy_timeout: Option<Duration>,
    /// Create parent directories of file DSNs when missing.
    pub create_sqlite_dirs: bool,
}

impl Default for ConnectOpts {
    fn default() -> Self {
        Self {
            max_conns: Some(10),
            min_conns: None,
            acquire_timeout: Some(Duration::from_secs(30)),
            idle_timeout: None,
            sqlite_busy_timeout: Some(Duration::from_millis(5_000)),
            create_sqlite_dirs: true,
        }
    }
}

/// Main handle.
pub struct DbHandle {
    pool: SqlitePool,
    dsn: String,
    sea: DatabaseConnection,
}

impl DbHandle {
    /// True for DSNs that name a private in-memory database.
    pub fn is_memory_dsn(dsn: &str) -> bool {
        let s = dsn.trim();
        s.eq_ignore_ascii_case("sqlite::memory:")
            || s.eq_ignore_ascii_case("sqlite://:memory:")
            || s.contains("mode=memory")
    }

    /// Connect and build handle.
    pub async fn connect(dsn: &str, opts: ConnectOpts) -> Result<Self> {
        let dsn = dsn.trim_start();
        if !(dsn.starts_with("sqlite:") || dsn.starts_with("sqlite://")) {
            return Err(DbError::UnsupportedDsn(dsn.to_string()));
        }
        let dsn = prepare_sqlite_path(dsn, opts.create_sqlite_dirs)?;

        let mut o = SqlitePoolOptions::new();
        if Self::is_memory_dsn(&dsn) {
            // Each new connection to ":memory:" would see an empty database.
            o = o.max_connections(1).min_connections(1);
        } else {
            if let Some(n) = opts.max_conns {
                o = o.max_connections(n);
            }
            if let Some(n) = opts.min_conns {
                o = o.min_connections(n);
            }
        }
        if let Some(t) = opts.acquire_timeout {
            o = o.acquire_timeout(t);
        }
        if let Some(t) = opts.idle_timeout {
            o = o.idle_timeout(t);
        }

        let busy = opts.sqlite_busy_timeout;
        o = o.after_connect(move |conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA foreign_keys = ON")
                    .execute(&mut *conn)
                    .await?;
                sqlx::query("PRAGMA journal_mode = WAL")
                    .execute(&mut *conn)
                    .await?;
                sqlx::query("PRAGMA synchronous = NORMAL")
                    .execute(&mut *conn)
                    .await?;
                if let Some(ms) = busy {
                    // PRAGMA can't use bind parameters; use a numeric literal.
                    let ms = i64::try_from(ms.as_millis()).unwrap_or(i64::MAX);
                    sqlx::query(&format!("PRAGMA busy_timeout = {ms}"))
                        .execute(&mut *conn)
                        .await?;
                }
                Ok(())
            })
        });

        let pool = o.connect(&dsn).await?;
        let sea = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool.clone());

        tracing::debug!(dsn = %dsn, "sqlite pool ready");
        Ok(Self { pool, dsn, sea })
    }

    /// Graceful pool close.
    pub async fn close(self) {
        self.pool.close().await;
    }

    /// DSN the pool was opened with (after path preparation).
    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    pub fn sqlx_sqlite(&self) -> &SqlitePool {
        &self.pool
    }

    /// Get SeaORM connection (clone; cheap handle).
    pub fn sea(&self) -> DatabaseConnection {
        self.sea.clone()
    }
}

fn prepare_sqlite_path(dsn: &str, create_dirs: bool) -> Result<String> {
    if !create_dirs || DbHandle::is_memory_dsn(dsn) {
        return Ok(dsn.to_string());
    }

    // Handles "sqlite:/path" and "sqlite://path". URI forms like
    // "sqlite:file:name?..." have no directory to create.
    let raw = dsn
        .strip_prefix("sqlite://")
        .or_else(|| dsn.strip_prefix("sqlite:"))
        .unwrap_or(dsn);

    if !raw.starts_with("file:") && !raw.contains('?') {
        if let Some(parent) = std::path::Path::new(raw).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
    }

    // sqlx refuses to open a missing file unless asked to create it.
    if raw.contains('?') {
        Ok(dsn.to_string())
    } else {
        Ok(format!("{dsn}?mode=rwc"))
    }
}
