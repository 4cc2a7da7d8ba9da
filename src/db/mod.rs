pub mod migrate;
pub mod operations;

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;

/// Shared handle to the SQLite store. Cheap to clone; every clone uses the same pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self, DbInitError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| DbInitError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await?;

        tracing::debug!(path = %path.display(), "sqlite pool ready");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[derive(Debug, Error)]
pub enum DbInitError {
    #[error("error creating database directory {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("error opening database: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// A failed store operation, tagged with what the repository was doing at the time.
#[derive(Debug, Error)]
#[error("error {context}: {source}")]
pub struct StoreError {
    context: &'static str,
    #[source]
    source: sqlx::Error,
}

impl StoreError {
    pub fn new(context: &'static str, source: sqlx::Error) -> Self {
        Self { context, source }
    }

    pub fn context(&self) -> &'static str {
        self.context
    }

    pub fn source_error(&self) -> &sqlx::Error {
        &self.source
    }

    pub fn is_row_not_found(&self) -> bool {
        matches!(self.source, sqlx::Error::RowNotFound)
    }
}

pub trait StoreContext<T> {
    fn context(self, context: &'static str) -> Result<T, StoreError>;
}

impl<T> StoreContext<T> for Result<T, sqlx::Error> {
    fn context(self, context: &'static str) -> Result<T, StoreError> {
        self.map_err(|source| StoreError::new(context, source))
    }
}

/// The single row produced by an `INSERT ... RETURNING`.
///
/// Callers fetch these with `fetch_all` so SQLite steps the statement to
/// completion and the implicit write transaction ends before the connection
/// returns to the pool. A row left unread keeps the insert invisible to every
/// other connection.
pub fn returned_row<T>(rows: Vec<T>, context: &'static str) -> Result<T, StoreError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| StoreError::new(context, sqlx::Error::RowNotFound))
}
