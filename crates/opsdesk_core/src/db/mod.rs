//! SQLite storage bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Build the shared SQLite connection pool used by every resource store.
//! - Apply schema migrations in deterministic order.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - No store reads or writes application data before migrations succeed.
//! - Every pooled connection has `foreign_keys=ON`.

use r2d2_sqlite::SqliteConnectionManager;
use thiserror::Error;

pub mod migrations;
mod open;

pub use open::{open_pool, open_pool_in_memory};

/// Connection pool shared across all resource kinds and concurrent callers.
pub type DbPool = r2d2::Pool<SqliteConnectionManager>;

/// One connection checked out of [`DbPool`].
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    /// Returns whether this error is a SQLite constraint violation
    /// (unique, foreign key, check).
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Self::Sqlite(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}
