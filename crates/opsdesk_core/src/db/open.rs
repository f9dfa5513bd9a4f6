//! Connection pool bootstrap for SQLite.
//!
//! # Responsibility
//! - Build file or in-memory connection pools.
//! - Configure per-connection pragmas required by core behavior.
//! - Run schema migrations before returning a usable pool.
//!
//! # Invariants
//! - Every pooled connection has `foreign_keys=ON` and a busy timeout.
//! - Returned pools have migrations fully applied.
//! - In-memory pools hold exactly one connection, because each SQLite
//!   memory connection is its own database.

use super::migrations::apply_migrations;
use super::{DbPool, DbResult};
use crate::config::CoreConfig;
use log::{error, info};
use r2d2_sqlite::SqliteConnectionManager;
use std::time::{Duration, Instant};

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the SQLite database at `config.db_path` and applies pending migrations.
///
/// # Side effects
/// - Performs pool bootstrap and migration checks.
/// - Emits `db_open` logging events with duration and status.
pub fn open_pool(config: &CoreConfig) -> DbResult<DbPool> {
    let started_at = Instant::now();
    info!(
        "event=db_open module=db status=start mode=file pool_size={}",
        config.pool_size
    );

    let manager = SqliteConnectionManager::file(&config.db_path)
        .with_init(connection_init(config.busy_timeout));
    let builder = r2d2::Pool::builder().max_size(config.pool_size);
    finish_open(builder, manager, "file", started_at)
}

/// Opens a single-connection in-memory database and applies all migrations.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_pool_in_memory() -> DbResult<DbPool> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=memory pool_size=1");

    let manager =
        SqliteConnectionManager::memory().with_init(connection_init(DEFAULT_BUSY_TIMEOUT));
    // The single connection is the database; it must never be recycled.
    let builder = r2d2::Pool::builder()
        .max_size(1)
        .idle_timeout(None)
        .max_lifetime(None);
    finish_open(builder, manager, "memory", started_at)
}

fn finish_open(
    builder: r2d2::Builder<SqliteConnectionManager>,
    manager: SqliteConnectionManager,
    mode: &str,
    started_at: Instant,
) -> DbResult<DbPool> {
    let pool = match builder.build(manager) {
        Ok(pool) => pool,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_pool_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match migrate(&pool) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(pool)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn migrate(pool: &DbPool) -> DbResult<()> {
    let mut conn = pool.get()?;
    apply_migrations(&mut conn)
}

fn connection_init(
    busy_timeout: Duration,
) -> impl Fn(&mut rusqlite::Connection) -> rusqlite::Result<()> + Send + Sync + 'static {
    move |conn| {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(busy_timeout)
    }
}
