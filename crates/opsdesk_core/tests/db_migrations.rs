use opsdesk_core::db::migrations::{current_user_version, latest_version};
use opsdesk_core::{open_pool, open_pool_in_memory, CoreConfig, DbError, KIND_CONFIGS};
use rusqlite::Connection;

fn file_config(path: std::path::PathBuf) -> CoreConfig {
    CoreConfig {
        db_path: path,
        pool_size: 2,
        ..CoreConfig::default()
    }
}

#[test]
fn open_pool_in_memory_applies_all_migrations() {
    let pool = open_pool_in_memory().unwrap();
    let conn = pool.get().unwrap();

    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    for config in KIND_CONFIGS {
        assert_table_exists(&conn, config.table);
    }
}

#[test]
fn pooled_connections_enforce_foreign_keys() {
    let pool = open_pool_in_memory().unwrap();
    let conn = pool.get().unwrap();

    let enabled: i64 = conn
        .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(enabled, 1);
}

#[test]
fn timestamps_are_checked_by_the_schema() {
    let pool = open_pool_in_memory().unwrap();
    let conn = pool.get().unwrap();

    let result = conn.execute(
        "INSERT INTO epics (id, created_at, updated_at, body) VALUES ('x', 10, 5, '{}');",
        [],
    );
    assert!(result.is_err());
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("opsdesk.sqlite3");

    let first = open_pool(&file_config(path.clone())).unwrap();
    assert_eq!(
        current_user_version(&first.get().unwrap()).unwrap(),
        latest_version()
    );
    drop(first);

    let second = open_pool(&file_config(path)).unwrap();
    let conn = second.get().unwrap();
    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    assert_table_exists(&conn, "epics");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_pool(&file_config(path)).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
