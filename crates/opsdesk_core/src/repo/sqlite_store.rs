//! SQLite implementation of the resource store.
//!
//! # Responsibility
//! - Keep SQL details for every kind inside one generic store.
//! - Resolve parent references with a join for kinds that declare one.
//!
//! # Invariants
//! - Each call checks out exactly one pooled connection and holds it until
//!   the call returns.
//! - Writes and their read-back share one immediate transaction, so a
//!   committed write always returns the row it wrote.
//! - Ties on the ordering column are broken by insertion sequence in the
//!   same direction, so repeated scans are stable.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::DbPool;
use crate::kind::ResourceKind;
use crate::model::record::{NewRecord, ParentRecord, Record, RecordId};
use crate::repo::store::{ListQuery, StorageError, StorageResult, Store};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, TransactionBehavior};
use std::marker::PhantomData;
use uuid::Uuid;

/// Generic SQLite store over the shared connection pool.
pub struct SqliteStore<K> {
    pool: DbPool,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ResourceKind> SqliteStore<K> {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            _kind: PhantomData,
        }
    }

    fn select_sql() -> String {
        let table = K::CONFIG.table;
        match K::CONFIG.parent {
            Some(parent) => format!(
                "SELECT
                    r.id,
                    r.created_at,
                    r.updated_at,
                    r.body,
                    p.id AS parent_ref_id,
                    p.created_at AS parent_created_at,
                    p.updated_at AS parent_updated_at,
                    p.body AS parent_body
                 FROM {table} r
                 LEFT JOIN {parent_table} p ON p.id = r.parent_id",
                parent_table = parent.table
            ),
            None => format!(
                "SELECT
                    r.id,
                    r.created_at,
                    r.updated_at,
                    r.body,
                    NULL AS parent_ref_id,
                    NULL AS parent_created_at,
                    NULL AS parent_updated_at,
                    NULL AS parent_body
                 FROM {table} r"
            ),
        }
    }

    fn fetch_one(conn: &Connection, id: RecordId) -> StorageResult<Option<Record<K::Fields>>> {
        let sql = format!("{} WHERE r.id = ?1;", Self::select_sql());
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_record_row::<K>(row)?));
        }

        Ok(None)
    }

    fn encode(fields: &K::Fields) -> StorageResult<String> {
        serde_json::to_string(fields).map_err(|source| StorageError::Codec {
            kind: K::CONFIG.name,
            source,
        })
    }

    fn vanished(id: RecordId) -> StorageError {
        StorageError::Vanished {
            kind: K::CONFIG.name,
            id,
        }
    }
}

impl<K: ResourceKind> Store<K> for SqliteStore<K> {
    fn insert(&self, record: NewRecord<K::Fields>) -> StorageResult<Record<K::Fields>> {
        let id = Uuid::new_v4();
        let body = Self::encode(&record.fields)?;
        let parent_id = K::parent_id(&record.fields).map(|parent| parent.to_string());

        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            &format!(
                "INSERT INTO {} (
                    id,
                    created_at,
                    updated_at,
                    parent_id,
                    body
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
                K::CONFIG.table
            ),
            params![
                id.to_string(),
                record.created_at,
                record.updated_at,
                parent_id,
                body
            ],
        )?;
        let inserted = Self::fetch_one(&tx, id)?.ok_or_else(|| Self::vanished(id))?;
        tx.commit()?;
        debug!(
            "event=record_insert module=repo status=ok kind={} id={}",
            K::CONFIG.name,
            id
        );

        Ok(inserted)
    }

    fn get_by_id(&self, id: RecordId) -> StorageResult<Option<Record<K::Fields>>> {
        let conn = self.pool.get()?;
        Self::fetch_one(&conn, id)
    }

    fn list(&self, query: &ListQuery) -> StorageResult<Vec<Record<K::Fields>>> {
        let direction = query.direction.keyword();
        let mut sql = format!(
            "{} ORDER BY r.{} {direction}, r.seq {direction}",
            Self::select_sql(),
            query.order_by.column()
        );
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record_row::<K>(row)?);
        }

        Ok(records)
    }

    fn update_in_place(&self, record: &Record<K::Fields>) -> StorageResult<Record<K::Fields>> {
        let body = Self::encode(&record.fields)?;
        let parent_id = K::parent_id(&record.fields).map(|parent| parent.to_string());

        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            &format!(
                "UPDATE {}
                 SET
                    updated_at = ?1,
                    parent_id = ?2,
                    body = ?3
                 WHERE id = ?4;",
                K::CONFIG.table
            ),
            params![record.updated_at, parent_id, body, record.id.to_string()],
        )?;

        if changed == 0 {
            return Err(Self::vanished(record.id));
        }
        let updated =
            Self::fetch_one(&tx, record.id)?.ok_or_else(|| Self::vanished(record.id))?;
        tx.commit()?;
        debug!(
            "event=record_update module=repo status=ok kind={} id={}",
            K::CONFIG.name,
            record.id
        );

        Ok(updated)
    }

    fn delete(&self, id: RecordId) -> StorageResult<()> {
        let conn = self.pool.get()?;
        let changed = conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1;", K::CONFIG.table),
            [id.to_string()],
        )?;

        if changed == 0 {
            return Err(Self::vanished(id));
        }
        debug!(
            "event=record_delete module=repo status=ok kind={} id={}",
            K::CONFIG.name,
            id
        );

        Ok(())
    }
}

fn parse_record_row<K: ResourceKind>(row: &Row<'_>) -> StorageResult<Record<K::Fields>> {
    let kind = K::CONFIG.name;
    let id_text: String = row.get("id")?;
    let id = parse_id(kind, "id", &id_text)?;

    let body: String = row.get("body")?;
    let fields = serde_json::from_str(&body)
        .map_err(|source| StorageError::Codec { kind, source })?;

    let parent = match row.get::<_, Option<String>>("parent_ref_id")? {
        Some(parent_text) => {
            let parent_body: String = row.get("parent_body")?;
            let parent_fields = serde_json::from_str(&parent_body)
                .map_err(|source| StorageError::Codec { kind, source })?;
            Some(ParentRecord {
                id: parse_id(kind, "parent_id", &parent_text)?,
                created_at: row.get("parent_created_at")?,
                updated_at: row.get("parent_updated_at")?,
                fields: parent_fields,
            })
        }
        None => None,
    };

    let record = Record {
        id,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        fields,
        parent,
    };
    if record.created_at > record.updated_at {
        return Err(StorageError::InvalidData {
            kind,
            message: format!("created_at is after updated_at for {}", record.id),
        });
    }
    Ok(record)
}

fn parse_id(kind: &'static str, column: &str, text: &str) -> StorageResult<RecordId> {
    Uuid::parse_str(text).map_err(|_| StorageError::InvalidData {
        kind,
        message: format!("invalid uuid value `{text}` in {column}"),
    })
}
