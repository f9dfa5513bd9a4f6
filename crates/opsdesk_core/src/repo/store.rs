//! Store contract shared by every resource kind.
//!
//! # Responsibility
//! - Define the durable CRUD primitives a resource service builds on.
//! - Define the storage error taxonomy.
//!
//! # Invariants
//! - Absence on point lookup is `Ok(None)`, never an error.
//! - A write that matches no row fails with `StorageError::Vanished`.
//! - Stores enforce no business rules (timestamps, existence checks).

use crate::db::DbError;
use crate::kind::{KindConfig, OrderField, ResourceKind};
use crate::model::record::{NewRecord, Record, RecordId};
use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("failed to encode or decode {kind} fields: {source}")]
    Codec {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid persisted {kind} data: {message}")]
    InvalidData { kind: &'static str, message: String },
    #[error("{kind} {id} vanished before the write was applied")]
    Vanished { kind: &'static str, id: RecordId },
}

impl StorageError {
    /// Returns whether the underlying engine rejected the write on a
    /// unique, foreign-key or check constraint.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::Db(err) if err.is_constraint_violation())
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<r2d2::Error> for StorageError {
    fn from(value: r2d2::Error) -> Self {
        Self::Db(DbError::Pool(value))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Ordering and truncation for one list scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    pub order_by: OrderField,
    pub direction: SortDirection,
    /// `None` returns every row.
    pub limit: Option<u32>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            order_by: OrderField::CreatedAt,
            direction: SortDirection::Descending,
            limit: None,
        }
    }
}

impl ListQuery {
    /// The `find_all` query for a kind: its ordering field, descending,
    /// truncated to its page cap.
    pub fn for_kind(config: &KindConfig) -> Self {
        Self {
            order_by: config.order_by,
            direction: SortDirection::Descending,
            limit: config.page_cap.limit(),
        }
    }
}

/// Durable CRUD primitives for one resource kind.
pub trait Store<K: ResourceKind>: Send + Sync {
    /// Persists a new record and returns it with its store-assigned id.
    fn insert(&self, record: NewRecord<K::Fields>) -> StorageResult<Record<K::Fields>>;
    /// Point lookup by id.
    fn get_by_id(&self, id: RecordId) -> StorageResult<Option<Record<K::Fields>>>;
    /// Ordered, optionally truncated scan. Re-running it re-queries storage.
    fn list(&self, query: &ListQuery) -> StorageResult<Vec<Record<K::Fields>>>;
    /// Overwrites `updated_at` and fields of an existing record.
    ///
    /// `created_at` is never written.
    fn update_in_place(&self, record: &Record<K::Fields>) -> StorageResult<Record<K::Fields>>;
    /// Removes a record. Callers confirm existence first.
    fn delete(&self, id: RecordId) -> StorageResult<()>;
}

#[cfg(test)]
mod tests {
    use super::{ListQuery, SortDirection, StorageError};
    use crate::kind::{configs, OrderField};
    use uuid::Uuid;

    #[test]
    fn kind_query_uses_config_cap_and_descending_order() {
        let capped = ListQuery::for_kind(&configs::AUDIT_LOG);
        assert_eq!(capped.limit, Some(100));
        assert_eq!(capped.direction, SortDirection::Descending);
        assert_eq!(capped.order_by, OrderField::CreatedAt);

        let unbounded = ListQuery::for_kind(&configs::EPIC);
        assert_eq!(unbounded.limit, None);
    }

    #[test]
    fn vanished_is_not_a_constraint_violation() {
        let err = StorageError::Vanished {
            kind: "epic",
            id: Uuid::nil(),
        };
        assert!(!err.is_constraint_violation());
        assert!(err.to_string().contains("epic"));
    }
}
