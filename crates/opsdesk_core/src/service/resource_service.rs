//! Generic resource service: the CRUD contract every kind shares.
//!
//! # Responsibility
//! - Stamp timestamps, confirm existence, apply list policy and merge
//!   partial updates, identically for every resource kind.
//! - Translate store-level absence into `CoreError::NotFound` exactly once.
//!
//! # Invariants
//! - `create` sets `created_at == updated_at == now`; ids never come from input.
//! - `update` never moves `updated_at` backwards and never touches `created_at`.
//! - `find_all` uses the kind's ordering field, descending, capped per kind.
//! - `update`/`remove` are check-then-mutate; a record deleted between the
//!   two steps is reported as `NotFound`.

use crate::kind::{KindConfig, ResourceKind};
use crate::model::record::{NewRecord, Record, RecordId};
use crate::repo::sqlite_store::SqliteStore;
use crate::repo::store::{ListQuery, StorageError, Store};
use crate::service::clock::{Clock, SystemClock};
use log::{info, warn};
use serde_json::{Map, Value};
use std::marker::PhantomData;
use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: RecordId },
    #[error("invalid {kind} patch: {message}")]
    InvalidPatch { kind: &'static str, message: String },
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl CoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// The shared CRUD contract over one kind's store.
pub struct ResourceService<K, S, C = SystemClock> {
    store: S,
    clock: C,
    _kind: PhantomData<fn() -> K>,
}

/// Resource service backed by the SQLite store and wall-clock time.
pub type SqliteResourceService<K> = ResourceService<K, SqliteStore<K>>;

impl<K: ResourceKind, S: Store<K>> ResourceService<K, S, SystemClock> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<K: ResourceKind, S: Store<K>, C: Clock> ResourceService<K, S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            _kind: PhantomData,
        }
    }

    pub fn config(&self) -> KindConfig {
        K::CONFIG
    }

    /// Creates a record from `input` with fresh, equal timestamps.
    pub fn create(&self, input: K::Fields) -> CoreResult<Record<K::Fields>> {
        let now = self.clock.now_ms();
        let record = self.store.insert(NewRecord::stamped(input, now))?;
        info!(
            "event=record_create module=service status=ok kind={} id={}",
            K::CONFIG.name,
            record.id
        );
        Ok(record)
    }

    /// Lists records newest first, truncated to the kind's page cap.
    pub fn find_all(&self) -> CoreResult<Vec<Record<K::Fields>>> {
        let records = self.store.list(&ListQuery::for_kind(&K::CONFIG))?;
        Ok(records)
    }

    /// Loads one record, failing with `NotFound` when absent.
    pub fn find_one(&self, id: RecordId) -> CoreResult<Record<K::Fields>> {
        self.store
            .get_by_id(id)?
            .ok_or(CoreError::NotFound {
                kind: K::CONFIG.name,
                id,
            })
    }

    /// Shallow-merges `patch` over the stored fields and re-stamps `updated_at`.
    ///
    /// Fields absent from `patch` keep their stored value; nested values in
    /// `patch` replace the stored ones wholesale.
    pub fn update(&self, id: RecordId, patch: K::Patch) -> CoreResult<Record<K::Fields>> {
        let mut record = self.find_one(id)?;
        record.fields = merge_patch::<K>(&record.fields, &patch)?;
        record.touch(self.clock.now_ms());

        let updated = self
            .store
            .update_in_place(&record)
            .map_err(|err| self.vanished_as_not_found(err))?;
        info!(
            "event=record_update module=service status=ok kind={} id={}",
            K::CONFIG.name,
            id
        );
        Ok(updated)
    }

    /// Deletes a record after confirming it exists.
    pub fn remove(&self, id: RecordId) -> CoreResult<()> {
        self.find_one(id)?;
        self.store
            .delete(id)
            .map_err(|err| self.vanished_as_not_found(err))?;
        info!(
            "event=record_remove module=service status=ok kind={} id={}",
            K::CONFIG.name,
            id
        );
        Ok(())
    }

    fn vanished_as_not_found(&self, err: StorageError) -> CoreError {
        match err {
            StorageError::Vanished { kind, id } => {
                warn!(
                    "event=record_vanished module=service status=error kind={} id={}",
                    kind, id
                );
                CoreError::NotFound { kind, id }
            }
            other => CoreError::Storage(other),
        }
    }
}

/// Overlays the keys present in `patch` onto `current`, one level deep.
fn merge_patch<K: ResourceKind>(current: &K::Fields, patch: &K::Patch) -> CoreResult<K::Fields> {
    let kind = K::CONFIG.name;
    let invalid = |message: String| CoreError::InvalidPatch { kind, message };

    let mut merged = match serde_json::to_value(current) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return Err(invalid("stored fields are not an object".to_string())),
        Err(source) => return Err(StorageError::Codec { kind, source }.into()),
    };
    let changes: Map<String, Value> = match serde_json::to_value(patch) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return Err(invalid("patch is not an object".to_string())),
        Err(err) => return Err(invalid(err.to_string())),
    };

    for (key, value) in changes {
        merged.insert(key, value);
    }

    serde_json::from_value(Value::Object(merged)).map_err(|err| invalid(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::merge_patch;
    use crate::model::operations::{AuditLog, AuditLogKind, AuditLogPatch, LogLevel};
    use crate::model::work::{Epic, EpicKind, EpicPatch, WorkStatus};
    use serde_json::json;

    fn epic() -> Epic {
        Epic {
            title: "Billing revamp".to_string(),
            description: Some("Q3 scope".to_string()),
            status: WorkStatus::Backlog,
            labels: vec!["billing".to_string()],
        }
    }

    #[test]
    fn empty_patch_leaves_fields_unchanged() {
        let merged = merge_patch::<EpicKind>(&epic(), &EpicPatch::default()).unwrap();
        assert_eq!(merged, epic());
    }

    #[test]
    fn supplied_fields_replace_stored_ones() {
        let patch = EpicPatch {
            status: Some(WorkStatus::InProgress),
            ..EpicPatch::default()
        };
        let merged = merge_patch::<EpicKind>(&epic(), &patch).unwrap();
        assert_eq!(merged.status, WorkStatus::InProgress);
        assert_eq!(merged.title, "Billing revamp");
        assert_eq!(merged.description.as_deref(), Some("Q3 scope"));
    }

    #[test]
    fn explicit_null_clears_nullable_field() {
        let patch: EpicPatch = serde_json::from_value(json!({ "description": null })).unwrap();
        let merged = merge_patch::<EpicKind>(&epic(), &patch).unwrap();
        assert_eq!(merged.description, None);
        assert_eq!(merged.labels, vec!["billing".to_string()]);
    }

    #[test]
    fn nested_values_are_replaced_not_merged() {
        let stored = AuditLog {
            level: LogLevel::Info,
            source: "billing".to_string(),
            message: "invoice sent".to_string(),
            context: json!({ "invoice": 7, "retries": { "count": 1 } }),
        };
        let patch = AuditLogPatch {
            context: Some(json!({ "retries": { "last": "timeout" } })),
            ..AuditLogPatch::default()
        };
        let merged = merge_patch::<AuditLogKind>(&stored, &patch).unwrap();
        assert_eq!(merged.context, json!({ "retries": { "last": "timeout" } }));
        assert_eq!(merged.message, "invoice sent");
    }

    #[test]
    fn explicit_null_replaces_json_valued_field() {
        let stored = AuditLog {
            level: LogLevel::Warn,
            source: "sync".to_string(),
            message: "retrying".to_string(),
            context: json!({ "a": 1 }),
        };
        let patch: AuditLogPatch = serde_json::from_value(json!({ "context": null })).unwrap();
        let merged = merge_patch::<AuditLogKind>(&stored, &patch).unwrap();
        assert_eq!(merged.context, serde_json::Value::Null);
        assert_eq!(merged.source, "sync");
    }

    #[test]
    fn null_for_required_field_fails_to_decode() {
        assert!(serde_json::from_value::<EpicPatch>(json!({ "title": null })).is_err());
        assert!(serde_json::from_value::<AuditLogPatch>(json!({ "level": null })).is_err());
    }
}
