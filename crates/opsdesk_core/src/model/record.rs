//! Record envelope shared by every resource kind.
//!
//! # Responsibility
//! - Carry identity and audit timestamps around kind-specific fields.
//! - Carry the eagerly resolved parent for kinds that declare one.
//!
//! # Invariants
//! - `id` is minted by the store at insert time and never reused.
//! - `created_at <= updated_at`.
//! - `created_at` never changes after insert.

use serde::Serialize;
use uuid::Uuid;

/// Stable identifier of one record within its kind.
pub type RecordId = Uuid;

/// Unix epoch milliseconds.
pub type Timestamp = i64;

/// A persisted record of one resource kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<F> {
    pub id: RecordId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(flatten)]
    pub fields: F,
    /// Present only for kinds with a parent reference whose parent row exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<ParentRecord>,
}

/// Parent record embedded by eager resolution.
///
/// Fields are kept as a JSON document: the referencing kind reads the parent
/// but never owns or writes it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentRecord {
    pub id: RecordId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(flatten)]
    pub fields: serde_json::Value,
}

/// A record that has not been inserted yet.
///
/// Carries no id: identity is assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord<F> {
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub fields: F,
}

impl<F> NewRecord<F> {
    /// Stamps a fresh record with `created_at == updated_at == now`.
    pub fn stamped(fields: F, now: Timestamp) -> Self {
        Self {
            created_at: now,
            updated_at: now,
            fields,
        }
    }
}

impl<F> Record<F> {
    /// Re-stamps `updated_at`, never moving it backwards.
    pub fn touch(&mut self, now: Timestamp) {
        self.updated_at = now.max(self.updated_at);
    }
}
