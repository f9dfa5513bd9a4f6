//! Domain model: the shared record envelope and every resource kind's fields.
//!
//! # Responsibility
//! - Define the record shape common to all kinds.
//! - Define per-kind field and patch shapes; the core never interprets them.
//!
//! # Invariants
//! - Every record is identified by a stable `RecordId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod operations;
pub mod patch;
pub mod people;
pub mod record;
pub mod work;
