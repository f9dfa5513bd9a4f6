//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the store contract every resource kind persists through.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Stores report absence as `None`, never as an error.
//! - Stores return storage errors (`StorageError`) unchanged to services.

pub mod sqlite_store;
pub mod store;
