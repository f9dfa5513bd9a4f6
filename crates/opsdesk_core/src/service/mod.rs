//! Core use-case services.
//!
//! # Responsibility
//! - Layer the shared CRUD contract over one store per resource kind.
//! - Keep endpoint/transport layers decoupled from storage details.

pub mod clock;
pub mod resource_service;
