//! Core domain logic for OpsDesk.
//! This crate is the single source of truth for the resource CRUD contract.

pub mod config;
pub mod db;
pub mod kind;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use db::{open_pool, open_pool_in_memory, DbError, DbPool};
pub use kind::{
    find_config, KindConfig, OrderField, PageCap, ParentRef, ResourceKind, HIGH_VOLUME_PAGE_CAP,
    KIND_CONFIGS,
};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::operations::{
    AuditLog, AuditLogKind, AuditLogPatch, DataMigration, DataMigrationKind, DataMigrationPatch,
    KpiMetric, KpiMetricKind, KpiMetricPatch, LogLevel, RequestStatus, ServiceRequest,
    ServiceRequestKind, ServiceRequestPatch, SlaPolicy, SlaPolicyKind, SlaPolicyPatch,
};
pub use model::people::{
    ChatMessage, ChatMessageKind, ChatMessagePatch, Notification, NotificationKind,
    NotificationPatch, Session, SessionKind, SessionPatch, TimeSheet, TimeSheetKind,
    TimeSheetPatch, User, UserKind, UserPatch,
};
pub use model::record::{NewRecord, ParentRecord, Record, RecordId, Timestamp};
pub use model::work::{
    Epic, EpicKind, EpicPatch, Portfolio, PortfolioKind, PortfolioPatch, Release, ReleaseKind,
    ReleasePatch, Sprint, SprintKind, SprintPatch, Team, TeamKind, TeamPatch, WorkStatus,
};
pub use repo::sqlite_store::SqliteStore;
pub use repo::store::{ListQuery, SortDirection, StorageError, StorageResult, Store};
pub use service::clock::{Clock, SystemClock};
pub use service::resource_service::{
    CoreError, CoreResult, ResourceService, SqliteResourceService,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
