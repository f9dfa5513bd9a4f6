//! Resource kind contract and the per-kind configuration table.
//!
//! # Responsibility
//! - Describe what varies between resource kinds: field shape, table,
//!   page cap, ordering field and parent reference.
//! - Hold every kind's configuration in one table so list policy can be
//!   checked across kinds from a single source.
//!
//! # Invariants
//! - Every kind orders `find_all` by its configured field, descending.
//! - High-volume kinds are capped at [`HIGH_VOLUME_PAGE_CAP`] records per list.
//! - A parent reference always targets another configured kind.

use crate::model::record::RecordId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Page cap applied to kinds expected to grow without bound.
pub const HIGH_VOLUME_PAGE_CAP: u32 = 100;

/// Maximum number of records returned by one `find_all` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCap {
    Capped(u32),
    Unbounded,
}

impl PageCap {
    /// Returns the SQL-level limit, `None` when unbounded.
    pub fn limit(self) -> Option<u32> {
        match self {
            Self::Capped(limit) => Some(limit),
            Self::Unbounded => None,
        }
    }
}

/// Timestamp column a list is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    CreatedAt,
    UpdatedAt,
}

impl OrderField {
    pub fn column(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

/// Non-owning reference from one kind to a record of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParentRef {
    /// Name the resolved parent is exposed under (e.g. `owner`).
    pub relation: &'static str,
    /// Kind name of the referenced records.
    pub kind: &'static str,
    /// Table holding the referenced records.
    pub table: &'static str,
}

/// Static configuration of one resource kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindConfig {
    pub name: &'static str,
    pub table: &'static str,
    pub page_cap: PageCap,
    pub order_by: OrderField,
    pub parent: Option<ParentRef>,
}

/// The per-kind configuration table.
pub mod configs {
    use super::{KindConfig, OrderField, PageCap, ParentRef, HIGH_VOLUME_PAGE_CAP};

    const fn low_cardinality(name: &'static str, table: &'static str) -> KindConfig {
        KindConfig {
            name,
            table,
            page_cap: PageCap::Unbounded,
            order_by: OrderField::CreatedAt,
            parent: None,
        }
    }

    const fn high_volume(name: &'static str, table: &'static str) -> KindConfig {
        KindConfig {
            name,
            table,
            page_cap: PageCap::Capped(HIGH_VOLUME_PAGE_CAP),
            order_by: OrderField::CreatedAt,
            parent: None,
        }
    }

    const fn user_ref(relation: &'static str) -> Option<ParentRef> {
        Some(ParentRef {
            relation,
            kind: USER.name,
            table: USER.table,
        })
    }

    pub const EPIC: KindConfig = low_cardinality("epic", "epics");
    pub const SPRINT: KindConfig = low_cardinality("sprint", "sprints");
    pub const RELEASE: KindConfig = low_cardinality("release", "releases");
    pub const TEAM: KindConfig = low_cardinality("team", "teams");
    pub const PORTFOLIO: KindConfig = KindConfig {
        parent: user_ref("owner"),
        ..low_cardinality("portfolio", "portfolios")
    };

    pub const USER: KindConfig = high_volume("user", "users");
    pub const SESSION: KindConfig = KindConfig {
        parent: user_ref("user"),
        ..high_volume("session", "sessions")
    };
    pub const AUDIT_LOG: KindConfig = high_volume("audit_log", "audit_logs");
    pub const CHAT_MESSAGE: KindConfig = high_volume("chat_message", "chat_messages");
    pub const NOTIFICATION: KindConfig = high_volume("notification", "notifications");
    pub const TIME_SHEET: KindConfig = high_volume("time_sheet", "time_sheets");
    pub const KPI_METRIC: KindConfig = high_volume("kpi_metric", "kpi_metrics");
    pub const SLA_POLICY: KindConfig = high_volume("sla_policy", "sla_policies");
    pub const SERVICE_REQUEST: KindConfig = high_volume("service_request", "service_requests");
    pub const DATA_MIGRATION: KindConfig = high_volume("data_migration", "data_migrations");
}

/// Every configured resource kind, in registration order.
pub const KIND_CONFIGS: &[KindConfig] = &[
    configs::EPIC,
    configs::SPRINT,
    configs::RELEASE,
    configs::TEAM,
    configs::PORTFOLIO,
    configs::USER,
    configs::SESSION,
    configs::AUDIT_LOG,
    configs::CHAT_MESSAGE,
    configs::NOTIFICATION,
    configs::TIME_SHEET,
    configs::KPI_METRIC,
    configs::SLA_POLICY,
    configs::SERVICE_REQUEST,
    configs::DATA_MIGRATION,
];

/// Looks up a kind configuration by name.
pub fn find_config(name: &str) -> Option<&'static KindConfig> {
    KIND_CONFIGS.iter().find(|config| config.name == name)
}

/// One resource kind: its field shape, update shape and configuration.
///
/// Implementors are zero-sized markers; all behavior comes from the generic
/// store and service.
pub trait ResourceKind: Send + Sync + 'static {
    /// Kind-specific attributes, used both as create input and stored shape.
    type Fields: Serialize + DeserializeOwned + Clone + Debug + PartialEq + Send + Sync;
    /// Update input. Absent fields must serialize to nothing.
    type Patch: Serialize + DeserializeOwned + Default + Debug + Send + Sync;

    const CONFIG: KindConfig;

    /// Extracts the parent id for kinds that declare a parent reference.
    fn parent_id(_fields: &Self::Fields) -> Option<RecordId> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{configs, find_config, PageCap, HIGH_VOLUME_PAGE_CAP, KIND_CONFIGS};
    use std::collections::HashSet;

    #[test]
    fn names_and_tables_are_unique() {
        let names: HashSet<_> = KIND_CONFIGS.iter().map(|config| config.name).collect();
        let tables: HashSet<_> = KIND_CONFIGS.iter().map(|config| config.table).collect();
        assert_eq!(names.len(), KIND_CONFIGS.len());
        assert_eq!(tables.len(), KIND_CONFIGS.len());
    }

    #[test]
    fn high_volume_kinds_are_capped_at_one_hundred() {
        for name in [
            "audit_log",
            "session",
            "sla_policy",
            "chat_message",
            "time_sheet",
            "kpi_metric",
            "service_request",
            "data_migration",
        ] {
            let config = find_config(name).unwrap();
            assert_eq!(
                config.page_cap,
                PageCap::Capped(HIGH_VOLUME_PAGE_CAP),
                "{name} must be capped"
            );
        }
    }

    #[test]
    fn epics_are_unbounded() {
        assert_eq!(configs::EPIC.page_cap, PageCap::Unbounded);
        assert_eq!(configs::EPIC.page_cap.limit(), None);
    }

    #[test]
    fn parent_references_target_configured_kinds() {
        for config in KIND_CONFIGS {
            if let Some(parent) = config.parent {
                let target = find_config(parent.kind).expect("parent kind must be configured");
                assert_eq!(target.table, parent.table);
                assert_ne!(target.name, config.name);
            }
        }
        assert_eq!(configs::PORTFOLIO.parent.map(|p| p.relation), Some("owner"));
    }

    #[test]
    fn find_config_rejects_unknown_names() {
        assert!(find_config("invoice").is_none());
    }
}
