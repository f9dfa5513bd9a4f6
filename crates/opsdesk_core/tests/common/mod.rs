#![allow(dead_code)]

use opsdesk_core::{
    open_pool_in_memory, Clock, DbPool, Epic, ResourceKind, ResourceService, SqliteStore,
    Timestamp, WorkStatus,
};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Clock that only moves when a test says so.
#[derive(Debug, Clone)]
pub struct ManualClock(Arc<AtomicI64>);

impl ManualClock {
    pub fn starting_at(now: Timestamp) -> Self {
        Self(Arc::new(AtomicI64::new(now)))
    }

    pub fn set(&self, now: Timestamp) {
        self.0.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, millis: i64) {
        self.0.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Timestamp {
        self.0.load(Ordering::SeqCst)
    }
}

pub type ManualService<K> = ResourceService<K, SqliteStore<K>, ManualClock>;

pub fn manual_service<K: ResourceKind>(pool: &DbPool, clock: &ManualClock) -> ManualService<K> {
    ResourceService::with_clock(SqliteStore::new(pool.clone()), clock.clone())
}

pub fn memory_pool() -> DbPool {
    open_pool_in_memory().unwrap()
}

pub fn epic(title: &str) -> Epic {
    Epic {
        title: title.to_string(),
        description: None,
        status: WorkStatus::Backlog,
        labels: Vec::new(),
    }
}
