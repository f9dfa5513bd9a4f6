mod common;

use common::epic;
use opsdesk_core::{
    open_pool, CoreConfig, CoreError, Epic, EpicKind, EpicPatch, ListQuery, NewRecord, Record,
    RecordId, ResourceService, SqliteResourceService, SqliteStore, StorageResult, Store,
    WorkStatus,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

fn file_config(dir: &tempfile::TempDir) -> CoreConfig {
    CoreConfig {
        db_path: dir.path().join("opsdesk.sqlite3"),
        pool_size: 4,
        ..CoreConfig::default()
    }
}

fn shared_epic_service(dir: &tempfile::TempDir) -> Arc<SqliteResourceService<EpicKind>> {
    let pool = open_pool(&file_config(dir)).unwrap();
    Arc::new(ResourceService::new(SqliteStore::new(pool)))
}

#[test]
fn concurrent_creates_are_all_visible() {
    let dir = tempfile::tempdir().unwrap();
    let service = shared_epic_service(&dir);

    let handles: Vec<_> = (0..8)
        .map(|worker| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                (0..20)
                    .map(|n| service.create(epic(&format!("w{worker}-{n}"))).unwrap().id)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut created = HashSet::new();
    for handle in handles {
        created.extend(handle.join().unwrap());
    }
    assert_eq!(created.len(), 160);

    let listed: HashSet<_> = service
        .find_all()
        .unwrap()
        .into_iter()
        .map(|record| record.id)
        .collect();
    assert_eq!(listed, created);
}

#[test]
fn racing_removes_succeed_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let service = shared_epic_service(&dir);
    let id = service.create(epic("contended")).unwrap().id;

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            thread::spawn(move || service.remove(id))
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.join().unwrap() {
            Ok(()) => successes += 1,
            Err(err) => assert!(err.is_not_found(), "unexpected error: {err}"),
        }
    }
    assert_eq!(successes, 1);
    assert!(service.find_one(id).unwrap_err().is_not_found());
}

#[test]
fn concurrent_updates_leave_one_writer_winning() {
    let dir = tempfile::tempdir().unwrap();
    let service = shared_epic_service(&dir);
    let id = service.create(epic("shared")).unwrap().id;

    let titles: Vec<String> = (0..6).map(|n| format!("title {n}")).collect();
    let handles: Vec<_> = titles
        .iter()
        .cloned()
        .map(|title| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                service
                    .update(
                        id,
                        EpicPatch {
                            title: Some(title),
                            ..EpicPatch::default()
                        },
                    )
                    .unwrap()
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let final_record = service.find_one(id).unwrap();
    assert!(titles.contains(&final_record.fields.title));
    assert_eq!(final_record.fields.status, WorkStatus::Backlog);
    assert!(final_record.created_at <= final_record.updated_at);
}

#[test]
fn creates_racing_a_sweeper_always_return_their_record() {
    let dir = tempfile::tempdir().unwrap();
    let service = shared_epic_service(&dir);
    let done = Arc::new(AtomicBool::new(false));

    let sweeper = {
        let service = Arc::clone(&service);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            while !done.load(Ordering::SeqCst) {
                for record in service.find_all().unwrap() {
                    if let Err(err) = service.remove(record.id) {
                        assert!(err.is_not_found(), "unexpected error: {err}");
                    }
                }
            }
        })
    };

    for n in 0..100 {
        let title = format!("swept {n}");
        let created = service.create(epic(&title)).unwrap();
        assert_eq!(created.fields.title, title);
        assert_eq!(created.created_at, created.updated_at);
    }
    done.store(true, Ordering::SeqCst);
    sweeper.join().unwrap();
}

/// Store that deletes the record right after the existence check, standing in
/// for a concurrent caller winning the race.
struct RacingStore {
    inner: SqliteStore<EpicKind>,
}

impl Store<EpicKind> for RacingStore {
    fn insert(&self, record: NewRecord<Epic>) -> StorageResult<Record<Epic>> {
        self.inner.insert(record)
    }

    fn get_by_id(&self, id: RecordId) -> StorageResult<Option<Record<Epic>>> {
        let found = self.inner.get_by_id(id)?;
        if found.is_some() {
            self.inner.delete(id)?;
        }
        Ok(found)
    }

    fn list(&self, query: &ListQuery) -> StorageResult<Vec<Record<Epic>>> {
        self.inner.list(query)
    }

    fn update_in_place(&self, record: &Record<Epic>) -> StorageResult<Record<Epic>> {
        self.inner.update_in_place(record)
    }

    fn delete(&self, id: RecordId) -> StorageResult<()> {
        self.inner.delete(id)
    }
}

#[test]
fn record_vanishing_between_check_and_write_reports_not_found() {
    let pool = common::memory_pool();
    let service: ResourceService<EpicKind, _> = ResourceService::new(RacingStore {
        inner: SqliteStore::new(pool),
    });

    let updated = service.create(epic("short-lived")).unwrap();
    let err = service
        .update(
            updated.id,
            EpicPatch {
                status: Some(WorkStatus::Done),
                ..EpicPatch::default()
            },
        )
        .unwrap_err();
    assert!(matches!(
        err,
        CoreError::NotFound { kind: "epic", id } if id == updated.id
    ));

    let removed = service.create(epic("also short-lived")).unwrap();
    let err = service.remove(removed.id).unwrap_err();
    assert!(err.is_not_found());
}
