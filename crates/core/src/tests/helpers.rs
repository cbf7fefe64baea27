// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! In-memory record operations standing in for the persistence-backed
//! implementations the dispatcher drives in production.

use crate::{
    BulkOperationDispatcher, CoreError, EditLockTracker, OperationRegistry, RecordOperations,
};
use benchstock_audit::Actor;
use benchstock_domain::{
    ContainerKind, ContainerRow, GlobalId, RecordKind, RowRecord, SampleRow, SubSampleRow,
    Username, validate_row,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Shared in-memory record store used by all four fake operations.
pub struct InventoryStore {
    next_id: Mutex<i64>,
    records: Mutex<HashMap<GlobalId, RowRecord>>,
    deleted: Mutex<HashMap<GlobalId, RowRecord>>,
    pub locks: Arc<EditLockTracker>,
}

impl InventoryStore {
    pub fn new() -> Arc<Self> {
        Self::with_locks(Arc::new(EditLockTracker::new()))
    }

    pub fn with_locks(locks: Arc<EditLockTracker>) -> Arc<Self> {
        Arc::new(Self {
            next_id: Mutex::new(0),
            records: Mutex::new(HashMap::new()),
            deleted: Mutex::new(HashMap::new()),
            locks,
        })
    }

    fn allocate(&self, kind: RecordKind) -> GlobalId {
        let mut next = self.next_id.lock().unwrap_or_else(PoisonError::into_inner);
        *next += 1;
        GlobalId::new(kind, *next)
    }

    pub fn get(&self, id: GlobalId) -> Option<RowRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    pub fn record_count(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn insert(&self, id: GlobalId, record: RowRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, record);
    }
}

/// Fake per-kind operations over the shared store.
///
/// Mutating calls go through the edit-lock tracker the way production
/// implementations are required to.
pub struct InMemoryOperations {
    kind: RecordKind,
    store: Arc<InventoryStore>,
}

impl InMemoryOperations {
    pub fn new(kind: RecordKind, store: Arc<InventoryStore>) -> Self {
        Self { kind, store }
    }

    fn fetch(&self, id: GlobalId) -> Result<RowRecord, CoreError> {
        self.store
            .get(id)
            .ok_or(CoreError::NotFound { global_id: id })
    }
}

fn lock_user(actor: &Actor) -> Username {
    Username::new(&actor.id)
}

impl RecordOperations for InMemoryOperations {
    fn kind(&self) -> RecordKind {
        self.kind
    }

    fn create(&self, row: RowRecord, actor: &Actor) -> Result<RowRecord, CoreError> {
        validate_row(&row)?;
        let id: GlobalId = self.store.allocate(self.kind);
        let mut record: RowRecord = row.with_global_id(id);
        record.set_owner(Username::new(&actor.id));
        self.store.insert(id, record.clone());
        Ok(record)
    }

    fn update(&self, id: GlobalId, row: RowRecord, actor: &Actor) -> Result<RowRecord, CoreError> {
        self.store.locks.with_lock(id, &lock_user(actor), || {
            let existing: RowRecord = self.fetch(id)?;
            validate_row(&row)?;
            let mut record: RowRecord = row.with_global_id(id);
            if let Some(owner) = existing.owner() {
                record.set_owner(owner.clone());
            }
            self.store.insert(id, record.clone());
            Ok(record)
        })
    }

    fn delete(&self, id: GlobalId, actor: &Actor) -> Result<RowRecord, CoreError> {
        self.store.locks.with_lock(id, &lock_user(actor), || {
            let record: RowRecord = self.fetch(id)?;
            self.store
                .records
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&id);
            self.store
                .deleted
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(id, record.clone());
            Ok(record)
        })
    }

    fn restore(&self, id: GlobalId, actor: &Actor) -> Result<RowRecord, CoreError> {
        self.store.locks.with_lock(id, &lock_user(actor), || {
            let record: RowRecord = self
                .store
                .deleted
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&id)
                .ok_or(CoreError::NotFound { global_id: id })?;
            self.store.insert(id, record.clone());
            Ok(record)
        })
    }

    fn duplicate(&self, id: GlobalId, _actor: &Actor) -> Result<RowRecord, CoreError> {
        let original: RowRecord = self.fetch(id)?;
        let copy_id: GlobalId = self.store.allocate(self.kind);
        let copy: RowRecord = original.with_global_id(copy_id);
        self.store.insert(copy_id, copy.clone());
        Ok(copy)
    }

    fn change_owner(
        &self,
        id: GlobalId,
        row: RowRecord,
        actor: &Actor,
    ) -> Result<RowRecord, CoreError> {
        self.store.locks.with_lock(id, &lock_user(actor), || {
            let mut record: RowRecord = self.fetch(id)?;
            let new_owner: Username = row
                .owner()
                .cloned()
                .ok_or_else(|| CoreError::Internal {
                    message: String::from("change_owner row names no owner"),
                })?;
            record.set_owner(new_owner);
            self.store.insert(id, record.clone());
            Ok(record)
        })
    }

    fn update_to_latest_template(
        &self,
        id: GlobalId,
        actor: &Actor,
    ) -> Result<RowRecord, CoreError> {
        if self.kind != RecordKind::Sample {
            return Err(CoreError::UnsupportedOperation {
                operation: String::from("UpdateToLatestTemplate"),
                record_kind: self.kind,
            });
        }
        self.store
            .locks
            .with_lock(id, &lock_user(actor), || self.fetch(id))
    }

    fn move_all(&self, rows: Vec<RowRecord>, actor: &Actor) -> Result<Vec<RowRecord>, CoreError> {
        let mut moved: Vec<RowRecord> = Vec::with_capacity(rows.len());
        for row in rows {
            let id: GlobalId = row.global_id().ok_or(CoreError::Internal {
                message: String::from("move_all row has no identifier"),
            })?;
            let target: GlobalId = row
                .parent_container_ref()
                .and_then(|parent| parent.global_id)
                .ok_or(CoreError::Internal {
                    message: String::from("move_all row has no resolved target"),
                })?;
            let target_record: RowRecord =
                self.store
                    .get(target)
                    .ok_or(CoreError::NotFound { global_id: target })?;
            if let RowRecord::Container(container) = &target_record
                && !container.container_kind.accepts_moves()
            {
                return Err(CoreError::Validation(
                    benchstock_domain::DomainError::ContainerNotListable {
                        global_id: target.to_string(),
                    },
                ));
            }
            let record: RowRecord =
                self.store.locks.with_lock(id, &lock_user(actor), || {
                    let mut record: RowRecord = self.fetch(id)?;
                    record.set_parent_container_ref(
                        benchstock_domain::ParentRef::by_global_id(target),
                    );
                    self.store.insert(id, record.clone());
                    Ok(record)
                })?;
            moved.push(record);
        }
        Ok(moved)
    }
}

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("jsmith"), String::from("user"))
}

pub fn create_other_actor() -> Actor {
    Actor::new(String::from("mjones"), String::from("user"))
}

pub fn create_registry(store: &Arc<InventoryStore>) -> OperationRegistry {
    OperationRegistry::new(
        Box::new(InMemoryOperations::new(
            RecordKind::Container,
            Arc::clone(store),
        )),
        Box::new(InMemoryOperations::new(RecordKind::Sample, Arc::clone(store))),
        Box::new(InMemoryOperations::new(
            RecordKind::SubSample,
            Arc::clone(store),
        )),
        Box::new(InMemoryOperations::new(
            RecordKind::SampleTemplate,
            Arc::clone(store),
        )),
    )
}

pub fn create_dispatcher(store: &Arc<InventoryStore>) -> BulkOperationDispatcher {
    BulkOperationDispatcher::new(create_registry(store))
}

pub fn container_row(name: &str) -> RowRecord {
    RowRecord::Container(ContainerRow::new(name, ContainerKind::List))
}

pub fn sample_row(name: &str) -> RowRecord {
    RowRecord::Sample(SampleRow::new(name))
}

pub fn subsample_row(name: &str, parent_sample: GlobalId) -> RowRecord {
    let mut row: SubSampleRow = SubSampleRow::new(name);
    row.parent_sample = benchstock_domain::ParentRef::by_global_id(parent_sample);
    RowRecord::SubSample(row)
}
