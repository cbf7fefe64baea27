// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! In-memory inventory standing in for persistence, permissions, and the
//! per-kind record operations during import tests.

use crate::catalog::{ContainerInfo, RecordCatalog, SampleInfo, TemplateInfo};
use benchstock::{
    BulkOperationDispatcher, CoreError, EditLockTracker, OperationRegistry, RecordOperations,
};
use benchstock_audit::Actor;
use benchstock_domain::{
    ContainerKind, ContainerRow, GlobalId, ParentRef, Quantity, RecordKind, RowRecord, SampleRow,
    SubSampleRow, TemplateRow, Unit, Username, validate_row,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

/// Shared in-memory record store.
pub struct Store {
    next_id: Mutex<i64>,
    records: Mutex<HashMap<GlobalId, RowRecord>>,
    denied: Mutex<HashSet<GlobalId>>,
    failing_names: Mutex<HashSet<String>>,
    locks: Arc<EditLockTracker>,
}

impl Store {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: Mutex::new(0),
            records: Mutex::new(HashMap::new()),
            denied: Mutex::new(HashSet::new()),
            failing_names: Mutex::new(HashSet::new()),
            locks: Arc::new(EditLockTracker::new()),
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

    pub fn insert(&self, id: GlobalId, record: RowRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, record);
    }

    pub fn record_count(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn count_of_kind(&self, kind: RecordKind) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .filter(|id| id.kind() == kind)
            .count()
    }

    /// Marks a record so the permission check rejects it.
    pub fn deny_access(&self, id: GlobalId) {
        self.denied
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
    }

    fn is_denied(&self, id: GlobalId) -> bool {
        self.denied
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
    }

    /// Makes creation of any row with this name fail, simulating an
    /// operation-time persistence error.
    pub fn fail_create_for(&self, name: &str) {
        self.failing_names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string());
    }

    fn create_fails(&self, name: &str) -> bool {
        self.failing_names
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name)
    }
}

/// Per-kind operations over the shared store.
pub struct Ops {
    kind: RecordKind,
    store: Arc<Store>,
}

impl Ops {
    pub fn new(kind: RecordKind, store: Arc<Store>) -> Self {
        Self { kind, store }
    }
}

fn lock_user(actor: &Actor) -> Username {
    Username::new(&actor.id)
}

impl RecordOperations for Ops {
    fn kind(&self) -> RecordKind {
        self.kind
    }

    fn create(&self, row: RowRecord, actor: &Actor) -> Result<RowRecord, CoreError> {
        validate_row(&row)?;
        if self.store.create_fails(row.name()) {
            return Err(CoreError::ExternalService {
                service: String::from("persistence"),
                message: format!("could not store '{}'", row.name()),
            });
        }

        match row {
            RowRecord::Sample(mut sample) => {
                let id: GlobalId = self.store.allocate(RecordKind::Sample);
                sample.global_id = Some(id);
                sample.owner = Some(Username::new(&actor.id));
                // A sample always has at least one subsample; creation
                // produces a default one when the row embeds none.
                if sample.subsamples.is_empty() {
                    sample
                        .subsamples
                        .push(SubSampleRow::new(&format!("{}.01", sample.name)));
                }
                for subsample in &mut sample.subsamples {
                    let subsample_id: GlobalId = self.store.allocate(RecordKind::SubSample);
                    subsample.global_id = Some(subsample_id);
                    subsample.parent_sample = ParentRef::by_global_id(id);
                    subsample.owner = Some(Username::new(&actor.id));
                    self.store
                        .insert(subsample_id, RowRecord::SubSample(subsample.clone()));
                }
                self.store.insert(id, RowRecord::Sample(sample.clone()));
                Ok(RowRecord::Sample(sample))
            }
            RowRecord::SubSample(mut subsample) => {
                let parent: GlobalId =
                    subsample
                        .parent_sample
                        .global_id
                        .ok_or(CoreError::Internal {
                            message: String::from("standalone subsample has no parent sample id"),
                        })?;
                if self.store.get(parent).is_none() {
                    return Err(CoreError::NotFound { global_id: parent });
                }
                let id: GlobalId = self.store.allocate(RecordKind::SubSample);
                subsample.global_id = Some(id);
                subsample.owner = Some(Username::new(&actor.id));
                self.store
                    .insert(id, RowRecord::SubSample(subsample.clone()));
                Ok(RowRecord::SubSample(subsample))
            }
            other => {
                let id: GlobalId = self.store.allocate(other.kind());
                let mut record: RowRecord = other.with_global_id(id);
                record.set_owner(Username::new(&actor.id));
                self.store.insert(id, record.clone());
                Ok(record)
            }
        }
    }

    fn update(&self, id: GlobalId, row: RowRecord, actor: &Actor) -> Result<RowRecord, CoreError> {
        self.store.locks.with_lock(id, &lock_user(actor), || {
            if self.store.get(id).is_none() {
                return Err(CoreError::NotFound { global_id: id });
            }
            let record: RowRecord = row.with_global_id(id);
            self.store.insert(id, record.clone());
            Ok(record)
        })
    }

    fn delete(&self, id: GlobalId, actor: &Actor) -> Result<RowRecord, CoreError> {
        self.store.locks.with_lock(id, &lock_user(actor), || {
            self.store
                .records
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&id)
                .ok_or(CoreError::NotFound { global_id: id })
        })
    }

    fn restore(&self, id: GlobalId, _actor: &Actor) -> Result<RowRecord, CoreError> {
        self.store
            .get(id)
            .ok_or(CoreError::NotFound { global_id: id })
    }

    fn duplicate(&self, id: GlobalId, _actor: &Actor) -> Result<RowRecord, CoreError> {
        let original: RowRecord = self
            .store
            .get(id)
            .ok_or(CoreError::NotFound { global_id: id })?;
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
            let mut record: RowRecord = self
                .store
                .get(id)
                .ok_or(CoreError::NotFound { global_id: id })?;
            if let Some(owner) = row.owner() {
                record.set_owner(owner.clone());
            }
            self.store.insert(id, record.clone());
            Ok(record)
        })
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
            match self.store.get(target) {
                Some(RowRecord::Container(container))
                    if container.container_kind.accepts_moves() => {}
                Some(_) => {
                    return Err(CoreError::Validation(
                        benchstock_domain::DomainError::ContainerNotListable {
                            global_id: target.to_string(),
                        },
                    ));
                }
                None => return Err(CoreError::NotFound { global_id: target }),
            }
            let record: RowRecord =
                self.store.locks.with_lock(id, &lock_user(actor), || {
                    let mut record: RowRecord = self
                        .store
                        .get(id)
                        .ok_or(CoreError::NotFound { global_id: id })?;
                    record.set_parent_container_ref(ParentRef::by_global_id(target));
                    self.store.insert(id, record.clone());
                    Ok(record)
                })?;
            moved.push(record);
        }
        Ok(moved)
    }
}

/// Permission/edit-check and reload collaborator over the shared store.
pub struct Catalog {
    store: Arc<Store>,
}

impl Catalog {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    fn check_access(&self, id: GlobalId, action: &str) -> Result<(), CoreError> {
        if self.store.is_denied(id) {
            return Err(CoreError::PermissionDenied {
                global_id: id,
                action: action.to_string(),
            });
        }
        Ok(())
    }
}

impl RecordCatalog for Catalog {
    fn container_info(&self, id: GlobalId, _actor: &Actor) -> Result<ContainerInfo, CoreError> {
        self.check_access(id, "add items to")?;
        match self.store.get(id) {
            Some(RowRecord::Container(container)) => Ok(ContainerInfo {
                global_id: id,
                kind: container.container_kind,
            }),
            _ => Err(CoreError::NotFound { global_id: id }),
        }
    }

    fn sample_info(&self, id: GlobalId, _actor: &Actor) -> Result<SampleInfo, CoreError> {
        self.check_access(id, "extend")?;
        match self.store.get(id) {
            Some(RowRecord::Sample(sample)) => Ok(SampleInfo {
                global_id: id,
                unit: sample.quantity.map(|quantity| quantity.unit()),
            }),
            _ => Err(CoreError::NotFound { global_id: id }),
        }
    }

    fn template_info(&self, id: GlobalId, _actor: &Actor) -> Result<TemplateInfo, CoreError> {
        self.check_access(id, "use")?;
        match self.store.get(id) {
            Some(RowRecord::Template(template)) => Ok(TemplateInfo {
                global_id: id,
                default_unit: Some(template.default_unit),
            }),
            _ => Err(CoreError::NotFound { global_id: id }),
        }
    }

    fn reload(&self, id: GlobalId, _actor: &Actor) -> Result<RowRecord, CoreError> {
        self.store
            .get(id)
            .ok_or(CoreError::NotFound { global_id: id })
    }
}

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("jsmith"), String::from("user"))
}

pub fn create_resolver(store: &Arc<Store>) -> crate::ImportResolver<Catalog> {
    let registry: OperationRegistry = OperationRegistry::new(
        Box::new(Ops::new(RecordKind::Container, Arc::clone(store))),
        Box::new(Ops::new(RecordKind::Sample, Arc::clone(store))),
        Box::new(Ops::new(RecordKind::SubSample, Arc::clone(store))),
        Box::new(Ops::new(RecordKind::SampleTemplate, Arc::clone(store))),
    );
    crate::ImportResolver::new(
        BulkOperationDispatcher::new(registry),
        Catalog::new(Arc::clone(store)),
    )
}

/// Inserts a persisted container directly, bypassing the dispatcher.
pub fn seed_container(store: &Arc<Store>, name: &str, kind: ContainerKind) -> GlobalId {
    let id: GlobalId = store.allocate(RecordKind::Container);
    let mut row: ContainerRow = ContainerRow::new(name, kind);
    row.global_id = Some(id);
    store.insert(id, RowRecord::Container(row));
    id
}

/// Inserts a persisted sample directly, bypassing the dispatcher.
pub fn seed_sample(store: &Arc<Store>, name: &str, quantity: Option<Quantity>) -> GlobalId {
    let id: GlobalId = store.allocate(RecordKind::Sample);
    let mut row: SampleRow = SampleRow::new(name);
    row.global_id = Some(id);
    row.quantity = quantity;
    store.insert(id, RowRecord::Sample(row));
    id
}

/// Inserts a persisted template directly, bypassing the dispatcher.
pub fn seed_template(store: &Arc<Store>, name: &str, default_unit: Unit) -> GlobalId {
    let id: GlobalId = store.allocate(RecordKind::SampleTemplate);
    let mut row: TemplateRow = TemplateRow::new(name, default_unit);
    row.global_id = Some(id);
    store.insert(id, RowRecord::Template(row));
    id
}

pub fn container_with_import_id(name: &str, import_id: &str) -> ContainerRow {
    let mut row: ContainerRow = ContainerRow::new(name, ContainerKind::List);
    row.import_id = Some(import_id.to_string());
    row
}

pub fn sample_with_import_id(name: &str, import_id: &str) -> SampleRow {
    let mut row: SampleRow = SampleRow::new(name);
    row.import_id = Some(import_id.to_string());
    row
}
