// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use benchstock_audit::Actor;
use benchstock_domain::{GlobalId, RecordKind, RowRecord};
use serde::{Deserialize, Serialize};

/// The kind of mutation a bulk call performs on every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BulkOperationType {
    /// Create a new record from the row payload.
    Create,
    /// Update the record identified by the row.
    Update,
    /// Mark the record as deleted.
    Delete,
    /// Restore a previously deleted record.
    Restore,
    /// Create a copy of the record.
    Duplicate,
    /// Transfer ownership of the record to the owner named by the row.
    ChangeOwner,
    /// Re-instantiate a sample from the latest version of its template.
    UpdateToLatestTemplate,
    /// Move records into their target parent containers.
    Move,
}

impl BulkOperationType {
    /// Converts this operation type to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::Restore => "Restore",
            Self::Duplicate => "Duplicate",
            Self::ChangeOwner => "ChangeOwner",
            Self::UpdateToLatestTemplate => "UpdateToLatestTemplate",
            Self::Move => "Move",
        }
    }

    /// Returns whether this operation hands the entire row list to the
    /// underlying operation in one call instead of iterating per row.
    #[must_use]
    pub const fn uses_whole_list(&self) -> bool {
        matches!(self, Self::Move)
    }
}

impl std::fmt::Display for BulkOperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The per-record-kind operations the dispatcher invokes.
///
/// One implementation exists per record kind; each call performs the actual
/// persistence mutation and is expected to consult the edit-lock tracker
/// around its fetch-patch-save sequence. Implementations live outside this
/// crate; the dispatcher only relies on this contract.
pub trait RecordOperations {
    /// Returns the record kind this implementation handles.
    fn kind(&self) -> RecordKind;

    /// Creates a new record from the row payload.
    ///
    /// # Errors
    ///
    /// Returns an error if validation or persistence fails.
    fn create(&self, row: RowRecord, actor: &Actor) -> Result<RowRecord, CoreError>;

    /// Updates an existing record from the row payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is missing, locked by another user,
    /// or the payload is invalid.
    fn update(&self, id: GlobalId, row: RowRecord, actor: &Actor) -> Result<RowRecord, CoreError>;

    /// Marks a record as deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is missing or locked by another user.
    fn delete(&self, id: GlobalId, actor: &Actor) -> Result<RowRecord, CoreError>;

    /// Restores a previously deleted record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is missing or locked by another user.
    fn restore(&self, id: GlobalId, actor: &Actor) -> Result<RowRecord, CoreError>;

    /// Creates a copy of a record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is missing or persistence fails.
    fn duplicate(&self, id: GlobalId, actor: &Actor) -> Result<RowRecord, CoreError>;

    /// Transfers ownership of a record to the owner named by the row.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is missing, the row names no owner,
    /// or the acting user may not transfer it.
    fn change_owner(
        &self,
        id: GlobalId,
        row: RowRecord,
        actor: &Actor,
    ) -> Result<RowRecord, CoreError>;

    /// Re-instantiates a sample from the latest version of its template.
    ///
    /// Defined for samples only; the default rejects the call.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::UnsupportedOperation` unless overridden.
    fn update_to_latest_template(
        &self,
        id: GlobalId,
        actor: &Actor,
    ) -> Result<RowRecord, CoreError> {
        let _ = (id, actor);
        Err(CoreError::UnsupportedOperation {
            operation: String::from("UpdateToLatestTemplate"),
            record_kind: self.kind(),
        })
    }

    /// Moves every row into the parent container its reference names.
    ///
    /// Defined for containers and subsamples; the default rejects the call.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::UnsupportedOperation` unless overridden, or any
    /// error the underlying bulk move raises.
    fn move_all(&self, rows: Vec<RowRecord>, actor: &Actor) -> Result<Vec<RowRecord>, CoreError> {
        let _ = (rows, actor);
        Err(CoreError::UnsupportedOperation {
            operation: String::from("Move"),
            record_kind: self.kind(),
        })
    }
}

/// Capability table mapping each record kind to its operations.
///
/// This is the polymorphic seam of the dispatcher: rows are tagged with
/// their kind, and the matching operations are looked up here instead of
/// downcasting row payloads.
pub struct OperationRegistry {
    containers: Box<dyn RecordOperations + Send + Sync>,
    samples: Box<dyn RecordOperations + Send + Sync>,
    subsamples: Box<dyn RecordOperations + Send + Sync>,
    templates: Box<dyn RecordOperations + Send + Sync>,
}

impl OperationRegistry {
    /// Creates a registry from one operations implementation per kind.
    ///
    /// # Arguments
    ///
    /// * `containers` - Operations for container records
    /// * `samples` - Operations for sample records
    /// * `subsamples` - Operations for subsample records
    /// * `templates` - Operations for sample-template records
    #[must_use]
    pub fn new(
        containers: Box<dyn RecordOperations + Send + Sync>,
        samples: Box<dyn RecordOperations + Send + Sync>,
        subsamples: Box<dyn RecordOperations + Send + Sync>,
        templates: Box<dyn RecordOperations + Send + Sync>,
    ) -> Self {
        Self {
            containers,
            samples,
            subsamples,
            templates,
        }
    }

    /// Looks up the operations implementation for a record kind.
    #[must_use]
    pub fn for_kind(&self, kind: RecordKind) -> &(dyn RecordOperations + Send + Sync) {
        match kind {
            RecordKind::Container => self.containers.as_ref(),
            RecordKind::Sample => self.samples.as_ref(),
            RecordKind::SubSample => self.subsamples.as_ref(),
            RecordKind::SampleTemplate => self.templates.as_ref(),
        }
    }
}

impl std::fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationRegistry").finish_non_exhaustive()
    }
}
