// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use benchstock_audit::AuditEvent;
use benchstock_domain::{DomainError, RecordKind, RowRecord};
use serde::Serialize;
use std::collections::HashMap;

/// HTTP-agnostic classification of a per-row failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorCode {
    /// A structural or field-level validation failure.
    Validation,
    /// A referenced record does not exist.
    NotFound,
    /// The acting user lacks permission.
    PermissionDenied,
    /// The record is edit-locked by another user.
    LockConflict,
    /// A quantity unit family does not match the parent sample's.
    IncompatibleUnits,
    /// An external service call failed.
    ExternalService,
    /// The operation/options combination is not allowed.
    InvalidConfiguration,
    /// The operation is not defined for the record kind.
    UnsupportedOperation,
    /// An unclassified internal failure.
    Internal,
}

/// One field-level validation failure within a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// The field that failed validation.
    pub field: String,
    /// A human-readable description of the failure.
    pub message: String,
}

/// A structured per-row error, normalized from any raised failure.
///
/// Field-level validation failures carry one entry per invalid field;
/// generic failures fall back to the free-text message alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEntry {
    /// The failure classification.
    pub code: ErrorCode,
    /// A human-readable description of the failure.
    pub message: String,
    /// Field-level detail, when the origin was field validation.
    pub field_errors: Vec<FieldError>,
}

impl ErrorEntry {
    /// Normalizes a core error into a structured per-row error.
    ///
    /// This translation is explicit so persistence and lock errors are
    /// never leaked to report renderers in their raw form.
    #[must_use]
    pub fn from_core_error(error: &CoreError) -> Self {
        let code: ErrorCode = match error {
            CoreError::Validation(domain_error) => {
                return Self::from_domain_error(domain_error);
            }
            CoreError::NotFound { .. } => ErrorCode::NotFound,
            CoreError::PermissionDenied { .. } => ErrorCode::PermissionDenied,
            CoreError::LockConflict { .. } => ErrorCode::LockConflict,
            CoreError::ExternalService { .. } => ErrorCode::ExternalService,
            CoreError::InvalidConfiguration { .. } => ErrorCode::InvalidConfiguration,
            CoreError::UnsupportedOperation { .. } => ErrorCode::UnsupportedOperation,
            CoreError::Internal { .. } => ErrorCode::Internal,
        };

        Self {
            code,
            message: error.to_string(),
            field_errors: Vec::new(),
        }
    }

    /// Normalizes a domain validation error, expanding field detail.
    #[must_use]
    pub fn from_domain_error(error: &DomainError) -> Self {
        let (code, field): (ErrorCode, Option<&str>) = match error {
            DomainError::InvalidName(_) => (ErrorCode::Validation, Some("name")),
            DomainError::InvalidGlobalId(_) | DomainError::MissingGlobalId { .. } => {
                (ErrorCode::Validation, Some("globalId"))
            }
            DomainError::InvalidUnit(_) => (ErrorCode::Validation, Some("quantity.unit")),
            DomainError::InvalidQuantity { .. } => (ErrorCode::Validation, Some("quantity")),
            DomainError::IncompatibleUnits { .. } => {
                (ErrorCode::IncompatibleUnits, Some("quantity.unit"))
            }
            DomainError::AmbiguousReference { .. }
            | DomainError::MissingReference { .. }
            | DomainError::UnknownImportId { .. }
            | DomainError::ContainerNotListable { .. } => {
                (ErrorCode::Validation, Some("parentRef"))
            }
            DomainError::DuplicateImportId { .. } => (ErrorCode::Validation, Some("importId")),
        };

        let field_errors: Vec<FieldError> = field.map_or_else(Vec::new, |name| {
            vec![FieldError {
                field: name.to_string(),
                message: error.to_string(),
            }]
        });

        Self {
            code,
            message: error.to_string(),
            field_errors,
        }
    }
}

/// The outcome of one row of a bulk or import call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RowOutcome {
    /// The row was processed; the payload is the resulting record.
    Success(RowRecord),
    /// The row failed; the payload describes why.
    Failure(ErrorEntry),
}

impl RowOutcome {
    /// Returns whether this outcome is a success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns the resulting record, if the row succeeded.
    #[must_use]
    pub const fn record(&self) -> Option<&RowRecord> {
        match self {
            Self::Success(record) => Some(record),
            Self::Failure(_) => None,
        }
    }

    /// Returns the error, if the row failed.
    #[must_use]
    pub const fn error(&self) -> Option<&ErrorEntry> {
        match self {
            Self::Success(_) => None,
            Self::Failure(error) => Some(error),
        }
    }
}

/// The lifecycle status of a partial or aggregate result.
///
/// The status only moves forward: `Pending` becomes `Prevalidated` or
/// `PrevalidationError`, and only `Prevalidated` results are completed.
/// `Completed` and `PrevalidationError` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ResultStatus {
    /// No prevalidation has run yet.
    #[default]
    Pending,
    /// Prevalidation found no errors.
    Prevalidated,
    /// Prevalidation found at least one error; the call goes no further.
    PrevalidationError,
    /// Dispatch has finished.
    Completed,
}

impl ResultStatus {
    /// Converts this status to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Prevalidated => "Prevalidated",
            Self::PrevalidationError => "PrevalidationError",
            Self::Completed => "Completed",
        }
    }

    /// Checks if a transition from this status to another is valid.
    ///
    /// Valid transitions are:
    /// - Pending → Prevalidated
    /// - Pending → `PrevalidationError`
    /// - Pending → Completed (plain bulk calls skip prevalidation)
    /// - Prevalidated → Completed
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Pending, Self::Prevalidated)
                | (Self::Pending, Self::PrevalidationError)
                | (Self::Pending | Self::Prevalidated, Self::Completed)
        )
    }
}

impl std::fmt::Display for ResultStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The ordered per-row outcomes for one record kind.
///
/// Positions always match the input row order, even when some rows fail.
/// Rows that carried an import-id are additionally indexed by it, so later
/// stages can resolve forward references against this result.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PartialResult {
    outcomes: Vec<RowOutcome>,
    import_id_index: HashMap<String, usize>,
    status: ResultStatus,
}

impl PartialResult {
    /// Creates an empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a success outcome, indexing the row's import-id if present.
    pub fn push_success(&mut self, record: RowRecord) {
        if let Some(import_id) = record.import_id() {
            self.import_id_index
                .insert(import_id.to_string(), self.outcomes.len());
        }
        self.outcomes.push(RowOutcome::Success(record));
    }

    /// Appends a failure outcome, indexing the row's import-id if known.
    ///
    /// # Arguments
    ///
    /// * `import_id` - The failing row's import-id, when it had one
    /// * `error` - The structured error recorded for the row
    pub fn push_failure(&mut self, import_id: Option<&str>, error: ErrorEntry) {
        if let Some(import_id) = import_id {
            self.import_id_index
                .insert(import_id.to_string(), self.outcomes.len());
        }
        self.outcomes.push(RowOutcome::Failure(error));
    }

    /// Returns the position of the row with the given import-id.
    #[must_use]
    pub fn position_of(&self, import_id: &str) -> Option<usize> {
        self.import_id_index.get(import_id).copied()
    }

    /// Checks whether a row with the given import-id exists in this result.
    #[must_use]
    pub fn contains_import_id(&self, import_id: &str) -> bool {
        self.import_id_index.contains_key(import_id)
    }

    /// Returns the outcome of the row with the given import-id.
    #[must_use]
    pub fn get_by_import_id(&self, import_id: &str) -> Option<&RowOutcome> {
        self.position_of(import_id)
            .and_then(|position| self.outcomes.get(position))
    }

    /// Returns the ordered outcomes.
    #[must_use]
    pub fn outcomes(&self) -> &[RowOutcome] {
        &self.outcomes
    }

    /// Returns the number of outcomes recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Checks whether no outcomes have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Returns the number of successful rows.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Returns the number of failed rows.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.outcomes.len() - self.success_count()
    }

    /// Returns the current lifecycle status.
    #[must_use]
    pub const fn status(&self) -> ResultStatus {
        self.status
    }

    /// Advances the lifecycle status.
    ///
    /// Invalid transitions are ignored and reported as `false`; the status
    /// never moves backwards.
    pub fn advance_status(&mut self, target: ResultStatus) -> bool {
        if self.status.can_transition_to(target) {
            self.status = target;
            return true;
        }
        false
    }
}

/// The aggregate outcome of one bulk or import call.
///
/// One [`PartialResult`] exists per record kind; plain bulk calls populate
/// only the kind(s) present in their input. The running counts cover all
/// kinds, and the audit trail carries one event per successfully
/// dispatched row.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkOperationResult {
    /// Per-row outcomes for container rows.
    pub containers: PartialResult,
    /// Per-row outcomes for sample rows.
    pub samples: PartialResult,
    /// Per-row outcomes for subsample rows.
    pub subsamples: PartialResult,
    /// Per-row outcomes for sample-template rows.
    pub templates: PartialResult,
    /// Running count of successful rows across all kinds.
    pub success_count: usize,
    /// Running count of failed rows across all kinds.
    pub error_count: usize,
    /// The overall lifecycle status.
    pub status: ResultStatus,
    /// One audit event per successfully dispatched row.
    #[serde(skip)]
    pub audit_trail: Vec<AuditEvent>,
}

impl BulkOperationResult {
    /// Creates an empty result with all partial results pending.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the partial result for a record kind.
    #[must_use]
    pub const fn partial_for_kind(&self, kind: RecordKind) -> &PartialResult {
        match kind {
            RecordKind::Container => &self.containers,
            RecordKind::Sample => &self.samples,
            RecordKind::SubSample => &self.subsamples,
            RecordKind::SampleTemplate => &self.templates,
        }
    }

    /// Returns the mutable partial result for a record kind.
    pub const fn partial_for_kind_mut(&mut self, kind: RecordKind) -> &mut PartialResult {
        match kind {
            RecordKind::Container => &mut self.containers,
            RecordKind::Sample => &mut self.samples,
            RecordKind::SubSample => &mut self.subsamples,
            RecordKind::SampleTemplate => &mut self.templates,
        }
    }

    /// Records a successful row in the partial result for its kind.
    pub fn record_success(&mut self, record: RowRecord) {
        let kind: RecordKind = record.kind();
        self.partial_for_kind_mut(kind).push_success(record);
        self.success_count += 1;
    }

    /// Records a failed row in the partial result for its kind.
    ///
    /// # Arguments
    ///
    /// * `kind` - The failing row's record kind
    /// * `import_id` - The failing row's import-id, when it had one
    /// * `error` - The structured error recorded for the row
    pub fn record_failure(
        &mut self,
        kind: RecordKind,
        import_id: Option<&str>,
        error: ErrorEntry,
    ) {
        self.partial_for_kind_mut(kind)
            .push_failure(import_id, error);
        self.error_count += 1;
    }

    /// Advances the overall lifecycle status.
    ///
    /// Invalid transitions are ignored and reported as `false`.
    pub fn advance_status(&mut self, target: ResultStatus) -> bool {
        if self.status.can_transition_to(target) {
            self.status = target;
            return true;
        }
        false
    }

    /// Renders the running counts for audit snapshots.
    #[must_use]
    pub fn to_snapshot_data(&self) -> String {
        format!(
            "success_count={},error_count={}",
            self.success_count, self.error_count
        )
    }
}
