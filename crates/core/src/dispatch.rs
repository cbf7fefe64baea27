// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bulk operation dispatch over heterogeneous row lists.
//!
//! The dispatcher iterates rows strictly in input order and invokes the
//! matching record operations per row (or hands the whole list over, for
//! move). It provides no cross-row atomicity: "rollback on error" means
//! "stop issuing further operations and surface the partial result", never
//! "undo committed rows".

use crate::error::CoreError;
use crate::operations::{BulkOperationType, OperationRegistry};
use crate::result::{BulkOperationResult, ErrorEntry, ResultStatus};
use benchstock_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use benchstock_domain::{DomainError, GlobalId, RowRecord, validate_row};
use tracing::{debug, warn};

/// A bulk call that stopped at the first failing row.
///
/// The triggering error is bundled with everything dispatched up to that
/// point, so callers can still render a complete per-row report. Earlier
/// successes are not undone.
#[derive(Debug, Clone)]
pub struct BulkOperationFailure {
    /// The error that stopped the call.
    pub error: ErrorEntry,
    /// The partial result accumulated before the failure.
    pub result: BulkOperationResult,
}

impl std::fmt::Display for BulkOperationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Bulk operation aborted after {} rows: {}",
            self.result.success_count, self.error.message
        )
    }
}

impl std::error::Error for BulkOperationFailure {}

/// Executes lists of record operations under a configurable failure policy.
#[derive(Debug)]
pub struct BulkOperationDispatcher {
    registry: OperationRegistry,
}

impl BulkOperationDispatcher {
    /// Creates a dispatcher over the given operation registry.
    #[must_use]
    pub const fn new(registry: OperationRegistry) -> Self {
        Self { registry }
    }

    /// Runs one bulk operation over a list of rows.
    ///
    /// Rows are processed strictly in input order. With
    /// `rollback_on_error = false` every row is validated structurally
    /// first and produces exactly one outcome; with
    /// `rollback_on_error = true` the first error aborts the call and no
    /// later row is touched.
    ///
    /// # Arguments
    ///
    /// * `operation` - The mutation applied to every row
    /// * `rows` - The rows, in the order outcomes must be reported
    /// * `actor` - The acting user
    /// * `rollback_on_error` - Whether the first error aborts the call
    ///
    /// # Errors
    ///
    /// Returns `BulkOperationFailure` carrying the partial result when
    /// `rollback_on_error` is set and a row fails, or when the
    /// operation/options combination is invalid (whole-list move without
    /// `rollback_on_error`, or a mixed-kind move list).
    pub fn run(
        &self,
        operation: BulkOperationType,
        rows: Vec<RowRecord>,
        actor: &Actor,
        rollback_on_error: bool,
    ) -> Result<BulkOperationResult, BulkOperationFailure> {
        debug!(
            operation = %operation,
            rows = rows.len(),
            rollback_on_error,
            "Dispatching bulk operation"
        );

        if operation.uses_whole_list() {
            self.run_whole_list(operation, rows, actor, rollback_on_error)
        } else {
            self.run_per_record(operation, rows, actor, rollback_on_error)
        }
    }

    /// Iterates rows one at a time through the matching record operation.
    fn run_per_record(
        &self,
        operation: BulkOperationType,
        rows: Vec<RowRecord>,
        actor: &Actor,
        rollback_on_error: bool,
    ) -> Result<BulkOperationResult, BulkOperationFailure> {
        let mut result: BulkOperationResult = BulkOperationResult::new();
        let cause: Cause = bulk_cause(operation, rows.len());

        for row in rows {
            // Best-effort calls validate up front so a malformed row is
            // reported without invoking the operation at all. Fail-fast
            // calls leave validation to the operation itself.
            if !rollback_on_error && let Err(domain_error) = validate_row(&row) {
                let entry: ErrorEntry = ErrorEntry::from_domain_error(&domain_error);
                warn!(
                    operation = %operation,
                    row = row.name(),
                    error = %domain_error,
                    "Row failed validation"
                );
                result.record_failure(row.kind(), row.import_id(), entry);
                continue;
            }

            let kind = row.kind();
            let import_id: Option<String> = row.import_id().map(String::from);
            match self.invoke(operation, row, actor) {
                Ok(record) => {
                    record_success_with_audit(&mut result, record, operation, actor, &cause);
                }
                Err(core_error) => {
                    let entry: ErrorEntry = ErrorEntry::from_core_error(&core_error);
                    warn!(
                        operation = %operation,
                        error = %core_error,
                        "Row operation failed"
                    );
                    result.record_failure(kind, import_id.as_deref(), entry.clone());
                    if rollback_on_error {
                        return Err(BulkOperationFailure {
                            error: entry,
                            result,
                        });
                    }
                }
            }
        }

        result.advance_status(ResultStatus::Completed);
        Ok(result)
    }

    /// Hands the entire row list to the underlying bulk operation.
    fn run_whole_list(
        &self,
        operation: BulkOperationType,
        rows: Vec<RowRecord>,
        actor: &Actor,
        rollback_on_error: bool,
    ) -> Result<BulkOperationResult, BulkOperationFailure> {
        // A whole-list call cannot tolerate partial failure: the underlying
        // operation is one call, so there is no per-row boundary to resume
        // from. Reject the combination before touching any row.
        if !rollback_on_error {
            let error: ErrorEntry =
                ErrorEntry::from_core_error(&CoreError::InvalidConfiguration {
                    reason: format!(
                        "{operation} is a whole-list operation and requires rollback_on_error"
                    ),
                });
            return Err(BulkOperationFailure {
                error,
                result: BulkOperationResult::new(),
            });
        }

        let mut result: BulkOperationResult = BulkOperationResult::new();
        let Some(first) = rows.first() else {
            result.advance_status(ResultStatus::Completed);
            return Ok(result);
        };

        let kind = first.kind();
        if rows.iter().any(|row| row.kind() != kind) {
            let error: ErrorEntry =
                ErrorEntry::from_core_error(&CoreError::InvalidConfiguration {
                    reason: format!("{operation} requires all rows to be of the same record kind"),
                });
            return Err(BulkOperationFailure {
                error,
                result: BulkOperationResult::new(),
            });
        }

        let cause: Cause = bulk_cause(operation, rows.len());
        match self.registry.for_kind(kind).move_all(rows, actor) {
            Ok(moved) => {
                for record in moved {
                    record_success_with_audit(&mut result, record, operation, actor, &cause);
                }
                result.advance_status(ResultStatus::Completed);
                Ok(result)
            }
            Err(core_error) => {
                let entry: ErrorEntry = ErrorEntry::from_core_error(&core_error);
                warn!(
                    operation = %operation,
                    error = %core_error,
                    "Whole-list operation failed"
                );
                result.record_failure(kind, None, entry.clone());
                Err(BulkOperationFailure {
                    error: entry,
                    result,
                })
            }
        }
    }

    /// Invokes one per-record operation for a row.
    fn invoke(
        &self,
        operation: BulkOperationType,
        row: RowRecord,
        actor: &Actor,
    ) -> Result<RowRecord, CoreError> {
        let operations = self.registry.for_kind(row.kind());
        match operation {
            BulkOperationType::Create => operations.create(row, actor),
            BulkOperationType::Update => {
                let id: GlobalId = require_global_id(&row)?;
                operations.update(id, row, actor)
            }
            BulkOperationType::Delete => {
                let id: GlobalId = require_global_id(&row)?;
                operations.delete(id, actor)
            }
            BulkOperationType::Restore => {
                let id: GlobalId = require_global_id(&row)?;
                operations.restore(id, actor)
            }
            BulkOperationType::Duplicate => {
                let id: GlobalId = require_global_id(&row)?;
                operations.duplicate(id, actor)
            }
            BulkOperationType::ChangeOwner => {
                let id: GlobalId = require_global_id(&row)?;
                operations.change_owner(id, row, actor)
            }
            BulkOperationType::UpdateToLatestTemplate => {
                let id: GlobalId = require_global_id(&row)?;
                operations.update_to_latest_template(id, actor)
            }
            BulkOperationType::Move => {
                // Whole-list operations are routed through run_whole_list.
                unreachable!("invoke called with whole-list operation")
            }
        }
    }
}

/// Extracts the persisted identifier an id-addressed operation needs.
fn require_global_id(row: &RowRecord) -> Result<GlobalId, CoreError> {
    row.global_id().ok_or_else(|| {
        CoreError::Validation(DomainError::MissingGlobalId {
            record_kind: row.kind(),
            name: row.name().to_string(),
        })
    })
}

/// Builds the shared cause for every audit event of one bulk call.
fn bulk_cause(operation: BulkOperationType, row_count: usize) -> Cause {
    Cause::new(
        format!("bulk-{}", operation.as_str().to_lowercase()),
        format!("Bulk {operation} over {row_count} rows"),
    )
}

/// Records one successful row and its audit event.
fn record_success_with_audit(
    result: &mut BulkOperationResult,
    record: RowRecord,
    operation: BulkOperationType,
    actor: &Actor,
    cause: &Cause,
) {
    let before: StateSnapshot = StateSnapshot::new(result.to_snapshot_data());
    let subject: Option<GlobalId> = record.global_id();
    let action: Action = Action::new(
        format!("{}{}", operation.as_str(), record.kind().as_str()),
        Some(format!("{} '{}'", operation, record.name())),
    );
    result.record_success(record);
    let after: StateSnapshot = StateSnapshot::new(result.to_snapshot_data());
    result.audit_trail.push(AuditEvent::new(
        actor.clone(),
        cause.clone(),
        action,
        before,
        after,
        subject,
    ));
}
