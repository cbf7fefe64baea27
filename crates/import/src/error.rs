// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::session::{ImportResult, ImportStage};
use benchstock::{ErrorCode, ErrorEntry, FieldError};
use thiserror::Error;

/// An import that stopped at a failing stage.
///
/// The partial result accumulated before the failure is embedded so a
/// per-row report can still be rendered. Imports are all-or-nothing at the
/// stage granularity: nothing past the failing stage was attempted, and
/// records created by earlier stages are not undone.
#[derive(Debug, Clone, Error)]
#[error("Import failed during {stage}: {}", .error.message)]
pub struct ImportFailure {
    /// The stage the import stopped in.
    pub stage: ImportStage,
    /// The error that stopped it.
    pub error: ErrorEntry,
    /// Everything accumulated up to the failure point.
    pub result: ImportResult,
}

/// Merges a row's collected errors into one structured entry.
///
/// Prevalidation collects every failure a row has rather than stopping at
/// the first; the merged entry keeps one field entry per underlying error
/// and takes its code from the first.
#[must_use]
pub(crate) fn merge_row_errors(errors: &[ErrorEntry]) -> ErrorEntry {
    let code: ErrorCode = errors.first().map_or(ErrorCode::Internal, |entry| entry.code);
    let message: String = errors
        .iter()
        .map(|entry| entry.message.as_str())
        .collect::<Vec<&str>>()
        .join("; ");
    let field_errors: Vec<FieldError> = errors
        .iter()
        .flat_map(|entry| entry.field_errors.iter().cloned())
        .collect();

    ErrorEntry {
        code,
        message,
        field_errors,
    }
}
