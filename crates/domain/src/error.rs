// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::quantity::{Unit, UnitFamily};
use crate::types::RecordKind;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Record name is empty or invalid.
    InvalidName(String),
    /// Global identifier could not be parsed.
    InvalidGlobalId(String),
    /// Unit string could not be parsed.
    InvalidUnit(String),
    /// Quantity value is negative or not finite.
    InvalidQuantity {
        /// The rejected value.
        value: f64,
        /// Description of the validation failure.
        reason: String,
    },
    /// A subsample quantity uses a unit family incompatible with its parent sample.
    IncompatibleUnits {
        /// The unit carried by the parent sample.
        parent_unit: Unit,
        /// The unit family of the parent sample.
        parent_family: UnitFamily,
        /// The unit carried by the subsample.
        subsample_unit: Unit,
        /// The unit family of the subsample.
        subsample_family: UnitFamily,
    },
    /// A parent reference sets both an import-id and a global identifier.
    AmbiguousReference {
        /// The import-id that was set.
        import_id: String,
        /// The global identifier that was set, rendered as a string.
        global_id: String,
    },
    /// A mandatory parent reference sets neither an import-id nor a global identifier.
    MissingReference {
        /// The record kind whose parent reference is mandatory.
        record_kind: RecordKind,
    },
    /// An import-id does not resolve to any row of the expected kind.
    UnknownImportId {
        /// The unresolved import-id.
        import_id: String,
        /// The record kind the reference was expected to resolve within.
        expected_kind: RecordKind,
    },
    /// An import-id appears on more than one row of the same kind.
    DuplicateImportId {
        /// The duplicated import-id.
        import_id: String,
        /// The record kind within which the duplicate was found.
        record_kind: RecordKind,
    },
    /// A referenced container cannot receive moved items.
    ContainerNotListable {
        /// The global identifier of the rejected container, rendered as a string.
        global_id: String,
    },
    /// A row that must carry a persisted identifier does not have one.
    MissingGlobalId {
        /// The record kind of the offending row.
        record_kind: RecordKind,
        /// The row's name, for the per-row report.
        name: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(msg) => write!(f, "Invalid name: {msg}"),
            Self::InvalidGlobalId(msg) => write!(f, "Invalid global identifier: {msg}"),
            Self::InvalidUnit(msg) => write!(f, "Invalid unit: {msg}"),
            Self::InvalidQuantity { value, reason } => {
                write!(f, "Invalid quantity {value}: {reason}")
            }
            Self::IncompatibleUnits {
                parent_unit,
                parent_family,
                subsample_unit,
                subsample_family,
            } => {
                write!(
                    f,
                    "Subsample quantity in {subsample_unit} ({subsample_family}) is incompatible with parent sample unit {parent_unit} ({parent_family})"
                )
            }
            Self::AmbiguousReference {
                import_id,
                global_id,
            } => {
                write!(
                    f,
                    "Parent reference sets both import-id '{import_id}' and identifier '{global_id}'; exactly one may be set"
                )
            }
            Self::MissingReference { record_kind } => {
                write!(
                    f,
                    "{record_kind} rows require a parent reference, but neither an import-id nor an identifier was set"
                )
            }
            Self::UnknownImportId {
                import_id,
                expected_kind,
            } => {
                write!(
                    f,
                    "Import-id '{import_id}' does not match any {expected_kind} row in this request"
                )
            }
            Self::DuplicateImportId {
                import_id,
                record_kind,
            } => {
                write!(
                    f,
                    "Import-id '{import_id}' appears on more than one {record_kind} row"
                )
            }
            Self::ContainerNotListable { global_id } => {
                write!(
                    f,
                    "Container {global_id} cannot receive items; only list and workbench containers can"
                )
            }
            Self::MissingGlobalId { record_kind, name } => {
                write!(
                    f,
                    "{record_kind} row '{name}' has no persisted identifier"
                )
            }
        }
    }
}

impl std::error::Error for DomainError {}
