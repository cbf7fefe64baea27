// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use benchstock_domain::{DomainError, GlobalId, RecordKind, Username};

/// Errors that can occur while dispatching record operations.
#[derive(Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A domain rule was violated.
    Validation(DomainError),
    /// A referenced record does not exist.
    NotFound {
        /// The identifier that did not resolve.
        global_id: GlobalId,
    },
    /// The acting user may not perform the operation on the record.
    PermissionDenied {
        /// The record the operation targeted.
        global_id: GlobalId,
        /// The operation that was attempted.
        action: String,
    },
    /// The record is edit-locked by another user.
    LockConflict {
        /// The locked record.
        global_id: GlobalId,
        /// The user currently holding the lock.
        holder: Username,
    },
    /// A call to an external service failed.
    ExternalService {
        /// The service that failed (e.g., "doi-registration").
        service: String,
        /// The failure description.
        message: String,
    },
    /// The requested combination of operation and options is not allowed.
    InvalidConfiguration {
        /// Description of the rejected configuration.
        reason: String,
    },
    /// The operation is not defined for the record kind.
    UnsupportedOperation {
        /// The operation that was attempted.
        operation: String,
        /// The record kind it was attempted on.
        record_kind: RecordKind,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for CoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "Validation failed: {err}"),
            Self::NotFound { global_id } => write!(f, "Record {global_id} not found"),
            Self::PermissionDenied { global_id, action } => {
                write!(f, "Not permitted to {action} record {global_id}")
            }
            Self::LockConflict { global_id, holder } => {
                write!(f, "Record {global_id} is currently edited by {holder}")
            }
            Self::ExternalService { service, message } => {
                write!(f, "External service '{service}' failed: {message}")
            }
            Self::InvalidConfiguration { reason } => {
                write!(f, "Invalid configuration: {reason}")
            }
            Self::UnsupportedOperation {
                operation,
                record_kind,
            } => {
                write!(f, "Operation '{operation}' is not defined for {record_kind} records")
            }
            Self::Internal { message } => write!(f, "Internal error: {message}"),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        Self::Validation(err)
    }
}
