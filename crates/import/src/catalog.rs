// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use benchstock::CoreError;
use benchstock_audit::Actor;
use benchstock_domain::{ContainerKind, GlobalId, RowRecord, Unit};

/// What the resolver needs to know about a persisted container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    /// The container's identifier.
    pub global_id: GlobalId,
    /// The container's layout, which decides whether it can receive moves.
    pub kind: ContainerKind,
}

/// What the resolver needs to know about a persisted sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleInfo {
    /// The sample's identifier.
    pub global_id: GlobalId,
    /// The sample's quantity unit, when it tracks one.
    pub unit: Option<Unit>,
}

/// What the resolver needs to know about a persisted sample template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateInfo {
    /// The template's identifier.
    pub global_id: GlobalId,
    /// The default quantity unit for samples created from the template.
    pub default_unit: Option<Unit>,
}

/// The permission/edit-check and reload collaborator.
///
/// Implementations sit in front of persistence and the permission model;
/// every method is a fallible synchronous call that reports not-found and
/// no-permission conditions through [`CoreError`]. The resolver treats the
/// checks as black boxes and records their failures as per-row errors.
pub trait RecordCatalog {
    /// Checks that a container exists and the actor may add items to it.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` or `CoreError::PermissionDenied` when
    /// the check fails.
    fn container_info(&self, id: GlobalId, actor: &Actor) -> Result<ContainerInfo, CoreError>;

    /// Checks that a sample exists and the actor may extend it.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` or `CoreError::PermissionDenied` when
    /// the check fails.
    fn sample_info(&self, id: GlobalId, actor: &Actor) -> Result<SampleInfo, CoreError>;

    /// Checks that a sample template exists and the actor may use it.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` or `CoreError::PermissionDenied` when
    /// the check fails.
    fn template_info(&self, id: GlobalId, actor: &Actor) -> Result<TemplateInfo, CoreError>;

    /// Reloads a record from persistence.
    ///
    /// Move operations mutate records server-side in ways in-memory copies
    /// may not reflect; the resolver reloads every created record before
    /// returning its aggregate result.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::NotFound` if the record vanished.
    fn reload(&self, id: GlobalId, actor: &Actor) -> Result<RowRecord, CoreError>;
}
