// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::quantity::{Quantity, Unit};
use crate::types::{GlobalId, RecordKind, Username};
use serde::{Deserialize, Serialize};

/// A reference to a parent record that may not be persisted yet.
///
/// During an import, rows reference each other either by a request-scoped
/// import-id (forward reference to a row in the same request) or by the
/// global identifier of an already persisted record. Setting both is always
/// a validation error; setting neither means "no stated parent" and is only
/// an error where the parent is mandatory.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParentRef {
    /// Reference to a not-yet-persisted row within the same import request.
    pub import_id: Option<String>,
    /// Reference to a persisted record.
    pub global_id: Option<GlobalId>,
}

impl ParentRef {
    /// Creates an empty reference (no stated parent).
    #[must_use]
    pub const fn none() -> Self {
        Self {
            import_id: None,
            global_id: None,
        }
    }

    /// Creates a reference by import-id.
    #[must_use]
    pub fn by_import_id(import_id: &str) -> Self {
        Self {
            import_id: Some(import_id.to_string()),
            global_id: None,
        }
    }

    /// Creates a reference by global identifier.
    #[must_use]
    pub const fn by_global_id(global_id: GlobalId) -> Self {
        Self {
            import_id: None,
            global_id: Some(global_id),
        }
    }

    /// Checks whether neither form of reference is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.import_id.is_none() && self.global_id.is_none()
    }
}

/// The physical layout of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerKind {
    /// An unordered list container; accepts any number of items.
    List,
    /// A fixed grid container; items occupy addressed cells.
    Grid,
    /// A per-user workbench; newly created items are parked here when no
    /// other parent is specified.
    Workbench,
}

impl ContainerKind {
    /// Returns whether items can be moved into this container without a
    /// cell address.
    #[must_use]
    pub const fn accepts_moves(&self) -> bool {
        matches!(self, Self::List | Self::Workbench)
    }
}

/// One container row of a bulk or import request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerRow {
    /// The global identifier, assigned once the row has been persisted.
    pub global_id: Option<GlobalId>,
    /// The request-scoped import-id other rows may reference this row by.
    pub import_id: Option<String>,
    /// The container name.
    pub name: String,
    /// The container layout.
    pub container_kind: ContainerKind,
    /// The target parent container.
    pub parent: ParentRef,
    /// The owning user, set by the persistence layer on creation.
    pub owner: Option<Username>,
}

impl ContainerRow {
    /// Creates a new unpersisted container row.
    #[must_use]
    pub fn new(name: &str, container_kind: ContainerKind) -> Self {
        Self {
            global_id: None,
            import_id: None,
            name: name.to_string(),
            container_kind,
            parent: ParentRef::none(),
            owner: None,
        }
    }
}

/// One sample row of a bulk or import request.
///
/// A sample row may embed subsample rows; the create operation for a sample
/// atomically creates the sample and its embedded subsamples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRow {
    /// The global identifier, assigned once the row has been persisted.
    pub global_id: Option<GlobalId>,
    /// The request-scoped import-id other rows may reference this row by.
    pub import_id: Option<String>,
    /// The sample name.
    pub name: String,
    /// The template this sample is instantiated from.
    pub template: Option<GlobalId>,
    /// The total quantity of the sample.
    pub quantity: Option<Quantity>,
    /// The target parent container for the sample's subsamples.
    pub parent: ParentRef,
    /// Embedded subsample rows, created together with the sample.
    pub subsamples: Vec<SubSampleRow>,
    /// The owning user, set by the persistence layer on creation.
    pub owner: Option<Username>,
}

impl SampleRow {
    /// Creates a new unpersisted sample row.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            global_id: None,
            import_id: None,
            name: name.to_string(),
            template: None,
            quantity: None,
            parent: ParentRef::none(),
            subsamples: Vec::new(),
            owner: None,
        }
    }
}

/// One subsample row of a bulk or import request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubSampleRow {
    /// The global identifier, assigned once the row has been persisted.
    pub global_id: Option<GlobalId>,
    /// The request-scoped import-id other rows may reference this row by.
    pub import_id: Option<String>,
    /// The subsample name.
    pub name: String,
    /// The parent sample. Mandatory: every subsample belongs to a sample.
    pub parent_sample: ParentRef,
    /// The target container. Optional; when unset the subsample inherits
    /// its parent sample's container reference or falls back to the
    /// import's default container.
    pub parent_container: ParentRef,
    /// The quantity held by this subsample.
    pub quantity: Option<Quantity>,
    /// The owning user, set by the persistence layer on creation.
    pub owner: Option<Username>,
}

impl SubSampleRow {
    /// Creates a new unpersisted subsample row.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            global_id: None,
            import_id: None,
            name: name.to_string(),
            parent_sample: ParentRef::none(),
            parent_container: ParentRef::none(),
            quantity: None,
            owner: None,
        }
    }
}

/// One sample-template row of a bulk or import request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateRow {
    /// The global identifier, assigned once the row has been persisted.
    pub global_id: Option<GlobalId>,
    /// The request-scoped import-id.
    pub import_id: Option<String>,
    /// The template name.
    pub name: String,
    /// The default quantity unit for samples created from this template.
    pub default_unit: Unit,
    /// The owning user, set by the persistence layer on creation.
    pub owner: Option<Username>,
}

impl TemplateRow {
    /// Creates a new unpersisted template row.
    #[must_use]
    pub fn new(name: &str, default_unit: Unit) -> Self {
        Self {
            global_id: None,
            import_id: None,
            name: name.to_string(),
            default_unit,
            owner: None,
        }
    }
}

/// A row of a bulk or import request, tagged by record kind.
///
/// This is the unit of work the dispatcher operates on: a heterogeneous
/// batch is a list of these, and the matching record operations are looked
/// up by the row's kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RowRecord {
    /// A container row.
    Container(ContainerRow),
    /// A sample row.
    Sample(SampleRow),
    /// A subsample row.
    SubSample(SubSampleRow),
    /// A sample-template row.
    Template(TemplateRow),
}

impl RowRecord {
    /// Returns the record kind of this row.
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        match self {
            Self::Container(_) => RecordKind::Container,
            Self::Sample(_) => RecordKind::Sample,
            Self::SubSample(_) => RecordKind::SubSample,
            Self::Template(_) => RecordKind::SampleTemplate,
        }
    }

    /// Returns the row's name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Container(row) => &row.name,
            Self::Sample(row) => &row.name,
            Self::SubSample(row) => &row.name,
            Self::Template(row) => &row.name,
        }
    }

    /// Returns the row's import-id, if one was supplied.
    #[must_use]
    pub fn import_id(&self) -> Option<&str> {
        match self {
            Self::Container(row) => row.import_id.as_deref(),
            Self::Sample(row) => row.import_id.as_deref(),
            Self::SubSample(row) => row.import_id.as_deref(),
            Self::Template(row) => row.import_id.as_deref(),
        }
    }

    /// Returns the row's global identifier, if it has been persisted.
    #[must_use]
    pub const fn global_id(&self) -> Option<GlobalId> {
        match self {
            Self::Container(row) => row.global_id,
            Self::Sample(row) => row.global_id,
            Self::SubSample(row) => row.global_id,
            Self::Template(row) => row.global_id,
        }
    }

    /// Returns a copy of this row carrying the given global identifier.
    #[must_use]
    pub fn with_global_id(mut self, global_id: GlobalId) -> Self {
        match &mut self {
            Self::Container(row) => row.global_id = Some(global_id),
            Self::Sample(row) => row.global_id = Some(global_id),
            Self::SubSample(row) => row.global_id = Some(global_id),
            Self::Template(row) => row.global_id = Some(global_id),
        }
        self
    }

    /// Returns the row's owner, when the persistence layer has set one.
    #[must_use]
    pub const fn owner(&self) -> Option<&Username> {
        match self {
            Self::Container(row) => row.owner.as_ref(),
            Self::Sample(row) => row.owner.as_ref(),
            Self::SubSample(row) => row.owner.as_ref(),
            Self::Template(row) => row.owner.as_ref(),
        }
    }

    /// Replaces the row's owner.
    pub fn set_owner(&mut self, owner: Username) {
        match self {
            Self::Container(row) => row.owner = Some(owner),
            Self::Sample(row) => row.owner = Some(owner),
            Self::SubSample(row) => row.owner = Some(owner),
            Self::Template(row) => row.owner = Some(owner),
        }
    }

    /// Returns the row's target-container reference, where the kind has one.
    ///
    /// For subsamples this is the `parent_container` reference, not the
    /// mandatory parent-sample reference. Templates have no parent.
    #[must_use]
    pub const fn parent_container_ref(&self) -> Option<&ParentRef> {
        match self {
            Self::Container(row) => Some(&row.parent),
            Self::Sample(row) => Some(&row.parent),
            Self::SubSample(row) => Some(&row.parent_container),
            Self::Template(_) => None,
        }
    }

    /// Replaces the row's target-container reference, where the kind has one.
    pub fn set_parent_container_ref(&mut self, parent: ParentRef) {
        match self {
            Self::Container(row) => row.parent = parent,
            Self::Sample(row) => row.parent = parent,
            Self::SubSample(row) => row.parent_container = parent,
            Self::Template(_) => {}
        }
    }
}
