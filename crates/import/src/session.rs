// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use benchstock::{ErrorEntry, PartialResult, ResultStatus, RowOutcome};
use benchstock_domain::{
    ContainerRow, DomainError, GlobalId, RecordKind, RowRecord, SampleRow, SubSampleRow,
    TemplateRow,
};
use serde::Serialize;
use std::collections::HashMap;

/// The stages an import session moves through.
///
/// Stages advance strictly forward; a validation failure escapes to
/// `PrevalidationError` and any later failure escapes to `ImportError`.
/// Both escape states and `Complete` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImportStage {
    /// Rows are loaded and indexed by import-id.
    Parse,
    /// Cross-references and units are checked; nothing is persisted.
    Prevalidate,
    /// Containers are created flat, without parents.
    CreateContainers,
    /// The request's new template, if any, is created.
    CreateTemplate,
    /// Samples and their embedded subsamples are created.
    CreateSamples,
    /// Standalone subsamples of pre-existing samples are created.
    CreateSubSamples,
    /// Created records are moved into their resolved parents.
    ResolveMoves,
    /// The import finished; all records are created and moved.
    Complete,
    /// Prevalidation found errors; nothing was created.
    PrevalidationError,
    /// A creation or move stage failed; the import stopped there.
    ImportError,
}

impl ImportStage {
    /// Converts this stage to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Parse => "Parse",
            Self::Prevalidate => "Prevalidate",
            Self::CreateContainers => "CreateContainers",
            Self::CreateTemplate => "CreateTemplate",
            Self::CreateSamples => "CreateSamples",
            Self::CreateSubSamples => "CreateSubSamples",
            Self::ResolveMoves => "ResolveMoves",
            Self::Complete => "Complete",
            Self::PrevalidationError => "PrevalidationError",
            Self::ImportError => "ImportError",
        }
    }

    /// Checks if a transition from this stage to another is valid.
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Parse, Self::Prevalidate)
                | (Self::Prevalidate, Self::CreateContainers | Self::PrevalidationError)
                | (Self::CreateContainers, Self::CreateTemplate)
                | (Self::CreateTemplate, Self::CreateSamples)
                | (Self::CreateSamples, Self::CreateSubSamples)
                | (Self::CreateSubSamples, Self::ResolveMoves)
                | (Self::ResolveMoves, Self::Complete)
                | (
                    Self::CreateContainers
                        | Self::CreateTemplate
                        | Self::CreateSamples
                        | Self::CreateSubSamples
                        | Self::ResolveMoves,
                    Self::ImportError
                )
        )
    }
}

impl std::fmt::Display for ImportStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the import request specifies the sample template.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateSpec {
    /// Use an already persisted template.
    Existing(GlobalId),
    /// Create this template first, then instantiate samples from it.
    New(TemplateRow),
}

/// One import request: the parsed rows of every kind plus the template.
///
/// Rows arrive already mapped from CSV columns (the mapping itself is the
/// intake boundary's concern); import-ids are resolved against the rows of
/// this one request only.
#[derive(Debug, Clone, Default)]
pub struct ImportRequest {
    /// Container rows, in CSV order.
    pub containers: Vec<ContainerRow>,
    /// Sample rows, in CSV order.
    pub samples: Vec<SampleRow>,
    /// Subsample rows, in CSV order.
    pub subsamples: Vec<SubSampleRow>,
    /// The template samples are instantiated from, when samples are present.
    pub template: Option<TemplateSpec>,
}

impl ImportRequest {
    /// Creates an empty request.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// The aggregate outcome of one import call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportResult {
    /// Per-row outcomes for container rows.
    pub containers: PartialResult,
    /// Per-row outcomes for sample rows.
    pub samples: PartialResult,
    /// Per-row outcomes for subsample rows.
    pub subsamples: PartialResult,
    /// Per-row outcomes for template rows.
    pub templates: PartialResult,
    /// The overall lifecycle status.
    pub status: ResultStatus,
    /// The lazily created "imported items" container, when any row needed
    /// the default-parent fallback.
    pub default_container: Option<RowRecord>,
}

/// A request-scoped index from import-id to row position for one kind.
///
/// Built before any row is created, so forward references resolve against
/// pending rows rather than persisted records.
#[derive(Debug, Clone, Default)]
pub struct ImportIdIndex {
    positions: HashMap<String, usize>,
}

impl ImportIdIndex {
    /// Builds the index for one kind's rows, detecting duplicates.
    ///
    /// # Arguments
    ///
    /// * `import_ids` - Each row's import-id, in row order
    /// * `kind` - The record kind, for duplicate error reporting
    ///
    /// # Returns
    ///
    /// The index plus one error per row whose import-id repeats an
    /// earlier row's.
    #[must_use]
    pub fn build(
        import_ids: &[Option<&str>],
        kind: RecordKind,
    ) -> (Self, Vec<(usize, DomainError)>) {
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut duplicates: Vec<(usize, DomainError)> = Vec::new();

        for (position, import_id) in import_ids.iter().enumerate() {
            let Some(import_id) = import_id else {
                continue;
            };
            if positions.contains_key(*import_id) {
                duplicates.push((
                    position,
                    DomainError::DuplicateImportId {
                        import_id: (*import_id).to_string(),
                        record_kind: kind,
                    },
                ));
                continue;
            }
            positions.insert((*import_id).to_string(), position);
        }

        (Self { positions }, duplicates)
    }

    /// Returns the row position registered for an import-id.
    #[must_use]
    pub fn position_of(&self, import_id: &str) -> Option<usize> {
        self.positions.get(import_id).copied()
    }

    /// Checks whether an import-id is registered.
    #[must_use]
    pub fn contains(&self, import_id: &str) -> bool {
        self.positions.contains_key(import_id)
    }
}

/// Order-preserving outcome slots for one kind's rows.
///
/// Different stages fill different positions (spliced subsamples during
/// sample creation, standalone ones later); the slots keep every outcome at
/// its original row position until the result is frozen.
#[derive(Debug, Clone)]
pub struct OutcomeSlots {
    slots: Vec<Option<RowOutcome>>,
}

impl OutcomeSlots {
    /// Creates `len` empty slots.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![None; len],
        }
    }

    /// Records a success at a row position.
    pub fn set_success(&mut self, position: usize, record: RowRecord) {
        if let Some(slot) = self.slots.get_mut(position) {
            *slot = Some(RowOutcome::Success(record));
        }
    }

    /// Records a failure at a row position.
    pub fn set_failure(&mut self, position: usize, error: ErrorEntry) {
        if let Some(slot) = self.slots.get_mut(position) {
            *slot = Some(RowOutcome::Failure(error));
        }
    }

    /// Returns the successful record at a row position, if any.
    #[must_use]
    pub fn success_at(&self, position: usize) -> Option<&RowRecord> {
        self.slots
            .get(position)
            .and_then(|slot| slot.as_ref())
            .and_then(RowOutcome::record)
    }

    /// Replaces the successful record at a position, keeping failures.
    pub fn replace_success(&mut self, position: usize, record: RowRecord) {
        if let Some(slot) = self.slots.get_mut(position)
            && matches!(slot, Some(RowOutcome::Success(_)))
        {
            *slot = Some(RowOutcome::Success(record));
        }
    }

    /// Freezes the slots into a [`PartialResult`].
    ///
    /// Filled slots are emitted in row order and indexed by the matching
    /// import-id; rows a failed import never reached are simply absent.
    ///
    /// # Arguments
    ///
    /// * `import_ids` - Each row's import-id, in row order
    /// * `status` - The lifecycle status to stamp on the result
    #[must_use]
    pub fn freeze(&self, import_ids: &[Option<&str>], status: ResultStatus) -> PartialResult {
        let mut result: PartialResult = PartialResult::new();
        for (position, slot) in self.slots.iter().enumerate() {
            let import_id: Option<&str> = import_ids.get(position).copied().flatten();
            match slot {
                Some(RowOutcome::Success(record)) => result.push_success(record.clone()),
                Some(RowOutcome::Failure(error)) => {
                    result.push_failure(import_id, error.clone());
                }
                None => {}
            }
        }
        result.advance_status(status);
        result
    }

    /// Returns an iterator over the filled positions and their outcomes.
    pub fn filled(&self) -> impl Iterator<Item = (usize, &RowOutcome)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(position, slot)| slot.as_ref().map(|outcome| (position, outcome)))
    }
}
