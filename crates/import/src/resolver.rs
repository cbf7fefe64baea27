// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Staged import execution with forward-reference resolution.
//!
//! Records are created flat first and moved into their resolved parents in
//! a deferred pass, so a row may reference a parent that does not exist
//! until partway through the same import. This avoids topologically sorting
//! the container list by dependency. Imports are all-or-nothing at the
//! stage granularity: every creation stage dispatches with fail-fast
//! semantics, and the first failing stage stops the import.

use crate::catalog::RecordCatalog;
use crate::error::{ImportFailure, merge_row_errors};
use crate::prevalidate::{Prevalidation, prevalidate};
use crate::session::{
    ImportIdIndex, ImportRequest, ImportResult, ImportStage, OutcomeSlots, TemplateSpec,
};
use benchstock::{
    BulkOperationDispatcher, BulkOperationFailure, BulkOperationResult, BulkOperationType,
    CoreError, ErrorEntry, ResultStatus, RowOutcome,
};
use benchstock_audit::Actor;
use benchstock_domain::{
    ContainerKind, ContainerRow, DomainError, GlobalId, ParentRef, RecordKind, RowRecord,
    SampleRow, SubSampleRow,
};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// The name of the lazily created fallback container.
const DEFAULT_CONTAINER_NAME: &str = "imported items";

/// Duplicate import-id findings for one record kind, by row position.
type DuplicateErrors = Vec<(usize, ErrorEntry)>;

/// One subsample row spliced into a sample row's embedded list.
#[derive(Debug, Clone)]
struct Splice {
    /// The subsample row's original position in the request.
    subsample_position: usize,
    /// The position of the sample row it was spliced into.
    sample_position: usize,
    /// The index it occupies in that sample's embedded list.
    embed_position: usize,
}

/// Resolves and executes one import request end to end.
pub struct ImportResolver<C: RecordCatalog> {
    dispatcher: BulkOperationDispatcher,
    catalog: C,
    default_container_name: String,
}

impl<C: RecordCatalog> ImportResolver<C> {
    /// Creates a resolver over the given dispatcher and catalog.
    ///
    /// # Arguments
    ///
    /// * `dispatcher` - Executes the creation and move stages
    /// * `catalog` - The permission/edit-check and reload collaborator
    #[must_use]
    pub fn new(dispatcher: BulkOperationDispatcher, catalog: C) -> Self {
        Self {
            dispatcher,
            catalog,
            default_container_name: String::from(DEFAULT_CONTAINER_NAME),
        }
    }

    /// Overrides the name of the lazily created fallback container.
    #[must_use]
    pub fn with_default_container_name(mut self, name: &str) -> Self {
        self.default_container_name = name.to_string();
        self
    }

    /// Imports containers, samples and subsamples that may reference each
    /// other by import-id.
    ///
    /// Prevalidation failures produce an `Ok` result with status
    /// [`ResultStatus::PrevalidationError`] and nothing created; failures
    /// in any later stage raise [`ImportFailure`] carrying everything
    /// accumulated up to that point.
    ///
    /// # Arguments
    ///
    /// * `request` - The parsed rows plus the template specification
    /// * `actor` - The acting user
    ///
    /// # Errors
    ///
    /// Returns [`ImportFailure`] when a creation, move, or reload stage
    /// fails. Records created by earlier stages are not undone.
    #[allow(clippy::result_large_err)]
    pub fn import_all(
        &self,
        request: ImportRequest,
        actor: &Actor,
    ) -> Result<ImportResult, ImportFailure> {
        let mut run: ImportRun<'_, C> = ImportRun::new(self, request, actor);
        run.execute()
    }
}

impl<C: RecordCatalog> std::fmt::Debug for ImportResolver<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportResolver").finish_non_exhaustive()
    }
}

/// Working state for one import call.
///
/// No state is shared between concurrent imports; each call builds its own
/// run and drives it to completion on the invoking thread.
struct ImportRun<'a, C: RecordCatalog> {
    resolver: &'a ImportResolver<C>,
    actor: &'a Actor,
    stage: ImportStage,
    containers: Vec<ContainerRow>,
    samples: Vec<SampleRow>,
    subsamples: Vec<SubSampleRow>,
    template: Option<TemplateSpec>,
    container_index: ImportIdIndex,
    sample_index: ImportIdIndex,
    /// How many embedded subsamples each sample row carried before splicing.
    original_embed_counts: Vec<usize>,
    splices: Vec<Splice>,
    standalone: Vec<usize>,
    container_slots: OutcomeSlots,
    sample_slots: OutcomeSlots,
    subsample_slots: OutcomeSlots,
    template_slots: OutcomeSlots,
    container_map: HashMap<String, GlobalId>,
    template_id: Option<GlobalId>,
    default_container: Option<RowRecord>,
}

impl<'a, C: RecordCatalog> ImportRun<'a, C> {
    fn new(resolver: &'a ImportResolver<C>, request: ImportRequest, actor: &'a Actor) -> Self {
        let container_count: usize = request.containers.len();
        let sample_count: usize = request.samples.len();
        let subsample_count: usize = request.subsamples.len();
        let original_embed_counts: Vec<usize> = request
            .samples
            .iter()
            .map(|sample| sample.subsamples.len())
            .collect();

        Self {
            resolver,
            actor,
            stage: ImportStage::Parse,
            containers: request.containers,
            samples: request.samples,
            subsamples: request.subsamples,
            template: request.template,
            container_index: ImportIdIndex::default(),
            sample_index: ImportIdIndex::default(),
            original_embed_counts,
            splices: Vec::new(),
            standalone: Vec::new(),
            container_slots: OutcomeSlots::new(container_count),
            sample_slots: OutcomeSlots::new(sample_count),
            subsample_slots: OutcomeSlots::new(subsample_count),
            template_slots: OutcomeSlots::new(1),
            container_map: HashMap::new(),
            template_id: None,
            default_container: None,
        }
    }

    fn advance(&mut self, next: ImportStage) {
        if self.stage.can_transition_to(next) {
            debug!(from = %self.stage, to = %next, "Import stage transition");
            self.stage = next;
        }
    }

    #[allow(clippy::result_large_err)]
    fn execute(&mut self) -> Result<ImportResult, ImportFailure> {
        info!(
            containers = self.containers.len(),
            samples = self.samples.len(),
            subsamples = self.subsamples.len(),
            "Starting import"
        );

        let duplicate_errors: (DuplicateErrors, DuplicateErrors, DuplicateErrors) =
            self.build_indexes();
        self.advance(ImportStage::Prevalidate);

        if let Some(result) = self.run_prevalidation(duplicate_errors) {
            return Ok(result);
        }

        self.splice_embedded_subsamples();

        self.advance(ImportStage::CreateContainers);
        self.create_containers()?;

        self.advance(ImportStage::CreateTemplate);
        self.create_template()?;

        self.advance(ImportStage::CreateSamples);
        self.create_samples()?;

        self.advance(ImportStage::CreateSubSamples);
        self.create_standalone_subsamples()?;

        self.advance(ImportStage::ResolveMoves);
        self.move_containers()?;
        self.move_subsamples()?;
        self.reload_created_records()?;

        self.advance(ImportStage::Complete);
        info!("Import complete");
        Ok(self.build_result(ResultStatus::Completed))
    }

    /// Builds the per-kind import-id indexes, collecting duplicate errors.
    fn build_indexes(&mut self) -> (DuplicateErrors, DuplicateErrors, DuplicateErrors) {
        let container_ids: Vec<Option<&str>> = self
            .containers
            .iter()
            .map(|row| row.import_id.as_deref())
            .collect();
        let (container_index, container_duplicates) =
            ImportIdIndex::build(&container_ids, RecordKind::Container);

        let sample_ids: Vec<Option<&str>> = self
            .samples
            .iter()
            .map(|row| row.import_id.as_deref())
            .collect();
        let (sample_index, sample_duplicates) =
            ImportIdIndex::build(&sample_ids, RecordKind::Sample);

        let subsample_ids: Vec<Option<&str>> = self
            .subsamples
            .iter()
            .map(|row| row.import_id.as_deref())
            .collect();
        let (_, subsample_duplicates) =
            ImportIdIndex::build(&subsample_ids, RecordKind::SubSample);

        self.container_index = container_index;
        self.sample_index = sample_index;

        (
            to_error_entries(container_duplicates),
            to_error_entries(sample_duplicates),
            to_error_entries(subsample_duplicates),
        )
    }

    /// Runs prevalidation; a `Some` return is the terminal error report.
    fn run_prevalidation(
        &mut self,
        duplicate_errors: (DuplicateErrors, DuplicateErrors, DuplicateErrors),
    ) -> Option<ImportResult> {
        let request: ImportRequest = ImportRequest {
            containers: self.containers.clone(),
            samples: self.samples.clone(),
            subsamples: self.subsamples.clone(),
            template: self.template.clone(),
        };
        let mut outcome: Prevalidation = prevalidate(
            &request,
            &self.container_index,
            &self.sample_index,
            &self.resolver.catalog,
            self.actor,
        );

        let (container_duplicates, sample_duplicates, subsample_duplicates) = duplicate_errors;
        for (position, entry) in container_duplicates {
            outcome.container_errors[position].push(entry);
        }
        for (position, entry) in sample_duplicates {
            outcome.sample_errors[position].push(entry);
        }
        for (position, entry) in subsample_duplicates {
            outcome.subsample_errors[position].push(entry);
        }

        if !outcome.has_errors() {
            return None;
        }

        warn!("Import prevalidation failed; nothing will be created");
        self.advance(ImportStage::PrevalidationError);

        self.fill_prevalidation_slots(&outcome);
        Some(self.build_result(ResultStatus::PrevalidationError))
    }

    /// Records one outcome per row from the prevalidation report.
    fn fill_prevalidation_slots(&mut self, outcome: &Prevalidation) {
        for (position, errors) in outcome.container_errors.iter().enumerate() {
            if errors.is_empty() {
                let record: RowRecord = RowRecord::Container(self.containers[position].clone());
                self.container_slots.set_success(position, record);
            } else {
                self.container_slots
                    .set_failure(position, merge_row_errors(errors));
            }
        }
        for (position, errors) in outcome.sample_errors.iter().enumerate() {
            if errors.is_empty() {
                let record: RowRecord = RowRecord::Sample(self.samples[position].clone());
                self.sample_slots.set_success(position, record);
            } else {
                self.sample_slots
                    .set_failure(position, merge_row_errors(errors));
            }
        }
        for (position, errors) in outcome.subsample_errors.iter().enumerate() {
            if errors.is_empty() {
                let record: RowRecord = RowRecord::SubSample(self.subsamples[position].clone());
                self.subsample_slots.set_success(position, record);
            } else {
                self.subsample_slots
                    .set_failure(position, merge_row_errors(errors));
            }
        }
        if !outcome.template_errors.is_empty() {
            self.template_slots
                .set_failure(0, merge_row_errors(&outcome.template_errors));
        }
    }

    /// Splices import-id-referenced subsample rows into their sample rows.
    ///
    /// A sample's create operation atomically creates its embedded
    /// subsamples, so subsamples whose parent does not exist yet ride along
    /// instead of needing a create call of their own.
    fn splice_embedded_subsamples(&mut self) {
        for (position, subsample) in self.subsamples.iter().enumerate() {
            let Some(import_id) = &subsample.parent_sample.import_id else {
                self.standalone.push(position);
                continue;
            };
            let Some(sample_position) = self.sample_index.position_of(import_id) else {
                // Prevalidation guarantees resolution; an unresolved id
                // here means the row list changed under us.
                self.standalone.push(position);
                continue;
            };

            let mut embedded: SubSampleRow = subsample.clone();
            embedded.parent_sample = ParentRef::none();
            let embed_position: usize = self.samples[sample_position].subsamples.len();
            self.samples[sample_position].subsamples.push(embedded);
            self.splices.push(Splice {
                subsample_position: position,
                sample_position,
                embed_position,
            });
        }
        debug!(
            spliced = self.splices.len(),
            standalone = self.standalone.len(),
            "Partitioned subsample rows"
        );
    }

    /// Creates all containers flat, recording the import-id mapping.
    #[allow(clippy::result_large_err)]
    fn create_containers(&mut self) -> Result<(), ImportFailure> {
        if self.containers.is_empty() {
            return Ok(());
        }

        let rows: Vec<RowRecord> = self
            .containers
            .iter()
            .map(|container| {
                let mut flat: ContainerRow = container.clone();
                flat.parent = ParentRef::none();
                RowRecord::Container(flat)
            })
            .collect();

        let outcomes: Vec<RowOutcome> =
            self.dispatch_create(ImportStage::CreateContainers, rows)?;
        for (position, outcome) in outcomes.iter().enumerate() {
            if let RowOutcome::Success(record) = outcome {
                self.container_slots.set_success(position, record.clone());
                if let (Some(import_id), Some(global_id)) =
                    (record.import_id(), record.global_id())
                {
                    self.container_map
                        .insert(import_id.to_string(), global_id);
                }
            }
        }
        Ok(())
    }

    /// Creates the requested template, threading its id into sample rows.
    #[allow(clippy::result_large_err)]
    fn create_template(&mut self) -> Result<(), ImportFailure> {
        match self.template.clone() {
            None => {}
            Some(TemplateSpec::Existing(global_id)) => {
                self.template_id = Some(global_id);
            }
            Some(TemplateSpec::New(row)) => {
                let outcomes: Vec<RowOutcome> = self.dispatch_create(
                    ImportStage::CreateTemplate,
                    vec![RowRecord::Template(row)],
                )?;
                if let Some(RowOutcome::Success(record)) = outcomes.first() {
                    self.template_id = record.global_id();
                    self.template_slots.set_success(0, record.clone());
                }
            }
        }

        if let Some(template_id) = self.template_id {
            for sample in &mut self.samples {
                if sample.template.is_none() {
                    sample.template = Some(template_id);
                }
            }
        }
        Ok(())
    }

    /// Creates all samples, with embedded subsamples riding along.
    #[allow(clippy::result_large_err)]
    fn create_samples(&mut self) -> Result<(), ImportFailure> {
        if self.samples.is_empty() {
            return Ok(());
        }

        let rows: Vec<RowRecord> = self
            .samples
            .iter()
            .map(|sample| {
                let mut flat: SampleRow = sample.clone();
                flat.parent = ParentRef::none();
                RowRecord::Sample(flat)
            })
            .collect();

        let outcomes: Vec<RowOutcome> = self.dispatch_create(ImportStage::CreateSamples, rows)?;
        for (position, outcome) in outcomes.iter().enumerate() {
            if let RowOutcome::Success(record) = outcome {
                self.sample_slots.set_success(position, record.clone());
            }
        }
        self.record_spliced_outcomes();
        Ok(())
    }

    /// Copies created embedded subsamples back to their original rows.
    fn record_spliced_outcomes(&mut self) {
        for splice in &self.splices {
            let Some(RowRecord::Sample(created)) =
                self.sample_slots.success_at(splice.sample_position)
            else {
                continue;
            };
            if let Some(embedded) = created.subsamples.get(splice.embed_position) {
                let mut record: SubSampleRow = embedded.clone();
                record.import_id = self.subsamples[splice.subsample_position]
                    .import_id
                    .clone();
                self.subsample_slots
                    .set_success(splice.subsample_position, RowRecord::SubSample(record));
            }
        }
    }

    /// Creates subsamples whose parent sample already persisted.
    #[allow(clippy::result_large_err)]
    fn create_standalone_subsamples(&mut self) -> Result<(), ImportFailure> {
        if self.standalone.is_empty() {
            return Ok(());
        }

        let rows: Vec<RowRecord> = self
            .standalone
            .iter()
            .map(|&position| {
                let mut flat: SubSampleRow = self.subsamples[position].clone();
                flat.parent_container = ParentRef::none();
                RowRecord::SubSample(flat)
            })
            .collect();

        let outcomes: Vec<RowOutcome> =
            self.dispatch_create(ImportStage::CreateSubSamples, rows)?;
        for (index, outcome) in outcomes.iter().enumerate() {
            if let RowOutcome::Success(record) = outcome {
                let position: usize = self.standalone[index];
                self.subsample_slots.set_success(position, record.clone());
            }
        }
        Ok(())
    }

    /// Moves created containers into their resolved parents.
    #[allow(clippy::result_large_err)]
    fn move_containers(&mut self) -> Result<(), ImportFailure> {
        let mut moves: Vec<RowRecord> = Vec::new();
        for position in 0..self.containers.len() {
            let Some(record) = self.container_slots.success_at(position).cloned() else {
                continue;
            };
            let parent: ParentRef = self.containers[position].parent.clone();
            let target: GlobalId = self.resolve_target(&parent, None)?;
            let mut row: RowRecord = record;
            row.set_parent_container_ref(ParentRef::by_global_id(target));
            moves.push(row);
        }
        self.dispatch_move(moves)
    }

    /// Moves every created subsample into its resolved container.
    ///
    /// Resolution is three-way: the subsample's own container reference,
    /// else its parent sample row's, else the shared default container.
    /// Default subsamples the sample create produced on its own follow
    /// their sample's resolution.
    #[allow(clippy::result_large_err)]
    fn move_subsamples(&mut self) -> Result<(), ImportFailure> {
        let mut moves: Vec<RowRecord> = Vec::new();

        for sample_position in 0..self.samples.len() {
            let Some(RowRecord::Sample(created)) = self
                .sample_slots
                .success_at(sample_position)
                .cloned()
            else {
                continue;
            };
            let sample_parent: ParentRef = self.samples[sample_position].parent.clone();
            let original_embeds: usize = self.original_embed_counts[sample_position];

            for (index, embedded) in created.subsamples.iter().enumerate() {
                let own_ref: ParentRef = if index < original_embeds {
                    self.samples[sample_position].subsamples[index]
                        .parent_container
                        .clone()
                } else if let Some(splice) = self
                    .splices
                    .iter()
                    .find(|splice| {
                        splice.sample_position == sample_position
                            && splice.embed_position == index
                    })
                {
                    self.subsamples[splice.subsample_position]
                        .parent_container
                        .clone()
                } else {
                    ParentRef::none()
                };

                let target: GlobalId = self.resolve_target(&own_ref, Some(&sample_parent))?;
                let mut row: RowRecord = RowRecord::SubSample(embedded.clone());
                row.set_parent_container_ref(ParentRef::by_global_id(target));
                moves.push(row);
            }
        }

        let standalone: Vec<usize> = self.standalone.clone();
        for position in standalone {
            let Some(record) = self.subsample_slots.success_at(position).cloned() else {
                continue;
            };
            let own_ref: ParentRef = self.subsamples[position].parent_container.clone();
            let target: GlobalId = self.resolve_target(&own_ref, None)?;
            let mut row: RowRecord = record;
            row.set_parent_container_ref(ParentRef::by_global_id(target));
            moves.push(row);
        }

        self.dispatch_move(moves)
    }

    /// Reloads every created record so move side effects are reflected.
    #[allow(clippy::result_large_err)]
    fn reload_created_records(&mut self) -> Result<(), ImportFailure> {
        let mut reloads: Vec<(ImportStage, usize, GlobalId)> = Vec::new();
        for (position, outcome) in self.container_slots.filled() {
            if let Some(id) = outcome.record().and_then(RowRecord::global_id) {
                reloads.push((ImportStage::CreateContainers, position, id));
            }
        }
        for (position, outcome) in self.sample_slots.filled() {
            if let Some(id) = outcome.record().and_then(RowRecord::global_id) {
                reloads.push((ImportStage::CreateSamples, position, id));
            }
        }
        for (position, outcome) in self.subsample_slots.filled() {
            if let Some(id) = outcome.record().and_then(RowRecord::global_id) {
                reloads.push((ImportStage::CreateSubSamples, position, id));
            }
        }
        for (position, outcome) in self.template_slots.filled() {
            if let Some(id) = outcome.record().and_then(RowRecord::global_id) {
                reloads.push((ImportStage::CreateTemplate, position, id));
            }
        }

        for (kind_stage, position, id) in reloads {
            let record: RowRecord = self
                .resolver
                .catalog
                .reload(id, self.actor)
                .map_err(|core_error| self.core_failure(&core_error))?;
            match kind_stage {
                ImportStage::CreateContainers => {
                    self.container_slots.replace_success(position, record);
                }
                ImportStage::CreateSamples => {
                    self.sample_slots.replace_success(position, record);
                }
                ImportStage::CreateTemplate => {
                    self.template_slots.replace_success(position, record);
                }
                _ => self.subsample_slots.replace_success(position, record),
            }
        }

        let default_id: Option<GlobalId> = self
            .default_container
            .as_ref()
            .and_then(RowRecord::global_id);
        if let Some(id) = default_id {
            self.default_container = Some(
                self.resolver
                    .catalog
                    .reload(id, self.actor)
                    .map_err(|core_error| self.core_failure(&core_error))?,
            );
        }
        Ok(())
    }

    /// Resolves a parent reference to the identifier a move can target.
    ///
    /// Import-ids resolve through the mapping recorded during container
    /// creation; empty references fall back to the inherited reference,
    /// then to the lazily created default container.
    #[allow(clippy::result_large_err)]
    fn resolve_target(
        &mut self,
        own_ref: &ParentRef,
        inherited: Option<&ParentRef>,
    ) -> Result<GlobalId, ImportFailure> {
        if let Some(import_id) = &own_ref.import_id {
            return self.container_map.get(import_id).copied().ok_or_else(|| {
                self.core_failure(&CoreError::Internal {
                    message: format!(
                        "import-id '{import_id}' passed prevalidation but was never created"
                    ),
                })
            });
        }
        if let Some(global_id) = own_ref.global_id {
            return Ok(global_id);
        }
        if let Some(inherited) = inherited
            && !inherited.is_empty()
        {
            let inherited: ParentRef = inherited.clone();
            return self.resolve_target(&inherited, None);
        }
        self.ensure_default_container()
    }

    /// Creates the shared "imported items" container on first use.
    #[allow(clippy::result_large_err)]
    fn ensure_default_container(&mut self) -> Result<GlobalId, ImportFailure> {
        if let Some(container) = &self.default_container
            && let Some(id) = container.global_id()
        {
            return Ok(id);
        }

        info!(
            name = %self.resolver.default_container_name,
            "Creating default container for unparented rows"
        );
        let row: RowRecord = RowRecord::Container(ContainerRow::new(
            &self.resolver.default_container_name,
            ContainerKind::List,
        ));
        let outcomes: Vec<RowOutcome> =
            self.dispatch_create(ImportStage::ResolveMoves, vec![row])?;
        let id: Option<GlobalId> = outcomes
            .first()
            .and_then(RowOutcome::record)
            .and_then(RowRecord::global_id);
        if let (Some(RowOutcome::Success(record)), Some(id)) = (outcomes.first(), id) {
            self.default_container = Some(record.clone());
            return Ok(id);
        }
        Err(self.core_failure(&CoreError::Internal {
            message: String::from("default container creation returned no record"),
        }))
    }

    /// Runs one fail-fast create dispatch for a stage.
    #[allow(clippy::result_large_err)]
    fn dispatch_create(
        &mut self,
        stage: ImportStage,
        rows: Vec<RowRecord>,
    ) -> Result<Vec<RowOutcome>, ImportFailure> {
        match self
            .resolver
            .dispatcher
            .run(BulkOperationType::Create, rows, self.actor, true)
        {
            Ok(result) => Ok(take_outcomes(&result, stage)),
            Err(failure) => Err(self.bulk_failure(stage, failure)),
        }
    }

    /// Runs one fail-fast move dispatch during the move pass.
    #[allow(clippy::result_large_err)]
    fn dispatch_move(&mut self, rows: Vec<RowRecord>) -> Result<(), ImportFailure> {
        if rows.is_empty() {
            return Ok(());
        }
        match self
            .resolver
            .dispatcher
            .run(BulkOperationType::Move, rows, self.actor, true)
        {
            Ok(_) => Ok(()),
            Err(failure) => Err(self.bulk_failure(ImportStage::ResolveMoves, failure)),
        }
    }

    /// Builds the import failure for a dispatcher-level abort.
    ///
    /// The failing creation stage's partial outcomes (rows 1..k) are kept
    /// so the embedded report covers them; move failures carry no per-row
    /// outcomes because the whole-list call is atomic.
    fn bulk_failure(&mut self, stage: ImportStage, failure: BulkOperationFailure) -> ImportFailure {
        warn!(stage = %stage, error = %failure.error.message, "Import stage failed");

        match stage {
            ImportStage::CreateContainers => {
                for (position, outcome) in
                    failure.result.containers.outcomes().iter().enumerate()
                {
                    copy_outcome(&mut self.container_slots, position, outcome);
                }
            }
            ImportStage::CreateTemplate => {
                for (position, outcome) in failure.result.templates.outcomes().iter().enumerate()
                {
                    copy_outcome(&mut self.template_slots, position, outcome);
                }
            }
            ImportStage::CreateSamples => {
                for (position, outcome) in failure.result.samples.outcomes().iter().enumerate() {
                    copy_outcome(&mut self.sample_slots, position, outcome);
                }
                self.record_spliced_outcomes();
            }
            ImportStage::CreateSubSamples => {
                // Outcomes are positions within the standalone list; map
                // them back to the original row positions.
                for (index, outcome) in failure.result.subsamples.outcomes().iter().enumerate() {
                    if let Some(&position) = self.standalone.get(index) {
                        copy_outcome(&mut self.subsample_slots, position, outcome);
                    }
                }
            }
            _ => {}
        }

        self.advance(ImportStage::ImportError);
        ImportFailure {
            stage,
            error: failure.error,
            result: self.build_result(ResultStatus::Prevalidated),
        }
    }

    /// Builds the import failure for a catalog-level error.
    fn core_failure(&mut self, core_error: &CoreError) -> ImportFailure {
        let stage: ImportStage = self.stage;
        warn!(stage = %stage, error = %core_error, "Import stage failed");
        self.advance(ImportStage::ImportError);
        ImportFailure {
            stage,
            error: ErrorEntry::from_core_error(core_error),
            result: self.build_result(ResultStatus::Prevalidated),
        }
    }

    /// Freezes the outcome slots into the aggregate result.
    fn build_result(&self, status: ResultStatus) -> ImportResult {
        let container_ids: Vec<Option<&str>> = self
            .containers
            .iter()
            .map(|row| row.import_id.as_deref())
            .collect();
        let sample_ids: Vec<Option<&str>> = self
            .samples
            .iter()
            .map(|row| row.import_id.as_deref())
            .collect();
        let subsample_ids: Vec<Option<&str>> = self
            .subsamples
            .iter()
            .map(|row| row.import_id.as_deref())
            .collect();

        let mut result: ImportResult = ImportResult {
            containers: self.container_slots.freeze(&container_ids, status),
            samples: self.sample_slots.freeze(&sample_ids, status),
            subsamples: self.subsample_slots.freeze(&subsample_ids, status),
            templates: self.template_slots.freeze(&[None], status),
            status: ResultStatus::Pending,
            default_container: self.default_container.clone(),
        };
        result.status = status;
        result
    }
}

/// Extracts the relevant kind's outcomes from a dispatch result.
fn take_outcomes(result: &BulkOperationResult, stage: ImportStage) -> Vec<RowOutcome> {
    let partial = match stage {
        ImportStage::CreateContainers | ImportStage::ResolveMoves => &result.containers,
        ImportStage::CreateTemplate => &result.templates,
        ImportStage::CreateSamples => &result.samples,
        _ => &result.subsamples,
    };
    partial.outcomes().to_vec()
}

/// Converts duplicate-id findings into structured per-row errors.
fn to_error_entries(duplicates: Vec<(usize, DomainError)>) -> DuplicateErrors {
    duplicates
        .into_iter()
        .map(|(position, error)| (position, ErrorEntry::from_domain_error(&error)))
        .collect()
}

/// Writes one dispatched outcome into a slot at its row position.
fn copy_outcome(slots: &mut OutcomeSlots, position: usize, outcome: &RowOutcome) {
    match outcome {
        RowOutcome::Success(record) => slots.set_success(position, record.clone()),
        RowOutcome::Failure(error) => slots.set_failure(position, error.clone()),
    }
}
