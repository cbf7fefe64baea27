// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Cross-reference prevalidation over a loaded import request.
//!
//! Nothing is persisted here. Forward references (import-ids) are checked
//! against the request's own row indexes; references to persisted records
//! go through the external [`RecordCatalog`], whose not-found and
//! no-permission failures are recorded as that row's errors.

use crate::catalog::RecordCatalog;
use crate::session::{ImportIdIndex, ImportRequest, TemplateSpec};
use benchstock::{CoreError, ErrorEntry};
use benchstock_audit::Actor;
use benchstock_domain::{
    DomainError, ParentRef, RecordKind, Unit, validate_name, validate_parent_ref,
    validate_quantity_against_unit,
};

/// Every error prevalidation found, grouped per row.
#[derive(Debug, Default)]
pub struct Prevalidation {
    /// Errors per container row, in row order.
    pub container_errors: Vec<Vec<ErrorEntry>>,
    /// Errors per sample row, in row order.
    pub sample_errors: Vec<Vec<ErrorEntry>>,
    /// Errors per subsample row, in row order.
    pub subsample_errors: Vec<Vec<ErrorEntry>>,
    /// Errors against the template specification.
    pub template_errors: Vec<ErrorEntry>,
}

impl Prevalidation {
    /// Checks whether any row or the template spec failed.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.template_errors.is_empty()
            || self.container_errors.iter().any(|errors| !errors.is_empty())
            || self.sample_errors.iter().any(|errors| !errors.is_empty())
            || self.subsample_errors.iter().any(|errors| !errors.is_empty())
    }
}

/// Collects a domain-rule failure into a row's error list.
fn collect(result: Result<(), DomainError>, errors: &mut Vec<ErrorEntry>) {
    if let Err(domain_error) = result {
        errors.push(ErrorEntry::from_domain_error(&domain_error));
    }
}

/// Checks a parent-container reference against the request and the catalog.
///
/// Import-ids must resolve within the request's container rows; global
/// identifiers must pass the external container check and point at a
/// container that can receive moved items.
fn check_container_ref(
    parent: &ParentRef,
    container_index: &ImportIdIndex,
    catalog: &dyn RecordCatalog,
    actor: &Actor,
    errors: &mut Vec<ErrorEntry>,
) {
    if let Some(import_id) = &parent.import_id
        && !container_index.contains(import_id)
    {
        errors.push(ErrorEntry::from_domain_error(
            &DomainError::UnknownImportId {
                import_id: import_id.clone(),
                expected_kind: RecordKind::Container,
            },
        ));
        return;
    }

    if let Some(global_id) = parent.global_id {
        match catalog.container_info(global_id, actor) {
            Ok(info) if !info.kind.accepts_moves() => {
                errors.push(ErrorEntry::from_domain_error(
                    &DomainError::ContainerNotListable {
                        global_id: global_id.to_string(),
                    },
                ));
            }
            Ok(_) => {}
            Err(core_error) => errors.push(ErrorEntry::from_core_error(&core_error)),
        }
    }
}

/// Resolves the unit a subsample's quantity must be compatible with.
///
/// A parent referenced by import-id resolves against the in-request sample
/// row; a persisted parent resolves through the catalog.
fn parent_sample_unit(
    parent: &ParentRef,
    request: &ImportRequest,
    sample_index: &ImportIdIndex,
    catalog: &dyn RecordCatalog,
    actor: &Actor,
) -> Option<Unit> {
    if let Some(import_id) = &parent.import_id {
        let position: usize = sample_index.position_of(import_id)?;
        return request
            .samples
            .get(position)
            .and_then(|sample| sample.quantity)
            .map(|quantity| quantity.unit());
    }
    if let Some(global_id) = parent.global_id {
        return catalog
            .sample_info(global_id, actor)
            .ok()
            .and_then(|info| info.unit);
    }
    None
}

/// Runs the full prevalidation pass over a loaded request.
///
/// # Arguments
///
/// * `request` - The loaded import request
/// * `container_index` - Import-id index over the request's container rows
/// * `sample_index` - Import-id index over the request's sample rows
/// * `catalog` - The external permission/edit-check collaborator
/// * `actor` - The acting user
#[must_use]
pub fn prevalidate(
    request: &ImportRequest,
    container_index: &ImportIdIndex,
    sample_index: &ImportIdIndex,
    catalog: &dyn RecordCatalog,
    actor: &Actor,
) -> Prevalidation {
    let mut outcome: Prevalidation = Prevalidation::default();

    for container in &request.containers {
        let mut errors: Vec<ErrorEntry> = Vec::new();
        collect(validate_name(&container.name), &mut errors);
        collect(
            validate_parent_ref(&container.parent, RecordKind::Container, false),
            &mut errors,
        );
        if errors.is_empty() {
            check_container_ref(&container.parent, container_index, catalog, actor, &mut errors);
        }
        outcome.container_errors.push(errors);
    }

    let template_unit: Option<Unit> =
        validate_template_spec(request, catalog, actor, &mut outcome.template_errors);

    for sample in &request.samples {
        let mut errors: Vec<ErrorEntry> = Vec::new();
        collect(validate_name(&sample.name), &mut errors);
        collect(
            validate_parent_ref(&sample.parent, RecordKind::Sample, false),
            &mut errors,
        );
        if errors.is_empty() {
            check_container_ref(&sample.parent, container_index, catalog, actor, &mut errors);
        }
        if let (Some(quantity), Some(unit)) = (sample.quantity, template_unit) {
            collect(validate_quantity_against_unit(quantity, unit), &mut errors);
        }
        for embedded in &sample.subsamples {
            collect(validate_name(&embedded.name), &mut errors);
            if let (Some(quantity), Some(sample_quantity)) = (embedded.quantity, sample.quantity) {
                collect(
                    validate_quantity_against_unit(quantity, sample_quantity.unit()),
                    &mut errors,
                );
            }
        }
        outcome.sample_errors.push(errors);
    }

    for subsample in &request.subsamples {
        let mut errors: Vec<ErrorEntry> = Vec::new();
        collect(validate_name(&subsample.name), &mut errors);

        let parent_ref_valid: bool = {
            let before: usize = errors.len();
            collect(
                validate_parent_ref(&subsample.parent_sample, RecordKind::SubSample, true),
                &mut errors,
            );
            errors.len() == before
        };

        if parent_ref_valid {
            if let Some(import_id) = &subsample.parent_sample.import_id
                && !sample_index.contains(import_id)
            {
                errors.push(ErrorEntry::from_domain_error(
                    &DomainError::UnknownImportId {
                        import_id: import_id.clone(),
                        expected_kind: RecordKind::Sample,
                    },
                ));
            }
            if let Some(global_id) = subsample.parent_sample.global_id
                && let Err(core_error) = catalog.sample_info(global_id, actor)
            {
                errors.push(ErrorEntry::from_core_error(&core_error));
            }
        }

        let container_ref_valid: bool = {
            let before: usize = errors.len();
            collect(
                validate_parent_ref(&subsample.parent_container, RecordKind::SubSample, false),
                &mut errors,
            );
            errors.len() == before
        };
        if container_ref_valid {
            check_container_ref(
                &subsample.parent_container,
                container_index,
                catalog,
                actor,
                &mut errors,
            );
        }

        if let Some(quantity) = subsample.quantity
            && let Some(unit) = parent_sample_unit(
                &subsample.parent_sample,
                request,
                sample_index,
                catalog,
                actor,
            )
        {
            collect(validate_quantity_against_unit(quantity, unit), &mut errors);
        }

        outcome.subsample_errors.push(errors);
    }

    outcome
}

/// Validates the template specification and resolves its default unit.
///
/// Sample creation needs a valid template reference before any sample
/// field can be validated, so the template is checked ahead of the sample
/// rows and its default unit feeds their quantity checks.
fn validate_template_spec(
    request: &ImportRequest,
    catalog: &dyn RecordCatalog,
    actor: &Actor,
    errors: &mut Vec<ErrorEntry>,
) -> Option<Unit> {
    match &request.template {
        None => {
            if !request.samples.is_empty() {
                errors.push(ErrorEntry::from_core_error(
                    &CoreError::InvalidConfiguration {
                        reason: String::from(
                            "sample rows require a template specification",
                        ),
                    },
                ));
            }
            None
        }
        Some(TemplateSpec::Existing(global_id)) => {
            if global_id.kind() != RecordKind::SampleTemplate {
                errors.push(ErrorEntry::from_domain_error(
                    &DomainError::InvalidGlobalId(format!(
                        "'{global_id}' does not identify a sample template"
                    )),
                ));
                return None;
            }
            match catalog.template_info(*global_id, actor) {
                Ok(info) => info.default_unit,
                Err(core_error) => {
                    errors.push(ErrorEntry::from_core_error(&core_error));
                    None
                }
            }
        }
        Some(TemplateSpec::New(row)) => {
            if let Err(domain_error) = validate_name(&row.name) {
                errors.push(ErrorEntry::from_domain_error(&domain_error));
            }
            Some(row.default_unit)
        }
    }
}
