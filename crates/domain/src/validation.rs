// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::quantity::{Quantity, Unit};
use crate::records::{ParentRef, RowRecord};
use crate::types::RecordKind;

/// The maximum accepted length of a record name, in characters.
const MAX_NAME_LENGTH: usize = 255;

/// Validates a record name.
///
/// # Arguments
///
/// * `name` - The name to validate
///
/// # Errors
///
/// Returns `DomainError::InvalidName` if the name is empty, whitespace-only,
/// or longer than 255 characters.
pub fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidName(String::from(
            "Name cannot be empty",
        )));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(DomainError::InvalidName(format!(
            "Name cannot be longer than {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validates the shape of a parent reference.
///
/// Exactly one of {import-id, global identifier} may be set. Setting both is
/// always an error; setting neither is an error only when the reference is
/// mandatory for the given record kind.
///
/// # Arguments
///
/// * `parent` - The reference to validate
/// * `record_kind` - The kind of the row carrying the reference
/// * `mandatory` - Whether the row must state a parent
///
/// # Errors
///
/// Returns an error if:
/// - Both forms of reference are set (`DomainError::AmbiguousReference`)
/// - Neither is set and the reference is mandatory
///   (`DomainError::MissingReference`)
pub fn validate_parent_ref(
    parent: &ParentRef,
    record_kind: RecordKind,
    mandatory: bool,
) -> Result<(), DomainError> {
    if let (Some(import_id), Some(global_id)) = (&parent.import_id, &parent.global_id) {
        return Err(DomainError::AmbiguousReference {
            import_id: import_id.clone(),
            global_id: global_id.to_string(),
        });
    }
    if mandatory && parent.is_empty() {
        return Err(DomainError::MissingReference { record_kind });
    }
    Ok(())
}

/// Validates that a quantity's unit family matches a parent unit's family.
///
/// # Arguments
///
/// * `quantity` - The subsample quantity to check
/// * `parent_unit` - The unit carried by the parent sample
///
/// # Errors
///
/// Returns `DomainError::IncompatibleUnits` if the two units belong to
/// different dimension families.
pub fn validate_quantity_against_unit(
    quantity: Quantity,
    parent_unit: Unit,
) -> Result<(), DomainError> {
    if !quantity.unit().is_compatible_with(parent_unit) {
        return Err(DomainError::IncompatibleUnits {
            parent_unit,
            parent_family: parent_unit.family(),
            subsample_unit: quantity.unit(),
            subsample_family: quantity.unit().family(),
        });
    }
    Ok(())
}

/// Validates the structural fields of a single row.
///
/// This checks field shape only: names, reference exclusivity, and embedded
/// subsample unit compatibility where the row itself carries enough context.
/// It performs no persistence lookups; cross-row and cross-record checks
/// belong to the import prevalidation pass.
///
/// # Arguments
///
/// * `row` - The row to validate
///
/// # Errors
///
/// Returns the first `DomainError` found in the row's fields.
pub fn validate_row(row: &RowRecord) -> Result<(), DomainError> {
    validate_name(row.name())?;

    match row {
        RowRecord::Container(container) => {
            validate_parent_ref(&container.parent, RecordKind::Container, false)?;
        }
        RowRecord::Sample(sample) => {
            validate_parent_ref(&sample.parent, RecordKind::Sample, false)?;
            for subsample in &sample.subsamples {
                validate_name(&subsample.name)?;
                // Embedded subsamples are created with the sample; their
                // parent-sample reference must stay empty.
                validate_parent_ref(&subsample.parent_container, RecordKind::SubSample, false)?;
                if let (Some(quantity), Some(sample_quantity)) =
                    (subsample.quantity, sample.quantity)
                {
                    validate_quantity_against_unit(quantity, sample_quantity.unit())?;
                }
            }
        }
        RowRecord::SubSample(subsample) => {
            validate_parent_ref(&subsample.parent_sample, RecordKind::SubSample, true)?;
            validate_parent_ref(&subsample.parent_container, RecordKind::SubSample, false)?;
        }
        RowRecord::Template(_) => {}
    }

    Ok(())
}
