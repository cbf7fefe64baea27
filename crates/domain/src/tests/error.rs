// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{DomainError, RecordKind, Unit, UnitFamily};

#[test]
fn test_incompatible_units_message_names_both_families() {
    let error: DomainError = DomainError::IncompatibleUnits {
        parent_unit: Unit::Gram,
        parent_family: UnitFamily::Mass,
        subsample_unit: Unit::Milliliter,
        subsample_family: UnitFamily::Volume,
    };

    let message: String = error.to_string();
    assert!(message.contains("mass"));
    assert!(message.contains("volume"));
}

#[test]
fn test_ambiguous_reference_message_names_both_forms() {
    let error: DomainError = DomainError::AmbiguousReference {
        import_id: String::from("c1"),
        global_id: String::from("CN3"),
    };

    let message: String = error.to_string();
    assert!(message.contains("c1"));
    assert!(message.contains("CN3"));
}

#[test]
fn test_unknown_import_id_message_names_expected_kind() {
    let error: DomainError = DomainError::UnknownImportId {
        import_id: String::from("s9"),
        expected_kind: RecordKind::Sample,
    };

    assert!(error.to_string().contains("Sample"));
    assert!(error.to_string().contains("s9"));
}
