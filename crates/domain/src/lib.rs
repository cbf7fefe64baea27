// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod error;
mod quantity;
mod records;
mod types;
mod validation;

#[cfg(test)]
mod tests;

// Re-export public types
pub use error::DomainError;
pub use quantity::{Quantity, Unit, UnitFamily};
pub use records::{
    ContainerKind, ContainerRow, ParentRef, RowRecord, SampleRow, SubSampleRow, TemplateRow,
};
pub use types::{GlobalId, RecordKind, Username};
pub use validation::{
    validate_name, validate_parent_ref, validate_quantity_against_unit, validate_row,
};
