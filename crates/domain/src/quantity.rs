// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The dimension family of a unit.
///
/// Quantities are only comparable within one family; a subsample measured
/// in volume cannot be attached to a sample tracked by mass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitFamily {
    /// Mass units (micrograms through kilograms).
    Mass,
    /// Volume units (microliters through liters).
    Volume,
    /// Discrete counts with no physical dimension.
    Dimensionless,
}

impl std::fmt::Display for UnitFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name: &str = match self {
            Self::Mass => "mass",
            Self::Volume => "volume",
            Self::Dimensionless => "dimensionless",
        };
        write!(f, "{name}")
    }
}

/// A unit of measurement for sample and subsample quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    /// Micrograms.
    Microgram,
    /// Milligrams.
    Milligram,
    /// Grams.
    Gram,
    /// Kilograms.
    Kilogram,
    /// Microliters.
    Microliter,
    /// Milliliters.
    Milliliter,
    /// Liters.
    Liter,
    /// A discrete item count.
    Item,
}

impl Unit {
    /// Returns the dimension family this unit belongs to.
    #[must_use]
    pub const fn family(&self) -> UnitFamily {
        match self {
            Self::Microgram | Self::Milligram | Self::Gram | Self::Kilogram => UnitFamily::Mass,
            Self::Microliter | Self::Milliliter | Self::Liter => UnitFamily::Volume,
            Self::Item => UnitFamily::Dimensionless,
        }
    }

    /// Converts this unit to its abbreviated string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Microgram => "ug",
            Self::Milligram => "mg",
            Self::Gram => "g",
            Self::Kilogram => "kg",
            Self::Microliter => "ul",
            Self::Milliliter => "ml",
            Self::Liter => "l",
            Self::Item => "items",
        }
    }

    /// Checks whether two units belong to the same dimension family.
    #[must_use]
    pub fn is_compatible_with(&self, other: Self) -> bool {
        self.family() == other.family()
    }
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Unit {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ug" => Ok(Self::Microgram),
            "mg" => Ok(Self::Milligram),
            "g" => Ok(Self::Gram),
            "kg" => Ok(Self::Kilogram),
            "ul" => Ok(Self::Microliter),
            "ml" => Ok(Self::Milliliter),
            "l" => Ok(Self::Liter),
            "items" => Ok(Self::Item),
            _ => Err(DomainError::InvalidUnit(format!("unknown unit '{s}'"))),
        }
    }
}

/// An amount of material, expressed as a value in a unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    value: f64,
    unit: Unit,
}

impl Quantity {
    /// Creates a new quantity.
    ///
    /// # Arguments
    ///
    /// * `value` - The numeric amount; must be finite and non-negative
    /// * `unit` - The unit the amount is expressed in
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidQuantity` if the value is negative,
    /// NaN, or infinite.
    pub fn new(value: f64, unit: Unit) -> Result<Self, DomainError> {
        if !value.is_finite() {
            return Err(DomainError::InvalidQuantity {
                value,
                reason: String::from("value must be finite"),
            });
        }
        if value < 0.0 {
            return Err(DomainError::InvalidQuantity {
                value,
                reason: String::from("value cannot be negative"),
            });
        }
        Ok(Self { value, unit })
    }

    /// Returns the numeric amount.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Returns the unit the amount is expressed in.
    #[must_use]
    pub const fn unit(&self) -> Unit {
        self.unit
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}
