// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The kind of an inventory record.
///
/// Every persisted record belongs to exactly one kind, and the kind is
/// encoded in the prefix of its global identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// A container holding other containers and subsamples.
    Container,
    /// A sample owning one or more subsamples.
    Sample,
    /// A physical portion of a sample, stored in a container.
    SubSample,
    /// A reusable field/unit schema that samples are instantiated from.
    SampleTemplate,
}

impl RecordKind {
    /// Converts this record kind to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Container => "Container",
            Self::Sample => "Sample",
            Self::SubSample => "SubSample",
            Self::SampleTemplate => "SampleTemplate",
        }
    }

    /// Returns the two-letter prefix used in global identifiers of this kind.
    #[must_use]
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::Container => "CN",
            Self::Sample => "SA",
            Self::SubSample => "SS",
            Self::SampleTemplate => "TM",
        }
    }

    /// Resolves a record kind from a global identifier prefix.
    #[must_use]
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "CN" => Some(Self::Container),
            "SA" => Some(Self::Sample),
            "SS" => Some(Self::SubSample),
            "TM" => Some(Self::SampleTemplate),
            _ => None,
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stable, globally unique reference to a persisted record.
///
/// A global identifier only exists after the record has been persisted;
/// rows that have not been created yet are referenced by import-id instead.
/// The textual form is the kind prefix followed by the numeric id, e.g.
/// `SA12345`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlobalId {
    kind: RecordKind,
    id: i64,
}

impl GlobalId {
    /// Creates a new global identifier.
    ///
    /// # Arguments
    ///
    /// * `kind` - The record kind encoded in the identifier
    /// * `id` - The numeric identifier assigned by the database
    #[must_use]
    pub const fn new(kind: RecordKind, id: i64) -> Self {
        Self { kind, id }
    }

    /// Returns the record kind encoded in this identifier.
    #[must_use]
    pub const fn kind(&self) -> RecordKind {
        self.kind
    }

    /// Returns the numeric part of this identifier.
    #[must_use]
    pub const fn id(&self) -> i64 {
        self.id
    }
}

impl std::fmt::Display for GlobalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.id)
    }
}

impl FromStr for GlobalId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 3 || !s.is_char_boundary(2) {
            return Err(DomainError::InvalidGlobalId(format!(
                "'{s}' is too short to be a global identifier"
            )));
        }
        let (prefix, digits) = s.split_at(2);
        let kind: RecordKind = RecordKind::from_prefix(prefix).ok_or_else(|| {
            DomainError::InvalidGlobalId(format!("'{s}' has unknown kind prefix '{prefix}'"))
        })?;
        let id: i64 = digits.parse().map_err(|_| {
            DomainError::InvalidGlobalId(format!("'{s}' has a non-numeric id part '{digits}'"))
        })?;
        if id < 1 {
            return Err(DomainError::InvalidGlobalId(format!(
                "'{s}' has a non-positive id"
            )));
        }
        Ok(Self { kind, id })
    }
}

/// The login name of a user, as known to the surrounding system.
///
/// Lock ownership and record ownership are both expressed in terms of
/// usernames; the orchestration layer never inspects anything else about
/// the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    /// Creates a new username.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self(name.to_string())
    }

    /// Returns the username as a string slice.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
