// crates/merge-core/src/core/identifiers.rs
// ============================================================================
// Module: Merge Analyzer Identifiers
// Description: Canonical opaque identifiers used throughout the merge core.
// Purpose: Strongly typed, serializable IDs with stable string forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Identifiers are opaque wrappers over their natural representation
//! (UUID strings for Appian objects, small integers for session-scoped rows).
//! Validation of *shape* (well-formed UUID) is left to the parser boundary;
//! these wrappers only guarantee identity and serialization stability.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// An Appian object's stable UUID, shared across all packages and sessions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectUuid(String);

impl ObjectUuid {
    /// Creates a new object UUID wrapper.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the UUID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ObjectUuid {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ObjectUuid {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Appian's per-edit version identifier, distinct from the object's stable UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionUuid(String);

impl VersionUuid {
    /// Creates a new version UUID wrapper.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the version UUID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for VersionUuid {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for VersionUuid {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Numeric session identifier assigned on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(i64);

impl SessionId {
    /// Creates a new session identifier from its raw row id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw row id.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Human-readable session reference id, e.g. `MRG_001`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceId(String);

/// Prefix for all reference ids.
const REFERENCE_PREFIX: &str = "MRG_";
/// Minimum digit width of the zero-padded sequence number.
const REFERENCE_MIN_DIGITS: usize = 3;

impl ReferenceId {
    /// Builds the first reference id in a fresh store (`MRG_001`).
    #[must_use]
    pub fn first() -> Self {
        Self::from_sequence(1)
    }

    /// Builds a reference id from a 1-based sequence number, zero-padded to
    /// at least [`REFERENCE_MIN_DIGITS`] digits.
    #[must_use]
    pub fn from_sequence(sequence: u64) -> Self {
        Self(format!("{REFERENCE_PREFIX}{sequence:0width$}", width = REFERENCE_MIN_DIGITS))
    }

    /// Parses the sequence number out of an existing reference id, if any
    /// earlier id exists. Returns `None` for ids that do not carry the
    /// `MRG_` prefix (handles migration from any earlier format by letting
    /// the caller treat `None` as "no prior sequence").
    #[must_use]
    pub fn parse_sequence(&self) -> Option<u64> {
        self.0.strip_prefix(REFERENCE_PREFIX)?.parse().ok()
    }

    /// Returns the reference id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the next reference id following this one.
    #[must_use]
    pub fn next(&self) -> Self {
        let sequence = self.parse_sequence().unwrap_or(0);
        Self::from_sequence(sequence + 1)
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ReferenceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One of the three input packages within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageId(i64);

impl PackageId {
    /// Creates a new package identifier from its raw row id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw row id.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of an `(object, package)` version row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectVersionId(i64);

impl ObjectVersionId {
    /// Creates a new object version identifier from its raw row id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw row id.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ObjectVersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a `Change` row (the working review set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeId(i64);

impl ChangeId {
    /// Creates a new change identifier from its raw row id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw row id.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ChangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_id_starts_at_one() {
        assert_eq!(ReferenceId::first().as_str(), "MRG_001");
    }

    #[test]
    fn reference_id_pads_beyond_three_digits_without_truncating() {
        assert_eq!(ReferenceId::from_sequence(42).as_str(), "MRG_042");
        assert_eq!(ReferenceId::from_sequence(1007).as_str(), "MRG_1007");
    }

    #[test]
    fn reference_id_sequence_round_trips() {
        let id = ReferenceId::from_sequence(17);
        assert_eq!(id.parse_sequence(), Some(17));
        assert_eq!(id.next().as_str(), "MRG_018");
    }

    #[test]
    fn reference_id_without_prefix_has_no_sequence() {
        let id = ReferenceId::from(String::from("LEGACY-9"));
        assert_eq!(id.parse_sequence(), None);
        assert_eq!(id.next().as_str(), "MRG_001");
    }
}
