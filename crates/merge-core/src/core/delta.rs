// crates/merge-core/src/core/delta.rs
//! Vendor delta (set D) and customer delta (set E) records (spec §3, §4.6).

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ObjectUuid;
use crate::core::identifiers::ObjectVersionId;
use crate::core::identifiers::SessionId;

/// The kind of change an object underwent between two package snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaKind {
    /// Present only in the newer snapshot.
    New,
    /// Present in both, content differs (including the `UNCHANGED_NEW_VUUID`
    /// case per spec §4.5/§4.6).
    Modified,
    /// Present only in the older snapshot, and the object's own metadata
    /// signaled deprecation rather than outright removal.
    Deprecated,
    /// Present only in the older snapshot, removed outright.
    Removed,
}

impl fmt::Display for DeltaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::New => "NEW",
            Self::Modified => "MODIFIED",
            Self::Deprecated => "DEPRECATED",
            Self::Removed => "REMOVED",
        };
        f.write_str(label)
    }
}

/// Which symmetric comparison a delta record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaSet {
    /// Set D: base (A) vs new vendor (C).
    Vendor,
    /// Set E: base (A) vs customized (B).
    Customer,
}

/// One row per object touched between the two package snapshots being compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaRecord {
    /// Owning session.
    pub session_id: SessionId,
    /// Which symmetric comparison produced this row.
    pub set: DeltaSet,
    /// The touched object's stable uuid.
    pub object_uuid: ObjectUuid,
    /// Kind of change.
    pub kind: DeltaKind,
    /// Version in the older snapshot, absent for `New`.
    pub old_version_id: Option<ObjectVersionId>,
    /// Version in the newer snapshot, absent for `Removed`/`Deprecated`.
    pub new_version_id: Option<ObjectVersionId>,
    /// Short human-readable summary for display (e.g. "field added: comments").
    pub summary: String,
}
