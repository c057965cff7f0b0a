// crates/merge-core/src/core/object.rs
// ============================================================================
// Module: Object Registry and Version Records
// Description: Process-wide object registry rows and per-package version rows.
// Purpose: Canonical in-memory representation produced by the Object Parser
//          and consumed by every downstream stage.
// Dependencies: serde, crate::core
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::core::PackageId;
use crate::core::content::ContentView;
use crate::core::hashing::ContentFingerprint;
use crate::core::identifiers::ObjectUuid;
use crate::core::identifiers::ObjectVersionId;
use crate::core::identifiers::VersionUuid;
use crate::core::object_type::ObjectType;

/// A process-wide object registry row. Created the first time a given uuid
/// is seen in any package of any session and reused thereafter (spec §3,
/// §9 "Shared object registry"). Name updates from later sessions do not
/// rewrite history; the display name is denormalized into version rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRecord {
    /// The object's stable uuid.
    pub uuid: ObjectUuid,
    /// Current display name, updated on re-sighting.
    pub display_name: String,
    /// Closed-set object type.
    pub object_type: ObjectType,
}

/// Raw decoder output for a single object, as produced by the Object Parser
/// (spec §4.2) before it is attached to a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawObjectRecord {
    /// The object's stable uuid, if the XML was decodable far enough to find one.
    pub uuid: ObjectUuid,
    /// Display name at time of parse.
    pub display_name: String,
    /// Object type; `Unknown` for anything the decoder could not classify.
    pub object_type: ObjectType,
    /// Per-edit version uuid.
    pub version_uuid: VersionUuid,
    /// Scripted code string, pre-formatter, when the type carries one.
    pub scripted_code: Option<String>,
    /// Type-specific structured payload, pre-canonicalization.
    pub content: ContentView,
    /// Raw XML bytes, retained for fallback display when `object_type` is `Unknown`.
    pub raw_xml: Vec<u8>,
    /// Whether the source XML signaled deprecation rather than presence
    /// (used to resolve the REMOVED vs DEPRECATED distinction, spec §9).
    pub deprecated: bool,
}

/// One row per `(object, package)`: a specific version of an object as it
/// appears in one of the three input packages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectVersion {
    /// Row id, assigned on insert.
    pub id: ObjectVersionId,
    /// The parent object's stable uuid.
    pub object_uuid: ObjectUuid,
    /// The package this version belongs to.
    pub package_id: PackageId,
    /// Appian's per-edit version uuid.
    pub version_uuid: VersionUuid,
    /// Scripted code, formatted by the SAIL Formatter, when applicable.
    pub scripted_code: Option<String>,
    /// Canonicalized structured content view.
    pub content: ContentView,
    /// Content fingerprint over `scripted_code` + `content`.
    pub fingerprint: ContentFingerprint,
    /// Whether the object was marked deprecated rather than simply absent
    /// in a later package.
    pub deprecated: bool,
}

/// The session-scoped object lookup: every object ever seen across the three
/// packages of one analysis, keyed by uuid. Populated after all three
/// packages are parsed, then read by the SAIL Formatter (reference
/// resolution) and the Dependency Analyzer (edge resolution) — spec §4.3,
/// §4.8.
#[derive(Debug, Clone, Default)]
pub struct ObjectLookup {
    by_uuid: BTreeMap<ObjectUuid, ObjectRecord>,
}

impl ObjectLookup {
    /// Builds an empty lookup.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites an object's registry row. Later insertions win,
    /// matching "references from package B can resolve to names introduced
    /// by package C and vice versa" (spec §4.3).
    pub fn insert(&mut self, record: ObjectRecord) {
        self.by_uuid.insert(record.uuid.clone(), record);
    }

    /// Looks up an object by uuid.
    #[must_use]
    pub fn get(&self, uuid: &ObjectUuid) -> Option<&ObjectRecord> {
        self.by_uuid.get(uuid)
    }

    /// Returns whether the lookup contains no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_uuid.is_empty()
    }

    /// Returns the number of distinct objects known to the lookup.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_uuid.len()
    }

    /// Iterates all known objects.
    pub fn iter(&self) -> impl Iterator<Item = &ObjectRecord> {
        self.by_uuid.values()
    }
}
