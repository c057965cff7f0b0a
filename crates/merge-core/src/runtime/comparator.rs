// crates/merge-core/src/runtime/comparator.rs
// ============================================================================
// Module: Pair Comparator
// Description: Decides identical/modified between two versions of one object.
// Purpose: Shared primitive used by the Delta Engine and the Set Classifier's
//          rule 8 re-comparison (spec §4.5, §4.7).
// Dependencies: crate::core
// ============================================================================

use crate::core::ObjectVersion;

/// Outcome of comparing two [`ObjectVersion`]s of the same object (spec
/// §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairOutcome {
    /// Version uuids match; nothing changed.
    Unchanged,
    /// Version uuids differ but the content fingerprint matches — Appian
    /// bumped the per-edit uuid without changing observable output.
    UnchangedNewVuuid,
    /// Content fingerprints differ.
    Modified,
}

impl PairOutcome {
    /// Whether this outcome represents equal content, regardless of version
    /// uuid drift. Used by the Set Classifier's rule 8 (spec §4.7) and by
    /// the universal invariant that `UNCHANGED_NEW_VUUID` is authoritative
    /// for "identical".
    #[must_use]
    pub const fn content_equal(self) -> bool {
        !matches!(self, Self::Modified)
    }
}

/// Compares two versions of the same object (spec §4.5):
///
/// 1. Equal version uuids → [`PairOutcome::Unchanged`].
/// 2. Else equal fingerprints → [`PairOutcome::UnchangedNewVuuid`].
/// 3. Else → [`PairOutcome::Modified`].
#[must_use]
pub fn compare_pair(old: &ObjectVersion, new: &ObjectVersion) -> PairOutcome {
    if old.version_uuid == new.version_uuid {
        PairOutcome::Unchanged
    } else if old.fingerprint == new.fingerprint {
        PairOutcome::UnchangedNewVuuid
    } else {
        PairOutcome::Modified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ContentFingerprint;
    use crate::core::ContentView;
    use crate::core::ObjectVersionId;
    use crate::core::PackageId;

    fn version(version_uuid: &str, fingerprint: &str) -> ObjectVersion {
        ObjectVersion {
            id: ObjectVersionId::new(0),
            object_uuid: "_a-1".into(),
            package_id: PackageId::new(0),
            version_uuid: version_uuid.into(),
            scripted_code: None,
            content: ContentView::Unknown(Vec::new()),
            fingerprint: ContentFingerprint { value: fingerprint.to_string() },
            deprecated: false,
        }
    }

    #[test]
    fn same_version_uuid_is_unchanged() {
        let a = version("v1", "f1");
        let b = version("v1", "f1");
        assert_eq!(compare_pair(&a, &b), PairOutcome::Unchanged);
    }

    #[test]
    fn drifted_version_uuid_with_same_fingerprint_is_unchanged_new_vuuid() {
        let a = version("v1", "f1");
        let b = version("v2", "f1");
        let outcome = compare_pair(&a, &b);
        assert_eq!(outcome, PairOutcome::UnchangedNewVuuid);
        assert!(outcome.content_equal());
    }

    #[test]
    fn differing_fingerprint_is_modified() {
        let a = version("v1", "f1");
        let b = version("v2", "f2");
        let outcome = compare_pair(&a, &b);
        assert_eq!(outcome, PairOutcome::Modified);
        assert!(!outcome.content_equal());
    }
}
