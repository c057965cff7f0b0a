// crates/merge-core/src/runtime/delta.rs
// ============================================================================
// Module: Delta Engine
// Description: Joins two package object maps by uuid into a delta record set
//              (spec §4.6).
// Purpose: Produce set D (vendor delta, A vs C) and set E (customer delta,
//          A vs B) symmetrically.
// Dependencies: crate::core, crate::runtime::comparator
// ============================================================================

use std::collections::BTreeMap;

use crate::core::DeltaKind;
use crate::core::DeltaRecord;
use crate::core::DeltaSet;
use crate::core::ObjectLookup;
use crate::core::ObjectUuid;
use crate::core::ObjectVersion;
use crate::core::SessionId;
use crate::runtime::comparator::PairOutcome;
use crate::runtime::comparator::compare_pair;

/// Computes the delta between an older and a newer package's object
/// versions, covering `keys(old) ∪ keys(new)` (spec §4.6).
///
/// `Unchanged` pairs are not emitted; `UnchangedNewVuuid` pairs are emitted
/// as `Modified` (the version-uuid drift is itself the signal of intent).
/// Output is ordered by `(object_type, name)` for stable persistence.
#[must_use]
pub fn compute_delta(
    session_id: SessionId,
    set: DeltaSet,
    old: &BTreeMap<ObjectUuid, ObjectVersion>,
    new: &BTreeMap<ObjectUuid, ObjectVersion>,
    lookup: &ObjectLookup,
) -> Vec<DeltaRecord> {
    let mut uuids: Vec<&ObjectUuid> = old.keys().chain(new.keys()).collect();
    uuids.sort_unstable();
    uuids.dedup();

    let mut records: Vec<DeltaRecord> = uuids
        .into_iter()
        .filter_map(|uuid| build_record(session_id, set, uuid, old.get(uuid), new.get(uuid)))
        .collect();

    records.sort_by(|a, b| sort_key(a, lookup).cmp(&sort_key(b, lookup)));
    records
}

fn sort_key<'a>(record: &'a DeltaRecord, lookup: &'a ObjectLookup) -> (&'a str, &'a str) {
    lookup
        .get(&record.object_uuid)
        .map_or(("", record.object_uuid.as_str()), |obj| {
            (obj.object_type.label(), obj.display_name.as_str())
        })
}

fn build_record(
    session_id: SessionId,
    set: DeltaSet,
    uuid: &ObjectUuid,
    old: Option<&ObjectVersion>,
    new: Option<&ObjectVersion>,
) -> Option<DeltaRecord> {
    let (kind, summary) = match (old, new) {
        (None, Some(_)) => (DeltaKind::New, "object added".to_string()),
        (Some(old), None) if old.deprecated => {
            (DeltaKind::Deprecated, "object marked deprecated".to_string())
        }
        (Some(_), None) => (DeltaKind::Removed, "object removed".to_string()),
        (Some(old), Some(new)) => match compare_pair(old, new) {
            PairOutcome::Unchanged => return None,
            PairOutcome::UnchangedNewVuuid => {
                (DeltaKind::Modified, "content unchanged, version touched".to_string())
            }
            PairOutcome::Modified => (DeltaKind::Modified, summarize_content_change(old, new)),
        },
        (None, None) => return None,
    };

    Some(DeltaRecord {
        session_id,
        set,
        object_uuid: uuid.clone(),
        kind,
        old_version_id: old.map(|v| v.id),
        new_version_id: new.map(|v| v.id),
        summary,
    })
}

/// Builds a short human-readable summary of a content change. Set-valued
/// structured views get a set-size delta; everything else gets a generic
/// summary — the reviewer-facing detail view carries the full before/after
/// content for precise inspection (spec §6 "Change detail").
fn summarize_content_change(old: &ObjectVersion, new: &ObjectVersion) -> String {
    use crate::core::ContentView;

    match (&old.content, &new.content) {
        (ContentView::RecordType(a), ContentView::RecordType(b)) => {
            summarize_set_delta("field", a.fields.len(), b.fields.len())
        }
        (ContentView::Cdt(a), ContentView::Cdt(b)) => {
            summarize_set_delta("field", a.fields.len(), b.fields.len())
        }
        (ContentView::ProcessModel(a), ContentView::ProcessModel(b)) => {
            summarize_set_delta("node", a.nodes.len(), b.nodes.len())
        }
        (ContentView::Group(a), ContentView::Group(b)) => {
            summarize_set_delta("member", a.members.len(), b.members.len())
        }
        _ if old.scripted_code.as_deref() != new.scripted_code.as_deref() => {
            "code changed".to_string()
        }
        _ => "content changed".to_string(),
    }
}

fn summarize_set_delta(label: &str, before: usize, after: usize) -> String {
    match after.cmp(&before) {
        std::cmp::Ordering::Greater => format!("{} {label}(s) added", after - before),
        std::cmp::Ordering::Less => format!("{} {label}(s) removed", before - after),
        std::cmp::Ordering::Equal => format!("{label} set modified"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ContentFingerprint;
    use crate::core::ContentView;
    use crate::core::ObjectRecord;
    use crate::core::ObjectType;
    use crate::core::ObjectVersionId;
    use crate::core::PackageId;

    fn version(uuid: &str, version_uuid: &str, fp: &str, deprecated: bool) -> ObjectVersion {
        ObjectVersion {
            id: ObjectVersionId::new(0),
            object_uuid: uuid.into(),
            package_id: PackageId::new(0),
            version_uuid: version_uuid.into(),
            scripted_code: None,
            content: ContentView::Unknown(Vec::new()),
            fingerprint: ContentFingerprint { value: fp.to_string() },
            deprecated,
        }
    }

    fn lookup_with(uuid: &str, name: &str, object_type: ObjectType) -> ObjectLookup {
        let mut lookup = ObjectLookup::new();
        lookup.insert(ObjectRecord { uuid: uuid.into(), display_name: name.to_string(), object_type });
        lookup
    }

    #[test]
    fn new_object_is_new_kind() {
        let mut new = BTreeMap::new();
        new.insert(ObjectUuid::from("_a-1"), version("_a-1", "v1", "f1", false));
        let lookup = lookup_with("_a-1", "X", ObjectType::ExpressionRule);
        let delta = compute_delta(
            SessionId::new(1),
            DeltaSet::Vendor,
            &BTreeMap::new(),
            &new,
            &lookup,
        );
        assert_eq!(delta.len(), 1);
        assert_eq!(delta[0].kind, DeltaKind::New);
    }

    #[test]
    fn removed_without_deprecation_flag_is_removed_kind() {
        let mut old = BTreeMap::new();
        old.insert(ObjectUuid::from("_a-1"), version("_a-1", "v1", "f1", false));
        let lookup = lookup_with("_a-1", "X", ObjectType::ExpressionRule);
        let delta = compute_delta(
            SessionId::new(1),
            DeltaSet::Vendor,
            &old,
            &BTreeMap::new(),
            &lookup,
        );
        assert_eq!(delta[0].kind, DeltaKind::Removed);
    }

    #[test]
    fn removed_with_deprecation_flag_is_deprecated_kind() {
        let mut old = BTreeMap::new();
        old.insert(ObjectUuid::from("_a-1"), version("_a-1", "v1", "f1", true));
        let lookup = lookup_with("_a-1", "X", ObjectType::ExpressionRule);
        let delta = compute_delta(
            SessionId::new(1),
            DeltaSet::Vendor,
            &old,
            &BTreeMap::new(),
            &lookup,
        );
        assert_eq!(delta[0].kind, DeltaKind::Deprecated);
    }

    #[test]
    fn unchanged_pair_is_not_emitted() {
        let mut old = BTreeMap::new();
        old.insert(ObjectUuid::from("_a-1"), version("_a-1", "v1", "f1", false));
        let mut new = BTreeMap::new();
        new.insert(ObjectUuid::from("_a-1"), version("_a-1", "v1", "f1", false));
        let lookup = lookup_with("_a-1", "X", ObjectType::ExpressionRule);
        let delta =
            compute_delta(SessionId::new(1), DeltaSet::Vendor, &old, &new, &lookup);
        assert!(delta.is_empty());
    }

    #[test]
    fn unchanged_new_vuuid_is_emitted_as_modified() {
        let mut old = BTreeMap::new();
        old.insert(ObjectUuid::from("_a-1"), version("_a-1", "v1", "f1", false));
        let mut new = BTreeMap::new();
        new.insert(ObjectUuid::from("_a-1"), version("_a-1", "v2", "f1", false));
        let lookup = lookup_with("_a-1", "X", ObjectType::ExpressionRule);
        let delta =
            compute_delta(SessionId::new(1), DeltaSet::Vendor, &old, &new, &lookup);
        assert_eq!(delta[0].kind, DeltaKind::Modified);
    }

    #[test]
    fn delta_engine_symmetry_swaps_new_and_removed() {
        let mut old = BTreeMap::new();
        old.insert(ObjectUuid::from("_a-1"), version("_a-1", "v1", "f1", false));
        let new = BTreeMap::new();
        let lookup = lookup_with("_a-1", "X", ObjectType::ExpressionRule);

        let forward =
            compute_delta(SessionId::new(1), DeltaSet::Vendor, &old, &new, &lookup);
        let backward =
            compute_delta(SessionId::new(1), DeltaSet::Vendor, &new, &old, &lookup);

        assert_eq!(forward[0].kind, DeltaKind::Removed);
        assert_eq!(backward[0].kind, DeltaKind::New);
    }
}
