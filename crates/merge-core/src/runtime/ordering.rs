// crates/merge-core/src/runtime/ordering.rs
// ============================================================================
// Module: Review Ordering
// Description: Assigns the final, dense order_index values over classified
//              changes (spec §4.9).
// Purpose: Produce a reviewer-facing queue: NO_CONFLICT(D) grouped by type,
//          then CONFLICT in dependency order, then NEW, then DELETED.
// Dependencies: crate::core, crate::runtime::deps
// ============================================================================

use std::collections::BTreeMap;

use crate::core::Change;
use crate::core::Classification;
use crate::core::MergeError;
use crate::core::ObjectLookup;
use crate::core::ObjectUuid;
use crate::runtime::deps::DependencyGraph;
use crate::runtime::deps::topological_order;

/// Assigns `order_index` to `changes` in place, per spec §4.9, and returns
/// any [`MergeError::DependencyCycle`] warnings raised while ordering the
/// `CONFLICT` tier. Changes classified `NO_CONFLICT` whose source was
/// customer-only (E) are left with `order_index = None` and excluded from
/// the queue by design.
#[must_use]
pub fn order_changes(
    mut changes: Vec<Change>,
    lookup: &ObjectLookup,
    graph: &DependencyGraph,
) -> (Vec<Change>, Vec<MergeError>) {
    let index_of: BTreeMap<ObjectUuid, usize> =
        changes.iter().enumerate().map(|(i, c)| (c.object_uuid.clone(), i)).collect();

    let no_conflict_d: Vec<ObjectUuid> = sorted_by_type_then_name(
        changes
            .iter()
            .filter(|c| c.classification == Classification::NoConflict && c.vendor_kind.is_some())
            .map(|c| c.object_uuid.clone())
            .collect(),
        lookup,
    );

    let conflict_uuids: Vec<ObjectUuid> = changes
        .iter()
        .filter(|c| c.classification == Classification::Conflict)
        .map(|c| c.object_uuid.clone())
        .collect();
    let (conflict_ordered, warnings) = topological_order(&conflict_uuids, graph, lookup);

    let new_ordered = sorted_by_type_then_name(
        changes
            .iter()
            .filter(|c| c.classification == Classification::New)
            .map(|c| c.object_uuid.clone())
            .collect(),
        lookup,
    );

    let deleted_ordered = sorted_by_type_then_name(
        changes
            .iter()
            .filter(|c| c.classification == Classification::Deleted)
            .map(|c| c.object_uuid.clone())
            .collect(),
        lookup,
    );

    let mut next_index: u64 = 0;
    for uuid in no_conflict_d.iter().chain(&conflict_ordered).chain(&new_ordered).chain(&deleted_ordered)
    {
        if let Some(&pos) = index_of.get(uuid) {
            changes[pos].order_index = Some(next_index);
            next_index += 1;
        }
    }

    (changes, warnings)
}

fn sorted_by_type_then_name(mut uuids: Vec<ObjectUuid>, lookup: &ObjectLookup) -> Vec<ObjectUuid> {
    uuids.sort_by(|a, b| {
        let key_a = lookup.get(a).map_or(("Unknown", a.as_str()), |o| (o.object_type.label(), o.display_name.as_str()));
        let key_b = lookup.get(b).map_or(("Unknown", b.as_str()), |o| (o.object_type.label(), o.display_name.as_str()));
        key_a.cmp(&key_b)
    });
    uuids
}
