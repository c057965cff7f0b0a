// crates/merge-core/src/runtime/classifier.rs
// ============================================================================
// Module: Set Classifier
// Description: Applies the fixed, ordered classification rule table over
//              D ∪ E (spec §4.7).
// Purpose: Emit one classified Change per uuid touched by either delta.
// Dependencies: crate::core, crate::runtime::comparator
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::core::AiSummaryState;
use crate::core::Change;
use crate::core::ChangeId;
use crate::core::Classification;
use crate::core::DeltaKind;
use crate::core::DeltaRecord;
use crate::core::ObjectUuid;
use crate::core::ObjectVersion;
use crate::core::ReviewStatus;
use crate::core::SessionId;
use crate::runtime::comparator::compare_pair;

/// Classifies every uuid in `vendor ∪ customer` via the ordered rule table
/// (spec §4.7, rules 1–9), keyed by object uuid for `O(1)` lookup.
///
/// `customer_versions` and `new_vendor_versions` supply the B and C object
/// versions needed for rule 8's re-comparison when both sides independently
/// modified the same object.
#[must_use]
pub fn classify(
    session_id: SessionId,
    vendor: &BTreeMap<ObjectUuid, DeltaRecord>,
    customer: &BTreeMap<ObjectUuid, DeltaRecord>,
    customer_versions: &BTreeMap<ObjectUuid, ObjectVersion>,
    new_vendor_versions: &BTreeMap<ObjectUuid, ObjectVersion>,
) -> Vec<Change> {
    let mut uuids: BTreeSet<ObjectUuid> = BTreeSet::new();
    uuids.extend(vendor.keys().cloned());
    uuids.extend(customer.keys().cloned());

    uuids
        .into_iter()
        .map(|uuid| {
            let d = vendor.get(&uuid);
            let e = customer.get(&uuid);
            let classification =
                classify_one(&uuid, d, e, customer_versions, new_vendor_versions);
            Change {
                id: ChangeId::new(0),
                session_id,
                object_uuid: uuid,
                classification,
                vendor_kind: d.map(|r| r.kind),
                customer_kind: e.map(|r| r.kind),
                review_status: ReviewStatus::Pending,
                notes: None,
                ai_summary: AiSummaryState::default(),
                order_index: None,
            }
        })
        .collect()
}

fn classify_one(
    uuid: &ObjectUuid,
    d: Option<&DeltaRecord>,
    e: Option<&DeltaRecord>,
    customer_versions: &BTreeMap<ObjectUuid, ObjectVersion>,
    new_vendor_versions: &BTreeMap<ObjectUuid, ObjectVersion>,
) -> Classification {
    match (d, e) {
        // Rule 1: vendor touched it, customer didn't.
        (Some(_), None) => Classification::NoConflict,
        // Rule 2: customer touched it, vendor didn't.
        (None, Some(_)) => Classification::NoConflict,
        (None, None) => unreachable!("uuid is drawn from vendor ∪ customer keys"),
        (Some(d), Some(e)) => match (d.kind, e.kind) {
            // Rule 3.
            (DeltaKind::New, DeltaKind::New) => Classification::New,
            // Rule 4.
            (DeltaKind::Removed | DeltaKind::Deprecated, DeltaKind::Removed) => {
                Classification::Deleted
            }
            // Rule 5.
            (DeltaKind::Deprecated, DeltaKind::Modified) => Classification::Deleted,
            // Rule 6.
            (DeltaKind::Removed, DeltaKind::Modified) => Classification::Conflict,
            // Rule 7.
            (DeltaKind::Modified, DeltaKind::Removed) => Classification::Conflict,
            // Rule 8: both modified independently; demote to NO_CONFLICT
            // when the resulting content is identical.
            (DeltaKind::Modified, DeltaKind::Modified) => {
                match (customer_versions.get(uuid), new_vendor_versions.get(uuid)) {
                    (Some(b), Some(c)) if compare_pair(b, c).content_equal() => {
                        Classification::NoConflict
                    }
                    _ => Classification::Conflict,
                }
            }
            // Rule 9: defensive default for any other combination.
            _ => Classification::Conflict,
        },
    }
}
