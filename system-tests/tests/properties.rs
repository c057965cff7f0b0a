// system-tests/tests/properties.rs
// ============================================================================
// Module: Review Ordering Property Tests
// Description: Randomized checks of spec.md §8's ordering-correctness
//              properties over `merge_core::order_changes`.
// Purpose: Catch ordering regressions that a fixed set of hand-picked
//          changes would never exercise.
// Dependencies: system_tests is unused here; exercises merge-core directly.
// ============================================================================

use std::collections::BTreeSet;

use merge_core::AiSummaryState;
use merge_core::Change;
use merge_core::ChangeId;
use merge_core::Classification;
use merge_core::DependencyGraph;
use merge_core::ObjectLookup;
use merge_core::ObjectRecord;
use merge_core::ObjectType;
use merge_core::ObjectUuid;
use merge_core::ReviewStatus;
use merge_core::SessionId;
use merge_core::order_changes;
use proptest::prelude::*;

/// The four tiers a change can land in, in review-queue precedence order.
/// `NoConflictCustomerOnly` never enters the queue at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Tier {
    NoConflictCustomerOnly,
    NoConflictVendorTouched,
    Conflict,
    New,
    Deleted,
}

fn tier_strategy() -> impl Strategy<Value = Tier> {
    prop_oneof![
        Just(Tier::NoConflictCustomerOnly),
        Just(Tier::NoConflictVendorTouched),
        Just(Tier::Conflict),
        Just(Tier::New),
        Just(Tier::Deleted),
    ]
}

fn build_change(index: usize, tier: Tier) -> Change {
    let (classification, vendor_kind) = match tier {
        Tier::NoConflictCustomerOnly => (Classification::NoConflict, None),
        Tier::NoConflictVendorTouched => {
            (Classification::NoConflict, Some(merge_core::DeltaKind::Modified))
        }
        Tier::Conflict => (Classification::Conflict, Some(merge_core::DeltaKind::Modified)),
        Tier::New => (Classification::New, Some(merge_core::DeltaKind::New)),
        Tier::Deleted => (Classification::Deleted, Some(merge_core::DeltaKind::Removed)),
    };
    Change {
        id: ChangeId::new(index as u64),
        session_id: SessionId::new(1),
        object_uuid: ObjectUuid::new(format!("_obj-{index}")),
        classification,
        vendor_kind,
        customer_kind: None,
        review_status: ReviewStatus::Pending,
        notes: None,
        ai_summary: AiSummaryState::default(),
        order_index: None,
    }
}

fn lookup_for(changes: &[Change]) -> ObjectLookup {
    let mut lookup = ObjectLookup::new();
    for (i, change) in changes.iter().enumerate() {
        lookup.insert(ObjectRecord {
            uuid: change.object_uuid.clone(),
            display_name: format!("Object{i:04}"),
            object_type: ObjectType::ExpressionRule,
        });
    }
    lookup
}

proptest! {
    /// Every `order_changes` call over a random tier assignment produces
    /// gapless `0..k` order indices for exactly the changes the spec says
    /// should be queued, and leaves every other change's index `None`.
    #[test]
    fn order_indices_are_gapless_and_cover_exactly_the_queued_tiers(
        tiers in prop::collection::vec(tier_strategy(), 0..40)
    ) {
        let changes: Vec<Change> =
            tiers.iter().enumerate().map(|(i, &tier)| build_change(i, tier)).collect();
        let lookup = lookup_for(&changes);
        let graph = DependencyGraph::build(&std::collections::BTreeMap::new(), &lookup);

        let expected_queued = tiers.iter().filter(|t| **t != Tier::NoConflictCustomerOnly).count();

        let (ordered, warnings) = order_changes(changes, &lookup, &graph);
        prop_assert!(warnings.is_empty(), "a tier-only graph has no dependency edges to cycle");

        let mut assigned: Vec<u64> = ordered.iter().filter_map(|c| c.order_index).collect();
        assigned.sort_unstable();
        let expected_range: Vec<u64> = (0..expected_queued as u64).collect();
        prop_assert_eq!(assigned, expected_range);

        for (change, &tier) in ordered.iter().zip(tiers.iter()) {
            prop_assert_eq!(change.order_index.is_none(), tier == Tier::NoConflictCustomerOnly);
        }
    }

    /// Tier precedence holds: every queued change from an earlier tier
    /// (NO_CONFLICT(vendor) < CONFLICT < NEW < DELETED) gets a strictly
    /// smaller order index than every queued change from a later tier.
    #[test]
    fn tier_precedence_is_respected(
        tiers in prop::collection::vec(tier_strategy(), 1..40)
    ) {
        let changes: Vec<Change> =
            tiers.iter().enumerate().map(|(i, &tier)| build_change(i, tier)).collect();
        let lookup = lookup_for(&changes);
        let graph = DependencyGraph::build(&std::collections::BTreeMap::new(), &lookup);

        let (ordered, _warnings) = order_changes(changes, &lookup, &graph);

        let index_by_tier = |wanted: Tier| -> Vec<u64> {
            ordered
                .iter()
                .zip(tiers.iter())
                .filter(|(_, &tier)| tier == wanted)
                .filter_map(|(c, _)| c.order_index)
                .collect()
        };

        let tier_order =
            [Tier::NoConflictVendorTouched, Tier::Conflict, Tier::New, Tier::Deleted];
        for window in tier_order.windows(2) {
            let earlier = index_by_tier(window[0]);
            let later = index_by_tier(window[1]);
            let max_earlier = earlier.iter().copied().max();
            let min_later = later.iter().copied().min();
            if let (Some(max_earlier), Some(min_later)) = (max_earlier, min_later) {
                prop_assert!(max_earlier < min_later);
            }
        }
    }

    /// `order_changes` never drops, duplicates, or invents a change: the
    /// uuid set before and after is identical.
    #[test]
    fn order_changes_preserves_the_change_set(
        tiers in prop::collection::vec(tier_strategy(), 0..40)
    ) {
        let changes: Vec<Change> =
            tiers.iter().enumerate().map(|(i, &tier)| build_change(i, tier)).collect();
        let lookup = lookup_for(&changes);
        let graph = DependencyGraph::build(&std::collections::BTreeMap::new(), &lookup);

        let before: BTreeSet<ObjectUuid> = changes.iter().map(|c| c.object_uuid.clone()).collect();
        let (ordered, _warnings) = order_changes(changes, &lookup, &graph);
        let after: BTreeSet<ObjectUuid> = ordered.iter().map(|c| c.object_uuid.clone()).collect();

        prop_assert_eq!(before, after);
    }
}
