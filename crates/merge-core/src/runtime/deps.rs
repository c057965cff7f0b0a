// crates/merge-core/src/runtime/deps.rs
// ============================================================================
// Module: Dependency Analyzer
// Description: Harvests cross-references from canonicalized content and
//              topologically sorts objects for review ordering (spec §4.8).
// Purpose: Resolve parent/child edges and break cycles deterministically.
// Dependencies: regex, crate::core
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::VecDeque;
use std::sync::OnceLock;

use regex::Regex;

use crate::core::MergeError;
use crate::core::ObjectLookup;
use crate::core::ObjectUuid;

/// The compiled uuid-shaped reference pattern (spec §9 "Opaque
/// cross-references"): Appian's `_a-<hex>` object uuids, with an optional
/// `_<digits>` suffix, plus bare hyphenated hex uuids as a fallback shape.
fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"_a-[0-9a-fA-F]+(?:_\d+)?|[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
        )
        .expect("reference pattern is a fixed, valid regex")
    })
}

/// Directed graph of object references: `u → v` when `u`'s canonicalized
/// content contains a reference resolving to `v` (spec §4.8).
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// `u -> {v : u -> v}` (children).
    children: BTreeMap<ObjectUuid, BTreeSet<ObjectUuid>>,
    /// `v -> {u : u -> v}` (parents).
    parents: BTreeMap<ObjectUuid, BTreeSet<ObjectUuid>>,
}

impl DependencyGraph {
    /// Scans every object's flattened textual content for reference-shaped
    /// substrings and builds the edge set, keeping only matches that resolve
    /// to another object present in `lookup`.
    #[must_use]
    pub fn build(texts: &BTreeMap<ObjectUuid, String>, lookup: &ObjectLookup) -> Self {
        let mut graph = Self::default();
        for (uuid, text) in texts {
            for candidate in reference_pattern().find_iter(text) {
                let target = ObjectUuid::new(candidate.as_str());
                if &target == uuid || lookup.get(&target).is_none() {
                    continue;
                }
                graph.children.entry(uuid.clone()).or_default().insert(target.clone());
                graph.parents.entry(target).or_default().insert(uuid.clone());
            }
        }
        graph
    }

    /// Returns the parents of `uuid` (objects whose content references it).
    #[must_use]
    pub fn parents_of(&self, uuid: &ObjectUuid) -> Vec<ObjectUuid> {
        self.parents.get(uuid).map(|set| set.iter().cloned().collect()).unwrap_or_default()
    }

    /// Returns the children of `uuid` (objects it references).
    #[must_use]
    pub fn children_of(&self, uuid: &ObjectUuid) -> Vec<ObjectUuid> {
        self.children.get(uuid).map(|set| set.iter().cloned().collect()).unwrap_or_default()
    }
}

/// Tiebreaker key for Kahn's algorithm and cycle-breaking: object type label
/// (alphabetical), then display name (spec §4.8).
fn sort_key(uuid: &ObjectUuid, lookup: &ObjectLookup) -> (&'static str, String) {
    lookup
        .get(uuid)
        .map_or(("Unknown", uuid.as_str().to_string()), |obj| {
            (obj.object_type.label(), obj.display_name.clone())
        })
}

/// Topologically sorts `uuids` so that parents (within the same set) precede
/// their children, using Kahn's algorithm restricted to the given subset of
/// nodes. Ties are broken by `(object_type, display_name)`. Cycles are
/// broken by dropping the edge with the lexicographically largest
/// `(source_name, target_name)` pair and reporting a
/// [`MergeError::DependencyCycle`] for each break; the residual DAG is then
/// sorted normally (spec §4.8, §9).
#[must_use]
pub fn topological_order(
    uuids: &[ObjectUuid],
    graph: &DependencyGraph,
    lookup: &ObjectLookup,
) -> (Vec<ObjectUuid>, Vec<MergeError>) {
    let node_set: BTreeSet<ObjectUuid> = uuids.iter().cloned().collect();

    // Restrict edges to the subset being ordered.
    let mut children: BTreeMap<ObjectUuid, BTreeSet<ObjectUuid>> = BTreeMap::new();
    let mut in_degree: BTreeMap<ObjectUuid, usize> = node_set.iter().cloned().map(|u| (u, 0)).collect();
    for u in &node_set {
        for v in graph.children_of(u) {
            if node_set.contains(&v) && v != *u {
                if children.entry(u.clone()).or_default().insert(v.clone()) {
                    *in_degree.entry(v).or_insert(0) += 1;
                }
            }
        }
    }

    let mut warnings = Vec::new();
    let mut order = Vec::with_capacity(node_set.len());
    let mut remaining = in_degree;

    loop {
        let mut ready: Vec<ObjectUuid> = remaining
            .iter()
            .filter(|(_, &deg)| deg == 0)
            .map(|(u, _)| u.clone())
            .collect();
        ready.sort_by(|a, b| sort_key(a, lookup).cmp(&sort_key(b, lookup)));

        if ready.is_empty() {
            if remaining.is_empty() {
                break;
            }
            // Residual cycle: break the lexicographically maximal edge among
            // remaining nodes and retry.
            if let Some((from, to)) = find_max_edge(&remaining, &children, lookup) {
                if let Some(set) = children.get_mut(&from) {
                    set.remove(&to);
                }
                if let Some(deg) = remaining.get_mut(&to) {
                    *deg = deg.saturating_sub(1);
                }
                warnings.push(MergeError::DependencyCycle {
                    from: from.as_str().to_string(),
                    to: to.as_str().to_string(),
                });
                continue;
            }
            // No edges left but nodes remain: emit them in tiebreak order.
            let mut rest: Vec<ObjectUuid> = remaining.keys().cloned().collect();
            rest.sort_by(|a, b| sort_key(a, lookup).cmp(&sort_key(b, lookup)));
            order.extend(rest);
            break;
        }

        let queue: VecDeque<ObjectUuid> = ready.into_iter().collect();
        for u in queue {
            remaining.remove(&u);
            order.push(u.clone());
            if let Some(targets) = children.get(&u) {
                for v in targets.clone() {
                    if let Some(deg) = remaining.get_mut(&v) {
                        *deg = deg.saturating_sub(1);
                    }
                }
            }
        }
    }

    (order, warnings)
}

fn find_max_edge(
    remaining: &BTreeMap<ObjectUuid, usize>,
    children: &BTreeMap<ObjectUuid, BTreeSet<ObjectUuid>>,
    lookup: &ObjectLookup,
) -> Option<(ObjectUuid, ObjectUuid)> {
    let mut best: Option<(ObjectUuid, ObjectUuid)> = None;
    for (from, targets) in children {
        if !remaining.contains_key(from) {
            continue;
        }
        for to in targets {
            if !remaining.contains_key(to) {
                continue;
            }
            let key = (sort_key(from, lookup), sort_key(to, lookup));
            let is_larger = match &best {
                None => true,
                Some((bf, bt)) => key > (sort_key(bf, lookup), sort_key(bt, lookup)),
            };
            if is_larger {
                best = Some((from.clone(), to.clone()));
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ObjectRecord;
    use crate::core::ObjectType;

    fn lookup(entries: &[(&str, &str, ObjectType)]) -> ObjectLookup {
        let mut lookup = ObjectLookup::new();
        for (uuid, name, object_type) in entries {
            lookup.insert(ObjectRecord {
                uuid: ObjectUuid::from(*uuid),
                display_name: (*name).to_string(),
                object_type: *object_type,
            });
        }
        lookup
    }

    #[test]
    fn builds_edges_only_for_resolvable_references() {
        let lookup = lookup(&[
            ("_a-1", "Parent", ObjectType::ExpressionRule),
            ("_a-2", "Child", ObjectType::ExpressionRule),
        ]);
        let mut texts = BTreeMap::new();
        texts.insert(ObjectUuid::from("_a-1"), "rule!Child ref _a-2 and _a-999".to_string());
        let graph = DependencyGraph::build(&texts, &lookup);
        assert_eq!(graph.children_of(&ObjectUuid::from("_a-1")), vec![ObjectUuid::from("_a-2")]);
        assert_eq!(graph.parents_of(&ObjectUuid::from("_a-2")), vec![ObjectUuid::from("_a-1")]);
    }

    #[test]
    fn topological_order_places_parents_before_children() {
        let lookup = lookup(&[
            ("_a-1", "Parent", ObjectType::ExpressionRule),
            ("_a-2", "Child", ObjectType::ExpressionRule),
        ]);
        let mut texts = BTreeMap::new();
        texts.insert(ObjectUuid::from("_a-1"), "_a-2".to_string());
        let graph = DependencyGraph::build(&texts, &lookup);
        let uuids = vec![ObjectUuid::from("_a-2"), ObjectUuid::from("_a-1")];
        let (order, warnings) = topological_order(&uuids, &graph, &lookup);
        assert!(warnings.is_empty());
        assert_eq!(order, vec![ObjectUuid::from("_a-1"), ObjectUuid::from("_a-2")]);
    }

    #[test]
    fn cycles_are_broken_deterministically_and_reported() {
        let lookup = lookup(&[
            ("_a-1", "Alpha", ObjectType::ExpressionRule),
            ("_a-2", "Beta", ObjectType::ExpressionRule),
        ]);
        let mut texts = BTreeMap::new();
        texts.insert(ObjectUuid::from("_a-1"), "_a-2".to_string());
        texts.insert(ObjectUuid::from("_a-2"), "_a-1".to_string());
        let graph = DependencyGraph::build(&texts, &lookup);
        let uuids = vec![ObjectUuid::from("_a-1"), ObjectUuid::from("_a-2")];
        let (order, warnings) = topological_order(&uuids, &graph, &lookup);
        assert_eq!(order.len(), 2);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn no_edges_sorts_by_type_then_name() {
        let lookup = lookup(&[
            ("_a-1", "Zeta", ObjectType::ExpressionRule),
            ("_a-2", "Alpha", ObjectType::ExpressionRule),
        ]);
        let graph = DependencyGraph::default();
        let uuids = vec![ObjectUuid::from("_a-1"), ObjectUuid::from("_a-2")];
        let (order, _) = topological_order(&uuids, &graph, &lookup);
        assert_eq!(order, vec![ObjectUuid::from("_a-2"), ObjectUuid::from("_a-1")]);
    }
}
