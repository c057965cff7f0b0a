// crates/merge-core/src/runtime/mod.rs
// ============================================================================
// Module: Merge Core Runtime
// Description: Pure pipeline logic — canonicalization, comparison, delta,
//              classification, dependency analysis, ordering, diffing, and
//              the orchestrator that drives all of it end to end.
// Purpose: Execute the merge analysis pipeline (spec §2, §4) against any
//          backend reachable through `crate::interfaces`.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement every stage of the analysis pipeline described
//! in spec §4. All external callers (`merge-cli`, test harnesses) must drive
//! analysis through [`orchestrator::Orchestrator`] to preserve the ordering
//! and concurrency guarantees of spec §5.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod canonical;
pub mod classifier;
pub mod comparator;
pub mod delta;
pub mod deps;
pub mod difftext;
pub mod ordering;
pub mod orchestrator;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use canonical::canonicalize;
pub use canonical::fingerprint;
pub use classifier::classify;
pub use comparator::PairOutcome;
pub use comparator::compare_pair;
pub use delta::compute_delta;
pub use deps::DependencyGraph;
pub use deps::topological_order;
pub use difftext::DiffLine;
pub use difftext::Hunk;
pub use difftext::LineTag;
pub use difftext::TextDiff;
pub use difftext::diff_text;
pub use ordering::order_changes;
pub use orchestrator::CancellationToken;
pub use orchestrator::Orchestrator;
pub use orchestrator::OrchestratorConfig;
pub use orchestrator::PackageInput;
