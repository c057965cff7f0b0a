// crates/merge-core/src/lib.rs
// ============================================================================
// Module: Merge Core Library
// Description: Public API surface for the Appian three-way merge analyzer
//              core.
// Purpose: Expose domain types, backend-agnostic interfaces, and the
//          deterministic runtime pipeline that implements spec §2–§5.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! `merge-core` ingests three Appian package object graphs (base, customer,
//! new vendor), computes the vendor delta (D) and customer delta (E),
//! classifies every touched object into `NO_CONFLICT | CONFLICT | NEW |
//! DELETED`, and orders the result into a dependency-aware review queue. It
//! performs no I/O itself: archive reading, XML decoding, SAIL formatting,
//! and persistence are all backend-agnostic traits in [`interfaces`],
//! implemented by `merge-zip`, `merge-parser`, `merge-sail`, and
//! `merge-store-sqlite` respectively.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::AnalysisPayload;
pub use interfaces::NullProgressSink;
pub use interfaces::ObjectParser;
pub use interfaces::PackageReadError;
pub use interfaces::PackageReadErrorKind;
pub use interfaces::PackageReader;
pub use interfaces::ProgressSink;
pub use interfaces::RawEntry;
pub use interfaces::SailFormatter;
pub use interfaces::SessionStore;
pub use interfaces::StepProgress;
pub use interfaces::StoreError;

pub use runtime::CancellationToken;
pub use runtime::DependencyGraph;
pub use runtime::DiffLine;
pub use runtime::Hunk;
pub use runtime::LineTag;
pub use runtime::Orchestrator;
pub use runtime::OrchestratorConfig;
pub use runtime::PackageInput;
pub use runtime::PairOutcome;
pub use runtime::TextDiff;
pub use runtime::canonicalize;
pub use runtime::classify;
pub use runtime::compare_pair;
pub use runtime::compute_delta;
pub use runtime::diff_text;
pub use runtime::fingerprint;
pub use runtime::order_changes;
pub use runtime::topological_order;
