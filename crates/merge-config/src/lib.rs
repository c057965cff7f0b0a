// crates/merge-config/src/lib.rs
// ============================================================================
// Module: Merge Config Library
// Description: Canonical config model and validation for the merge analyzer.
// Purpose: Single source of truth for merge-analyzer.toml semantics.
// Dependencies: serde, toml
// ============================================================================

//! ## Overview
//! `merge-config` defines the core's runtime-tunable knobs (spec §6):
//! maximum package size, per-step timeout, diff context lines, and the path
//! to the frozen SAIL public-function mapping table asset. Configuration is
//! loaded from a TOML file with strict validation; missing or invalid
//! configuration fails closed.

pub mod config;

pub use config::ConfigError;
pub use config::MergeConfig;
