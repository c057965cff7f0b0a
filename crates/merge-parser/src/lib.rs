// crates/merge-parser/src/lib.rs
// ============================================================================
// Module: Merge Parser Library
// Description: Public API surface for Appian object XML decoding.
// Purpose: Expose the concrete `ObjectParser` implementation used by
//          `merge-cli` and the orchestrator's production wiring.
// Dependencies: merge-core, quick-xml, serde_json, tracing
// ============================================================================

//! ## Overview
//! `merge-parser` implements [`merge_core::ObjectParser`] (spec §4.2): it
//! decodes a single object's XML into a [`merge_core::RawObjectRecord`],
//! degrading gracefully to `object_type = Unknown` with the raw XML
//! preserved whenever the markup is malformed or the content shape is not
//! one of the twelve recognized types. The XML schema itself is
//! vendor-defined and out of this crate's control, so decoding goes through
//! a permissive, namespace-agnostic element tree (`tree`) rather than a
//! strict derived schema.

pub mod decoders;
pub mod parser;
pub mod tree;

pub use parser::XmlObjectParser;
