// crates/merge-sail/src/mapping.rs
// ============================================================================
// Module: System Rule Mapping Table
// Description: Frozen internal-identifier-to-public-name lookup for pass 3
//              of SAIL formatting.
// Purpose: Keep the mapping table as a versioned, release-frozen asset
//          instead of a hardcoded match arm per name (spec §4.3).
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! The real Appian mapping table has on the order of 230 internal
//! identifiers. This table ships a representative, release-frozen subset
//! covering the most common system rules; the lookup mechanism itself
//! (single flat map, exact-match, unmapped names pass through unchanged) is
//! what spec §4.3 requires and is independent of table size.

use std::collections::BTreeMap;
use std::sync::OnceLock;

/// Raw JSON asset: internal identifier (either the full quoted
/// `SYSTEM_SYSRULES_<NAME>_v<n>` form or a bare internal alias) to its
/// public name, without the `a!`/`rule!`/`cons!` prefix.
const MAPPING_JSON: &str = include_str!("system_rule_mapping.json");

/// Returns the frozen internal-to-public system rule name mapping,
/// parsed once on first use.
#[must_use]
pub fn system_rule_mapping() -> &'static BTreeMap<String, String> {
    static MAPPING: OnceLock<BTreeMap<String, String>> = OnceLock::new();
    MAPPING.get_or_init(|| {
        serde_json::from_str(MAPPING_JSON)
            .unwrap_or_else(|_| BTreeMap::new())
    })
}
