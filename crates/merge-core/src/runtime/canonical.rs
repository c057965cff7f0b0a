// crates/merge-core/src/runtime/canonical.rs
// ============================================================================
// Module: Content Canonicalizer
// Description: Splices SAIL-Formatter output into a parsed object's content
//              view and computes its content fingerprint (spec §4.4).
// Purpose: Produce the stable comparison view consumed by the Pair
//          Comparator and Delta Engine.
// Dependencies: crate::core
// ============================================================================

use crate::core::ContentFingerprint;
use crate::core::ContentView;
use crate::core::FingerprintError;
use crate::core::RawObjectRecord;

/// Computes the content fingerprint of an already-canonicalized view.
/// `Unknown` objects are hashed as raw bytes directly; every other view is
/// hashed as its canonical JSON encoding (spec §3 "Content fingerprint").
///
/// # Errors
///
/// Returns [`FingerprintError`] when the view cannot be serialized to
/// canonical JSON.
pub fn fingerprint(view: &ContentView) -> Result<ContentFingerprint, FingerprintError> {
    match view {
        ContentView::Unknown(bytes) => Ok(ContentFingerprint::of_bytes(bytes)),
        other => ContentFingerprint::compute(None, other),
    }
}

/// Produces the final comparison view and fingerprint for a parsed object,
/// splicing in `formatted_code` (the SAIL Formatter's output) when the
/// object type carries scripted code.
///
/// # Errors
///
/// Returns [`FingerprintError`] when fingerprinting fails.
pub fn canonicalize(
    raw: &RawObjectRecord,
    formatted_code: Option<String>,
) -> Result<(ContentView, ContentFingerprint), FingerprintError> {
    let view = match formatted_code {
        Some(code) => raw.content.with_code(code),
        None => raw.content.clone(),
    };
    let fp = fingerprint(&view)?;
    Ok((view, fp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ExpressionRuleView;
    use crate::core::Field;
    use std::collections::BTreeSet;

    #[test]
    fn canonicalize_splices_formatted_code_into_the_view() {
        let raw = RawObjectRecord {
            uuid: "_a-1".into(),
            display_name: "R".to_string(),
            object_type: crate::core::ObjectType::ExpressionRule,
            version_uuid: "v1".into(),
            scripted_code: Some("a!x(  )".to_string()),
            content: ContentView::ExpressionRule(ExpressionRuleView {
                code: "a!x(  )".to_string(),
                inputs: BTreeSet::new(),
                output_type: "text".to_string(),
            }),
            raw_xml: Vec::new(),
            deprecated: false,
        };
        let (view, _fp) = canonicalize(&raw, Some("a!x()".to_string())).unwrap();
        assert_eq!(view.scripted_code(), Some("a!x()"));
    }

    #[test]
    fn fingerprint_of_unknown_hashes_raw_bytes() {
        let a = fingerprint(&ContentView::Unknown(b"hello".to_vec())).unwrap();
        let b = ContentFingerprint::of_bytes(b"hello");
        assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_distinguishes_differing_inputs() {
        let view_a = ContentView::ExpressionRule(ExpressionRuleView {
            code: "a!x()".to_string(),
            inputs: BTreeSet::from([Field { name: "a".into(), field_type: "text".into() }]),
            output_type: "text".to_string(),
        });
        let view_b = ContentView::ExpressionRule(ExpressionRuleView {
            code: "a!x()".to_string(),
            inputs: BTreeSet::new(),
            output_type: "text".to_string(),
        });
        assert_ne!(fingerprint(&view_a).unwrap(), fingerprint(&view_b).unwrap());
    }
}
