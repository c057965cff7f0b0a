// crates/merge-parser/src/parser.rs
// ============================================================================
// Module: Object Parser
// Description: Decodes a single `(type, xml)` entry into a `RawObjectRecord`.
// Purpose: Implement `merge_core::ObjectParser` (spec §4.2).
// Dependencies: merge-core, tracing, crate::{tree, decoders}
// ============================================================================

use merge_core::ContentView;
use merge_core::ObjectParser;
use merge_core::ObjectType;
use merge_core::ObjectUuid;
use merge_core::RawEntry;
use merge_core::RawObjectRecord;
use merge_core::VersionUuid;

use crate::decoders::decode_content;
use crate::tree::XmlElement;
use crate::tree::parse_tree;

/// Decodes Appian object XML entries into typed records (spec §4.2).
///
/// # Invariants
/// - Never fails the whole package: a malformed or unrecognized object
///   degrades to a record with `object_type = Unknown` and the raw XML
///   preserved, never an error return.
/// - Exactly one warning is logged per degraded object.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlObjectParser;

impl XmlObjectParser {
    /// Creates a new parser. Stateless; safe to share across threads.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl ObjectParser for XmlObjectParser {
    fn parse(&self, entry: &RawEntry) -> RawObjectRecord {
        match parse_tree(&entry.xml) {
            Ok(root) => decode_entry(entry, &root),
            Err(error) => {
                tracing::warn!(
                    file = %entry.file_name,
                    object_type = %entry.object_type,
                    %error,
                    "object XML failed to parse; recording as unknown"
                );
                fallback_record(entry)
            }
        }
    }
}

fn decode_entry(entry: &RawEntry, root: &XmlElement) -> RawObjectRecord {
    let Some(content) = decode_content(entry.object_type, root) else {
        if entry.object_type != ObjectType::Unknown {
            tracing::warn!(
                file = %entry.file_name,
                object_type = %entry.object_type,
                "object type had no recognized content shape; recording as unknown"
            );
        }
        return fallback_record(entry);
    };

    let uuid = root.child_text("uuid").unwrap_or_else(|| fallback_uuid(entry));
    let version_uuid = root.child_text("versionUuid").unwrap_or_else(|| uuid.clone());
    let display_name = root.child_text("name").unwrap_or_else(|| fallback_uuid(entry));
    let deprecated = root
        .child_text("deprecated")
        .map(|value| value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let scripted_code = if entry.object_type.has_scripted_code() {
        content.scripted_code().map(str::to_string)
    } else {
        None
    };

    RawObjectRecord {
        uuid: ObjectUuid::new(uuid),
        display_name,
        object_type: entry.object_type,
        version_uuid: VersionUuid::new(version_uuid),
        scripted_code,
        content,
        raw_xml: entry.xml.clone(),
        deprecated,
    }
}

/// Builds a degraded record for XML that failed to parse or decode. The
/// fallback uuid is derived from the file name so the object still has a
/// stable identity across packages (same file name, same uuid) even though
/// its content never participates in comparisons (spec §4.2).
fn fallback_record(entry: &RawEntry) -> RawObjectRecord {
    let uuid = fallback_uuid(entry);
    RawObjectRecord {
        uuid: ObjectUuid::new(uuid.clone()),
        display_name: entry.file_name.clone(),
        object_type: ObjectType::Unknown,
        version_uuid: VersionUuid::new(uuid),
        scripted_code: None,
        content: ContentView::Unknown(entry.xml.clone()),
        raw_xml: entry.xml.clone(),
        deprecated: false,
    }
}

fn fallback_uuid(entry: &RawEntry) -> String {
    entry.file_name.strip_suffix(".xml").unwrap_or(&entry.file_name).to_string()
}
