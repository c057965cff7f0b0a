// crates/merge-sail/src/formatter.rs
// ============================================================================
// Module: SAIL Formatter
// Description: Four-pass deterministic normalization of scripted code.
// Purpose: Implement `merge_core::SailFormatter` (spec §4.3).
// Dependencies: merge-core, regex, crate::mapping
// ============================================================================

use std::sync::OnceLock;

use merge_core::ObjectLookup;
use merge_core::ObjectType;
use merge_core::ObjectUuid;
use merge_core::SailFormatter;
use regex::Regex;

use crate::mapping::system_rule_mapping;

/// Normalizes scripted SAIL code into a stable, comparable form (spec §4.3).
///
/// # Invariants
/// - Deterministic: the same input and session lookup always produce the
///   same output.
/// - Idempotent: `format(format(x), lookup) == format(x, lookup)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SailTextFormatter;

impl SailTextFormatter {
    /// Creates a new formatter. Stateless; safe to share across threads.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SailFormatter for SailTextFormatter {
    fn format(&self, code: &str, lookup: &ObjectLookup) -> String {
        let decoded = decode_escapes(code);
        let resolved = resolve_object_references(&decoded, lookup);
        let remapped = remap_system_rules(&resolved);
        collapse_whitespace(&remapped)
    }
}

// ============================================================================
// SECTION: Pass 1 — escape decoding
// ============================================================================

/// Decodes the four literal escapes Appian's XML export uses for scripted
/// code stored as attribute/text content: `\n`, `\t`, `\"`, `\\`.
fn decode_escapes(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut chars = code.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.peek() {
            Some('n') => {
                out.push('\n');
                chars.next();
            }
            Some('t') => {
                out.push('\t');
                chars.next();
            }
            Some('"') => {
                out.push('"');
                chars.next();
            }
            Some('\\') => {
                out.push('\\');
                chars.next();
            }
            _ => out.push(ch),
        }
    }
    out
}

// ============================================================================
// SECTION: Pass 2 — object uuid reference resolution
// ============================================================================

#[allow(
    clippy::unwrap_used,
    reason = "Patterns are compile-time literals; a failure here is a coding error, not runtime input."
)]
fn quoted_uuid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"#"([^"]+)""#).unwrap())
}

#[allow(clippy::unwrap_used, reason = "Patterns are compile-time literals.")]
fn rule_bang_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"rule!([A-Za-z0-9_\-]+)").unwrap())
}

#[allow(clippy::unwrap_used, reason = "Patterns are compile-time literals.")]
fn cons_bang_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"cons!([A-Za-z0-9_\-]+)").unwrap())
}

/// Replaces uuid references with the referenced object's current display
/// name, using `rule!`/`cons!` depending on the resolved object's type.
/// Uuids that do not resolve in `lookup` are left untouched (spec §4.3).
fn resolve_object_references(code: &str, lookup: &ObjectLookup) -> String {
    let with_quoted = quoted_uuid_pattern().replace_all(code, |caps: &regex::Captures<'_>| {
        let uuid = &caps[1];
        match lookup.get(&ObjectUuid::new(uuid)) {
            Some(record) => format!("{}!{}", reference_macro(record.object_type), record.display_name),
            None => caps[0].to_string(),
        }
    });

    let with_rule = rule_bang_pattern().replace_all(&with_quoted, |caps: &regex::Captures<'_>| {
        let uuid = &caps[1];
        match lookup.get(&ObjectUuid::new(uuid)) {
            Some(record) => format!("rule!{}", record.display_name),
            None => caps[0].to_string(),
        }
    });

    cons_bang_pattern()
        .replace_all(&with_rule, |caps: &regex::Captures<'_>| {
            let uuid = &caps[1];
            match lookup.get(&ObjectUuid::new(uuid)) {
                Some(record) => format!("cons!{}", record.display_name),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// The reference macro an object's type is addressed by in SAIL source.
fn reference_macro(object_type: ObjectType) -> &'static str {
    match object_type {
        ObjectType::Constant => "cons",
        _ => "rule",
    }
}

// ============================================================================
// SECTION: Pass 3 — system rule identifier remapping
// ============================================================================

#[allow(clippy::unwrap_used, reason = "Patterns are compile-time literals.")]
fn quoted_system_rule_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r#"#"(SYSTEM_SYSRULES_[A-Z0-9_]+_v\d+)""#).unwrap())
}

#[allow(clippy::unwrap_used, reason = "Patterns are compile-time literals.")]
fn internal_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"a!([A-Za-z_][A-Za-z0-9_]*)").unwrap())
}

/// Replaces internal system-rule identifiers with their public `a!` form
/// using the frozen mapping table. Unmapped names pass through unchanged.
fn remap_system_rules(code: &str) -> String {
    let mapping = system_rule_mapping();

    let with_quoted =
        quoted_system_rule_pattern().replace_all(code, |caps: &regex::Captures<'_>| {
            let key = &caps[1];
            match mapping.get(key) {
                Some(public) => format!("a!{public}"),
                None => caps[0].to_string(),
            }
        });

    internal_name_pattern()
        .replace_all(&with_quoted, |caps: &regex::Captures<'_>| {
            let key = &caps[1];
            match mapping.get(key) {
                Some(public) => format!("a!{public}"),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

// ============================================================================
// SECTION: Pass 4 — whitespace collapsing
// ============================================================================

/// Collapses runs of horizontal whitespace within each line, trims each
/// line, and drops lines left empty, while keeping line breaks between the
/// remaining statements.
#[allow(clippy::unwrap_used, reason = "Pattern is a compile-time literal.")]
fn collapse_whitespace(code: &str) -> String {
    static RUN: OnceLock<Regex> = OnceLock::new();
    let run = RUN.get_or_init(|| Regex::new(r"[ \t]+").unwrap());

    code.lines()
        .map(|line| run.replace_all(line.trim(), " ").into_owned())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
