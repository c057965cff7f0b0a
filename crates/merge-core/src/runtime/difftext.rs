// crates/merge-core/src/runtime/difftext.rs
// ============================================================================
// Module: Text-Diff Generator
// Description: Unified-diff hunk generation between two scripted code
//              strings (spec §4.10).
// Purpose: Produce reviewer-facing hunks and add/delete counts on demand.
// Dependencies: similar
// ============================================================================

use similar::ChangeTag;
use similar::TextDiff as SimilarDiff;

/// The role a line plays within a hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTag {
    /// Present, unchanged, on both sides.
    Context,
    /// Present only on the new side.
    Add,
    /// Present only on the old side.
    Delete,
}

/// One line within a hunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    /// Whether this line is context, an addition, or a deletion.
    pub tag: LineTag,
    /// 1-based line number in the old text, absent for additions.
    pub old_line_no: Option<usize>,
    /// 1-based line number in the new text, absent for deletions.
    pub new_line_no: Option<usize>,
    /// Line text, without its trailing newline.
    pub text: String,
}

/// A contiguous unified-diff hunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    /// The `@@ -oldStart,oldCount +newStart,newCount @@` header.
    pub header: String,
    /// Lines within the hunk, in order.
    pub lines: Vec<DiffLine>,
}

/// The complete diff result between two scripted code strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextDiff {
    /// Hunks, in document order.
    pub hunks: Vec<Hunk>,
    /// Total added lines across all hunks.
    pub additions: usize,
    /// Total deleted lines across all hunks.
    pub deletions: usize,
}

/// Computes the unified diff between `old` and `new` with `context_lines` of
/// surrounding context per hunk (spec §4.10). Empty or identical inputs
/// produce an empty hunk list and zero counts.
#[must_use]
pub fn diff_text(old: &str, new: &str, context_lines: usize) -> TextDiff {
    let diff = SimilarDiff::from_lines(old, new);
    let mut result = TextDiff::default();

    for group in diff.grouped_ops(context_lines) {
        let Some(first_op) = group.first() else { continue };
        let Some(last_op) = group.last() else { continue };

        let old_start = first_op.old_range().start;
        let new_start = first_op.new_range().start;
        let old_count = last_op.old_range().end - old_start;
        let new_count = last_op.new_range().end - new_start;

        let mut lines = Vec::new();
        for op in &group {
            for change in diff.iter_changes(op) {
                let tag = match change.tag() {
                    ChangeTag::Equal => LineTag::Context,
                    ChangeTag::Insert => LineTag::Add,
                    ChangeTag::Delete => LineTag::Delete,
                };
                match tag {
                    LineTag::Add => result.additions += 1,
                    LineTag::Delete => result.deletions += 1,
                    LineTag::Context => {}
                }
                lines.push(DiffLine {
                    tag,
                    old_line_no: change.old_index().map(|i| i + 1),
                    new_line_no: change.new_index().map(|i| i + 1),
                    text: change.value().trim_end_matches('\n').to_string(),
                });
            }
        }

        let header = format!(
            "@@ -{old_start_disp},{old_count} +{new_start_disp},{new_count} @@",
            old_start_disp = old_start + 1,
            new_start_disp = new_start + 1,
        );
        result.hunks.push(Hunk { header, lines });
    }

    result
}
