// crates/merge-core/src/core/change.rs
// ============================================================================
// Module: Classified Change Records
// Description: The working review set — one row per uuid in D ∪ E.
// Purpose: Carry classification, review state, and ordering for the review queue.
// Dependencies: serde, crate::core
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::delta::DeltaKind;
use crate::core::identifiers::ChangeId;
use crate::core::identifiers::ObjectUuid;
use crate::core::identifiers::SessionId;

/// The classification assigned to a change by the Set Classifier (spec §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Safe to adopt without reviewer input.
    NoConflict,
    /// Requires reviewer judgment.
    Conflict,
    /// Both sides introduced the object independently.
    New,
    /// The object is being removed from the upgraded application.
    Deleted,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NoConflict => "NO_CONFLICT",
            Self::Conflict => "CONFLICT",
            Self::New => "NEW",
            Self::Deleted => "DELETED",
        };
        f.write_str(label)
    }
}

/// Review status of a single change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Not yet reviewed.
    Pending,
    /// Reviewer explicitly accepted/resolved this change.
    Reviewed,
    /// Reviewer explicitly skipped this change.
    Skipped,
}

impl ReviewStatus {
    /// Whether this status counts as terminal for session completion
    /// (spec §4.11 "Complete session").
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Reviewed | Self::Skipped)
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Reviewed => "reviewed",
            Self::Skipped => "skipped",
        };
        f.write_str(label)
    }
}

/// Opaque AI-summary bookkeeping, written and read by an external
/// collaborator. The core never produces or schedules summaries; it only
/// persists whatever is handed to it (spec §9, "Open question — on-demand
/// AI summary batching").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiSummaryState {
    /// Opaque summary text, if generated.
    pub ai_summary: Option<String>,
    /// Opaque status string (e.g. "pending", "generated", "failed"), owned
    /// entirely by the external collaborator's vocabulary.
    pub ai_summary_status: Option<String>,
    /// When the summary was generated, if it was.
    pub ai_summary_generated_at: Option<crate::core::time::Timestamp>,
}

/// One row per uuid in `D ∪ E`: the working set a reviewer walks through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// Row id, assigned on insert.
    pub id: ChangeId,
    /// Owning session.
    pub session_id: SessionId,
    /// The changed object's stable uuid.
    pub object_uuid: ObjectUuid,
    /// Classification assigned by the Set Classifier.
    pub classification: Classification,
    /// Vendor delta kind, if this uuid appeared in set D.
    pub vendor_kind: Option<DeltaKind>,
    /// Customer delta kind, if this uuid appeared in set E.
    pub customer_kind: Option<DeltaKind>,
    /// Current review status.
    pub review_status: ReviewStatus,
    /// Free-text reviewer notes.
    pub notes: Option<String>,
    /// Opaque AI-summary bookkeeping.
    pub ai_summary: AiSummaryState,
    /// Position in the review queue. `None` for customer-only `NoConflict`
    /// changes, which are excluded from the queue by design (spec §4.9).
    pub order_index: Option<u64>,
}

impl Change {
    /// Whether this change participates in the ordered review queue.
    #[must_use]
    pub const fn is_in_review_queue(&self) -> bool {
        self.order_index.is_some()
    }
}
