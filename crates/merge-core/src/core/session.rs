// crates/merge-core/src/core/session.rs
//! The top-level `Session` aggregate (spec §3).

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::ReferenceId;
use crate::core::identifiers::SessionId;
use crate::core::time::Timestamp;

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Analysis pipeline is running.
    Processing,
    /// Analysis completed; the review queue is ready to walk.
    Ready,
    /// A reviewer has started reviewing at least one change.
    InProgress,
    /// Every change with a non-null order index has a terminal review status.
    Completed,
    /// The pipeline failed; no partial analysis rows were persisted.
    Failed,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Processing => "processing",
            Self::Ready => "ready",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// The top-level session aggregate. Owns its packages, object versions,
/// delta results, and changes; deletion cascades (spec §3 "Ownership").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Numeric row id, assigned on insert.
    pub id: SessionId,
    /// Human-readable reference id, e.g. `MRG_001`.
    pub reference_id: ReferenceId,
    /// Lifecycle status.
    pub status: SessionStatus,
    /// Count of changes with status `reviewed`.
    pub reviewed_count: u64,
    /// Count of changes with status `skipped`.
    pub skipped_count: u64,
    /// Most recent fatal error, if `status == Failed`.
    pub last_error: Option<String>,
    /// Creation timestamp.
    pub created_at: Timestamp,
    /// Last update timestamp.
    pub updated_at: Timestamp,
}

impl Session {
    /// Starts a brand new session in the `processing` state.
    #[must_use]
    pub fn new(id: SessionId, reference_id: ReferenceId, now: Timestamp) -> Self {
        Self {
            id,
            reference_id,
            status: SessionStatus::Processing,
            reviewed_count: 0,
            skipped_count: 0,
            last_error: None,
            created_at: now,
            updated_at: now,
        }
    }
}
