// crates/merge-core/src/interfaces/mod.rs
// ============================================================================
// Module: Merge Core Interfaces
// Description: Backend-agnostic trait seams for I/O the core does not perform
//              itself (archive reading, XML decoding, persistence, progress).
// Purpose: Let the Orchestrator (runtime::orchestrator) stay generic over
//          concrete implementations living in merge-zip, merge-parser,
//          merge-sail, and merge-store-sqlite.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Implementations must be deterministic for the same inputs; the
//! Orchestrator's ordering guarantees (spec §5) depend on it. None of these
//! traits are object-safe-constrained beyond what `Box<dyn Trait>` needs in
//! `merge-cli`.

use thiserror::Error;

use crate::core::MergeError;
use crate::core::ObjectLookup;
use crate::core::ObjectType;
use crate::core::PackageRole;
use crate::core::PackageValidationKind;
use crate::core::RawObjectRecord;
use crate::core::Session;

// ============================================================================
// SECTION: Package Reader
// ============================================================================

/// One archive entry as enumerated by a [`PackageReader`]: the type directory
/// it was found under, its file name within that directory, and its raw
/// bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    /// Object type inferred from the containing directory.
    pub object_type: ObjectType,
    /// File name within the type directory.
    pub file_name: String,
    /// Raw XML bytes of the entry.
    pub xml: Vec<u8>,
}

/// Package validation failure sub-kinds (spec §4.1, §7), independent of which
/// package triggered them; the caller attaches [`PackageRole`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageReadErrorKind {
    /// The input path does not exist.
    FileNotFound,
    /// The archive exceeds the configured size cap.
    TooLarge,
    /// The file is not a well-formed ZIP.
    NotZip,
    /// The ZIP central directory or an entry is corrupt.
    Corrupt,
    /// No recognized Appian type directory was found.
    MissingAppianDirs,
    /// No XML entries were found under any recognized directory.
    NoXml,
}

impl PackageReadErrorKind {
    /// Maps to the corresponding [`PackageValidationKind`].
    #[must_use]
    pub const fn to_validation_kind(self) -> PackageValidationKind {
        match self {
            Self::FileNotFound => PackageValidationKind::FileNotFound,
            Self::TooLarge => PackageValidationKind::TooLarge,
            Self::NotZip => PackageValidationKind::NotZip,
            Self::Corrupt => PackageValidationKind::Corrupt,
            Self::MissingAppianDirs => PackageValidationKind::MissingAppianDirs,
            Self::NoXml => PackageValidationKind::NoXml,
        }
    }
}

/// Package reader errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling and map 1:1 onto
///   [`PackageValidationKind`].
#[derive(Debug, Error)]
#[error("{role} {kind}", kind = kind.to_validation_kind().description())]
pub struct PackageReadError {
    /// Which of the three packages failed.
    pub role: PackageRole,
    /// The specific validation failure.
    pub kind: PackageReadErrorKind,
}

impl From<PackageReadError> for MergeError {
    fn from(err: PackageReadError) -> Self {
        Self::PackageValidation {
            package: err.role,
            kind: err.kind.to_validation_kind(),
        }
    }
}

/// Opens an Appian package ZIP and enumerates its object XML entries
/// (spec §4.1).
pub trait PackageReader {
    /// Reads and validates the archive at `path`, returning every XML entry
    /// under a recognized type directory in deterministic order (sorted by
    /// directory then file name).
    ///
    /// # Errors
    ///
    /// Returns [`PackageReadError`] when the file is missing, too large, not
    /// a well-formed ZIP, corrupt, lacks recognized Appian directories, or
    /// contains no XML entries.
    fn read(
        &self,
        path: &std::path::Path,
        role: PackageRole,
        max_bytes: u64,
    ) -> Result<Vec<RawEntry>, PackageReadError>;
}

// ============================================================================
// SECTION: Object Parser
// ============================================================================

/// Decodes a single archive entry into a [`RawObjectRecord`] (spec §4.2).
///
/// Implementations never fail the whole package on a single malformed
/// object: on decode failure they return a record with
/// `object_type = Unknown`, the raw bytes preserved, and the caller logs one
/// warning. The package itself only fails if every entry degrades to
/// `Unknown` (see [`MergeError::ParseFailure`]).
pub trait ObjectParser {
    /// Decodes one entry.
    fn parse(&self, entry: &RawEntry) -> RawObjectRecord;
}

// ============================================================================
// SECTION: SAIL Formatter
// ============================================================================

/// Normalizes a scripted SAIL code string (spec §4.3): escape decoding,
/// reference rewriting via the session lookup, system-rule remapping, and
/// whitespace collapsing, in that order.
///
/// # Invariants
/// - Deterministic and idempotent: `format(format(s), lookup) ==
///   format(s, lookup)`.
pub trait SailFormatter {
    /// Formats `code`, resolving cross-references against `lookup`.
    fn format(&self, code: &str, lookup: &ObjectLookup) -> String;
}

// ============================================================================
// SECTION: Session Store
// ============================================================================

/// Session store errors (spec §7 `PersistenceFailure`, `PendingChanges`).
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("session store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("session store corruption: {0}")]
    Corrupt(String),
    /// Store schema version is incompatible.
    #[error("session store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store data is invalid.
    #[error("session store invalid data: {0}")]
    Invalid(String),
    /// Complete-session invoked with non-terminal changes remaining.
    #[error("{pending} change(s) still pending review")]
    PendingChanges {
        /// Count of non-terminal changes blocking completion.
        pending: u64,
    },
    /// Store reported an error not covered by the kinds above.
    #[error("session store error: {0}")]
    Store(String),
}

impl From<StoreError> for MergeError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::PendingChanges { pending } => Self::PendingChanges { pending },
            other => Self::PersistenceFailure(other.to_string()),
        }
    }
}

/// A fully assembled analysis ready for one atomic commit: everything the
/// Orchestrator produced for a session, persisted in a single transaction
/// (spec §4.11 "Persist packages, objects, versions, deltas, changes").
#[derive(Debug, Clone)]
pub struct AnalysisPayload {
    /// The three packages, in `[base, customized, new_vendor]` order.
    pub packages: Vec<crate::core::Package>,
    /// Every object version produced across the three packages.
    pub versions: Vec<crate::core::ObjectVersion>,
    /// Object registry rows newly observed in this session.
    pub new_objects: Vec<crate::core::ObjectRecord>,
    /// Vendor delta (set D) records.
    pub vendor_delta: Vec<crate::core::DeltaRecord>,
    /// Customer delta (set E) records.
    pub customer_delta: Vec<crate::core::DeltaRecord>,
    /// Classified, ordered changes.
    pub changes: Vec<crate::core::Change>,
}

/// Durable, transactional persistence for sessions and their analysis
/// payloads (spec §4.11).
pub trait SessionStore {
    /// Creates a new session, allocating the next reference id under the
    /// store's own atomicity guarantee (spec §5: concurrent creations yield
    /// distinct sequential ids).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the allocation or insert fails.
    fn create_session(&self) -> Result<Session, StoreError>;

    /// Commits a full analysis payload for `session_id` in one transaction,
    /// leaving the session `ready`. On any failure no partial analysis rows
    /// are left behind and the session is marked `failed` with `error`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the transaction fails.
    fn persist_analysis(
        &self,
        session_id: crate::core::SessionId,
        payload: AnalysisPayload,
    ) -> Result<(), StoreError>;

    /// Marks `session_id` as `failed`, recording `step` and `message`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the update fails.
    fn mark_failed(
        &self,
        session_id: crate::core::SessionId,
        step: &str,
        message: &str,
    ) -> Result<(), StoreError>;

    /// Recomputes and persists `reviewed_count`/`skipped_count` for
    /// `session_id` by grouping over the changes table (never by
    /// incrementing, per spec §4.11 / §9 "Drift in review counters").
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query or update fails.
    fn refresh_progress(&self, session_id: crate::core::SessionId) -> Result<(), StoreError>;

    /// Updates one change's review status and/or notes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the update fails.
    fn update_change_review(
        &self,
        change_id: crate::core::ChangeId,
        review_status: crate::core::ReviewStatus,
        notes: Option<&str>,
    ) -> Result<(), StoreError>;

    /// Transitions `session_id` from `in_progress` to `completed` iff every
    /// change with `order_index.is_some()` is terminal.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::PendingChanges`] when non-terminal changes
    /// remain, or another [`StoreError`] on failure.
    fn complete_session(&self, session_id: crate::core::SessionId) -> Result<(), StoreError>;

    /// Looks up a session by its human reference id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn get_by_reference(
        &self,
        reference_id: &crate::core::ReferenceId,
    ) -> Result<Option<Session>, StoreError>;

    /// Looks up a session by its numeric id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn get_session(
        &self,
        session_id: crate::core::SessionId,
    ) -> Result<Option<Session>, StoreError>;

    /// Lists all sessions, most recently created first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn list_sessions(&self) -> Result<Vec<Session>, StoreError>;

    /// Lists the ordered, classified changes for `session_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn list_changes(
        &self,
        session_id: crate::core::SessionId,
    ) -> Result<Vec<crate::core::Change>, StoreError>;

    /// Looks up or inserts an object registry row for `uuid`, updating the
    /// display name on re-sighting. Guarantees exactly one row per uuid even
    /// under concurrent callers (spec §9 "Shared object registry").
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the get-or-insert fails.
    fn get_or_insert_object(
        &self,
        uuid: &crate::core::ObjectUuid,
        display_name: &str,
        object_type: crate::core::ObjectType,
    ) -> Result<crate::core::ObjectRecord, StoreError>;

    /// Looks up a registry row by uuid without inserting (unlike
    /// [`SessionStore::get_or_insert_object`]); used by detail/diff display
    /// to resolve a change's object name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn get_object(
        &self,
        uuid: &crate::core::ObjectUuid,
    ) -> Result<Option<crate::core::ObjectRecord>, StoreError>;

    /// Returns every persisted version of `object_uuid` within `session_id`,
    /// keyed by package role, for on-demand change-detail and diff display
    /// (spec §6 "Change detail", §4.10).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn get_object_versions(
        &self,
        session_id: crate::core::SessionId,
        object_uuid: &crate::core::ObjectUuid,
    ) -> Result<
        std::collections::BTreeMap<crate::core::PackageRole, crate::core::ObjectVersion>,
        StoreError,
    >;

    /// Reports store readiness for liveness/readiness checks.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store is unavailable.
    fn readiness(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Progress Sink
// ============================================================================

/// One step of the Orchestrator's ten-step pipeline (spec §2, §4.12).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct StepProgress {
    /// 1-based index of the step that just completed.
    pub step_index: u32,
    /// Total number of steps in the pipeline.
    pub total_steps: u32,
    /// Elapsed wall-clock time for the step, in milliseconds.
    pub elapsed_ms: u64,
    /// A step-specific count (objects parsed, deltas found, changes
    /// classified, ...).
    pub count: u64,
}

/// Receives per-step progress events from the Orchestrator. The default
/// no-op implementation is used when no caller cares; `merge-cli` supplies a
/// `tracing`-backed one.
pub trait ProgressSink {
    /// Called once per completed pipeline step.
    fn on_step(&self, step_name: &str, progress: StepProgress);
}

/// A [`ProgressSink`] that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn on_step(&self, _step_name: &str, _progress: StepProgress) {}
}
