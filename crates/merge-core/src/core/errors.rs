// crates/merge-core/src/core/errors.rs
// ============================================================================
// Module: Merge Core Error Taxonomy
// Description: The stable error kinds crossing every core boundary (spec §7).
// Purpose: Give every failure a stable kind and a human-readable message that
//          identifies the offending package where applicable.
// Dependencies: thiserror, crate::core
// ============================================================================

use thiserror::Error;

use crate::core::package::PackageRole;

/// Sub-kinds of [`MergeError::PackageValidation`] (spec §4.1, §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageValidationKind {
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

impl PackageValidationKind {
    /// A short, stable description of the validation failure.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::FileNotFound => "file not found",
            Self::TooLarge => "exceeds the maximum package size",
            Self::NotZip => "is not a well-formed ZIP archive",
            Self::Corrupt => "has a corrupt ZIP directory or entry",
            Self::MissingAppianDirs => "has no recognized Appian type directories",
            Self::NoXml => "contains no XML object entries",
        }
    }
}

/// Stable error kinds crossing the merge core's boundaries (spec §7).
#[derive(Debug, Error)]
pub enum MergeError {
    /// One of the three input files failed validation. Fatal for the owning
    /// package (spec §4.1: "No partial packages").
    #[error("{package} {kind}", kind = kind.description())]
    PackageValidation {
        /// Which of the three packages failed.
        package: PackageRole,
        /// The specific validation failure.
        kind: PackageValidationKind,
    },
    /// An entire package yielded no parseable objects. Individual
    /// per-object parse failures are recovered locally and never reach this
    /// variant (spec §4.2, §7).
    #[error("{package} produced no parseable objects")]
    ParseFailure {
        /// Which of the three packages failed.
        package: PackageRole,
    },
    /// The store transaction failed; fatal for the session.
    #[error("persistence failure: {0}")]
    PersistenceFailure(String),
    /// The dependency graph contained a cycle. Non-fatal: the cycle is
    /// broken deterministically and analysis continues (spec §4.8, §7).
    #[error("dependency cycle broken between {from} and {to}")]
    DependencyCycle {
        /// One endpoint of the removed edge.
        from: String,
        /// The other endpoint of the removed edge.
        to: String,
    },
    /// Complete-session was invoked while changes remain non-terminal.
    #[error("{pending} change(s) still pending review")]
    PendingChanges {
        /// Count of non-terminal changes blocking completion.
        pending: u64,
    },
    /// Cooperative cancellation or a per-step timeout fired.
    #[error("analysis cancelled: {reason}")]
    Cancelled {
        /// Human-readable cancellation reason (e.g. "step timeout: compare_vendor_delta").
        reason: String,
    },
    /// Any unexpected failure not covered by the kinds above.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MergeError {
    /// Returns the package role associated with this error, if any.
    #[must_use]
    pub const fn package(&self) -> Option<PackageRole> {
        match self {
            Self::PackageValidation { package, .. } | Self::ParseFailure { package } => {
                Some(*package)
            }
            _ => None,
        }
    }
}
