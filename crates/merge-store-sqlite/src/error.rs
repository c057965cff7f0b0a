// crates/merge-store-sqlite/src/error.rs
// ============================================================================
// Module: SQLite Store Error Taxonomy
// Description: Crate-local error kind, converted to `merge_core::StoreError`
//              at the `SessionStore` trait boundary.
// Purpose: Keep `rusqlite`/path/serialization failures out of the core crate
//          while still surfacing a stable kind to callers.
// Dependencies: rusqlite, thiserror, merge-core
// ============================================================================

use merge_core::StoreError;
use thiserror::Error;

/// Errors raised by the `SQLite`-backed session store.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Filesystem or connection-opening failure.
    #[error("session store io error: {0}")]
    Io(String),
    /// Store data failed an integrity or consistency check.
    #[error("session store corruption: {0}")]
    Corrupt(String),
    /// The on-disk schema version is not one this build understands.
    #[error("session store version mismatch: {0}")]
    VersionMismatch(String),
    /// A value read from or written to the store failed validation.
    #[error("session store invalid data: {0}")]
    Invalid(String),
    /// `complete_session` was called with non-terminal changes remaining.
    #[error("{pending} change(s) still pending review")]
    PendingChanges {
        /// Count of non-terminal changes blocking completion.
        pending: u64,
    },
    /// Any `rusqlite` engine failure not covered by the kinds above.
    #[error("session store db error: {0}")]
    Db(String),
}

impl From<rusqlite::Error> for SqliteStoreError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Db(err.to_string())
    }
}

impl From<SqliteStoreError> for StoreError {
    fn from(err: SqliteStoreError) -> Self {
        match err {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::PendingChanges { pending } => Self::PendingChanges { pending },
            SqliteStoreError::Db(message) => Self::Store(message),
        }
    }
}
