// crates/merge-store-sqlite/src/schema.rs
// ============================================================================
// Module: SQLite Schema Bootstrap
// Description: Path safety checks, pragma application, and schema creation.
// Purpose: Open a durable, WAL-journaled connection and bring its schema up
//          to date in one transaction (spec.md §4.11, §5).
// Dependencies: rusqlite
// ============================================================================

use std::path::Path;
use std::path::PathBuf;

use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;

use crate::error::SqliteStoreError;

/// `SQLite` schema version for this store. Bumped whenever the table layout
/// changes in a way existing databases cannot absorb via `ALTER TABLE`.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout applied to every connection (milliseconds).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component accepted for a store file.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total store path length accepted.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

/// Configuration for the `SQLite`-backed session store.
#[derive(Debug, Clone)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds applied to the connection.
    pub busy_timeout_ms: u64,
}

impl SqliteStoreConfig {
    /// Builds a config pointing at `path` with the default busy timeout.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS }
    }
}

/// Ensures the parent directory for the store file exists.
pub fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates a store path against basic safety limits before opening it.
pub fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with WAL journaling and durable pragmas.
pub fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies the pragmas required for WAL durability and lock behavior.
fn apply_pragmas(connection: &Connection, config: &SqliteStoreConfig) -> Result<(), SqliteStoreError> {
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;
    connection.execute_batch("PRAGMA journal_mode = WAL;")?;
    connection.execute_batch("PRAGMA synchronous = FULL;")?;
    connection.busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))?;
    Ok(())
}

/// Creates the schema if absent, or validates the existing version.
pub fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction()?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS sessions (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    reference_id TEXT NOT NULL UNIQUE,
                    status TEXT NOT NULL,
                    reviewed_count INTEGER NOT NULL,
                    skipped_count INTEGER NOT NULL,
                    last_error TEXT,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS packages (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    session_id INTEGER NOT NULL,
                    role TEXT NOT NULL,
                    original_filename TEXT NOT NULL,
                    FOREIGN KEY (session_id) REFERENCES sessions(id) ON DELETE CASCADE
                );
                CREATE TABLE IF NOT EXISTS objects (
                    uuid TEXT PRIMARY KEY,
                    display_name TEXT NOT NULL,
                    object_type TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS object_versions (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    object_uuid TEXT NOT NULL,
                    package_id INTEGER NOT NULL,
                    version_uuid TEXT NOT NULL,
                    scripted_code TEXT,
                    content_json TEXT NOT NULL,
                    fingerprint TEXT NOT NULL,
                    deprecated INTEGER NOT NULL,
                    UNIQUE (object_uuid, package_id),
                    FOREIGN KEY (object_uuid) REFERENCES objects(uuid),
                    FOREIGN KEY (package_id) REFERENCES packages(id) ON DELETE CASCADE
                );
                CREATE INDEX IF NOT EXISTS idx_object_versions_package
                    ON object_versions (package_id);
                CREATE TABLE IF NOT EXISTS vendor_delta (
                    session_id INTEGER NOT NULL,
                    object_uuid TEXT NOT NULL,
                    kind TEXT NOT NULL,
                    old_version_id INTEGER,
                    new_version_id INTEGER,
                    summary TEXT NOT NULL,
                    FOREIGN KEY (session_id) REFERENCES sessions(id) ON DELETE CASCADE
                );
                CREATE TABLE IF NOT EXISTS customer_delta (
                    session_id INTEGER NOT NULL,
                    object_uuid TEXT NOT NULL,
                    kind TEXT NOT NULL,
                    old_version_id INTEGER,
                    new_version_id INTEGER,
                    summary TEXT NOT NULL,
                    FOREIGN KEY (session_id) REFERENCES sessions(id) ON DELETE CASCADE
                );
                CREATE INDEX IF NOT EXISTS idx_vendor_delta_session ON vendor_delta (session_id);
                CREATE INDEX IF NOT EXISTS idx_customer_delta_session
                    ON customer_delta (session_id);
                CREATE TABLE IF NOT EXISTS changes (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    session_id INTEGER NOT NULL,
                    object_uuid TEXT NOT NULL,
                    classification TEXT NOT NULL,
                    vendor_kind TEXT,
                    customer_kind TEXT,
                    review_status TEXT NOT NULL,
                    notes TEXT,
                    ai_summary TEXT,
                    ai_summary_status TEXT,
                    ai_summary_generated_at INTEGER,
                    order_index INTEGER,
                    UNIQUE (session_id, object_uuid),
                    FOREIGN KEY (session_id) REFERENCES sessions(id) ON DELETE CASCADE
                );
                CREATE INDEX IF NOT EXISTS idx_changes_session ON changes (session_id);",
            )?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_a_directory_as_a_store_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(validate_store_path(dir.path()).is_err());
    }

    #[test]
    fn opens_and_initializes_a_fresh_database() {
        let dir = tempfile::tempdir().unwrap();
        let config = SqliteStoreConfig::new(dir.path().join("store.sqlite3"));
        ensure_parent_dir(&config.path).unwrap();
        let mut connection = open_connection(&config).unwrap();
        initialize_schema(&mut connection).unwrap();
        let version: i64 = connection
            .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn reopening_an_initialized_database_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let config = SqliteStoreConfig::new(dir.path().join("store.sqlite3"));
        ensure_parent_dir(&config.path).unwrap();
        let mut first = open_connection(&config).unwrap();
        initialize_schema(&mut first).unwrap();
        drop(first);
        let mut second = open_connection(&config).unwrap();
        initialize_schema(&mut second).unwrap();
    }
}
