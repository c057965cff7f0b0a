// crates/merge-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Session Store
// Description: Transactional `SessionStore` implementation over `SQLite`.
// Purpose: Persist sessions, packages, object versions, deltas, and changes
//          with the durability and concurrency guarantees of spec.md §4.11,
//          §5.
// Dependencies: merge-core, rusqlite, serde_json
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use merge_core::AiSummaryState;
use merge_core::AnalysisPayload;
use merge_core::Change;
use merge_core::ChangeId;
use merge_core::DeltaRecord;
use merge_core::ObjectRecord;
use merge_core::ObjectType;
use merge_core::ObjectUuid;
use merge_core::ObjectVersion;
use merge_core::ObjectVersionId;
use merge_core::Package;
use merge_core::PackageId;
use merge_core::PackageRole;
use merge_core::ReferenceId;
use merge_core::ReviewStatus;
use merge_core::Session;
use merge_core::SessionId;
use merge_core::SessionStatus;
use merge_core::SessionStore;
use merge_core::StoreError;
use merge_core::Timestamp;
use merge_core::VersionUuid;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;
use rusqlite::params;

use crate::codec::classification_label;
use crate::codec::delta_kind_label;
use crate::codec::delta_table_name;
use crate::codec::object_type_label;
use crate::codec::package_role_label;
use crate::codec::parse_classification;
use crate::codec::parse_delta_kind;
use crate::codec::parse_object_type;
use crate::codec::parse_package_role;
use crate::codec::parse_review_status;
use crate::codec::parse_session_status;
use crate::codec::review_status_label;
use crate::codec::session_status_label;
use crate::error::SqliteStoreError;
use crate::schema::SqliteStoreConfig;
use crate::schema::ensure_parent_dir;
use crate::schema::initialize_schema;
use crate::schema::open_connection;
use crate::schema::validate_store_path;

/// `SQLite`-backed, WAL-journaled implementation of [`SessionStore`].
///
/// Every public operation acquires the shared connection mutex for the
/// duration of one transaction; two operations never interleave within the
/// same process (spec.md §5, "per-session write lock").
#[derive(Clone)]
pub struct SqliteSessionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteSessionStore {
    /// Opens (creating if absent) a session store at `config.path`,
    /// applying WAL pragmas and bringing the schema up to date.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the path is unsafe, the parent
    /// directory cannot be created, or the connection/schema cannot be
    /// initialized.
    pub fn open(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        Ok(Self { connection: Arc::new(Mutex::new(connection)) })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection.lock().map_err(|_| SqliteStoreError::Db("connection mutex poisoned".to_string()))
    }

    /// Marks `session_id` failed in its own short transaction, used after a
    /// `persist_analysis` transaction has already rolled back.
    fn fail_session(&self, session_id: SessionId, step: &str, message: &str) -> Result<(), SqliteStoreError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction()?;
        mark_failed_tx(&tx, session_id, step, message)?;
        tx.commit()?;
        Ok(())
    }
}

impl SessionStore for SqliteSessionStore {
    fn create_session(&self) -> Result<Session, StoreError> {
        self.create_session_inner().map_err(StoreError::from)
    }

    fn persist_analysis(&self, session_id: SessionId, payload: AnalysisPayload) -> Result<(), StoreError> {
        match self.persist_analysis_inner(session_id, &payload) {
            Ok(()) => Ok(()),
            Err(err) => {
                let message = err.to_string();
                self.fail_session(session_id, "persist_analysis", &message)?;
                Err(StoreError::from(err))
            }
        }
    }

    fn mark_failed(&self, session_id: SessionId, step: &str, message: &str) -> Result<(), StoreError> {
        self.fail_session(session_id, step, message).map_err(StoreError::from)
    }

    fn refresh_progress(&self, session_id: SessionId) -> Result<(), StoreError> {
        self.refresh_progress_inner(session_id).map_err(StoreError::from)
    }

    fn update_change_review(
        &self,
        change_id: ChangeId,
        review_status: ReviewStatus,
        notes: Option<&str>,
    ) -> Result<(), StoreError> {
        self.update_change_review_inner(change_id, review_status, notes).map_err(StoreError::from)
    }

    fn complete_session(&self, session_id: SessionId) -> Result<(), StoreError> {
        self.complete_session_inner(session_id).map_err(StoreError::from)
    }

    fn get_by_reference(&self, reference_id: &ReferenceId) -> Result<Option<Session>, StoreError> {
        self.get_by_reference_inner(reference_id).map_err(StoreError::from)
    }

    fn get_session(&self, session_id: SessionId) -> Result<Option<Session>, StoreError> {
        self.get_session_inner(session_id).map_err(StoreError::from)
    }

    fn list_sessions(&self) -> Result<Vec<Session>, StoreError> {
        self.list_sessions_inner().map_err(StoreError::from)
    }

    fn list_changes(&self, session_id: SessionId) -> Result<Vec<Change>, StoreError> {
        self.list_changes_inner(session_id).map_err(StoreError::from)
    }

    fn get_or_insert_object(
        &self,
        uuid: &ObjectUuid,
        display_name: &str,
        object_type: ObjectType,
    ) -> Result<ObjectRecord, StoreError> {
        self.get_or_insert_object_inner(uuid, display_name, object_type).map_err(StoreError::from)
    }

    fn get_object(&self, uuid: &ObjectUuid) -> Result<Option<ObjectRecord>, StoreError> {
        self.get_object_inner(uuid).map_err(StoreError::from)
    }

    fn get_object_versions(
        &self,
        session_id: SessionId,
        object_uuid: &ObjectUuid,
    ) -> Result<BTreeMap<PackageRole, ObjectVersion>, StoreError> {
        self.get_object_versions_inner(session_id, object_uuid).map_err(StoreError::from)
    }
}

impl SqliteSessionStore {
    fn create_session_inner(&self) -> Result<Session, SqliteStoreError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction()?;
        let last: Option<String> =
            tx.query_row("SELECT reference_id FROM sessions ORDER BY id DESC LIMIT 1", params![], |row| {
                row.get(0)
            }).optional()?;
        let reference_id = match last {
            Some(value) => ReferenceId::from(value).next(),
            None => ReferenceId::first(),
        };
        let now = Timestamp::now();
        tx.execute(
            "INSERT INTO sessions (reference_id, status, reviewed_count, skipped_count, \
             last_error, created_at, updated_at) VALUES (?1, ?2, 0, 0, NULL, ?3, ?4)",
            params![
                reference_id.as_str(),
                session_status_label(SessionStatus::Processing),
                now.as_millis(),
                now.as_millis()
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        Ok(Session::new(SessionId::new(id), reference_id, now))
    }

    fn persist_analysis_inner(
        &self,
        session_id: SessionId,
        payload: &AnalysisPayload,
    ) -> Result<(), SqliteStoreError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction()?;

        for package in &payload.packages {
            insert_package(&tx, package)?;
        }
        for object in &payload.new_objects {
            upsert_object(&tx, object)?;
        }
        for version in &payload.versions {
            insert_object_version(&tx, version)?;
        }
        for delta in &payload.vendor_delta {
            insert_delta(&tx, delta)?;
        }
        for delta in &payload.customer_delta {
            insert_delta(&tx, delta)?;
        }
        for change in &payload.changes {
            insert_change(&tx, session_id, change)?;
        }

        let now = Timestamp::now();
        let updated = tx.execute(
            "UPDATE sessions SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![session_status_label(SessionStatus::Ready), now.as_millis(), session_id.value()],
        )?;
        if updated == 0 {
            return Err(SqliteStoreError::Invalid(format!("no such session: {}", session_id.value())));
        }
        tx.commit()?;
        Ok(())
    }

    fn refresh_progress_inner(&self, session_id: SessionId) -> Result<(), SqliteStoreError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction()?;
        let mut reviewed: u64 = 0;
        let mut skipped: u64 = 0;
        {
            let mut statement = tx.prepare(
                "SELECT review_status, COUNT(*) FROM changes WHERE session_id = ?1 GROUP BY \
                 review_status",
            )?;
            let mut rows = statement.query(params![session_id.value()])?;
            while let Some(row) = rows.next()? {
                let status: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                let count = u64::try_from(count).unwrap_or(0);
                match parse_review_status(&status)? {
                    ReviewStatus::Reviewed => reviewed = count,
                    ReviewStatus::Skipped => skipped = count,
                    ReviewStatus::Pending => {}
                }
            }
        }
        let now = Timestamp::now();
        tx.execute(
            "UPDATE sessions SET reviewed_count = ?1, skipped_count = ?2, updated_at = ?3 WHERE \
             id = ?4",
            params![reviewed, skipped, now.as_millis(), session_id.value()],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn update_change_review_inner(
        &self,
        change_id: ChangeId,
        review_status: ReviewStatus,
        notes: Option<&str>,
    ) -> Result<(), SqliteStoreError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction()?;
        let session_id: Option<i64> = tx
            .query_row("SELECT session_id FROM changes WHERE id = ?1", params![change_id.value()], |row| {
                row.get(0)
            })
            .optional()?;
        let Some(session_id) = session_id else {
            return Err(SqliteStoreError::Invalid(format!("no such change: {}", change_id.value())));
        };
        tx.execute(
            "UPDATE changes SET review_status = ?1, notes = ?2 WHERE id = ?3",
            params![review_status_label(review_status), notes, change_id.value()],
        )?;
        let current_status: String =
            tx.query_row("SELECT status FROM sessions WHERE id = ?1", params![session_id], |row| {
                row.get(0)
            })?;
        if parse_session_status(&current_status)? != SessionStatus::InProgress {
            let now = Timestamp::now();
            tx.execute(
                "UPDATE sessions SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![session_status_label(SessionStatus::InProgress), now.as_millis(), session_id],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn complete_session_inner(&self, session_id: SessionId) -> Result<(), SqliteStoreError> {
        let mut guard = self.lock()?;
        let tx = guard.transaction()?;
        let pending: i64 = tx.query_row(
            "SELECT COUNT(*) FROM changes WHERE session_id = ?1 AND order_index IS NOT NULL AND \
             review_status NOT IN ('reviewed', 'skipped')",
            params![session_id.value()],
            |row| row.get(0),
        )?;
        if pending > 0 {
            return Err(SqliteStoreError::PendingChanges { pending: u64::try_from(pending).unwrap_or(0) });
        }
        let now = Timestamp::now();
        let updated = tx.execute(
            "UPDATE sessions SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![session_status_label(SessionStatus::Completed), now.as_millis(), session_id.value()],
        )?;
        if updated == 0 {
            return Err(SqliteStoreError::Invalid(format!("no such session: {}", session_id.value())));
        }
        tx.commit()?;
        Ok(())
    }

    fn get_by_reference_inner(&self, reference_id: &ReferenceId) -> Result<Option<Session>, SqliteStoreError> {
        let guard = self.lock()?;
        guard
            .query_row(
                "SELECT id, reference_id, status, reviewed_count, skipped_count, last_error, \
                 created_at, updated_at FROM sessions WHERE reference_id = ?1",
                params![reference_id.as_str()],
                row_to_session,
            )
            .optional()
            .map_err(SqliteStoreError::from)?
            .transpose()
    }

    fn get_session_inner(&self, session_id: SessionId) -> Result<Option<Session>, SqliteStoreError> {
        let guard = self.lock()?;
        guard
            .query_row(
                "SELECT id, reference_id, status, reviewed_count, skipped_count, last_error, \
                 created_at, updated_at FROM sessions WHERE id = ?1",
                params![session_id.value()],
                row_to_session,
            )
            .optional()
            .map_err(SqliteStoreError::from)?
            .transpose()
    }

    fn list_sessions_inner(&self) -> Result<Vec<Session>, SqliteStoreError> {
        let guard = self.lock()?;
        let mut statement = guard.prepare(
            "SELECT id, reference_id, status, reviewed_count, skipped_count, last_error, \
             created_at, updated_at FROM sessions ORDER BY created_at DESC, id DESC",
        )?;
        let rows = statement.query_map(params![], row_to_session)?;
        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row??);
        }
        Ok(sessions)
    }

    fn list_changes_inner(&self, session_id: SessionId) -> Result<Vec<Change>, SqliteStoreError> {
        let guard = self.lock()?;
        let mut statement = guard.prepare(
            "SELECT id, session_id, object_uuid, classification, vendor_kind, customer_kind, \
             review_status, notes, ai_summary, ai_summary_status, ai_summary_generated_at, \
             order_index FROM changes WHERE session_id = ?1 ORDER BY order_index ASC, id ASC",
        )?;
        let rows = statement.query_map(params![session_id.value()], row_to_change)?;
        let mut changes = Vec::new();
        for row in rows {
            changes.push(row??);
        }
        Ok(changes)
    }

    fn get_or_insert_object_inner(
        &self,
        uuid: &ObjectUuid,
        display_name: &str,
        object_type: ObjectType,
    ) -> Result<ObjectRecord, SqliteStoreError> {
        let guard = self.lock()?;
        guard.query_row(
            "INSERT INTO objects (uuid, display_name, object_type) VALUES (?1, ?2, ?3) ON \
             CONFLICT(uuid) DO UPDATE SET display_name = excluded.display_name RETURNING uuid, \
             display_name, object_type",
            params![uuid.as_str(), display_name, object_type_label(object_type)],
            row_to_object_record,
        )?
    }

    fn get_object_inner(&self, uuid: &ObjectUuid) -> Result<Option<ObjectRecord>, SqliteStoreError> {
        let guard = self.lock()?;
        guard
            .query_row(
                "SELECT uuid, display_name, object_type FROM objects WHERE uuid = ?1",
                params![uuid.as_str()],
                row_to_object_record,
            )
            .optional()?
            .transpose()
    }

    fn get_object_versions_inner(
        &self,
        session_id: SessionId,
        object_uuid: &ObjectUuid,
    ) -> Result<BTreeMap<PackageRole, ObjectVersion>, SqliteStoreError> {
        let guard = self.lock()?;
        let mut statement = guard.prepare(
            "SELECT v.id, v.object_uuid, v.package_id, v.version_uuid, v.scripted_code, \
             v.content_json, v.fingerprint, v.deprecated, p.role FROM object_versions v JOIN \
             packages p ON p.id = v.package_id WHERE p.session_id = ?1 AND v.object_uuid = ?2",
        )?;
        let rows =
            statement.query_map(params![session_id.value(), object_uuid.as_str()], row_to_object_version)?;
        let mut versions = BTreeMap::new();
        for row in rows {
            let (role, version) = row??;
            versions.insert(role, version);
        }
        Ok(versions)
    }
}

// ============================================================================
// SECTION: Row mapping and per-table inserts
// ============================================================================

fn row_to_session(row: &rusqlite::Row<'_>) -> rusqlite::Result<Result<Session, SqliteStoreError>> {
    let id: i64 = row.get(0)?;
    let reference_id: String = row.get(1)?;
    let status: String = row.get(2)?;
    let reviewed_count: i64 = row.get(3)?;
    let skipped_count: i64 = row.get(4)?;
    let last_error: Option<String> = row.get(5)?;
    let created_at: i64 = row.get(6)?;
    let updated_at: i64 = row.get(7)?;
    Ok(parse_session_status(&status).map(|status| Session {
        id: SessionId::new(id),
        reference_id: ReferenceId::from(reference_id),
        status,
        reviewed_count: u64::try_from(reviewed_count).unwrap_or(0),
        skipped_count: u64::try_from(skipped_count).unwrap_or(0),
        last_error,
        created_at: Timestamp::from_millis(created_at),
        updated_at: Timestamp::from_millis(updated_at),
    }))
}

fn row_to_object_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<Result<ObjectRecord, SqliteStoreError>> {
    let uuid: String = row.get(0)?;
    let display_name: String = row.get(1)?;
    let object_type: String = row.get(2)?;
    Ok(parse_object_type(&object_type).map(|object_type| ObjectRecord {
        uuid: ObjectUuid::new(uuid),
        display_name,
        object_type,
    }))
}

#[allow(clippy::type_complexity, reason = "rusqlite's row-mapping closures return a nested Result.")]
fn row_to_object_version(
    row: &rusqlite::Row<'_>,
) -> rusqlite::Result<Result<(PackageRole, ObjectVersion), SqliteStoreError>> {
    let id: i64 = row.get(0)?;
    let object_uuid: String = row.get(1)?;
    let package_id: i64 = row.get(2)?;
    let version_uuid: String = row.get(3)?;
    let scripted_code: Option<String> = row.get(4)?;
    let content_json: String = row.get(5)?;
    let fingerprint: String = row.get(6)?;
    let deprecated: i64 = row.get(7)?;
    let role: String = row.get(8)?;

    Ok((|| {
        let role = parse_package_role(&role)?;
        let content = serde_json::from_str(&content_json)
            .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        let version = ObjectVersion {
            id: ObjectVersionId::new(id),
            object_uuid: ObjectUuid::new(object_uuid),
            package_id: PackageId::new(package_id),
            version_uuid: VersionUuid::new(version_uuid),
            scripted_code,
            content,
            fingerprint: merge_core::ContentFingerprint { value: fingerprint },
            deprecated: deprecated != 0,
        };
        Ok((role, version))
    })())
}

#[allow(clippy::type_complexity, reason = "rusqlite's row-mapping closures return a nested Result.")]
fn row_to_change(row: &rusqlite::Row<'_>) -> rusqlite::Result<Result<Change, SqliteStoreError>> {
    let id: i64 = row.get(0)?;
    let session_id: i64 = row.get(1)?;
    let object_uuid: String = row.get(2)?;
    let classification: String = row.get(3)?;
    let vendor_kind: Option<String> = row.get(4)?;
    let customer_kind: Option<String> = row.get(5)?;
    let review_status: String = row.get(6)?;
    let notes: Option<String> = row.get(7)?;
    let ai_summary: Option<String> = row.get(8)?;
    let ai_summary_status: Option<String> = row.get(9)?;
    let ai_summary_generated_at: Option<i64> = row.get(10)?;
    let order_index: Option<i64> = row.get(11)?;

    Ok((|| {
        let classification = parse_classification(&classification)?;
        let vendor_kind = vendor_kind.as_deref().map(parse_delta_kind).transpose()?;
        let customer_kind = customer_kind.as_deref().map(parse_delta_kind).transpose()?;
        let review_status = parse_review_status(&review_status)?;
        Ok(Change {
            id: ChangeId::new(id),
            session_id: SessionId::new(session_id),
            object_uuid: ObjectUuid::new(object_uuid),
            classification,
            vendor_kind,
            customer_kind,
            review_status,
            notes,
            ai_summary: AiSummaryState {
                ai_summary,
                ai_summary_status,
                ai_summary_generated_at: ai_summary_generated_at.map(Timestamp::from_millis),
            },
            order_index: order_index.map(|value| u64::try_from(value).unwrap_or(0)),
        })
    })())
}

fn mark_failed_tx(
    tx: &Transaction<'_>,
    session_id: SessionId,
    step: &str,
    message: &str,
) -> Result<(), SqliteStoreError> {
    let now = Timestamp::now();
    let last_error = format!("{step}: {message}");
    let updated = tx.execute(
        "UPDATE sessions SET status = ?1, last_error = ?2, updated_at = ?3 WHERE id = ?4",
        params![session_status_label(SessionStatus::Failed), last_error, now.as_millis(), session_id.value()],
    )?;
    if updated == 0 {
        return Err(SqliteStoreError::Invalid(format!("no such session: {}", session_id.value())));
    }
    Ok(())
}

fn insert_package(tx: &Transaction<'_>, package: &Package) -> Result<(), SqliteStoreError> {
    tx.execute(
        "INSERT INTO packages (id, session_id, role, original_filename) VALUES (?1, ?2, ?3, ?4)",
        params![
            package.id.value(),
            package.session_id.value(),
            package_role_label(package.role),
            package.original_filename
        ],
    )?;
    Ok(())
}

fn upsert_object(tx: &Transaction<'_>, object: &ObjectRecord) -> Result<(), SqliteStoreError> {
    tx.execute(
        "INSERT INTO objects (uuid, display_name, object_type) VALUES (?1, ?2, ?3) ON \
         CONFLICT(uuid) DO UPDATE SET display_name = excluded.display_name",
        params![object.uuid.as_str(), object.display_name, object_type_label(object.object_type)],
    )?;
    Ok(())
}

fn insert_object_version(tx: &Transaction<'_>, version: &ObjectVersion) -> Result<(), SqliteStoreError> {
    let content_json = serde_json::to_string(&version.content)
        .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
    tx.execute(
        "INSERT INTO object_versions (id, object_uuid, package_id, version_uuid, scripted_code, \
         content_json, fingerprint, deprecated) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            version.id.value(),
            version.object_uuid.as_str(),
            version.package_id.value(),
            version.version_uuid.as_str(),
            version.scripted_code,
            content_json,
            version.fingerprint.value,
            i64::from(version.deprecated)
        ],
    )?;
    Ok(())
}

fn insert_delta(tx: &Transaction<'_>, delta: &DeltaRecord) -> Result<(), SqliteStoreError> {
    let table = delta_table_name(delta.set);
    tx.execute(
        &format!(
            "INSERT INTO {table} (session_id, object_uuid, kind, old_version_id, \
             new_version_id, summary) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
        ),
        params![
            delta.session_id.value(),
            delta.object_uuid.as_str(),
            delta_kind_label(delta.kind),
            delta.old_version_id.map(ObjectVersionId::value),
            delta.new_version_id.map(ObjectVersionId::value),
            delta.summary
        ],
    )?;
    Ok(())
}

fn insert_change(tx: &Transaction<'_>, session_id: SessionId, change: &Change) -> Result<(), SqliteStoreError> {
    tx.execute(
        "INSERT INTO changes (id, session_id, object_uuid, classification, vendor_kind, \
         customer_kind, review_status, notes, ai_summary, ai_summary_status, \
         ai_summary_generated_at, order_index) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, \
         ?11, ?12)",
        params![
            change.id.value(),
            session_id.value(),
            change.object_uuid.as_str(),
            classification_label(change.classification),
            change.vendor_kind.map(delta_kind_label),
            change.customer_kind.map(delta_kind_label),
            review_status_label(change.review_status),
            change.notes,
            change.ai_summary.ai_summary,
            change.ai_summary.ai_summary_status,
            change.ai_summary.ai_summary_generated_at.map(Timestamp::as_millis),
            change.order_index.map(|value| i64::try_from(value).unwrap_or(i64::MAX))
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use merge_core::Classification;
    use merge_core::DeltaKind;
    use merge_core::DeltaSet;
    use merge_core::PackageId;
    use merge_core::PackageRole;

    use super::*;

    fn open_temp_store() -> (tempfile::TempDir, SqliteSessionStore) {
        let dir = tempfile::tempdir().unwrap();
        let config = SqliteStoreConfig::new(dir.path().join("store.sqlite3"));
        let store = SqliteSessionStore::open(config).unwrap();
        (dir, store)
    }

    #[test]
    fn create_session_allocates_sequential_reference_ids() {
        let (_dir, store) = open_temp_store();
        let first = store.create_session().unwrap();
        let second = store.create_session().unwrap();
        assert_eq!(first.reference_id.as_str(), "MRG_001");
        assert_eq!(second.reference_id.as_str(), "MRG_002");
        assert_eq!(first.status, SessionStatus::Processing);
    }

    #[test]
    fn get_by_reference_finds_a_created_session() {
        let (_dir, store) = open_temp_store();
        let created = store.create_session().unwrap();
        let found = store.get_by_reference(&created.reference_id).unwrap();
        assert_eq!(found.map(|session| session.id), Some(created.id));
    }

    #[test]
    fn get_or_insert_object_is_idempotent_across_calls() {
        let (_dir, store) = open_temp_store();
        let uuid = ObjectUuid::new("_a-1");
        let first = store.get_or_insert_object(&uuid, "Original Name", ObjectType::ExpressionRule).unwrap();
        let second = store.get_or_insert_object(&uuid, "Renamed", ObjectType::ExpressionRule).unwrap();
        assert_eq!(first.uuid, second.uuid);
        assert_eq!(second.display_name, "Renamed");
    }

    #[test]
    fn get_object_returns_none_for_unseen_uuid() {
        let (_dir, store) = open_temp_store();
        assert!(store.get_object(&ObjectUuid::new("_a-nope")).unwrap().is_none());
    }

    #[test]
    fn get_object_versions_joins_by_session_and_package_role() {
        use merge_core::ContentFingerprint;
        use merge_core::ContentView;
        use merge_core::ObjectVersion;
        use merge_core::ObjectVersionId;
        use merge_core::VersionUuid;

        let (_dir, store) = open_temp_store();
        let session = store.create_session().unwrap();
        let uuid = ObjectUuid::new("_a-cons1");
        let package = Package {
            id: PackageId::new(1),
            session_id: session.id,
            role: PackageRole::Customized,
            original_filename: "customized.zip".to_string(),
        };
        let version = ObjectVersion {
            id: ObjectVersionId::new(1),
            object_uuid: uuid.clone(),
            package_id: package.id,
            version_uuid: VersionUuid::new("v1"),
            scripted_code: None,
            content: ContentView::Constant(merge_core::ConstantView {
                value: serde_json::Value::String("MANY_TO_ONEE".to_string()),
                data_type: "text".to_string(),
                scope: "APPLICATION".to_string(),
            }),
            fingerprint: ContentFingerprint { value: "abc".to_string() },
            deprecated: false,
        };
        let payload = AnalysisPayload {
            packages: vec![package],
            versions: vec![version],
            new_objects: vec![],
            vendor_delta: vec![],
            customer_delta: vec![],
            changes: vec![],
        };
        store.persist_analysis(session.id, payload).unwrap();

        let versions = store.get_object_versions(session.id, &uuid).unwrap();
        assert_eq!(versions.len(), 1);
        assert!(versions.contains_key(&PackageRole::Customized));
    }

    fn sample_change(session_id: SessionId, id: i64, order_index: Option<u64>, review_status: ReviewStatus) -> Change {
        Change {
            id: ChangeId::new(id),
            session_id,
            object_uuid: ObjectUuid::new(format!("_obj-{id}")),
            classification: Classification::Conflict,
            vendor_kind: Some(DeltaKind::Modified),
            customer_kind: Some(DeltaKind::Modified),
            review_status,
            notes: None,
            ai_summary: AiSummaryState::default(),
            order_index,
        }
    }

    #[test]
    fn persist_analysis_commits_all_tables_and_marks_session_ready() {
        let (_dir, store) = open_temp_store();
        let session = store.create_session().unwrap();
        let package = Package {
            id: PackageId::new(1),
            session_id: session.id,
            role: PackageRole::Base,
            original_filename: "base.zip".to_string(),
        };
        let change = sample_change(session.id, 1, Some(0), ReviewStatus::Pending);
        let payload = AnalysisPayload {
            packages: vec![package],
            versions: vec![],
            new_objects: vec![],
            vendor_delta: vec![],
            customer_delta: vec![],
            changes: vec![change],
        };
        store.persist_analysis(session.id, payload).unwrap();
        let reloaded = store.get_session(session.id).unwrap().unwrap();
        assert_eq!(reloaded.status, SessionStatus::Ready);
        assert_eq!(store.list_changes(session.id).unwrap().len(), 1);
    }

    #[test]
    fn complete_session_rejects_non_terminal_changes() {
        let (_dir, store) = open_temp_store();
        let session = store.create_session().unwrap();
        let change = sample_change(session.id, 1, Some(0), ReviewStatus::Pending);
        let payload = AnalysisPayload {
            packages: vec![],
            versions: vec![],
            new_objects: vec![],
            vendor_delta: vec![],
            customer_delta: vec![],
            changes: vec![change],
        };
        store.persist_analysis(session.id, payload).unwrap();
        let err = store.complete_session(session.id).unwrap_err();
        assert!(matches!(err, StoreError::PendingChanges { pending: 1 }));
    }

    #[test]
    fn complete_session_succeeds_once_every_queued_change_is_terminal() {
        let (_dir, store) = open_temp_store();
        let session = store.create_session().unwrap();
        let change = sample_change(session.id, 1, Some(0), ReviewStatus::Reviewed);
        let payload = AnalysisPayload {
            packages: vec![],
            versions: vec![],
            new_objects: vec![],
            vendor_delta: vec![],
            customer_delta: vec![],
            changes: vec![change],
        };
        store.persist_analysis(session.id, payload).unwrap();
        store.complete_session(session.id).unwrap();
        let reloaded = store.get_session(session.id).unwrap().unwrap();
        assert_eq!(reloaded.status, SessionStatus::Completed);
    }

    #[test]
    fn refresh_progress_recomputes_from_counts_not_increments() {
        let (_dir, store) = open_temp_store();
        let session = store.create_session().unwrap();
        let changes = vec![
            sample_change(session.id, 1, Some(0), ReviewStatus::Reviewed),
            sample_change(session.id, 2, Some(1), ReviewStatus::Skipped),
            sample_change(session.id, 3, Some(2), ReviewStatus::Pending),
        ];
        let payload = AnalysisPayload {
            packages: vec![],
            versions: vec![],
            new_objects: vec![],
            vendor_delta: vec![],
            customer_delta: vec![],
            changes,
        };
        store.persist_analysis(session.id, payload).unwrap();
        store.refresh_progress(session.id).unwrap();
        let reloaded = store.get_session(session.id).unwrap().unwrap();
        assert_eq!(reloaded.reviewed_count, 1);
        assert_eq!(reloaded.skipped_count, 1);
    }

    #[test]
    fn update_change_review_moves_session_to_in_progress() {
        let (_dir, store) = open_temp_store();
        let session = store.create_session().unwrap();
        let change = sample_change(session.id, 1, Some(0), ReviewStatus::Pending);
        let change_id = change.id;
        let payload = AnalysisPayload {
            packages: vec![],
            versions: vec![],
            new_objects: vec![],
            vendor_delta: vec![],
            customer_delta: vec![],
            changes: vec![change],
        };
        store.persist_analysis(session.id, payload).unwrap();
        store.update_change_review(change_id, ReviewStatus::Reviewed, Some("looks fine")).unwrap();
        let reloaded = store.get_session(session.id).unwrap().unwrap();
        assert_eq!(reloaded.status, SessionStatus::InProgress);
        let changes = store.list_changes(session.id).unwrap();
        assert_eq!(changes[0].review_status, ReviewStatus::Reviewed);
        assert_eq!(changes[0].notes.as_deref(), Some("looks fine"));
    }

    #[test]
    fn vendor_and_customer_delta_rows_persist_to_distinct_tables() {
        let (_dir, store) = open_temp_store();
        let session = store.create_session().unwrap();
        let vendor = DeltaRecord {
            session_id: session.id,
            set: DeltaSet::Vendor,
            object_uuid: ObjectUuid::new("_a-1"),
            kind: DeltaKind::New,
            old_version_id: None,
            new_version_id: Some(ObjectVersionId::new(1)),
            summary: "object added".to_string(),
        };
        let customer = DeltaRecord {
            session_id: session.id,
            set: DeltaSet::Customer,
            object_uuid: ObjectUuid::new("_a-1"),
            kind: DeltaKind::Removed,
            old_version_id: Some(ObjectVersionId::new(2)),
            new_version_id: None,
            summary: "object removed".to_string(),
        };
        let payload = AnalysisPayload {
            packages: vec![],
            versions: vec![],
            new_objects: vec![],
            vendor_delta: vec![vendor],
            customer_delta: vec![customer],
            changes: vec![],
        };
        store.persist_analysis(session.id, payload).unwrap();
        let guard = store.lock().unwrap();
        let vendor_count: i64 =
            guard.query_row("SELECT COUNT(*) FROM vendor_delta WHERE session_id = ?1", params![session.id.value()], |row| row.get(0)).unwrap();
        let customer_count: i64 =
            guard.query_row("SELECT COUNT(*) FROM customer_delta WHERE session_id = ?1", params![session.id.value()], |row| row.get(0)).unwrap();
        assert_eq!(vendor_count, 1);
        assert_eq!(customer_count, 1);
    }
}
