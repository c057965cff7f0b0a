// crates/merge-core/src/runtime/orchestrator.rs
// ============================================================================
// Module: Orchestrator
// Description: Drives the ten-step analysis pipeline end to end (spec §2,
//              §4.12).
// Purpose: The single canonical execution path from three package paths to
//          a persisted, ordered review queue.
// Dependencies: crate::core, crate::interfaces, crate::runtime
// ============================================================================

//! ## Overview
//! Generic over the four trait interfaces (teacher's `ControlPlane<P, D, S,
//! Pol>` pattern) so callers wire any concrete reader, parser, formatter, and
//! store. Steps 2–4 (read and parse the three packages) and steps 6–7 (the
//! two symmetric deltas) run concurrently via `std::thread::scope`; every
//! other step is sequential. Progress and cancellation are checked at every
//! stage boundary, never mid-step.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;
use std::time::Instant;

use crate::core::Change;
use crate::core::ContentView;
use crate::core::DeltaRecord;
use crate::core::DeltaSet;
use crate::core::MergeError;
use crate::core::ObjectLookup;
use crate::core::ObjectRecord;
use crate::core::ObjectType;
use crate::core::ObjectUuid;
use crate::core::ObjectVersion;
use crate::core::ObjectVersionId;
use crate::core::Package;
use crate::core::PackageId;
use crate::core::PackageRole;
use crate::core::RawObjectRecord;
use crate::core::Session;
use crate::interfaces::AnalysisPayload;
use crate::interfaces::ObjectParser;
use crate::interfaces::PackageReader;
use crate::interfaces::ProgressSink;
use crate::interfaces::SailFormatter;
use crate::interfaces::SessionStore;
use crate::interfaces::StepProgress;
use crate::runtime::canonical;
use crate::runtime::classifier;
use crate::runtime::delta;
use crate::runtime::deps::DependencyGraph;
use crate::runtime::ordering;

/// Total number of pipeline steps (spec §2, §4.12).
const TOTAL_STEPS: u32 = 10;

/// Default per-step wall-clock timeout (spec §5 "default 5 minutes per step").
const DEFAULT_STEP_TIMEOUT: Duration = Duration::from_secs(300);

/// Default maximum package size, 100 MiB (spec §6).
const DEFAULT_MAX_PACKAGE_BYTES: u64 = 100 * 1024 * 1024;

// ============================================================================
// SECTION: Cancellation
// ============================================================================

/// Cooperative cancellation flag, checked at stage boundaries only (spec §5
/// "suspension and blocking", "an in-flight analysis may be cancelled at
/// stage boundaries only"). Cloning shares the same underlying flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// Creates a new, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Requests cancellation. Observed by the orchestrator after the
    /// in-flight step completes.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Orchestrator tuning knobs (spec §6 "Configuration").
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorConfig {
    /// Maximum accepted size, in bytes, for any one input package.
    pub max_package_bytes: u64,
    /// Wall-clock budget per pipeline step.
    pub step_timeout: Duration,
    /// Context lines surrounding each text-diff hunk.
    pub diff_context_lines: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_package_bytes: DEFAULT_MAX_PACKAGE_BYTES,
            step_timeout: DEFAULT_STEP_TIMEOUT,
            diff_context_lines: 3,
        }
    }
}

/// One of the three input packages as handed to the orchestrator.
#[derive(Debug, Clone)]
pub struct PackageInput {
    /// Which of the three roles this input fills.
    pub role: PackageRole,
    /// Filesystem path to the package ZIP.
    pub path: PathBuf,
    /// Original uploaded filename, preserved for display.
    pub original_filename: String,
}

struct ParsedPackage {
    role: PackageRole,
    original_filename: String,
    records: Vec<RawObjectRecord>,
}

// ============================================================================
// SECTION: Orchestrator
// ============================================================================

/// Drives the ten-step analysis pipeline (spec §2, §4.12). Generic over the
/// `PackageReader`, `ObjectParser`, `SailFormatter`, and `SessionStore`
/// interfaces so the pure pipeline logic never depends on a concrete ZIP
/// library, XML decoder, or database.
pub struct Orchestrator<R, P, F, S> {
    reader: R,
    parser: P,
    formatter: F,
    store: S,
    config: OrchestratorConfig,
}

impl<R, P, F, S> Orchestrator<R, P, F, S>
where
    R: PackageReader,
    P: ObjectParser,
    F: SailFormatter,
    S: SessionStore,
{
    /// Builds a new orchestrator over the given interface implementations.
    #[must_use]
    pub fn new(reader: R, parser: P, formatter: F, store: S, config: OrchestratorConfig) -> Self {
        Self { reader, parser, formatter, store, config }
    }

    /// Gives callers read access to the underlying store, e.g. to inspect
    /// persisted rows after `run_analysis` returns.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs one full analysis: creates a session, ingests `inputs`, and
    /// persists the classified, ordered review queue (spec §2, §4.12).
    ///
    /// Retrying a failed session is not supported; on failure the caller
    /// must start a new one (spec §4.12 "Idempotence").
    ///
    /// # Errors
    ///
    /// Returns [`MergeError`] when any step fails. The session is first
    /// marked `failed` with the offending step name and message; no partial
    /// analysis rows are left behind.
    pub fn run_analysis(
        &self,
        inputs: [PackageInput; 3],
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<Session, MergeError> {
        let session = self.store.create_session()?;

        match self.run_pipeline(&session, inputs, progress, cancel) {
            Ok(()) => self
                .store
                .get_session(session.id)?
                .ok_or_else(|| MergeError::Internal("session vanished after persist".to_string())),
            Err((step, err)) => {
                let _ = self.store.mark_failed(session.id, &step, &err.to_string());
                Err(err)
            }
        }
    }

    #[allow(
        clippy::too_many_lines,
        reason = "Single linear pipeline keeps the ten-step order auditable in one place."
    )]
    fn run_pipeline(
        &self,
        session: &Session,
        inputs: [PackageInput; 3],
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<(), (String, MergeError)> {
        // Steps 2-3: read and parse the three packages in parallel.
        let step_start = Instant::now();
        let parsed = self.read_and_parse_all(&inputs).map_err(step("read_parse_packages"))?;
        let objects_parsed: u64 = parsed.iter().map(|p| p.records.len() as u64).sum();
        self.emit_step(progress, "read_parse_packages", 2, objects_parsed, step_start);
        self.boundary_check(step_start, cancel, "read_parse_packages")?;

        // Step 4: populate the cross-package object lookup sequentially,
        // respecting the store's exclusive registry writer (spec §5).
        let step_start = Instant::now();
        let mut lookup = ObjectLookup::new();
        for pkg in &parsed {
            for record in &pkg.records {
                let object = self
                    .store
                    .get_or_insert_object(&record.uuid, &record.display_name, record.object_type)
                    .map_err(step("populate_lookup"))?;
                lookup.insert(object);
            }
        }
        self.emit_step(progress, "populate_lookup", 4, lookup.len() as u64, step_start);
        self.boundary_check(step_start, cancel, "populate_lookup")?;

        // Step 5: format SAIL code across the session, canonicalize, and
        // fingerprint every object version.
        let step_start = Instant::now();
        let mut packages = Vec::with_capacity(parsed.len());
        let mut base_versions: BTreeMap<ObjectUuid, ObjectVersion> = BTreeMap::new();
        let mut customized_versions: BTreeMap<ObjectUuid, ObjectVersion> = BTreeMap::new();
        let mut new_vendor_versions: BTreeMap<ObjectUuid, ObjectVersion> = BTreeMap::new();
        let mut all_versions = Vec::new();
        let mut new_objects = Vec::new();
        let mut seen_uuids: BTreeSet<ObjectUuid> = BTreeSet::new();

        for pkg in &parsed {
            let package = Package {
                id: PackageId::new(0),
                session_id: session.id,
                role: pkg.role,
                original_filename: pkg.original_filename.clone(),
            };
            let target = match pkg.role {
                PackageRole::Base => &mut base_versions,
                PackageRole::Customized => &mut customized_versions,
                PackageRole::NewVendor => &mut new_vendor_versions,
            };
            for record in &pkg.records {
                let formatted =
                    record.scripted_code.as_ref().map(|code| self.formatter.format(code, &lookup));
                let (content, fingerprint) = canonical::canonicalize(record, formatted.clone())
                    .map_err(|e| (String::from("format_and_canonicalize"), MergeError::Internal(e.to_string())))?;
                let version = ObjectVersion {
                    id: ObjectVersionId::new(0),
                    object_uuid: record.uuid.clone(),
                    package_id: package.id,
                    version_uuid: record.version_uuid.clone(),
                    scripted_code: formatted,
                    content,
                    fingerprint,
                    deprecated: record.deprecated,
                };
                if seen_uuids.insert(record.uuid.clone()) {
                    new_objects.push(ObjectRecord {
                        uuid: record.uuid.clone(),
                        display_name: record.display_name.clone(),
                        object_type: record.object_type,
                    });
                }
                target.insert(record.uuid.clone(), version.clone());
                all_versions.push(version);
            }
            packages.push(package);
        }
        self.emit_step(progress, "format_and_canonicalize", 5, all_versions.len() as u64, step_start);
        self.boundary_check(step_start, cancel, "format_and_canonicalize")?;

        // Steps 6-7: the two symmetric deltas run concurrently.
        let step_start = Instant::now();
        let (vendor_delta, customer_delta) = std::thread::scope(|scope| {
            let vendor_handle = scope.spawn(|| {
                delta::compute_delta(
                    session.id,
                    DeltaSet::Vendor,
                    &base_versions,
                    &new_vendor_versions,
                    &lookup,
                )
            });
            let customer_delta = delta::compute_delta(
                session.id,
                DeltaSet::Customer,
                &base_versions,
                &customized_versions,
                &lookup,
            );
            let vendor_delta = vendor_handle
                .join()
                .map_err(|_| (String::from("compare_vendor_delta"), panicked("compare_vendor_delta")));
            (vendor_delta, customer_delta)
        });
        let vendor_delta = vendor_delta?;
        self.emit_step(
            progress,
            "compare_deltas",
            7,
            vendor_delta.len() as u64 + customer_delta.len() as u64,
            step_start,
        );
        self.boundary_check(step_start, cancel, "compare_deltas")?;

        // Step 8: classify D ∪ E via the ordered rule table.
        let step_start = Instant::now();
        let vendor_map: BTreeMap<ObjectUuid, DeltaRecord> =
            vendor_delta.into_iter().map(|r| (r.object_uuid.clone(), r)).collect();
        let customer_map: BTreeMap<ObjectUuid, DeltaRecord> =
            customer_delta.into_iter().map(|r| (r.object_uuid.clone(), r)).collect();
        let changes: Vec<Change> = classifier::classify(
            session.id,
            &vendor_map,
            &customer_map,
            &customized_versions,
            &new_vendor_versions,
        );
        self.emit_step(progress, "classify", 8, changes.len() as u64, step_start);
        self.boundary_check(step_start, cancel, "classify")?;

        // Step 9: resolve dependency edges and assign the final review order.
        let step_start = Instant::now();
        let texts = flatten_texts(&all_versions);
        let graph = DependencyGraph::build(&texts, &lookup);
        let (ordered_changes, cycle_warnings) = ordering::order_changes(changes, &lookup, &graph);
        for warning in &cycle_warnings {
            tracing::warn!(warning = %warning, "dependency cycle broken during review ordering");
        }
        self.emit_step(progress, "order_changes", 9, ordered_changes.len() as u64, step_start);
        self.boundary_check(step_start, cancel, "order_changes")?;

        // Step 10: persist the full analysis in one transaction.
        let step_start = Instant::now();
        let change_count = ordered_changes.len() as u64;
        let payload = AnalysisPayload {
            packages,
            versions: all_versions,
            new_objects,
            vendor_delta: vendor_map.into_values().collect(),
            customer_delta: customer_map.into_values().collect(),
            changes: ordered_changes,
        };
        self.store.persist_analysis(session.id, payload).map_err(step("persist"))?;
        self.emit_step(progress, "persist", 10, change_count, step_start);

        Ok(())
    }

    fn read_and_parse_all(&self, inputs: &[PackageInput; 3]) -> Result<Vec<ParsedPackage>, MergeError> {
        std::thread::scope(|scope| {
            let handles: Vec<_> =
                inputs.iter().map(|input| scope.spawn(|| self.read_and_parse_one(input))).collect();
            handles
                .into_iter()
                .map(|handle| -> Result<ParsedPackage, MergeError> {
                    handle.join().map_err(|_| panicked("read_parse_packages"))?
                })
                .collect()
        })
    }

    fn read_and_parse_one(&self, input: &PackageInput) -> Result<ParsedPackage, MergeError> {
        let entries = self.reader.read(&input.path, input.role, self.config.max_package_bytes)?;
        let records: Vec<RawObjectRecord> = entries.iter().map(|entry| self.parser.parse(entry)).collect();
        if !entries.is_empty() && records.iter().all(|r| r.object_type == ObjectType::Unknown) {
            return Err(MergeError::ParseFailure { package: input.role });
        }
        Ok(ParsedPackage { role: input.role, original_filename: input.original_filename.clone(), records })
    }

    fn boundary_check(
        &self,
        step_start: Instant,
        cancel: &CancellationToken,
        step_name: &str,
    ) -> Result<(), (String, MergeError)> {
        if cancel.is_cancelled() {
            return Err((
                step_name.to_string(),
                MergeError::Cancelled { reason: format!("cancelled after step: {step_name}") },
            ));
        }
        if step_start.elapsed() > self.config.step_timeout {
            return Err((
                step_name.to_string(),
                MergeError::Cancelled { reason: format!("step timeout: {step_name}") },
            ));
        }
        Ok(())
    }

    fn emit_step(
        &self,
        progress: &dyn ProgressSink,
        step_name: &str,
        step_index: u32,
        count: u64,
        step_start: Instant,
    ) {
        let elapsed_ms = u64::try_from(step_start.elapsed().as_millis()).unwrap_or(u64::MAX);
        tracing::info!(
            step = step_name,
            step_index,
            total_steps = TOTAL_STEPS,
            elapsed_ms,
            count,
            "orchestrator step complete"
        );
        progress.on_step(
            step_name,
            StepProgress { step_index, total_steps: TOTAL_STEPS, elapsed_ms, count },
        );
    }
}

fn step<'a, E: Into<MergeError>>(name: &'a str) -> impl FnOnce(E) -> (String, MergeError) + 'a {
    move |err| (name.to_string(), err.into())
}

fn panicked(step_name: &str) -> MergeError {
    MergeError::Internal(format!("step '{step_name}' panicked"))
}

/// Flattens every object version's scripted code and serialized structured
/// content into one text blob per uuid, the Dependency Analyzer's scan
/// surface (spec §4.8).
fn flatten_texts(versions: &[ObjectVersion]) -> BTreeMap<ObjectUuid, String> {
    let mut texts: BTreeMap<ObjectUuid, String> = BTreeMap::new();
    for version in versions {
        let entry = texts.entry(version.object_uuid.clone()).or_default();
        if let Some(code) = &version.scripted_code {
            entry.push_str(code);
            entry.push('\n');
        }
        if !matches!(version.content, ContentView::Unknown(_)) {
            if let Ok(json) = serde_json::to_string(&version.content) {
                entry.push_str(&json);
            }
        }
    }
    texts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ConstantView;
    use crate::core::ObjectType;
    use crate::core::PackageValidationKind;
    use crate::core::ReferenceId;
    use crate::core::ReviewStatus;
    use crate::core::SessionId;
    use crate::core::SessionStatus;
    use crate::core::Timestamp;
    use crate::core::VersionUuid;
    use crate::interfaces::AnalysisPayload;
    use crate::interfaces::NullProgressSink;
    use crate::interfaces::PackageReadError;
    use crate::interfaces::RawEntry;
    use crate::interfaces::StoreError;
    use std::cell::RefCell;
    use std::sync::Mutex;

    struct FakeReader;
    impl PackageReader for FakeReader {
        fn read(
            &self,
            path: &std::path::Path,
            role: PackageRole,
            _max_bytes: u64,
        ) -> Result<Vec<RawEntry>, PackageReadError> {
            let name = path.to_string_lossy();
            if name.contains("missing") {
                return Err(PackageReadError { role, kind: crate::interfaces::PackageReadErrorKind::FileNotFound });
            }
            Ok(vec![RawEntry {
                object_type: ObjectType::Constant,
                file_name: format!("{role:?}.xml"),
                xml: format!("<constant uuid=\"_a-{role:?}\"/>").into_bytes(),
            }])
        }
    }

    struct FakeParser;
    impl ObjectParser for FakeParser {
        fn parse(&self, entry: &RawEntry) -> RawObjectRecord {
            let uuid = String::from_utf8_lossy(&entry.xml).to_string();
            RawObjectRecord {
                uuid: ObjectUuid::new(uuid.clone()),
                display_name: entry.file_name.clone(),
                object_type: ObjectType::Constant,
                version_uuid: VersionUuid::new(format!("v-{uuid}")),
                scripted_code: None,
                content: ContentView::Constant(ConstantView {
                    value: serde_json::Value::String(uuid),
                    data_type: "text".to_string(),
                    scope: "APPLICATION".to_string(),
                }),
                raw_xml: entry.xml.clone(),
                deprecated: false,
            }
        }
    }

    struct FakeFormatter;
    impl SailFormatter for FakeFormatter {
        fn format(&self, code: &str, _lookup: &ObjectLookup) -> String {
            code.trim().to_string()
        }
    }

    #[derive(Default)]
    struct FakeStore {
        next_session: Mutex<i64>,
        objects: Mutex<BTreeMap<ObjectUuid, ObjectRecord>>,
        persisted: Mutex<RefCell<Option<AnalysisPayload>>>,
        failed: Mutex<Option<(String, String)>>,
    }

    impl SessionStore for FakeStore {
        fn create_session(&self) -> Result<Session, StoreError> {
            let mut next = self.next_session.lock().expect("lock");
            *next += 1;
            Ok(Session::new(SessionId::new(*next), ReferenceId::from_sequence(*next as u64), Timestamp::from_millis(0)))
        }

        fn persist_analysis(&self, _session_id: SessionId, payload: AnalysisPayload) -> Result<(), StoreError> {
            *self.persisted.lock().expect("lock").get_mut() = Some(payload);
            Ok(())
        }

        fn mark_failed(&self, _session_id: SessionId, step: &str, message: &str) -> Result<(), StoreError> {
            *self.failed.lock().expect("lock") = Some((step.to_string(), message.to_string()));
            Ok(())
        }

        fn refresh_progress(&self, _session_id: SessionId) -> Result<(), StoreError> {
            Ok(())
        }

        fn update_change_review(
            &self,
            _change_id: crate::core::ChangeId,
            _review_status: ReviewStatus,
            _notes: Option<&str>,
        ) -> Result<(), StoreError> {
            Ok(())
        }

        fn complete_session(&self, _session_id: SessionId) -> Result<(), StoreError> {
            Ok(())
        }

        fn get_by_reference(&self, _reference_id: &ReferenceId) -> Result<Option<Session>, StoreError> {
            Ok(None)
        }

        fn get_session(&self, session_id: SessionId) -> Result<Option<Session>, StoreError> {
            let status = if self.failed.lock().expect("lock").is_some() {
                SessionStatus::Failed
            } else {
                SessionStatus::Ready
            };
            let mut session = Session::new(session_id, ReferenceId::from_sequence(1), Timestamp::from_millis(0));
            session.status = status;
            Ok(Some(session))
        }

        fn list_sessions(&self) -> Result<Vec<Session>, StoreError> {
            Ok(Vec::new())
        }

        fn list_changes(&self, _session_id: SessionId) -> Result<Vec<Change>, StoreError> {
            Ok(Vec::new())
        }

        fn get_or_insert_object(
            &self,
            uuid: &ObjectUuid,
            display_name: &str,
            object_type: ObjectType,
        ) -> Result<ObjectRecord, StoreError> {
            let mut objects = self.objects.lock().expect("lock");
            Ok(objects
                .entry(uuid.clone())
                .or_insert_with(|| ObjectRecord {
                    uuid: uuid.clone(),
                    display_name: display_name.to_string(),
                    object_type,
                })
                .clone())
        }

        fn get_object(&self, uuid: &ObjectUuid) -> Result<Option<ObjectRecord>, StoreError> {
            Ok(self.objects.lock().expect("lock").get(uuid).cloned())
        }

        fn get_object_versions(
            &self,
            _session_id: SessionId,
            _object_uuid: &ObjectUuid,
        ) -> Result<BTreeMap<crate::core::PackageRole, ObjectVersion>, StoreError> {
            Ok(BTreeMap::new())
        }
    }

    fn inputs() -> [PackageInput; 3] {
        [
            PackageInput { role: PackageRole::Base, path: "base.zip".into(), original_filename: "base.zip".to_string() },
            PackageInput {
                role: PackageRole::Customized,
                path: "customized.zip".into(),
                original_filename: "customized.zip".to_string(),
            },
            PackageInput {
                role: PackageRole::NewVendor,
                path: "new_vendor.zip".into(),
                original_filename: "new_vendor.zip".to_string(),
            },
        ]
    }

    #[test]
    fn run_analysis_persists_and_returns_ready_session() {
        let orchestrator =
            Orchestrator::new(FakeReader, FakeParser, FakeFormatter, FakeStore::default(), OrchestratorConfig::default());
        let session =
            orchestrator.run_analysis(inputs(), &NullProgressSink, &CancellationToken::new()).expect("analysis succeeds");
        assert_eq!(session.status, SessionStatus::Ready);
    }

    #[test]
    fn read_failure_marks_session_failed_with_step_name() {
        let bad_inputs = [
            PackageInput { role: PackageRole::Base, path: "missing.zip".into(), original_filename: "missing.zip".to_string() },
            PackageInput {
                role: PackageRole::Customized,
                path: "customized.zip".into(),
                original_filename: "customized.zip".to_string(),
            },
            PackageInput {
                role: PackageRole::NewVendor,
                path: "new_vendor.zip".into(),
                original_filename: "new_vendor.zip".to_string(),
            },
        ];
        let orchestrator =
            Orchestrator::new(FakeReader, FakeParser, FakeFormatter, FakeStore::default(), OrchestratorConfig::default());
        let err = orchestrator
            .run_analysis(bad_inputs, &NullProgressSink, &CancellationToken::new())
            .expect_err("missing base package fails");
        assert!(matches!(
            err,
            MergeError::PackageValidation { kind: PackageValidationKind::FileNotFound, .. }
        ));
    }

    #[test]
    fn pre_cancelled_token_fails_at_the_first_boundary() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let orchestrator =
            Orchestrator::new(FakeReader, FakeParser, FakeFormatter, FakeStore::default(), OrchestratorConfig::default());
        let err = orchestrator
            .run_analysis(inputs(), &NullProgressSink, &cancel)
            .expect_err("cancellation observed at first boundary");
        assert!(matches!(err, MergeError::Cancelled { .. }));
    }
}
