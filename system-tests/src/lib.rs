// system-tests/src/lib.rs
// ============================================================================
// Module: System Test Fixtures
// Description: Builds in-memory Appian package ZIPs and drives the real
//              reader/parser/formatter/store stack through the Orchestrator.
// Purpose: Shared scaffolding for the end-to-end scenario, boundary, and
//          property test suites.
// Dependencies: merge-core, merge-config, merge-zip, merge-parser,
//               merge-sail, merge-store-sqlite, zip, tempfile
// ============================================================================

//! ## Overview
//! Nothing here is exercised by production code; it exists purely to give
//! the integration tests under `tests/` a one-line way to build a package
//! ZIP and run it through the full pipeline exactly as `merge-cli` would.

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use merge_core::CancellationToken;
use merge_core::Orchestrator;
use merge_core::OrchestratorConfig;
use merge_core::PackageInput;
use merge_core::PackageRole;
use merge_core::ProgressSink;
use merge_core::Session;
use merge_parser::XmlObjectParser;
use merge_sail::SailTextFormatter;
use merge_store_sqlite::SqliteSessionStore;
use merge_store_sqlite::SqliteStoreConfig;
use merge_zip::ZipPackageReader;
use zip::write::SimpleFileOptions;
use zip::write::ZipWriter;

/// The full concrete orchestrator type the CLI wires together.
pub type RealOrchestrator =
    Orchestrator<ZipPackageReader, XmlObjectParser, SailTextFormatter, SqliteSessionStore>;

/// A no-op progress sink for tests that don't care about step timing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn on_step(&self, _step_name: &str, _progress: merge_core::StepProgress) {}
}

/// Builds a ZIP archive in memory from `(entry_path, content)` pairs.
#[must_use]
pub fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut buf = Vec::new();
    {
        let cursor = std::io::Cursor::new(&mut buf);
        let mut writer = ZipWriter::new(cursor);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        for (name, content) in entries {
            writer.start_file(*name, options).expect("start_file");
            writer.write_all(content).expect("write entry");
        }
        writer.finish().expect("finish zip");
    }
    buf
}

/// Writes `bytes` to a fresh temp file and returns the guard (dropping it
/// deletes the file).
#[must_use]
pub fn write_temp_zip(bytes: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(bytes).expect("write temp zip");
    file
}

/// Builds a well-formed `<interface>` XML entry body.
#[must_use]
pub fn interface_xml(uuid: &str, name: &str, version_uuid: &str, code: &str) -> String {
    format!(
        "<interface><uuid>{uuid}</uuid><name>{name}</name><versionUuid>{version_uuid}</versionUuid>\
         <code><![CDATA[{code}]]></code><parameters/><security>Everyone</security></interface>"
    )
}

/// Builds a well-formed `<rule>` (expression rule) XML entry body.
#[must_use]
pub fn rule_xml(uuid: &str, name: &str, version_uuid: &str, code: &str) -> String {
    format!(
        "<rule><uuid>{uuid}</uuid><name>{name}</name><versionUuid>{version_uuid}</versionUuid>\
         <code><![CDATA[{code}]]></code><inputs/><outputType>text</outputType></rule>"
    )
}

/// Builds a well-formed `<constant>` XML entry body with a string value.
#[must_use]
pub fn constant_xml(uuid: &str, name: &str, version_uuid: &str, value: &str) -> String {
    format!(
        "<constant><uuid>{uuid}</uuid><name>{name}</name><versionUuid>{version_uuid}</versionUuid>\
         <value>\"{value}\"</value><dataType>Text</dataType><scope>APPLICATION</scope></constant>"
    )
}

/// Describes one `<node>` in a process model fixture.
#[derive(Debug, Clone, Copy)]
pub struct ProcessNodeSpec<'a> {
    /// The node's stable uuid.
    pub uuid: &'a str,
    /// Display name.
    pub name: &'a str,
    /// Node type tag (e.g. `"start"`, `"task"`, `"end"`).
    pub node_type: &'a str,
}

/// Builds a `<processModel>` XML entry body from node, flow, and variable
/// counts, so the three end-to-end scenario fixtures can assemble process
/// models with distinct shapes (spec §8 scenario 2).
#[must_use]
pub fn process_model_xml(
    uuid: &str,
    name: &str,
    version_uuid: &str,
    nodes: &[ProcessNodeSpec<'_>],
    flows: &[(&str, &str)],
    variables: &[(&str, &str)],
) -> String {
    let nodes_xml: String = nodes
        .iter()
        .map(|n| {
            format!(
                "<node><uuid>{}</uuid><name>{}</name><type>{}</type><properties/></node>",
                n.uuid, n.name, n.node_type
            )
        })
        .collect();
    let flows_xml: String = flows
        .iter()
        .map(|(source, target)| format!("<flow><source>{source}</source><target>{target}</target></flow>"))
        .collect();
    let vars_xml: String = variables
        .iter()
        .map(|(name, var_type)| format!("<variable><name>{name}</name><type>{var_type}</type></variable>"))
        .collect();
    format!(
        "<processModel><uuid>{uuid}</uuid><name>{name}</name><versionUuid>{version_uuid}</versionUuid>\
         <nodes>{nodes_xml}</nodes><flows>{flows_xml}</flows><variables>{vars_xml}</variables></processModel>"
    )
}

/// One package's set of `(directory, file_name, xml_body)` object entries.
pub type PackageEntries<'a> = Vec<(&'a str, &'a str, String)>;

/// Builds a package ZIP from a list of `(directory, file_name, xml_body)`
/// entries (e.g. `("interface", "X.xml", interface_xml(...))`).
#[must_use]
pub fn build_package(entries: &PackageEntries<'_>) -> Vec<u8> {
    let owned: Vec<(String, &[u8])> =
        entries.iter().map(|(dir, file, body)| (format!("{dir}/{file}"), body.as_bytes())).collect();
    let borrowed: Vec<(&str, &[u8])> = owned.iter().map(|(path, bytes)| (path.as_str(), *bytes)).collect();
    build_zip(&borrowed)
}

/// A running end-to-end test harness: a temp SQLite store plus the real
/// reader/parser/formatter stack wired into one [`Orchestrator`].
pub struct Harness {
    /// The orchestrator under test.
    pub orchestrator: RealOrchestrator,
    _store_dir: tempfile::TempDir,
}

impl Harness {
    /// Creates a fresh harness backed by a temp-directory SQLite store.
    #[must_use]
    pub fn new() -> Self {
        let store_dir = tempfile::tempdir().expect("temp store dir");
        let store_path = store_dir.path().join("session-store.sqlite3");
        let store = SqliteSessionStore::open(SqliteStoreConfig::new(store_path)).expect("open store");
        let orchestrator = Orchestrator::new(
            ZipPackageReader::new(),
            XmlObjectParser::new(),
            SailTextFormatter::new(),
            store,
            OrchestratorConfig::default(),
        );
        Self { orchestrator, _store_dir: store_dir }
    }

    /// Runs one analysis over the three given package ZIP byte buffers.
    ///
    /// # Panics
    ///
    /// Panics (via `expect`) if any of the three package files cannot be
    /// written to disk; this is test-harness plumbing, not the behaviour
    /// under test.
    pub fn analyze(
        &self,
        base: &[u8],
        customized: &[u8],
        new_vendor: &[u8],
    ) -> Result<Session, merge_core::MergeError> {
        let base_file = write_temp_zip(base);
        let customized_file = write_temp_zip(customized);
        let new_vendor_file = write_temp_zip(new_vendor);

        let inputs = [
            package_input(PackageRole::Base, base_file.path()),
            package_input(PackageRole::Customized, customized_file.path()),
            package_input(PackageRole::NewVendor, new_vendor_file.path()),
        ];

        self.orchestrator.run_analysis(inputs, &SilentProgress, &CancellationToken::new())
    }

    /// Direct access to the underlying `SessionStore`, for assertions against
    /// persisted rows after `analyze` returns.
    #[must_use]
    pub fn store(&self) -> &SqliteSessionStore {
        self.orchestrator.store()
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

fn package_input(role: PackageRole, path: &Path) -> PackageInput {
    PackageInput {
        role,
        path: PathBuf::from(path),
        original_filename: path.file_name().expect("file name").to_string_lossy().into_owned(),
    }
}
