#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::print_stdout,
        clippy::print_stderr,
        reason = "Test-only output and assertions are permitted."
    )
)]
// crates/merge-cli/src/main.rs
// ============================================================================
// Module: Merge Analyzer CLI Entry Point
// Description: Command dispatcher for package analysis and review workflows.
// Purpose: Drive the orchestrator and session store from the command line.
// Dependencies: clap, merge-core, merge-config, merge-zip, merge-parser,
//               merge-sail, merge-store-sqlite, tracing, tracing-subscriber.
// ============================================================================

//! ## Overview
//! The merge analyzer CLI wires the concrete `PackageReader`, `ObjectParser`,
//! `SailFormatter`, and `SessionStore` implementations into
//! [`merge_core::Orchestrator`] and exposes the reviewer-facing operations
//! (`show`, `review`, `complete`, `diff`) against the resulting session
//! store. It performs no analysis logic of its own; every invariant lives in
//! `merge-core`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use merge_config::MergeConfig;
use merge_core::CancellationToken;
use merge_core::Change;
use merge_core::Classification;
use merge_core::MergeError;
use merge_core::ObjectType;
use merge_core::Orchestrator;
use merge_core::OrchestratorConfig;
use merge_core::PackageInput;
use merge_core::PackageRole;
use merge_core::ProgressSink;
use merge_core::ReferenceId;
use merge_core::ReviewStatus;
use merge_core::SessionStore;
use merge_core::StepProgress;
use merge_core::diff_text;
use merge_parser::XmlObjectParser;
use merge_sail::SailTextFormatter;
use merge_store_sqlite::SqliteSessionStore;
use merge_store_sqlite::SqliteStoreConfig;
use merge_zip::ZipPackageReader;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "merge-analyzer",
    disable_help_subcommand = true,
    arg_required_else_help = true
)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a full three-way analysis and persist the result.
    Analyze(AnalyzeCommand),
    /// Show a session summary and its ordered change list.
    Show(ShowCommand),
    /// Record a reviewer decision on one change.
    Review(ReviewCommand),
    /// Transition a session from `in_progress` to `completed`.
    Complete(CompleteCommand),
    /// Produce a unified diff between two versions of a scripted object.
    Diff(DiffCommand),
    /// List every session, most recent first.
    Sessions(SessionsCommand),
}

/// Shared store-location argument.
#[derive(Args, Debug)]
struct StoreArgs {
    /// Path to the `SQLite` session store file.
    #[arg(long, value_name = "PATH", default_value = "merge-analyzer.sqlite3")]
    store: PathBuf,
}

/// Arguments for the `analyze` command.
#[derive(Args, Debug)]
struct AnalyzeCommand {
    #[command(flatten)]
    store: StoreArgs,
    /// Path to the base (vendor-shipped) package ZIP (A).
    #[arg(long, value_name = "PATH")]
    base: PathBuf,
    /// Path to the customized package ZIP (B).
    #[arg(long, value_name = "PATH")]
    customized: PathBuf,
    /// Path to the new vendor release package ZIP (C).
    #[arg(long = "new-vendor", value_name = "PATH")]
    new_vendor: PathBuf,
    /// Optional config file path (defaults to merge-analyzer.toml or env
    /// override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for the `show` command.
#[derive(Args, Debug)]
struct ShowCommand {
    #[command(flatten)]
    store: StoreArgs,
    /// Session reference id, e.g. `MRG_001`.
    #[arg(long, value_name = "MRG_NNN")]
    reference: String,
    /// Restrict to one classification.
    #[arg(long, value_enum)]
    classification: Option<ClassificationArg>,
    /// Restrict to one object type.
    #[arg(long, value_name = "TYPE")]
    object_type: Option<String>,
    /// Restrict to one review status.
    #[arg(long, value_enum)]
    status: Option<ReviewStatusArg>,
    /// Case-insensitive substring search over object name.
    #[arg(long, value_name = "TEXT")]
    search: Option<String>,
}

/// `classification` filter values accepted on the command line.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum ClassificationArg {
    /// Safe to adopt without reviewer input.
    NoConflict,
    /// Requires reviewer judgment.
    Conflict,
    /// Both sides introduced the object independently.
    New,
    /// The object is being removed from the upgraded application.
    Deleted,
}

impl ClassificationArg {
    const fn to_classification(self) -> Classification {
        match self {
            Self::NoConflict => Classification::NoConflict,
            Self::Conflict => Classification::Conflict,
            Self::New => Classification::New,
            Self::Deleted => Classification::Deleted,
        }
    }
}

/// `status` filter values accepted on the command line.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum ReviewStatusArg {
    /// Not yet reviewed.
    Pending,
    /// Reviewer explicitly accepted/resolved this change.
    Reviewed,
    /// Reviewer explicitly skipped this change.
    Skipped,
}

impl ReviewStatusArg {
    const fn to_review_status(self) -> ReviewStatus {
        match self {
            Self::Pending => ReviewStatus::Pending,
            Self::Reviewed => ReviewStatus::Reviewed,
            Self::Skipped => ReviewStatus::Skipped,
        }
    }
}

/// Arguments for the `review` command.
#[derive(Args, Debug)]
struct ReviewCommand {
    #[command(flatten)]
    store: StoreArgs,
    /// Session reference id, e.g. `MRG_001`.
    #[arg(long, value_name = "MRG_NNN")]
    reference: String,
    /// The changed object's stable uuid.
    #[arg(long, value_name = "UUID")]
    object: String,
    /// New review status.
    #[arg(long, value_enum)]
    status: ReviewStatusArg,
    /// Optional free-text reviewer notes.
    #[arg(long, value_name = "TEXT")]
    notes: Option<String>,
}

/// Arguments for the `complete` command.
#[derive(Args, Debug)]
struct CompleteCommand {
    #[command(flatten)]
    store: StoreArgs,
    /// Session reference id, e.g. `MRG_001`.
    #[arg(long, value_name = "MRG_NNN")]
    reference: String,
}

/// Arguments for the `diff` command.
#[derive(Args, Debug)]
struct DiffCommand {
    #[command(flatten)]
    store: StoreArgs,
    /// Session reference id, e.g. `MRG_001`.
    #[arg(long, value_name = "MRG_NNN")]
    reference: String,
    /// The changed object's stable uuid.
    #[arg(long, value_name = "UUID")]
    object: String,
    /// Left-hand package role to diff from.
    #[arg(long, value_enum, default_value_t = PackageRoleArg::Base)]
    left: PackageRoleArg,
    /// Right-hand package role to diff to.
    #[arg(long, value_enum, default_value_t = PackageRoleArg::NewVendor)]
    right: PackageRoleArg,
    /// Context line count surrounding each hunk.
    #[arg(long, value_name = "N")]
    context: Option<usize>,
}

/// Arguments for the `sessions` command.
#[derive(Args, Debug)]
struct SessionsCommand {
    #[command(flatten)]
    store: StoreArgs,
}

/// `PackageRole` values accepted on the command line.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum PackageRoleArg {
    /// The original vendor-shipped base (A).
    Base,
    /// The customer's current production state (B).
    Customized,
    /// The newer vendor release (C).
    NewVendor,
}

impl PackageRoleArg {
    const fn to_package_role(self) -> PackageRole {
        match self {
            Self::Base => PackageRole::Base,
            Self::Customized => PackageRole::Customized,
            Self::NewVendor => PackageRole::NewVendor,
        }
    }
}

impl std::fmt::Display for PackageRoleArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Base => "base",
            Self::Customized => "customized",
            Self::NewVendor => "new-vendor",
        };
        f.write_str(label)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl From<MergeError> for CliError {
    fn from(err: MergeError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<merge_core::StoreError> for CliError {
    fn from(err: merge_core::StoreError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<merge_config::ConfigError> for CliError {
    fn from(err: merge_config::ConfigError) -> Self {
        Self::new(err.to_string())
    }
}

impl From<merge_store_sqlite::SqliteStoreError> for CliError {
    fn from(err: merge_store_sqlite::SqliteStoreError) -> Self {
        Self::new(err.to_string())
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    tracing_subscriber::fmt::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze(command) => command_analyze(&command),
        Commands::Show(command) => command_show(&command),
        Commands::Review(command) => command_review(&command),
        Commands::Complete(command) => command_complete(&command),
        Commands::Diff(command) => command_diff(&command),
        Commands::Sessions(command) => command_sessions(&command),
    }
}

// ============================================================================
// SECTION: Analyze Command
// ============================================================================

/// A [`ProgressSink`] that logs each step at `info` level via `tracing`.
#[derive(Debug, Clone, Copy, Default)]
struct TracingProgressSink;

impl ProgressSink for TracingProgressSink {
    fn on_step(&self, step_name: &str, progress: StepProgress) {
        let _ = write_stdout_line(&format!(
            "[{}/{}] {step_name} ({} items, {}ms)",
            progress.step_index, progress.total_steps, progress.count, progress.elapsed_ms
        ));
    }
}

/// Executes the `analyze` command.
fn command_analyze(command: &AnalyzeCommand) -> CliResult<ExitCode> {
    let config = MergeConfig::load(command.config.as_deref())?;
    config.validate()?;

    let store = open_store(&command.store.store)?;
    let orchestrator = Orchestrator::new(
        ZipPackageReader::new(),
        XmlObjectParser::new(),
        SailTextFormatter::new(),
        store,
        OrchestratorConfig {
            max_package_bytes: config.max_package_bytes,
            step_timeout: config.step_timeout(),
            diff_context_lines: config.diff_context_lines,
        },
    );

    let inputs = [
        PackageInput {
            role: PackageRole::Base,
            path: command.base.clone(),
            original_filename: file_name(&command.base),
        },
        PackageInput {
            role: PackageRole::Customized,
            path: command.customized.clone(),
            original_filename: file_name(&command.customized),
        },
        PackageInput {
            role: PackageRole::NewVendor,
            path: command.new_vendor.clone(),
            original_filename: file_name(&command.new_vendor),
        },
    ];

    let session =
        orchestrator.run_analysis(inputs, &TracingProgressSink, &CancellationToken::new())?;

    write_stdout_line(&format!(
        "session {} status={} reference={}",
        session.id, session.status, session.reference_id
    ))
    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

fn file_name(path: &PathBuf) -> String {
    path.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// SECTION: Show Command
// ============================================================================

/// Executes the `show` command.
fn command_show(command: &ShowCommand) -> CliResult<ExitCode> {
    let store = open_store(&command.store.store)?;
    let session = get_session_by_reference(&store, &command.reference)?;

    write_stdout_line(&format!(
        "session {} status={} reviewed={} skipped={}",
        session.reference_id, session.status, session.reviewed_count, session.skipped_count
    ))
    .map_err(|err| CliError::new(output_error("stdout", &err)))?;

    let changes = store.list_changes(session.id)?;
    let filtered: Vec<&Change> = changes
        .iter()
        .filter(|change| matches_filters(change, &store, command))
        .collect();

    for change in &filtered {
        let order = change.order_index.map_or("-".to_string(), |value| value.to_string());
        write_stdout_line(&format!(
            "  [{order}] {uuid} classification={classification} vendor={vendor:?} \
             customer={customer:?} status={status}",
            uuid = change.object_uuid,
            classification = change.classification,
            vendor = change.vendor_kind,
            customer = change.customer_kind,
            status = change.review_status,
        ))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    write_stdout_line(&format!("{} change(s) shown of {} total", filtered.len(), changes.len()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

fn matches_filters(change: &Change, store: &SqliteSessionStore, command: &ShowCommand) -> bool {
    if let Some(classification) = command.classification {
        if change.classification != classification.to_classification() {
            return false;
        }
    }
    if let Some(status) = command.status {
        if change.review_status != status.to_review_status() {
            return false;
        }
    }
    if let Some(object_type) = &command.object_type {
        let Ok(Some(object)) = store.get_object(&change.object_uuid) else { return false };
        if !object_type_matches(object.object_type, object_type) {
            return false;
        }
    }
    if let Some(search) = &command.search {
        let Ok(Some(object)) = store.get_object(&change.object_uuid) else { return false };
        if !object.display_name.to_lowercase().contains(&search.to_lowercase()) {
            return false;
        }
    }
    true
}

fn object_type_matches(object_type: ObjectType, needle: &str) -> bool {
    object_type.label().eq_ignore_ascii_case(needle)
}

// ============================================================================
// SECTION: Review Command
// ============================================================================

/// Executes the `review` command.
fn command_review(command: &ReviewCommand) -> CliResult<ExitCode> {
    let store = open_store(&command.store.store)?;
    let session = get_session_by_reference(&store, &command.reference)?;
    let changes = store.list_changes(session.id)?;
    let change = changes
        .iter()
        .find(|change| change.object_uuid.as_str() == command.object)
        .ok_or_else(|| CliError::new(format!("no change for object {}", command.object)))?;

    store.update_change_review(
        change.id,
        command.status.to_review_status(),
        command.notes.as_deref(),
    )?;
    store.refresh_progress(session.id)?;

    write_stdout_line(&format!("change {} marked {}", command.object, command.status.to_review_status()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Complete Command
// ============================================================================

/// Executes the `complete` command.
fn command_complete(command: &CompleteCommand) -> CliResult<ExitCode> {
    let store = open_store(&command.store.store)?;
    let session = get_session_by_reference(&store, &command.reference)?;
    store.complete_session(session.id)?;
    write_stdout_line(&format!("session {} completed", session.reference_id))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Diff Command
// ============================================================================

/// Executes the `diff` command.
fn command_diff(command: &DiffCommand) -> CliResult<ExitCode> {
    let store = open_store(&command.store.store)?;
    let session = get_session_by_reference(&store, &command.reference)?;
    let uuid = merge_core::ObjectUuid::new(command.object.clone());
    let versions = store.get_object_versions(session.id, &uuid)?;

    let left = versions.get(&command.left.to_package_role());
    let right = versions.get(&command.right.to_package_role());
    let left_code = left.and_then(|version| version.scripted_code.clone()).unwrap_or_default();
    let right_code = right.and_then(|version| version.scripted_code.clone()).unwrap_or_default();

    let context = command.context.unwrap_or(3);
    let diff = diff_text(&left_code, &right_code, context);

    for hunk in &diff.hunks {
        write_stdout_line(&hunk.header).map_err(|err| CliError::new(output_error("stdout", &err)))?;
        for line in &hunk.lines {
            let marker = match line.tag {
                merge_core::LineTag::Context => ' ',
                merge_core::LineTag::Add => '+',
                merge_core::LineTag::Delete => '-',
            };
            write_stdout_line(&format!("{marker}{}", line.text))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }
    write_stdout_line(&format!("+{} -{}", diff.additions, diff.deletions))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Sessions Command
// ============================================================================

/// Executes the `sessions` command.
fn command_sessions(command: &SessionsCommand) -> CliResult<ExitCode> {
    let store = open_store(&command.store.store)?;
    for session in store.list_sessions()? {
        write_stdout_line(&format!(
            "{} status={} reviewed={} skipped={}",
            session.reference_id, session.status, session.reviewed_count, session.skipped_count
        ))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn open_store(path: &PathBuf) -> CliResult<SqliteSessionStore> {
    SqliteSessionStore::open(SqliteStoreConfig::new(path.clone())).map_err(CliError::from)
}

fn get_session_by_reference(
    store: &SqliteSessionStore,
    reference: &str,
) -> CliResult<merge_core::Session> {
    store
        .get_by_reference(&ReferenceId::from(reference.to_string()))?
        .ok_or_else(|| CliError::new(format!("no session with reference {reference}")))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output-write failure for display.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}

// ============================================================================
// SECTION: Filter/Search Property Tests (spec §8 "Property tests")
// ============================================================================

#[cfg(test)]
mod filter_property_tests {
    use std::collections::BTreeSet;

    use merge_core::AiSummaryState;
    use merge_core::AnalysisPayload;
    use merge_core::Change;
    use merge_core::ChangeId;
    use merge_core::Classification;
    use merge_core::ObjectType;
    use merge_core::ObjectUuid;
    use merge_core::ReviewStatus;
    use merge_core::SessionStore;
    use merge_store_sqlite::SqliteSessionStore;
    use merge_store_sqlite::SqliteStoreConfig;
    use proptest::prelude::*;

    use super::ClassificationArg;
    use super::ReviewStatusArg;
    use super::ShowCommand;
    use super::StoreArgs;
    use super::matches_filters;

    /// One object present in the fixture session: a stable uuid, a display
    /// name, a type, a classification, and a review status.
    #[derive(Debug, Clone)]
    struct ObjectSpec {
        name: String,
        object_type: ObjectType,
        classification: Classification,
        review_status: ReviewStatus,
    }

    fn object_type_strategy() -> impl Strategy<Value = ObjectType> {
        prop_oneof![
            Just(ObjectType::Interface),
            Just(ObjectType::ExpressionRule),
            Just(ObjectType::ProcessModel),
            Just(ObjectType::RecordType),
            Just(ObjectType::Cdt),
            Just(ObjectType::Constant),
            Just(ObjectType::Site),
            Just(ObjectType::Group),
            Just(ObjectType::Integration),
            Just(ObjectType::WebApi),
            Just(ObjectType::ConnectedSystem),
            Just(ObjectType::DataStore),
            Just(ObjectType::Unknown),
        ]
    }

    fn classification_strategy() -> impl Strategy<Value = Classification> {
        prop_oneof![
            Just(Classification::NoConflict),
            Just(Classification::Conflict),
            Just(Classification::New),
            Just(Classification::Deleted),
        ]
    }

    fn review_status_strategy() -> impl Strategy<Value = ReviewStatus> {
        prop_oneof![
            Just(ReviewStatus::Pending),
            Just(ReviewStatus::Reviewed),
            Just(ReviewStatus::Skipped),
        ]
    }

    fn object_spec_strategy() -> impl Strategy<Value = ObjectSpec> {
        ("[A-Za-z]{1,8}", object_type_strategy(), classification_strategy(), review_status_strategy())
            .prop_map(|(name, object_type, classification, review_status)| ObjectSpec {
                name,
                object_type,
                classification,
                review_status,
            })
    }

    /// Creates a fresh session populated with one object/change per `specs`
    /// entry (dense `order_index` 0..N in input order) and returns the
    /// opened store plus the uuids assigned, in the same order as `specs`.
    fn seed_session(
        specs: &[ObjectSpec],
    ) -> (tempfile::TempDir, SqliteSessionStore, merge_core::SessionId, Vec<ObjectUuid>) {
        let dir = tempfile::tempdir().expect("tempdir");
        let store =
            SqliteSessionStore::open(SqliteStoreConfig::new(dir.path().join("store.sqlite3")))
                .expect("open store");
        let session = store.create_session().expect("create session");

        let mut uuids = Vec::with_capacity(specs.len());
        let mut changes = Vec::with_capacity(specs.len());
        for (index, spec) in specs.iter().enumerate() {
            let uuid = ObjectUuid::new(format!("_obj-{index}"));
            store
                .get_or_insert_object(&uuid, &spec.name, spec.object_type)
                .expect("get_or_insert_object");
            changes.push(Change {
                id: ChangeId::new((index + 1) as i64),
                session_id: session.id,
                object_uuid: uuid.clone(),
                classification: spec.classification,
                vendor_kind: None,
                customer_kind: None,
                review_status: spec.review_status,
                notes: None,
                ai_summary: AiSummaryState::default(),
                order_index: Some(index as u64),
            });
            uuids.push(uuid);
        }

        let payload = AnalysisPayload {
            packages: vec![],
            versions: vec![],
            new_objects: vec![],
            vendor_delta: vec![],
            customer_delta: vec![],
            changes,
        };
        store.persist_analysis(session.id, payload).expect("persist_analysis");
        (dir, store, session.id, uuids)
    }

    fn show_command(
        classification: Option<ClassificationArg>,
        object_type: Option<String>,
        status: Option<ReviewStatusArg>,
        search: Option<String>,
    ) -> ShowCommand {
        ShowCommand {
            store: StoreArgs { store: "unused.sqlite3".into() },
            reference: "MRG_001".to_string(),
            classification,
            object_type,
            status,
            search,
        }
    }

    fn expected_match(spec: &ObjectSpec, command: &ShowCommand) -> bool {
        if let Some(classification) = command.classification {
            if spec.classification != classification.to_classification() {
                return false;
            }
        }
        if let Some(status) = command.status {
            if spec.review_status != status.to_review_status() {
                return false;
            }
        }
        if let Some(object_type) = &command.object_type {
            if !spec.object_type.label().eq_ignore_ascii_case(object_type) {
                return false;
            }
        }
        if let Some(search) = &command.search {
            if !spec.name.to_lowercase().contains(&search.to_lowercase()) {
                return false;
            }
        }
        true
    }

    proptest! {
        /// Filter correctness (spec §8): for any combination of
        /// classification / object-type / review-status criteria, the set
        /// `matches_filters` accepts is exactly `{c | matches(c, criteria)}`.
        #[test]
        fn filter_correctness(
            specs in prop::collection::vec(object_spec_strategy(), 1..12),
            classification_filter in proptest::option::of(classification_strategy()),
            status_filter in proptest::option::of(review_status_strategy()),
            use_type_filter in proptest::bool::ANY,
        ) {
            let (_dir, store, session_id, uuids) = seed_session(&specs);
            let changes = store.list_changes(session_id).expect("list_changes");

            let object_type_filter = if use_type_filter && !specs.is_empty() {
                Some(specs[0].object_type.label().to_string())
            } else {
                None
            };
            let command = show_command(
                classification_filter.map(|c| match c {
                    Classification::NoConflict => ClassificationArg::NoConflict,
                    Classification::Conflict => ClassificationArg::Conflict,
                    Classification::New => ClassificationArg::New,
                    Classification::Deleted => ClassificationArg::Deleted,
                }),
                object_type_filter,
                status_filter.map(|s| match s {
                    ReviewStatus::Pending => ReviewStatusArg::Pending,
                    ReviewStatus::Reviewed => ReviewStatusArg::Reviewed,
                    ReviewStatus::Skipped => ReviewStatusArg::Skipped,
                }),
                None,
            );

            let spec_by_uuid: std::collections::BTreeMap<&ObjectUuid, &ObjectSpec> =
                uuids.iter().zip(specs.iter()).collect();

            let expected: BTreeSet<ObjectUuid> = changes
                .iter()
                .filter(|c| expected_match(spec_by_uuid[&c.object_uuid], &command))
                .map(|c| c.object_uuid.clone())
                .collect();
            let actual: BTreeSet<ObjectUuid> = changes
                .iter()
                .filter(|c| matches_filters(c, &store, &command))
                .map(|c| c.object_uuid.clone())
                .collect();
            prop_assert_eq!(actual, expected);
        }

        /// Search correctness (spec §8): substring search on object name is
        /// case-insensitive and returns every matching change, nothing else.
        #[test]
        fn search_correctness(
            specs in prop::collection::vec(object_spec_strategy(), 1..12),
            pattern_index in 0usize..12,
            uppercase_pattern in proptest::bool::ANY,
        ) {
            let (_dir, store, session_id, uuids) = seed_session(&specs);
            let changes = store.list_changes(session_id).expect("list_changes");

            let anchor = &specs[pattern_index % specs.len()];
            let pattern_len = 1 + (pattern_index % anchor.name.len());
            let mut pattern = anchor.name[..pattern_len].to_string();
            if uppercase_pattern {
                pattern = pattern.to_uppercase();
            }

            let command = show_command(None, None, None, Some(pattern.clone()));
            let spec_by_uuid: std::collections::BTreeMap<&ObjectUuid, &ObjectSpec> =
                uuids.iter().zip(specs.iter()).collect();

            let expected: BTreeSet<ObjectUuid> = changes
                .iter()
                .filter(|c| spec_by_uuid[&c.object_uuid].name.to_lowercase().contains(&pattern.to_lowercase()))
                .map(|c| c.object_uuid.clone())
                .collect();
            let actual: BTreeSet<ObjectUuid> = changes
                .iter()
                .filter(|c| matches_filters(c, &store, &command))
                .map(|c| c.object_uuid.clone())
                .collect();
            prop_assert_eq!(actual, expected);
            prop_assert!(expected.contains(&uuids[pattern_index % specs.len()]));
        }

        /// Ordering preservation under filtering (spec §8): the filtered
        /// list is a subsequence of the full list's `order_index` order,
        /// never reordered.
        #[test]
        fn ordering_preserved_under_filtering(
            specs in prop::collection::vec(object_spec_strategy(), 1..12),
            status_filter in proptest::option::of(review_status_strategy()),
        ) {
            let (_dir, store, session_id, _uuids) = seed_session(&specs);
            let changes = store.list_changes(session_id).expect("list_changes");

            let command = show_command(
                None,
                None,
                status_filter.map(|s| match s {
                    ReviewStatus::Pending => ReviewStatusArg::Pending,
                    ReviewStatus::Reviewed => ReviewStatusArg::Reviewed,
                    ReviewStatus::Skipped => ReviewStatusArg::Skipped,
                }),
                None,
            );

            let filtered_indices: Vec<Option<u64>> = changes
                .iter()
                .filter(|c| matches_filters(c, &store, &command))
                .map(|c| c.order_index)
                .collect();
            let mut sorted_indices = filtered_indices.clone();
            sorted_indices.sort_unstable();
            prop_assert_eq!(filtered_indices, sorted_indices);
        }
    }
}
