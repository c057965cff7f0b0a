// crates/merge-store-sqlite/src/codec.rs
// ============================================================================
// Module: Enum/TEXT Column Codecs
// Description: Explicit string encodings for every closed-set enum stored as
//              a `TEXT` column, following the teacher's
//              `hash_algorithm_label`/`parse_hash_algorithm` pattern.
// Purpose: Keep on-disk string forms stable and independent of any `Display`
//          impl the core crate might change for human-readable output.
// Dependencies: merge-core
// ============================================================================

use merge_core::Classification;
use merge_core::DeltaKind;
use merge_core::DeltaSet;
use merge_core::ObjectType;
use merge_core::PackageRole;
use merge_core::ReviewStatus;
use merge_core::SessionStatus;

use crate::error::SqliteStoreError;

/// Encodes a session status as its stored text form.
#[must_use]
pub fn session_status_label(status: SessionStatus) -> &'static str {
    match status {
        SessionStatus::Processing => "processing",
        SessionStatus::Ready => "ready",
        SessionStatus::InProgress => "in_progress",
        SessionStatus::Completed => "completed",
        SessionStatus::Failed => "failed",
    }
}

/// Decodes a session status from its stored text form.
pub fn parse_session_status(value: &str) -> Result<SessionStatus, SqliteStoreError> {
    match value {
        "processing" => Ok(SessionStatus::Processing),
        "ready" => Ok(SessionStatus::Ready),
        "in_progress" => Ok(SessionStatus::InProgress),
        "completed" => Ok(SessionStatus::Completed),
        "failed" => Ok(SessionStatus::Failed),
        other => Err(SqliteStoreError::Corrupt(format!("unknown session status: {other}"))),
    }
}

/// Encodes a package role as its stored text form.
#[must_use]
pub fn package_role_label(role: PackageRole) -> &'static str {
    match role {
        PackageRole::Base => "base",
        PackageRole::Customized => "customized",
        PackageRole::NewVendor => "new_vendor",
    }
}

/// Decodes a package role from its stored text form.
pub fn parse_package_role(value: &str) -> Result<PackageRole, SqliteStoreError> {
    match value {
        "base" => Ok(PackageRole::Base),
        "customized" => Ok(PackageRole::Customized),
        "new_vendor" => Ok(PackageRole::NewVendor),
        other => Err(SqliteStoreError::Corrupt(format!("unknown package role: {other}"))),
    }
}

/// Encodes an object type as its stored text form.
#[must_use]
pub fn object_type_label(object_type: ObjectType) -> &'static str {
    match object_type {
        ObjectType::Interface => "interface",
        ObjectType::ExpressionRule => "expression_rule",
        ObjectType::ProcessModel => "process_model",
        ObjectType::RecordType => "record_type",
        ObjectType::Cdt => "cdt",
        ObjectType::Constant => "constant",
        ObjectType::Site => "site",
        ObjectType::Group => "group",
        ObjectType::Integration => "integration",
        ObjectType::WebApi => "web_api",
        ObjectType::ConnectedSystem => "connected_system",
        ObjectType::DataStore => "data_store",
        ObjectType::Unknown => "unknown",
    }
}

/// Decodes an object type from its stored text form.
pub fn parse_object_type(value: &str) -> Result<ObjectType, SqliteStoreError> {
    match value {
        "interface" => Ok(ObjectType::Interface),
        "expression_rule" => Ok(ObjectType::ExpressionRule),
        "process_model" => Ok(ObjectType::ProcessModel),
        "record_type" => Ok(ObjectType::RecordType),
        "cdt" => Ok(ObjectType::Cdt),
        "constant" => Ok(ObjectType::Constant),
        "site" => Ok(ObjectType::Site),
        "group" => Ok(ObjectType::Group),
        "integration" => Ok(ObjectType::Integration),
        "web_api" => Ok(ObjectType::WebApi),
        "connected_system" => Ok(ObjectType::ConnectedSystem),
        "data_store" => Ok(ObjectType::DataStore),
        "unknown" => Ok(ObjectType::Unknown),
        other => Err(SqliteStoreError::Corrupt(format!("unknown object type: {other}"))),
    }
}

/// Encodes a classification as its stored text form.
#[must_use]
pub fn classification_label(classification: Classification) -> &'static str {
    match classification {
        Classification::NoConflict => "no_conflict",
        Classification::Conflict => "conflict",
        Classification::New => "new",
        Classification::Deleted => "deleted",
    }
}

/// Decodes a classification from its stored text form.
pub fn parse_classification(value: &str) -> Result<Classification, SqliteStoreError> {
    match value {
        "no_conflict" => Ok(Classification::NoConflict),
        "conflict" => Ok(Classification::Conflict),
        "new" => Ok(Classification::New),
        "deleted" => Ok(Classification::Deleted),
        other => Err(SqliteStoreError::Corrupt(format!("unknown classification: {other}"))),
    }
}

/// Encodes a review status as its stored text form.
#[must_use]
pub fn review_status_label(status: ReviewStatus) -> &'static str {
    match status {
        ReviewStatus::Pending => "pending",
        ReviewStatus::Reviewed => "reviewed",
        ReviewStatus::Skipped => "skipped",
    }
}

/// Decodes a review status from its stored text form.
pub fn parse_review_status(value: &str) -> Result<ReviewStatus, SqliteStoreError> {
    match value {
        "pending" => Ok(ReviewStatus::Pending),
        "reviewed" => Ok(ReviewStatus::Reviewed),
        "skipped" => Ok(ReviewStatus::Skipped),
        other => Err(SqliteStoreError::Corrupt(format!("unknown review status: {other}"))),
    }
}

/// Encodes a delta kind as its stored text form.
#[must_use]
pub fn delta_kind_label(kind: DeltaKind) -> &'static str {
    match kind {
        DeltaKind::New => "new",
        DeltaKind::Modified => "modified",
        DeltaKind::Deprecated => "deprecated",
        DeltaKind::Removed => "removed",
    }
}

/// Decodes a delta kind from its stored text form.
pub fn parse_delta_kind(value: &str) -> Result<DeltaKind, SqliteStoreError> {
    match value {
        "new" => Ok(DeltaKind::New),
        "modified" => Ok(DeltaKind::Modified),
        "deprecated" => Ok(DeltaKind::Deprecated),
        "removed" => Ok(DeltaKind::Removed),
        other => Err(SqliteStoreError::Corrupt(format!("unknown delta kind: {other}"))),
    }
}

/// Name of the delta table backing a given delta set.
#[must_use]
pub const fn delta_table_name(set: DeltaSet) -> &'static str {
    match set {
        DeltaSet::Vendor => "vendor_delta",
        DeltaSet::Customer => "customer_delta",
    }
}
