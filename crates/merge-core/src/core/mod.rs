// crates/merge-core/src/core/mod.rs
// ============================================================================
// Module: Merge Core Domain Types
// Description: Canonical schema for packages, objects, deltas, and changes.
// Purpose: Provide stable, serializable types that are the single source of
//          truth for every downstream stage and store implementation.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Domain types here carry no behavior beyond small accessor methods; all
//! pipeline logic lives in [`crate::runtime`].

pub mod change;
pub mod content;
pub mod delta;
pub mod errors;
pub mod hashing;
pub mod identifiers;
pub mod object;
pub mod object_type;
pub mod package;
pub mod session;
pub mod time;

pub use change::AiSummaryState;
pub use change::Change;
pub use change::Classification;
pub use change::ReviewStatus;
pub use content::CdtView;
pub use content::ConnectedSystemView;
pub use content::ConstantView;
pub use content::ContentView;
pub use content::DataStoreView;
pub use content::ExpressionRuleView;
pub use content::Field;
pub use content::GroupView;
pub use content::IntegrationView;
pub use content::InterfaceView;
pub use content::ProcessFlow;
pub use content::ProcessModelView;
pub use content::ProcessNode;
pub use content::ProcessVariable;
pub use content::RecordTypeView;
pub use content::Relationship;
pub use content::SitePage;
pub use content::SiteView;
pub use delta::DeltaKind;
pub use delta::DeltaRecord;
pub use delta::DeltaSet;
pub use errors::MergeError;
pub use errors::PackageValidationKind;
pub use hashing::ContentFingerprint;
pub use hashing::FingerprintError;
pub use identifiers::ChangeId;
pub use identifiers::ObjectUuid;
pub use identifiers::ObjectVersionId;
pub use identifiers::PackageId;
pub use identifiers::ReferenceId;
pub use identifiers::SessionId;
pub use identifiers::VersionUuid;
pub use object::ObjectLookup;
pub use object::ObjectRecord;
pub use object::ObjectVersion;
pub use object::RawObjectRecord;
pub use object_type::ObjectType;
pub use package::Package;
pub use package::PackageRole;
pub use session::Session;
pub use session::SessionStatus;
pub use time::Timestamp;
