// crates/merge-core/src/core/content.rs
// ============================================================================
// Module: Canonical Content Views
// Description: Per-object-type comparison views produced by the Content
//              Canonicalizer (spec §4.4).
// Purpose: Define stable, order-independent payloads suitable for equality
//          comparison and fingerprinting.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every object type has a canonical comparison view. Lists are compared as
//! sets keyed by a stable identity (node uuid, field name, ...) unless the
//! type defines a semantic order; `BTreeMap`/`BTreeSet` give both a
//! deterministic serialization and set-equality semantics for free.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

/// A process model node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProcessNode {
    /// Node uuid, the set key.
    pub uuid: String,
    /// Node display name.
    pub name: String,
    /// Node type (e.g. script task, user input task, gateway).
    pub node_type: String,
    /// Node property map, flattened to a sorted key/value list for stable equality.
    pub properties: BTreeMap<String, String>,
}

/// A process model flow edge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProcessFlow {
    /// Source node uuid.
    pub source: String,
    /// Target node uuid.
    pub target: String,
    /// Optional flow condition expression.
    pub condition: Option<String>,
}

/// A process model variable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProcessVariable {
    /// Variable name, the set key.
    pub name: String,
    /// Variable type.
    pub var_type: String,
    /// Default value expression, if any.
    pub default: Option<String>,
}

/// Canonical view for Process Model objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessModelView {
    /// Node set, keyed by node uuid.
    pub nodes: BTreeSet<ProcessNode>,
    /// Flow set.
    pub flows: BTreeSet<ProcessFlow>,
    /// Variable set, keyed by name.
    pub variables: BTreeSet<ProcessVariable>,
}

/// A record type field.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Field {
    /// Field name, the set key.
    pub name: String,
    /// Field data type.
    pub field_type: String,
}

/// A record type relationship.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Relationship {
    /// Relationship name, the set key.
    pub name: String,
    /// Related record type uuid.
    pub related_uuid: String,
}

/// Canonical view for Record Type objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordTypeView {
    /// Field set.
    pub fields: BTreeSet<Field>,
    /// Relationship set.
    pub relationships: BTreeSet<Relationship>,
    /// View name set.
    pub views: BTreeSet<String>,
    /// Record action name set.
    pub actions: BTreeSet<String>,
}

/// Canonical view for CDT objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CdtView {
    /// Field set (name + type only, per spec §4.4).
    pub fields: BTreeSet<Field>,
}

/// Canonical view for Constant objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantView {
    /// Constant value, serialized as a canonical JSON value.
    pub value: serde_json::Value,
    /// Constant data type.
    pub data_type: String,
    /// Constant scope (e.g. application, plugin).
    pub scope: String,
}

/// A single page hierarchy node for Site objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SitePage {
    /// Page uuid.
    pub uuid: String,
    /// Page display name.
    pub name: String,
    /// Nested child pages, in semantic display order (not set-compared).
    pub children: Vec<SitePage>,
}

/// Canonical view for Site objects. Page order is semantically significant
/// (it is the navigation order shown to users), so it is a `Vec`, not a set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteView {
    /// Top-level page hierarchy, in display order.
    pub pages: Vec<SitePage>,
}

/// Canonical view for Group objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupView {
    /// Parent group uuid, if any.
    pub parent_uuid: Option<String>,
    /// Member identifiers (user or group), as a sorted set.
    pub members: BTreeSet<String>,
}

/// Canonical view for Integration and Web API objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationView {
    /// Formatted SAIL expression body, if this object has one.
    pub code: String,
    /// Endpoint URL template.
    pub endpoint: String,
    /// Supported HTTP methods, as a sorted set.
    pub methods: BTreeSet<String>,
    /// Authentication descriptor (scheme name and non-secret parameters).
    pub auth_descriptor: String,
}

/// Canonical view for Interface objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceView {
    /// Formatted SAIL code body.
    pub code: String,
    /// Sorted parameter name + type list.
    pub parameters: BTreeSet<Field>,
    /// Security descriptor (rule input security, exposed roles, ...).
    pub security: String,
}

/// Canonical view for Expression Rule objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpressionRuleView {
    /// Formatted SAIL code body.
    pub code: String,
    /// Sorted input name + type list.
    pub inputs: BTreeSet<Field>,
    /// Declared output type.
    pub output_type: String,
}

/// Canonical view for Connected System objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedSystemView {
    /// Connected system type (e.g. database, LDAP, SMTP).
    pub system_type: String,
    /// Sorted property map (secrets are never stored in plain content views).
    pub properties: BTreeMap<String, String>,
}

/// Canonical view for Data Store objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataStoreView {
    /// Sorted entity name set.
    pub entities: BTreeSet<String>,
}

/// Tagged union of all per-object-type canonical views (spec §4.4).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ContentView {
    /// Interface comparison view.
    Interface(InterfaceView),
    /// Expression rule comparison view.
    ExpressionRule(ExpressionRuleView),
    /// Integration / web API comparison view.
    Integration(IntegrationView),
    /// Process model comparison view.
    ProcessModel(ProcessModelView),
    /// Record type comparison view.
    RecordType(RecordTypeView),
    /// CDT comparison view.
    Cdt(CdtView),
    /// Constant comparison view.
    Constant(ConstantView),
    /// Site comparison view.
    Site(SiteView),
    /// Group comparison view.
    Group(GroupView),
    /// Connected system comparison view.
    ConnectedSystem(ConnectedSystemView),
    /// Data store comparison view.
    DataStore(DataStoreView),
    /// Unknown objects compare as raw bytes.
    Unknown(Vec<u8>),
}

impl ContentView {
    /// Returns the formatted SAIL code embedded in this view, if any.
    #[must_use]
    pub fn scripted_code(&self) -> Option<&str> {
        match self {
            Self::Interface(view) => Some(&view.code),
            Self::ExpressionRule(view) => Some(&view.code),
            Self::Integration(view) => Some(&view.code),
            _ => None,
        }
    }

    /// Returns a copy of this view with its scripted code replaced, used by
    /// the Content Canonicalizer to splice in SAIL-Formatter output after all
    /// three packages are parsed (spec §4.3, §4.4). A no-op for view kinds
    /// that carry no code.
    #[must_use]
    pub fn with_code(&self, code: String) -> Self {
        match self {
            Self::Interface(view) => Self::Interface(InterfaceView { code, ..view.clone() }),
            Self::ExpressionRule(view) => {
                Self::ExpressionRule(ExpressionRuleView { code, ..view.clone() })
            }
            Self::Integration(view) => Self::Integration(IntegrationView { code, ..view.clone() }),
            other => other.clone(),
        }
    }
}
