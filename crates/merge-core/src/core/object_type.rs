// crates/merge-core/src/core/object_type.rs
//! The closed set of Appian object types (spec §3).

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Closed set of Appian object types participating in a merge analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    /// Interface object.
    Interface,
    /// Expression rule object.
    ExpressionRule,
    /// Process model object.
    ProcessModel,
    /// Record type object.
    RecordType,
    /// Custom data type object.
    Cdt,
    /// Constant object.
    Constant,
    /// Site object.
    Site,
    /// Group object.
    Group,
    /// Integration object.
    Integration,
    /// Web API object.
    WebApi,
    /// Connected system object.
    ConnectedSystem,
    /// Data store object.
    DataStore,
    /// Catch-all for unrecognized or malformed objects.
    Unknown,
}

impl ObjectType {
    /// Maps an Appian package archive directory name to its object type.
    /// Entries outside the recognized set yield [`ObjectType::Unknown`]
    /// (spec §4.1).
    #[must_use]
    pub fn from_archive_dir(dir: &str) -> Self {
        match dir {
            "interface" => Self::Interface,
            "rule" => Self::ExpressionRule,
            "processModel" => Self::ProcessModel,
            "recordType" => Self::RecordType,
            "cdt" => Self::Cdt,
            "constant" => Self::Constant,
            "site" => Self::Site,
            "group" => Self::Group,
            "integration" => Self::Integration,
            "webApi" => Self::WebApi,
            "connectedSystem" => Self::ConnectedSystem,
            "dataStore" => Self::DataStore,
            _ => Self::Unknown,
        }
    }

    /// Returns whether this object type carries a scripted (SAIL) code body.
    #[must_use]
    pub const fn has_scripted_code(self) -> bool {
        matches!(self, Self::Interface | Self::ExpressionRule | Self::Integration | Self::WebApi)
    }

    /// Stable display label, also used as the sort key for object-type grouping.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Interface => "Interface",
            Self::ExpressionRule => "Expression Rule",
            Self::ProcessModel => "Process Model",
            Self::RecordType => "Record Type",
            Self::Cdt => "CDT",
            Self::Constant => "Constant",
            Self::Site => "Site",
            Self::Group => "Group",
            Self::Integration => "Integration",
            Self::WebApi => "Web API",
            Self::ConnectedSystem => "Connected System",
            Self::DataStore => "Data Store",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_directories_map_to_unknown() {
        assert_eq!(ObjectType::from_archive_dir("pluginTemplate"), ObjectType::Unknown);
    }

    #[test]
    fn all_twelve_named_directories_resolve() {
        let dirs = [
            "interface",
            "rule",
            "processModel",
            "recordType",
            "cdt",
            "constant",
            "site",
            "group",
            "integration",
            "webApi",
            "connectedSystem",
            "dataStore",
        ];
        for dir in dirs {
            assert_ne!(ObjectType::from_archive_dir(dir), ObjectType::Unknown, "{dir}");
        }
    }
}
