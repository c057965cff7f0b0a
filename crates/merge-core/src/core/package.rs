// crates/merge-core/src/core/package.rs
//! Package role tagging and the per-session package row (spec §3).

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::PackageId;
use crate::core::identifiers::SessionId;

/// Which of the three input packages a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageRole {
    /// The original vendor-shipped base (A).
    Base,
    /// The customer's current production state (B).
    Customized,
    /// The newer vendor release (C).
    NewVendor,
}

impl PackageRole {
    /// Human-readable label used in `PackageValidation` error messages
    /// (spec §7: "Messages for `PackageValidation` name the package").
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Base => "Base Package (A)",
            Self::Customized => "Customized Package (B)",
            Self::NewVendor => "New Vendor Package (C)",
        }
    }
}

impl fmt::Display for PackageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One of the three per-session input packages. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Row id, assigned on insert.
    pub id: PackageId,
    /// Owning session.
    pub session_id: SessionId,
    /// Role within the three-way comparison.
    pub role: PackageRole,
    /// Original uploaded filename.
    pub original_filename: String,
}
