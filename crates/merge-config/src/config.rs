// crates/merge-config/src/config.rs
// ============================================================================
// Module: Merge Analyzer Configuration
// Description: Configuration loading and validation for the merge analyzer.
// Purpose: Provide strict, fail-closed config parsing with sane hard limits.
// Dependencies: serde, toml
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "merge-analyzer.toml";
/// Environment variable used to override the config path.
pub(crate) const CONFIG_ENV_VAR: &str = "MERGE_ANALYZER_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum total path length accepted for any configured path.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;

/// Default package size cap (spec §4.1, §6): 100 MB.
const DEFAULT_MAX_PACKAGE_BYTES: u64 = 100 * 1024 * 1024;
/// Hard ceiling on the package size cap; a configured value above this is
/// rejected rather than silently clamped.
const MAX_MAX_PACKAGE_BYTES: u64 = 10 * 1024 * 1024 * 1024;
/// Default per-step timeout (spec §4.12, §5): 5 minutes.
const DEFAULT_STEP_TIMEOUT_SECS: u64 = 5 * 60;
/// Minimum accepted per-step timeout.
const MIN_STEP_TIMEOUT_SECS: u64 = 1;
/// Maximum accepted per-step timeout.
const MAX_STEP_TIMEOUT_SECS: u64 = 60 * 60;
/// Default unified-diff context line count (spec §4.10): 3.
const DEFAULT_DIFF_CONTEXT_LINES: usize = 3;
/// Maximum accepted unified-diff context line count.
const MAX_DIFF_CONTEXT_LINES: usize = 100;

// ============================================================================
// SECTION: Configuration Type
// ============================================================================

/// Runtime configuration for the merge analyzer core (spec §6).
#[derive(Debug, Clone, Deserialize)]
pub struct MergeConfig {
    /// Maximum accepted package ZIP size, in bytes (spec §4.1).
    #[serde(default = "default_max_package_bytes")]
    pub max_package_bytes: u64,
    /// Per-pipeline-step wall-clock timeout, in seconds (spec §4.12, §5).
    #[serde(default = "default_step_timeout_secs")]
    pub step_timeout_secs: u64,
    /// Default context line count for unified-diff hunks (spec §4.10).
    #[serde(default = "default_diff_context_lines")]
    pub diff_context_lines: usize,
    /// Path to the frozen SAIL public-function mapping table JSON asset
    /// (spec §4.3). When unset, the formatter falls back to its embedded
    /// default table.
    #[serde(default)]
    pub sail_mapping_table_path: Option<PathBuf>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            max_package_bytes: default_max_package_bytes(),
            step_timeout_secs: default_step_timeout_secs(),
            diff_context_lines: default_diff_context_lines(),
            sail_mapping_table_path: None,
        }
    }
}

impl MergeConfig {
    /// Loads configuration from disk using the default resolution rules:
    /// explicit `path`, then `MERGE_ANALYZER_CONFIG`, then
    /// `./merge-analyzer.toml`. Returns defaults if no file exists at the
    /// resolved location and no path was explicitly requested.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when an explicitly-requested file cannot be
    /// read, exceeds the size cap, is not valid TOML, or fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        if path.is_none() && env::var(CONFIG_ENV_VAR).is_err() && !resolved.exists() {
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        }
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self = toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a field is out of its accepted range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_package_bytes == 0 || self.max_package_bytes > MAX_MAX_PACKAGE_BYTES {
            return Err(ConfigError::Invalid("max_package_bytes out of range".to_string()));
        }
        if self.step_timeout_secs < MIN_STEP_TIMEOUT_SECS
            || self.step_timeout_secs > MAX_STEP_TIMEOUT_SECS
        {
            return Err(ConfigError::Invalid(format!(
                "step_timeout_secs must be between {MIN_STEP_TIMEOUT_SECS} and \
                 {MAX_STEP_TIMEOUT_SECS}",
            )));
        }
        if self.diff_context_lines > MAX_DIFF_CONTEXT_LINES {
            return Err(ConfigError::Invalid("diff_context_lines too large".to_string()));
        }
        if let Some(path) = &self.sail_mapping_table_path {
            validate_path_string("sail_mapping_table_path", &path.to_string_lossy())?;
        }
        Ok(())
    }

    /// Returns the per-step timeout as a [`std::time::Duration`].
    #[must_use]
    pub const fn step_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.step_timeout_secs)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates the resolved path against security limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    Ok(())
}

const fn default_max_package_bytes() -> u64 {
    DEFAULT_MAX_PACKAGE_BYTES
}

const fn default_step_timeout_secs() -> u64 {
    DEFAULT_STEP_TIMEOUT_SECS
}

const fn default_diff_context_lines() -> usize {
    DEFAULT_DIFF_CONTEXT_LINES
}

// ============================================================================
// SECTION: Tests
// ============================================================================
