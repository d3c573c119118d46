//! Configuration types for guardrails.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::policy::Mode;
use crate::process::DEFAULT_MAX_OUTPUT_BYTES;
use crate::types::Severity;

/// Test-only environment variable widening the file universe to untracked files.
pub const INCLUDE_UNTRACKED_ENV_VAR: &str = "GUARDRAILS_INCLUDE_UNTRACKED";

/// Top-level configuration for guardrails.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Exit policy for lexical scanners (default: "error").
    #[serde(default)]
    pub mode: Option<Mode>,

    /// Extra in-line escape-hatch markers, added to the built-in ones.
    #[serde(default)]
    pub escape_hatches: Vec<String>,

    /// File-universe configuration.
    #[serde(default)]
    pub scan: ScanConfig,

    /// Per-family configurations, keyed by family id.
    #[serde(default)]
    pub families: HashMap<String, FamilyConfig>,

    /// Dependency boundary overrides.
    #[serde(default)]
    pub boundary: BoundarySection,

    /// Environment contract overrides.
    #[serde(default)]
    pub env: EnvSection,
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Checks if a rule family is enabled.
    #[must_use]
    pub fn is_family_enabled(&self, family: &str) -> bool {
        self.families
            .get(family)
            .map_or(true, |c| c.enabled.unwrap_or(true))
    }

    /// Gets the severity override for a family.
    #[must_use]
    pub fn family_severity(&self, family: &str) -> Option<Severity> {
        self.families.get(family).and_then(|c| c.severity)
    }

    /// Gets the configuration block of a family, if any.
    #[must_use]
    pub fn family(&self, family: &str) -> Option<&FamilyConfig> {
        self.families.get(family)
    }
}

/// File-universe configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Include untracked, non-ignored files in the universe.
    #[serde(default)]
    pub include_untracked: bool,

    /// Extra exclusions (path prefixes or globs) applied to every family.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Cap on captured subprocess stdout, in bytes.
    #[serde(default)]
    pub max_subprocess_bytes: Option<usize>,
}

impl ScanConfig {
    /// Effective subprocess buffer cap.
    #[must_use]
    pub fn max_output_bytes(&self) -> usize {
        self.max_subprocess_bytes.unwrap_or(DEFAULT_MAX_OUTPUT_BYTES)
    }

    /// Whether untracked files are scanned, given the value of
    /// [`INCLUDE_UNTRACKED_ENV_VAR`].
    #[must_use]
    pub fn include_untracked_with(&self, env_value: Option<&str>) -> bool {
        self.include_untracked || env_value.is_some_and(|v| v.trim() == "1")
    }
}

/// Per-family configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FamilyConfig {
    /// Whether this family is enabled.
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Severity override for findings of this family.
    #[serde(default)]
    pub severity: Option<Severity>,

    /// Family-specific options (`extra_phrases`, `include`, `guard_window`, ...).
    #[serde(flatten)]
    pub options: HashMap<String, toml::Value>,
}

impl FamilyConfig {
    /// Gets an option value as a specific type.
    #[must_use]
    pub fn get_option<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.options
            .get(key)
            .and_then(|v| v.clone().try_into().ok())
    }

    /// Gets a boolean option with a default value.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        self.options
            .get(key)
            .and_then(toml::Value::as_bool)
            .unwrap_or(default)
    }

    /// Gets an integer option with a default value.
    #[must_use]
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.options
            .get(key)
            .and_then(toml::Value::as_integer)
            .unwrap_or(default)
    }

    /// Gets a string array option.
    #[must_use]
    pub fn get_str_array(&self, key: &str) -> Vec<String> {
        self.options
            .get(key)
            .and_then(|v| v.as_array())
            .map(|arr| {
                arr.iter()
                    .filter_map(|v| v.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Gets a table of integers (e.g. `guard_window = { autonomy = 6 }`).
    #[must_use]
    pub fn get_int_table(&self, key: &str) -> HashMap<String, i64> {
        self.options
            .get(key)
            .and_then(toml::Value::as_table)
            .map(|table| {
                table
                    .iter()
                    .filter_map(|(k, v)| v.as_integer().map(|n| (k.clone(), n)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// `[boundary]` overrides. Unset fields keep the built-in boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoundarySection {
    /// Path of the dependency manifest (default: `package.json`).
    #[serde(default)]
    pub manifest: Option<PathBuf>,
    /// Path of the installed lockfile (default: `pnpm-lock.yaml`).
    #[serde(default)]
    pub lockfile: Option<PathBuf>,
    /// Package names that are forbidden outright.
    #[serde(default)]
    pub forbidden_exact: Option<Vec<String>>,
    /// Package namespace prefixes that are forbidden.
    #[serde(default)]
    pub forbidden_prefixes: Option<Vec<String>>,
    /// Substrings indicating a forbidden physical origin.
    #[serde(default)]
    pub origin_markers: Option<Vec<String>>,
    /// Origin markers that fail the run on their own.
    #[serde(default)]
    pub hard_markers: Option<Vec<String>>,
    /// Package manager executable (default: `pnpm`).
    #[serde(default)]
    pub package_manager: Option<String>,
}

/// `[env]` overrides. Unset fields keep the built-in file layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvSection {
    /// Path of the JSON contract (default: `env.contract.json`).
    #[serde(default)]
    pub contract: Option<PathBuf>,
    /// Path of the template (default: `.env.example`).
    #[serde(default)]
    pub template: Option<PathBuf>,
    /// Runtime env files, highest precedence first (default: `.env.local`, `.env`).
    #[serde(default)]
    pub env_files: Option<Vec<PathBuf>>,
    /// Values accepted as secret placeholders in the template.
    #[serde(default)]
    pub placeholders: Option<Vec<String>>,
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading config file.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Parse error in config file.
    #[error("Failed to parse config: {message}")]
    Parse {
        /// Parse error message.
        message: String,
    },

    /// Semantically invalid configuration.
    #[error("Invalid config: {message}")]
    Validation {
        /// What is wrong.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.mode.is_none());
        assert!(config.families.is_empty());
        assert!(config.is_family_enabled("authority"));
        assert_eq!(config.scan.max_output_bytes(), DEFAULT_MAX_OUTPUT_BYTES);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
mode = "warn"
escape_hatches = ["guardrails:allow-legal"]

[scan]
include_untracked = false
exclude = ["legacy/"]

[families.authority]
severity = "warning"
extra_phrases = ["runs itself"]
guard_window = { autonomy = 6 }

[families.cross-repo]
enabled = false

[boundary]
forbidden_prefixes = ["@scientia/", "@internal/"]

[env]
placeholders = ["__SECRET__"]
"#;

        let config = Config::parse(toml).expect("Failed to parse");
        assert_eq!(config.mode, Some(Mode::Warn));
        assert_eq!(config.escape_hatches, vec!["guardrails:allow-legal"]);
        assert_eq!(config.scan.exclude, vec!["legacy/"]);
        assert!(!config.is_family_enabled("cross-repo"));
        assert_eq!(config.family_severity("authority"), Some(Severity::Warning));

        let family = config.family("authority").expect("authority block");
        assert_eq!(family.get_str_array("extra_phrases"), vec!["runs itself"]);
        assert_eq!(family.get_int_table("guard_window").get("autonomy"), Some(&6));
        assert_eq!(
            config.boundary.forbidden_prefixes.as_deref(),
            Some(&["@scientia/".to_string(), "@internal/".to_string()][..])
        );
        assert!(config.boundary.manifest.is_none());
        assert_eq!(
            config.env.placeholders.as_deref(),
            Some(&["__SECRET__".to_string()][..])
        );
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = Config::parse("mode = [").expect_err("should fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn include_untracked_env_override() {
        let scan = ScanConfig::default();
        assert!(!scan.include_untracked_with(None));
        assert!(!scan.include_untracked_with(Some("0")));
        assert!(scan.include_untracked_with(Some("1")));
    }
}
