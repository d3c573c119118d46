//! Exit policy: maps a report and the configured mode to a process exit code.

use serde::{Deserialize, Serialize};

use crate::types::Report;

/// Environment variable selecting the exit policy of lexical scanners.
pub const MODE_ENV_VAR: &str = "GUARDRAILS_MODE";

/// Whether findings block CI or are only observed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Print findings but exit 0.
    Warn,
    /// Exit 1 when any policy violation is found.
    #[default]
    Error,
}

impl Mode {
    /// Parses a mode value leniently: anything other than `warn`/`error`
    /// (case-insensitive) falls back to [`Mode::Error`].
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "warn" => Self::Warn,
            _ => Self::Error,
        }
    }

    /// Resolves the effective mode: `GUARDRAILS_MODE` wins over the
    /// configured value, which wins over the default (`error`).
    #[must_use]
    pub fn resolve(env_value: Option<&str>, configured: Option<Self>) -> Self {
        match env_value {
            Some(v) => Self::parse_lenient(v),
            None => configured.unwrap_or_default(),
        }
    }

    /// Reads [`MODE_ENV_VAR`] from the process environment.
    #[must_use]
    pub fn from_env(configured: Option<Self>) -> Self {
        let value = std::env::var(MODE_ENV_VAR).ok();
        Self::resolve(value.as_deref(), configured)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Maps a report to an exit code.
///
/// Zero findings, advisory-only findings, and `warn` mode all yield 0.
/// Policy violations in `error` mode yield 1.
#[must_use]
pub fn exit_code(report: &Report, mode: Mode) -> i32 {
    match mode {
        Mode::Error if report.has_failures() => 1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Finding, Severity};

    fn report_with(severity: Severity) -> Report {
        let mut report = Report::new("t");
        report.findings.push(Finding::new(
            "cross-repo-import",
            "cross-repo",
            severity,
            "src/app.ts",
            "coupling",
        ));
        report
    }

    #[test]
    fn unknown_mode_falls_back_to_error() {
        assert_eq!(Mode::parse_lenient("WARN"), Mode::Warn);
        assert_eq!(Mode::parse_lenient("observe"), Mode::Error);
        assert_eq!(Mode::parse_lenient(""), Mode::Error);
    }

    #[test]
    fn env_value_overrides_configured_mode() {
        assert_eq!(Mode::resolve(Some("warn"), Some(Mode::Error)), Mode::Warn);
        assert_eq!(Mode::resolve(None, Some(Mode::Warn)), Mode::Warn);
        assert_eq!(Mode::resolve(None, None), Mode::Error);
    }

    #[test]
    fn clean_report_exits_zero() {
        assert_eq!(exit_code(&Report::new("t"), Mode::Error), 0);
    }

    #[test]
    fn violations_exit_one_only_in_error_mode() {
        let report = report_with(Severity::Error);
        assert_eq!(exit_code(&report, Mode::Error), 1);
        assert_eq!(exit_code(&report, Mode::Warn), 0);
    }

    #[test]
    fn advisory_findings_never_fail() {
        assert_eq!(exit_code(&report_with(Severity::Info), Mode::Error), 0);
        assert_eq!(exit_code(&report_with(Severity::Warning), Mode::Error), 0);
    }
}
