//! Core types for guardrail findings and reports.

use serde::{Deserialize, Serialize};

use crate::policy::Mode;

/// Maximum number of characters of a source line kept in a finding snippet.
pub const SNIPPET_MAX_CHARS: usize = 240;

/// Severity level for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Review-only indicator, never fails a run.
    Info,
    /// Should be looked at, never fails a run.
    Warning,
    /// Policy violation that fails the run in `error` mode.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(format!(
                "unknown severity `{other}`, expected: error, warning, info"
            )),
        }
    }
}

/// A single guardrail finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Stable rule identifier (e.g., "authority-keywords").
    pub rule: String,
    /// Rule family tag (e.g., "authority").
    pub family: String,
    /// Severity of this finding.
    pub severity: Severity,
    /// Repository-relative path, forward-slash separated.
    pub file: String,
    /// Line number (1-indexed); `None` for file-level findings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// Bounded excerpt of the offending line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// Human-readable message.
    pub message: String,
    /// Remediation hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Reference to governance documentation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_ref: Option<String>,
}

impl Finding {
    /// Creates a new finding without location details.
    #[must_use]
    pub fn new(
        rule: impl Into<String>,
        family: impl Into<String>,
        severity: Severity,
        file: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule: rule.into(),
            family: family.into(),
            severity,
            file: file.into(),
            line: None,
            snippet: None,
            message: message.into(),
            hint: None,
            doc_ref: None,
        }
    }

    /// Sets the 1-indexed line number.
    #[must_use]
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Stores a snippet, truncated to [`SNIPPET_MAX_CHARS`] characters.
    #[must_use]
    pub fn with_snippet(mut self, text: &str) -> Self {
        self.snippet = Some(truncate_chars(text, SNIPPET_MAX_CHARS));
        self
    }

    /// Adds a remediation hint.
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    /// Adds a documentation reference.
    #[must_use]
    pub fn with_doc_ref(mut self, doc_ref: impl Into<String>) -> Self {
        self.doc_ref = Some(doc_ref.into());
        self
    }

    /// `file` or `file:line`.
    #[must_use]
    pub fn location(&self) -> String {
        match self.line {
            Some(line) => format!("{}:{line}", self.file),
            None => self.file.clone(),
        }
    }

    /// Formats the finding as an indented report entry.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!("- {} [{}]\n", self.location(), self.rule);
        if let Some(snippet) = &self.snippet {
            let _ = writeln!(output, "  {snippet}");
        } else {
            let _ = writeln!(output, "  {}: {}", self.severity, self.message);
        }
        if let Some(hint) = &self.hint {
            let _ = writeln!(output, "  Hint: {hint}");
        }
        if let Some(doc_ref) = &self.doc_ref {
            let _ = writeln!(output, "  See: {doc_ref}");
        }
        output
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.location(),
            self.severity,
            self.rule,
            self.message
        )
    }
}

/// Truncates text to `max` characters on a char boundary.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Result of one scanner invocation.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Scanner title used in headers (e.g., "Guardrails: Cross-repo import boundary").
    pub title: String,
    /// All findings, in deterministic order.
    pub findings: Vec<Finding>,
    /// Number of files that were actually scanned.
    pub files_checked: usize,
}

impl Report {
    /// Creates an empty report with a title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Returns true when there is nothing to report at all.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// Returns true if any finding is a policy violation.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Error)
    }

    /// Counts findings by severity as `(errors, warnings, infos)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        let count = |s: Severity| self.findings.iter().filter(|f| f.severity == s).count();
        (
            count(Severity::Error),
            count(Severity::Warning),
            count(Severity::Info),
        )
    }

    /// Adds findings from another report.
    pub fn extend(&mut self, other: Self) {
        self.findings.extend(other.findings);
        self.files_checked += other.files_checked;
    }

    /// Sorts findings by file, then line. File-level findings come first.
    ///
    /// The sort is stable, so findings on the same line keep family order.
    pub fn sort(&mut self) {
        self.findings
            .sort_by(|a, b| a.file.cmp(&b.file).then(a.line.cmp(&b.line)));
    }

    /// Renders the human-readable report for the given exit mode.
    #[must_use]
    pub fn render(&self, mode: Mode) -> String {
        use std::fmt::Write;

        if self.is_clean() {
            return format!("✅ {} ({mode}): no findings\n", self.title);
        }

        let header = if !self.has_failures() || mode == Mode::Warn {
            "⚠️"
        } else {
            "❌"
        };

        let mut output = format!(
            "{header} {} ({mode}): {} finding(s)\n\n",
            self.title,
            self.findings.len()
        );
        for finding in &self.findings {
            output.push_str(&finding.format());
        }
        let (errors, warnings, infos) = self.count_by_severity();
        let _ = writeln!(
            output,
            "\nTotal: {errors} error(s), {warnings} warning(s), {infos} info(s) in {} file(s)",
            self.files_checked
        );
        output
    }
}
