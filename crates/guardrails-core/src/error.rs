//! Tool-failure taxonomy.
//!
//! A [`ToolError`] means the tooling could not produce a trustworthy answer
//! (unreadable input, broken subprocess, malformed structured data). It is
//! never downgraded to "no findings". Policy outcomes are carried by
//! [`crate::Report`] instead.

use miette::Diagnostic;
use std::path::PathBuf;

/// Prefix for every line reporting a failure of the tooling itself.
pub const TOOL_FAILURE_PREFIX: &str = "guardrails: tool failure:";

/// Prefix for every line reporting a real policy violation.
pub const POLICY_FAILURE_PREFIX: &str = "guardrails: policy failure:";

/// Failures of the guardrail tooling (as opposed to policy violations).
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum ToolError {
    /// A required input file could not be read.
    #[error("failed to read {path}: {source}")]
    #[diagnostic(
        code(guardrails::read),
        help("check that the file exists and is readable from the repository root")
    )]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A required input file does not exist.
    #[error("{path} not found")]
    #[diagnostic(code(guardrails::missing_input))]
    MissingInput {
        /// Path that was expected.
        path: PathBuf,
        /// Corrective instruction.
        #[help]
        help: String,
    },

    /// A collaborator process could not be started.
    #[error("failed to run `{command}`: {source}")]
    #[diagnostic(
        code(guardrails::spawn),
        help("make sure the program is installed and on PATH")
    )]
    Spawn {
        /// Command line that failed.
        command: String,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// A collaborator process exited unsuccessfully.
    #[error("`{command}` exited with {status}: {stderr}")]
    #[diagnostic(code(guardrails::command_failed))]
    CommandFailed {
        /// Command line that failed.
        command: String,
        /// Exit status description.
        status: String,
        /// Truncated stderr of the process.
        stderr: String,
        /// Corrective instruction.
        #[help]
        help: Option<String>,
    },

    /// A collaborator process wrote more than the buffer cap.
    #[error("`{command}` produced more than {limit} bytes of output")]
    #[diagnostic(
        code(guardrails::output_too_large),
        help("raise `scan.max_subprocess_bytes` in guardrails.toml; truncated output is never trusted")
    )]
    OutputTooLarge {
        /// Command line that overflowed.
        command: String,
        /// Configured cap in bytes.
        limit: usize,
    },

    /// Structured input (JSON manifest, contract, graph) failed to parse.
    #[error("invalid {what}: {message}")]
    #[diagnostic(code(guardrails::parse))]
    Parse {
        /// What was being parsed (e.g., "JSON in package.json").
        what: String,
        /// Parser message.
        message: String,
        /// Corrective instruction.
        #[help]
        help: Option<String>,
    },

    /// Configuration is invalid.
    #[error("configuration error: {0}")]
    #[diagnostic(
        code(guardrails::config),
        help("fix guardrails.toml or run `guardrails init --force` to regenerate it")
    )]
    Config(String),

    /// A rule pattern failed to compile.
    #[error("invalid pattern for rule `{rule}`: {source}")]
    #[diagnostic(code(guardrails::pattern))]
    Pattern {
        /// Rule identifier owning the pattern.
        rule: String,
        /// Regex compilation error.
        source: regex::Error,
    },
}

impl ToolError {
    /// Convenience constructor for parse failures without a help text.
    #[must_use]
    pub fn parse(what: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Parse {
            what: what.into(),
            message: message.to_string(),
            help: None,
        }
    }

    /// Renders the error as prefixed lines, including the corrective instruction.
    #[must_use]
    pub fn render(&self) -> String {
        let mut output = format!("{TOOL_FAILURE_PREFIX} {self}");
        if let Some(help) = self.help() {
            output.push_str(&format!("\n{TOOL_FAILURE_PREFIX} action: {help}"));
        }
        output
    }
}

impl From<crate::config::ConfigError> for ToolError {
    fn from(e: crate::config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
