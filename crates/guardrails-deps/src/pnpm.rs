//! Package-manager collaborators.
//!
//! [`GraphSource`] is the seam between the analyzer and wherever the
//! resolved graph comes from. [`ChainExplainer`] answers "who pulled this
//! package in" for the failure report.

use std::path::{Path, PathBuf};

use tracing::debug;

use guardrails_core::process::run_capped;
use guardrails_core::truncate_chars;
use guardrails_core::ToolError;

use crate::graph::DependencyGraph;

/// Lines of `why` output kept per package.
const WHY_MAX_LINES: usize = 30;

/// Characters of a failing `why` call's error kept in the report.
const WHY_ERROR_MAX_CHARS: usize = 400;

/// Produces the resolved dependency graph.
pub trait GraphSource {
    /// Loads the graph.
    ///
    /// # Errors
    ///
    /// Returns a [`ToolError`] if the graph cannot be obtained or parsed.
    fn load(&self) -> Result<DependencyGraph, ToolError>;
}

/// Explains how a package entered the graph.
pub trait ChainExplainer {
    /// Short explanation for `package`. Failures are rendered inline rather
    /// than returned, so they never mask the policy result.
    fn explain(&self, package: &str) -> String;
}

/// The `pnpm` command line.
#[derive(Debug, Clone)]
pub struct PnpmCli {
    program: String,
    root: PathBuf,
    max_output_bytes: usize,
}

impl PnpmCli {
    /// Creates a collaborator running `program` in `root`.
    #[must_use]
    pub fn new(program: impl Into<String>, root: impl Into<PathBuf>, max_output_bytes: usize) -> Self {
        Self {
            program: program.into(),
            root: root.into(),
            max_output_bytes,
        }
    }

    fn run(&self, args: &[&str]) -> Result<String, ToolError> {
        let out = run_capped(&self.program, args, &self.root, self.max_output_bytes)?;
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

impl GraphSource for PnpmCli {
    fn load(&self) -> Result<DependencyGraph, ToolError> {
        let json = self
            .run(&["list", "--recursive", "--depth", "Infinity", "--json"])
            .map_err(|e| match e {
                ToolError::CommandFailed {
                    command,
                    status,
                    stderr,
                    ..
                } => ToolError::CommandFailed {
                    command,
                    status,
                    stderr,
                    help: Some("run `pnpm install --frozen-lockfile` first".to_string()),
                },
                other => other,
            })?;
        DependencyGraph::from_pnpm_json(&json)
    }
}

impl ChainExplainer for PnpmCli {
    fn explain(&self, package: &str) -> String {
        debug!(package, "explaining dependency chain");
        match self.run(&["why", "--filter", ".", package]) {
            Ok(out) => first_lines(out.trim(), WHY_MAX_LINES),
            Err(e) => format!(
                "{} why failed for \"{package}\" (truncated): {}...",
                self.program,
                truncate_chars(&e.to_string(), WHY_ERROR_MAX_CHARS)
            ),
        }
    }
}

fn first_lines(text: &str, max: usize) -> String {
    text.lines().take(max).collect::<Vec<_>>().join("\n")
}

/// A saved `pnpm list --json` document.
#[derive(Debug, Clone)]
pub struct GraphFile {
    path: PathBuf,
}

impl GraphFile {
    /// Creates a source reading `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl GraphSource for GraphFile {
    fn load(&self) -> Result<DependencyGraph, ToolError> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ToolError::MissingInput {
                    path: self.path.clone(),
                    help: "save one with `pnpm list --recursive --depth Infinity --json > graph.json`"
                        .to_string(),
                }
            } else {
                ToolError::Read {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;
        DependencyGraph::from_pnpm_json(&text)
    }
}

impl GraphSource for DependencyGraph {
    fn load(&self) -> Result<DependencyGraph, ToolError> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn graph_file_loads_saved_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph.json");
        std::fs::write(&path, r#"[{"name": "site", "version": "1.0.0"}]"#).unwrap();
        let graph = GraphFile::new(&path).load().unwrap();
        assert_eq!(graph.roots().len(), 1);
    }

    #[test]
    fn missing_graph_file_is_missing_input() {
        let dir = TempDir::new().unwrap();
        let err = GraphFile::new(dir.path().join("nope.json")).load().unwrap_err();
        assert!(matches!(err, ToolError::MissingInput { .. }));
    }

    #[test]
    fn first_lines_caps_output() {
        let text = (1..=40).map(|n| n.to_string()).collect::<Vec<_>>().join("\n");
        let kept = first_lines(&text, WHY_MAX_LINES);
        assert_eq!(kept.lines().count(), 30);
        assert!(kept.ends_with("30"));
    }

    #[test]
    fn failing_why_is_rendered_inline() {
        let cli = PnpmCli::new("guardrails-no-such-pm", ".", 1024);
        let text = cli.explain("@scientia/db");
        assert!(text.starts_with("guardrails-no-such-pm why failed for \"@scientia/db\" (truncated): "));
        assert!(text.ends_with("..."));
    }
}
