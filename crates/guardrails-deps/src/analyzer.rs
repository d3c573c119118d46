//! Boundary analyzer: combines manifest, lockfile and graph checks.

use std::collections::BTreeSet;
use std::fmt::Write;
use std::path::{Path, PathBuf};

use tracing::info;

use guardrails_core::{Finding, Report, Severity, ToolError};

use crate::graph::{DependencyGraph, GraphViolation};
use crate::lockfile::{scan_lockfile, LockfileScan};
use crate::manifest::{check_manifest, ManifestHit, ManifestHitKind};
use crate::pnpm::{ChainExplainer, GraphSource};
use crate::spec::{BoundarySpec, DOC_POINTER, RULE_ID, TITLE};

/// Family tag on boundary findings.
pub const FAMILY: &str = "boundary";

const REMEDIATION: &str = "Remove any direct or transitive dependency that originates from \
forbidden platform/IP roots. Replace upstream packages that pull forbidden namespaces, remove \
workspace:* indirection that maps to forbidden roots, and remove git/url deps or vendored \
packages that resolve back to scientia-platform or @scientia/* internals. Re-run locally with: \
\"pnpm install --frozen-lockfile && guardrails boundary\".";

/// Outcome of one boundary analysis.
#[derive(Debug, Clone)]
pub struct BoundaryReport {
    /// Manifest path as shown in reports.
    pub manifest: String,
    /// Lockfile path as shown in reports.
    pub lockfile: String,
    /// Package manager named in chain explanations.
    pub package_manager: String,
    /// Flagged manifest entries.
    pub manifest_hits: Vec<ManifestHit>,
    /// Lockfile names and origin hits.
    pub lockfile_scan: LockfileScan,
    /// Forbidden packages reached in the resolved graph.
    pub violations: Vec<GraphViolation>,
}

impl BoundaryReport {
    /// Runs the three checks on already-loaded inputs.
    ///
    /// # Errors
    ///
    /// Returns a [`ToolError`] if the manifest is malformed or a forbidden
    /// prefix cannot be compiled.
    pub fn analyze(
        manifest_text: &str,
        lockfile_text: &str,
        graph: &DependencyGraph,
        spec: &BoundarySpec,
    ) -> Result<Self, ToolError> {
        let report = Self {
            manifest: display(&spec.manifest),
            lockfile: display(&spec.lockfile),
            package_manager: spec.package_manager.clone(),
            manifest_hits: check_manifest(manifest_text, spec)?,
            lockfile_scan: scan_lockfile(lockfile_text, spec)?,
            violations: graph.violations(spec),
        };
        info!(
            violations = report.violations.len(),
            origins = report.lockfile_scan.origins.len(),
            manifest_hits = report.manifest_hits.len(),
            failure = report.is_failure(),
            "boundary analysis complete"
        );
        Ok(report)
    }

    /// Hard failure: a graph violation, or a hard origin marker in the lockfile.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        !self.violations.is_empty() || self.lockfile_scan.has_hard_origin()
    }

    /// Distinct forbidden packages found in the graph, sorted.
    #[must_use]
    pub fn offending_packages(&self) -> Vec<&str> {
        self.violations
            .iter()
            .map(|v| v.package.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn hits(&self, kind: ManifestHitKind) -> impl Iterator<Item = &ManifestHit> {
        self.manifest_hits.iter().filter(move |h| h.kind == kind)
    }

    /// Uniform findings. Only graph violations and hard origins are errors.
    #[must_use]
    pub fn to_report(&self) -> Report {
        let mut report = Report::new(TITLE);
        report.files_checked = 2;

        let finding = |severity: Severity, file: &str, message: String| {
            Finding::new(RULE_ID, FAMILY, severity, file, message).with_doc_ref(DOC_POINTER)
        };

        for v in &self.violations {
            report.findings.push(
                finding(
                    Severity::Error,
                    &self.lockfile,
                    format!("forbidden package `{}` resolved: {}", v.package, v.chain_text()),
                )
                .with_hint("Replace or remove the upstream package that pulls it in."),
            );
        }
        for hit in &self.lockfile_scan.origins {
            let severity = if hit.hard {
                Severity::Error
            } else if hit.git_indicator {
                Severity::Info
            } else {
                Severity::Warning
            };
            report.findings.push(
                finding(severity, &self.lockfile, hit.describe(&self.lockfile)).at_line(hit.line),
            );
        }
        for name in &self.lockfile_scan.names {
            report.findings.push(finding(
                Severity::Warning,
                &self.lockfile,
                format!("forbidden package name in lockfile text: {name}"),
            ));
        }
        for hit in &self.manifest_hits {
            let (severity, message) = match hit.kind {
                ManifestHitKind::Forbidden => (
                    Severity::Warning,
                    format!("forbidden dependency declared: {}", hit.entry()),
                ),
                ManifestHitKind::WorkspaceIndirection => (
                    Severity::Info,
                    format!("workspace:* indirection (review for forbidden mapping): {}", hit.entry()),
                ),
                ManifestHitKind::GitReference => (
                    Severity::Info,
                    format!("git/url dependency spec (must not resolve to forbidden roots): {}", hit.entry()),
                ),
            };
            report
                .findings
                .push(finding(severity, &self.manifest, message));
        }

        report.sort();
        report
    }

    /// Human-readable report.
    ///
    /// On failure, each offending package is explained through `explainer`
    /// when one is given.
    #[must_use]
    pub fn render_text(&self, explainer: Option<&dyn ChainExplainer>) -> String {
        let count = self.to_report().findings.len();
        if count == 0 {
            return format!("✅ {TITLE}: no findings\n");
        }

        let mut out = if self.is_failure() {
            format!("❌ {TITLE}: {count} finding(s)\n")
        } else {
            format!("⚠️ {TITLE}: {count} advisory finding(s), review only\n")
        };

        let mut section = |heading: &str, items: Vec<String>| {
            if !items.is_empty() {
                let _ = write!(out, "\n{heading}\n");
                for item in items {
                    let _ = writeln!(out, "- {item}");
                }
            }
        };

        section(
            "Resolved forbidden package name(s):",
            self.violations
                .iter()
                .map(|v| format!("{} via {}", v.package, v.chain_text()))
                .collect(),
        );
        section(
            "Forbidden-origin indicator(s):",
            self.lockfile_scan
                .origins
                .iter()
                .map(|h| h.describe(&self.lockfile))
                .collect(),
        );
        section(
            &format!("Forbidden package name(s) in {} text:", self.lockfile),
            self.lockfile_scan.names.clone(),
        );
        section(
            &format!("Forbidden dependency declaration(s) in {}:", self.manifest),
            self.hits(ManifestHitKind::Forbidden).map(ManifestHit::entry).collect(),
        );
        section(
            "workspace:* indirection present (review for forbidden mapping):",
            self.hits(ManifestHitKind::WorkspaceIndirection)
                .map(ManifestHit::entry)
                .collect(),
        );
        section(
            "git/url dependency spec present (must not resolve to forbidden roots):",
            self.hits(ManifestHitKind::GitReference)
                .map(ManifestHit::entry)
                .collect(),
        );

        let offending = self.offending_packages();
        if let Some(explainer) = explainer.filter(|_| !offending.is_empty()) {
            out.push_str("\nDependency chain (who pulled it in):\n");
            for package in offending {
                let _ = write!(
                    out,
                    "\n=== {} why {package} ===\n{}\n",
                    self.package_manager,
                    explainer.explain(package)
                );
            }
        }

        let _ = write!(out, "\nHow to comply:\n{REMEDIATION}\n\nCanonical doc: {DOC_POINTER}\n");
        out
    }
}

fn display(path: &Path) -> String {
    guardrails_core::normalize_path(&path.to_string_lossy())
}

/// Loads boundary inputs from a repository and analyzes them.
#[derive(Debug, Clone)]
pub struct BoundaryAnalyzer {
    root: PathBuf,
    spec: BoundarySpec,
}

impl BoundaryAnalyzer {
    /// Creates an analyzer for the repository at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, spec: BoundarySpec) -> Self {
        Self {
            root: root.into(),
            spec,
        }
    }

    /// Boundary spec in use.
    #[must_use]
    pub fn spec(&self) -> &BoundarySpec {
        &self.spec
    }

    fn read(&self, relative: &Path, missing_help: String) -> Result<String, ToolError> {
        let path = self.root.join(relative);
        std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                ToolError::MissingInput {
                    path: relative.to_path_buf(),
                    help: missing_help,
                }
            } else {
                ToolError::Read { path, source }
            }
        })
    }

    /// Reads the manifest and lockfile, loads the graph, and analyzes.
    ///
    /// # Errors
    ///
    /// Returns a [`ToolError`] for a missing or unreadable input, a failed
    /// graph load, or a malformed manifest.
    pub fn run(&self, source: &dyn GraphSource) -> Result<BoundaryReport, ToolError> {
        let manifest = self.read(
            &self.spec.manifest,
            "run guardrails from the repository root, or set `boundary.manifest`".to_string(),
        )?;
        let lockfile = self.read(
            &self.spec.lockfile,
            format!(
                "this repo must use {} for deterministic enforcement; run `pnpm install` and commit it (see {DOC_POINTER})",
                self.spec.lockfile.display()
            ),
        )?;
        let graph = source.load()?;
        BoundaryReport::analyze(&manifest, &lockfile, &graph, &self.spec)
    }
}
