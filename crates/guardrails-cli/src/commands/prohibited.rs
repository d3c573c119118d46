//! Prohibited coupling: code/copy families plus `package.json` dependencies.

use anyhow::Result;
use guardrails_core::{Finding, Report, Severity, ToolError};
use guardrails_deps::{check_manifest, BoundarySpec, ManifestHitKind};
use guardrails_rules::{prohibited, Preset};

use super::{output, scan, Context};
use crate::OutputFormat;

/// Root manifest checked for forbidden dependency names.
pub const MANIFEST: &str = "package.json";

/// Rule id of manifest-level findings.
pub const MANIFEST_RULE: &str = "e1-manifest-dependency";

/// Runs the `prohibited` command.
pub fn run(ctx: &Context, format: OutputFormat) -> Result<u8> {
    let mut report = scan::scan(ctx, Preset::Prohibited.families())?;
    report.title = prohibited::TITLE.to_string();
    if ctx.config.is_family_enabled(prohibited::ID.as_str()) {
        let severity = ctx
            .config
            .family_severity(prohibited::ID.as_str())
            .unwrap_or(Severity::Error);
        manifest_findings(ctx, severity, &mut report)?;
    }
    report.sort();
    output::print(&report, format, ctx.mode())
}

/// Adds one file-level finding per forbidden dependency declared in the
/// root manifest. A missing manifest contributes nothing.
fn manifest_findings(ctx: &Context, severity: Severity, report: &mut Report) -> Result<()> {
    let path = ctx.root.join(MANIFEST);
    if !path.is_file() {
        tracing::debug!("no {MANIFEST} at repository root, skipping manifest check");
        return Ok(());
    }
    let text = std::fs::read_to_string(&path).map_err(|source| ToolError::Read {
        path: path.clone(),
        source,
    })?;
    report.findings.extend(findings_for(&text, severity)?);
    report.files_checked += 1;
    Ok(())
}

fn findings_for(text: &str, severity: Severity) -> Result<Vec<Finding>, ToolError> {
    let spec = BoundarySpec {
        forbidden_exact: prohibited::DENY_MODULES.iter().map(|s| (*s).to_string()).collect(),
        forbidden_prefixes: prohibited::DENY_NAMESPACES
            .iter()
            .map(|s| (*s).to_string())
            .collect(),
        ..BoundarySpec::default()
    };
    Ok(check_manifest(text, &spec)?
        .into_iter()
        .filter(|hit| hit.kind == ManifestHitKind::Forbidden)
        .map(|hit| {
            Finding::new(
                MANIFEST_RULE,
                prohibited::ID.as_str(),
                severity,
                MANIFEST,
                format!("Forbidden platform dependency `{}` in {}", hit.resolved, hit.block),
            )
            .with_hint("Remove the dependency; the marketing site must not depend on platform packages.")
        })
        .collect())
}
