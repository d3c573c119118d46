//! Boundary command implementation.

use anyhow::Result;
use guardrails_core::POLICY_FAILURE_PREFIX;
use guardrails_deps::{
    BoundaryAnalyzer, BoundarySpec, ChainExplainer, GraphFile, GraphSource, PnpmCli, RULE_ID,
};
use std::path::Path;

use super::{output, Context};
use crate::OutputFormat;

/// Runs the boundary command. Always blocking: the exit mode does not apply.
pub fn run(ctx: &Context, format: OutputFormat, graph: Option<&Path>, explain: bool) -> Result<u8> {
    let spec = BoundarySpec::from_section(&ctx.config.boundary);
    let pnpm = PnpmCli::new(
        spec.package_manager.clone(),
        ctx.root.clone(),
        ctx.config.scan.max_output_bytes(),
    );
    let source: Box<dyn GraphSource> = match graph {
        Some(path) => {
            tracing::info!("Reading resolved graph from {}", path.display());
            Box::new(GraphFile::new(path))
        }
        None => Box::new(pnpm.clone()),
    };

    let analyzer = BoundaryAnalyzer::new(ctx.root.clone(), spec);
    let report = analyzer.run(source.as_ref())?;

    match format {
        OutputFormat::Text => {
            let explainer: Option<&dyn ChainExplainer> = if explain { Some(&pnpm) } else { None };
            print!("{}", report.render_text(explainer));
        }
        OutputFormat::Json => output::print_json(&report.to_report())?,
        OutputFormat::Compact => output::print_compact(&report.to_report()),
    }

    if report.is_failure() {
        let packages = report.offending_packages();
        if packages.is_empty() {
            eprintln!("{POLICY_FAILURE_PREFIX} {RULE_ID}: forbidden origin in lockfile");
        } else {
            eprintln!(
                "{POLICY_FAILURE_PREFIX} {RULE_ID}: forbidden package(s): {}",
                packages.join(", ")
            );
        }
        return Ok(1);
    }
    Ok(0)
}
