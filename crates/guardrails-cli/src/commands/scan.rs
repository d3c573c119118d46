//! Lexical scan commands (`authority`, `cross-repo`, `scan`).

use anyhow::Result;
use guardrails_core::{FamilyId, Report};

use super::{output, Context};
use crate::OutputFormat;

/// Title of a combined multi-family scan.
pub const COMBINED_TITLE: &str = "Guardrails: Lexical scan";

/// Runs the given families over the file universe and prints the report.
pub fn run(ctx: &Context, ids: &[FamilyId], format: OutputFormat) -> Result<u8> {
    let report = scan(ctx, ids)?;
    output::print(&report, format, ctx.mode())
}

/// Builds the engine for `ids` and scans the repository.
pub fn scan(ctx: &Context, ids: &[FamilyId]) -> Result<Report> {
    let engine = guardrails_rules::engine(ids, &ctx.config)?;
    let files = ctx.files()?;
    tracing::info!(
        "Scanning {} file(s) with {} family(ies)",
        files.len(),
        engine.families().len()
    );
    Ok(engine.scan(title(ids), &files))
}

fn title(ids: &[FamilyId]) -> &'static str {
    match ids {
        [single] => guardrails_rules::title(*single),
        _ => COMBINED_TITLE,
    }
}
