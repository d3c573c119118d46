//! Shared output formatting for reports.

use anyhow::Result;
use guardrails_core::{Mode, Report, POLICY_FAILURE_PREFIX};

use crate::OutputFormat;

/// Prints a lexical report and returns its exit code under `mode`.
pub fn print(report: &Report, format: OutputFormat, mode: Mode) -> Result<u8> {
    match format {
        OutputFormat::Text => print!("{}", report.render(mode)),
        OutputFormat::Json => print_json(report)?,
        OutputFormat::Compact => print_compact(report),
    }
    let code = guardrails_core::exit_code(report, mode);
    if code != 0 {
        let (errors, _, _) = report.count_by_severity();
        eprintln!("{POLICY_FAILURE_PREFIX} {}: {errors} violation(s)", report.title);
    }
    Ok(u8::from(code != 0))
}

/// Pretty JSON of the whole report.
pub fn print_json(report: &Report) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    println!("{json}");
    Ok(())
}

/// One line per finding.
pub fn print_compact(report: &Report) {
    for finding in &report.findings {
        println!("{}", compact_line(finding));
    }
}

fn compact_line(finding: &guardrails_core::Finding) -> String {
    format!(
        "{}: {} [{}] {}",
        finding.location(),
        finding.severity,
        finding.rule,
        finding.message
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardrails_core::{Finding, Severity};

    #[test]
    fn compact_line_has_location_severity_and_rule() {
        let finding = Finding::new(
            "cross-repo-import",
            "cross-repo",
            Severity::Error,
            "src/app.ts",
            "Platform coupling",
        )
        .at_line(3);
        assert_eq!(
            compact_line(&finding),
            "src/app.ts:3: error [cross-repo-import] Platform coupling"
        );
    }
}
