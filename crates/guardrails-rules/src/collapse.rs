//! Authority-collapse family: product claims in copy sources.
//!
//! Scans `.md`/`.mdx` files under `content/` and `src/`. Governance
//! documentation is out of scope.

use guardrails_core::{FamilyId, Rule, RuleFamily, ToolError};

use crate::options::FamilyOptions;
use crate::scope::base_scope;

/// Family identifier.
pub const ID: FamilyId = FamilyId::AuthorityCollapse;

/// Report title.
pub const TITLE: &str = "Guardrails: Authority-collapse copy (E1)";

/// Rule id for every authority-collapse finding.
pub const RULE: &str = "e1-authority-collapse";

/// Claims that collapse human authority into a product.
pub const PHRASES: &[&str] = &[
    "Scientia will decide",
    "Scientia decides",
    "Scientia recommends",
    "Solum recommends",
    "RadixOS executes",
    "Custos decides",
    "automatic approval",
    "auto-approve",
    "we guarantee outcomes",
];

/// Copy source types.
pub const EXTENSIONS: &[&str] = &[".md", ".mdx"];

/// Builds the authority-collapse family.
///
/// # Errors
///
/// Returns a [`ToolError`] if a configured pattern fails to compile.
pub fn family(options: &FamilyOptions) -> Result<RuleFamily, ToolError> {
    let family = RuleFamily::new(ID, TITLE, base_scope(&["content/", "src/"]).extensions(EXTENSIONS.iter().copied()))
        .rule(Rule::phrases(
            RULE,
            "Authority-collapse marketing phrase",
            "Marketing copy must not imply system advisory/execution authority.",
            PHRASES,
        ));
    options.apply(family)
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardrails_core::{FileRecord, RuleEngine};

    #[test]
    fn flags_claims_in_copy_only() {
        let engine = RuleEngine::builder()
            .family(family(&FamilyOptions::default()).unwrap())
            .build();
        let report = engine.scan(
            TITLE,
            &[
                FileRecord::inline("content/pricing.md", "Every plan includes AUTO-APPROVE workflows."),
                FileRecord::inline("content/overview.mdx", "Scientia recommends next steps."),
                FileRecord::inline("docs/overview.md", "Scientia recommends next steps."),
                FileRecord::inline("src/copy.ts", "export const x = 'we guarantee outcomes';"),
            ],
        );
        let files: Vec<&str> = report.findings.iter().map(|f| f.file.as_str()).collect();
        assert_eq!(files, vec!["content/overview.mdx", "content/pricing.md"]);
        assert_eq!(report.findings[1].message, "Authority-collapse marketing phrase: \"auto-approve\"");
    }
}
