//! Cross-repo family: lexical coupling to the internal platform codebase.
//!
//! Flags the platform repository slug, its internal package namespace and
//! internal package path segments, plus import statements and repository
//! URLs pointing at them. A line carrying `guardrails:allow-crossrepo` is
//! skipped.

use guardrails_core::{FamilyId, Rule, RuleFamily, ToolError};

use crate::options::FamilyOptions;
use crate::scope::base_scope;

/// Family identifier.
pub const ID: FamilyId = FamilyId::CrossRepo;

/// Report title.
pub const TITLE: &str = "Guardrails: Cross-repo import boundary";

/// Rule id for every cross-repo finding.
pub const RULE: &str = "cross-repo-import";

/// In-line marker that exempts a line from every family.
pub const ESCAPE_HATCH: &str = "guardrails:allow-crossrepo";

const HINT: &str = "Remove platform coupling. Marketing repo must remain standalone.";

/// Coupling substrings (case-insensitive).
pub const SUBSTRINGS: &[&str] = &[
    "scientia-platform",
    "digital-hooligan/scientia-platform",
    "@scientia/",
    "/packages/foundations",
    "/packages/auth",
    "/packages/audit",
    "/packages/evidence",
    "/packages/engine",
    "/packages/feature-flags",
    "/engines/",
];

/// Coupling regexes (case-insensitive).
pub const PATTERNS: &[&str] = &[
    r#"\bfrom\s+['"](@scientia/[^'"]+)['"]"#,
    r#"\bimport\s*\(\s*['"](@scientia/[^'"]+)['"]\s*\)"#,
    r"\bhttps?://github\.com/digital-hooligan/scientia-platform\b",
];

/// Builds the cross-repo family.
///
/// # Errors
///
/// Returns a [`ToolError`] if a pattern fails to compile.
pub fn family(options: &FamilyOptions) -> Result<RuleFamily, ToolError> {
    let family = RuleFamily::new(ID, TITLE, base_scope(&["content/", "src/"]))
        .rule(Rule::phrases(RULE, "Platform coupling", HINT, SUBSTRINGS))
        .rule(Rule::patterns(RULE, "Platform coupling", HINT, PATTERNS)?);
    options.apply(family)
}
