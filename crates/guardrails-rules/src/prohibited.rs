//! Prohibited-pattern family: platform coupling in executable code.
//!
//! Scans code and MDX anywhere in the repository outside the shared
//! exclusions, root config files included. Uses the specifier tokenizer
//! instead of free-text matching, so prose that merely mentions a package
//! name is not flagged:
//!
//! ```text
//! import { db } from "@scientia/db";        // e1-db-reach-through
//! const core = require("scientia-platform"); // e1-platform-import
//! ```

use guardrails_core::{FamilyId, Rule, RuleFamily, ToolError};

use crate::options::FamilyOptions;
use crate::scope::base_scope;

/// Family identifier.
pub const ID: FamilyId = FamilyId::ProhibitedPattern;

/// Report title.
pub const TITLE: &str = "Guardrails: Prohibited platform coupling (E1)";

/// Rule id for platform DB client imports.
pub const DB_RULE: &str = "e1-db-reach-through";

/// Rule id for platform module and namespace imports.
pub const IMPORT_RULE: &str = "e1-platform-import";

/// Module names that are forbidden outright.
pub const DENY_MODULES: &[&str] = &["scientia-platform"];

/// Platform-internal namespaces.
pub const DENY_NAMESPACES: &[&str] = &["@scientia/", "@radixos/", "@solum/"];

/// Platform persistence clients.
pub const DB_CLIENTS: &[&str] = &["@scientia/db", "@radixos/db", "@solum/db"];

/// Executable source types, plus MDX (which can carry imports).
pub const EXTENSIONS: &[&str] = &[".js", ".mjs", ".cjs", ".ts", ".tsx", ".jsx", ".mdx"];

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Builds the prohibited-pattern family.
///
/// # Errors
///
/// Returns a [`ToolError`] if a configured pattern fails to compile.
pub fn family(options: &FamilyOptions) -> Result<RuleFamily, ToolError> {
    let scope = base_scope(&[""]).extensions(EXTENSIONS.iter().copied());
    let family = RuleFamily::new(ID, TITLE, scope)
        .rule(Rule::specifiers(
            DB_RULE,
            "Platform DB client import",
            "Marketing repo must not contain platform persistence dependencies.",
            owned(DB_CLIENTS),
            Vec::new(),
        ))
        .rule(Rule::specifiers(
            IMPORT_RULE,
            "Platform coupling import",
            "Remove platform coupling. Marketing repo must remain standalone.",
            owned(DENY_MODULES),
            owned(DENY_NAMESPACES),
        ));
    options.apply(family)
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardrails_core::{FileRecord, Report, RuleEngine};

    fn scan(path: &str, content: &str) -> Report {
        RuleEngine::builder()
            .family(family(&FamilyOptions::default()).unwrap())
            .build()
            .scan(TITLE, &[FileRecord::inline(path, content)])
    }

    #[test]
    fn db_client_import_is_reach_through() {
        let report = scan("src/lib/data.ts", r#"import { client } from "@solum/db";"#);
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].rule, DB_RULE);
    }

    #[test]
    fn namespace_and_module_imports_are_flagged() {
        let report = scan(
            "src/lib/x.mjs",
            "const p = require('scientia-platform');\nexport * from '@radixos/ui';\nconst m = await import(\"@scientia/engine\");",
        );
        let rules: Vec<&str> = report.findings.iter().map(|f| f.rule.as_str()).collect();
        assert_eq!(rules, vec![IMPORT_RULE, IMPORT_RULE, IMPORT_RULE]);
    }

    #[test]
    fn mdx_imports_are_scanned() {
        let report = scan("content/post.mdx", r#"import Chart from "@scientia/charts""#);
        assert_eq!(report.findings.len(), 1);
    }

    #[test]
    fn prose_and_non_code_files_are_ignored() {
        assert!(scan("src/copy.ts", "// we never import from scientia-platform").is_clean());
        assert!(scan("content/post.md", r#"import x from "@scientia/db""#).is_clean());
        assert!(scan("scripts/guardrails/e1.mjs", r#"import x from "@scientia/db""#).is_clean());
        assert!(scan("node_modules/x/index.js", r#"import x from "@scientia/db""#).is_clean());
    }

    #[test]
    fn code_outside_content_and_src_is_scanned() {
        for path in ["tailwind.config.ts", "tooling/sync.ts", "lib/db.ts", "app/page.tsx"] {
            let report = scan(path, r#"import x from "@scientia/db""#);
            assert_eq!(report.findings.len(), 1, "{path}");
            assert_eq!(report.findings[0].rule, DB_RULE);
        }
    }
}
