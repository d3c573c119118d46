//! Authority family: implied autonomy and decision-authority language.
//!
//! # Detected Patterns
//!
//! - Autonomy vocabulary ("fully autonomous", "self-directed", "agentic")
//! - Decision-authority phrases ("decides for you", "the system decides")
//! - Authority regexes ("AI-powered ... decision", "automatically ... executes")
//!
//! # Guards
//!
//! - `negated-autonomy`: "not/no/without/never ... autonomous" within 4 words
//! - `negated-authority-verb`: "not/no/... decide/execute/prioritize/determine"
//!   within 10 words
//!
//! # Scope
//!
//! `content/` and `src/`, minus the shared exclusions.

use guardrails_core::{FamilyId, GuardClass, NegationGuard, Rule, RuleFamily, ToolError};

use crate::options::FamilyOptions;
use crate::scope::base_scope;

/// Family identifier.
pub const ID: FamilyId = FamilyId::Authority;

/// Report title.
pub const TITLE: &str = "Guardrails: Authority / Implied Autonomy language";

/// Rule id for phrase matches.
pub const KEYWORD_RULE: &str = "authority-keywords";

/// Rule id for regex matches.
pub const REGEX_RULE: &str = "authority-regex";

/// Default window of the negated-autonomy guard, in words.
pub const AUTONOMY_WINDOW: usize = 4;

/// Default window of the negated-authority-verb guard, in words.
pub const AUTHORITY_VERB_WINDOW: usize = 10;

const KEYWORD_HINT: &str =
    "Use non-authoritative phrasing: \"surfaces signals\", \"structures context\", \"requires human decision\".";

const REGEX_HINT: &str = "Avoid implying autonomy/decision authority.";

/// Autonomy phrases, suppressible by the negated-autonomy guard.
pub const AUTONOMY_PHRASES: &[&str] = &[
    "fully autonomous",
    "autonomous",
    "self-directed",
    "self directed",
    "agentic",
];

/// Decision-authority phrases, suppressible by the negated-authority-verb guard.
pub const AUTHORITY_PHRASES: &[&str] = &[
    "auto-decide",
    "auto decide",
    "makes decisions",
    "make decisions",
    "decides for you",
    "decide for you",
    "automatically prioritizes",
    "automatically prioritise",
    "automatically executes",
    "automatically execute",
    "decision engine",
    "ai-powered decision",
    "ai powered decision",
    "ai-driven decision",
    "ai driven decision",
    "ai makes",
    "ai decides",
    "ai will decide",
    "the system decides",
    "it decides",
    "it will decide",
    "it determines",
];

/// Authority regexes (case-insensitive).
pub const PATTERNS: &[&str] = &[
    r"\bAI[-\s]?powered\b.*\b(decision|decide|prioritiz|execute)\b",
    r"\bAI[-\s]?driven\b.*\b(decision|decide|prioritiz|execute)\b",
    r"\bautomatically\b.*\b(decide|prioritiz|execute)\b",
    r"\b(the\s+system|platform|engine)\b.*\b(decides|prioritizes|executes)\b",
];

/// Trigger stems of the negated-authority-verb guard.
pub const AUTHORITY_VERB_TRIGGERS: &[&str] = &[
    "decide*",
    "decision*",
    "execut*",
    "prioritiz*",
    "prioritis*",
    "determin*",
    "make* decisions",
];

/// Builds the authority family.
///
/// # Errors
///
/// Returns a [`ToolError`] if a pattern fails to compile.
pub fn family(options: &FamilyOptions) -> Result<RuleFamily, ToolError> {
    let family = RuleFamily::new(ID, TITLE, base_scope(&["content/", "src/"]))
        .rule(
            Rule::phrases(KEYWORD_RULE, "Implied autonomy", KEYWORD_HINT, AUTONOMY_PHRASES)
                .guarded_by(GuardClass::Autonomy),
        )
        .rule(
            Rule::phrases(
                KEYWORD_RULE,
                "Implied decision authority",
                KEYWORD_HINT,
                AUTHORITY_PHRASES,
            )
            .guarded_by(GuardClass::AuthorityVerb),
        )
        .rule(
            Rule::patterns(REGEX_RULE, "Implied decision authority", REGEX_HINT, PATTERNS)?
                .guarded_by(GuardClass::AuthorityVerb),
        )
        .guard(
            NegationGuard::new(
                "negated-autonomy",
                GuardClass::Autonomy,
                options.window(GuardClass::Autonomy, AUTONOMY_WINDOW),
            )
            .triggers(["autonomous*"]),
        )
        .guard(
            NegationGuard::new(
                "negated-authority-verb",
                GuardClass::AuthorityVerb,
                options.window(GuardClass::AuthorityVerb, AUTHORITY_VERB_WINDOW),
            )
            .triggers(AUTHORITY_VERB_TRIGGERS),
        );
    options.apply(family)
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardrails_core::{FileRecord, Report, RuleEngine};

    fn scan(path: &str, content: &str) -> Report {
        let family = family(&FamilyOptions::default()).unwrap();
        RuleEngine::builder()
            .family(family)
            .build()
            .scan(TITLE, &[FileRecord::inline(path, content)])
    }

    fn rules(report: &Report) -> Vec<&str> {
        report.findings.iter().map(|f| f.rule.as_str()).collect()
    }

    #[test]
    fn detects_banned_phrases() {
        let report = scan("content/home.mdx", "A fully autonomous assistant.\nIt decides for you.");
        assert_eq!(rules(&report), vec![KEYWORD_RULE, KEYWORD_RULE]);
        assert_eq!(report.findings[0].message, "Implied autonomy: \"fully autonomous\"");
    }

    #[test]
    fn detects_regex_only_claims() {
        let report = scan("src/copy.ts", "const tagline = 'Our AI-powered engine will prioritize and decide';");
        assert_eq!(rules(&report), vec![REGEX_RULE]);
    }

    #[test]
    fn negated_statements_pass() {
        let report = scan(
            "content/legal.mdx",
            "This document does not claim the system decides outcomes.\nThe product is not autonomous.\nNo AI makes decisions here.",
        );
        assert!(report.is_clean(), "{:?}", report.findings);
    }

    #[test]
    fn affirmative_statement_fails() {
        let report = scan("content/home.mdx", "The system decides outcomes.");
        assert_eq!(report.findings.len(), 1);
        assert_eq!(
            report.findings[0].hint.as_deref(),
            Some(KEYWORD_HINT)
        );
    }

    #[test]
    fn autonomy_outside_the_short_window_still_fails() {
        let report = scan(
            "content/home.mdx",
            "We never ship features that would make it feel fully autonomous.",
        );
        assert_eq!(report.findings.len(), 1);
    }

    #[test]
    fn out_of_scope_paths_are_ignored() {
        assert!(scan("docs/guardrails/AUTHORITY.md", "fully autonomous").is_clean());
        assert!(scan("README.md", "fully autonomous").is_clean());
        assert!(scan("content/pnpm-lock.yaml", "fully autonomous").is_clean());
    }

    #[test]
    fn wider_verb_window_is_configurable() {
        let mut options = FamilyOptions::default();
        options.guard_windows.insert(GuardClass::AuthorityVerb, 1);
        let family = family(&options).unwrap();
        let report = RuleEngine::builder().family(family).build().scan(
            TITLE,
            &[FileRecord::inline(
                "content/a.md",
                "We do not claim that the system decides outcomes.",
            )],
        );
        assert_eq!(report.findings.len(), 1);
    }
}
