//! Line rule engine: applies rule families to in-scope file content.

use tracing::{debug, info, warn};

use crate::files::FileRecord;
use crate::guard::GuardClass;
use crate::rule::RuleFamily;
use crate::types::{Finding, Report};

/// Builder for configuring a [`RuleEngine`].
#[derive(Debug, Default)]
pub struct RuleEngineBuilder {
    families: Vec<RuleFamily>,
    escape_hatches: Vec<String>,
}

impl RuleEngineBuilder {
    /// Creates a new builder with no families.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule family.
    #[must_use]
    pub fn family(mut self, family: RuleFamily) -> Self {
        self.families.push(family);
        self
    }

    /// Adds multiple rule families.
    #[must_use]
    pub fn families<I>(mut self, families: I) -> Self
    where
        I: IntoIterator<Item = RuleFamily>,
    {
        self.families.extend(families);
        self
    }

    /// Adds an in-line escape-hatch marker.
    #[must_use]
    pub fn escape_hatch(mut self, marker: impl Into<String>) -> Self {
        let marker = marker.into();
        if !marker.is_empty() && !self.escape_hatches.contains(&marker) {
            self.escape_hatches.push(marker);
        }
        self
    }

    /// Adds multiple escape-hatch markers.
    #[must_use]
    pub fn escape_hatches<I, S>(self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        markers.into_iter().fold(self, |builder, m| builder.escape_hatch(m))
    }

    /// Builds the engine.
    #[must_use]
    pub fn build(self) -> RuleEngine {
        RuleEngine {
            families: self.families,
            escape_hatches: self.escape_hatches,
        }
    }
}

/// Applies rule families line by line.
///
/// For every in-scope, non-binary file and every non-blank line without an
/// escape hatch, each eligible family evaluates its guards once and then
/// its rules in order. The first unsuppressed match records one finding
/// and ends that family's evaluation for the line.
///
/// Use [`RuleEngine::builder()`] to construct an instance.
#[derive(Debug)]
pub struct RuleEngine {
    families: Vec<RuleFamily>,
    escape_hatches: Vec<String>,
}

impl RuleEngine {
    /// Creates a new builder for configuring an engine.
    #[must_use]
    pub fn builder() -> RuleEngineBuilder {
        RuleEngineBuilder::new()
    }

    /// Registered families, in evaluation order.
    #[must_use]
    pub fn families(&self) -> &[RuleFamily] {
        &self.families
    }

    /// Registered escape-hatch markers.
    #[must_use]
    pub fn escape_hatches(&self) -> &[String] {
        &self.escape_hatches
    }

    /// Scans the file universe and returns a sorted report.
    ///
    /// Unreadable files are logged and skipped; binary files are skipped
    /// silently. Neither counts towards `files_checked`.
    #[must_use]
    pub fn scan(&self, title: &str, files: &[FileRecord]) -> Report {
        let mut report = Report::new(title);

        for file in files {
            let eligible: Vec<&RuleFamily> = self
                .families
                .iter()
                .filter(|f| f.scope.is_in_scope(file.path()))
                .collect();
            if eligible.is_empty() {
                continue;
            }

            let content = match file.load() {
                Ok(Some(content)) => content,
                Ok(None) => {
                    debug!(path = file.path(), "skipping binary file");
                    continue;
                }
                Err(e) => {
                    warn!(path = file.path(), error = %e, "skipping unreadable file");
                    continue;
                }
            };

            debug!(path = file.path(), families = eligible.len(), "scanning");
            report.files_checked += 1;
            report
                .findings
                .extend(self.scan_content(file.path(), &content, &eligible));
        }

        report.sort();
        info!(
            findings = report.findings.len(),
            files = report.files_checked,
            "{title}: scan complete"
        );
        report
    }

    fn scan_content(&self, path: &str, content: &str, families: &[&RuleFamily]) -> Vec<Finding> {
        let mut findings = Vec::new();

        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() || self.has_escape_hatch(line) {
                continue;
            }
            let lower = line.to_lowercase();

            for family in families {
                let suppressed: Vec<GuardClass> = family
                    .guards
                    .iter()
                    .filter(|g| g.matches(line))
                    .map(|g| g.class())
                    .collect();

                let hit = family
                    .rules
                    .iter()
                    .filter(|r| r.guard_class.map_or(true, |c| !suppressed.contains(&c)))
                    .find_map(|r| r.matcher.find(line, &lower).map(|m| (r, m)));

                if let Some((rule, matched)) = hit {
                    let mut finding = Finding::new(
                        &rule.id,
                        family.id.as_str(),
                        family.severity,
                        path,
                        format!("{}: \"{matched}\"", rule.message),
                    )
                    .at_line(idx + 1)
                    .with_snippet(line)
                    .with_hint(&rule.hint);
                    if let Some(doc_ref) = &family.doc_ref {
                        finding = finding.with_doc_ref(doc_ref);
                    }
                    findings.push(finding);
                }
            }
        }

        findings
    }

    fn has_escape_hatch(&self, line: &str) -> bool {
        self.escape_hatches.iter().any(|m| line.contains(m.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::NegationGuard;
    use crate::rule::{FamilyId, Rule};
    use crate::scope::{PathMatcher, ScopeResolver};
    use crate::types::Severity;

    fn authority_family() -> RuleFamily {
        let scope = ScopeResolver::new()
            .exclude(PathMatcher::prefix("docs/guardrails/"))
            .include(PathMatcher::prefix("content/"))
            .include(PathMatcher::prefix("docs/"));
        RuleFamily::new(FamilyId::Authority, "Authority", scope)
            .rule(
                Rule::phrases("authority-keywords", "Autonomy claim", "Rephrase.", ["autonomous"])
                    .guarded_by(GuardClass::Autonomy),
            )
            .rule(
                Rule::phrases("authority-keywords", "Authority claim", "Rephrase.", ["the system decides"])
                    .guarded_by(GuardClass::AuthorityVerb),
            )
            .rule(Rule::phrases("authority-keywords", "Agency claim", "Rephrase.", ["agentic"]))
            .guard(NegationGuard::new("negated-autonomy", GuardClass::Autonomy, 4).triggers(["autonomous"]))
            .guard(
                NegationGuard::new("negated-authority-verb", GuardClass::AuthorityVerb, 10)
                    .triggers(["decide*", "decision*"]),
            )
    }

    fn cross_repo_family() -> RuleFamily {
        let scope = ScopeResolver::new().include(PathMatcher::prefix("content/"));
        RuleFamily::new(FamilyId::CrossRepo, "Cross-repo", scope)
            .rule(Rule::phrases("cross-repo-import", "Coupling", "Remove it.", ["@scientia/"]))
            .severity(Severity::Warning)
    }

    fn engine() -> RuleEngine {
        RuleEngine::builder()
            .family(authority_family())
            .family(cross_repo_family())
            .escape_hatch("guardrails:allow-crossrepo")
            .build()
    }

    fn scan(path: &str, content: &str) -> Report {
        engine().scan("t", &[FileRecord::inline(path, content)])
    }

    #[test]
    fn plain_claim_is_reported() {
        let report = scan("content/home.md", "The system decides outcomes.");
        assert_eq!(report.findings.len(), 1);
        let f = &report.findings[0];
        assert_eq!(f.rule, "authority-keywords");
        assert_eq!(f.family, "authority");
        assert_eq!(f.line, Some(1));
        assert_eq!(f.snippet.as_deref(), Some("The system decides outcomes."));
        assert_eq!(f.message, "Authority claim: \"the system decides\"");
    }

    #[test]
    fn negated_claim_is_suppressed() {
        let report = scan(
            "content/home.md",
            "This document does not claim the system decides outcomes.",
        );
        assert!(report.is_clean());
    }

    #[test]
    fn guard_only_suppresses_its_class() {
        let report = scan(
            "content/home.md",
            "It never decides anything, yet it is fully autonomous.",
        );
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].message, "Autonomy claim: \"autonomous\"");
    }

    #[test]
    fn unguarded_rules_are_never_suppressed() {
        let report = scan("content/home.md", "We are not agentic.");
        assert_eq!(report.findings.len(), 1);
    }

    #[test]
    fn one_finding_per_family_per_line() {
        let report = scan(
            "content/home.md",
            "An autonomous, agentic product where the system decides. @scientia/engine",
        );
        let families: Vec<&str> = report.findings.iter().map(|f| f.family.as_str()).collect();
        assert_eq!(families, vec!["authority", "cross-repo"]);
        assert_eq!(report.findings[1].severity, Severity::Warning);
    }

    #[test]
    fn escape_hatch_suppresses_all_families() {
        let report = scan(
            "content/home.md",
            "autonomous @scientia/x <!-- guardrails:allow-crossrepo -->",
        );
        assert!(report.is_clean());
        assert_eq!(report.files_checked, 1);
    }

    #[test]
    fn excluded_paths_never_report() {
        let report = scan("docs/guardrails/POLICY.md", "autonomous agentic the system decides");
        assert!(report.is_clean());
        assert_eq!(report.files_checked, 0);
    }

    #[test]
    fn binary_files_are_skipped() {
        let report = engine().scan("t", &[FileRecord::inline("content/x.md", b"autonomous\0".to_vec())]);
        assert!(report.is_clean());
        assert_eq!(report.files_checked, 0);
    }

    #[test]
    fn blank_lines_count_towards_line_numbers() {
        let report = scan("content/home.md", "\r\n\nautonomous\r\n");
        assert_eq!(report.findings[0].line, Some(3));
    }

    #[test]
    fn rescanning_is_deterministic() {
        let files = vec![
            FileRecord::inline("content/b.md", "agentic\nautonomous"),
            FileRecord::inline("content/a.md", "@scientia/x"),
        ];
        let first = engine().scan("t", &files);
        let second = engine().scan("t", &files);
        assert_eq!(first.findings, second.findings);
        assert_eq!(first.findings[0].file, "content/a.md");
    }

    #[test]
    fn duplicate_escape_hatches_are_ignored() {
        let engine = RuleEngine::builder()
            .escape_hatches(["a", "a", ""])
            .build();
        assert_eq!(engine.escape_hatches(), &["a".to_string()]);
    }
}
