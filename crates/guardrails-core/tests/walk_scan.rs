//! Integration test: directory walk → scope → rule engine → report.

use guardrails_core::{
    exit_code, FileLister, FamilyId, GuardClass, Mode, NegationGuard, PathMatcher, Rule,
    RuleEngine, RuleFamily, ScopeResolver, WalkLister,
};
use tempfile::TempDir;

fn write(root: &std::path::Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().expect("fixture has a parent")).expect("mkdir");
    std::fs::write(path, content).expect("write fixture");
}

fn engine() -> RuleEngine {
    let scope = ScopeResolver::new()
        .exclude(PathMatcher::prefix("scripts/guardrails/"))
        .exclude(PathMatcher::prefix("node_modules/"))
        .exclude(PathMatcher::suffix("pnpm-lock.yaml"))
        .include(PathMatcher::prefix("content/"))
        .include(PathMatcher::prefix("src/"));
    let family = RuleFamily::new(FamilyId::Authority, "Authority", scope)
        .rule(
            Rule::phrases("authority-keywords", "Implied authority", "Rephrase.", ["decides for you"])
                .guarded_by(GuardClass::AuthorityVerb),
        )
        .guard(
            NegationGuard::new("negated-authority-verb", GuardClass::AuthorityVerb, 10)
                .triggers(["decide*"]),
        );
    RuleEngine::builder().family(family).build()
}

#[test]
fn scans_only_in_scope_files_of_a_walked_tree() {
    let dir = TempDir::new().expect("tempdir");
    let root = dir.path();
    write(root, "content/home.mdx", "# Home\n\nOur engine decides for you.\n");
    write(root, "content/about.mdx", "It never decides for you.\n");
    write(root, "scripts/guardrails/denylist.mjs", "const X = 'decides for you';\n");
    write(root, "src/pnpm-lock.yaml", "decides for you\n");
    write(root, "README.md", "decides for you\n");

    let files = WalkLister::new(root).list().expect("walk");
    let report = engine().scan("Guardrails: Authority", &files);

    assert_eq!(report.files_checked, 2);
    assert_eq!(report.findings.len(), 1);
    assert_eq!(report.findings[0].location(), "content/home.mdx:3");
    assert_eq!(exit_code(&report, Mode::Error), 1);
    assert_eq!(exit_code(&report, Mode::Warn), 0);
}

#[test]
fn clean_tree_exits_zero() {
    let dir = TempDir::new().expect("tempdir");
    write(dir.path(), "content/home.mdx", "Structures context for humans.\n");

    let files = WalkLister::new(dir.path()).list().expect("walk");
    let report = engine().scan("Guardrails: Authority", &files);

    assert!(report.is_clean());
    assert_eq!(exit_code(&report, Mode::Error), 0);
}
