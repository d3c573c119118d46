//! Integration test: built-in families → engine → rendered report.

use guardrails_core::{exit_code, Config, FileRecord, Mode};
use guardrails_rules::{engine, title, FamilyId, Preset};

fn fixture() -> Vec<FileRecord> {
    vec![
        FileRecord::inline(
            "src/app.ts",
            "export const site = 'marketing';\nimport x from \"@scientia/engine\";\n",
        ),
        FileRecord::inline(
            "scripts/guardrails/cross-repo.mjs",
            "const DENY = ['scientia-platform'];\n",
        ),
        FileRecord::inline("content/home.mdx", "Structures context for humans.\n"),
    ]
}

#[test]
fn cross_repo_report_renders() {
    let engine = engine(Preset::CrossRepo.families(), &Config::default()).expect("engine");
    let report = engine.scan(title(FamilyId::CrossRepo), &fixture());

    assert_eq!(exit_code(&report, Mode::Error), 1);
    insta::assert_snapshot!(report.render(Mode::Error).trim_end(), @r#"
    ❌ Guardrails: Cross-repo import boundary (error): 1 finding(s)

    - src/app.ts:2 [cross-repo-import]
      import x from "@scientia/engine";
      Hint: Remove platform coupling. Marketing repo must remain standalone.

    Total: 1 error(s), 0 warning(s), 0 info(s) in 2 file(s)
    "#);
}

#[test]
fn warn_mode_never_fails() {
    let engine = engine(Preset::All.families(), &Config::default()).expect("engine");
    let report = engine.scan("Guardrails: all families", &fixture());

    assert!(report.has_failures());
    assert_eq!(exit_code(&report, Mode::Warn), 0);
    assert!(report.render(Mode::Warn).starts_with("⚠️"));
}

#[test]
fn rescan_is_byte_identical() {
    let engine = engine(Preset::All.families(), &Config::default()).expect("engine");
    let first = engine.scan("t", &fixture()).render(Mode::Error);
    let second = engine.scan("t", &fixture()).render(Mode::Error);
    assert_eq!(first, second);
}
