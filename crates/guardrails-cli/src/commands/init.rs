//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# guardrails configuration
# Every key is optional; unset keys keep the built-in policy.

# Exit policy for lexical scanners: "error" (default) or "warn".
# GUARDRAILS_MODE in the environment overrides this.
# mode = "warn"

# Extra in-line markers that suppress every family on their line.
# escape_hatches = ["guardrails:allow-legacy"]

[scan]
# Also scan untracked, non-ignored files.
include_untracked = false

# Extra exclusions applied to every family (path prefixes or globs).
exclude = [
    "docs/guardrails/",
]

# max_subprocess_bytes = 16777216

# Per-family configuration: enabled, severity, extra_phrases,
# extra_patterns, include, exclude, extensions, guard_window.

[families.authority]
enabled = true
# extra_phrases = ["runs itself"]
# guard_window = { autonomy = 4, authority-verb = 10 }

[families.cross-repo]
enabled = true

[families.prohibited-pattern]
enabled = true

[families.authority-collapse]
enabled = true
# severity = "warning"

[boundary]
# manifest = "package.json"
# lockfile = "pnpm-lock.yaml"
# package_manager = "pnpm"
# forbidden_exact = ["scientia-platform"]
# forbidden_prefixes = ["@scientia/"]

[env]
# contract = "env.contract.json"
# template = ".env.example"
# env_files = [".env.local", ".env"]
"#;

/// Config file written by `init`.
pub const CONFIG_NAME: &str = "guardrails.toml";

/// Runs the init command in `root`.
pub fn run(root: &Path, force: bool) -> Result<()> {
    let config_path = root.join(CONFIG_NAME);

    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)?;

    println!("Created {}", config_path.display());
    println!("\nNext steps:");
    println!("  1. Edit {CONFIG_NAME} to tune families");
    println!("  2. Run: guardrails scan");

    Ok(())
}
