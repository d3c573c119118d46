//! Exclusions shared by every lexical family.

use guardrails_core::{PathMatcher, ScopeResolver};

/// Directories never scanned: VCS metadata, CI templates, the guardrails'
/// own implementation and governance docs, and build/vendor output.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    ".git/",
    ".github/",
    "scripts/guardrails/",
    "docs/guardrails/",
    ".next/",
    "node_modules/",
    "dist/",
    "build/",
    "out/",
    "coverage/",
];

/// Lockfiles, excluded by suffix wherever they live.
pub const LOCKFILE_SUFFIXES: &[&str] = &["pnpm-lock.yaml", "package-lock.json", "yarn.lock"];

/// A resolver carrying the shared exclusions and the given include prefixes.
#[must_use]
pub fn base_scope(includes: &[&str]) -> ScopeResolver {
    let scope = DEFAULT_EXCLUDES
        .iter()
        .fold(ScopeResolver::new(), |s, p| s.exclude(PathMatcher::prefix(*p)));
    let scope = LOCKFILE_SUFFIXES
        .iter()
        .fold(scope, |s, p| s.exclude(PathMatcher::suffix(*p)));
    includes
        .iter()
        .fold(scope, |s, p| s.include(PathMatcher::prefix(*p)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn governance_paths_are_excluded() {
        let scope = base_scope(&[""]);
        for path in [
            ".github/workflows/ci.yml",
            "scripts/guardrails/authority.mjs",
            "docs/guardrails/BOUNDARY_ENFORCEMENT.md",
            "node_modules/x/index.js",
            "content/pnpm-lock.yaml",
            "yarn.lock",
            "Yarn.lock",
            "web/Package-Lock.JSON",
        ] {
            assert!(!scope.is_in_scope(path), "{path} should be excluded");
        }
        assert!(scope.is_in_scope("content/home.mdx"));
    }
}
