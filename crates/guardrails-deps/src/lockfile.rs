//! Lexical scan of the installed lockfile.
//!
//! The lockfile is never parsed as YAML. A renamed or aliased package still
//! leaves its physical origin (repository slug, internal package path) in
//! the resolution text, which is what this scan looks for.

use std::collections::BTreeSet;

use regex::Regex;
use tracing::debug;

use guardrails_core::ToolError;

use crate::spec::BoundarySpec;

/// Generic indicators of git-based resolution, reported for review.
const GIT_INDICATORS: &[&str] = &["git+", "github.com:"];

/// An origin indicator found in the lockfile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginHit {
    /// The marker or indicator text.
    pub marker: String,
    /// First line (1-indexed) containing it.
    pub line: usize,
    /// Whether the hit fails the run on its own.
    pub hard: bool,
    /// Generic git-resolution indicator rather than a configured marker.
    pub git_indicator: bool,
}

impl OriginHit {
    /// Report line, relative to the lockfile name.
    #[must_use]
    pub fn describe(&self, lockfile: &str) -> String {
        if self.git_indicator {
            format!(
                "{lockfile}:{} contains \"{}\" (review for forbidden origins)",
                self.line, self.marker
            )
        } else {
            format!("{lockfile}:{} contains \"{}\"", self.line, self.marker)
        }
    }
}

/// Result of the lockfile scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockfileScan {
    /// Forbidden package names appearing anywhere in the text (sorted).
    pub names: Vec<String>,
    /// Origin hits, configured markers first, in spec order.
    pub origins: Vec<OriginHit>,
}

impl LockfileScan {
    /// Whether any origin hit is hard.
    #[must_use]
    pub fn has_hard_origin(&self) -> bool {
        self.origins.iter().any(|h| h.hard)
    }
}

fn first_line_containing(text: &str, needle: &str) -> Option<usize> {
    text.lines()
        .position(|line| line.contains(needle))
        .map(|idx| idx + 1)
}

/// Scans raw lockfile text for forbidden names and origin markers.
///
/// # Errors
///
/// Returns [`ToolError::Pattern`] if a forbidden prefix cannot be turned
/// into a name pattern.
pub fn scan_lockfile(text: &str, spec: &BoundarySpec) -> Result<LockfileScan, ToolError> {
    let mut names = BTreeSet::new();

    for exact in &spec.forbidden_exact {
        if !exact.is_empty() && text.contains(exact.as_str()) {
            names.insert(exact.clone());
        }
    }
    for prefix in spec.forbidden_prefixes.iter().filter(|p| !p.is_empty()) {
        let pattern = Regex::new(&format!("{}[A-Za-z0-9._-]+", regex::escape(prefix))).map_err(
            |source| ToolError::Pattern {
                rule: crate::spec::RULE_ID.to_string(),
                source,
            },
        )?;
        names.extend(pattern.find_iter(text).map(|m| m.as_str().to_string()));
    }

    let mut origins = Vec::new();
    for marker in spec.origin_markers.iter().filter(|m| !m.is_empty()) {
        if let Some(line) = first_line_containing(text, marker) {
            origins.push(OriginHit {
                marker: marker.clone(),
                line,
                hard: spec.is_hard_marker(marker),
                git_indicator: false,
            });
        }
    }
    for indicator in GIT_INDICATORS {
        if let Some(line) = first_line_containing(text, indicator) {
            origins.push(OriginHit {
                marker: (*indicator).to_string(),
                line,
                hard: false,
                git_indicator: true,
            });
        }
    }

    debug!(names = names.len(), origins = origins.len(), "lockfile scanned");
    Ok(LockfileScan {
        names: names.into_iter().collect(),
        origins,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEAN: &str = "\
lockfileVersion: '9.0'
importers:
  .:
    dependencies:
      react:
        specifier: ^18.2.0
        version: 18.2.0
";

    #[test]
    fn clean_lockfile_has_no_hits() {
        let scan = scan_lockfile(CLEAN, &BoundarySpec::default()).unwrap();
        assert_eq!(scan, LockfileScan::default());
    }

    #[test]
    fn finds_names_and_markers_with_lines() {
        let text = "\
packages:
  /@scientia/db@0.1.0:
    resolution: {tarball: https://git.example.com/digital-hooligan/scientia-platform/packages/db}
  /left-pad@1.0.0:
    resolution: {repo: git+ssh://git@github.com:acme/left-pad.git}
";
        let scan = scan_lockfile(text, &BoundarySpec::default()).unwrap();
        assert_eq!(scan.names, vec!["@scientia/db", "scientia-platform"]);

        let described: Vec<String> = scan
            .origins
            .iter()
            .map(|h| h.describe("pnpm-lock.yaml"))
            .collect();
        assert_eq!(
            described,
            vec![
                "pnpm-lock.yaml:3 contains \"digital-hooligan/scientia-platform\"",
                "pnpm-lock.yaml:3 contains \"scientia-platform\"",
                "pnpm-lock.yaml:3 contains \"/packages/db\"",
                "pnpm-lock.yaml:5 contains \"git+\" (review for forbidden origins)",
                "pnpm-lock.yaml:5 contains \"github.com:\" (review for forbidden origins)",
            ]
        );
        assert!(scan.has_hard_origin());
        assert_eq!(scan.origins.iter().filter(|h| h.hard).count(), 1);
    }

    #[test]
    fn soft_markers_alone_are_not_hard() {
        let text = "  /x@1.0.0:\n    resolution: {directory: ../platform/packages/engine}\n";
        let scan = scan_lockfile(text, &BoundarySpec::default()).unwrap();
        assert_eq!(scan.origins.len(), 1);
        assert_eq!(scan.origins[0].marker, "/packages/engine");
        assert!(!scan.has_hard_origin());
    }
}
