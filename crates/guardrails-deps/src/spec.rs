//! Boundary specification: what counts as the forbidden platform.

use std::path::PathBuf;

use guardrails_core::BoundarySection;

/// Stable rule identifier for boundary findings.
pub const RULE_ID: &str = "E1-BOUNDARY-TRANSITIVE";

/// Report title.
pub const TITLE: &str = "Guardrails: Transitive dependency boundary (E1-BOUNDARY-TRANSITIVE)";

/// Canonical governance document.
pub const DOC_POINTER: &str = "docs/guardrails/BOUNDARY_ENFORCEMENT.md#e1-boundary-transitive";

const FORBIDDEN_EXACT: &[&str] = &["scientia-platform"];
const FORBIDDEN_PREFIXES: &[&str] = &["@scientia/"];

const ORIGIN_MARKERS: &[&str] = &[
    "digital-hooligan/scientia-platform",
    "scientia-platform",
    "/packages/foundations",
    "/packages/auth",
    "/packages/db",
    "/packages/audit",
    "/packages/evidence",
    "/packages/feature-flags",
    "/packages/observability",
    "/packages/engine",
    "/engines/",
];

const HARD_MARKERS: &[&str] = &["digital-hooligan/scientia-platform"];

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

/// Forbidden names and origins, plus where to find the inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundarySpec {
    /// Dependency manifest, relative to the repository root.
    pub manifest: PathBuf,
    /// Installed lockfile, relative to the repository root.
    pub lockfile: PathBuf,
    /// Package names forbidden outright.
    pub forbidden_exact: Vec<String>,
    /// Forbidden package namespaces.
    pub forbidden_prefixes: Vec<String>,
    /// Substrings in lockfile text that imply a forbidden origin.
    pub origin_markers: Vec<String>,
    /// Origin markers that fail the run on their own.
    pub hard_markers: Vec<String>,
    /// Package manager executable.
    pub package_manager: String,
}

impl Default for BoundarySpec {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("package.json"),
            lockfile: PathBuf::from("pnpm-lock.yaml"),
            forbidden_exact: owned(FORBIDDEN_EXACT),
            forbidden_prefixes: owned(FORBIDDEN_PREFIXES),
            origin_markers: owned(ORIGIN_MARKERS),
            hard_markers: owned(HARD_MARKERS),
            package_manager: "pnpm".to_string(),
        }
    }
}

impl BoundarySpec {
    /// Built-in spec with `[boundary]` overrides applied.
    ///
    /// Hard markers are always also origin markers.
    #[must_use]
    pub fn from_section(section: &BoundarySection) -> Self {
        let mut spec = Self::default();
        if let Some(manifest) = &section.manifest {
            spec.manifest.clone_from(manifest);
        }
        if let Some(lockfile) = &section.lockfile {
            spec.lockfile.clone_from(lockfile);
        }
        if let Some(exact) = &section.forbidden_exact {
            spec.forbidden_exact.clone_from(exact);
        }
        if let Some(prefixes) = &section.forbidden_prefixes {
            spec.forbidden_prefixes.clone_from(prefixes);
        }
        if let Some(markers) = &section.origin_markers {
            spec.origin_markers.clone_from(markers);
        }
        if let Some(hard) = &section.hard_markers {
            spec.hard_markers.clone_from(hard);
        }
        if let Some(pm) = &section.package_manager {
            spec.package_manager.clone_from(pm);
        }
        for marker in &spec.hard_markers {
            if !spec.origin_markers.contains(marker) {
                spec.origin_markers.push(marker.clone());
            }
        }
        spec
    }

    /// Whether a package name is forbidden-exact or under a forbidden namespace.
    #[must_use]
    pub fn is_forbidden(&self, name: &str) -> bool {
        !name.is_empty()
            && (self.forbidden_exact.iter().any(|n| n == name)
                || self
                    .forbidden_prefixes
                    .iter()
                    .any(|p| !p.is_empty() && name.starts_with(p.as_str())))
    }

    /// Whether an origin marker is hard.
    #[must_use]
    pub fn is_hard_marker(&self, marker: &str) -> bool {
        self.hard_markers.iter().any(|m| m == marker)
    }
}
