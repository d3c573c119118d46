//! Declared-dependency checks on `package.json`.

use serde_json::Value;
use tracing::{debug, warn};

use guardrails_core::ToolError;

use crate::spec::BoundarySpec;

/// Dependency blocks inspected, in report order.
pub const DEPENDENCY_BLOCKS: [&str; 4] = [
    "dependencies",
    "devDependencies",
    "peerDependencies",
    "optionalDependencies",
];

/// Why a manifest entry was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ManifestHitKind {
    /// The resolved name is forbidden.
    Forbidden,
    /// `workspace:` indirection, review only.
    WorkspaceIndirection,
    /// Direct git or URL reference, review only.
    GitReference,
}

/// A flagged manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestHit {
    /// Dependency block (e.g. `devDependencies`).
    pub block: String,
    /// Declared dependency key.
    pub name: String,
    /// Version specifier as written.
    pub spec: String,
    /// Package name after `npm:` alias resolution.
    pub resolved: String,
    /// Reason for the hit.
    pub kind: ManifestHitKind,
}

impl ManifestHit {
    /// `block.name=spec`, the form used in reports.
    #[must_use]
    pub fn entry(&self) -> String {
        format!("{}.{}={}", self.block, self.name, self.spec)
    }
}

/// Real package name behind a declared dependency.
///
/// `"alias": "npm:@scope/real@^1"` resolves to `@scope/real`; anything else
/// resolves to the declared key.
#[must_use]
pub fn resolve_alias<'a>(name: &'a str, spec: &'a str) -> &'a str {
    let Some(target) = spec.strip_prefix("npm:") else {
        return name;
    };
    // Skip the scope's leading '@' when looking for the version separator.
    let search_from = usize::from(target.starts_with('@'));
    match target[search_from..].find('@') {
        Some(idx) => &target[..search_from + idx],
        None => target,
    }
}

fn is_git_reference(spec: &str) -> bool {
    spec.starts_with("git+") || spec.starts_with("git://") || spec.contains("github.com")
}

/// Checks the four dependency blocks of a manifest.
///
/// Entries are visited block by block in key order. An entry can yield
/// several hits (a forbidden name declared through `workspace:`).
///
/// # Errors
///
/// Returns [`ToolError::Parse`] if the text is not a JSON object.
pub fn check_manifest(text: &str, spec: &BoundarySpec) -> Result<Vec<ManifestHit>, ToolError> {
    let what = format!("JSON in {}", spec.manifest.display());
    let root: Value = serde_json::from_str(text).map_err(|e| ToolError::parse(&what, e))?;
    let Value::Object(root) = root else {
        return Err(ToolError::parse(what, "root must be an object"));
    };

    let mut hits = Vec::new();
    for block in DEPENDENCY_BLOCKS {
        let entries = match root.get(block) {
            None => continue,
            Some(Value::Object(entries)) => entries,
            Some(_) => {
                warn!(block, "ignoring non-object dependency block");
                continue;
            }
        };

        let mut entries: Vec<(&String, &Value)> = entries.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        for (name, version) in entries {
            let Some(version) = version.as_str() else {
                continue;
            };
            let resolved = resolve_alias(name, version);
            let mut hit = |kind| {
                hits.push(ManifestHit {
                    block: block.to_string(),
                    name: name.clone(),
                    spec: version.to_string(),
                    resolved: resolved.to_string(),
                    kind,
                });
            };
            if spec.is_forbidden(name) || spec.is_forbidden(resolved) {
                hit(ManifestHitKind::Forbidden);
            }
            if version.starts_with("workspace:") {
                hit(ManifestHitKind::WorkspaceIndirection);
            }
            if is_git_reference(version) {
                hit(ManifestHitKind::GitReference);
            }
        }
    }

    debug!(hits = hits.len(), "manifest checked");
    Ok(hits)
}
