//! Scope resolution: decides which paths a rule family may look at.
//!
//! Exclusions always win. A path is in scope iff it matches no exclude
//! rule, matches at least one include rule, and (when the family defines
//! one) carries an allowed extension.

use std::fmt;

use crate::error::ToolError;

/// Normalizes a path for matching: backslashes become forward slashes and
/// leading `./` segments are dropped.
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let mut normalized = path.replace('\\', "/");
    while let Some(rest) = normalized.strip_prefix("./") {
        normalized = rest.to_string();
    }
    normalized
}

/// A single path predicate.
#[derive(Debug, Clone)]
pub enum PathMatcher {
    /// Path starts with the given prefix. The empty prefix matches everything.
    Prefix(String),
    /// Path ends with the given suffix, ignoring ASCII case.
    Suffix(String),
    /// Path matches a glob pattern.
    Glob(glob::Pattern),
}

impl PathMatcher {
    /// Prefix matcher.
    #[must_use]
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self::Prefix(normalize_path(&prefix.into()))
    }

    /// Suffix matcher.
    #[must_use]
    pub fn suffix(suffix: impl Into<String>) -> Self {
        Self::Suffix(normalize_path(&suffix.into()))
    }

    /// Parses a configured matcher: strings with glob metacharacters become
    /// globs, everything else a prefix.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Config`] for an invalid glob.
    pub fn parse(spec: &str) -> Result<Self, ToolError> {
        let spec = normalize_path(spec);
        if spec.contains(['*', '?', '[']) {
            glob::Pattern::new(&spec)
                .map(Self::Glob)
                .map_err(|e| ToolError::Config(format!("invalid glob `{spec}`: {e}")))
        } else {
            Ok(Self::Prefix(spec))
        }
    }

    /// Tests an already-normalized path.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Prefix(prefix) => path.starts_with(prefix.as_str()),
            Self::Suffix(suffix) => {
                let (path, suffix) = (path.as_bytes(), suffix.as_bytes());
                path.len() >= suffix.len()
                    && path[path.len() - suffix.len()..].eq_ignore_ascii_case(suffix)
            }
            Self::Glob(pattern) => pattern.matches(path),
        }
    }
}

impl fmt::Display for PathMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefix(p) if p.is_empty() => write!(f, "*"),
            Self::Prefix(p) => write!(f, "{p}"),
            Self::Suffix(s) => write!(f, "*{s}"),
            Self::Glob(g) => write!(f, "{}", g.as_str()),
        }
    }
}

/// Whether a matching rule pulls a path in or pushes it out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeAction {
    /// Path is eligible.
    Include,
    /// Path is never eligible.
    Exclude,
}

/// A matcher paired with its action.
#[derive(Debug, Clone)]
pub struct ScopeRule {
    /// Path predicate.
    pub matcher: PathMatcher,
    /// Effect when the predicate holds.
    pub action: ScopeAction,
}

/// Per-family scope configuration.
#[derive(Debug, Clone, Default)]
pub struct ScopeResolver {
    rules: Vec<ScopeRule>,
    extensions: Option<Vec<String>>,
}

impl ScopeResolver {
    /// Creates an empty resolver. Nothing is in scope until an include is added.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an include rule.
    #[must_use]
    pub fn include(mut self, matcher: PathMatcher) -> Self {
        self.rules.push(ScopeRule {
            matcher,
            action: ScopeAction::Include,
        });
        self
    }

    /// Adds an exclude rule.
    #[must_use]
    pub fn exclude(mut self, matcher: PathMatcher) -> Self {
        self.rules.push(ScopeRule {
            matcher,
            action: ScopeAction::Exclude,
        });
        self
    }

    /// Restricts the scope to the given extensions (with leading dot).
    #[must_use]
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = Some(
            extensions
                .into_iter()
                .map(|e| e.into().to_ascii_lowercase())
                .collect(),
        );
        self
    }

    /// Drops all include rules (used when configuration replaces them).
    #[must_use]
    pub fn clear_includes(mut self) -> Self {
        self.rules.retain(|r| r.action == ScopeAction::Exclude);
        self
    }

    /// Returns true if the path is eligible for this family.
    #[must_use]
    pub fn is_in_scope(&self, path: &str) -> bool {
        let path = normalize_path(path);
        let matching = |action: ScopeAction| {
            self.rules
                .iter()
                .filter(|r| r.action == action)
                .any(|r| r.matcher.matches(&path))
        };

        if matching(ScopeAction::Exclude) || !matching(ScopeAction::Include) {
            return false;
        }

        match &self.extensions {
            Some(allowed) => {
                let lower = path.to_ascii_lowercase();
                allowed.iter().any(|ext| lower.ends_with(ext.as_str()))
            }
            None => true,
        }
    }

    /// The configured rules, in insertion order.
    #[must_use]
    pub fn rules(&self) -> &[ScopeRule] {
        &self.rules
    }

    /// One-line description for rule listings.
    #[must_use]
    pub fn describe(&self) -> String {
        let join = |action: ScopeAction| {
            self.rules
                .iter()
                .filter(|r| r.action == action)
                .map(|r| r.matcher.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        let mut out = format!("include: {}", join(ScopeAction::Include));
        if let Some(extensions) = &self.extensions {
            out.push_str(&format!("; extensions: {}", extensions.join(" ")));
        }
        out.push_str(&format!("; exclude: {}", join(ScopeAction::Exclude)));
        out
    }
}
