//! Rule and rule-family definitions for the line rule engine.

use regex::{Regex, RegexBuilder};
use std::fmt;
use std::str::FromStr;

use crate::error::ToolError;
use crate::guard::{GuardClass, NegationGuard};
use crate::scope::ScopeResolver;
use crate::types::Severity;
use crate::utils::specifier::extract_specifiers;

/// Built-in rule family identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FamilyId {
    /// Implied autonomy / decision-authority language.
    Authority,
    /// Lexical coupling to the internal platform codebase.
    CrossRepo,
    /// Import/require coupling and DB reach-through in code.
    ProhibitedPattern,
    /// Authority-collapse product claims in copy.
    AuthorityCollapse,
}

impl FamilyId {
    /// All families, in scan order.
    pub const ALL: [Self; 4] = [
        Self::Authority,
        Self::CrossRepo,
        Self::ProhibitedPattern,
        Self::AuthorityCollapse,
    ];

    /// Stable kebab-case identifier.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Authority => "authority",
            Self::CrossRepo => "cross-repo",
            Self::ProhibitedPattern => "prohibited-pattern",
            Self::AuthorityCollapse => "authority-collapse",
        }
    }
}

impl fmt::Display for FamilyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FamilyId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(|id| id.as_str()).collect();
                format!("unknown family `{s}`, expected one of: {}", known.join(", "))
            })
    }
}

/// How a rule recognizes a violation on a single line.
#[derive(Debug, Clone)]
pub enum RuleMatcher {
    /// Case-insensitive substrings (stored lowercased).
    Phrases(Vec<String>),
    /// Regular expressions, tested against the raw line.
    Patterns(Vec<Regex>),
    /// Module specifiers in import/require statements that are forbidden
    /// outright (or a subpath of one) or live under a forbidden namespace.
    Specifiers {
        /// Forbidden module names.
        exact: Vec<String>,
        /// Forbidden namespace prefixes (e.g. `@scientia/`).
        prefixes: Vec<String>,
    },
}

impl RuleMatcher {
    /// Returns the matched text, if any.
    #[must_use]
    pub fn find(&self, line: &str, lower: &str) -> Option<String> {
        match self {
            Self::Phrases(phrases) => phrases
                .iter()
                .find(|p| lower.contains(p.as_str()))
                .cloned(),
            Self::Patterns(patterns) => patterns
                .iter()
                .find_map(|re| re.find(line).map(|m| m.as_str().to_string())),
            Self::Specifiers { exact, prefixes } => extract_specifiers(line)
                .into_iter()
                .find(|spec| {
                    exact.iter().any(|name| {
                        *spec == name.as_str()
                            || spec
                                .strip_prefix(name.as_str())
                                .is_some_and(|rest| rest.starts_with('/'))
                    }) || prefixes.iter().any(|p| spec.starts_with(p.as_str()))
                })
                .map(str::to_string),
        }
    }

    /// Number of phrases/patterns/names carried.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Phrases(p) => p.len(),
            Self::Patterns(p) => p.len(),
            Self::Specifiers { exact, prefixes } => exact.len() + prefixes.len(),
        }
    }

    /// Returns true if the matcher can never match.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Phrases(_) => "phrase",
            Self::Patterns(_) => "pattern",
            Self::Specifiers { .. } => "specifier",
        }
    }
}

/// A single detection rule.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Stable identifier reported in findings.
    pub id: String,
    /// Message prefix; the matched text is appended.
    pub message: String,
    /// Remediation hint.
    pub hint: String,
    /// Line predicate.
    pub matcher: RuleMatcher,
    /// Guard class that may suppress this rule; `None` means never suppressed.
    pub guard_class: Option<GuardClass>,
}

impl Rule {
    /// Phrase rule: case-insensitive substring match.
    #[must_use]
    pub fn phrases<I, S>(id: &str, message: &str, hint: &str, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let phrases = phrases
            .into_iter()
            .map(|p| p.as_ref().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Self::with_matcher(id, message, hint, RuleMatcher::Phrases(phrases))
    }

    /// Pattern rule: case-insensitive regular expressions.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Pattern`] if any pattern fails to compile.
    pub fn patterns<I, S>(id: &str, message: &str, hint: &str, patterns: I) -> Result<Self, ToolError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compiled = patterns
            .into_iter()
            .map(|p| {
                RegexBuilder::new(p.as_ref())
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| ToolError::Pattern {
                        rule: id.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::with_matcher(id, message, hint, RuleMatcher::Patterns(compiled)))
    }

    /// Specifier rule: forbidden module names and namespaces in import statements.
    #[must_use]
    pub fn specifiers(
        id: &str,
        message: &str,
        hint: &str,
        exact: Vec<String>,
        prefixes: Vec<String>,
    ) -> Self {
        Self::with_matcher(id, message, hint, RuleMatcher::Specifiers { exact, prefixes })
    }

    fn with_matcher(id: &str, message: &str, hint: &str, matcher: RuleMatcher) -> Self {
        Self {
            id: id.to_string(),
            message: message.to_string(),
            hint: hint.to_string(),
            matcher,
            guard_class: None,
        }
    }

    /// Marks this rule as suppressible by guards of the given class.
    #[must_use]
    pub fn guarded_by(mut self, class: GuardClass) -> Self {
        self.guard_class = Some(class);
        self
    }

    /// Short description for rule listings.
    #[must_use]
    pub fn describe(&self) -> String {
        let guard = self
            .guard_class
            .map(|c| format!(", guard: {c}"))
            .unwrap_or_default();
        format!("{} ({} {}s{guard})", self.id, self.matcher.len(), self.matcher.kind())
    }
}

/// A named category of detection logic with its own scope, rules and guards.
#[derive(Debug, Clone)]
pub struct RuleFamily {
    /// Family identifier.
    pub id: FamilyId,
    /// Human title used in report headers.
    pub title: String,
    /// Which paths this family scans.
    pub scope: ScopeResolver,
    /// Rules, in evaluation order. The first match on a line wins.
    pub rules: Vec<Rule>,
    /// Negation guards evaluated once per line.
    pub guards: Vec<NegationGuard>,
    /// Severity of findings.
    pub severity: Severity,
    /// Governance documentation reference attached to findings.
    pub doc_ref: Option<String>,
}

impl RuleFamily {
    /// Creates a family with no rules and `error` severity.
    #[must_use]
    pub fn new(id: FamilyId, title: impl Into<String>, scope: ScopeResolver) -> Self {
        Self {
            id,
            title: title.into(),
            scope,
            rules: Vec::new(),
            guards: Vec::new(),
            severity: Severity::Error,
            doc_ref: None,
        }
    }

    /// Appends a rule.
    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Appends a negation guard.
    #[must_use]
    pub fn guard(mut self, guard: NegationGuard) -> Self {
        self.guards.push(guard);
        self
    }

    /// Sets the severity of findings.
    #[must_use]
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the documentation reference.
    #[must_use]
    pub fn doc_ref(mut self, doc_ref: impl Into<String>) -> Self {
        self.doc_ref = Some(doc_ref.into());
        self
    }
}
