//! Per-family configuration overlays (`[families.<id>]`).

use std::collections::BTreeMap;

use guardrails_core::{FamilyConfig, GuardClass, PathMatcher, Rule, RuleFamily, Severity, ToolError};

/// Options recognized in a `[families.<id>]` block.
const KNOWN_OPTIONS: &[&str] = &[
    "extra_phrases",
    "extra_patterns",
    "include",
    "exclude",
    "extensions",
    "guard_window",
];

/// Resolved overlay for one family.
#[derive(Debug, Clone, Default)]
pub struct FamilyOptions {
    /// Additional case-insensitive phrases.
    pub extra_phrases: Vec<String>,
    /// Additional regular expressions.
    pub extra_patterns: Vec<String>,
    /// Replacement include matchers (empty keeps the built-in ones).
    pub include: Vec<PathMatcher>,
    /// Additional exclude matchers.
    pub exclude: Vec<PathMatcher>,
    /// Replacement extension allow-list.
    pub extensions: Option<Vec<String>>,
    /// Guard window overrides by class.
    pub guard_windows: BTreeMap<GuardClass, usize>,
    /// Severity override.
    pub severity: Option<Severity>,
}

impl FamilyOptions {
    /// Validates and resolves a configuration block.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Config`] for unknown options, empty phrases,
    /// invalid globs, or negative guard windows. Regex errors surface when
    /// the family is built.
    pub fn from_config(family: &str, config: Option<&FamilyConfig>) -> Result<Self, ToolError> {
        let Some(config) = config else {
            return Ok(Self::default());
        };

        if let Some(unknown) = config
            .options
            .keys()
            .find(|k| !KNOWN_OPTIONS.contains(&k.as_str()))
        {
            return Err(ToolError::Config(format!(
                "unknown option `{unknown}` in [families.{family}]"
            )));
        }

        let extra_phrases = config.get_str_array("extra_phrases");
        if extra_phrases.iter().any(|p| p.trim().is_empty()) {
            return Err(ToolError::Config(format!(
                "empty phrase in [families.{family}].extra_phrases"
            )));
        }

        let parse_matchers = |key: &str| {
            config
                .get_str_array(key)
                .iter()
                .map(|s| PathMatcher::parse(s))
                .collect::<Result<Vec<_>, _>>()
        };

        let extensions = config
            .options
            .contains_key("extensions")
            .then(|| config.get_str_array("extensions"));

        Ok(Self {
            extra_phrases,
            extra_patterns: config.get_str_array("extra_patterns"),
            include: parse_matchers("include")?,
            exclude: parse_matchers("exclude")?,
            extensions,
            guard_windows: guard_windows(family, config)?,
            severity: config.severity,
        })
    }

    /// Window for a guard class, falling back to the built-in default.
    #[must_use]
    pub fn window(&self, class: GuardClass, default: usize) -> usize {
        self.guard_windows.get(&class).copied().unwrap_or(default)
    }

    /// Applies scope, extra-rule and severity overrides to a built family.
    ///
    /// Extra rules are appended after the built-in ones under the id
    /// `<family>-custom` and are never guard-suppressed.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Pattern`] if an extra pattern fails to compile.
    pub fn apply(&self, mut family: RuleFamily) -> Result<RuleFamily, ToolError> {
        let mut scope = family.scope;
        if !self.include.is_empty() {
            scope = scope.clear_includes();
            for matcher in &self.include {
                scope = scope.include(matcher.clone());
            }
        }
        for matcher in &self.exclude {
            scope = scope.exclude(matcher.clone());
        }
        if let Some(extensions) = &self.extensions {
            scope = scope.extensions(extensions.iter().cloned());
        }
        family.scope = scope;

        let custom_id = format!("{}-custom", family.id);
        if !self.extra_phrases.is_empty() {
            family.rules.push(Rule::phrases(
                &custom_id,
                "Configured phrase",
                "Rephrase or remove the configured phrase.",
                &self.extra_phrases,
            ));
        }
        if !self.extra_patterns.is_empty() {
            family.rules.push(Rule::patterns(
                &custom_id,
                "Configured pattern",
                "Rephrase or remove the text matching the configured pattern.",
                &self.extra_patterns,
            )?);
        }

        if let Some(severity) = self.severity {
            family.severity = severity;
        }
        Ok(family)
    }
}

/// `guard_window = 6` applies to every guard of the family;
/// `guard_window = { autonomy = 4, authority-verb = 12 }` targets classes.
fn guard_windows(
    family: &str,
    config: &FamilyConfig,
) -> Result<BTreeMap<GuardClass, usize>, ToolError> {
    let classes = [GuardClass::Autonomy, GuardClass::AuthorityVerb];
    let to_window = |n: i64| {
        usize::try_from(n).map_err(|_| {
            ToolError::Config(format!(
                "[families.{family}].guard_window must be non-negative, got {n}"
            ))
        })
    };

    match config.options.get("guard_window") {
        None => Ok(BTreeMap::new()),
        Some(toml::Value::Integer(n)) => {
            let window = to_window(*n)?;
            Ok(classes.into_iter().map(|c| (c, window)).collect())
        }
        Some(toml::Value::Table(_)) => {
            let table = config.get_int_table("guard_window");
            let mut windows = BTreeMap::new();
            for (key, n) in table {
                let class = classes
                    .into_iter()
                    .find(|c| c.as_str() == key)
                    .ok_or_else(|| {
                        ToolError::Config(format!(
                            "unknown guard class `{key}` in [families.{family}].guard_window"
                        ))
                    })?;
                windows.insert(class, to_window(n)?);
            }
            Ok(windows)
        }
        Some(other) => Err(ToolError::Config(format!(
            "[families.{family}].guard_window must be an integer or a table, got {}",
            other.type_str()
        ))),
    }
}
