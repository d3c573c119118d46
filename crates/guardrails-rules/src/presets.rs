//! Family registry: builds configured families and engines.

use guardrails_core::{Config, FamilyId, RuleEngine, RuleFamily, ToolError};
use tracing::debug;

use crate::options::FamilyOptions;
use crate::{authority, collapse, cross_repo, prohibited};

/// Escape-hatch markers honored by every engine.
pub const DEFAULT_ESCAPE_HATCHES: &[&str] = &[cross_repo::ESCAPE_HATCH];

/// Preset family sets, one per scanner command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Authority language only.
    Authority,
    /// Cross-repo coupling only.
    CrossRepo,
    /// Code coupling plus authority-collapse copy.
    Prohibited,
    /// Every family.
    All,
}

impl Preset {
    /// Families run by this preset.
    #[must_use]
    pub fn families(self) -> &'static [FamilyId] {
        match self {
            Self::Authority => &[FamilyId::Authority],
            Self::CrossRepo => &[FamilyId::CrossRepo],
            Self::Prohibited => &[FamilyId::ProhibitedPattern, FamilyId::AuthorityCollapse],
            Self::All => &FamilyId::ALL,
        }
    }
}

/// Report title of a single family.
#[must_use]
pub fn title(id: FamilyId) -> &'static str {
    match id {
        FamilyId::Authority => authority::TITLE,
        FamilyId::CrossRepo => cross_repo::TITLE,
        FamilyId::ProhibitedPattern => prohibited::TITLE,
        FamilyId::AuthorityCollapse => collapse::TITLE,
    }
}

/// Rejects `[families.<id>]` blocks naming no known family.
///
/// # Errors
///
/// Returns [`ToolError::Config`] naming the first unknown id (sorted).
pub fn validate(config: &Config) -> Result<(), ToolError> {
    let mut keys: Vec<&String> = config.families.keys().collect();
    keys.sort();
    for key in keys {
        key.parse::<FamilyId>().map_err(ToolError::Config)?;
    }
    Ok(())
}

/// Builds one family with its configuration overlay applied.
///
/// # Errors
///
/// Returns a [`ToolError`] for invalid family options or patterns.
pub fn family(id: FamilyId, config: &Config) -> Result<RuleFamily, ToolError> {
    let options = FamilyOptions::from_config(id.as_str(), config.family(id.as_str()))?;
    let mut family = match id {
        FamilyId::Authority => authority::family(&options)?,
        FamilyId::CrossRepo => cross_repo::family(&options)?,
        FamilyId::ProhibitedPattern => prohibited::family(&options)?,
        FamilyId::AuthorityCollapse => collapse::family(&options)?,
    };
    for exclude in &config.scan.exclude {
        family.scope = family
            .scope
            .exclude(guardrails_core::PathMatcher::parse(exclude)?);
    }
    Ok(family)
}

/// Builds every enabled family among `ids`, in the given order.
///
/// # Errors
///
/// Returns a [`ToolError`] for invalid configuration.
pub fn families(ids: &[FamilyId], config: &Config) -> Result<Vec<RuleFamily>, ToolError> {
    validate(config)?;
    ids.iter()
        .filter(|id| {
            let enabled = config.is_family_enabled(id.as_str());
            if !enabled {
                debug!(family = %id, "skipping disabled family");
            }
            enabled
        })
        .map(|id| family(*id, config))
        .collect()
}

/// Builds an engine for `ids` with the default and configured escape hatches.
///
/// # Errors
///
/// Returns a [`ToolError`] for invalid configuration.
pub fn engine(ids: &[FamilyId], config: &Config) -> Result<RuleEngine, ToolError> {
    Ok(RuleEngine::builder()
        .families(families(ids, config)?)
        .escape_hatches(DEFAULT_ESCAPE_HATCHES.iter().copied())
        .escape_hatches(config.escape_hatches.iter().cloned())
        .build())
}

/// Returns every family with default options.
///
/// # Errors
///
/// Returns a [`ToolError`] if a built-in pattern fails to compile.
pub fn all_families() -> Result<Vec<RuleFamily>, ToolError> {
    families(&FamilyId::ALL, &Config::default())
}
