//! The JSON environment contract and its shape validation.
//!
//! ```json
//! {
//!   "surface": "S1",
//!   "required": {
//!     "PUBLIC_SITE_URL": { "tiers": ["local", "preview", "production"], "secret": false, "type": "url" }
//!   },
//!   "optional": {},
//!   "forbidden": ["SCIENTIA_*", "DATABASE_URL"]
//! }
//! ```
//!
//! Shape validation collects every problem it finds in one pass and then
//! stops: later checks assume a structurally valid contract.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{EnvError, ErrorCode};
use crate::wildcard::WildcardPattern;

/// Deployment context gating which variables are required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    /// Developer machine.
    Local,
    /// Preview deployment.
    Preview,
    /// Production deployment.
    Production,
}

impl Tier {
    /// Every tier.
    pub const ALL: [Self; 3] = [Self::Local, Self::Preview, Self::Production];

    /// Tier name as written in contracts.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Preview => "preview",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown tier `{s}`, expected local|preview|production"))
    }
}

/// How exposed an environment is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Public surface.
    S1,
    /// Partner surface.
    S2,
    /// Internal surface.
    S3,
}

impl Surface {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "S1" => Some(Self::S1),
            "S2" => Some(Self::S2),
            "S3" => Some(Self::S3),
            _ => None,
        }
    }
}

/// Declared value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarType {
    /// Any string.
    String,
    /// Absolute URL.
    Url,
    /// One of the values listed in `validation` (`a|b|c`).
    Enum,
    /// `true` or `false`.
    Boolean,
    /// JSON object or array.
    Json,
}

impl VarType {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(Self::String),
            "url" => Some(Self::Url),
            "enum" => Some(Self::Enum),
            "boolean" => Some(Self::Boolean),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Named value check applied before the type check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validation {
    /// `lower-case-words`.
    KebabCase,
    /// `2026-02-20T16:33:00Z`.
    Iso8601,
    /// `1.2.3`, optionally with pre-release/build suffix.
    Semver,
    /// Any non-empty value.
    NonEmpty,
}

impl Validation {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "kebab-case" => Some(Self::KebabCase),
            "iso-8601" => Some(Self::Iso8601),
            "semver" => Some(Self::Semver),
            "non-empty" => Some(Self::NonEmpty),
            _ => None,
        }
    }
}

/// Whether a variable is required or optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Must be present in every listed tier.
    Required,
    /// Type-checked only when present.
    Optional,
}

/// One declared variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarSpec {
    /// Variable name.
    pub name: String,
    /// Required or optional.
    pub requirement: Requirement,
    /// Tiers the variable applies to (non-empty).
    pub tiers: Vec<Tier>,
    /// Whether the value is a secret.
    pub secret: bool,
    /// Declared type.
    pub var_type: VarType,
    /// Named validation, if any.
    pub validation: Option<Validation>,
    /// Allowed values for `enum` variables (empty allows anything).
    pub allowed: Vec<String>,
}

impl VarSpec {
    /// Whether the variable applies to `tier`.
    #[must_use]
    pub fn applies_to(&self, tier: Tier) -> bool {
        self.tiers.contains(&tier)
    }
}

/// A validated environment contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contract {
    /// Exposure classification.
    pub surface: Surface,
    /// Declared variables by name.
    pub vars: BTreeMap<String, VarSpec>,
    /// Forbidden variable-name patterns.
    pub forbidden: Vec<WildcardPattern>,
}

/// Uppercase snake case: `A-Z`, `0-9`, `_`.
#[must_use]
pub fn is_var_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
}

impl Contract {
    /// Parses and shape-validates contract JSON.
    ///
    /// # Errors
    ///
    /// Returns a single `ENV_CONTRACT_PARSE_FAIL` for invalid JSON, or every
    /// shape error found.
    pub fn from_json(text: &str, file_name: &str) -> Result<Self, Vec<EnvError>> {
        let value: Value = serde_json::from_str(text).map_err(|_| {
            vec![EnvError::new(
                ErrorCode::ContractParseFail,
                format!("{file_name} is not valid JSON"),
            )]
        })?;
        Self::from_value(&value)
    }

    /// Shape-validates a parsed contract.
    ///
    /// # Errors
    ///
    /// Returns every shape error found.
    pub fn from_value(value: &Value) -> Result<Self, Vec<EnvError>> {
        let invalid = |detail: &str| EnvError::new(ErrorCode::ContractInvalid, detail);
        let mut errors = Vec::new();

        let Some(root) = value.as_object() else {
            return Err(vec![invalid("root must be object")]);
        };

        let surface = root.get("surface").and_then(Value::as_str).and_then(Surface::parse);
        if surface.is_none() {
            errors.push(invalid("surface must be S1|S2|S3"));
        }

        let empty = Map::new();
        let mut sections = [&empty, &empty];
        for (slot, key) in sections.iter_mut().zip(["required", "optional"]) {
            match root.get(key) {
                Some(Value::Object(map)) => *slot = map,
                _ => errors.push(invalid(&format!("{key} must be object"))),
            }
        }
        let [required, optional] = sections;

        let forbidden = match root.get("forbidden") {
            Some(Value::Array(items)) => forbidden_patterns(items, &mut errors),
            _ => {
                errors.push(invalid("forbidden must be array"));
                Vec::new()
            }
        };

        let mut vars = BTreeMap::new();
        for (entries, requirement) in [
            (required, Requirement::Required),
            (optional, Requirement::Optional),
        ] {
            for (name, meta) in entries {
                if vars.contains_key(name) {
                    errors.push(EnvError::for_var(
                        ErrorCode::ContractInvalidMeta,
                        name,
                        "is declared as both required and optional",
                    ));
                    continue;
                }
                if let Some(spec) = var_spec(name, meta, requirement, &mut errors) {
                    vars.insert(name.clone(), spec);
                }
            }
        }

        match surface {
            Some(surface) if errors.is_empty() => {
                debug!(vars = vars.len(), forbidden = forbidden.len(), "contract shape valid");
                Ok(Self {
                    surface,
                    vars,
                    forbidden,
                })
            }
            _ => Err(errors),
        }
    }

    /// Variables with the given requirement, by name.
    pub fn vars_with(&self, requirement: Requirement) -> impl Iterator<Item = &VarSpec> {
        self.vars.values().filter(move |v| v.requirement == requirement)
    }
}

fn forbidden_patterns(items: &[Value], errors: &mut Vec<EnvError>) -> Vec<WildcardPattern> {
    let mut patterns = Vec::new();
    for item in items {
        let compiled = item.as_str().map(WildcardPattern::new);
        match compiled {
            Some(Ok(pattern)) => patterns.push(pattern),
            _ => errors.push(EnvError::new(
                ErrorCode::ContractInvalid,
                format!("forbidden entry {item} must be a name pattern string"),
            )),
        }
    }
    patterns
}

fn var_spec(
    name: &str,
    meta: &Value,
    requirement: Requirement,
    errors: &mut Vec<EnvError>,
) -> Option<VarSpec> {
    let start = errors.len();

    if !is_var_name(name) {
        errors.push(EnvError::for_var(ErrorCode::ContractInvalidVarName, name, ""));
    }
    let Some(meta) = meta.as_object() else {
        errors.push(EnvError::for_var(ErrorCode::ContractInvalidMeta, name, ""));
        return None;
    };

    let mut tiers = Vec::new();
    match meta.get("tiers").and_then(Value::as_array) {
        Some(list) if !list.is_empty() => {
            for tier in list {
                match tier.as_str().and_then(|t| t.parse::<Tier>().ok()) {
                    Some(t) if !tiers.contains(&t) => tiers.push(t),
                    Some(_) => {}
                    None => errors.push(EnvError::for_var(
                        ErrorCode::ContractInvalidTier,
                        name,
                        &format!("has invalid tier {}", tier.as_str().map_or_else(|| tier.to_string(), str::to_string)),
                    )),
                }
            }
        }
        _ => errors.push(EnvError::for_var(ErrorCode::ContractInvalidTiers, name, "")),
    }

    let secret = meta.get("secret").and_then(Value::as_bool);
    if secret.is_none() {
        errors.push(EnvError::for_var(ErrorCode::ContractInvalidSecretFlag, name, ""));
    }

    let var_type = match meta.get("type").and_then(Value::as_str) {
        Some(t) => {
            let parsed = VarType::parse(t);
            if parsed.is_none() {
                errors.push(EnvError::for_var(
                    ErrorCode::ContractInvalidType,
                    name,
                    &format!("has unknown type {t}"),
                ));
            }
            parsed
        }
        None => {
            errors.push(EnvError::for_var(ErrorCode::ContractInvalidType, name, ""));
            None
        }
    };

    let raw_validation = meta.get("validation").and_then(Value::as_str).unwrap_or("");
    let (validation, allowed) = if var_type == Some(VarType::Enum) {
        let allowed = raw_validation
            .split('|')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        (None, allowed)
    } else {
        let validation = Validation::parse(raw_validation);
        if validation.is_none() && !raw_validation.is_empty() {
            warn!(var = name, validation = raw_validation, "ignoring unknown validation");
        }
        (validation, Vec::new())
    };

    if errors.len() > start {
        return None;
    }
    Some(VarSpec {
        name: name.to_string(),
        requirement,
        tiers,
        secret: secret.unwrap_or(false),
        var_type: var_type.unwrap_or(VarType::String),
        validation,
        allowed,
    })
}
