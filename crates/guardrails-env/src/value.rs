//! Typed value validation.
//!
//! Error details name the variable and the expectation, never the value.

use regex::Regex;

use crate::contract::{Validation, VarSpec, VarType};
use crate::error::{EnvError, ErrorCode};

const KEBAB_CASE: &str = r"^[a-z0-9]+(?:-[a-z0-9]+)*$";
const ISO_8601: &str = r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:\d{2})$";
const SEMVER: &str = r"^\d+\.\d+\.\d+(?:[-+][0-9A-Za-z.-]+)?$";

/// Validates values against their declared type and named validation.
#[derive(Debug, Clone)]
pub struct ValueChecker {
    kebab_case: Regex,
    iso_8601: Regex,
    semver: Regex,
}

impl ValueChecker {
    /// Compiles the named-validation patterns.
    ///
    /// # Errors
    ///
    /// Returns the regex error if a built-in pattern fails to compile.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            kebab_case: Regex::new(KEBAB_CASE)?,
            iso_8601: Regex::new(ISO_8601)?,
            semver: Regex::new(SEMVER)?,
        })
    }

    /// Checks one (trimmed) value. The named validation runs first; the
    /// first failure is returned.
    #[must_use]
    pub fn check(&self, spec: &VarSpec, value: &str) -> Option<EnvError> {
        let name = spec.name.as_str();
        let invalid_value = |reason: &str| Some(EnvError::for_var(ErrorCode::ContractInvalidValue, name, reason));
        let invalid_type = |reason: &str| Some(EnvError::for_var(ErrorCode::ContractInvalidType, name, reason));

        match spec.validation {
            Some(Validation::KebabCase) if !self.kebab_case.is_match(value) => {
                return invalid_value("must be kebab-case");
            }
            Some(Validation::Iso8601) if !self.iso_8601.is_match(value) => {
                return invalid_value("must be ISO-8601 (e.g. 2026-02-20T16:33:00Z)");
            }
            Some(Validation::Semver) if !self.semver.is_match(value) => {
                return invalid_value("must look like semver (e.g. 1.2.3)");
            }
            Some(Validation::NonEmpty) if value.is_empty() => {
                return invalid_value("must be non-empty");
            }
            _ => {}
        }

        match spec.var_type {
            VarType::String => None,
            VarType::Url => url::Url::parse(value)
                .is_err()
                .then(|| EnvError::for_var(ErrorCode::ContractInvalidType, name, "expected url")),
            VarType::Enum => {
                if spec.allowed.is_empty() || spec.allowed.iter().any(|a| a == value) {
                    None
                } else {
                    invalid_value(&format!("must be one of {}", spec.allowed.join(", ")))
                }
            }
            VarType::Boolean => {
                if value == "true" || value == "false" {
                    None
                } else {
                    invalid_type("expected boolean (true|false)")
                }
            }
            VarType::Json => match serde_json::from_str::<serde_json::Value>(value) {
                Ok(serde_json::Value::Object(_) | serde_json::Value::Array(_)) => None,
                _ => invalid_type("expected json object"),
            },
        }
    }
}
