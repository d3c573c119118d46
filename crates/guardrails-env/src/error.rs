//! Stable error codes and the env validation error type.

use std::fmt;

/// Stable, machine-greppable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorCode {
    /// Contract file does not exist.
    ContractMissing,
    /// Contract file exists but cannot be read.
    ContractReadFail,
    /// Contract file is not valid JSON.
    ContractParseFail,
    /// Contract root, surface or section has the wrong shape.
    ContractInvalid,
    /// Variable name is not uppercase snake case.
    ContractInvalidVarName,
    /// Variable metadata is not an object, or is inconsistent.
    ContractInvalidMeta,
    /// Tier list is missing or empty.
    ContractInvalidTiers,
    /// Tier list names an unknown tier.
    ContractInvalidTier,
    /// `secret` is not a boolean.
    ContractInvalidSecretFlag,
    /// Declared type is missing or unknown; or a value fails its type.
    ContractInvalidType,
    /// Template file does not exist.
    TemplateMissing,
    /// Template lacks a required variable.
    TemplateMissingRequiredVar,
    /// Template lacks an optional variable.
    TemplateMissingOptionalVar,
    /// Secret variable carries a real value in the template.
    TemplateSecretMustBePlaceholderOrEmpty,
    /// A forbidden variable is declared or present.
    ContractForbiddenVar,
    /// Required variable absent or empty at runtime.
    ContractMissingRequired,
    /// Value fails its named validation or enum set.
    ContractInvalidValue,
    /// Runtime validation found no env file on disk.
    RuntimeNoEnvFile,
    /// Runtime mode was requested without a tier.
    RuntimeRequiresTier,
}

impl ErrorCode {
    /// The code as printed.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ContractMissing => "ENV_CONTRACT_MISSING",
            Self::ContractReadFail => "ENV_CONTRACT_READ_FAIL",
            Self::ContractParseFail => "ENV_CONTRACT_PARSE_FAIL",
            Self::ContractInvalid => "ENV_CONTRACT_INVALID",
            Self::ContractInvalidVarName => "ENV_CONTRACT_INVALID_VAR_NAME",
            Self::ContractInvalidMeta => "ENV_CONTRACT_INVALID_META",
            Self::ContractInvalidTiers => "ENV_CONTRACT_INVALID_TIERS",
            Self::ContractInvalidTier => "ENV_CONTRACT_INVALID_TIER",
            Self::ContractInvalidSecretFlag => "ENV_CONTRACT_INVALID_SECRET_FLAG",
            Self::ContractInvalidType => "ENV_CONTRACT_INVALID_TYPE",
            Self::TemplateMissing => "ENV_TEMPLATE_MISSING",
            Self::TemplateMissingRequiredVar => "ENV_TEMPLATE_MISSING_REQUIRED_VAR",
            Self::TemplateMissingOptionalVar => "ENV_TEMPLATE_MISSING_OPTIONAL_VAR",
            Self::TemplateSecretMustBePlaceholderOrEmpty => {
                "ENV_TEMPLATE_SECRET_MUST_BE_PLACEHOLDER_OR_EMPTY"
            }
            Self::ContractForbiddenVar => "ENV_CONTRACT_FORBIDDEN_VAR",
            Self::ContractMissingRequired => "ENV_CONTRACT_MISSING_REQUIRED",
            Self::ContractInvalidValue => "ENV_CONTRACT_INVALID_VALUE",
            Self::RuntimeNoEnvFile => "ENV_RUNTIME_NO_ENV_FILE",
            Self::RuntimeRequiresTier => "ENV_CONTRACT_RUNTIME_REQUIRES_TIER",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One validation error. Never carries a variable's value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {detail}")]
pub struct EnvError {
    /// Stable code.
    pub code: ErrorCode,
    /// Variable concerned, if any.
    pub var: Option<String>,
    /// Human-readable detail (names and reasons only).
    pub detail: String,
    /// Corrective instruction, printed as an `ACTION:` line.
    pub action: Option<String>,
}

impl EnvError {
    /// Error not tied to a variable.
    #[must_use]
    pub fn new(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            var: None,
            detail: detail.into(),
            action: None,
        }
    }

    /// Error about `var`; the detail starts with the variable name.
    #[must_use]
    pub fn for_var(code: ErrorCode, var: &str, reason: &str) -> Self {
        let detail = if reason.is_empty() {
            var.to_string()
        } else {
            format!("{var} {reason}")
        };
        Self {
            code,
            var: Some(var.to_string()),
            detail,
            action: None,
        }
    }

    /// Attaches a corrective instruction.
    #[must_use]
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_code_then_detail() {
        let err = EnvError::for_var(ErrorCode::TemplateMissingRequiredVar, "APP_ID", "");
        assert_eq!(err.to_string(), "ENV_TEMPLATE_MISSING_REQUIRED_VAR: APP_ID");

        let err = EnvError::for_var(ErrorCode::ContractInvalidType, "SITE_URL", "expected url");
        assert_eq!(err.to_string(), "ENV_CONTRACT_INVALID_TYPE: SITE_URL expected url");
        assert_eq!(err.var.as_deref(), Some("SITE_URL"));
    }
}
