//! The committed template (`.env.example`) and its sync checks.

use std::collections::BTreeSet;

use crate::contract::{Contract, Requirement};
use crate::dotenv::{parse_entries, EnvEntry};
use crate::error::{EnvError, ErrorCode};
use crate::wildcard::first_match;

/// Values a secret may carry in the template (besides empty).
pub const DEFAULT_PLACEHOLDERS: &[&str] = &[
    "__SET_IN_SECRET_STORE__",
    "__REPLACE_ME__",
    "__SECRET__",
    "disabled",
];

/// Parsed template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    entries: Vec<EnvEntry>,
}

impl Template {
    /// Parses template text.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        Self {
            entries: parse_entries(content),
        }
    }

    /// Declared variable names.
    #[must_use]
    pub fn names(&self) -> BTreeSet<&str> {
        self.entries.iter().map(|e| e.key.as_str()).collect()
    }

    /// Every variable of the contract must be declared.
    #[must_use]
    pub fn check_complete(&self, contract: &Contract) -> Vec<EnvError> {
        let names = self.names();
        let mut errors = Vec::new();
        for (requirement, code) in [
            (Requirement::Required, ErrorCode::TemplateMissingRequiredVar),
            (Requirement::Optional, ErrorCode::TemplateMissingOptionalVar),
        ] {
            errors.extend(
                contract
                    .vars_with(requirement)
                    .filter(|v| !names.contains(v.name.as_str()))
                    .map(|v| EnvError::for_var(code, &v.name, "")),
            );
        }
        errors
    }

    /// Secret variables may only carry a placeholder or nothing, on every
    /// line that assigns them.
    #[must_use]
    pub fn check_secrets(&self, contract: &Contract, placeholders: &[String]) -> Vec<EnvError> {
        let offenders: BTreeSet<&str> = self
            .entries
            .iter()
            .filter(|e| contract.vars.get(&e.key).is_some_and(|v| v.secret))
            .filter(|e| !e.value.is_empty() && !placeholders.iter().any(|p| *p == e.value))
            .map(|e| e.key.as_str())
            .collect();
        offenders
            .into_iter()
            .map(|name| {
                EnvError::for_var(ErrorCode::TemplateSecretMustBePlaceholderOrEmpty, name, "")
                    .with_action(format!(
                        "replace the value with one of: {}",
                        placeholders.join(", ")
                    ))
            })
            .collect()
    }

    /// Declaring a forbidden name at all is a violation, placeholder or not.
    #[must_use]
    pub fn check_forbidden(&self, contract: &Contract, file_name: &str) -> Vec<EnvError> {
        forbidden_errors(contract, self.names(), file_name)
    }
}

/// Errors for every name matching a forbidden pattern.
pub(crate) fn forbidden_errors<'a>(
    contract: &Contract,
    names: impl IntoIterator<Item = &'a str>,
    context: &str,
) -> Vec<EnvError> {
    names
        .into_iter()
        .filter_map(|name| {
            first_match(&contract.forbidden, name).map(|p| {
                EnvError::for_var(
                    ErrorCode::ContractForbiddenVar,
                    name,
                    &format!("(matched: {}) in {context}", p.as_str()),
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTRACT: &str = r#"{
        "surface": "S1",
        "required": {
            "APP_ID": { "tiers": ["local"], "secret": false, "type": "string" },
            "API_TOKEN": { "tiers": ["production"], "secret": true, "type": "string" }
        },
        "optional": {
            "SENTRY_DSN": { "tiers": ["production"], "secret": true, "type": "url" }
        },
        "forbidden": ["SCIENTIA_*"]
    }"#;

    fn contract() -> Contract {
        Contract::from_json(CONTRACT, "env.contract.json").unwrap()
    }

    fn placeholders() -> Vec<String> {
        DEFAULT_PLACEHOLDERS.iter().map(|s| (*s).to_string()).collect()
    }

    fn messages(errors: &[EnvError]) -> Vec<String> {
        errors.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn missing_variables_are_named() {
        let template = Template::parse("APP_ID=marketing\n");
        assert_eq!(
            messages(&template.check_complete(&contract())),
            vec![
                "ENV_TEMPLATE_MISSING_REQUIRED_VAR: API_TOKEN",
                "ENV_TEMPLATE_MISSING_OPTIONAL_VAR: SENTRY_DSN",
            ]
        );
    }

    #[test]
    fn secrets_must_be_placeholders_or_empty() {
        let template = Template::parse(
            "APP_ID=marketing\nAPI_TOKEN=__SET_IN_SECRET_STORE__\nSENTRY_DSN=\n",
        );
        assert!(template.check_secrets(&contract(), &placeholders()).is_empty());

        let template = Template::parse("API_TOKEN=__SECRET__\nAPI_TOKEN=sk_live_123\n");
        let errors = template.check_secrets(&contract(), &placeholders());
        assert_eq!(
            messages(&errors),
            vec!["ENV_TEMPLATE_SECRET_MUST_BE_PLACEHOLDER_OR_EMPTY: API_TOKEN"]
        );
        assert!(!errors[0].detail.contains("sk_live_123"));
    }

    #[test]
    fn exported_secrets_are_still_checked() {
        let template = Template::parse(
            "export APP_ID=marketing\nexport API_TOKEN=sk_live_123\nexport SENTRY_DSN=\n",
        );
        assert!(template.check_complete(&contract()).is_empty());
        assert_eq!(
            messages(&template.check_secrets(&contract(), &placeholders())),
            vec!["ENV_TEMPLATE_SECRET_MUST_BE_PLACEHOLDER_OR_EMPTY: API_TOKEN"]
        );
    }

    #[test]
    fn forbidden_names_fail_even_as_placeholders() {
        let template = Template::parse("APP_ID=x\nSCIENTIA_DB_URL=__REPLACE_ME__\n");
        assert_eq!(
            messages(&template.check_forbidden(&contract(), ".env.example")),
            vec!["ENV_CONTRACT_FORBIDDEN_VAR: SCIENTIA_DB_URL (matched: SCIENTIA_*) in .env.example"]
        );
    }
}
