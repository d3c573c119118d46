//! Check-mode and runtime-mode validation against a repository.
//!
//! ```text
//! check:   contract shape -> template complete -> secrets are placeholders
//!          -> forbidden absent from template
//! runtime: [check] -> load env files -> overlay process env
//!          -> forbidden absent -> per-variable validation
//! ```
//!
//! Every stage fails fast: its errors are reported and later stages do not
//! run.

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, info};

use guardrails_core::{normalize_path, EnvSection, ToolError, POLICY_FAILURE_PREFIX, TOOL_FAILURE_PREFIX};

use crate::contract::{Contract, Requirement, Tier};
use crate::dotenv::parse_env_file;
use crate::error::{EnvError, ErrorCode};
use crate::template::{forbidden_errors, Template, DEFAULT_PLACEHOLDERS};
use crate::value::ValueChecker;

/// Default contract path.
pub const DEFAULT_CONTRACT: &str = "env.contract.json";

/// Default template path.
pub const DEFAULT_TEMPLATE: &str = ".env.example";

/// Default runtime env files, highest precedence first.
pub const DEFAULT_ENV_FILES: &[&str] = &[".env.local", ".env"];

/// Validation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvMode {
    /// Contract and template only; no secrets needed.
    Check,
    /// Check, then validate the runtime environment for a tier.
    Runtime,
}

impl fmt::Display for EnvMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Check => f.write_str("check"),
            Self::Runtime => f.write_str("runtime"),
        }
    }
}

impl FromStr for EnvMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "check" => Ok(Self::Check),
            "runtime" => Ok(Self::Runtime),
            other => Err(format!("unknown mode `{other}`, expected check|runtime")),
        }
    }
}

/// File layout and placeholder policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvSettings {
    /// Contract path, relative to the root.
    pub contract: PathBuf,
    /// Template path, relative to the root.
    pub template: PathBuf,
    /// Runtime env files, highest precedence first.
    pub env_files: Vec<PathBuf>,
    /// Accepted secret placeholders (empty is always accepted).
    pub placeholders: Vec<String>,
}

impl Default for EnvSettings {
    fn default() -> Self {
        Self {
            contract: PathBuf::from(DEFAULT_CONTRACT),
            template: PathBuf::from(DEFAULT_TEMPLATE),
            env_files: DEFAULT_ENV_FILES.iter().map(PathBuf::from).collect(),
            placeholders: DEFAULT_PLACEHOLDERS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

impl EnvSettings {
    /// Defaults with `[env]` overrides applied.
    #[must_use]
    pub fn from_section(section: &EnvSection) -> Self {
        let mut settings = Self::default();
        if let Some(contract) = &section.contract {
            settings.contract.clone_from(contract);
        }
        if let Some(template) = &section.template {
            settings.template.clone_from(template);
        }
        if let Some(files) = &section.env_files {
            settings.env_files.clone_from(files);
        }
        if let Some(placeholders) = &section.placeholders {
            settings.placeholders.clone_from(placeholders);
        }
        settings
    }
}

fn display(path: &Path) -> String {
    normalize_path(&path.to_string_lossy())
}

/// Result of one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOutcome {
    /// Errors of the stage that failed, in report order.
    pub errors: Vec<EnvError>,
    /// Whether the failure is a broken input rather than a policy violation.
    pub tool_failure: bool,
    /// Env files actually loaded (runtime mode only).
    pub loaded_files: Option<Vec<String>>,
}

impl EnvOutcome {
    fn policy(errors: Vec<EnvError>) -> Self {
        Self {
            errors,
            ..Self::default()
        }
    }

    fn tool(errors: Vec<EnvError>) -> Self {
        Self {
            errors,
            tool_failure: true,
            loaded_files: None,
        }
    }

    /// Whether validation passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }

    /// Exit code: 0 on pass, 1 otherwise.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.passed())
    }

    /// `ENV_RUNTIME_LOADED_FILES: ...` diagnostic, runtime mode only.
    #[must_use]
    pub fn loaded_files_line(&self) -> Option<String> {
        self.loaded_files.as_ref().map(|files| {
            let names = if files.is_empty() {
                "(none)".to_string()
            } else {
                files.join(", ")
            };
            format!("ENV_RUNTIME_LOADED_FILES: {names}")
        })
    }

    /// Error lines with the tool- or policy-failure prefix.
    #[must_use]
    pub fn render(&self) -> String {
        let prefix = if self.tool_failure {
            TOOL_FAILURE_PREFIX
        } else {
            POLICY_FAILURE_PREFIX
        };
        let mut out = String::new();
        for error in &self.errors {
            let _ = writeln!(out, "{prefix} {error}");
            if let Some(action) = &error.action {
                let _ = writeln!(out, "{prefix} ACTION: {action}");
            }
        }
        out
    }
}

/// Runtime environment assembled from env files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedEnv {
    /// Merged values; earlier files win.
    pub values: BTreeMap<String, String>,
    /// Names of the files that were found and read.
    pub loaded: Vec<String>,
}

/// Validates a repository's environment contract.
#[derive(Debug, Clone)]
pub struct EnvValidator {
    root: PathBuf,
    settings: EnvSettings,
    checker: ValueChecker,
}

impl EnvValidator {
    /// Creates a validator for the repository at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Pattern`] if a built-in validation pattern fails
    /// to compile.
    pub fn new(root: impl Into<PathBuf>, settings: EnvSettings) -> Result<Self, ToolError> {
        let checker = ValueChecker::new().map_err(|source| ToolError::Pattern {
            rule: "env-value-validation".to_string(),
            source,
        })?;
        Ok(Self {
            root: root.into(),
            settings,
            checker,
        })
    }

    /// Settings in use.
    #[must_use]
    pub fn settings(&self) -> &EnvSettings {
        &self.settings
    }

    fn load_contract(&self) -> Result<Contract, EnvOutcome> {
        let name = display(&self.settings.contract);
        let path = self.root.join(&self.settings.contract);
        if !path.exists() {
            return Err(EnvOutcome::tool(vec![EnvError::new(
                ErrorCode::ContractMissing,
                format!("{name} not found at repo root"),
            )]));
        }
        let text = std::fs::read_to_string(&path).map_err(|_| {
            EnvOutcome::tool(vec![EnvError::new(
                ErrorCode::ContractReadFail,
                format!("could not read {name}"),
            )])
        })?;
        Contract::from_json(&text, &name).map_err(EnvOutcome::tool)
    }

    fn load_template(&self) -> Result<Template, EnvOutcome> {
        let name = display(&self.settings.template);
        let path = self.root.join(&self.settings.template);
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Template::parse(&text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(EnvOutcome::tool(vec![EnvError::new(
                    ErrorCode::TemplateMissing,
                    format!("{name} not found at repo root"),
                )]))
            }
            Err(_) => Err(EnvOutcome::tool(vec![EnvError::new(
                ErrorCode::TemplateMissing,
                format!("could not read {name}"),
            )])),
        }
    }

    fn run_check(&self) -> Result<Contract, EnvOutcome> {
        let contract = self.load_contract()?;
        let template = self.load_template()?;
        debug!("contract and template loaded");

        let mut errors = template.check_complete(&contract);
        errors.extend(template.check_secrets(&contract, &self.settings.placeholders));
        if !errors.is_empty() {
            return Err(EnvOutcome::policy(errors));
        }

        let errors = template.check_forbidden(&contract, &display(&self.settings.template));
        if !errors.is_empty() {
            return Err(EnvOutcome::policy(errors));
        }
        Ok(contract)
    }

    /// Check mode.
    #[must_use]
    pub fn check(&self) -> EnvOutcome {
        let outcome = match self.run_check() {
            Ok(_) => EnvOutcome::default(),
            Err(outcome) => outcome,
        };
        info!(mode = "check", errors = outcome.errors.len(), "env contract validated");
        outcome
    }

    /// Reads the configured env files; earlier files win over later ones.
    ///
    /// # Errors
    ///
    /// Returns a tool-failure outcome if an existing file cannot be read.
    pub fn load_env_files(&self) -> Result<LoadedEnv, EnvOutcome> {
        let mut env = LoadedEnv::default();
        for file in &self.settings.env_files {
            let path = self.root.join(file);
            if !path.is_file() {
                continue;
            }
            let name = display(file);
            let text = std::fs::read_to_string(&path).map_err(|_| {
                EnvOutcome::tool(vec![EnvError::new(
                    ErrorCode::ContractReadFail,
                    format!("could not read {name}"),
                )])
            })?;
            for (key, value) in parse_env_file(&text) {
                env.values.entry(key).or_insert(value);
            }
            env.loaded.push(name);
        }
        info!(files = ?env.loaded, "env files loaded");
        Ok(env)
    }

    /// Runtime mode for `tier`. `process_env` overrides file values.
    #[must_use]
    pub fn runtime<I>(&self, tier: Tier, process_env: I) -> EnvOutcome
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let outcome = self.run_runtime(tier, process_env);
        info!(
            mode = "runtime",
            tier = %tier,
            errors = outcome.errors.len(),
            "env contract validated"
        );
        outcome
    }

    fn run_runtime<I>(&self, tier: Tier, process_env: I) -> EnvOutcome
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let contract = match self.run_check() {
            Ok(contract) => contract,
            Err(outcome) => return outcome,
        };
        let loaded = match self.load_env_files() {
            Ok(loaded) => loaded,
            Err(outcome) => return outcome,
        };
        let loaded_files = Some(loaded.loaded.clone());

        let mut values = loaded.values;
        values.extend(process_env);

        let context = format!("runtime env (tier={tier})");
        let forbidden = forbidden_errors(&contract, values.keys().map(String::as_str), &context);
        if !forbidden.is_empty() {
            return EnvOutcome {
                loaded_files,
                ..EnvOutcome::policy(forbidden)
            };
        }

        let mut errors = Vec::new();
        let mut required_failed = false;
        for spec in contract.vars.values().filter(|v| v.applies_to(tier)) {
            let value = values.get(&spec.name).map_or("", |v| v.trim());
            let required = spec.requirement == Requirement::Required;
            if value.is_empty() {
                if required {
                    required_failed = true;
                    errors.push(EnvError::for_var(
                        ErrorCode::ContractMissingRequired,
                        &spec.name,
                        &format!("(tier={tier})"),
                    ));
                }
                continue;
            }
            if let Some(error) = self.checker.check(spec, value) {
                required_failed |= required;
                errors.push(error);
            }
        }

        if required_failed && loaded.loaded.is_empty() {
            let files = self
                .settings
                .env_files
                .iter()
                .map(|f| display(f))
                .collect::<Vec<_>>()
                .join(" or ");
            let first = self
                .settings
                .env_files
                .first()
                .map_or_else(|| ".env.local".to_string(), |f| display(f));
            errors.insert(
                0,
                EnvError::new(
                    ErrorCode::RuntimeNoEnvFile,
                    format!("No {files} found for runtime validation."),
                )
                .with_action(format!(
                    "cp {} {first} (then re-run) OR export required vars in your shell.",
                    display(&self.settings.template)
                )),
            );
        }

        EnvOutcome {
            loaded_files,
            ..EnvOutcome::policy(errors)
        }
    }
}
