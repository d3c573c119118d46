//! # guardrails-core
//!
//! Core framework for the guardrail scanners that gate CI on a standalone
//! marketing codebase.
//!
//! This crate provides the foundational types shared by every scanner:
//!
//! - [`FileRecord`] and the [`FileLister`] collaborators that produce them
//! - [`ScopeResolver`] for deciding which paths a rule family may look at
//! - [`RuleEngine`] and [`RuleFamily`] for line-based lexical detection,
//!   including [`NegationGuard`]s and escape hatches
//! - [`Finding`] / [`Report`] for uniform results
//! - [`Mode`] and [`exit_code`] for mapping a report to a process exit code
//! - [`ToolError`] for failures of the tooling itself
//!
//! ## Example
//!
//! ```ignore
//! use guardrails_core::{RuleEngine, Mode};
//!
//! let engine = RuleEngine::builder()
//!     .family(my_family)
//!     .escape_hatch("guardrails:allow-crossrepo")
//!     .build();
//!
//! let report = engine.scan("Guardrails: example", &files);
//! std::process::exit(guardrails_core::exit_code(&report, Mode::Error));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod files;
mod guard;
mod policy;
mod rule;
mod scope;
mod types;

pub mod process;

/// Lexical helpers shared by rule implementations.
pub mod utils;

pub use config::{
    BoundarySection, Config, ConfigError, EnvSection, FamilyConfig, ScanConfig,
    INCLUDE_UNTRACKED_ENV_VAR,
};
pub use engine::{RuleEngine, RuleEngineBuilder};
pub use error::{ToolError, POLICY_FAILURE_PREFIX, TOOL_FAILURE_PREFIX};
pub use files::{FileLister, FileRecord, GitLister, WalkLister};
pub use guard::{GuardClass, NegationGuard};
pub use policy::{exit_code, Mode, MODE_ENV_VAR};
pub use rule::{FamilyId, Rule, RuleFamily, RuleMatcher};
pub use scope::{normalize_path, PathMatcher, ScopeAction, ScopeResolver, ScopeRule};
pub use types::{truncate_chars, Finding, Report, Severity, SNIPPET_MAX_CHARS};
