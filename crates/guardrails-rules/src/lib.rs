//! # guardrails-rules
//!
//! Built-in rule families for guardrails.
//!
//! Every family is a configuration of the single line rule engine from
//! `guardrails-core`; none carries its own matching loop.
//!
//! ## Available Families
//!
//! | Family | Rule ids | Scope |
//! |--------|----------|-------|
//! | `authority` | `authority-keywords`, `authority-regex` | `content/`, `src/` |
//! | `cross-repo` | `cross-repo-import` | `content/`, `src/` |
//! | `prohibited-pattern` | `e1-db-reach-through`, `e1-platform-import` | code and MDX, repository-wide |
//! | `authority-collapse` | `e1-authority-collapse` | `.md`, `.mdx` under `content/`, `src/` |
//!
//! All families share the exclusions in [`DEFAULT_EXCLUDES`] and
//! [`LOCKFILE_SUFFIXES`].
//!
//! ## Usage
//!
//! ```ignore
//! use guardrails_core::Config;
//! use guardrails_rules::{engine, Preset};
//!
//! let engine = engine(Preset::Authority.families(), &Config::default())?;
//! let report = engine.scan("Guardrails: Authority", &files);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod authority;
pub mod collapse;
pub mod cross_repo;
mod options;
mod presets;
pub mod prohibited;
mod scope;

pub use options::FamilyOptions;
pub use presets::{
    all_families, engine, families, family, title, validate, Preset, DEFAULT_ESCAPE_HATCHES,
};
pub use scope::{base_scope, DEFAULT_EXCLUDES, LOCKFILE_SUFFIXES};

/// Re-export core types for convenience.
pub use guardrails_core::{FamilyId, Finding, Report, RuleFamily, Severity};
