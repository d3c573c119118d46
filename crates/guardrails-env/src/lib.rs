//! # guardrails-env
//!
//! Environment contract validator for guardrails.
//!
//! A JSON [`Contract`] declares every variable the site needs: which
//! [`Tier`]s require it, whether it is a secret, and its type. The committed
//! template (`.env.example`) must stay in sync with it.
//!
//! - [`EnvValidator::check`]: contract shape, template completeness,
//!   secret placeholders, forbidden names in the template
//! - [`EnvValidator::runtime`]: all of the above, then the merged runtime
//!   environment for one tier
//!
//! Values never appear in errors or logs; only variable names, loaded file
//! names and reasons do.
//!
//! ## Example
//!
//! ```ignore
//! use guardrails_env::{EnvSettings, EnvValidator, Tier};
//!
//! let validator = EnvValidator::new(".", EnvSettings::default())?;
//! let outcome = validator.runtime(Tier::Production, std::env::vars());
//! eprint!("{}", outcome.render());
//! std::process::exit(outcome.exit_code());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod contract;
pub mod dotenv;
mod error;
pub mod template;
mod validator;
pub mod value;
pub mod wildcard;

pub use contract::{Contract, Requirement, Surface, Tier, Validation, VarSpec, VarType};
pub use error::{EnvError, ErrorCode};
pub use template::{Template, DEFAULT_PLACEHOLDERS};
pub use validator::{
    EnvMode, EnvOutcome, EnvSettings, EnvValidator, LoadedEnv, DEFAULT_CONTRACT,
    DEFAULT_ENV_FILES, DEFAULT_TEMPLATE,
};
pub use value::ValueChecker;
