//! guardrails CLI tool.
//!
//! Usage:
//! ```bash
//! guardrails authority
//! guardrails scan --family cross-repo --format compact
//! guardrails boundary --graph pnpm-list.json
//! guardrails env --mode runtime --tier production
//! guardrails list-rules
//! guardrails init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use guardrails_core::{FamilyId, ToolError, TOOL_FAILURE_PREFIX};
use guardrails_env::{EnvMode, Tier};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// CI guardrails for a standalone marketing codebase
#[derive(Parser)]
#[command(name = "guardrails")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Repository root to run in (default: current directory)
    #[arg(short = 'C', long = "dir", global = true, default_value = ".")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan copy and code for authority language
    Authority {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Scan for coupling to the platform repository
    CrossRepo {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Scan for prohibited platform coupling in code, copy and package.json
    Prohibited {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Run several lexical families in one pass
    Scan {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Only run these families (repeatable; default: all)
        #[arg(long = "family")]
        families: Vec<FamilyId>,
    },

    /// Enforce the transitive dependency boundary
    Boundary {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Read a saved `pnpm list --json` document instead of invoking pnpm
        #[arg(long)]
        graph: Option<PathBuf>,

        /// Skip the `pnpm why` chain explanation on failure
        #[arg(long)]
        no_explain: bool,
    },

    /// Validate the environment contract
    Env {
        /// check: contract and template only; runtime: also the merged env
        #[arg(long)]
        mode: EnvMode,

        /// Deployment tier (required in runtime mode)
        #[arg(long)]
        tier: Option<Tier>,
    },

    /// List rule families, rules, scopes and guards
    ListRules,

    /// Write a starter guardrails.toml
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for reports.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-finding compact format.
    Compact,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            match err.downcast_ref::<ToolError>() {
                Some(tool) => eprintln!("{}", tool.render()),
                None => eprintln!("{TOOL_FAILURE_PREFIX} {err:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<u8> {
    let root = cli.dir;
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Authority { format } => {
            let ctx = commands::Context::load(&root, config)?;
            commands::scan::run(&ctx, &[FamilyId::Authority], format)
        }
        Commands::CrossRepo { format } => {
            let ctx = commands::Context::load(&root, config)?;
            commands::scan::run(&ctx, &[FamilyId::CrossRepo], format)
        }
        Commands::Prohibited { format } => {
            let ctx = commands::Context::load(&root, config)?;
            commands::prohibited::run(&ctx, format)
        }
        Commands::Scan { format, families } => {
            let ctx = commands::Context::load(&root, config)?;
            let ids = if families.is_empty() {
                FamilyId::ALL.to_vec()
            } else {
                families
            };
            commands::scan::run(&ctx, &ids, format)
        }
        Commands::Boundary {
            format,
            graph,
            no_explain,
        } => {
            let ctx = commands::Context::load(&root, config)?;
            commands::boundary::run(&ctx, format, graph.as_deref(), !no_explain)
        }
        Commands::Env { mode, tier } => {
            let ctx = commands::Context::load(&root, config)?;
            commands::env::run(&ctx, mode, tier)
        }
        Commands::ListRules => {
            let ctx = commands::Context::load(&root, config)?;
            commands::list_rules::run(&ctx)?;
            Ok(0)
        }
        Commands::Init { force } => {
            commands::init::run(&root, force)?;
            Ok(0)
        }
    }
}
