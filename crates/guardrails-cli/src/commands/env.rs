//! Env command implementation.

use anyhow::Result;
use guardrails_env::{EnvError, EnvMode, EnvOutcome, EnvSettings, EnvValidator, ErrorCode, Tier};

use super::Context;

/// Runs the env contract validator in `mode`.
pub fn run(ctx: &Context, mode: EnvMode, tier: Option<Tier>) -> Result<u8> {
    let validator = EnvValidator::new(ctx.root.clone(), EnvSettings::from_section(&ctx.config.env))?;
    let outcome = validate(&validator, mode, tier);

    if let Some(line) = outcome.loaded_files_line() {
        eprintln!("{line}");
    }
    eprint!("{}", outcome.render());
    if outcome.passed() {
        match tier {
            Some(tier) if mode == EnvMode::Runtime => println!("✅ env contract ({mode}, tier={tier}): ok"),
            _ => println!("✅ env contract ({mode}): ok"),
        }
    }
    Ok(u8::from(!outcome.passed()))
}

fn validate(validator: &EnvValidator, mode: EnvMode, tier: Option<Tier>) -> EnvOutcome {
    match (mode, tier) {
        (EnvMode::Check, _) => validator.check(),
        (EnvMode::Runtime, Some(tier)) => validator.runtime(tier, std::env::vars()),
        (EnvMode::Runtime, None) => EnvOutcome {
            errors: vec![EnvError::new(
                ErrorCode::RuntimeRequiresTier,
                "--mode runtime requires --tier local|preview|production",
            )],
            tool_failure: true,
            loaded_files: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn runtime_without_tier_is_a_tool_failure() {
        let dir = TempDir::new().unwrap();
        let validator = EnvValidator::new(dir.path(), EnvSettings::default()).unwrap();
        let outcome = validate(&validator, EnvMode::Runtime, None);
        assert!(outcome.tool_failure);
        assert!(outcome
            .render()
            .starts_with("guardrails: tool failure: ENV_CONTRACT_RUNTIME_REQUIRES_TIER"));
    }
}
