//! List rules command implementation.

use anyhow::Result;
use guardrails_deps::{BoundarySpec, RULE_ID};

use super::Context;

/// Prints every configured lexical family, then the boundary rule.
pub fn run(ctx: &Context) -> Result<()> {
    let families = guardrails_rules::families(&guardrails_core::FamilyId::ALL, &ctx.config)?;

    println!("Lexical families:\n");
    for family in &families {
        println!("{} ({}, {})", family.id, family.title, family.severity);
        println!("  scope: {}", family.scope.describe());
        for rule in &family.rules {
            println!("  - {}", rule.describe());
        }
        for guard in &family.guards {
            println!(
                "  guard {} ({}): window {} word(s)",
                guard.id(),
                guard.class(),
                guard.window()
            );
        }
        println!();
    }

    let spec = BoundarySpec::from_section(&ctx.config.boundary);
    println!("Dependency boundary:\n");
    println!("{RULE_ID}");
    println!("  forbidden: {}", spec.forbidden_exact.join(", "));
    println!("  forbidden namespaces: {}", spec.forbidden_prefixes.join(", "));
    println!("  hard origin markers: {}", spec.hard_markers.join(", "));

    println!("\nRun one family with, e.g.:");
    println!("  guardrails scan --family cross-repo");
    Ok(())
}
