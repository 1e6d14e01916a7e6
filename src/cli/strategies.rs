//! Strategies command: list the named presets.

use crate::cli::common::{print_json, CliResult};
use crate::rename::{Strategy, StrategyKind};
use clap::Args;
use serde::Serialize;

/// List available renaming strategies
#[derive(Debug, Clone, Args)]
pub struct StrategiesArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct StrategyOutput {
    name: &'static str,
    description: &'static str,
    banding: String,
    threshold: String,
    within: Vec<String>,
    pattern: String,
    scope: String,
    requires_tag: bool,
}

impl StrategiesArgs {
    /// Execute the strategies command
    pub fn execute(&self) -> CliResult<()> {
        let presets: Vec<StrategyOutput> = StrategyKind::ALL
            .into_iter()
            .map(|kind| {
                let strategy = Strategy::preset(kind);
                StrategyOutput {
                    name: kind.name(),
                    description: kind.description(),
                    banding: strategy.banding.to_string(),
                    threshold: strategy.threshold.to_string(),
                    within: strategy.within.iter().map(ToString::to_string).collect(),
                    pattern: strategy.template.pattern().to_string(),
                    scope: strategy.scope.to_string(),
                    requires_tag: strategy.validate().is_err(),
                }
            })
            .collect();

        if self.json {
            return print_json(&presets);
        }

        println!("Available strategies:");
        println!();
        for preset in &presets {
            let tag_note = if preset.requires_tag { " (needs --tag)" } else { "" };
            println!("  {:<12} {}{}", preset.name, preset.description, tag_note);
            println!(
                "  {:<12} {}, threshold {}, within [{}], names {}, per {}",
                "",
                preset.banding,
                preset.threshold,
                preset.within.join(", "),
                preset.pattern,
                preset.scope
            );
        }
        Ok(())
    }
}
