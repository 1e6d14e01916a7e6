//! Configuration management CLI commands.

use crate::cli::common::{chain, print_json, CliError, CliResult};
use crate::cli::rename::StrategyFlags;
use crate::config::Config;
use crate::constants::APP_NAME;
use crate::rename::StrategyOptions;
use clap::{Args, Subcommand};
use serde::Serialize;

/// Configuration management commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Display current configuration
    Show(ConfigShowArgs),
    /// Set rename defaults
    Set(ConfigSetArgs),
    /// Remove all rename defaults
    Reset,
}

/// Display current configuration
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Set rename defaults
#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    #[command(flatten)]
    flags: StrategyFlags,
}

/// JSON-serializable configuration for output
#[derive(Serialize, Debug)]
struct ConfigOutput {
    path: String,
    exists: bool,
    rename: StrategyOptions,
    effective: Option<String>,
}

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            ConfigCommand::Show(args) => args.execute(),
            ConfigCommand::Set(args) => args.execute(),
            ConfigCommand::Reset => reset(),
        }
    }
}

impl ConfigShowArgs {
    /// Execute show command
    pub fn execute(&self) -> CliResult<()> {
        let config = Config::load().map_err(|e| {
            CliError::validation(format!("Failed to load configuration: {}", chain(&e)))
        })?;
        let path = Config::config_file_path().map_err(|e| CliError::io(chain(&e)))?;

        let output = ConfigOutput {
            path: path.display().to_string(),
            exists: path.exists(),
            effective: config.rename.resolve().ok().map(|s| s.describe()),
            rename: config.rename,
        };

        if self.json {
            print_json(&output)?;
        } else {
            output_human_readable(&output);
        }

        Ok(())
    }
}

impl ConfigSetArgs {
    /// Execute set command
    pub fn execute(&self) -> CliResult<()> {
        let update = self.flags.to_options()?;
        if update.is_empty() {
            return Err(CliError::validation(
                "At least one option must be specified: --strategy, --divisor, --pixels, --anchor, --tag, --within, --pattern, --width or --scope",
            ));
        }

        let mut config = Config::load().map_err(|e| {
            CliError::validation(format!("Failed to load configuration: {}", chain(&e)))
        })?;
        config.rename = config.rename.overridden_by(update);

        config
            .validate()
            .map_err(|e| CliError::validation(chain(&e)))?;
        let path = config
            .save()
            .map_err(|e| CliError::io(format!("Failed to save configuration: {}", chain(&e))))?;

        println!("Configuration updated: {}", path.display());
        Ok(())
    }
}

fn reset() -> CliResult<()> {
    let path = Config::new()
        .save()
        .map_err(|e| CliError::io(format!("Failed to save configuration: {}", chain(&e))))?;
    println!("Rename defaults cleared: {}", path.display());
    Ok(())
}

/// Output configuration in human-readable format
fn output_human_readable(output: &ConfigOutput) {
    println!("{APP_NAME} configuration");
    println!("=====================");
    println!();
    println!(
        "File: {}{}",
        output.path,
        if output.exists { "" } else { " (not created yet)" }
    );
    println!();

    let rename = &output.rename;
    println!("[rename]");
    if rename.is_empty() {
        println!("  (no defaults set; built-in presets apply)");
    }
    if let Some(strategy) = rename.strategy {
        println!("  strategy: {strategy}");
    }
    if let Some(divisor) = rename.divisor {
        println!("  divisor:  {divisor}");
    }
    if let Some(pixels) = rename.pixels {
        println!("  pixels:   {pixels}");
    }
    if let Some(anchor) = rename.anchor {
        println!("  anchor:   {anchor}");
    }
    if let Some(tag) = &rename.tag {
        println!("  tag:      {tag}");
    }
    if let Some(within) = &rename.within {
        println!("  within:   {}", within.join(", "));
    }
    if let Some(pattern) = &rename.pattern {
        println!("  pattern:  {pattern}");
    }
    if let Some(width) = rename.width {
        println!("  width:    {width}");
    }
    if let Some(scope) = rename.scope {
        println!("  scope:    {scope}");
    }
    println!();

    match &output.effective {
        Some(effective) => println!("Effective strategy: {effective}"),
        None => println!("Effective strategy: incomplete until --tag is given"),
    }
}
