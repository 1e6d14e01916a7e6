//! esxkit - command-line toolkit for Ekahau .esx projects
//!
//! Renames access points deterministically from their floor plan positions,
//! and inspects, reports on, unpacks and repacks project archives.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use esxkit::cli::{
    BomArgs, CliResult, ConfigArgs, InspectArgs, PackArgs, RenameArgs, StrategiesArgs,
    UnpackArgs,
};
use esxkit::constants::APP_BINARY_NAME;

/// Command-line toolkit for Ekahau .esx site-survey projects
#[derive(Parser, Debug)]
#[command(name = APP_BINARY_NAME, author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rename access points by position
    Rename(RenameArgs),
    /// Show floors and access points
    Inspect(InspectArgs),
    /// Count access points per model and floor
    Bom(BomArgs),
    /// Extract an .esx archive into a directory
    Unpack(UnpackArgs),
    /// Build an .esx archive from a directory
    Pack(PackArgs),
    /// List renaming strategies
    Strategies(StrategiesArgs),
    /// Manage persisted rename defaults
    Config(ConfigArgs),
}

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(err) = run(cli.command) {
        eprintln!("Error: {}", err.message);
        std::process::exit(err.exit_code());
    }
}

fn run(command: Command) -> CliResult<()> {
    match command {
        Command::Rename(args) => args.execute(),
        Command::Inspect(args) => args.execute(),
        Command::Bom(args) => args.execute(),
        Command::Unpack(args) => args.execute(),
        Command::Pack(args) => args.execute(),
        Command::Strategies(args) => args.execute(),
        Command::Config(args) => args.execute(),
    }
}
