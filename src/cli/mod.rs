//! CLI command handlers for esxkit.
//!
//! Each subcommand lives in its own module with a clap `Args` struct and an
//! `execute` method returning [`CliResult`].

pub mod archive;
pub mod bom;
pub mod common;
pub mod config;
pub mod inspect;
pub mod rename;
pub mod strategies;

// Re-export types used by main.rs and tests
pub use archive::{PackArgs, UnpackArgs};
pub use bom::BomArgs;
pub use common::{CliError, CliResult, ExitCode};
pub use config::ConfigArgs;
pub use inspect::InspectArgs;
pub use rename::{RenameArgs, StrategyFlags};
pub use strategies::StrategiesArgs;
