//! Rename command: deterministic AP renaming for one or more projects.

use crate::cli::common::{chain, classify, print_json, CliError, CliResult, ExitCode};
use crate::cluster::AnchorPolicy;
use crate::config::Config;
use crate::constants::{ESX_EXTENSION, RENAMED_SUFFIX};
use crate::rename::{
    rename_project, CancelFlag, Cancelled, RenamePlan, SequenceScope, Strategy, StrategyKind,
    StrategyOptions,
};
use crate::services::{ProjectService, SaveTarget};
use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Rename access points by position
#[derive(Debug, Clone, Args)]
pub struct RenameArgs {
    /// Project files (.esx) or unpacked project directories.
    /// Without any, the single .esx file in the current directory is used.
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub strategy: StrategyFlags,

    /// Output archive (single input only)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Also re-archive unpacked directories
    #[arg(long)]
    pub pack: bool,

    /// Print the plan without writing anything
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Do not ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

/// Strategy flags shared by `rename` and `config set`.
#[derive(Debug, Clone, Default, Args)]
pub struct StrategyFlags {
    /// Strategy preset (see `esxkit strategies`)
    #[arg(short = 's', long = "strategy", value_name = "NAME")]
    pub name: Option<String>,

    /// Band threshold as floor extent / N
    #[arg(long, value_name = "N", conflicts_with = "pixels")]
    pub divisor: Option<f64>,

    /// Band threshold in image pixels
    #[arg(long, value_name = "PX")]
    pub pixels: Option<f64>,

    /// Anchor policy (fixed or sliding)
    #[arg(long, value_name = "POLICY")]
    pub anchor: Option<String>,

    /// Tag key to group by and use for {tag}
    #[arg(short, long, value_name = "KEY")]
    pub tag: Option<String>,

    /// In-band ordering keys, comma separated (x, y, model, tag:KEY)
    #[arg(long, value_name = "KEYS", value_delimiter = ',')]
    pub within: Option<Vec<String>>,

    /// Name pattern with {seq}, {tag} and {floor}
    #[arg(short, long, value_name = "PATTERN")]
    pub pattern: Option<String>,

    /// Zero-padding width of {seq}
    #[arg(short, long, value_name = "N")]
    pub width: Option<usize>,

    /// Where numbering restarts (floor, project or tag)
    #[arg(long, value_name = "SCOPE")]
    pub scope: Option<String>,
}

impl StrategyFlags {
    /// Parses the flags into strategy overrides.
    pub fn to_options(&self) -> CliResult<StrategyOptions> {
        let strategy = self
            .name
            .as_deref()
            .map(str::parse::<StrategyKind>)
            .transpose()
            .map_err(|e| CliError::validation(e.to_string()))?;
        let anchor = self
            .anchor
            .as_deref()
            .map(str::parse::<AnchorPolicy>)
            .transpose()
            .map_err(|e| CliError::validation(e.to_string()))?;
        let scope = self
            .scope
            .as_deref()
            .map(str::parse::<SequenceScope>)
            .transpose()
            .map_err(|e| CliError::validation(e.to_string()))?;

        Ok(StrategyOptions {
            strategy,
            divisor: self.divisor,
            pixels: self.pixels,
            anchor,
            tag: self.tag.clone(),
            within: self.within.clone(),
            pattern: self.pattern.clone(),
            width: self.width,
            scope,
        })
    }
}

/// JSON report for one input.
#[derive(Debug, Serialize)]
struct FileReport {
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    plan: Option<RenamePlan>,
    written: Vec<String>,
    changed: usize,
    duplicates: Vec<String>,
}

impl FileReport {
    fn failed(input: &Path, err: &anyhow::Error) -> Self {
        Self {
            input: input.display().to_string(),
            error: Some(chain(err)),
            plan: None,
            written: Vec::new(),
            changed: 0,
            duplicates: Vec::new(),
        }
    }
}

/// Outcome of a rename batch.
#[derive(Debug, Default)]
struct Batch {
    reports: Vec<FileReport>,
    worst: Option<ExitCode>,
    cancelled: bool,
}

impl RenameArgs {
    /// Execute the rename command
    pub fn execute(&self) -> CliResult<()> {
        let config = Config::load().map_err(|e| {
            CliError::validation(format!("Failed to load configuration: {}", chain(&e)))
        })?;
        let options = config.rename.overridden_by(self.strategy.to_options()?);
        let strategy = options
            .resolve()
            .map_err(|e| CliError::validation(chain(&e)))?;
        debug!(strategy = %strategy.describe(), "resolved strategy");

        let inputs = self.inputs()?;
        check_output(self.output.as_deref(), self.pack, &inputs)?;

        let cancel = CancelFlag::new();
        install_interrupt_handler(&cancel);

        let batch = self.run_batch(&inputs, &strategy, &cancel, |report| {
            if !self.json {
                print_report(report, self.dry_run);
            }
        });

        // Partial results are still reported when the batch was interrupted
        if self.json {
            print_json(&batch.reports)?;
        }
        if batch.cancelled {
            return Err(CliError::cancelled());
        }

        let failed = batch.reports.iter().filter(|r| r.error.is_some()).count();
        match batch.worst {
            None => Ok(()),
            Some(kind) => Err(CliError {
                kind,
                message: format!("{failed} of {} inputs failed", inputs.len()),
            }),
        }
    }

    /// Processes every input in order. A failed input is recorded and the
    /// batch moves on; cancellation stops it.
    fn run_batch<F>(
        &self,
        inputs: &[PathBuf],
        strategy: &Strategy,
        cancel: &CancelFlag,
        mut on_report: F,
    ) -> Batch
    where
        F: FnMut(&FileReport),
    {
        let mut batch = Batch::default();

        for input in inputs {
            if cancel.is_cancelled() {
                batch.cancelled = true;
                break;
            }

            match self.process(input, strategy, cancel) {
                Ok(report) => {
                    on_report(&report);
                    batch.reports.push(report);
                }
                Err(err) if err.downcast_ref::<Cancelled>().is_some() => {
                    batch.cancelled = true;
                    break;
                }
                Err(err) => {
                    let code = classify(&err);
                    if !self.json {
                        eprintln!("Error: {}: {}", input.display(), chain(&err));
                    }
                    batch.reports.push(FileReport::failed(input, &err));
                    if batch.worst != Some(ExitCode::Io) {
                        batch.worst = Some(code);
                    }
                }
            }
        }

        batch
    }

    fn inputs(&self) -> CliResult<Vec<PathBuf>> {
        if !self.files.is_empty() {
            return Ok(self.files.clone());
        }

        let cwd = std::env::current_dir()
            .map_err(|e| CliError::io(format!("Failed to read current directory: {e}")))?;
        let found = discover_input(&cwd).map_err(|e| CliError::validation(chain(&e)))?;

        if !self.yes {
            let stdin = io::stdin();
            let proceed = confirm(&found, &mut stdin.lock(), &mut io::stdout())
                .map_err(|e| CliError::io(chain(&e)))?;
            if !proceed {
                return Err(CliError::cancelled());
            }
        }

        Ok(vec![found])
    }

    fn process(
        &self,
        input: &Path,
        strategy: &Strategy,
        cancel: &CancelFlag,
    ) -> Result<FileReport> {
        let (source, mut project) = ProjectService::load(input)?;
        let plan = rename_project(&project, strategy, cancel)?;

        let duplicates = plan.duplicate_names();
        if !duplicates.is_empty() {
            warn!(
                "{}: {} names assigned more than once (e.g. '{}')",
                input.display(),
                duplicates.len(),
                duplicates[0]
            );
        }

        let (written, changed) = if self.dry_run {
            (Vec::new(), plan.changed().count())
        } else {
            ProjectService::save_renamed(
                &source,
                &mut project,
                &plan,
                self.output.as_deref(),
                self.pack,
            )?
        };

        Ok(FileReport {
            input: input.display().to_string(),
            error: None,
            plan: Some(plan),
            written: written
                .iter()
                .map(SaveTarget::path)
                .map(|p| p.display().to_string())
                .collect(),
            changed,
            duplicates,
        })
    }
}

/// Rejects `--output` where it would be ignored or ambiguous.
fn check_output(output: Option<&Path>, pack: bool, inputs: &[PathBuf]) -> CliResult<()> {
    if output.is_none() {
        return Ok(());
    }
    if inputs.len() > 1 {
        return Err(CliError::validation(
            "--output can only be used with a single input",
        ));
    }
    if !pack && inputs.iter().any(|p| p.is_dir()) {
        return Err(CliError::validation(
            "--output needs --pack when the input is a project directory",
        ));
    }
    Ok(())
}

/// Finds the single project archive in `dir`.
///
/// Archives produced by earlier runs (`*_renamed.esx`) are ignored.
pub fn discover_input(dir: &Path) -> Result<PathBuf> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read directory: {}", dir.display()))?;

    let mut found = Vec::new();
    for entry in entries {
        let path = entry.context("Failed to read directory entry")?.path();
        let is_esx = path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(ESX_EXTENSION));
        let is_output = path
            .file_stem()
            .is_some_and(|stem| stem.to_string_lossy().ends_with(RENAMED_SUFFIX));
        if is_esx && !is_output {
            found.push(path);
        }
    }
    found.sort();

    match found.len() {
        0 => anyhow::bail!("No .{ESX_EXTENSION} file found in {}", dir.display()),
        1 => Ok(found.remove(0)),
        n => {
            let names: Vec<String> = found
                .iter()
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().to_string())
                .collect();
            anyhow::bail!(
                "Found {n} .{ESX_EXTENSION} files in {}; pass one explicitly: {}",
                dir.display(),
                names.join(", ")
            )
        }
    }
}

/// Asks `Proceed with file: X? (YES/no)`. An empty answer means yes.
pub fn confirm<R: BufRead, W: Write>(path: &Path, input: &mut R, out: &mut W) -> Result<bool> {
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().to_string());
    write!(out, "Proceed with file: {name}? (YES/no) ").context("Failed to write prompt")?;
    out.flush().context("Failed to flush prompt")?;

    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("Failed to read answer")?;
    let answer = answer.trim().to_lowercase();
    Ok(answer.is_empty() || answer == "y" || answer == "yes")
}

fn install_interrupt_handler(cancel: &CancelFlag) {
    let flag = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || flag.cancel()) {
        warn!("Could not install Ctrl-C handler: {e}");
    }
}

fn print_report(report: &FileReport, dry_run: bool) {
    let Some(plan) = &report.plan else {
        return;
    };

    println!("{}: {}", report.input, plan.strategy);
    for floor in &plan.floors {
        let bands: Vec<String> = floor.band_counts.iter().map(ToString::to_string).collect();
        println!(
            "  Floor {}: {} APs, bands {}",
            floor.floor_name,
            floor.ap_count,
            bands.join("x")
        );
        for entry in plan.entries.iter().filter(|e| e.floor_id == floor.floor_id) {
            let marker = if entry.old_name == entry.new_name { " " } else { "*" };
            println!("  {marker} {:<24} -> {}", entry.old_name, entry.new_name);
        }
    }
    if !plan.skipped.is_empty() {
        println!("  Skipped {} APs without a usable location", plan.skipped.len());
    }

    if dry_run {
        println!("  Dry run: {} names would change, nothing written", report.changed);
    } else {
        for path in &report.written {
            println!("  Wrote {path}");
        }
        println!("  {} names changed", report.changed);
    }
}
