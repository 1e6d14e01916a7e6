//! Bill of materials command.

use crate::cli::common::{print_json, CliError, CliResult};
use crate::services::{bom, ProjectService};
use clap::Args;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Count access points per model and floor
#[derive(Debug, Clone, Args)]
pub struct BomArgs {
    /// Project file (.esx) or unpacked project directory
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Output as JSON
    #[arg(long, conflicts_with = "csv")]
    pub json: bool,

    /// Write CSV to OUT (default: <stem>_bom_<date>.csv next to the project)
    #[arg(long, value_name = "OUT", num_args = 0..=1, default_missing_value = "", value_parser = |s: &str| Ok::<_, std::convert::Infallible>(PathBuf::from(s)))]
    pub csv: Option<PathBuf>,
}

impl BomArgs {
    /// Execute the bom command
    pub fn execute(&self) -> CliResult<()> {
        let (_, project) =
            ProjectService::load(&self.file).map_err(|e| CliError::from_error(&e))?;
        let report = bom::build(&project);

        if self.json {
            return print_json(&report);
        }

        if let Some(csv) = &self.csv {
            let path = if csv.as_os_str().is_empty() {
                default_csv_path(&self.file, chrono::Local::now().date_naive())
            } else {
                csv.clone()
            };
            let file = File::create(&path).map_err(|e| {
                CliError::io(format!("Failed to create {}: {e}", path.display()))
            })?;
            report
                .write_csv(file)
                .map_err(|e| CliError::from_error(&e))?;
            println!("Wrote {} ({} APs)", path.display(), report.total);
            return Ok(());
        }

        print!("{}", report.to_table());
        Ok(())
    }
}

/// `<stem>_bom_<YYYY-MM-DD>.csv` next to the project.
fn default_csv_path(project: &Path, date: chrono::NaiveDate) -> PathBuf {
    let stem = project
        .file_stem()
        .map_or_else(|| "project".to_string(), |s| s.to_string_lossy().to_string());
    project.with_file_name(format!("{stem}_bom_{}.csv", date.format("%Y-%m-%d")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_csv_path() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            default_csv_path(Path::new("/surveys/site.esx"), date),
            PathBuf::from("/surveys/site_bom_2024-03-09.csv")
        );
        assert_eq!(
            default_csv_path(Path::new("/surveys/unpacked"), date),
            PathBuf::from("/surveys/unpacked_bom_2024-03-09.csv")
        );
    }
}
