//! Unpack and pack commands for `.esx` archives.

use crate::cli::common::{CliError, CliResult};
use crate::constants::{ACCESS_POINTS_JSON, ESX_EXTENSION};
use crate::esx;
use clap::Args;
use std::path::{Path, PathBuf};

/// Extract an .esx archive into a directory
#[derive(Debug, Clone, Args)]
pub struct UnpackArgs {
    /// Project archive
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Target directory (default: archive name without extension)
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Extract into a non-empty directory
    #[arg(short, long)]
    pub force: bool,
}

/// Build an .esx archive from an unpacked directory
#[derive(Debug, Clone, Args)]
pub struct PackArgs {
    /// Unpacked project directory
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Output archive (default: <DIR>.esx)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Overwrite an existing archive
    #[arg(short, long)]
    pub force: bool,
}

impl UnpackArgs {
    /// Execute the unpack command
    pub fn execute(&self) -> CliResult<()> {
        if !self.file.is_file() {
            return Err(CliError::validation(format!(
                "Archive not found: {}",
                self.file.display()
            )));
        }

        let dir = self
            .dir
            .clone()
            .unwrap_or_else(|| self.file.with_extension(""));
        if !self.force && is_non_empty_dir(&dir) {
            return Err(CliError::validation(format!(
                "Directory {} is not empty (use --force to extract anyway)",
                dir.display()
            )));
        }

        let count = esx::unpack(&self.file, &dir).map_err(|e| CliError::from_error(&e))?;
        println!("Extracted {count} files to {}", dir.display());
        Ok(())
    }
}

impl PackArgs {
    /// Execute the pack command
    pub fn execute(&self) -> CliResult<()> {
        if !self.dir.is_dir() {
            return Err(CliError::validation(format!(
                "Directory not found: {}",
                self.dir.display()
            )));
        }
        if !self.dir.join(ACCESS_POINTS_JSON).is_file() {
            return Err(CliError::validation(format!(
                "{} does not look like an unpacked project: {ACCESS_POINTS_JSON} is missing",
                self.dir.display()
            )));
        }

        let output = self.output.clone().unwrap_or_else(|| default_archive(&self.dir));
        if output.exists() && !self.force {
            return Err(CliError::validation(format!(
                "{} already exists (use --force to overwrite)",
                output.display()
            )));
        }

        let count = esx::pack(&self.dir, &output).map_err(|e| CliError::from_error(&e))?;
        println!("Packed {count} entries into {}", output.display());
        Ok(())
    }
}

/// `site/` → `site.esx` next to it.
fn default_archive(dir: &Path) -> PathBuf {
    let name = dir
        .file_name()
        .map_or_else(|| "project".to_string(), |n| n.to_string_lossy().to_string());
    dir.with_file_name(format!("{name}.{ESX_EXTENSION}"))
}

fn is_non_empty_dir(path: &Path) -> bool {
    path.read_dir()
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_archive() {
        assert_eq!(
            default_archive(Path::new("/data/site")),
            PathBuf::from("/data/site.esx")
        );
    }

    #[test]
    fn test_is_non_empty_dir() {
        let temp = TempDir::new().unwrap();
        assert!(!is_non_empty_dir(temp.path()));
        assert!(!is_non_empty_dir(&temp.path().join("missing")));
        std::fs::write(temp.path().join("x"), b"1").unwrap();
        assert!(is_non_empty_dir(temp.path()));
    }
}
