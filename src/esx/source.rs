//! Project sources: a packed `.esx` archive or an unpacked project directory.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::archive::{parse_json, EsxArchive};
use crate::constants::{
    ACCESS_POINTS_JSON, FLOOR_PLANS_JSON, IMAGE_ENTRY_PREFIX, NOTES_JSON, RENAMED_SUFFIX,
    TAG_KEYS_JSON,
};
use crate::models::{FloorPlansDocument, JsonLayout, Project, TagKeysDocument};

/// Where a project was loaded from.
#[derive(Debug, Clone)]
pub enum ProjectSource {
    /// A packed `.esx` archive, fully read into memory
    Archive {
        /// Path of the archive on disk
        path: PathBuf,
        /// Archive contents
        archive: EsxArchive,
    },
    /// An unpacked project directory
    Directory(PathBuf),
}

impl ProjectSource {
    /// Opens a project source. Directories are treated as unpacked projects,
    /// anything else as an archive.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("Project not found: {}", path.display());
        }
        if path.is_dir() {
            return Ok(Self::Directory(path.to_path_buf()));
        }
        let archive = EsxArchive::open(path)?;
        Ok(Self::Archive {
            path: path.to_path_buf(),
            archive,
        })
    }

    /// Path of the archive or directory.
    pub fn path(&self) -> &Path {
        match self {
            Self::Archive { path, .. } => path,
            Self::Directory(dir) => dir,
        }
    }

    /// Returns true for unpacked directories.
    pub const fn is_directory(&self) -> bool {
        matches!(self, Self::Directory(_))
    }

    /// Raw bytes of a document. An absent document is `Ok(None)`.
    pub fn read_bytes(&self, name: &str) -> Result<Option<Vec<u8>>> {
        match self {
            Self::Archive { archive, .. } => Ok(archive
                .entry(name)
                .filter(|e| !e.is_dir)
                .map(|e| e.data.clone())),
            Self::Directory(dir) => {
                let path = dir.join(name);
                if !path.is_file() {
                    return Ok(None);
                }
                fs::read(&path)
                    .map(Some)
                    .with_context(|| format!("Failed to read {}", path.display()))
            }
        }
    }

    /// Parses a JSON document from the source. An absent document is `Ok(None)`.
    pub fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        self.read_bytes(name)?
            .map(|data| parse_json(name, &data))
            .transpose()
    }

    /// Returns true if the project contains the named document.
    pub fn has_document(&self, name: &str) -> bool {
        match self {
            Self::Archive { archive, .. } => archive.contains(name),
            Self::Directory(dir) => dir.join(name).is_file(),
        }
    }

    /// Number of floor plan image blobs in the project.
    pub fn image_count(&self) -> Result<usize> {
        match self {
            Self::Archive { archive, .. } => {
                Ok(archive.names_with_prefix(IMAGE_ENTRY_PREFIX).count())
            }
            Self::Directory(dir) => {
                let entries = fs::read_dir(dir)
                    .with_context(|| format!("Failed to read directory: {}", dir.display()))?;
                let mut count = 0;
                for entry in entries {
                    let entry = entry.context("Failed to read directory entry")?;
                    if entry
                        .file_name()
                        .to_string_lossy()
                        .starts_with(IMAGE_ENTRY_PREFIX)
                    {
                        count += 1;
                    }
                }
                Ok(count)
            }
        }
    }

    /// Loads the project documents.
    ///
    /// `floorPlans.json` and `accessPoints.json` are required. `tagKeys.json`
    /// is optional; without it every tag lookup yields a missing value.
    pub fn load_project(&self) -> Result<Project> {
        let floor_plans: FloorPlansDocument = self
            .read_json(FLOOR_PLANS_JSON)?
            .with_context(|| format!("{FLOOR_PLANS_JSON} not found in project"))?;

        let access_points_data = self
            .read_bytes(ACCESS_POINTS_JSON)?
            .with_context(|| format!("{ACCESS_POINTS_JSON} not found in project"))?;
        let access_points: Value = parse_json(ACCESS_POINTS_JSON, &access_points_data)?;

        let tag_keys: Option<TagKeysDocument> = self.read_json(TAG_KEYS_JSON)?;
        if tag_keys.is_none() {
            info!(
                "No {} in {}; tag-based ordering treats every AP as untagged",
                TAG_KEYS_JSON,
                self.path().display()
            );
        }

        debug!(
            has_notes = self.has_document(NOTES_JSON),
            "loaded project documents"
        );

        Ok(Project::from_documents(floor_plans, access_points, tag_keys)?
            .with_layout(JsonLayout::detect(&access_points_data)))
    }

    /// Writes the project as an archive at `dest`, with `accessPoints.json`
    /// replaced by the project's current document. Every other entry is
    /// copied unchanged.
    pub fn write_archive(&self, project: &Project, dest: &Path) -> Result<()> {
        let mut archive = match self {
            Self::Archive { archive, .. } => archive.clone(),
            Self::Directory(dir) => EsxArchive::from_dir(dir)?,
        };
        archive.replace(ACCESS_POINTS_JSON, project.access_points_json()?);
        archive.write(dest)
    }

    /// Overwrites `accessPoints.json` inside an unpacked project directory.
    pub fn write_directory(&self, project: &Project) -> Result<PathBuf> {
        let Self::Directory(dir) = self else {
            anyhow::bail!(
                "{} is an archive, not an unpacked project directory",
                self.path().display()
            );
        };

        let target = dir.join(ACCESS_POINTS_JSON);
        let temp = dir.join(format!(".{ACCESS_POINTS_JSON}.tmp"));
        fs::write(&temp, project.access_points_json()?)
            .with_context(|| format!("Failed to write temp file: {}", temp.display()))?;
        fs::rename(&temp, &target)
            .with_context(|| format!("Failed to replace {}", target.display()))?;
        Ok(target)
    }

    /// Default output archive for a renamed project.
    ///
    /// - `site.esx` → `site_renamed.esx` next to it
    /// - `site/` (directory) → `site.esx` next to it
    pub fn default_output(&self) -> PathBuf {
        let path = self.path();
        let stem = path
            .file_stem()
            .map_or_else(|| "project".to_string(), |s| s.to_string_lossy().to_string());
        let file_name = if self.is_directory() {
            format!("{stem}.esx")
        } else {
            format!("{stem}{RENAMED_SUFFIX}.esx")
        };
        path.with_file_name(file_name)
    }
}
