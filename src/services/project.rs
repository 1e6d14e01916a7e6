//! Project I/O service.
//!
//! Centralizes loading a project from an `.esx` archive or an unpacked
//! directory and writing the renamed result back.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::esx::ProjectSource;
use crate::models::Project;
use crate::rename::RenamePlan;

/// Service for project file operations.
pub struct ProjectService;

/// Where a renamed project was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    /// A new archive
    Archive(PathBuf),
    /// `accessPoints.json` inside an unpacked directory
    Directory(PathBuf),
}

impl SaveTarget {
    /// Path that was written.
    pub fn path(&self) -> &Path {
        match self {
            Self::Archive(path) | Self::Directory(path) => path,
        }
    }
}

impl ProjectService {
    /// Opens a source and loads its project.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use esxkit::services::ProjectService;
    ///
    /// let (_source, project) = ProjectService::load(Path::new("site.esx"))?;
    /// println!("{} APs", project.access_points.len());
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(path: &Path) -> Result<(ProjectSource, Project)> {
        let source = ProjectSource::open(path)
            .with_context(|| format!("Failed to open project {}", path.display()))?;
        let project = source
            .load_project()
            .with_context(|| format!("Failed to load project from {}", path.display()))?;
        Ok((source, project))
    }

    /// Applies a plan and writes the result.
    ///
    /// Archives are written to `output` (default `<stem>_renamed.esx`); the
    /// input archive is never modified. Directories get their
    /// `accessPoints.json` overwritten in place, and with `pack` are also
    /// re-archived to `output` (default `<dir>.esx`).
    ///
    /// Returns every path written, and the number of names that changed.
    pub fn save_renamed(
        source: &ProjectSource,
        project: &mut Project,
        plan: &RenamePlan,
        output: Option<&Path>,
        pack: bool,
    ) -> Result<(Vec<SaveTarget>, usize)> {
        let dest = if source.is_directory() && !pack {
            None
        } else {
            let dest = output.map_or_else(|| source.default_output(), Path::to_path_buf);
            if same_file(&dest, source.path()) {
                anyhow::bail!(
                    "Refusing to overwrite the input archive {}; choose another --output",
                    source.path().display()
                );
            }
            Some(dest)
        };

        let changed = project.apply_names(plan.pairs());
        let mut written = Vec::new();

        if source.is_directory() {
            let path = source.write_directory(project).with_context(|| {
                format!("Failed to update project directory {}", source.path().display())
            })?;
            info!("Updated {}", path.display());
            written.push(SaveTarget::Directory(path));
        }

        let Some(dest) = dest else {
            return Ok((written, changed));
        };
        source
            .write_archive(project, &dest)
            .with_context(|| format!("Failed to write {}", dest.display()))?;
        info!("Wrote {}", dest.display());
        written.push(SaveTarget::Archive(dest));

        Ok((written, changed))
    }
}

/// Compares two paths after resolving `..`, `.` and symlinks.
///
/// `dest` may not exist yet; its parent directory is resolved instead.
fn same_file(dest: &Path, input: &Path) -> bool {
    let Ok(input) = fs::canonicalize(input) else {
        return dest == input;
    };
    let resolved = fs::canonicalize(dest).or_else(|_| {
        let parent = match dest.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let name = dest.file_name().unwrap_or_default();
        fs::canonicalize(parent).map(|p| p.join(name))
    });
    resolved.map_or(dest == input, |dest| dest == input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{ACCESS_POINTS_JSON, FLOOR_PLANS_JSON};
    use crate::esx::{ArchiveEntry, EsxArchive};
    use crate::rename::{rename_project, CancelFlag, Strategy};
    use serde_json::Value;
    use tempfile::TempDir;

    fn write_sample(dir: &Path) -> PathBuf {
        let path = dir.join("site.esx");
        EsxArchive::from_entries(vec![
            ArchiveEntry::file(
                FLOOR_PLANS_JSON,
                br#"{"floorPlans": [{"id": "f1", "name": "L1", "width": 1000, "height": 1000}]}"#
                    .to_vec(),
            ),
            ArchiveEntry::file(
                ACCESS_POINTS_JSON,
                br#"{"accessPoints": [
                    {"id": "b", "name": "second", "location": {"floorPlanId": "f1", "coord": {"x": 900, "y": 10}}},
                    {"id": "a", "name": "first", "location": {"floorPlanId": "f1", "coord": {"x": 10, "y": 10}}}
                ]}"#
                .to_vec(),
            ),
        ])
        .write(&path)
        .unwrap();
        path
    }

    #[test]
    fn test_load_missing_file_has_context() {
        let temp = TempDir::new().unwrap();
        let err = ProjectService::load(&temp.path().join("nope.esx")).unwrap_err();
        assert!(format!("{err:#}").contains("nope.esx"));
    }

    #[test]
    fn test_save_renamed_archive_keeps_input() {
        let temp = TempDir::new().unwrap();
        let path = write_sample(temp.path());
        let before = std::fs::read(&path).unwrap();

        let (source, mut project) = ProjectService::load(&path).unwrap();
        let plan = rename_project(&project, &Strategy::default(), &CancelFlag::new()).unwrap();
        let (written, changed) =
            ProjectService::save_renamed(&source, &mut project, &plan, None, false).unwrap();

        assert_eq!(changed, 2);
        assert_eq!(
            written,
            vec![SaveTarget::Archive(temp.path().join("site_renamed.esx"))]
        );
        assert_eq!(std::fs::read(&path).unwrap(), before);

        let out = EsxArchive::open(written[0].path()).unwrap();
        let aps: Value = out.read_json(ACCESS_POINTS_JSON).unwrap().unwrap();
        assert_eq!(aps["accessPoints"][0]["name"], "AP-002");
        assert_eq!(aps["accessPoints"][1]["name"], "AP-001");
    }

    #[test]
    fn test_save_renamed_refuses_to_overwrite_input() {
        let temp = TempDir::new().unwrap();
        let path = write_sample(temp.path());
        let (source, mut project) = ProjectService::load(&path).unwrap();
        let plan = rename_project(&project, &Strategy::default(), &CancelFlag::new()).unwrap();

        let result =
            ProjectService::save_renamed(&source, &mut project, &plan, Some(&path), false);
        assert!(result.is_err());
    }

    #[test]
    fn test_save_renamed_refuses_aliased_input() {
        let temp = TempDir::new().unwrap();
        let path = write_sample(temp.path());
        std::fs::create_dir(temp.path().join("sub")).unwrap();
        let before = std::fs::read(&path).unwrap();

        let (source, mut project) = ProjectService::load(&path).unwrap();
        let plan = rename_project(&project, &Strategy::default(), &CancelFlag::new()).unwrap();

        let alias = temp.path().join("sub").join("..").join("site.esx");
        let err = ProjectService::save_renamed(&source, &mut project, &plan, Some(&alias), false)
            .unwrap_err();
        assert!(err.to_string().contains("Refusing to overwrite"));
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_renamed_refuses_symlinked_input() {
        let temp = TempDir::new().unwrap();
        let path = write_sample(temp.path());
        let link = temp.path().join("link.esx");
        std::os::unix::fs::symlink(&path, &link).unwrap();
        let before = std::fs::read(&path).unwrap();

        let (source, mut project) = ProjectService::load(&path).unwrap();
        let plan = rename_project(&project, &Strategy::default(), &CancelFlag::new()).unwrap();

        let result = ProjectService::save_renamed(&source, &mut project, &plan, Some(&link), false);
        assert!(result.is_err());
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_save_renamed_directory_keeps_json_layout() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("unpacked");
        std::fs::create_dir(&dir).unwrap();
        std::fs::write(
            dir.join(FLOOR_PLANS_JSON),
            br#"{"floorPlans":[{"id":"f1","name":"L1","width":1000,"height":1000}]}"#,
        )
        .unwrap();
        let text = r#"{"accessPoints":[{"id":"a","name":"first","location":{"floorPlanId":"f1","coord":{"x":10.10,"y":1e2}},"z":1234.56789012345678}]}"#;
        std::fs::write(dir.join(ACCESS_POINTS_JSON), text).unwrap();

        let (source, mut project) = ProjectService::load(&dir).unwrap();
        let plan = rename_project(&project, &Strategy::default(), &CancelFlag::new()).unwrap();
        ProjectService::save_renamed(&source, &mut project, &plan, None, false).unwrap();

        let written = std::fs::read_to_string(dir.join(ACCESS_POINTS_JSON)).unwrap();
        assert_eq!(written, text.replace(r#""name":"first""#, r#""name":"AP-001""#));
    }

    #[test]
    fn test_save_renamed_directory_with_pack() {
        let temp = TempDir::new().unwrap();
        let path = write_sample(temp.path());
        let dir = temp.path().join("unpacked");
        crate::esx::unpack(&path, &dir).unwrap();

        let (source, mut project) = ProjectService::load(&dir).unwrap();
        let plan = rename_project(&project, &Strategy::default(), &CancelFlag::new()).unwrap();
        let (written, _) =
            ProjectService::save_renamed(&source, &mut project, &plan, None, true).unwrap();

        assert_eq!(written.len(), 2);
        assert_eq!(written[0], SaveTarget::Directory(dir.join(ACCESS_POINTS_JSON)));
        assert_eq!(written[1], SaveTarget::Archive(temp.path().join("unpacked.esx")));

        let (_, reloaded) = ProjectService::load(&dir).unwrap();
        assert_eq!(reloaded.access_points[1].name, "AP-001");
    }
}
