//! Zip-level access to `.esx` project archives.
//!
//! An archive is read fully into memory. Entries keep their original order
//! and compression method so that rewriting an archive only changes the
//! entries that were explicitly replaced.
//!
//! ## Security
//!
//! - Entry names are validated before extraction to prevent path traversal (zip-slip)
//! - Archives are written through a temp file and renamed into place

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fs::{self, File};
use std::io::{Cursor, Read, Seek, Write};
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::constants::UTF8_BOM;

/// One file or directory entry of an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Entry name inside the archive (forward slashes)
    pub name: String,
    /// Uncompressed contents (empty for directories)
    pub data: Vec<u8>,
    /// True if the entry was stored without compression
    pub stored: bool,
    /// True for directory entries
    pub is_dir: bool,
}

impl ArchiveEntry {
    /// Creates a deflated file entry.
    pub fn file(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
            stored: false,
            is_dir: false,
        }
    }
}

/// An `.esx` archive held in memory.
#[derive(Debug, Clone, Default)]
pub struct EsxArchive {
    entries: Vec<ArchiveEntry>,
}

impl EsxArchive {
    /// Opens and fully reads an archive from disk.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open archive: {}", path.display()))?;
        Self::from_reader(file)
            .with_context(|| format!("Failed to read archive: {}", path.display()))
    }

    /// Reads an archive from any seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut zip = ZipArchive::new(reader).context("Not a valid zip archive")?;
        let mut entries = Vec::with_capacity(zip.len());

        for index in 0..zip.len() {
            let mut file = zip
                .by_index(index)
                .with_context(|| format!("Failed to read zip entry #{index}"))?;
            let name = file.name().to_string();
            let is_dir = file.is_dir();
            let stored = file.compression() == CompressionMethod::Stored;

            let mut data = Vec::new();
            if !is_dir {
                file.read_to_end(&mut data)
                    .with_context(|| format!("Failed to decompress entry: {name}"))?;
            }

            entries.push(ArchiveEntry {
                name,
                data,
                stored,
                is_dir,
            });
        }

        debug!(entries = entries.len(), "read archive");
        Ok(Self { entries })
    }

    /// Builds an archive from an unpacked project directory.
    ///
    /// Every regular file below `dir` becomes an entry named by its relative
    /// path; entries are sorted by name so the result does not depend on
    /// directory iteration order.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        if !dir.is_dir() {
            anyhow::bail!("Project directory not found: {}", dir.display());
        }

        let mut files = Vec::new();
        collect_files(dir, dir, &mut files)?;
        files.sort_by(|a, b| a.0.cmp(&b.0));

        let mut entries = Vec::with_capacity(files.len());
        for (name, path) in files {
            let data =
                fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
            entries.push(ArchiveEntry::file(name, data));
        }

        Ok(Self { entries })
    }

    /// Builds an archive from explicit entries.
    pub fn from_entries(entries: Vec<ArchiveEntry>) -> Self {
        Self { entries }
    }

    /// All entries in archive order.
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Gets an entry by exact name.
    pub fn entry(&self, name: &str) -> Option<&ArchiveEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Returns true if the archive has a file entry with this name.
    pub fn contains(&self, name: &str) -> bool {
        self.entry(name).is_some_and(|e| !e.is_dir)
    }

    /// Names of all file entries starting with `prefix`.
    pub fn names_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> {
        self.entries
            .iter()
            .filter(move |e| !e.is_dir && e.name.starts_with(prefix))
            .map(|e| e.name.as_str())
    }

    /// Parses a JSON entry. An absent entry is `Ok(None)`.
    pub fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        self.entry(name)
            .filter(|e| !e.is_dir)
            .map(|e| parse_json(name, &e.data))
            .transpose()
    }

    /// Replaces the contents of an entry, or appends it if absent.
    ///
    /// A replaced entry keeps its position and compression method.
    pub fn replace(&mut self, name: &str, data: Vec<u8>) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == name) {
            entry.data = data;
            entry.is_dir = false;
        } else {
            self.entries.push(ArchiveEntry::file(name, data));
        }
    }

    /// Serializes the archive to zip bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let cursor = write_zip(Cursor::new(Vec::new()), &self.entries)?;
        Ok(cursor.into_inner())
    }

    /// Writes the archive to `path` using a temp file + rename.
    ///
    /// On failure the destination is left as it was.
    pub fn write(&self, path: &Path) -> Result<()> {
        let temp_path = temp_sibling(path)?;

        let result = File::create(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))
            .and_then(|file| write_zip(file, &self.entries).map(|_| ()))
            .and_then(|()| {
                fs::rename(&temp_path, path).with_context(|| {
                    format!(
                        "Failed to write {} (is it open in another application?)",
                        path.display()
                    )
                })
            });

        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result
    }

    /// Extracts all entries below `dir`, creating it if needed.
    ///
    /// Returns the number of files written.
    pub fn extract_to(&self, dir: &Path) -> Result<usize> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

        let mut written = 0;
        for entry in &self.entries {
            let target = dir.join(safe_entry_path(&entry.name)?);
            if entry.is_dir {
                fs::create_dir_all(&target)
                    .with_context(|| format!("Failed to create {}", target.display()))?;
                continue;
            }
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(&target, &entry.data)
                .with_context(|| format!("Failed to write {}", target.display()))?;
            written += 1;
        }

        Ok(written)
    }
}

/// Extracts `esx` into `dir`. Returns the number of files written.
pub fn unpack(esx: &Path, dir: &Path) -> Result<usize> {
    EsxArchive::open(esx)?.extract_to(dir)
}

/// Archives every file under `dir` into `esx`. Returns the number of entries.
pub fn pack(dir: &Path, esx: &Path) -> Result<usize> {
    let archive = EsxArchive::from_dir(dir)?;
    archive.write(esx)?;
    Ok(archive.entries().len())
}

/// Parses JSON bytes, tolerating a leading UTF-8 byte order mark.
pub(crate) fn parse_json<T: DeserializeOwned>(name: &str, data: &[u8]) -> Result<T> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
    serde_json::from_slice(data).with_context(|| format!("Failed to parse {name}"))
}

/// Converts an entry name to a relative path, rejecting anything that could
/// escape the extraction directory.
fn safe_entry_path(name: &str) -> Result<PathBuf> {
    if name.starts_with('/') || name.starts_with('\\') {
        anyhow::bail!("Invalid entry name in archive: {name}");
    }

    let path = Path::new(name);
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => anyhow::bail!("Invalid entry name in archive: {name}"),
        }
    }

    if clean.as_os_str().is_empty() {
        anyhow::bail!("Empty entry name in archive");
    }
    Ok(clean)
}

fn write_zip<W: Write + Seek>(writer: W, entries: &[ArchiveEntry]) -> Result<W> {
    let mut zip = ZipWriter::new(writer);

    for entry in entries {
        let method = if entry.stored {
            CompressionMethod::Stored
        } else {
            CompressionMethod::Deflated
        };
        let options = SimpleFileOptions::default()
            .compression_method(method)
            .unix_permissions(0o644);

        if entry.is_dir {
            zip.add_directory(entry.name.as_str(), options)
                .with_context(|| format!("Failed to add directory {}", entry.name))?;
            continue;
        }

        zip.start_file(entry.name.as_str(), options)
            .with_context(|| format!("Failed to start file {}", entry.name))?;
        zip.write_all(&entry.data)
            .with_context(|| format!("Failed to write file {}", entry.name))?;
    }

    zip.finish().context("Failed to finalize zip")
}

fn collect_files(root: &Path, dir: &Path, out: &mut Vec<(String, PathBuf)>) -> Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read directory: {}", dir.display()))?;

    for entry in entries {
        let entry = entry.context("Failed to read directory entry")?;
        let path = entry.path();

        if path.is_dir() {
            collect_files(root, &path, out)?;
            continue;
        }

        let relative = path
            .strip_prefix(root)
            .with_context(|| format!("{} is outside {}", path.display(), root.display()))?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        out.push((name, path));
    }

    Ok(())
}

fn temp_sibling(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .with_context(|| format!("Invalid output path: {}", path.display()))?;
    Ok(path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_archive() -> EsxArchive {
        let mut image = ArchiveEntry::file("image-abc", vec![0x89, 0x50, 0x4E, 0x47]);
        image.stored = true;
        EsxArchive::from_entries(vec![
            ArchiveEntry::file("floorPlans.json", br#"{"floorPlans": []}"#.to_vec()),
            image,
            ArchiveEntry::file("accessPoints.json", br#"{"accessPoints": []}"#.to_vec()),
        ])
    }

    #[test]
    fn test_bytes_round_trip_keeps_order_and_compression() {
        let archive = sample_archive();
        let bytes = archive.to_bytes().unwrap();
        let reread = EsxArchive::from_reader(Cursor::new(bytes)).unwrap();

        let names: Vec<&str> = reread.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["floorPlans.json", "image-abc", "accessPoints.json"]);
        assert!(reread.entry("image-abc").unwrap().stored);
        assert!(!reread.entry("floorPlans.json").unwrap().stored);
        assert_eq!(reread.entries(), archive.entries());
    }

    #[test]
    fn test_read_json_absent_is_none() {
        let archive = sample_archive();
        let missing: Option<serde_json::Value> = archive.read_json("tagKeys.json").unwrap();
        assert!(missing.is_none());
        let present: Option<serde_json::Value> = archive.read_json("floorPlans.json").unwrap();
        assert!(present.is_some());
    }

    #[test]
    fn test_read_json_tolerates_bom() {
        let mut data = UTF8_BOM.to_vec();
        data.extend_from_slice(br#"{"tagKeys": []}"#);
        let archive = EsxArchive::from_entries(vec![ArchiveEntry::file("tagKeys.json", data)]);
        let value: Option<serde_json::Value> = archive.read_json("tagKeys.json").unwrap();
        assert!(value.unwrap()["tagKeys"].is_array());
    }

    #[test]
    fn test_read_json_malformed_is_error() {
        let archive = EsxArchive::from_entries(vec![ArchiveEntry::file(
            "accessPoints.json",
            b"{not json".to_vec(),
        )]);
        let result: Result<Option<serde_json::Value>> = archive.read_json("accessPoints.json");
        assert!(result.is_err());
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut archive = sample_archive();
        archive.replace("floorPlans.json", b"{}".to_vec());
        assert_eq!(archive.entries()[0].name, "floorPlans.json");
        assert_eq!(archive.entries()[0].data, b"{}");

        archive.replace("notes.json", b"{}".to_vec());
        assert_eq!(archive.entries().last().unwrap().name, "notes.json");
    }

    #[test]
    fn test_write_and_open() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("project.esx");
        sample_archive().write(&path).unwrap();

        let reread = EsxArchive::open(&path).unwrap();
        assert_eq!(reread.entries().len(), 3);
        assert!(!temp.path().join(".project.esx.tmp").exists());
    }

    #[test]
    fn test_unpack_and_pack() {
        let temp = TempDir::new().unwrap();
        let esx = temp.path().join("project.esx");
        sample_archive().write(&esx).unwrap();

        let dir = temp.path().join("project");
        assert_eq!(unpack(&esx, &dir).unwrap(), 3);
        assert!(dir.join("accessPoints.json").exists());
        assert!(dir.join("image-abc").exists());

        let repacked = temp.path().join("repacked.esx");
        assert_eq!(pack(&dir, &repacked).unwrap(), 3);
        let reread = EsxArchive::open(&repacked).unwrap();
        let names: Vec<&str> = reread.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["accessPoints.json", "floorPlans.json", "image-abc"]);
    }

    #[test]
    fn test_safe_entry_path_rejects_traversal() {
        assert!(safe_entry_path("../evil").is_err());
        assert!(safe_entry_path("/etc/passwd").is_err());
        assert!(safe_entry_path("\\windows").is_err());
        assert!(safe_entry_path("a/../../b").is_err());
        assert_eq!(
            safe_entry_path("images/image-1").unwrap(),
            PathBuf::from("images").join("image-1")
        );
    }

    #[test]
    fn test_open_non_zip_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.esx");
        fs::write(&path, b"not a zip").unwrap();
        assert!(EsxArchive::open(&path).is_err());
    }
}
