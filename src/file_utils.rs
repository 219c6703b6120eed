use anyhow::{Context, Result};
use chrono::Local;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::source::VectorFormat;

// @module: Script discovery, output naming and durable writes

/// Name of the warnings log written next to the outputs
pub const ISSUES_LOG_FILE: &str = "academicplot.issues.log";

/// Extension of plot scripts
pub const SCRIPT_EXTENSION: &str = "py";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @generates: `<dir>/<stem>_<suffix>.<ext>`
    // @params: output_dir falls back to the input's directory
    pub fn revision_output_path<P: AsRef<Path>>(
        input_file: P,
        output_dir: Option<&Path>,
        revision_suffix: &str,
    ) -> PathBuf {
        let input_file = input_file.as_ref();
        let stem = input_file.file_stem().unwrap_or_default().to_string_lossy();

        let file_name = match input_file.extension() {
            Some(ext) => format!("{}_{}.{}", stem, revision_suffix, ext.to_string_lossy()),
            None => format!("{}_{}", stem, revision_suffix),
        };

        output_dir
            .map(Path::to_path_buf)
            .or_else(|| input_file.parent().map(Path::to_path_buf))
            .unwrap_or_default()
            .join(file_name)
    }

    // @generates: Figure name relative to the script's working directory
    pub fn figure_file_name<P: AsRef<Path>>(input_file: P, figure_suffix: &str, format: VectorFormat) -> String {
        let stem = input_file.as_ref().file_stem().unwrap_or_default().to_string_lossy();
        format!("{}_{}.{}", stem, figure_suffix, format.extension())
    }

    pub fn is_revision_output<P: AsRef<Path>>(path: P, revision_suffix: &str) -> bool {
        let marker = format!("_{}", revision_suffix);
        path.as_ref()
            .file_stem()
            .is_some_and(|stem| stem.to_string_lossy().ends_with(&marker))
    }

    /// Plot scripts under `dir`, recursively and sorted by name.
    ///
    /// Files that are themselves revisions are left out so a second folder
    /// run never revises its own outputs.
    pub fn find_scripts<P: AsRef<Path>>(dir: P, revision_suffix: &str) -> Result<Vec<PathBuf>> {
        let mut scripts = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true).sort_by_file_name() {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            let is_script = entry.file_type().is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case(SCRIPT_EXTENSION));

            if is_script && !Self::is_revision_output(path, revision_suffix) {
                scripts.push(path.to_path_buf());
            }
        }

        Ok(scripts)
    }

    /// Replace `path` through a temporary sibling; readers see old or new content, never a mix
    pub fn write_atomic<P: AsRef<Path>>(path: P, content: &str) -> std::io::Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let mut temp = NamedTempFile::new_in(dir)?;
        temp.write_all(content.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| e.error)?;

        Ok(())
    }

    /// Append `[timestamp] content` to a log file
    pub fn append_to_log_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {:?}", path))?;

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(file, "[{}] {}", timestamp, content)
            .with_context(|| format!("Failed to write to log file: {:?}", path))
    }
}
