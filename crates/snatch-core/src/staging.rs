//! Per-run staging directory: segment files and the concat manifest.
//!
//! Layout: `{folder}/{name}_tmp/{000000..}.ts` plus `{folder}/{name}_tmp/files.txt`.
//! The directory is owned by exactly one run and removed when it ends.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Digits in a staging segment file name, independent of the URL padding.
pub const SEGMENT_NAME_WIDTH: usize = 6;
/// Extension of staged segment files.
pub const SEGMENT_EXTENSION: &str = "ts";
/// File name of the concat manifest inside the staging directory.
pub const MANIFEST_FILE_NAME: &str = "files.txt";

/// `{index:06}.ts`
pub fn segment_file_name(index: u64) -> String {
    format!(
        "{:0width$}.{}",
        index,
        SEGMENT_EXTENSION,
        width = SEGMENT_NAME_WIDTH
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingArea {
    dir: PathBuf,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Staging directory for an output named `file_name` in `folder`.
    pub fn for_output(folder: &Path, file_name: &str) -> Self {
        Self::new(folder.join(format!("{}_tmp", file_name)))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn segment_path(&self, index: u64) -> PathBuf {
        self.dir.join(segment_file_name(index))
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE_NAME)
    }

    /// A present file counts as downloaded, even if a crash truncated it.
    pub fn has_segment(&self, index: u64) -> bool {
        self.segment_path(index).exists()
    }

    pub fn exists(&self) -> bool {
        self.dir.is_dir()
    }

    /// Creates the directory (and parents). An existing one is reused so a
    /// previous interrupted run can resume.
    pub fn create(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create staging dir {}", self.dir.display()))
    }

    /// Staged segment files sorted ascending by file name.
    pub fn list_segments(&self) -> Result<Vec<PathBuf>> {
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("list staging dir {}", self.dir.display()))?;
        let mut names: Vec<String> = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_segment_file_name(&name) {
                names.push(name);
            }
        }
        names.sort();
        Ok(names.into_iter().map(|n| self.dir.join(n)).collect())
    }

    /// Removes the directory and anything left in it. Missing is not an error.
    pub fn remove(&self) -> io::Result<()> {
        match fs::remove_dir_all(&self.dir) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

fn is_segment_file_name(name: &str) -> bool {
    name.len() > SEGMENT_EXTENSION.len() + 1
        && name.ends_with(&format!(".{}", SEGMENT_EXTENSION))
}
