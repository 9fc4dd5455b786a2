//! Concat demuxer list file: one `file '<path>'` line per segment.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Quote a path for the concat list. A `'` inside the path is closed, escaped
/// and reopened (`'\''`), the form the demuxer parses back.
fn quote(path: &Path) -> String {
    path.to_string_lossy().replace('\'', r"'\''")
}

/// Render the list in the given order, newline-terminated.
pub fn render_manifest(segments: &[PathBuf]) -> String {
    let mut out = String::new();
    for p in segments {
        out.push_str("file '");
        out.push_str(&quote(p));
        out.push_str("'\n");
    }
    out
}

pub fn write_manifest(path: &Path, segments: &[PathBuf]) -> Result<()> {
    fs::write(path, render_manifest(segments))
        .with_context(|| format!("write manifest {}", path.display()))
}
