//! Ordered reassembly of staged segments into the output file.
//!
//! Lists the staged `.ts` files in file-name order, writes the concat
//! manifest, runs the tool with stream copy and then empties and removes the
//! staging directory whatever the tool did.

mod manifest;
mod tool;

pub use manifest::{render_manifest, write_manifest};
pub use tool::{ToolCommand, ToolError, ToolRun};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::events::EventSink;
use crate::staging::StagingArea;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssembleOutcome {
    /// Tool exited 0; `segments` files were concatenated into `output`.
    Converted { output: PathBuf, segments: usize },
    /// Tool ran and exited non-zero, or could not be started.
    ToolFailed {
        code: Option<i32>,
        diagnostic: String,
    },
    /// Listing the staging area or writing the manifest failed; the tool never ran.
    Failed(String),
}

impl AssembleOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AssembleOutcome::Converted { .. })
    }
}

/// Assemble whatever segments are staged into `output`, then clean up.
pub fn assemble(
    staging: &StagingArea,
    output: &Path,
    tool: &ToolCommand,
    sink: &EventSink,
) -> AssembleOutcome {
    let manifest_path = staging.manifest_path();
    let segments = match staging.list_segments() {
        Ok(s) => s,
        Err(e) => {
            let detail = format!("{:#}", e);
            sink.error(format!("An error occurred: {}", detail));
            cleanup(staging, &manifest_path, &[], sink);
            return AssembleOutcome::Failed(detail);
        }
    };

    let outcome = convert(&manifest_path, &segments, output, tool, sink);
    cleanup(staging, &manifest_path, &segments, sink);
    outcome
}

fn convert(
    manifest_path: &Path,
    segments: &[PathBuf],
    output: &Path,
    tool: &ToolCommand,
    sink: &EventSink,
) -> AssembleOutcome {
    if let Err(e) = write_manifest(manifest_path, segments) {
        let detail = format!("{:#}", e);
        sink.error(format!("An error occurred: {}", detail));
        return AssembleOutcome::Failed(detail);
    }
    tracing::debug!(
        manifest = %manifest_path.display(),
        segments = segments.len(),
        "manifest written"
    );

    let run = match tool.run_concat(manifest_path, output) {
        Ok(run) => run,
        Err(e) => {
            sink.error(format!("An error occurred: {}", e));
            return AssembleOutcome::ToolFailed {
                code: None,
                diagnostic: e.to_string(),
            };
        }
    };

    let diagnostic = run.stderr.trim().to_string();
    if run.success() {
        if !diagnostic.is_empty() {
            sink.status(diagnostic);
        }
        sink.status(format!("Conversion complete: {}", output.display()));
        AssembleOutcome::Converted {
            output: output.to_path_buf(),
            segments: segments.len(),
        }
    } else {
        sink.error(format!(
            "An error occurred: {} returned non-zero {}",
            tool.program(),
            run.status
        ));
        if !diagnostic.is_empty() {
            sink.error(diagnostic.clone());
        }
        AssembleOutcome::ToolFailed {
            code: run.status.code(),
            diagnostic,
        }
    }
}

/// Remove the manifest, every listed segment, then the staging directory.
/// Problems are reported and otherwise ignored.
fn cleanup(staging: &StagingArea, manifest_path: &Path, segments: &[PathBuf], sink: &EventSink) {
    for path in std::iter::once(manifest_path).chain(segments.iter().map(PathBuf::as_path)) {
        if let Err(e) = remove_file_if_present(path) {
            sink.error(format!("Cleanup failed for {}: {}", path.display(), e));
        }
    }
    if let Err(e) = staging.remove() {
        sink.error(format!(
            "Cleanup failed for {}: {}",
            staging.dir().display(),
            e
        ));
    }
}

fn remove_file_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
