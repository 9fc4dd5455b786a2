//! External concatenation tool (ffmpeg) invocation.

use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{program} is not installed or not on PATH; install it to use snatch")]
    NotInstalled {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Captured result of one tool invocation.
#[derive(Debug)]
pub struct ToolRun {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl ToolRun {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    program: String,
}

impl Default for ToolCommand {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Runs `{program} -version`. Only failing to start the program counts;
    /// the exit code is not inspected. Returns the first output line.
    pub fn ensure_available(&self) -> Result<String, ToolError> {
        let out = Command::new(&self.program)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| ToolError::NotInstalled {
                program: self.program.clone(),
                source,
            })?;
        let text = String::from_utf8_lossy(&out.stdout);
        Ok(text.lines().next().unwrap_or_default().trim().to_string())
    }

    /// `-f concat -safe 0 -i {manifest} -c copy {output}`
    pub fn concat_args(manifest: &Path, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-f", "concat", "-safe", "0", "-i"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(manifest.as_os_str().to_owned());
        args.push("-c".into());
        args.push("copy".into());
        args.push(output.as_os_str().to_owned());
        args
    }

    /// Concatenate the segments listed in `manifest` into `output` by stream copy.
    /// Stdin is closed so an overwrite prompt fails instead of hanging.
    pub fn run_concat(&self, manifest: &Path, output: &Path) -> Result<ToolRun, ToolError> {
        let out = Command::new(&self.program)
            .args(Self::concat_args(manifest, output))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| ToolError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        Ok(ToolRun {
            status: out.status,
            stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        })
    }
}
