//! Shell-script stand-in for ffmpeg's concat demuxer.
//!
//! Invoked as `-f concat -safe 0 -i MANIFEST -c copy OUTPUT`: appends one line
//! to a call log, keeps a copy of the manifest, then concatenates the listed
//! files into OUTPUT. The failing variant prints to stderr and exits 1.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

const CONCAT_SCRIPT: &str = r#"#!/bin/sh
echo call >> "@CALLS@"
cp "$6" "@SEEN@"
: > "$9"
sed -n "s/^file '\(.*\)'\$/\1/p" "$6" | while IFS= read -r f; do cat "$f" >> "$9"; done
echo "fake concat: wrote $9" >&2
"#;

const FAILING_SCRIPT: &str = r#"#!/bin/sh
echo call >> "@CALLS@"
cp "$6" "@SEEN@"
echo "boom: invalid data found when processing input" >&2
exit 1
"#;

pub struct FakeTool {
    pub program: PathBuf,
    calls: PathBuf,
    seen: PathBuf,
}

impl FakeTool {
    /// Tool that concatenates the manifest entries into the output.
    pub fn concat(dir: &Path) -> Self {
        Self::write(dir, CONCAT_SCRIPT)
    }

    /// Tool that always exits 1 with a diagnostic on stderr.
    pub fn failing(dir: &Path) -> Self {
        Self::write(dir, FAILING_SCRIPT)
    }

    fn write(dir: &Path, template: &str) -> Self {
        let program = dir.join("fake-ffmpeg.sh");
        let calls = dir.join("calls.log");
        let seen = dir.join("manifest.seen");
        let script = template
            .replace("@CALLS@", &calls.to_string_lossy())
            .replace("@SEEN@", &seen.to_string_lossy());
        fs::write(&program, script).unwrap();
        fs::set_permissions(&program, fs::Permissions::from_mode(0o755)).unwrap();
        Self {
            program,
            calls,
            seen,
        }
    }

    pub fn program(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Number of times the tool was invoked.
    pub fn calls(&self) -> usize {
        fs::read_to_string(&self.calls)
            .map(|s| s.lines().count())
            .unwrap_or(0)
    }

    /// Lines of the last manifest the tool received.
    pub fn manifest_lines(&self) -> Vec<String> {
        fs::read_to_string(&self.seen)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}
