//! Per-segment fetch failure.

use std::fmt;

/// Why one segment did not land in the staging area. Reported, never retried.
#[derive(Debug)]
pub enum FetchError {
    /// Server answered with something other than 200.
    Status(u32),
    /// Curl failed before a response was complete (connect, timeout, reset...).
    Transport(curl::Error),
    /// The body arrived but could not be written to the staging file.
    Storage(std::io::Error),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Status(code) => write!(f, "status code: {}", code),
            FetchError::Transport(e) => write!(f, "{}", e),
            FetchError::Storage(e) => write!(f, "storage: {}", e),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Transport(e) => Some(e),
            FetchError::Storage(e) => Some(e),
            FetchError::Status(_) => None,
        }
    }
}
