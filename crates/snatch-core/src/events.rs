//! Outward status stream of a run.
//!
//! Every line is logged through `tracing` and, when someone is listening,
//! appended to an unbounded channel. Sending never blocks the pipeline and a
//! dropped receiver is ignored.

use tokio::sync::mpsc;

/// One human-readable line emitted by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    Status(String),
    Error(String),
}

impl RunEvent {
    pub fn line(&self) -> &str {
        match self {
            RunEvent::Status(s) | RunEvent::Error(s) => s,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, RunEvent::Error(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<RunEvent>>,
}

impl EventSink {
    /// Sink plus the receiving end the caller drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<RunEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// Sink that only logs.
    pub fn detached() -> Self {
        Self { tx: None }
    }

    pub fn status(&self, line: impl Into<String>) {
        let line = line.into();
        tracing::info!(target: "snatch_core::events", "{}", line);
        self.send(RunEvent::Status(line));
    }

    pub fn error(&self, line: impl Into<String>) {
        let line = line.into();
        tracing::warn!(target: "snatch_core::events", "{}", line);
        self.send(RunEvent::Error(line));
    }

    fn send(&self, event: RunEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }
}
