//! Run orchestration: staging dir, fan-out fetch, assemble, completion.
//!
//! [`Pipeline::start`] runs on a dedicated thread and reports back only
//! through the event channel and a one-shot completion carrying the
//! [`RunOutcome`]. Only one run per `Pipeline` may be active at a time.

mod guard;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::assembler::{self, AssembleOutcome, ToolCommand};
use crate::config::{FetchSettings, SnatchConfig};
use crate::events::{EventSink, RunEvent};
use crate::fetcher::{self, FetchSummary};
use crate::run_config::RunConfig;

use guard::RunGuard;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("a run is already in progress; wait for it to complete")]
    RunInProgress,
    #[error("failed to start run thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Terminal result of one run, delivered exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Fetching finished and the assembler ran (its own outcome may be a failure).
    Completed {
        fetch: FetchSummary,
        assemble: AssembleOutcome,
    },
    /// The run stopped before assembly (staging dir or HTTP engine failure, or
    /// the run thread died).
    Aborted(String),
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            RunOutcome::Completed { assemble, .. } if assemble.is_success()
        )
    }
}

/// Caller side of a started run.
#[derive(Debug)]
pub struct RunHandle {
    events: mpsc::UnboundedReceiver<RunEvent>,
    done: oneshot::Receiver<RunOutcome>,
}

impl RunHandle {
    /// Status lines in emission order. Closed once the run thread is gone.
    pub fn events(&mut self) -> &mut mpsc::UnboundedReceiver<RunEvent> {
        &mut self.events
    }

    pub fn into_parts(self) -> (mpsc::UnboundedReceiver<RunEvent>, oneshot::Receiver<RunOutcome>) {
        (self.events, self.done)
    }

    /// Waits for the completion signal.
    pub async fn wait(self) -> RunOutcome {
        completion(self.done.await)
    }

    /// Blocking variant of [`RunHandle::wait`]; must not be called from async code.
    pub fn wait_blocking(self) -> RunOutcome {
        completion(self.done.blocking_recv())
    }
}

fn completion(res: Result<RunOutcome, oneshot::error::RecvError>) -> RunOutcome {
    res.unwrap_or_else(|_| RunOutcome::Aborted("run thread exited without reporting".to_string()))
}

#[derive(Debug, Clone)]
pub struct Pipeline {
    settings: FetchSettings,
    tool: ToolCommand,
    active: Arc<AtomicBool>,
}

impl Pipeline {
    pub fn new(settings: FetchSettings, tool: ToolCommand) -> Self {
        Self {
            settings,
            tool,
            active: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn from_config(cfg: &SnatchConfig) -> Self {
        Self::new(cfg.fetch_settings(), ToolCommand::new(cfg.tool_program.clone()))
    }

    pub fn tool(&self) -> &ToolCommand {
        &self.tool
    }

    /// True while a run holds the single-run slot.
    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Run to completion on the calling thread.
    pub fn run(&self, config: &RunConfig, sink: &EventSink) -> Result<RunOutcome, PipelineError> {
        let _guard = RunGuard::acquire(&self.active).ok_or(PipelineError::RunInProgress)?;
        Ok(execute(config, self.settings, &self.tool, sink))
    }

    /// Start a run on its own thread. Refused while another run is active.
    pub fn start(&self, config: RunConfig) -> Result<RunHandle, PipelineError> {
        let guard = RunGuard::acquire(&self.active).ok_or(PipelineError::RunInProgress)?;
        let (sink, events) = EventSink::channel();
        let (done_tx, done) = oneshot::channel();
        let settings = self.settings;
        let tool = self.tool.clone();

        std::thread::Builder::new()
            .name("snatch-run".to_string())
            .spawn(move || {
                let outcome = execute(&config, settings, &tool, &sink);
                // Re-arm before signalling so a caller reacting to completion can start again.
                drop(guard);
                let _ = done_tx.send(outcome);
            })?;

        Ok(RunHandle { events, done })
    }
}

fn execute(
    config: &RunConfig,
    settings: FetchSettings,
    tool: &ToolCommand,
    sink: &EventSink,
) -> RunOutcome {
    let staging = config.staging();
    tracing::info!(
        template = config.url_template(),
        segments = config.total_segments(),
        staging = %staging.dir().display(),
        "run started"
    );
    if config.staging_order_overflows() {
        // Staging names are fixed-width; past that width file-name order and
        // index order diverge. Left as is; the manifest follows file-name order.
        tracing::warn!(
            segment_count = config.segment_count(),
            "segment indices exceed staging file name width; manifest order may not match index order"
        );
    }

    if let Err(e) = staging.create() {
        let detail = format!("{:#}", e);
        sink.error(format!("An error occurred: {}", detail));
        return RunOutcome::Aborted(detail);
    }

    let fetch = match fetcher::fetch_all(config, &staging, settings, sink) {
        Ok(summary) => summary,
        Err(e) => {
            let detail = format!("{:#}", e);
            sink.error(format!("An error occurred: {}", detail));
            if let Err(e) = staging.remove() {
                sink.error(format!("Cleanup failed for {}: {}", staging.dir().display(), e));
            }
            return RunOutcome::Aborted(detail);
        }
    };

    sink.status("Downloading finished, now converting...");
    let assemble = assembler::assemble(&staging, &config.output_path(), tool, sink);
    tracing::info!(
        downloaded = fetch.downloaded,
        skipped = fetch.skipped,
        failed = fetch.failed,
        success = assemble.is_success(),
        "run finished"
    );
    RunOutcome::Completed { fetch, assemble }
}
