//! Segment fetcher and concurrency controller.
//!
//! Every index `0..=segment_count` gets one GET with the run's `Referer`
//! header. All transfers share one curl multi handle capped at
//! `max_connections` simultaneous connections; excess indices wait for a free
//! slot. A segment whose file already exists in the staging area is skipped
//! without touching the network. Failures are reported on the event stream and
//! leave a gap; nothing is retried and nothing short-circuits the run.

mod error;
mod handler;
mod request;
mod run;

pub use error::FetchError;
pub use handler::BodyHandler;

use anyhow::Result;
use std::fs;

use crate::config::FetchSettings;
use crate::events::EventSink;
use crate::run_config::RunConfig;
use crate::staging::{segment_file_name, StagingArea};

/// Result of fetching one segment.
#[derive(Debug)]
pub enum FetchOutcome {
    /// File was already staged; no request was made.
    Skipped,
    /// Status 200; body written to the staging file.
    Downloaded { bytes: u64 },
    Failed(FetchError),
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, FetchOutcome::Failed(_))
    }
}

/// Tally of one fan-out. `downloaded + skipped + failed` equals the number of
/// indices in the run once [`fetch_all`] returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub downloaded: u64,
    pub skipped: u64,
    pub failed: u64,
    pub bytes: u64,
}

impl FetchSummary {
    pub fn record(&mut self, outcome: &FetchOutcome) {
        match outcome {
            FetchOutcome::Skipped => self.skipped += 1,
            FetchOutcome::Downloaded { bytes } => {
                self.downloaded += 1;
                self.bytes += bytes;
            }
            FetchOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn settled(&self) -> u64 {
        self.downloaded + self.skipped + self.failed
    }
}

/// First half of a fetch: either settled immediately or a request to drive.
pub enum Begin {
    Settled(FetchOutcome),
    Request(curl::easy::Easy2<BodyHandler>),
}

/// Fetches single segments of one run into its staging area.
pub struct SegmentFetcher<'a> {
    config: &'a RunConfig,
    staging: &'a StagingArea,
    settings: FetchSettings,
    sink: &'a EventSink,
}

impl<'a> SegmentFetcher<'a> {
    pub fn new(
        config: &'a RunConfig,
        staging: &'a StagingArea,
        settings: FetchSettings,
        sink: &'a EventSink,
    ) -> Self {
        Self {
            config,
            staging,
            settings,
            sink,
        }
    }

    /// Skip check, then request setup. A handle that cannot be configured
    /// settles the segment as a transport failure.
    pub fn begin(&self, index: u64) -> Begin {
        let name = segment_file_name(index);
        if self.staging.has_segment(index) {
            self.sink
                .status(format!("{} already exists, skipping download.", name));
            return Begin::Settled(FetchOutcome::Skipped);
        }

        let url = self.config.url_for(index);
        self.sink.status(format!("Request URL: {}", url));
        match request::build_request(&url, self.config.referer(), &self.settings) {
            Ok(easy) => Begin::Request(easy),
            Err(e) => {
                self.sink
                    .error(format!("Failed to download {}: {}", name, e));
                Begin::Settled(FetchOutcome::Failed(FetchError::Transport(e)))
            }
        }
    }

    /// Second half of a fetch: `response` is the HTTP status or the transfer
    /// error reported by curl; `body` is the buffered response body.
    pub fn finish(
        &self,
        index: u64,
        response: Result<u32, curl::Error>,
        body: &[u8],
    ) -> FetchOutcome {
        let name = segment_file_name(index);
        let code = match response {
            Ok(code) => code,
            Err(e) => {
                self.sink
                    .error(format!("Failed to download {}: {}", name, e));
                return FetchOutcome::Failed(FetchError::Transport(e));
            }
        };
        if code != 200 {
            self.sink.error(format!(
                "Failed to download {}, status code: {}",
                name, code
            ));
            return FetchOutcome::Failed(FetchError::Status(code));
        }

        // Written in place: a crash mid-write leaves a partial file that a later
        // run treats as already downloaded.
        if let Err(e) = fs::write(self.staging.segment_path(index), body) {
            self.sink
                .error(format!("Failed to download {}: storage: {}", name, e));
            return FetchOutcome::Failed(FetchError::Storage(e));
        }
        self.sink.status(format!(
            "Success to download {}, status code: {}",
            name, code
        ));
        FetchOutcome::Downloaded {
            bytes: body.len() as u64,
        }
    }
}

/// Fetches every index of `config` into `staging`, at most
/// `settings.max_connections` transfers at a time. Returns once every index
/// has settled. `Err` only when the multi handle itself fails.
pub fn fetch_all(
    config: &RunConfig,
    staging: &StagingArea,
    settings: FetchSettings,
    sink: &EventSink,
) -> Result<FetchSummary> {
    let fetcher = SegmentFetcher::new(config, staging, settings, sink);
    let summary = run::run_multi(&fetcher, config.indices(), settings.max_connections)?;
    tracing::debug!(
        downloaded = summary.downloaded,
        skipped = summary.skipped,
        failed = summary.failed,
        bytes = summary.bytes,
        "fetch fan-in complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RunEvent;

    fn setup() -> (tempfile::TempDir, RunConfig) {
        let dir = tempfile::tempdir().unwrap();
        let cfg =
            RunConfig::new("http://127.0.0.1:1/seg(*).ts", "http://127.0.0.1/", 2, 2, dir.path(), "show")
                .unwrap();
        cfg.staging().create().unwrap();
        (dir, cfg)
    }

    fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<RunEvent>) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev.line().to_string());
        }
        out
    }

    #[test]
    fn begin_skips_existing_segment() {
        let (_dir, cfg) = setup();
        let staging = cfg.staging();
        fs::write(staging.segment_path(1), b"old").unwrap();
        let (sink, mut rx) = EventSink::channel();
        let fetcher = SegmentFetcher::new(&cfg, &staging, FetchSettings::default(), &sink);

        match fetcher.begin(1) {
            Begin::Settled(FetchOutcome::Skipped) => {}
            _ => panic!("expected skip"),
        }
        assert_eq!(drain(&mut rx), vec!["000001.ts already exists, skipping download."]);
        assert_eq!(fs::read(staging.segment_path(1)).unwrap(), b"old");
    }

    #[test]
    fn begin_announces_request_url() {
        let (_dir, cfg) = setup();
        let staging = cfg.staging();
        let (sink, mut rx) = EventSink::channel();
        let fetcher = SegmentFetcher::new(&cfg, &staging, FetchSettings::default(), &sink);

        assert!(matches!(fetcher.begin(2), Begin::Request(_)));
        assert_eq!(drain(&mut rx), vec!["Request URL: http://127.0.0.1:1/seg02.ts"]);
    }

    #[test]
    fn finish_writes_body_on_200() {
        let (_dir, cfg) = setup();
        let staging = cfg.staging();
        let (sink, mut rx) = EventSink::channel();
        let fetcher = SegmentFetcher::new(&cfg, &staging, FetchSettings::default(), &sink);

        let outcome = fetcher.finish(0, Ok(200), b"payload");
        assert!(matches!(outcome, FetchOutcome::Downloaded { bytes: 7 }));
        assert_eq!(fs::read(staging.segment_path(0)).unwrap(), b"payload");
        assert_eq!(drain(&mut rx), vec!["Success to download 000000.ts, status code: 200"]);
    }

    #[test]
    fn finish_non_200_leaves_gap() {
        let (_dir, cfg) = setup();
        let staging = cfg.staging();
        let (sink, mut rx) = EventSink::channel();
        let fetcher = SegmentFetcher::new(&cfg, &staging, FetchSettings::default(), &sink);

        let outcome = fetcher.finish(1, Ok(404), b"not found");
        assert!(matches!(outcome, FetchOutcome::Failed(FetchError::Status(404))));
        assert!(!outcome.is_success());
        assert!(!staging.has_segment(1));
        assert_eq!(drain(&mut rx), vec!["Failed to download 000001.ts, status code: 404"]);
    }

    #[test]
    fn finish_transport_error_reported() {
        let (_dir, cfg) = setup();
        let staging = cfg.staging();
        let sink = EventSink::detached();
        let fetcher = SegmentFetcher::new(&cfg, &staging, FetchSettings::default(), &sink);

        // 7 = CURLE_COULDNT_CONNECT
        let outcome = fetcher.finish(2, Err(curl::Error::new(7)), b"");
        assert!(matches!(outcome, FetchOutcome::Failed(FetchError::Transport(_))));
        assert!(!staging.has_segment(2));
    }

    #[test]
    fn summary_counts_every_outcome() {
        let mut summary = FetchSummary::default();
        summary.record(&FetchOutcome::Skipped);
        summary.record(&FetchOutcome::Downloaded { bytes: 10 });
        summary.record(&FetchOutcome::Failed(FetchError::Status(500)));
        assert_eq!(summary.settled(), 3);
        assert_eq!(summary.bytes, 10);
    }

    #[test]
    fn fetch_all_with_everything_staged_makes_no_requests() {
        let (_dir, cfg) = setup();
        let staging = cfg.staging();
        for i in cfg.indices() {
            fs::write(staging.segment_path(i), b"x").unwrap();
        }
        let summary = fetch_all(&cfg, &staging, FetchSettings::default(), &EventSink::detached()).unwrap();
        assert_eq!(summary.skipped, 3);
        assert_eq!(summary.downloaded, 0);
        assert_eq!(summary.failed, 0);
    }
}
