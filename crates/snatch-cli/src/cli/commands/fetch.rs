//! `snatch fetch` – fetch every segment, assemble the output, print status lines as they arrive.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local, TimeZone};
use snatch_core::config::SnatchConfig;
use snatch_core::duration::segments_for_duration;
use snatch_core::pipeline::Pipeline;
use snatch_core::run_config::RunConfig;
use std::fmt::Display;

use crate::cli::FetchArgs;

pub async fn run_fetch(cfg: &SnatchConfig, args: FetchArgs) -> Result<()> {
    let segment_count = segment_count(&args)?;
    let output_dir = match args.output_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("resolve current directory")?,
    };

    let run = RunConfig::new(
        args.url,
        args.referer,
        args.padding,
        segment_count,
        output_dir,
        &args.name,
    )?;
    let output = run.output_path();

    let pipeline = Pipeline::from_config(cfg);
    let mut handle = pipeline.start(run)?;

    while let Some(event) = handle.events().recv().await {
        let line = format!("{} - {}", clock_prefix(&Local::now()), event.line());
        if event.is_error() {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    let outcome = handle.wait().await;
    if !outcome.is_success() {
        bail!("run did not produce {}", output.display());
    }
    Ok(())
}

fn segment_count(args: &FetchArgs) -> Result<u64> {
    match (args.segments, args.duration.as_deref(), args.segment_secs) {
        (Some(n), _, _) => Ok(n),
        (None, Some(hms), Some(secs)) => Ok(segments_for_duration(hms, secs)?),
        _ => bail!("either --segments or --duration with --segment-secs is required"),
    }
}

/// Wall-clock time of day as `hh:mm:ss` in the timezone of `now`.
fn clock_prefix<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    now.format("%H:%M:%S").to_string()
}
