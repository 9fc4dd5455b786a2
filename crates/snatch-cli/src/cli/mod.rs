//! CLI for the snatch segment fetcher.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use snatch_core::assembler::ToolCommand;
use snatch_core::config;
use std::path::PathBuf;

use commands::{run_check_tool, run_fetch};

/// Top-level CLI for snatch.
#[derive(Debug, Parser)]
#[command(name = "snatch")]
#[command(about = "snatch: fetch numbered media segments and join them with ffmpeg", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch every segment of a stream and assemble `<name>.mp4`.
    Fetch(FetchArgs),

    /// Check that the concatenation tool can be started.
    CheckTool,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Segment URL template; `(*)` is replaced by the segment number.
    pub url: String,

    /// Value of the Referer header sent with every request.
    #[arg(long)]
    pub referer: String,

    /// Zero-pad the segment number in the URL to this many digits.
    #[arg(long, default_value = "0", value_name = "WIDTH")]
    pub padding: usize,

    /// Highest segment number; segments 0..=N are fetched.
    #[arg(long, value_name = "N", required_unless_present = "duration", conflicts_with = "duration")]
    pub segments: Option<u64>,

    /// Derive the highest segment number from the video length (hh:mm:ss).
    #[arg(long, value_name = "HH:MM:SS", requires = "segment_secs")]
    pub duration: Option<String>,

    /// Seconds of video per segment, used with --duration.
    #[arg(long, value_name = "SECS", requires = "duration")]
    pub segment_secs: Option<u64>,

    /// Directory that receives the output (default: current directory).
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output file name without extension; invalid characters are stripped.
    #[arg(long)]
    pub name: String,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);
        let tool = ToolCommand::new(cfg.tool_program.clone());

        match cli.command {
            CliCommand::Fetch(args) => {
                // Missing tool is fatal before any run is accepted.
                let version = tool.ensure_available()?;
                tracing::debug!(tool = tool.program(), version = %version, "tool available");
                run_fetch(&cfg, args).await?;
            }
            CliCommand::CheckTool => run_check_tool(&tool).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
