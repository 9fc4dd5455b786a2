pub mod config;
pub mod logging;

pub mod assembler;
pub mod duration;
pub mod events;
pub mod fetcher;
pub mod pipeline;
pub mod run_config;
pub mod sanitize;
pub mod staging;
pub mod template;

pub use assembler::{AssembleOutcome, ToolCommand, ToolError};
pub use events::{EventSink, RunEvent};
pub use pipeline::{Pipeline, PipelineError, RunHandle, RunOutcome};
pub use run_config::{ConfigError, RunConfig};
