//! CLI command handlers.

mod check_tool;
mod fetch;

pub use check_tool::run_check_tool;
pub use fetch::run_fetch;
