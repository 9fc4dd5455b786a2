//! `snatch check-tool` – report whether the concatenation tool can be started.

use anyhow::Result;
use snatch_core::assembler::ToolCommand;

pub async fn run_check_tool(tool: &ToolCommand) -> Result<()> {
    let version = tool.ensure_available()?;
    if version.is_empty() {
        println!("{}: available", tool.program());
    } else {
        println!("{}: {}", tool.program(), version);
    }
    Ok(())
}
