//! `buri ping`

use anyhow::Result;
use buri_core::log::RunLog;
use buri_sandbox::process::ping_host;
use buri_sandbox::SystemRunner;

/// Print the output of a single best-effort ping.
pub fn cmd_ping(host: &str) -> Result<()> {
    println!("{}", ping_host(&SystemRunner, &RunLog::detached(), host));
    Ok(())
}
