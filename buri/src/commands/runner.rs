//! `buri runner`: pause (with drain) or resume one machine's runners by hand.

use std::sync::Arc;

use anyhow::{Context, Result};
use buri_fleet::{FleetClient, UreqClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RunnerState {
    Off,
    On,
}

pub fn cmd_runner(ip: &str, token: &str, state: RunnerState, url: &str) -> Result<()> {
    let mut fleet = FleetClient::new(ip, token, url, Arc::new(UreqClient::new()));
    match state {
        RunnerState::Off => {
            let outcome = fleet
                .pause()
                .with_context(|| format!("Failed turning off {}", ip))?;
            if outcome.drained {
                eprintln!("✓ Paused {} runner(s), no jobs running", outcome.paused);
            } else {
                eprintln!(
                    "⚠ Paused {} runner(s), {} job(s) still running after {:.0?}",
                    outcome.paused, outcome.running_jobs, outcome.elapsed
                );
            }
        }
        RunnerState::On => {
            let resumed = fleet
                .resume()
                .with_context(|| format!("Failed turning on {}", ip))?;
            eprintln!("✓ Resumed {} runner(s)", resumed);
        }
    }
    Ok(())
}
