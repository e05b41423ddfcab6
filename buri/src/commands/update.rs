//! `buri update`: the job a CI machine runs to keep its environment current.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use buri_core::config::{FleetConfig, PathsConfig};
use buri_core::log::RunLog;
use buri_fleet::{FleetClient, HttpClient, UreqClient};
use buri_sandbox::{CommandRunner, Environment, SystemRunner, DEFAULT_INTERPRETERS};

use crate::lifecycle::{Coordinator, RequirementsSource, UpdateRequest};

/// Run log written into the environment directory.
const LOG_NAME: &str = "buri";

/// Options for one update run. `None` fields fall back to the environment config.
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    pub root_dir: Option<PathBuf>,
    pub sub_dir: Option<String>,
    pub interpreters: Vec<String>,
    pub requirements: String,
    pub ip: Option<String>,
    pub token: Option<String>,
    pub url: Option<String>,
    pub pause: bool,
    pub clear: bool,
}

pub fn cmd_update(opts: UpdateOptions) -> Result<()> {
    let paths = PathsConfig::from_env();
    let fleet_cfg = FleetConfig::from_env();

    let dir = PathsConfig {
        root_dir: opts.root_dir.unwrap_or(paths.root_dir),
        sub_dir: opts.sub_dir.unwrap_or(paths.sub_dir),
    }
    .environment_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Create environment directory {}", dir.display()))?;
    // Anchored before the working directory moves into it.
    let dir = dir
        .canonicalize()
        .with_context(|| format!("Resolve environment directory {}", dir.display()))?;
    let log = RunLog::open(&dir, LOG_NAME);

    // Relative requirement paths are relative to the environment directory.
    let original_dir = std::env::current_dir().unwrap_or_default();
    log.info(format!(
        "Going from:\n\t\t{}\n\tto:\n\t\t{}",
        original_dir.display(),
        dir.display()
    ));
    std::env::set_current_dir(&dir)
        .with_context(|| format!("Change directory to {}", dir.display()))?;

    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);
    let http: Arc<dyn HttpClient> = Arc::new(UreqClient::new());

    let interpreters: Vec<String> = if opts.interpreters.is_empty() {
        DEFAULT_INTERPRETERS.iter().map(|s| s.to_string()).collect()
    } else {
        opts.interpreters
    };
    let env = Environment::with_log(&dir, &interpreters, runner, log)?;
    let fleet = FleetClient::new(
        opts.ip.or(fleet_cfg.machine_ip).unwrap_or_default(),
        opts.token.unwrap_or(fleet_cfg.token),
        opts.url.unwrap_or(fleet_cfg.api_url),
        http.clone(),
    );

    let request = UpdateRequest {
        requirements: RequirementsSource::parse(&opts.requirements),
        clear: opts.clear,
        pause: opts.pause,
    };
    let mut coordinator = Coordinator::new(env, fleet, http);
    let report = coordinator.update(&request)?;

    if report.install_failures.is_empty() {
        eprintln!("✓ Environment up to date in {}", dir.display());
    } else {
        eprintln!(
            "⚠ Environment updated in {} with failed installs: {}",
            dir.display(),
            report.install_failures.join(", ")
        );
    }
    Ok(())
}
