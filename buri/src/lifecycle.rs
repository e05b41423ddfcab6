//! Update cycle: pause the machine's runners when an existing environment is
//! about to change, (re)create the environment, install requirements, resume.
//!
//! Ordering: pause strictly precedes any mutation, which strictly precedes
//! resume. A failure between pause and resume propagates immediately and the
//! runners stay paused.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use buri_fleet::{DrainOutcome, FleetClient, FleetError, HttpClient, HttpError, HttpRequest};
use buri_sandbox::{EnvError, Environment, FailureMode};
use thiserror::Error;

/// Packages the environment's own tooling needs.
pub const BASELINE_PACKAGES: &[&str] = &["setuptools_scm", "requests"];

/// Where remote requirement files are stored inside the environment directory.
pub const REQUIREMENTS_FILE: &str = "requirements.txt";

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("If in a runner, the machine IP must be given to pause it")]
    MissingAddress,

    #[error("Requirements path does not exist: {}", .0.display())]
    RequirementsNotFound(PathBuf),

    #[error("Failed fetching remote {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: HttpError,
    },

    #[error("{context} {}: {source}", .path.display())]
    Io {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Env(#[from] EnvError),

    #[error(transparent)]
    Fleet(#[from] FleetError),
}

/// Where requirements come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequirementsSource {
    Local(PathBuf),
    Remote(String),
}

impl RequirementsSource {
    /// Blank → `None`, `http…` → remote, anything else → local path.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            None
        } else if raw.starts_with("http") {
            Some(Self::Remote(raw.to_string()))
        } else {
            Some(Self::Local(PathBuf::from(raw)))
        }
    }
}

/// One update operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateRequest {
    pub requirements: Option<RequirementsSource>,
    pub clear: bool,
    pub pause: bool,
}

/// What an update did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub paused: Option<DrainOutcome>,
    /// Environment was (re)created this run.
    pub created: bool,
    /// Requirements file installed from, after fetching remote sources.
    pub requirements: Option<PathBuf>,
    pub resumed: Option<usize>,
    pub install_failures: Vec<String>,
}

pub struct Coordinator {
    env: Environment,
    fleet: FleetClient,
    http: Arc<dyn HttpClient>,
}

impl Coordinator {
    pub fn new(env: Environment, fleet: FleetClient, http: Arc<dyn HttpClient>) -> Self {
        env.log().info("Finished instantiating Buri.");
        Self { env, fleet, http }
    }

    pub fn update(&mut self, request: &UpdateRequest) -> Result<UpdateReport, UpdateError> {
        let mut report = UpdateReport::default();
        let existing = self.env.resolve()?.is_some();

        // Only an environment that already exists can be in use by running jobs.
        if request.pause && existing {
            if self.fleet.machine().trim().is_empty() {
                return Err(UpdateError::MissingAddress);
            }
            self.env
                .log()
                .info(format!("Pausing runner {}", self.fleet.machine()));
            let outcome = self.fleet.pause()?;
            self.env.log().info(describe_drain(&outcome));
            report.paused = Some(outcome);
        }

        if !existing || request.clear {
            self.env.ensure(request.clear)?;
            report.created = true;
            self.env
                .log()
                .info("Asserting essential requirements are installed.");
            self.env.install_all(BASELINE_PACKAGES);
        }

        if let Some(source) = &request.requirements {
            let path = self.materialize(source)?;
            self.install_from_file(&path)?;
            report.requirements = Some(path);
        }

        if report.paused.is_some() {
            self.env
                .log()
                .info(format!("Starting runner {}", self.fleet.machine()));
            let resumed = self.fleet.resume()?;
            self.env
                .log()
                .info(format!("Resumed {} runner(s)", resumed));
            report.resumed = Some(resumed);
        }

        report.install_failures = self.env.install_failures().iter().cloned().collect();
        if !report.install_failures.is_empty() {
            self.env.log().warn(format!(
                "Failed to install: {}",
                report.install_failures.join(", ")
            ));
        }
        Ok(report)
    }

    /// Local path for `source`, downloading remote files into the environment directory.
    fn materialize(&self, source: &RequirementsSource) -> Result<PathBuf, UpdateError> {
        let path = match source {
            RequirementsSource::Local(path) => path.clone(),
            RequirementsSource::Remote(url) => {
                let content = self
                    .http
                    .send(&HttpRequest::get(url))
                    .map_err(|source| UpdateError::Fetch {
                        url: url.clone(),
                        source,
                    })?;
                let path = self.env.directory().join(REQUIREMENTS_FILE);
                std::fs::write(&path, content).map_err(|source| UpdateError::Io {
                    context: "Failed writing",
                    path: path.clone(),
                    source,
                })?;
                path
            }
        };
        if !path.exists() {
            return Err(UpdateError::RequirementsNotFound(path));
        }
        Ok(path)
    }

    /// Single `pip install -r <file> --upgrade`; pip resolves the set as a whole.
    fn install_from_file(&mut self, path: &Path) -> Result<(), UpdateError> {
        self.env
            .log()
            .info(format!("Updating requirements from {}", path.display()));
        let content = std::fs::read_to_string(path).map_err(|source| UpdateError::Io {
            context: "Failed reading",
            path: path.to_path_buf(),
            source,
        })?;
        self.env.log().info(content);
        self.env.run(
            [
                OsStr::new("-m"),
                OsStr::new("pip"),
                OsStr::new("install"),
                OsStr::new("-r"),
                path.as_os_str(),
                OsStr::new("--upgrade"),
            ],
            &format!("While installing requirements from {}", path.display()),
            FailureMode::Propagate,
        )?;
        Ok(())
    }
}

fn describe_drain(outcome: &DrainOutcome) -> String {
    if outcome.drained {
        format!(
            "Paused {} runner(s); no jobs running after {:.0?}",
            outcome.paused, outcome.elapsed
        )
    } else {
        format!(
            "Paused {} runner(s); {} job(s) still running after {:.0?}, continuing anyway",
            outcome.paused, outcome.running_jobs, outcome.elapsed
        )
    }
}
