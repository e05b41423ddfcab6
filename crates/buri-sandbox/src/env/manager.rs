//! `Environment`: one venv rooted at a directory, driven through a `CommandRunner`.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use buri_core::log::RunLog;

use super::discovery::discover_interpreter;
use crate::error::EnvError;
use crate::process::{CommandRunner, Invocation};

/// Base interpreters tried in order when none are configured.
pub const DEFAULT_INTERPRETERS: &[&str] = &["python3", "py3", "py", "python"];

/// Name of the run log kept inside the environment directory.
const LOG_NAME: &str = "buri";

/// What to do when a command exits non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    /// Return `EnvError::CommandFailed`.
    Propagate,
    /// Hand the output back anyway (connectivity probes and the like).
    Suppress,
}

/// Memoized interpreter lookup. Computed on first query; only
/// [`Environment::ensure`] moves it back to `Unresolved`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Resolution {
    Unresolved,
    Resolved(PathBuf),
    Empty,
}

pub struct Environment {
    directory: PathBuf,
    base_interpreter: String,
    resolution: Resolution,
    install_failures: BTreeSet<String>,
    runner: Arc<dyn CommandRunner>,
    log: RunLog,
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("directory", &self.directory)
            .field("base_interpreter", &self.base_interpreter)
            .field("resolution", &self.resolution)
            .field("install_failures", &self.install_failures)
            .finish()
    }
}

impl Environment {
    /// Create `directory`, open `<directory>/buri.log`, then probe
    /// `candidates` in order with `--version` and bind the first that exits zero.
    pub fn new<S: AsRef<str>>(
        directory: impl Into<PathBuf>,
        candidates: &[S],
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self, EnvError> {
        let directory = directory.into();
        let log = RunLog::open(&directory, LOG_NAME);
        Self::with_log(directory, candidates, runner, log)
    }

    /// Like [`Environment::new`] with an explicit log sink.
    pub fn with_log<S: AsRef<str>>(
        directory: impl Into<PathBuf>,
        candidates: &[S],
        runner: Arc<dyn CommandRunner>,
        log: RunLog,
    ) -> Result<Self, EnvError> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory).map_err(|source| EnvError::Io {
            context: format!("Create environment directory {}", directory.display()),
            source,
        })?;
        let base_interpreter = probe_base_interpreter(runner.as_ref(), &log, candidates)?;
        Ok(Self {
            directory,
            base_interpreter,
            resolution: Resolution::Unresolved,
            install_failures: BTreeSet::new(),
            runner,
            log,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn base_interpreter(&self) -> &str {
        &self.base_interpreter
    }

    pub fn log(&self) -> &RunLog {
        &self.log
    }

    /// Requirements whose last install attempt failed.
    pub fn install_failures(&self) -> &BTreeSet<String> {
        &self.install_failures
    }

    /// Interpreter of the environment under the directory, if any.
    pub fn resolve(&mut self) -> Result<Option<PathBuf>, EnvError> {
        if self.resolution == Resolution::Unresolved {
            tracing::info!("Searching for VENV in {}", self.directory.display());
            self.resolution = match discover_interpreter(&self.directory)? {
                Some(path) => Resolution::Resolved(path),
                None => Resolution::Empty,
            };
        }
        Ok(match &self.resolution {
            Resolution::Resolved(path) => Some(path.clone()),
            Resolution::Unresolved | Resolution::Empty => None,
        })
    }

    /// Make sure an environment exists, wiping the directory first when `clear`.
    ///
    /// Creates it with `<base> -m venv <dir>` and upgrades pip inside it.
    pub fn ensure(&mut self, clear: bool) -> Result<(), EnvError> {
        if clear {
            self.log
                .info(format!("Clearing {}", self.directory.display()));
            let _ = std::fs::remove_dir_all(&self.directory);
            self.resolution = Resolution::Unresolved;
        }
        if self.resolve()?.is_some() {
            return Ok(());
        }

        let create = Invocation::new(&self.base_interpreter)
            .args(["-m", "venv"])
            .arg(&self.directory);
        self.execute(&create, "While trying to create venv", FailureMode::Propagate)?;

        self.resolution = Resolution::Unresolved;
        if self.resolve()?.is_none() {
            return Err(EnvError::EnvironmentNotCreated(self.directory.clone()));
        }
        self.run(
            ["-m", "pip", "install", "--upgrade", "pip"],
            "While upgrading pip",
            FailureMode::Propagate,
        )?;
        Ok(())
    }

    /// Run `<env-python> <args...>` and return its combined output.
    pub fn run<I, S>(&mut self, args: I, context: &str, mode: FailureMode) -> Result<String, EnvError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let python = self
            .resolve()?
            .ok_or_else(|| EnvError::NoEnvironment(self.directory.clone()))?;
        let invocation = Invocation::new(python).args(args);
        self.execute(&invocation, context, mode)
    }

    /// Install each requirement on its own. Failures are recorded in
    /// [`Environment::install_failures`] and do not stop the batch; a later
    /// success removes the entry again.
    pub fn install_all<I, S>(&mut self, requirements: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in requirements {
            let req = line.as_ref().trim();
            if req.is_empty() || req.starts_with('#') {
                continue;
            }
            let context = format!("While installing requirement {}", req);
            match self.run(["-m", "pip", "install", req], &context, FailureMode::Propagate) {
                Ok(_) => {
                    self.install_failures.remove(req);
                }
                Err(e) => {
                    self.log.warn(e.to_string());
                    self.install_failures.insert(req.to_string());
                }
            }
        }
    }

    fn execute(
        &self,
        invocation: &Invocation,
        context: &str,
        mode: FailureMode,
    ) -> Result<String, EnvError> {
        self.log.info(format!("Calling: {}", invocation));
        let out = match self.runner.run(invocation) {
            Ok(out) => out,
            Err(source) if mode == FailureMode::Propagate => {
                return Err(EnvError::Spawn {
                    command: invocation.to_string(),
                    source,
                })
            }
            Err(e) => {
                let msg = format!("{}: {}", context, e);
                self.log.warn(&msg);
                return Ok(msg);
            }
        };
        if !out.success() && mode == FailureMode::Propagate {
            return Err(EnvError::CommandFailed {
                context: context.to_string(),
                status: out.status,
                output: out.output,
            });
        }
        self.log.info(format!("Output: {}", out.output));
        Ok(out.output)
    }
}

fn probe_base_interpreter<S: AsRef<str>>(
    runner: &dyn CommandRunner,
    log: &RunLog,
    candidates: &[S],
) -> Result<String, EnvError> {
    let names: Vec<String> = candidates
        .iter()
        .map(|c| c.as_ref().trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();
    log.info(format!("Searching for base Python with {:?}", names));
    for name in &names {
        let probe = Invocation::new(name).arg("--version");
        log.info(format!("Calling: {}", probe));
        match runner.run(&probe) {
            Ok(out) if out.success() => {
                log.info(format!("Set base Python as [{}] with version {}", name, out.output));
                return Ok(name.clone());
            }
            Ok(out) => log.info(format!("{} exited {}", probe, out.status)),
            Err(e) => log.info(format!("{} not usable: {}", name, e)),
        }
    }
    Err(EnvError::NoInterpreterFound { candidates: names })
}
