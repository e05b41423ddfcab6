//! Process execution collaborator.
//!
//! Commands are built as argument vectors (`Invocation`), never as shell
//! strings. `CommandRunner` is the seam tests replace; `SystemRunner` spawns
//! real processes and folds stderr into the returned output.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io;
use std::process::{Command, Stdio};

use buri_core::log::RunLog;

/// A program plus its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: OsString,
    args: Vec<OsString>,
}

impl Invocation {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    /// Arguments as lossy UTF-8, handy for matching in fakes and logs.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.argv().join(" "))
    }
}

/// Exit status and combined stdout/stderr of a finished command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: i32,
    pub output: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Runs one command to completion.
pub trait CommandRunner: Send + Sync {
    /// `Err` only when the process could not be started at all.
    fn run(&self, invocation: &Invocation) -> io::Result<CommandOutput>;
}

/// Spawns real processes with `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<CommandOutput> {
        let out = Command::new(invocation.program())
            .args(invocation.arguments())
            .stdin(Stdio::null())
            .output()?;
        let mut output = String::from_utf8_lossy(&out.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&out.stderr);
        if !stderr.trim().is_empty() {
            if !output.is_empty() && !output.ends_with('\n') {
                output.push('\n');
            }
            output.push_str(&stderr);
        }
        let trimmed = output.trim_end_matches(['\n', '\r']).len();
        output.truncate(trimmed);
        Ok(CommandOutput {
            // Killed by a signal: no exit code.
            status: out.status.code().unwrap_or(-1),
            output,
        })
    }
}

/// Best-effort single ping to `host`. Never fails: unreachable hosts and a
/// missing `ping` binary both come back as text.
///
/// Hosts may ignore ICMP even when the name is valid.
pub fn ping_host(runner: &dyn CommandRunner, log: &RunLog, host: &str) -> String {
    let count_flag = if cfg!(windows) { "-n" } else { "-c" };
    let invocation = Invocation::new("ping").args([count_flag, "1", host]);
    log.info(format!("Calling: {}", invocation));
    match runner.run(&invocation) {
        Ok(out) => {
            if !out.success() {
                log.warn(format!("Could not reach host at {}", host));
            }
            log.info(format!("Output: {}", out.output));
            out.output
        }
        Err(e) => {
            let msg = format!("Could not reach host at {}: {}", host, e);
            log.warn(&msg);
            msg
        }
    }
}
