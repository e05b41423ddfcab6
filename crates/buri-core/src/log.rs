//! Per-directory run log.
//!
//! A `RunLog` is an explicit sink handed to whoever mutates an environment
//! directory. Each message goes to `tracing` and is appended to
//! `<dir>/<name>.log` as `YYYY-MM-DD HH:MM:SS -      INFO : message`.
//! The file is opened per write so that wiping and recreating the directory
//! never leaves a dangling handle; writes that fail are dropped.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl Level {
    fn as_str(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warn => "WARNING",
            Level::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunLog {
    path: Option<PathBuf>,
}

impl RunLog {
    /// Log bound to `<dir>/<name>.log`.
    pub fn open(dir: &Path, name: &str) -> Self {
        Self {
            path: Some(dir.join(format!("{}.log", name))),
        }
    }

    /// Log that only mirrors to tracing.
    pub fn detached() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        self.write(Level::Info, msg.as_ref());
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        self.write(Level::Warn, msg.as_ref());
    }

    pub fn error(&self, msg: impl AsRef<str>) {
        self.write(Level::Error, msg.as_ref());
    }

    pub fn write(&self, level: Level, msg: &str) {
        match level {
            Level::Info => tracing::info!("{}", msg),
            Level::Warn => tracing::warn!("{}", msg),
            Level::Error => tracing::error!("{}", msg),
        }
        let Some(ref path) = self.path else {
            return;
        };
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(path) {
            let _ = writeln!(f, "{}", format_line(level, msg));
        }
    }
}

fn format_line(level: Level, msg: &str) -> String {
    format!(
        "{} -{:>10} : {}",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        level.as_str(),
        msg
    )
}
