use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while managing a virtual environment.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("Could not find a base Python interpreter in:\n\t{}", .candidates.join("\n\t"))]
    NoInterpreterFound { candidates: Vec<String> },

    #[error(
        "Found {} possible Python interpreters in {}:\n\t{}",
        .paths.len(),
        .root.display(),
        join_paths(.paths)
    )]
    AmbiguousEnvironment { root: PathBuf, paths: Vec<PathBuf> },

    #[error("{context} (exit status {status}): {output}")]
    CommandFailed {
        context: String,
        status: i32,
        output: String,
    },

    #[error("Could not make virtual environment in {0}")]
    EnvironmentNotCreated(PathBuf),

    #[error("No virtual environment found in {0}")]
    NoEnvironment(PathBuf),

    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join("\n\t")
}
