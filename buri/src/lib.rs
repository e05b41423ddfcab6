//! Buri: keep one Python virtual environment on a CI worker current without
//! racing the jobs that run on it.
//!
//! - [`lifecycle`]: the update cycle (pause → mutate → resume)
//! - [`commands`]: entry points behind the `buri` subcommands

pub mod commands;
pub mod lifecycle;

pub use lifecycle::{Coordinator, RequirementsSource, UpdateError, UpdateReport, UpdateRequest};
