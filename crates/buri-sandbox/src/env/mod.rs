//! Virtual environment management: locate, create, wipe and run inside one
//! isolated interpreter installation rooted at a directory.
//!
//! Callers hand in a `CommandRunner`; nothing in here spawns processes directly.

pub mod discovery;
pub mod manager;

pub use discovery::discover_interpreter;
pub use manager::{Environment, FailureMode, DEFAULT_INTERPRETERS};
