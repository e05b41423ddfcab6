//! Command implementations. Each takes plain options so the CLI layer only
//! has to translate arguments.

pub mod fetch;
pub mod ping;
pub mod runner;
pub mod update;
