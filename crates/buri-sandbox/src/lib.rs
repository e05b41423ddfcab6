pub mod env;
pub mod error;
pub mod process;

pub use env::{Environment, FailureMode, DEFAULT_INTERPRETERS};
pub use error::EnvError;
pub use process::{CommandOutput, CommandRunner, Invocation, SystemRunner};
