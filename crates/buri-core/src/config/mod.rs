//! Buri configuration layer.
//!
//! All environment variable reads go through this module; commands access
//! typed config structs instead of calling `std::env::var` directly.
//!
//! - `loader`: `env_or`, `env_optional`, `env_bool` helpers and `.env` loading
//! - `schema`: `PathsConfig`, `FleetConfig`, `ObservabilityConfig`
//! - `env_keys`: key constants (with legacy aliases)

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{env_bool, env_optional, env_or, load_dotenv, warn_deprecated_env_vars};
pub use schema::{FleetConfig, ObservabilityConfig, PathsConfig};
