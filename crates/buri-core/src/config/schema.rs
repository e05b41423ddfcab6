//! Config structs grouped by concern, loaded from environment variables.

use super::env_keys::{fleet, observability as obv_keys, paths};
use super::loader::{env_bool, env_optional, env_or};
use std::path::PathBuf;

/// Default fleet API endpoint for runner registrations.
pub const DEFAULT_FLEET_URL: &str = "https://gitlab.com/api/v4/runners";

/// Default sub directory holding the environment.
pub const DEFAULT_SUB_DIR: &str = "buri_venv";

/// Platform default root for CI state.
pub fn default_root_dir() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from(r"C:\ci")
    } else {
        PathBuf::from("/opt/ci")
    }
}

/// Where the managed environment lives.
#[derive(Debug, Clone)]
pub struct PathsConfig {
    pub root_dir: PathBuf,
    pub sub_dir: String,
}

impl PathsConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        let root_dir = env_optional(paths::BURI_ROOT_DIR, paths::ROOT_DIR_ALIASES)
            .map(PathBuf::from)
            .unwrap_or_else(default_root_dir);
        let sub_dir = env_or(paths::BURI_SUB_DIR, &[], || DEFAULT_SUB_DIR.to_string());
        Self { root_dir, sub_dir }
    }

    /// `<root>/<sub>`
    pub fn environment_dir(&self) -> PathBuf {
        self.root_dir.join(&self.sub_dir)
    }
}

/// Fleet API access settings.
#[derive(Debug, Clone)]
pub struct FleetConfig {
    pub api_url: String,
    pub token: String,
    pub machine_ip: Option<String>,
}

impl FleetConfig {
    pub fn from_env() -> Self {
        super::loader::load_dotenv();
        Self {
            api_url: env_or(fleet::BURI_FLEET_URL, fleet::FLEET_URL_ALIASES, || {
                DEFAULT_FLEET_URL.to_string()
            }),
            token: env_or(fleet::BURI_FLEET_TOKEN, fleet::FLEET_TOKEN_ALIASES, String::new),
            machine_ip: env_optional(fleet::BURI_MACHINE_IP, &[]),
        }
    }
}

/// Log verbosity and format, read once per process.
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    pub quiet: bool,
    pub log_level: String,
    pub log_json: bool,
}

impl ObservabilityConfig {
    pub fn from_env() -> &'static Self {
        use std::sync::OnceLock;
        static CACHE: OnceLock<ObservabilityConfig> = OnceLock::new();
        CACHE.get_or_init(|| {
            super::loader::load_dotenv();
            Self {
                quiet: env_bool(obv_keys::BURI_QUIET, obv_keys::QUIET_ALIASES, false),
                log_level: env_or(obv_keys::BURI_LOG_LEVEL, obv_keys::LOG_LEVEL_ALIASES, || {
                    "buri=info".to_string()
                }),
                log_json: env_bool(obv_keys::BURI_LOG_JSON, &[], false),
            }
        })
    }
}
