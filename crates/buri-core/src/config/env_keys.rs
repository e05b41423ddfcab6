//! Environment variable keys and their legacy aliases.
//!
//! Primary variables use the `BURI_*` prefix. Aliases keep older job
//! definitions (Theia era, plain GitLab names) working.

/// Where the environment directory lives.
pub mod paths {
    pub const BURI_ROOT_DIR: &str = "BURI_ROOT_DIR";
    pub const ROOT_DIR_ALIASES: &[&str] = &["THEIA_ROOT_DIR"];

    pub const BURI_SUB_DIR: &str = "BURI_SUB_DIR";
}

/// Fleet API access.
pub mod fleet {
    pub const BURI_FLEET_URL: &str = "BURI_FLEET_URL";
    pub const FLEET_URL_ALIASES: &[&str] = &["GITLAB_RUNNERS_URL"];

    pub const BURI_FLEET_TOKEN: &str = "BURI_FLEET_TOKEN";
    pub const FLEET_TOKEN_ALIASES: &[&str] = &["GITLAB_TOKEN"];

    pub const BURI_MACHINE_IP: &str = "BURI_MACHINE_IP";
}

/// Observability and logging.
pub mod observability {
    pub const BURI_QUIET: &str = "BURI_QUIET";
    pub const QUIET_ALIASES: &[&str] = &["THEIA_QUIET"];

    pub const BURI_LOG_LEVEL: &str = "BURI_LOG_LEVEL";
    pub const LOG_LEVEL_ALIASES: &[&str] = &[];

    pub const BURI_LOG_JSON: &str = "BURI_LOG_JSON";
}
