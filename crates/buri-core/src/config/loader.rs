//! Reading settings from the process environment and `.env` files.

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Once;

use super::env_keys::{fleet, observability, paths};

/// `(legacy, current)` variable names. A legacy name still works but earns a warning.
const DEPRECATED_PAIRS: &[(&str, &str)] = &[
    (paths::ROOT_DIR_ALIASES[0], paths::BURI_ROOT_DIR),
    (observability::QUIET_ALIASES[0], observability::BURI_QUIET),
    (fleet::FLEET_URL_ALIASES[0], fleet::BURI_FLEET_URL),
    (fleet::FLEET_TOKEN_ALIASES[0], fleet::BURI_FLEET_TOKEN),
];

/// Legacy names from `pairs` that are set while their replacement is not.
fn deprecated_in_use<'a>(pairs: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
    pairs
        .iter()
        .copied()
        .filter(|(legacy, current)| env::var_os(legacy).is_some() && env::var_os(current).is_none())
        .collect()
}

/// Warn once about legacy variable names. Call after tracing is initialized.
pub fn warn_deprecated_env_vars() {
    static WARNED: Once = Once::new();
    WARNED.call_once(|| {
        for (legacy, current) in deprecated_in_use(DEPRECATED_PAIRS) {
            tracing::warn!("[DEPRECATED] {} is set; rename it to {}", legacy, current);
        }
    });
}

/// Read `./.env` into the process environment, once. Set variables win.
pub fn load_dotenv() {
    static LOADED: Once = Once::new();
    LOADED.call_once(|| {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        load_dotenv_from(&cwd.join(".env"));
    });
}

/// Read a dotenv file into the process environment. Set variables win; a
/// missing file is not an error.
pub fn load_dotenv_from(path: &Path) {
    let Ok(content) = std::fs::read_to_string(path) else {
        return;
    };
    for (key, value) in parse_dotenv(&content) {
        if env::var_os(&key).is_none() {
            env::set_var(key, value);
        }
    }
}

/// `KEY=value` pairs of a dotenv file, in order.
pub fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    content.lines().filter_map(parse_dotenv_line).collect()
}

fn parse_dotenv_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.starts_with('#') {
        return None;
    }
    let (key, raw) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    let raw = raw.trim();
    let value = match raw.chars().next() {
        Some(q @ ('"' | '\'')) => raw[1..].split(q).next().unwrap_or_default(),
        _ => raw.split(" #").next().unwrap_or_default().trim_end(),
    };
    Some((key.to_string(), value.to_string()))
}

/// First set value among `primary` and then `aliases`.
fn lookup(primary: &str, aliases: &[&str]) -> Option<String> {
    std::iter::once(primary)
        .chain(aliases.iter().copied())
        .find_map(|key| env::var(key).ok())
}

/// Value of `primary` or an alias; `default` when unset or empty.
pub fn env_or<F>(primary: &str, aliases: &[&str], default: F) -> String
where
    F: FnOnce() -> String,
{
    lookup(primary, aliases)
        .filter(|v| !v.is_empty())
        .unwrap_or_else(default)
}

/// Trimmed value of `primary` or an alias; blank counts as unset.
pub fn env_optional(primary: &str, aliases: &[&str]) -> Option<String> {
    lookup(primary, aliases)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Flag variable. `0`, `false`, `no` and `off` disable it, anything else enables it.
pub fn env_bool(primary: &str, aliases: &[&str], default: bool) -> bool {
    match lookup(primary, aliases) {
        Some(v) => !["0", "false", "no", "off"].contains(&v.trim().to_ascii_lowercase().as_str()),
        None => default,
    }
}
