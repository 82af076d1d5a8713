//! Configuration loader
//!
//! Loads application configuration from a file (when one is found) and then
//! applies environment overrides on top.
//!
//! ## Loading Strategy
//! 1. Read `.env` if present (via `dotenvy`)
//! 2. Use `EVOSYNC_CONFIG` when set, otherwise probe the standard paths
//! 3. Fall back to built-in defaults when no file exists
//! 4. Apply `EVOSYNC_*` environment overrides
//!
//! ## Environment Variables
//! - `EVOSYNC_CONFIG`: Explicit config file path
//! - `EVOSYNC_COMPANY_SN`, `EVOSYNC_TICKET`: Evosus credentials
//! - `EVOSYNC_BASE_URL`: Evosus API base URL
//! - `EVOSYNC_TEST_MODE`: Simulate Evosus (true/false)
//! - `EVOSYNC_DATABASE_PATH`: SQLite database file
//! - `EVOSYNC_WEBHOOK_SECRET`: Shared secret for inbound webhooks
//! - `EVOSYNC_WEBHOOK_BIND`: Webhook listen address
//! - `EVOSYNC_AUTO_SYNC`: Enqueue orders on status change (true/false)
//! - `EVOSYNC_LOG_LEVEL`, `EVOSYNC_LOG_JSON`: Process logging
//!
//! ## File Locations
//! `./evosync.toml`, `./config/evosync.toml`, `./evosync.json`, then the
//! same names next to the executable.

use std::path::{Path, PathBuf};

use evosync_domain::{Config, EvosyncError, Result};
use tracing::{debug, info};

pub const CONFIG_PATH_VAR: &str = "EVOSYNC_CONFIG";

const CANDIDATE_FILES: [&str; 3] = ["evosync.toml", "config/evosync.toml", "evosync.json"];

/// Load configuration from `path` (or `EVOSYNC_CONFIG`, or the discovered
/// file, or defaults) plus environment overrides.
///
/// # Errors
/// Returns `EvosyncError::Config` if an explicit file is missing, a file
/// cannot be parsed, or an override has an invalid value.
pub fn load(path: Option<PathBuf>) -> Result<Config> {
    match dotenvy::dotenv() {
        Ok(env_path) => debug!(path = %env_path.display(), "loaded .env file"),
        Err(err) if err.not_found() => {}
        Err(err) => return Err(EvosyncError::Config(format!("Invalid .env file: {err}"))),
    }

    let explicit = path.or_else(|| {
        std::env::var(CONFIG_PATH_VAR).ok().filter(|p| !p.trim().is_empty()).map(PathBuf::from)
    });
    load_with(explicit)
}

/// Like [`load`] without reading `.env` or `EVOSYNC_CONFIG`.
pub fn load_with(path: Option<PathBuf>) -> Result<Config> {
    let mut config = match path {
        Some(path) => load_from_file(&path)?,
        None => match probe_config_paths() {
            Some(path) => load_from_file(&path)?,
            None => {
                info!("No config file found; using defaults");
                Config::default()
            }
        },
    };
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Load configuration from a file.
///
/// # Errors
/// Returns `EvosyncError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Err(EvosyncError::Config(format!("Config file not found: {}", path.display())));
    }

    info!(path = %path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(path)
        .map_err(|e| EvosyncError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, path)
}

/// Parse configuration; format is detected by file extension.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| EvosyncError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| EvosyncError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(EvosyncError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing config file among the standard locations.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(CANDIDATE_FILES.iter().map(|name| cwd.join(name)));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(CANDIDATE_FILES.iter().map(|name| exe_dir.join(name)));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Overlay `EVOSYNC_*` variables onto `config`.
///
/// # Errors
/// Returns `EvosyncError::Config` for unparseable numeric values.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Some(value) = env_var("EVOSYNC_COMPANY_SN") {
        config.evosus.company_sn = value;
    }
    if let Some(value) = env_var("EVOSYNC_TICKET") {
        config.evosus.ticket = value;
    }
    if let Some(value) = env_var("EVOSYNC_BASE_URL") {
        config.evosus.base_url = value;
    }
    config.evosus.test_mode = env_bool("EVOSYNC_TEST_MODE", config.evosus.test_mode);

    if let Some(value) = env_var("EVOSYNC_DATABASE_PATH") {
        config.database.path = value;
    }
    if let Some(value) = env_var("EVOSYNC_DB_POOL_SIZE") {
        config.database.pool_size = value
            .parse()
            .map_err(|e| EvosyncError::Config(format!("Invalid pool size: {e}")))?;
    }

    if let Some(value) = env_var("EVOSYNC_WEBHOOK_SECRET") {
        config.webhook.secret = Some(value);
    }
    if let Some(value) = env_var("EVOSYNC_WEBHOOK_BIND") {
        config.webhook.bind = value;
    }
    config.sync.auto_sync = env_bool("EVOSYNC_AUTO_SYNC", config.sync.auto_sync);

    if let Some(value) = env_var("EVOSYNC_LOG_LEVEL") {
        config.logging.level = value;
    }
    config.logging.json = env_bool("EVOSYNC_LOG_JSON", config.logging.json);
    Ok(())
}

/// Non-empty environment variable.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    env_var(key)
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::TempDir;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const OVERRIDE_VARS: [&str; 11] = [
        "EVOSYNC_COMPANY_SN",
        "EVOSYNC_TICKET",
        "EVOSYNC_BASE_URL",
        "EVOSYNC_TEST_MODE",
        "EVOSYNC_DATABASE_PATH",
        "EVOSYNC_DB_POOL_SIZE",
        "EVOSYNC_WEBHOOK_SECRET",
        "EVOSYNC_WEBHOOK_BIND",
        "EVOSYNC_AUTO_SYNC",
        "EVOSYNC_LOG_LEVEL",
        "EVOSYNC_LOG_JSON",
    ];

    fn clear_env() {
        for key in OVERRIDE_VARS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        for (value, expected) in [("1", true), ("TRUE", true), ("yes", true), ("on", true), ("0", false), ("off", false)] {
            std::env::set_var("EVOSYNC_TEST_BOOL", value);
            assert_eq!(env_bool("EVOSYNC_TEST_BOOL", !expected), expected, "value {value}");
        }

        std::env::remove_var("EVOSYNC_TEST_BOOL");
        assert!(env_bool("EVOSYNC_TEST_BOOL", true));
        assert!(!env_bool("EVOSYNC_TEST_BOOL", false));
    }

    #[test]
    fn test_load_from_toml_file() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("evosync.toml");
        std::fs::write(
            &path,
            r#"
[evosus]
company_sn = "SN-1"
ticket = "tkt"
test_mode = false

[queue]
batch_size = 25

[[sync.tax_rates]]
rate = 0.13
code = "7"
"#,
        )
        .unwrap();

        let config = load_with(Some(path)).unwrap();
        assert!(config.evosus.has_credentials());
        assert_eq!(config.queue.batch_size, 25);
        assert_eq!(config.queue.max_attempts, 3);
        assert_eq!(config.sync.tax_rates.len(), 1);
        assert_eq!(config.database.path, "evosync.db");
    }

    #[test]
    fn test_load_from_json_file() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("evosync.json");
        std::fs::write(&path, r#"{"webhook": {"secret": "whsec", "require_secret": true}}"#).unwrap();

        let config = load_with(Some(path)).unwrap();
        assert_eq!(config.webhook.secret.as_deref(), Some("whsec"));
        assert!(config.webhook.require_secret);
    }

    #[test]
    fn test_env_overrides_win_over_file() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("evosync.toml");
        std::fs::write(&path, "[evosus]\ncompany_sn = \"FROM-FILE\"\n").unwrap();

        std::env::set_var("EVOSYNC_COMPANY_SN", "FROM-ENV");
        std::env::set_var("EVOSYNC_TEST_MODE", "yes");
        std::env::set_var("EVOSYNC_DATABASE_PATH", "/tmp/evosync-test.db");
        std::env::set_var("EVOSYNC_AUTO_SYNC", "1");

        let config = load_with(Some(path)).unwrap();
        clear_env();

        assert_eq!(config.evosus.company_sn, "FROM-ENV");
        assert!(config.evosus.test_mode);
        assert_eq!(config.database.path, "/tmp/evosync-test.db");
        assert!(config.sync.auto_sync);
    }

    #[test]
    fn test_invalid_pool_size_is_rejected() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("EVOSYNC_DB_POOL_SIZE", "lots");
        let mut config = Config::default();
        let result = apply_env_overrides(&mut config);
        clear_env();

        assert!(matches!(result, Err(EvosyncError::Config(_))));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        let result = load_with(Some(PathBuf::from("/nonexistent/evosync.toml")));
        assert!(matches!(result, Err(EvosyncError::Config(msg)) if msg.contains("not found")));
    }

    #[test]
    fn test_unsupported_extension() {
        let result = parse_config("", Path::new("config.yaml"));
        assert!(matches!(result, Err(EvosyncError::Config(_))));
    }
}
