//! Configuration loading
//!
//! File discovery, TOML/JSON parsing and `EVOSYNC_*` environment overrides.

pub mod loader;

pub use loader::{apply_env_overrides, load, load_from_file, load_with, probe_config_paths};
