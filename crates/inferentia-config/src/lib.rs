//! Centralized configuration for the inference engine.
//!
//! Every knob has an environment variable override; a `inferentia.toml` file
//! under `{data_dir}/config/` may supply defaults, but environment variables
//! always win so a deployment can override a checked-in file without editing
//! it.

mod model;
pub use model::*;

use std::env;
use std::path::PathBuf;

fn bool_env(var: &str, default: bool) -> bool {
    env::var(var)
        .ok()
        .map(|v| v.to_lowercase().trim().to_string())
        .map(|v| matches!(v.as_str(), "1" | "true" | "t" | "yes" | "y"))
        .unwrap_or(default)
}

fn usize_env(var: &str, default: usize) -> usize {
    env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Loads configuration from, in priority order: environment variables, then
/// `{data_dir}/config/inferentia.toml`, then built-in defaults.
pub fn load() -> EngineConfig {
    let mut cfg = EngineConfig::default();

    let config_file = PathBuf::from(&cfg.data_dir)
        .join("config")
        .join("inferentia.toml");
    if let Ok(text) = std::fs::read_to_string(&config_file) {
        match toml::from_str::<EngineConfig>(&text) {
            Ok(file_cfg) => cfg = file_cfg,
            Err(err) => {
                tracing::warn!(path = %config_file.display(), %err, "ignoring malformed config file");
            }
        }
    }

    if let Ok(dir) = env::var("INFERENTIA_DATA_DIR") {
        cfg.data_dir = dir;
    }
    cfg.multiplex_buffer_size = usize_env("INFERENTIA_MULTIPLEX_BUFFER_SIZE", cfg.multiplex_buffer_size);
    cfg.index_key_depth = usize_env("INFERENTIA_INDEX_KEY_DEPTH", cfg.index_key_depth);
    cfg.strict_occurs_check = bool_env("INFERENTIA_STRICT_OCCURS_CHECK", cfg.strict_occurs_check);

    cfg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.multiplex_buffer_size, 1);
        assert_eq!(cfg.index_key_depth, 2);
        assert!(cfg.strict_occurs_check);
    }

    #[test]
    fn env_vars_override_defaults() {
        env::set_var("INFERENTIA_MULTIPLEX_BUFFER_SIZE", "8");
        env::set_var("INFERENTIA_STRICT_OCCURS_CHECK", "false");
        let cfg = load();
        assert_eq!(cfg.multiplex_buffer_size, 8);
        assert!(!cfg.strict_occurs_check);
        env::remove_var("INFERENTIA_MULTIPLEX_BUFFER_SIZE");
        env::remove_var("INFERENTIA_STRICT_OCCURS_CHECK");
    }

    #[test]
    fn data_dir_env_override() {
        let tmp = tempfile::tempdir().unwrap();
        env::set_var("INFERENTIA_DATA_DIR", tmp.path().to_str().unwrap());
        let cfg = load();
        assert_eq!(cfg.data_dir, tmp.path().to_string_lossy());
        env::remove_var("INFERENTIA_DATA_DIR");
    }
}
