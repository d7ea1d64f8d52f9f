//! Loading the application configuration with confy

use std::path::Path;

use gentimer_types::AppConfig;

use crate::error::ConfigError;

const APP_NAME: &str = "gentimer";
const CONFIG_NAME: &str = "config";

pub trait AppConfigExt: Sized {
    /// Load from the platform config directory, falling back to defaults
    fn load() -> Self;
    /// Load from an explicit file; a missing file is created with defaults
    fn load_from(path: &Path) -> Result<Self, ConfigError>;
}

impl AppConfigExt for AppConfig {
    fn load() -> Self {
        match confy::load(APP_NAME, CONFIG_NAME) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load configuration, using defaults");
                AppConfig::default()
            }
        }
    }

    fn load_from(path: &Path) -> Result<Self, ConfigError> {
        confy::load_path(path).map_err(|source| ConfigError::LoadPath {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gentimer_types::CloseBehavior;

    #[test]
    fn test_load_from_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gentimer.toml");

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_load_from_reads_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gentimer.toml");
        std::fs::write(
            &path,
            "tick_interval_ms = 500\n[server]\nport = 2024\n[window]\nclose_behavior = \"suppress\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.tick_interval_ms, 500);
        assert_eq!(config.server.port, 2024);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.window.close_behavior, CloseBehavior::Suppress);
    }

    #[test]
    fn test_load_from_invalid_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gentimer.toml");
        std::fs::write(&path, "tick_interval_ms = \"soon\"").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::LoadPath { .. }));
    }
}
