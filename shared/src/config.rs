use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::CoffeeError;
use crate::PRODUCT_NAME;

/// Environment variable that forces debug mode on or off.
pub const DEBUG_ENV: &str = "COFFEE_DEBUG";

/// Startup configuration stored in JSON. Read once; never written back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Keep the Dock icon (macOS) or a console window (Windows).
    #[serde(default)]
    pub debug: bool,
    /// `tracing` filter directive, e.g. `"coffee_shared=debug"`
    #[serde(default)]
    pub log_filter: Option<String>,
    /// Overrides where icon assets are looked up
    #[serde(default)]
    pub resources_dir: Option<PathBuf>,
}

pub fn config_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join(PRODUCT_NAME).join("config.json")
}

/// Loads the config from its default location and applies environment
/// overrides.
pub fn load_config() -> Result<AppConfig, CoffeeError> {
    let mut config = load_config_from(&config_path())?;
    apply_env_override(&mut config, std::env::var(DEBUG_ENV).ok().as_deref());
    Ok(config)
}

/// A missing file yields the default config.
pub fn load_config_from(path: &Path) -> Result<AppConfig, CoffeeError> {
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn apply_env_override(config: &mut AppConfig, value: Option<&str>) {
    let Some(value) = value else { return };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => config.debug = true,
        "0" | "false" | "no" | "off" => config.debug = false,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(!config.debug);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "debug": true }"#).unwrap();

        let config = load_config_from(&path).unwrap();
        assert!(config.debug);
        assert_eq!(config.log_filter, None);
        assert_eq!(config.resources_dir, None);
    }

    #[test]
    fn full_file_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "debug": false, "log_filter": "trace", "resources_dir": "/opt/coffee" }"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.log_filter.as_deref(), Some("trace"));
        assert_eq!(config.resources_dir, Some(PathBuf::from("/opt/coffee")));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ debug: ").unwrap();
        assert!(matches!(load_config_from(&path), Err(CoffeeError::Json(_))));
    }

    #[test]
    fn env_override_forces_debug() {
        let mut config = AppConfig::default();
        apply_env_override(&mut config, Some("1"));
        assert!(config.debug);
        apply_env_override(&mut config, Some(" OFF "));
        assert!(!config.debug);
    }

    #[test]
    fn unrecognised_env_value_is_ignored() {
        let mut config = AppConfig {
            debug: true,
            ..AppConfig::default()
        };
        apply_env_override(&mut config, Some("maybe"));
        assert!(config.debug);
        apply_env_override(&mut config, None);
        assert!(config.debug);
    }

    #[test]
    fn config_lives_under_product_dir() {
        let path = config_path();
        assert!(path.ends_with("Coffee/config.json"));
    }
}
