//! Configuration for the bridge.
//!
//! Loads configuration from a TOML file and provides runtime defaults. The
//! scene-format list lives here because the hosting pipeline defines which
//! scene files it manages; the bridge only consumes the list.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub scene: SceneConfig,

    #[serde(default)]
    pub connection: ConnectionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Scene-file extensions the hosting pipeline manages, in preference
    /// order. Open requests outside this list are refused unless forced.
    #[serde(default = "default_scene_formats")]
    pub formats: Vec<String>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            formats: default_scene_formats(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Force a specific dispatch identifier instead of discovering one.
    /// The `ILLUSTRATOR_BRIDGE_DISPATCH` environment variable still wins.
    #[serde(default)]
    pub dispatch_name: Option<String>,

    /// Force the application name addressed by the script channel
    /// (e.g. "Adobe Illustrator 2024") instead of scanning /Applications.
    #[serde(default)]
    pub app_name: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_scene_formats() -> Vec<String> {
    vec![".ai".to_string(), ".ait".to_string()]
}

impl Config {
    /// Default location: `<user config dir>/illustrator-bridge/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("illustrator-bridge").join("config.toml"))
    }

    /// Load configuration from a TOML file, falling back to defaults when
    /// the file is missing or malformed.
    pub fn load_or_default(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    log::info!("loaded configuration from {}", path.display());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "failed to parse {}: {}; using defaults",
                        path.display(),
                        err
                    );
                    Config::default()
                }
            },
            Err(_) => {
                log::debug!("no configuration at {}; using defaults", path.display());
                Config::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.scene.formats, vec![".ai", ".ait"]);
        assert_eq!(config.connection.dispatch_name, None);
        assert_eq!(config.connection.app_name, None);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [connection]
            dispatch_name = "Illustrator.Application.27"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.connection.dispatch_name.as_deref(),
            Some("Illustrator.Application.27")
        );
        assert_eq!(config.scene.formats, vec![".ai", ".ait"]);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("nope.toml"));
        assert_eq!(config.scene.formats, vec![".ai", ".ait"]);
    }

    #[test]
    fn test_load_malformed_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not [valid toml").unwrap();

        let config = Config::load_or_default(&path);
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_roundtrip() {
        let mut config = Config::default();
        config.scene.formats = vec![".ai".to_string()];
        config.connection.app_name = Some("Adobe Illustrator 2024".to_string());

        let rendered = toml::to_string(&config).unwrap();
        let restored: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(restored.scene.formats, vec![".ai"]);
        assert_eq!(
            restored.connection.app_name.as_deref(),
            Some("Adobe Illustrator 2024")
        );
    }
}
