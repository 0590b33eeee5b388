//! JSON-backed configuration store.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::error::ConfigError;
use crate::domain::DEFAULT_PORT;
use crate::paths::{default_executable_path, default_model_path};

/// Environment variable that overrides the configuration directory.
pub const CONFIG_DIR_ENV: &str = "WHISPERLAUNCH_CONFIG_DIR";

/// File name of the configuration document inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Persisted launcher settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LauncherConfig {
    /// Server binary to launch.
    pub executable_path: PathBuf,
    /// Model file passed with `-m`.
    pub model_path: PathBuf,
    /// Port the server listens on.
    pub port: u16,
    /// Start the server as soon as the launcher opens.
    pub auto_start: bool,
}

impl LauncherConfig {
    /// Defaults relative to `base_dir` (normally the working directory).
    pub fn defaults_for(base_dir: &Path) -> Self {
        Self {
            executable_path: default_executable_path(base_dir),
            model_path: default_model_path(base_dir),
            port: DEFAULT_PORT,
            auto_start: false,
        }
    }

    /// Build a config from a parsed document, keeping `defaults` for every
    /// field that is missing or has the wrong shape.
    pub fn from_json(value: &Value, defaults: Self) -> Self {
        let Some(fields) = value.as_object() else {
            warn!("config document is not a JSON object, using defaults");
            return defaults;
        };

        Self {
            executable_path: path_field(fields, "executablePath")
                .unwrap_or(defaults.executable_path),
            model_path: path_field(fields, "modelPath").unwrap_or(defaults.model_path),
            port: fields
                .get("port")
                .and_then(Value::as_u64)
                .and_then(|port| u16::try_from(port).ok())
                .filter(|port| *port != 0)
                .unwrap_or(defaults.port),
            auto_start: fields
                .get("autoStart")
                .and_then(Value::as_bool)
                .unwrap_or(defaults.auto_start),
        }
    }
}

fn path_field(fields: &Map<String, Value>, key: &str) -> Option<PathBuf> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

/// Port for loading and saving the launcher configuration.
pub trait ConfigStore: Send + Sync {
    /// Load the configuration. A missing document yields defaults.
    fn load(&self) -> Result<LauncherConfig, ConfigError>;

    /// Replace the stored configuration with `config`.
    fn save(&self, config: &LauncherConfig) -> Result<(), ConfigError>;
}

/// Directory holding `config.json`.
///
/// `WHISPERLAUNCH_CONFIG_DIR` wins when set and non-empty; otherwise the
/// platform configuration directory is used.
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|dir| !dir.is_empty()) {
        return Ok(PathBuf::from(dir));
    }

    dirs::config_dir()
        .map(|dir| dir.join("whisperlaunch"))
        .ok_or(ConfigError::NoConfigDir)
}

/// Configuration stored as a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    path: PathBuf,
    defaults: LauncherConfig,
}

impl JsonConfigStore {
    pub fn new(path: impl Into<PathBuf>, defaults: LauncherConfig) -> Self {
        Self {
            path: path.into(),
            defaults,
        }
    }

    /// Store at `<default_config_dir>/config.json`.
    pub fn at_default_location(defaults: LauncherConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(default_config_dir()?.join(CONFIG_FILE_NAME), defaults))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub const fn defaults(&self) -> &LauncherConfig {
        &self.defaults
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ConfigStore for JsonConfigStore {
    fn load(&self) -> Result<LauncherConfig, ConfigError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no config file, using defaults");
                return Ok(self.defaults.clone());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        match serde_json::from_str::<Value>(&contents) {
            Ok(value) => Ok(LauncherConfig::from_json(&value, self.defaults.clone())),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "config file is not valid JSON, using defaults"
                );
                Ok(self.defaults.clone())
            }
        }
    }

    fn save(&self, config: &LauncherConfig) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let mut contents = serde_json::to_string_pretty(config)?;
        contents.push('\n');

        // Write a sibling file first so readers never see a half-written document
        let temp_path = self.temp_path();
        let mut file = fs::File::create(&temp_path).map_err(write_err)?;
        file.write_all(contents.as_bytes()).map_err(write_err)?;
        file.sync_all().map_err(write_err)?;
        drop(file);

        fs::rename(&temp_path, &self.path).map_err(write_err)?;
        debug!(path = %self.path.display(), "saved config");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn defaults() -> LauncherConfig {
        LauncherConfig {
            executable_path: PathBuf::from("/opt/whisper/bin/whisper-server"),
            model_path: PathBuf::from("/opt/whisper/models/ggml-large-v3-turbo.bin"),
            port: 8080,
            auto_start: false,
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        let temp = tempdir().unwrap();
        let store = JsonConfigStore::new(temp.path().join("config.json"), defaults());
        assert_eq!(store.load().unwrap(), defaults());
    }

    #[test]
    fn save_then_load_round_trips() {
        let temp = tempdir().unwrap();
        let store = JsonConfigStore::new(temp.path().join("nested/config.json"), defaults());
        let config = LauncherConfig {
            executable_path: PathBuf::from("/srv/bin/server"),
            model_path: PathBuf::from("/srv/models/base.bin"),
            port: 9100,
            auto_start: true,
        };

        store.save(&config).unwrap();
        assert_eq!(store.load().unwrap(), config);
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn saved_document_uses_camel_case_keys() {
        let temp = tempdir().unwrap();
        let store = JsonConfigStore::new(temp.path().join("config.json"), defaults());
        store.save(&defaults()).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\"executablePath\""));
        assert!(raw.contains("\"modelPath\""));
        assert!(raw.contains("\"autoStart\""));
    }

    #[test]
    fn missing_fields_fall_back_individually() {
        let value = serde_json::json!({ "port": 9000 });
        let config = LauncherConfig::from_json(&value, defaults());
        assert_eq!(config.port, 9000);
        assert_eq!(config.executable_path, defaults().executable_path);
        assert!(!config.auto_start);
    }

    #[test]
    fn invalid_fields_fall_back_individually() {
        let value = serde_json::json!({
            "executablePath": 42,
            "modelPath": "/srv/models/small.bin",
            "port": 70000,
            "autoStart": "yes"
        });
        let config = LauncherConfig::from_json(&value, defaults());
        assert_eq!(config.executable_path, defaults().executable_path);
        assert_eq!(config.model_path, PathBuf::from("/srv/models/small.bin"));
        assert_eq!(config.port, 8080);
        assert!(!config.auto_start);
    }

    #[test]
    fn zero_port_and_blank_paths_are_rejected() {
        let value = serde_json::json!({ "port": 0, "modelPath": "  " });
        let config = LauncherConfig::from_json(&value, defaults());
        assert_eq!(config.port, 8080);
        assert_eq!(config.model_path, defaults().model_path);
    }

    #[test]
    fn corrupt_document_yields_defaults() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let store = JsonConfigStore::new(&path, defaults());
        assert_eq!(store.load().unwrap(), defaults());
    }

    #[test]
    fn non_object_document_yields_defaults() {
        let config = LauncherConfig::from_json(&serde_json::json!([1, 2]), defaults());
        assert_eq!(config, defaults());
    }

    #[test]
    fn defaults_for_uses_base_dir() {
        let temp = tempdir().unwrap();
        let config = LauncherConfig::defaults_for(temp.path());
        assert!(config.executable_path.starts_with(temp.path().join("bin")));
        assert!(config.model_path.starts_with(temp.path().join("models")));
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(!config.auto_start);
    }
}
