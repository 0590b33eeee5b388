//! CLI bootstrap - the composition root.
//!
//! Resolves where configuration lives and how relative paths are anchored,
//! then hands handlers a `CliContext`. The supervisor itself is built by
//! the `run` handler since only that command spawns anything.

use std::path::{Path, PathBuf};

use whisperlaunch_core::{ConfigStore, JsonConfigStore, LauncherConfig};

use crate::commands::LaunchOverrides;
use crate::error::CliError;

/// Composed context for CLI commands.
#[derive(Debug, Clone)]
pub struct CliContext {
    /// Directory relative paths and defaults are anchored to.
    pub base_dir: PathBuf,
    /// Persistent launcher configuration.
    pub store: JsonConfigStore,
}

impl CliContext {
    /// Load the saved configuration with all paths made absolute.
    pub fn load_config(&self) -> Result<LauncherConfig, CliError> {
        let config = self.store.load()?;
        Ok(self.absolutize(config))
    }

    /// Saved configuration with `overrides` applied on top.
    pub fn effective_config(
        &self,
        overrides: &LaunchOverrides,
    ) -> Result<LauncherConfig, CliError> {
        let mut config = self.load_config()?;
        if let Some(executable) = &overrides.executable {
            config.executable_path = self.absolute(executable);
        }
        if let Some(model) = &overrides.model {
            config.model_path = self.absolute(model);
        }
        if let Some(port) = overrides.port {
            config.port = port;
        }
        Ok(config)
    }

    /// Anchor a user-supplied path at `base_dir`.
    pub fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    fn absolutize(&self, config: LauncherConfig) -> LauncherConfig {
        LauncherConfig {
            executable_path: self.absolute(&config.executable_path),
            model_path: self.absolute(&config.model_path),
            ..config
        }
    }
}

/// Build the CLI context.
///
/// `config_file` overrides the configuration location; otherwise the
/// platform default (or `WHISPERLAUNCH_CONFIG_DIR`) is used.
pub fn bootstrap(config_file: Option<PathBuf>) -> Result<CliContext, CliError> {
    let base_dir = std::env::current_dir()?;
    bootstrap_at(base_dir, config_file)
}

/// Build the CLI context anchored at `base_dir`.
pub fn bootstrap_at(
    base_dir: PathBuf,
    config_file: Option<PathBuf>,
) -> Result<CliContext, CliError> {
    let defaults = LauncherConfig::defaults_for(&base_dir);
    let store = match config_file {
        Some(path) => {
            let path = if path.is_absolute() {
                path
            } else {
                base_dir.join(path)
            };
            JsonConfigStore::new(path, defaults)
        }
        None => JsonConfigStore::at_default_location(defaults)?,
    };

    tracing::debug!(
        base_dir = %base_dir.display(),
        config = %store.path().display(),
        "bootstrapped CLI context"
    );
    Ok(CliContext { base_dir, store })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn relative_config_file_is_anchored_at_base_dir() {
        let temp = tempdir().unwrap();
        let ctx = bootstrap_at(temp.path().to_path_buf(), Some("conf/wl.json".into())).unwrap();
        assert_eq!(ctx.store.path(), temp.path().join("conf/wl.json"));
    }

    #[test]
    fn overrides_replace_saved_values() {
        let temp = tempdir().unwrap();
        let ctx = bootstrap_at(temp.path().to_path_buf(), Some("config.json".into())).unwrap();

        let overrides = LaunchOverrides {
            executable: None,
            model: Some(PathBuf::from("models/small.bin")),
            port: Some(9001),
        };
        let config = ctx.effective_config(&overrides).unwrap();

        assert_eq!(config.model_path, temp.path().join("models/small.bin"));
        assert_eq!(config.port, 9001);
        assert!(config.executable_path.starts_with(temp.path()));
    }

    #[cfg(unix)]
    #[test]
    fn saved_relative_paths_are_made_absolute() {
        let temp = tempdir().unwrap();
        let ctx = bootstrap_at(temp.path().to_path_buf(), Some("config.json".into())).unwrap();
        std::fs::write(
            temp.path().join("config.json"),
            r#"{"executablePath": "bin/server", "modelPath": "/srv/m.bin"}"#,
        )
        .unwrap();

        let config = ctx.load_config().unwrap();
        assert_eq!(config.executable_path, temp.path().join("bin/server"));
        assert_eq!(config.model_path, PathBuf::from("/srv/m.bin"));
    }
}
