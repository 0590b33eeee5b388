//! Config command handler.

use std::path::PathBuf;

use anyhow::Result;
use whisperlaunch_core::{ConfigStore, LauncherConfig};

use crate::bootstrap::CliContext;
use crate::config_commands::ConfigCommand;
use crate::error::CliError;

/// Execute the config command.
pub fn execute(ctx: &CliContext, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show { json } => show(ctx, json),
        ConfigCommand::Set {
            executable,
            model,
            port,
            auto_start,
        } => {
            let update = ConfigUpdate {
                executable: executable.map(|path| ctx.absolute(&path)),
                model: model.map(|path| ctx.absolute(&path)),
                port,
                auto_start,
            };
            set(ctx, &update)
        }
        ConfigCommand::Reset => {
            ctx.store.save(ctx.store.defaults()).map_err(CliError::from)?;
            println!("✓ Configuration reset to defaults.");
            Ok(())
        }
    }
}

fn show(ctx: &CliContext, json: bool) -> Result<()> {
    let config = ctx.load_config()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("config_file     = {}", ctx.store.path().display());
    println!("executable_path = {}", config.executable_path.display());
    println!("model_path      = {}", config.model_path.display());
    println!("port            = {}", config.port);
    println!("auto_start      = {}", config.auto_start);
    Ok(())
}

/// Fields to change; `None` keeps the saved value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigUpdate {
    pub executable: Option<PathBuf>,
    pub model: Option<PathBuf>,
    pub port: Option<u16>,
    pub auto_start: Option<bool>,
}

impl ConfigUpdate {
    pub const fn is_empty(&self) -> bool {
        self.executable.is_none()
            && self.model.is_none()
            && self.port.is_none()
            && self.auto_start.is_none()
    }

    pub fn apply(&self, config: LauncherConfig) -> LauncherConfig {
        LauncherConfig {
            executable_path: self.executable.clone().unwrap_or(config.executable_path),
            model_path: self.model.clone().unwrap_or(config.model_path),
            port: self.port.unwrap_or(config.port),
            auto_start: self.auto_start.unwrap_or(config.auto_start),
        }
    }
}

fn set(ctx: &CliContext, update: &ConfigUpdate) -> Result<()> {
    if update.is_empty() {
        return Err(CliError::Arguments(
            "nothing to change; pass at least one of --exe, --model, --port, --auto-start"
                .to_string(),
        )
        .into());
    }

    let config = update.apply(ctx.store.load().map_err(CliError::from)?);
    ctx.store.save(&config).map_err(CliError::from)?;
    println!("✓ Saved {}", ctx.store.path().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::bootstrap_at;
    use tempfile::tempdir;

    #[test]
    fn set_changes_only_given_fields() {
        let temp = tempdir().unwrap();
        let ctx = bootstrap_at(temp.path().to_path_buf(), Some("config.json".into())).unwrap();

        let update = ConfigUpdate {
            port: Some(9100),
            auto_start: Some(true),
            ..ConfigUpdate::default()
        };
        set(&ctx, &update).unwrap();

        let saved = ctx.store.load().unwrap();
        assert_eq!(saved.port, 9100);
        assert!(saved.auto_start);
        assert_eq!(saved.model_path, ctx.store.defaults().model_path);
    }

    #[test]
    fn empty_update_is_rejected() {
        let temp = tempdir().unwrap();
        let ctx = bootstrap_at(temp.path().to_path_buf(), Some("config.json".into())).unwrap();

        let err = set(&ctx, &ConfigUpdate::default()).unwrap_err();
        assert_eq!(err.downcast_ref::<CliError>().unwrap().exit_code(), 2);
        assert!(!ctx.store.path().exists());
    }

    #[test]
    fn reset_writes_defaults() {
        let temp = tempdir().unwrap();
        let ctx = bootstrap_at(temp.path().to_path_buf(), Some("config.json".into())).unwrap();
        set(
            &ctx,
            &ConfigUpdate {
                port: Some(9200),
                ..ConfigUpdate::default()
            },
        )
        .unwrap();

        execute(&ctx, ConfigCommand::Reset).unwrap();
        assert_eq!(&ctx.store.load().unwrap(), ctx.store.defaults());
    }
}
