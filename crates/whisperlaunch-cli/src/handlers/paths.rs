//! Paths command handler.
//!
//! Displays every path the launcher resolves, for diagnosing "file not
//! found" reports.

use anyhow::Result;
use whisperlaunch_core::config::CONFIG_DIR_ENV;
use whisperlaunch_core::paths::{
    SERVER_EXECUTABLE_CANDIDATES, default_executable_path, default_model_path,
};

use crate::bootstrap::CliContext;

/// Execute the paths command.
pub fn execute(ctx: &CliContext) -> Result<()> {
    print!("{}", render(ctx));
    Ok(())
}

/// `key = value` lines, one per resolved path.
pub fn render(ctx: &CliContext) -> String {
    let config_dir_override = std::env::var_os(CONFIG_DIR_ENV)
        .filter(|dir| !dir.is_empty())
        .map_or_else(
            || "(not set)".to_string(),
            |dir| dir.to_string_lossy().into_owned(),
        );

    let lines = [
        ("config_file", ctx.store.path().display().to_string()),
        ("config_dir_override", config_dir_override),
        ("working_dir", ctx.base_dir.display().to_string()),
        (
            "default_executable",
            default_executable_path(&ctx.base_dir).display().to_string(),
        ),
        ("executable_candidates", SERVER_EXECUTABLE_CANDIDATES.join(", ")),
        (
            "default_model",
            default_model_path(&ctx.base_dir).display().to_string(),
        ),
    ];

    lines
        .iter()
        .map(|(key, value)| format!("{key} = {value}\n"))
        .collect()
}
