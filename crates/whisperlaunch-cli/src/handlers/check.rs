//! Check command handler.
//!
//! Runs every pre-launch check `run` would run, without spawning anything.

use std::path::Path;

use anyhow::Result;
use whisperlaunch_core::LaunchSpec;
use whisperlaunch_runtime::{check_http_health, verify_launch_files};

use crate::bootstrap::CliContext;
use crate::commands::LaunchOverrides;
use crate::error::CliError;

/// Execute the check command.
pub async fn execute(ctx: &CliContext, overrides: &LaunchOverrides) -> Result<()> {
    let config = ctx.effective_config(overrides)?;

    println!("Executable: {}", describe_file(&config.executable_path));
    println!("Model:      {}", describe_file(&config.model_path));
    println!("Port:       {}", config.port);

    let spec = LaunchSpec::prepare(&config.executable_path, &config.model_path, config.port)
        .map_err(CliError::from)?;
    println!("Model argument:    {}", spec.model_arg());
    println!("Working directory: {}", spec.working_dir().display());
    println!("Command:           {}", spec.command_line());
    println!("Endpoint:          {}", spec.endpoint_url());

    verify_launch_files(&spec).map_err(CliError::from)?;

    // Something already answering means the new server could not bind
    if check_http_health(config.port).await.unwrap_or(false) {
        println!(
            "⚠️  Something is already answering on port {}; \
             starting another server would fail.",
            config.port
        );
    }

    println!("✓ Ready to launch");
    Ok(())
}

fn describe_file(path: &Path) -> String {
    let status = if path.is_file() { "found" } else { "missing" };
    format!("{} ({status})", path.display())
}
