//! Command handler tests against temporary install layouts.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use clap::Parser;
use tempfile::TempDir;
use whisperlaunch_cli::handlers;
use whisperlaunch_cli::{
    Cli, CliContext, CliError, Commands, LaunchOverrides, RunArgs, bootstrap_at,
};
use whisperlaunch_core::ConfigStore;

/// Tests that exec a freshly written script run one at a time (ETXTBSY).
static SPAWN_SERIAL: LazyLock<tokio::sync::Mutex<()>> =
    LazyLock::new(|| tokio::sync::Mutex::new(()));

fn context(root: &Path) -> CliContext {
    bootstrap_at(root.to_path_buf(), Some("config.json".into())).unwrap()
}

fn install(body: &str) -> TempDir {
    let root = tempfile::tempdir().unwrap();
    fs::create_dir_all(root.path().join("bin")).unwrap();
    fs::create_dir_all(root.path().join("models")).unwrap();
    fs::write(root.path().join("models/ggml-large-v3-turbo.bin"), b"ggml").unwrap();

    let exe = root.path().join("bin/whisper-server");
    fs::write(&exe, format!("#!/bin/sh\n{body}\n")).unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&exe, fs::Permissions::from_mode(0o755)).unwrap();
    }
    root
}

fn cli_error(err: &anyhow::Error) -> &CliError {
    err.downcast_ref::<CliError>()
        .unwrap_or_else(|| panic!("not a CliError: {err:#}"))
}

#[tokio::test]
async fn check_reports_missing_model() {
    let root = install("exit 0");
    fs::remove_file(root.path().join("models/ggml-large-v3-turbo.bin")).unwrap();
    let ctx = context(root.path());

    let err = handlers::check::execute(&ctx, &LaunchOverrides::default())
        .await
        .unwrap_err();
    assert_eq!(cli_error(&err).exit_code(), 66);
}

#[tokio::test]
async fn check_rejects_non_ascii_model_path() {
    let root = install("exit 0");
    let ctx = context(root.path());
    let overrides = LaunchOverrides {
        model: Some("models/いろは.bin".into()),
        ..LaunchOverrides::default()
    };

    let err = handlers::check::execute(&ctx, &overrides).await.unwrap_err();
    assert!(matches!(cli_error(&err), CliError::UnsupportedPath(_)));
}

#[cfg(unix)]
#[tokio::test]
async fn check_accepts_default_layout() {
    let root = install("exit 0");
    let ctx = context(root.path());
    let overrides = LaunchOverrides {
        port: Some(18931),
        ..LaunchOverrides::default()
    };

    handlers::check::execute(&ctx, &overrides).await.unwrap();
}

#[cfg(unix)]
#[tokio::test]
async fn run_reports_unexpected_exit_code_and_saves_settings() {
    let _serial = SPAWN_SERIAL.lock().await;
    let root = install("echo starting\nexit 3");
    let ctx = context(root.path());
    let args = RunArgs {
        overrides: LaunchOverrides {
            port: Some(18932),
            ..LaunchOverrides::default()
        },
        ..RunArgs::default()
    };

    let err = handlers::run::execute(&ctx, args).await.unwrap_err();
    assert!(matches!(
        cli_error(&err),
        CliError::ServerExited { code: Some(3) }
    ));
    assert_eq!(cli_error(&err).exit_code(), 3);

    let saved = ctx.store.load().unwrap();
    assert_eq!(saved.port, 18932);
    assert_eq!(saved.executable_path, root.path().join("bin/whisper-server"));
}

#[cfg(unix)]
#[tokio::test]
async fn run_with_no_save_leaves_config_untouched() {
    let _serial = SPAWN_SERIAL.lock().await;
    let root = install("exit 0");
    let ctx = context(root.path());
    let args = RunArgs {
        no_save: true,
        ..RunArgs::default()
    };

    handlers::run::execute(&ctx, args).await.unwrap();
    assert!(!ctx.store.path().exists());
}

#[test]
fn config_set_then_show_round_trips() {
    let root = install("exit 0");
    let config_path = root.path().join("config.json");
    let config_arg = config_path.to_string_lossy().into_owned();
    let cli = Cli::parse_from([
        "whisperlaunch",
        "--config",
        config_arg.as_str(),
        "config",
        "set",
        "--port",
        "9300",
        "--auto-start",
        "true",
    ]);
    let ctx = bootstrap_at(root.path().to_path_buf(), cli.config).unwrap();
    let Some(Commands::Config { command }) = cli.command else {
        panic!("expected config command");
    };

    handlers::config::execute(&ctx, command).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&config_path).unwrap()).unwrap();
    assert_eq!(raw["port"], 9300);
    assert_eq!(raw["autoStart"], true);
}
