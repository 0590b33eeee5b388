//! CLI entry point - the composition root.

use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;
use whisperlaunch_cli::{Cli, CliError, Commands, RunArgs, bootstrap, handlers};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

/// Log to stderr so server output on stdout stays clean.
///
/// `RUST_LOG` wins; otherwise only warnings are shown, or debug output from
/// whisperlaunch itself with `--verbose`.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "warn,whisperlaunch_core=debug,whisperlaunch_runtime=debug,whisperlaunch_cli=debug"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let ctx = bootstrap(cli.config)?;

    let Some(command) = cli.command else {
        // No command: honour autoStart, otherwise show help
        if ctx.load_config()?.auto_start {
            return handlers::run::execute(&ctx, RunArgs::default()).await;
        }
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Run(args) => handlers::run::execute(&ctx, args).await,
        Commands::Check(overrides) => handlers::check::execute(&ctx, &overrides).await,
        Commands::Config { command } => handlers::config::execute(&ctx, command),
        Commands::Paths => handlers::paths::execute(&ctx),
    }
}
