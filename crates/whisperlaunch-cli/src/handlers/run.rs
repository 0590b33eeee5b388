//! Run command handler.
//!
//! Starts whisper-server under a `ProcessSupervisor`, relays its output and
//! lifecycle events to the terminal, and translates Ctrl+C into stop (first
//! press) and kill (second press).

use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};
use whisperlaunch_core::{ConfigStore, LaunchSpec, LauncherConfig, ServerEvent, ServerState};
use whisperlaunch_runtime::{
    HttpHealthProbe, ProcessSupervisor, ServerLogEntry, ServerLogManager, SupervisorError,
    SupervisorOptions,
};

use crate::bootstrap::CliContext;
use crate::commands::RunArgs;
use crate::error::CliError;
use crate::presentation::{event_json, event_message, log_json, log_line};

/// Execute the run command.
///
/// Returns once the server has exited. A server that exits without being
/// asked to (or never becomes ready) is reported as an error so the exit
/// status of `whisperlaunch` reflects it.
pub async fn execute(ctx: &CliContext, args: RunArgs) -> Result<()> {
    let config = ctx.effective_config(&args.overrides)?;
    let spec = LaunchSpec::prepare(&config.executable_path, &config.model_path, config.port)
        .map_err(CliError::from)?;

    let probe = HttpHealthProbe::with_default_timeout()
        .map_err(|e| CliError::Process(format!("failed to create HTTP client: {e}")))?;
    let logs = Arc::new(ServerLogManager::new());
    let options = supervisor_options(args.startup_timeout);
    let supervisor = ProcessSupervisor::new(Arc::new(probe), logs.clone(), options);

    let renderer = Renderer {
        json: args.json_events,
    };
    let mut log_rx = logs.subscribe();
    let mut event_rx = supervisor.subscribe();

    supervisor.start(&spec).map_err(CliError::from)?;

    if !args.no_save {
        remember(ctx, &config);
    }

    let outcome = supervise(&supervisor, &mut log_rx, &mut event_rx, renderer).await;

    // Anything still buffered was produced before the exit was published
    while let Ok(entry) = log_rx.try_recv() {
        renderer.log(&entry);
    }
    while let Ok(event) = event_rx.try_recv() {
        renderer.event(&event);
    }

    let result = outcome.into_result();
    // With stdout redirected, the reason for a failure is otherwise only in the file
    if result.is_err() && !std::io::stdout().is_terminal() {
        for line in failure_context(&logs) {
            eprintln!("{line}");
        }
    }
    result
}

/// Lines of server output repeated on stderr when a run fails.
pub const FAILURE_CONTEXT_LINES: usize = 20;

/// The last [`FAILURE_CONTEXT_LINES`] output lines, rendered for the terminal.
pub fn failure_context(logs: &ServerLogManager) -> Vec<String> {
    logs.tail(FAILURE_CONTEXT_LINES).iter().map(log_line).collect()
}

/// Options for the supervisor, with `startup_timeout` converted to a number
/// of health check attempts.
pub fn supervisor_options(startup_timeout_secs: Option<u32>) -> SupervisorOptions {
    let defaults = SupervisorOptions::default();
    SupervisorOptions {
        max_startup_attempts: startup_timeout_secs.map(|secs| {
            startup_attempts(Duration::from_secs(u64::from(secs)), defaults.poll_interval)
        }),
        ..defaults
    }
}

fn startup_attempts(timeout: Duration, poll_interval: Duration) -> u32 {
    let interval = poll_interval.as_millis().max(1);
    let attempts = timeout.as_millis().div_ceil(interval).max(1);
    u32::try_from(attempts).unwrap_or(u32::MAX)
}

fn remember(ctx: &CliContext, config: &LauncherConfig) {
    let saved = ctx.store.load().map(|saved| LauncherConfig {
        auto_start: saved.auto_start,
        ..config.clone()
    });
    match saved.and_then(|merged| ctx.store.save(&merged)) {
        Ok(()) => debug!(path = %ctx.store.path().display(), "saved launch settings"),
        Err(e) => warn!(error = %e, "could not save launch settings"),
    }
}

/// How the supervised run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub final_state: ServerState,
    pub stop_requested: bool,
    pub timed_out_after: Option<u32>,
}

impl RunOutcome {
    pub fn into_result(self) -> Result<()> {
        if self.stop_requested {
            return Ok(());
        }
        if let Some(attempts) = self.timed_out_after {
            return Err(CliError::StartupTimedOut { attempts }.into());
        }
        match self.final_state {
            ServerState::Exited { code: Some(0) } | ServerState::Stopped => Ok(()),
            state => Err(CliError::ServerExited {
                code: state.exit_code(),
            }
            .into()),
        }
    }
}

/// Ctrl+C listener that lives for the whole run, so a press that arrives
/// while output is being rendered is queued instead of lost.
struct Interrupts {
    #[cfg(unix)]
    signal: tokio::signal::unix::Signal,
    #[cfg(windows)]
    signal: tokio::signal::windows::CtrlC,
}

impl Interrupts {
    fn listen() -> std::io::Result<Self> {
        #[cfg(unix)]
        let signal = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;
        #[cfg(windows)]
        let signal = tokio::signal::windows::ctrl_c()?;
        Ok(Self { signal })
    }

    /// `None` once the signal driver is gone.
    async fn recv(&mut self) -> Option<()> {
        self.signal.recv().await
    }
}

#[derive(Debug, Clone, Copy)]
struct Renderer {
    json: bool,
}

impl Renderer {
    fn log(self, entry: &ServerLogEntry) {
        if self.json {
            println!("{}", log_json(entry));
        } else {
            println!("{}", log_line(entry));
        }
    }

    fn event(self, event: &ServerEvent) {
        if self.json {
            println!("{}", event_json(event));
        } else {
            println!("{}", event_message(event));
        }
    }
}

async fn supervise(
    supervisor: &ProcessSupervisor,
    log_rx: &mut broadcast::Receiver<ServerLogEntry>,
    event_rx: &mut broadcast::Receiver<ServerEvent>,
    renderer: Renderer,
) -> RunOutcome {
    let mut stop_requested = false;
    let mut timed_out_after = None;
    let mut logs_open = true;
    let mut events_open = true;

    let mut interrupts = Interrupts::listen()
        .inspect_err(|e| warn!(error = %e, "cannot listen for Ctrl+C"))
        .ok();
    let mut interrupts_open = interrupts.is_some();

    let stopped = supervisor.wait_until_stopped();
    tokio::pin!(stopped);

    let final_state = loop {
        tokio::select! {
            state = &mut stopped => break state,
            entry = log_rx.recv(), if logs_open => match entry {
                Ok(entry) => renderer.log(&entry),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "terminal fell behind server output");
                }
                Err(RecvError::Closed) => logs_open = false,
            },
            event = event_rx.recv(), if events_open => match event {
                Ok(event) => {
                    if let ServerEvent::StartupTimedOut { attempts, .. } = event {
                        timed_out_after = Some(attempts);
                    }
                    renderer.event(&event);
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "missed server events"),
                Err(RecvError::Closed) => events_open = false,
            },
            signal = next_interrupt(&mut interrupts), if interrupts_open => match signal {
                Some(()) => interrupt(supervisor, &mut stop_requested),
                None => interrupts_open = false,
            },
        }
    };

    RunOutcome {
        final_state,
        stop_requested,
        timed_out_after,
    }
}

async fn next_interrupt(interrupts: &mut Option<Interrupts>) -> Option<()> {
    match interrupts {
        Some(interrupts) => interrupts.recv().await,
        None => None,
    }
}

fn interrupt(supervisor: &ProcessSupervisor, stop_requested: &mut bool) {
    let result = if *stop_requested {
        eprintln!("Killing server...");
        supervisor.kill()
    } else {
        *stop_requested = true;
        eprintln!("Press Ctrl+C again to kill the server immediately.");
        supervisor.stop()
    };

    match result {
        Ok(()) => {}
        // Lost the race with the exit; the stopped branch picks it up
        Err(SupervisorError::NotRunning { state }) => debug!(%state, "nothing to interrupt"),
        Err(e) => warn!(error = %e, "failed to interrupt server"),
    }
}
