//! Lifecycle owner for a single whisper-server child.
//!
//! The supervisor holds the state machine
//! `Stopped -> Starting -> Running -> (Stopping) -> Exited(code)` and is the
//! only thing allowed to touch the child. Each spawned child gets one control
//! task that owns the `Child` handle and multiplexes:
//!
//! - output lines from the combined stdout/stderr pipe
//! - the liveness poll result
//! - stop/kill commands from the supervisor
//! - the child's exit
//!
//! State changes are written under one mutex, so exit, readiness and user
//! commands are applied in a single order no matter which task observed
//! them first. The control task finishes every helper task before
//! publishing the exit.

use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use whisperlaunch_core::{
    HealthProbe, LaunchSpec, OutputStream, ServerEvent, ServerLogSinkPort, ServerState,
};

use super::broadcaster::ServerEventBroadcaster;
use super::error::{FileKind, SupervisorError};
use super::shutdown::request_terminate;
use super::stream::{OutputLine, output_pipe, spawn_pipe_reader};
use crate::health_monitor::{DEFAULT_POLL_INTERVAL, LivenessMonitor, LivenessOutcome};

/// Tuning knobs for the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorOptions {
    /// Delay between liveness probes while starting.
    pub poll_interval: Duration,
    /// Give up (and kill the child) after this many failed probes.
    /// `None` polls until the server answers or exits.
    pub max_startup_attempts: Option<u32>,
    /// How long a stopped child may take to exit before it is killed.
    pub stop_grace_period: Duration,
    /// How long to keep reading output after the child exited.
    pub output_drain_timeout: Duration,
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_startup_attempts: None,
            stop_grace_period: Duration::from_secs(5),
            output_drain_timeout: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum ControlCommand {
    Terminate,
    Kill,
}

/// The child currently owned by the supervisor.
struct ActiveProcess {
    generation: u64,
    pid: Option<u32>,
    port: u16,
    endpoint: String,
    commands: mpsc::UnboundedSender<ControlCommand>,
    task: Option<JoinHandle<()>>,
}

struct Shared {
    state: watch::Sender<ServerState>,
    active: Mutex<Option<ActiveProcess>>,
    generations: AtomicU64,
    events: ServerEventBroadcaster,
    sink: Arc<dyn ServerLogSinkPort>,
    probe: Arc<dyn HealthProbe>,
    options: SupervisorOptions,
}

impl Shared {
    fn lock_active(&self) -> MutexGuard<'_, Option<ActiveProcess>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_state(&self) -> ServerState {
        *self.state.borrow()
    }

    fn set_state(&self, state: ServerState) {
        let previous = self.state.send_replace(state);
        debug!(from = ?previous, to = ?state, "server state changed");
    }

    /// Liveness succeeded for `generation`. Only promotes `Starting`.
    fn mark_running(&self, generation: u64, attempts: u32) {
        let active = self.lock_active();
        let Some(process) = active.as_ref().filter(|p| p.generation == generation) else {
            debug!(generation, "ignoring readiness of a process that is gone");
            return;
        };

        let state = self.current_state();
        if state != ServerState::Starting {
            debug!(generation, ?state, "ignoring readiness outside of starting");
            return;
        }

        self.set_state(ServerState::Running);
        info!(
            port = process.port,
            endpoint = %process.endpoint,
            attempts,
            "whisper-server is ready"
        );
        self.events.broadcast(ServerEvent::running(
            process.port,
            process.endpoint.clone(),
            attempts,
        ));
    }

    /// The child of `generation` exited. Applied at most once per child.
    fn finish(&self, generation: u64, code: Option<i32>) {
        let mut active = self.lock_active();
        if !active.as_ref().is_some_and(|p| p.generation == generation) {
            debug!(generation, "ignoring exit of a process that is no longer tracked");
            return;
        }

        *active = None;
        self.set_state(ServerState::Exited { code });
        self.events.broadcast(ServerEvent::exited(code));
    }
}

/// Supervisor for one whisper-server process at a time.
///
/// Cloning is cheap and every clone controls the same child.
#[derive(Clone)]
pub struct ProcessSupervisor {
    shared: Arc<Shared>,
}

impl ProcessSupervisor {
    /// Create a supervisor in the `Stopped` state.
    pub fn new(
        probe: Arc<dyn HealthProbe>,
        sink: Arc<dyn ServerLogSinkPort>,
        options: SupervisorOptions,
    ) -> Self {
        let (state, _) = watch::channel(ServerState::Stopped);
        Self {
            shared: Arc::new(Shared {
                state,
                active: Mutex::new(None),
                generations: AtomicU64::new(0),
                events: ServerEventBroadcaster::new(),
                sink,
                probe,
                options,
            }),
        }
    }

    /// Spawn the server described by `spec`.
    ///
    /// Fails without spawning when a child is still owned, or when the
    /// executable or model is missing. Must be called inside a tokio runtime.
    pub fn start(&self, spec: &LaunchSpec) -> Result<(), SupervisorError> {
        let shared = &self.shared;
        let mut active = shared.lock_active();

        let state = shared.current_state();
        if active.is_some() || !state.is_stopped() {
            return Err(SupervisorError::AlreadyRunning { state });
        }

        verify_launch_files(spec)?;

        let spawn_failure = |source: std::io::Error| SupervisorError::SpawnFailure {
            path: spec.executable().to_path_buf(),
            source,
        };

        let (output, stdout, stderr) = output_pipe().map_err(spawn_failure)?;
        let (line_tx, line_rx) = mpsc::unbounded_channel();
        let reader = spawn_pipe_reader(output, line_tx).map_err(spawn_failure)?;

        let mut command = build_command(spec, stdout, stderr);
        let spawned = command.spawn();
        // Close the parent's write ends so the reader sees EOF when the child exits
        drop(command);
        let child = spawned.map_err(spawn_failure)?;

        let pid = child.id();
        let generation = shared.generations.fetch_add(1, Ordering::Relaxed) + 1;
        let command_line = spec.command_line();

        info!(?pid, port = spec.port(), command = %command_line, "whisper-server spawned");
        shared
            .sink
            .append(OutputStream::System, format!("Executing: {command_line}"));
        shared.set_state(ServerState::Starting);
        shared
            .events
            .broadcast(ServerEvent::starting(pid, spec.port(), command_line));

        let (commands, command_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_control_task(
            Arc::clone(shared),
            ControlContext {
                generation,
                child,
                reader,
                line_rx,
                health_url: spec.health_url(),
                command_rx,
            },
        ));

        *active = Some(ActiveProcess {
            generation,
            pid,
            port: spec.port(),
            endpoint: spec.endpoint_url(),
            commands,
            task: Some(task),
        });
        Ok(())
    }

    /// Ask the server to exit. Does not wait.
    ///
    /// Only valid while `Starting` or `Running`. If the child is still alive
    /// after the grace period it is killed.
    pub fn stop(&self) -> Result<(), SupervisorError> {
        let shared = &self.shared;
        let active = shared.lock_active();
        let state = shared.current_state();

        let Some(process) = active.as_ref().filter(|_| state.can_stop()) else {
            return Err(SupervisorError::NotRunning { state });
        };

        // A closed channel means the control task is already publishing the exit
        let _ = process.commands.send(ControlCommand::Terminate);
        shared.set_state(ServerState::Stopping);
        shared.events.broadcast(ServerEvent::stopping(process.pid));
        Ok(())
    }

    /// Kill the server immediately. Does not wait.
    pub fn kill(&self) -> Result<(), SupervisorError> {
        let active = self.shared.lock_active();
        let Some(process) = active.as_ref() else {
            return Err(SupervisorError::NotRunning {
                state: self.shared.current_state(),
            });
        };

        let _ = process.commands.send(ControlCommand::Kill);
        Ok(())
    }

    /// Kill any owned child and wait until its exit has been published.
    ///
    /// Used when the application quits.
    pub async fn shutdown(&self) -> ServerState {
        let pending = {
            let mut active = self.shared.lock_active();
            active.as_mut().map(|process| {
                let _ = process.commands.send(ControlCommand::Kill);
                (process.generation, process.task.take())
            })
        };

        if let Some((generation, Some(task))) = pending {
            if let Err(e) = task.await {
                warn!(error = %e, "control task ended abnormally");
                self.shared.finish(generation, None);
            }
        }

        self.wait_until_stopped().await
    }

    /// Resolve once no child is owned.
    pub async fn wait_until_stopped(&self) -> ServerState {
        let mut rx = self.shared.state.subscribe();
        match rx.wait_for(ServerState::is_stopped).await {
            Ok(state) => *state,
            Err(_) => self.state(),
        }
    }

    /// Current state.
    pub fn state(&self) -> ServerState {
        self.shared.current_state()
    }

    /// Watch state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<ServerState> {
        self.shared.state.subscribe()
    }

    /// Subscribe to lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.shared.events.subscribe()
    }

    /// PID of the owned child, if any.
    pub fn pid(&self) -> Option<u32> {
        self.shared.lock_active().as_ref().and_then(|p| p.pid)
    }

    /// OpenAI-compatible base URL of the owned child, if any.
    pub fn endpoint(&self) -> Option<String> {
        self.shared
            .lock_active()
            .as_ref()
            .map(|p| p.endpoint.clone())
    }

}

/// Check that the executable and model named by `spec` exist.
pub fn verify_launch_files(spec: &LaunchSpec) -> Result<(), SupervisorError> {
    if !spec.executable().is_file() {
        return Err(SupervisorError::MissingFile {
            kind: FileKind::Executable,
            path: spec.executable().to_path_buf(),
        });
    }
    if !spec.model_path().is_file() {
        return Err(SupervisorError::MissingFile {
            kind: FileKind::Model,
            path: spec.model_path().to_path_buf(),
        });
    }
    Ok(())
}

/// `stdout` and `stderr` are both ends of the same pipe.
fn build_command(spec: &LaunchSpec, stdout: Stdio, stderr: Stdio) -> Command {
    let mut cmd = Command::new(spec.executable());
    cmd.args(spec.args())
        .current_dir(spec.working_dir())
        .env("PYTHONUNBUFFERED", "1")
        .stdin(Stdio::null())
        .stdout(stdout)
        .stderr(stderr)
        .kill_on_drop(true);

    #[cfg(windows)]
    {
        const CREATE_NO_WINDOW: u32 = 0x0800_0000;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }

    cmd
}

struct ControlContext {
    generation: u64,
    child: Child,
    reader: JoinHandle<()>,
    line_rx: mpsc::UnboundedReceiver<OutputLine>,
    health_url: String,
    command_rx: mpsc::UnboundedReceiver<ControlCommand>,
}

async fn run_control_task(shared: Arc<Shared>, ctx: ControlContext) {
    let ControlContext {
        generation,
        mut child,
        reader,
        mut line_rx,
        health_url,
        mut command_rx,
    } = ctx;
    let options = shared.options;

    let cancel = CancellationToken::new();
    let monitor = LivenessMonitor::new(options.poll_interval, options.max_startup_attempts);
    let mut liveness = tokio::spawn({
        let probe = Arc::clone(&shared.probe);
        let cancel = cancel.clone();
        async move {
            monitor
                .wait_until_ready(probe.as_ref(), &health_url, &cancel)
                .await
        }
    });

    let mut liveness_pending = true;
    let mut lines_open = true;
    let mut commands_open = true;
    let mut kill_deadline: Option<Instant> = None;

    let status = loop {
        tokio::select! {
            status = child.wait() => break status,
            line = line_rx.recv(), if lines_open => match line {
                Some(OutputLine { stream, line }) => shared.sink.append(stream, line),
                None => lines_open = false,
            },
            command = command_rx.recv(), if commands_open => match command {
                Some(ControlCommand::Terminate) => {
                    debug!(generation, "sending terminate to whisper-server");
                    // Readiness no longer matters once the server is going away
                    cancel.cancel();
                    if let Err(e) = request_terminate(&mut child) {
                        warn!(error = %e, "failed to signal whisper-server");
                    }
                    kill_deadline = Some(Instant::now() + options.stop_grace_period);
                }
                Some(ControlCommand::Kill) => force_kill(&mut child),
                None => commands_open = false,
            },
            result = &mut liveness, if liveness_pending => {
                liveness_pending = false;
                match result {
                    Ok(LivenessOutcome::Ready { attempts }) => {
                        shared.mark_running(generation, attempts);
                    }
                    Ok(LivenessOutcome::TimedOut { attempts }) => {
                        warn!(
                            attempts,
                            "whisper-server never answered health checks, killing it"
                        );
                        shared.events.broadcast(ServerEvent::startup_timed_out(attempts));
                        force_kill(&mut child);
                    }
                    Ok(LivenessOutcome::Cancelled { .. }) => {}
                    Err(e) => warn!(error = %e, "liveness task failed"),
                }
            },
            () = sleep_until(kill_deadline.unwrap_or_else(Instant::now)),
                if kill_deadline.is_some() =>
            {
                let grace_ms =
                    u64::try_from(options.stop_grace_period.as_millis()).unwrap_or(u64::MAX);
                warn!(grace_ms, "whisper-server ignored terminate, killing it");
                kill_deadline = None;
                force_kill(&mut child);
            }
        }
    };

    let code = match status {
        Ok(status) => status.code(),
        Err(e) => {
            warn!(error = %e, "failed to wait for whisper-server");
            None
        }
    };

    // Polling must not outlive the process
    cancel.cancel();
    if liveness_pending {
        let _ = liveness.await;
    }

    if lines_open {
        let drain = async {
            while let Some(OutputLine { stream, line }) = line_rx.recv().await {
                shared.sink.append(stream, line);
            }
        };
        if timeout(options.output_drain_timeout, drain).await.is_err() {
            debug!(generation, "output pipe still open after exit, abandoning reader");
        }
    }
    reader.abort();
    // A blocking reader cannot be aborted; it ends at EOF or on its next send
    #[cfg(unix)]
    let _ = reader.await;

    info!(generation, ?code, "whisper-server exited");
    shared.finish(generation, code);
}

fn force_kill(child: &mut Child) {
    if let Err(e) = child.start_kill() {
        debug!(error = %e, "kill failed, process probably already exited");
    }
}
