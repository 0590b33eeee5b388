//! Launch description for one server start attempt.

use std::path::{Path, PathBuf};

use crate::paths::{PathError, resolve_model_arg};

/// Interface the server binds to. Only local clients are served.
pub const LOCAL_HOST: &str = "127.0.0.1";

/// Route the server exposes transcription on, matching the OpenAI API layout.
pub const INFERENCE_PATH: &str = "/v1/audio/transcriptions";

/// Port used when none is configured.
pub const DEFAULT_PORT: u16 = 8080;

/// Everything needed to spawn the server once.
///
/// Built by [`LaunchSpec::prepare`], which runs path resolution, so a
/// `LaunchSpec` always carries an ASCII-only model argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    executable: PathBuf,
    model_path: PathBuf,
    model_arg: String,
    working_dir: PathBuf,
    port: u16,
}

impl LaunchSpec {
    /// Resolve the model argument and capture the launch parameters.
    pub fn prepare(
        executable: impl Into<PathBuf>,
        model_path: impl Into<PathBuf>,
        port: u16,
    ) -> Result<Self, PathError> {
        let executable = executable.into();
        let model_path = model_path.into();
        let resolved = resolve_model_arg(&executable, &model_path)?;

        Ok(Self {
            executable,
            model_path,
            model_arg: resolved.model_arg,
            working_dir: resolved.working_dir,
            port,
        })
    }

    /// Absolute path of the server binary.
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Absolute path of the model file as configured.
    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Model path as passed to the server.
    pub fn model_arg(&self) -> &str {
        &self.model_arg
    }

    /// Directory the server runs in.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Argument vector, excluding the executable itself.
    pub fn args(&self) -> Vec<String> {
        vec![
            "-m".to_string(),
            self.model_arg.clone(),
            "--port".to_string(),
            self.port.to_string(),
            "--host".to_string(),
            LOCAL_HOST.to_string(),
            "--inference-path".to_string(),
            INFERENCE_PATH.to_string(),
        ]
    }

    /// Printable command line for logs.
    pub fn command_line(&self) -> String {
        let mut parts = vec![self.executable.display().to_string()];
        parts.extend(self.args());
        parts.join(" ")
    }

    /// URL polled to decide whether the server is up.
    pub fn health_url(&self) -> String {
        format!("http://{LOCAL_HOST}:{}/", self.port)
    }

    /// Base URL to configure in OpenAI-compatible clients.
    ///
    /// Clients append `/audio/transcriptions` themselves, so the full
    /// inference path is not shown.
    pub fn endpoint_url(&self) -> String {
        format!("http://{LOCAL_HOST}:{}/v1", self.port)
    }
}
