//! Path utilities for launching the transcription server.
//!
//! - `resolver` turns an executable/model pair into the `-m` argument the
//!   server is started with, rejecting arguments the server cannot open
//! - `discovery` provides the default executable and model locations
//!
//! Everything here is lexical; no function touches the filesystem except
//! the existence probes in `discovery`.

mod discovery;
mod error;
mod resolver;

pub use discovery::{
    DEFAULT_MODEL_FILE, SERVER_EXECUTABLE_CANDIDATES, default_executable_path,
    default_model_path,
};
pub use error::PathError;
pub use resolver::{ResolvedModelArg, relative_path, resolve_model_arg, same_root};
