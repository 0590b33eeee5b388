//! Domain types for the supervised transcription server.

mod launch;
mod state;

pub use launch::{DEFAULT_PORT, INFERENCE_PATH, LOCAL_HOST, LaunchSpec};
pub use state::ServerState;
