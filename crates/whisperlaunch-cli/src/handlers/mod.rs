//! Command handlers.
//!
//! Handlers follow the pattern:
//! - Signature: `pub fn execute(ctx: &CliContext, ...) -> Result<()>`, async when they
//!   talk to the network or a child
//! - Library errors are converted to `CliError` before they leave the handler
//! - Output goes to the terminal; nothing here owns long-lived state

pub mod check;
pub mod config;
pub mod paths;
pub mod run;
