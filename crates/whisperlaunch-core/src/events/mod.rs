//! Events emitted by the supervisor for presentation layers.

mod server;

pub use server::ServerEvent;
