//! Server output buffering and live streaming.
//!
//! `ServerLogManager` is the default sink for server output: it keeps the
//! most recent lines for late viewers and broadcasts each new line to live
//! subscribers.

use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use whisperlaunch_core::{OutputStream, ServerLogSinkPort};

/// Maximum number of log lines kept in the ring buffer
pub const MAX_LOG_LINES: usize = 5000;

/// Broadcast capacity for live subscribers
const BROADCAST_CAPACITY: usize = 1000;

/// A single output line from the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerLogEntry {
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
    /// Whether the server or the supervisor produced the line
    pub stream: OutputStream,
    /// The line content
    pub line: String,
}

impl ServerLogEntry {
    /// Create a new log entry with current timestamp
    pub fn new(stream: OutputStream, line: String) -> Self {
        Self {
            timestamp: chrono::Utc::now().timestamp_millis(),
            stream,
            line,
        }
    }
}

/// Ring buffer plus broadcast channel for server output
#[derive(Debug)]
pub struct ServerLogManager {
    lines: RwLock<VecDeque<ServerLogEntry>>,
    capacity: usize,
    broadcast_tx: broadcast::Sender<ServerLogEntry>,
}

impl ServerLogManager {
    /// Create a log manager keeping [`MAX_LOG_LINES`] lines
    pub fn new() -> Self {
        Self::with_capacity(MAX_LOG_LINES)
    }

    /// Create a log manager keeping at most `capacity` lines (at least one)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (broadcast_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            lines: RwLock::new(VecDeque::with_capacity(capacity.min(MAX_LOG_LINES))),
            capacity,
            broadcast_tx,
        }
    }

    /// Add a line, removing the oldest if at capacity
    pub fn add_log(&self, stream: OutputStream, line: String) {
        let entry = ServerLogEntry::new(stream, line);

        {
            let mut lines = self.lines.write().unwrap_or_else(PoisonError::into_inner);
            if lines.len() >= self.capacity {
                lines.pop_front();
            }
            lines.push_back(entry.clone());
        }

        // Broadcast to subscribers (ignore if no receivers)
        let _ = self.broadcast_tx.send(entry);
    }

    /// The last `count` buffered lines, oldest first
    pub fn tail(&self, count: usize) -> Vec<ServerLogEntry> {
        let lines = self.lines.read().unwrap_or_else(PoisonError::into_inner);
        let skip = lines.len().saturating_sub(count);
        lines.iter().skip(skip).cloned().collect()
    }

    /// Get a broadcast receiver for new lines
    pub fn subscribe(&self) -> broadcast::Receiver<ServerLogEntry> {
        self.broadcast_tx.subscribe()
    }
}

impl Default for ServerLogManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerLogSinkPort for ServerLogManager {
    fn append(&self, stream: OutputStream, line: String) {
        self.add_log(stream, line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_drops_oldest_at_capacity() {
        let manager = ServerLogManager::with_capacity(2);
        manager.add_log(OutputStream::Server, "a".to_string());
        manager.add_log(OutputStream::Server, "b".to_string());
        manager.add_log(OutputStream::Server, "c".to_string());

        let lines: Vec<String> = manager.tail(10).into_iter().map(|e| e.line).collect();
        assert_eq!(lines, vec!["b", "c"]);
    }

    #[test]
    fn tail_returns_newest_lines_in_order() {
        let manager = ServerLogManager::new();
        for i in 0..10 {
            manager.add_log(OutputStream::Server, format!("line {i}"));
        }

        let tail: Vec<String> = manager.tail(3).into_iter().map(|e| e.line).collect();
        assert_eq!(tail, vec!["line 7", "line 8", "line 9"]);
        assert_eq!(manager.tail(50).len(), 10);
    }

    #[tokio::test]
    async fn subscribers_see_appended_lines() {
        let manager = ServerLogManager::new();
        let mut rx = manager.subscribe();

        manager.append(OutputStream::System, "launching".to_string());

        let entry = rx.recv().await.unwrap();
        assert_eq!(entry.stream, OutputStream::System);
        assert_eq!(entry.line, "launching");
    }
}
