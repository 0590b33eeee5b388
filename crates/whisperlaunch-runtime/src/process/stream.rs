//! Async output readers (non-UTF8-safe).
//!
//! whisper-server is C++ and prints whatever bytes the platform gives it:
//! file names in the local code page, partial multibyte sequences, and so on.
//! `BufReader::lines()` stops at the first invalid UTF-8 line, so lines are
//! read as bytes and decoded here instead.
//!
//! The child's stdout and stderr share one pipe (see [`output_pipe`]), so a
//! single reader sees every line in the order the child wrote it.

use std::io::{self, PipeReader};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;
use whisperlaunch_core::OutputStream;

/// One decoded line of child output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub stream: OutputStream,
    pub line: String,
}

/// Decode a raw line: UTF-8 when valid, otherwise UTF-8 with every invalid
/// sequence replaced by U+FFFD. Never fails.
pub fn decode_line(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(_) => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Create the pipe shared by the child's stdout and stderr.
///
/// Returns the read end plus one `Stdio` per output stream. Both `Stdio`
/// values must be dropped once the child is spawned, or the reader never
/// reaches EOF.
pub fn output_pipe() -> io::Result<(PipeReader, Stdio, Stdio)> {
    let (reader, writer) = io::pipe()?;
    let stderr = writer.try_clone()?;
    Ok((reader, Stdio::from(writer), Stdio::from(stderr)))
}

/// Relay the read end of [`output_pipe`] to `tx`.
///
/// Must be called inside a tokio runtime.
#[cfg(unix)]
pub fn spawn_pipe_reader(
    pipe: PipeReader,
    tx: mpsc::UnboundedSender<OutputLine>,
) -> io::Result<JoinHandle<()>> {
    use std::os::fd::OwnedFd;
    use tokio::net::unix::pipe::Receiver;

    let receiver = Receiver::from_owned_fd(OwnedFd::from(pipe))?;
    Ok(spawn_stream_reader(receiver, OutputStream::Server, tx))
}

/// Relay the read end of [`output_pipe`] to `tx`.
///
/// Anonymous pipes have no async reader here, so this runs on the blocking
/// pool and ends on EOF or once `tx` is closed.
#[cfg(not(unix))]
pub fn spawn_pipe_reader(
    pipe: PipeReader,
    tx: mpsc::UnboundedSender<OutputLine>,
) -> io::Result<JoinHandle<()>> {
    use std::io::BufRead;

    Ok(tokio::task::spawn_blocking(move || {
        let mut reader = io::BufReader::new(pipe);
        let mut buf: Vec<u8> = Vec::with_capacity(1024);
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    if tx.send(take_line(&mut buf, OutputStream::Server)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    debug!(error = %e, "output reader exiting due to read error");
                    break;
                }
            }
        }
    }))
}

/// Strip the line terminator from `buf` and decode it.
fn take_line(buf: &mut Vec<u8>, stream: OutputStream) -> OutputLine {
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    OutputLine {
        stream,
        line: decode_line(buf),
    }
}

/// Read `stream` line by line and forward each line to `tx`.
///
/// The task ends quietly on EOF, on a read error, or when the receiver is
/// gone. Lines are sent in the order they were read.
pub fn spawn_stream_reader(
    stream: impl AsyncRead + Unpin + Send + 'static,
    stream_type: OutputStream,
    tx: mpsc::UnboundedSender<OutputLine>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf: Vec<u8> = Vec::with_capacity(1024);

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break, // EOF
                Ok(_) => {
                    if tx.send(take_line(&mut buf, stream_type)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    debug!(%stream_type, error = %e, "output reader exiting due to read error");
                    break;
                }
            }
        }

        debug!(%stream_type, "output reader task exiting");
    })
}
