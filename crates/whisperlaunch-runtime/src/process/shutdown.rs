//! Graceful terminate for the server child.
//!
//! Only the first phase of a shutdown lives here. Waiting and escalation to
//! a forced kill are driven by the supervisor's control task, which owns the
//! `Child`.

use std::io;

use tokio::process::Child;

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// Ask the child to exit.
///
/// - Unix: sends SIGTERM so the server can close its listener
/// - Windows: no SIGTERM equivalent, terminates immediately
///
/// A child that has already exited is not an error.
pub fn request_terminate(child: &mut Child) -> io::Result<()> {
    #[cfg(unix)]
    {
        terminate_unix(child)
    }

    #[cfg(not(unix))]
    {
        child.start_kill()
    }
}

#[cfg(unix)]
fn terminate_unix(child: &Child) -> io::Result<()> {
    // No PID means the child was already reaped
    let Some(pid) = child.id() else {
        return Ok(());
    };
    let pid = i32::try_from(pid)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "child PID out of range"))?;

    match signal::kill(Pid::from_raw(pid), Signal::SIGTERM) {
        Ok(()) | Err(nix::errno::Errno::ESRCH) => Ok(()),
        Err(e) => Err(io::Error::other(e)),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::process::Command;
    use tokio::time::{sleep, timeout};

    #[tokio::test]
    async fn terminate_ends_sleeping_child() {
        let mut child = Command::new("sleep")
            .arg("30")
            .spawn()
            .expect("failed to spawn sleep");

        request_terminate(&mut child).unwrap();
        let status = timeout(Duration::from_secs(5), child.wait())
            .await
            .expect("child should exit after SIGTERM")
            .unwrap();
        assert_eq!(status.code(), None);
    }

    #[tokio::test]
    async fn terminate_after_exit_is_ok() {
        let mut child = Command::new("echo")
            .arg("test")
            .spawn()
            .expect("failed to spawn echo");

        sleep(Duration::from_millis(100)).await;
        let _ = child.wait().await;

        assert!(request_terminate(&mut child).is_ok());
    }
}
