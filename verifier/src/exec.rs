//! External command execution with a bounded wait.
//!
//! Commands run with piped output. If a command has not exited when the
//! timeout elapses it is killed and reported as timed out.

use std::process::{Command, Output, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Errors arising while running an external command.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// The command could not be started or its output collected.
    #[error("failed to run {cmd}: {source}")]
    Io {
        /// The program that was invoked.
        cmd: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The command did not exit in time and was killed.
    #[error("{cmd} timed out after {secs} seconds")]
    TimedOut {
        /// The program that was invoked.
        cmd: String,
        /// The timeout that elapsed.
        secs: u64,
    },
}

/// Abstraction for running external commands.
pub trait CommandExecutor {
    /// Runs a command with arguments and returns the captured output.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError`] if the command cannot be spawned or does not
    /// finish in time. A non-zero exit is reported through the output.
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output, ExecError>;
}

/// Executes commands on the host system.
///
/// # Examples
///
/// ```no_run
/// use sixer::exec::{CommandExecutor, SystemCommandExecutor};
/// use std::time::Duration;
///
/// let executor = SystemCommandExecutor::new(Duration::from_secs(10));
/// let output = executor.run("gpg", &["--version"])?;
/// assert!(output.status.success());
/// # Ok::<(), sixer::exec::ExecError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SystemCommandExecutor {
    timeout: Duration,
}

impl SystemCommandExecutor {
    /// Create an executor that kills commands running longer than `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output, ExecError> {
        let io_err = |source| ExecError::Io {
            cmd: cmd.to_owned(),
            source,
        };

        let mut child = Command::new(cmd)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(io_err)?;

        match child.wait_timeout(self.timeout).map_err(io_err)? {
            Some(status) => {
                let stdout = child
                    .stdout
                    .take()
                    .map(std::io::read_to_string)
                    .transpose()
                    .map_err(io_err)?
                    .unwrap_or_default();
                let stderr = child
                    .stderr
                    .take()
                    .map(std::io::read_to_string)
                    .transpose()
                    .map_err(io_err)?
                    .unwrap_or_default();

                Ok(Output {
                    status,
                    stdout: stdout.into_bytes(),
                    stderr: stderr.into_bytes(),
                })
            }
            None => {
                if child.kill().is_err() {
                    // The child may already have exited.
                }
                if child.wait().is_err() {
                    // Nothing left to reap.
                }
                Err(ExecError::TimedOut {
                    cmd: cmd.to_owned(),
                    secs: self.timeout.as_secs(),
                })
            }
        }
    }
}
