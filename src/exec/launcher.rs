// src/exec/launcher.rs

//! The launch state machine.
//!
//! `Resolving → Spawning → Redirecting → (Waiting) → terminal state`
//!
//! Everything up to and including redirection either succeeds or ends the
//! launch with a populated `launch_error`. After that the only thing left is
//! the optional bounded wait; output pumps run on their own and their
//! failures are only logged.
//!
//! Output is wired up after the OS has started the child. Output the child
//! writes before that point is still read from the pipe, but a child that
//! exits very quickly may leave less behind than expected if its pumps are
//! cancelled or the sink fills. Capture is best effort, not guaranteed.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use tokio::io::AsyncWriteExt;
use tokio::process::Child;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::config::LaunchConfig;
use crate::errors::{LaunchError, Result};
use crate::exec::command::ResolvedCommand;
use crate::exec::pump::{DEFAULT_CHUNK_SIZE, PumpGroup, StreamPump};
use crate::exec::resolver::{InputSource, resolve_input, resolve_output};
use crate::exec::result::{ExecutionResult, LaunchOutcome};

/// Launches one process per call. Holds no per-launch state.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    chunk_size: usize,
}

impl Default for ProcessLauncher {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Launch with a default [`ProcessLauncher`].
pub async fn launch(config: &LaunchConfig) -> ExecutionResult {
    ProcessLauncher::default().launch(config).await
}

impl ProcessLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read size used by the output pumps.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Run one launch to a terminal state.
    ///
    /// Never panics on a bad config or a failed spawn; those come back in
    /// [`ExecutionResult::launch_error`].
    pub async fn launch(&self, config: &LaunchConfig) -> ExecutionResult {
        let title = config.title().to_string();

        let command = match ResolvedCommand::resolve(config) {
            Ok(command) => command,
            Err(err) => {
                warn!(title = %title, error = %err, "launch rejected before spawn");
                return ExecutionResult::failed(title, None, err);
            }
        };

        info!(title = %title, cmd = %command, "starting process");

        let mut child = match command.to_command(config.input_paths().is_some()).spawn() {
            Ok(child) => child,
            Err(source) => {
                let err = LaunchError::Spawn {
                    program: command.program.display().to_string(),
                    source,
                };
                error!(title = %title, error = %err, "failed to spawn process");
                return ExecutionResult::failed(title, None, err);
            }
        };

        let pid = child.id();
        debug!(title = %title, pid, "process spawned");

        let mut pumps = PumpGroup::new();
        let output_path = match self.redirect(config, &mut child, &mut pumps).await {
            Ok(path) => path,
            Err(err) => {
                error!(
                    title = %title,
                    pid,
                    error = %err,
                    "stream setup failed; killing process"
                );
                if let Err(e) = child.start_kill() {
                    warn!(title = %title, pid, error = %e, "failed to kill process");
                }
                return ExecutionResult::failed(title, pid, err).with_pumps(pumps);
            }
        };

        let Some(deadline) = config.wait_deadline() else {
            debug!(title = %title, pid, "not waiting for process exit");
            return ExecutionResult::launched(
                title,
                pid,
                LaunchOutcome::Detached,
                None,
                output_path,
                pumps,
            );
        };

        let (outcome, exit_code) = match timeout(deadline, child.wait()).await {
            Ok(Ok(status)) => {
                let code = exit_code_of(status);
                info!(
                    title = %title,
                    pid,
                    exit_code = code,
                    success = status.success(),
                    "process exited"
                );
                (LaunchOutcome::Exited, Some(code))
            }
            Ok(Err(e)) => {
                warn!(
                    title = %title,
                    pid,
                    error = %e,
                    "waiting for process failed; exit state unknown"
                );
                (LaunchOutcome::Detached, None)
            }
            Err(_) if config.kill_on_timeout => {
                warn!(
                    title = %title,
                    pid,
                    timeout_ms = config.wait_for_exit_ms,
                    "process did not exit in time; killing"
                );
                if let Err(e) = child.start_kill() {
                    warn!(title = %title, pid, error = %e, "failed to kill process");
                }
                (LaunchOutcome::Killed, None)
            }
            Err(_) => {
                warn!(
                    title = %title,
                    pid,
                    timeout_ms = config.wait_for_exit_ms,
                    "process did not exit in time; leaving it running"
                );
                (LaunchOutcome::TimedOut, None)
            }
        };

        ExecutionResult::launched(title, pid, outcome, exit_code, output_path, pumps)
    }

    /// Resolve sink and stdin source, start both pumps, then feed stdin.
    async fn redirect(
        &self,
        config: &LaunchConfig,
        child: &mut Child,
        pumps: &mut PumpGroup,
    ) -> Result<Option<PathBuf>> {
        let destination = resolve_output(config)?;
        let input = resolve_input(config)?;

        let stdout = child
            .stdout
            .take()
            .ok_or(LaunchError::StreamUnavailable("stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or(LaunchError::StreamUnavailable("stderr"))?;

        pumps.push(
            StreamPump::new("stdout", stdout, destination.sink())
                .with_chunk_size(self.chunk_size)
                .spawn(),
        );
        pumps.push(
            StreamPump::new("stderr", stderr, destination.sink())
                .with_chunk_size(self.chunk_size)
                .spawn(),
        );

        if let Some(input) = input {
            feed_stdin(child, input).await?;
        }

        Ok(destination.path().map(Path::to_path_buf))
    }
}

/// Copy the input file into the child's stdin, then close it.
///
/// A child that exits or closes stdin before reading everything is not an
/// error.
async fn feed_stdin(child: &mut Child, input: InputSource) -> Result<()> {
    let mut stdin = child
        .stdin
        .take()
        .ok_or(LaunchError::StreamUnavailable("stdin"))?;
    let mut file = tokio::fs::File::from_std(input.file);

    match tokio::io::copy(&mut file, &mut stdin).await {
        Ok(bytes) => {
            debug!(path = %input.path.display(), bytes, "fed input file to stdin");
        }
        Err(e) if e.kind() == IoErrorKind::BrokenPipe => {
            debug!(path = %input.path.display(), "child closed stdin before input was fully written");
            return Ok(());
        }
        Err(source) => {
            return Err(LaunchError::StdinFeed {
                path: input.path,
                source,
            });
        }
    }

    if let Err(e) = stdin.shutdown().await {
        debug!(error = %e, "ignoring stdin close failure");
    }
    Ok(())
}

/// Exit code, or `128 + signal` for a child killed by a signal on Unix.
fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    -1
}
