// src/exec/result.rs

use std::fmt;
use std::path::{Path, PathBuf};

use crate::errors::LaunchError;
use crate::exec::pump::{PumpGroup, PumpReport};

/// Terminal state of a launch.
///
/// `exit_code` alone cannot tell "not waited", "timed out" and "killed"
/// apart; this enum can, but callers may equally use the config they passed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// Nothing useful ran; see `launch_error`.
    LaunchFailed,
    /// Spawned and not awaited. The process may still be running.
    Detached,
    /// Exited within the deadline.
    Exited,
    /// Deadline elapsed; the process was left running.
    TimedOut,
    /// Deadline elapsed; a kill was requested.
    Killed,
}

/// What one launch produced.
#[derive(Debug)]
pub struct ExecutionResult {
    title: String,
    pid: Option<u32>,
    exit_code: Option<i32>,
    launch_error: Option<LaunchError>,
    outcome: LaunchOutcome,
    output_path: Option<PathBuf>,
    pumps: Option<PumpGroup>,
}

impl ExecutionResult {
    pub(crate) fn failed(title: impl Into<String>, pid: Option<u32>, error: LaunchError) -> Self {
        Self {
            title: title.into(),
            pid,
            exit_code: None,
            launch_error: Some(error),
            outcome: LaunchOutcome::LaunchFailed,
            output_path: None,
            pumps: None,
        }
    }

    pub(crate) fn launched(
        title: impl Into<String>,
        pid: Option<u32>,
        outcome: LaunchOutcome,
        exit_code: Option<i32>,
        output_path: Option<PathBuf>,
        pumps: PumpGroup,
    ) -> Self {
        Self {
            title: title.into(),
            pid,
            exit_code,
            launch_error: None,
            outcome,
            output_path,
            pumps: Some(pumps),
        }
    }

    pub(crate) fn with_pumps(mut self, pumps: PumpGroup) -> Self {
        self.pumps = Some(pumps);
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// OS process id, when a process was spawned.
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Present only when the launcher waited and the process exited in time.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn launch_error(&self) -> Option<&LaunchError> {
        self.launch_error.as_ref()
    }

    pub fn outcome(&self) -> LaunchOutcome {
        self.outcome
    }

    /// The output file, when file capture was used.
    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    /// Wait until both output pumps have drained.
    ///
    /// The exit code can be observed before the last chunk of output has
    /// reached the sink; call this when the output must be complete. Returns
    /// the reports once; later calls return an empty list.
    pub async fn join_output(&mut self) -> Vec<PumpReport> {
        match self.pumps.take() {
            Some(pumps) => pumps.join_all().await,
            None => Vec::new(),
        }
    }

    /// Stop the output pumps early. The child's pipes are closed as a result.
    pub fn cancel_output(&mut self) {
        if let Some(pumps) = self.pumps.as_mut() {
            pumps.cancel_all();
        }
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.title)?;
        match (&self.launch_error, self.outcome) {
            (Some(err), _) => write!(f, "launch failed: {err}"),
            (None, LaunchOutcome::Exited) => match self.exit_code {
                Some(code) => write!(f, "exited with code {code}"),
                None => write!(f, "exited"),
            },
            (None, LaunchOutcome::Detached) => write!(f, "started, not waited for"),
            (None, LaunchOutcome::TimedOut) => write!(f, "timed out, left running"),
            (None, LaunchOutcome::Killed) => write!(f, "timed out, killed"),
            (None, LaunchOutcome::LaunchFailed) => write!(f, "launch failed"),
        }
    }
}
