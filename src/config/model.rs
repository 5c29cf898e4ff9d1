// src/config/model.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::errors::{LaunchError, Result};
use crate::exec::sink::SharedSink;

/// Everything the launcher needs to start one process.
///
/// A `LaunchConfig` is read-only once a launch begins. Optional settings are
/// `Option`s rather than sentinel values; the defaults documented on each
/// field are applied by the launcher, not stored here.
///
/// ```no_run
/// # use proclaunch::config::LaunchConfig;
/// let config = LaunchConfig::new("/usr/bin/rsync")
///     .with_args(["-a", "src/", "dst/"])
///     .with_capture_output(true)
///     .with_wait_for_exit_ms(30_000)
///     .with_kill_on_timeout(true);
/// ```
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// Human label. Defaults to [`LaunchConfig::executable`].
    pub title: Option<String>,

    /// Executable name, or full path when `program_directory` is unset.
    pub executable: String,

    /// Directory joined in front of `executable` when set.
    pub program_directory: Option<PathBuf>,

    /// Arguments appended after the executable path.
    pub arguments: Vec<String>,

    /// `NAME=VALUE` entries. `None` inherits the parent's environment;
    /// `Some` replaces it entirely.
    pub environment: Option<Vec<String>>,

    /// `None` inherits the caller's current directory.
    pub working_directory: Option<PathBuf>,

    /// When false, stdout/stderr are drained and discarded.
    pub capture_output: bool,

    /// Pre-supplied destination; wins over file capture.
    pub output_sink: Option<SharedSink>,

    /// Where the output file goes. Defaults to the platform temp directory.
    pub output_directory: Option<PathBuf>,

    /// Output file name inside `output_directory`. Auto-generated if unset.
    pub output_file: Option<String>,

    /// Rename an existing output file with a timestamp suffix instead of
    /// overwriting it.
    pub backup_output_file: bool,

    /// Directory holding the stdin input file. Set together with `input_file`.
    pub input_directory: Option<PathBuf>,

    /// File whose bytes are written to the child's stdin before it is closed.
    pub input_file: Option<String>,

    /// `<= 0`: return right after spawn. `> 0`: block at most this long for
    /// the exit code.
    pub wait_for_exit_ms: i64,

    /// Kill the child when the wait deadline elapses.
    pub kill_on_timeout: bool,

    /// Verify the executable exists and resolve it to an absolute path
    /// before spawning. When false the OS resolves it (e.g. via `PATH`).
    pub check_executable_exists: bool,
}

impl LaunchConfig {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            title: None,
            executable: executable.into(),
            program_directory: None,
            arguments: Vec::new(),
            environment: None,
            working_directory: None,
            capture_output: false,
            output_sink: None,
            output_directory: None,
            output_file: None,
            backup_output_file: false,
            input_directory: None,
            input_file: None,
            wait_for_exit_ms: 0,
            kill_on_timeout: false,
            check_executable_exists: true,
        }
    }

    /// The effective title: the explicit one, or the executable.
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.executable)
    }

    /// Executable joined with `program_directory`, before any existence check.
    pub fn executable_path(&self) -> PathBuf {
        match &self.program_directory {
            Some(dir) => dir.join(&self.executable),
            None => PathBuf::from(&self.executable),
        }
    }

    /// The wait deadline, only when waiting was requested.
    pub fn wait_deadline(&self) -> Option<Duration> {
        u64::try_from(self.wait_for_exit_ms)
            .ok()
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    /// Input directory and file when both are set.
    pub fn input_paths(&self) -> Option<(&Path, &str)> {
        match (&self.input_directory, &self.input_file) {
            (Some(dir), Some(file)) => Some((dir.as_path(), file.as_str())),
            _ => None,
        }
    }

    /// Parse `environment` into ordered `(name, value)` pairs.
    ///
    /// Returns `Ok(None)` when the environment is inherited. The split is on
    /// the first `=`, so values may themselves contain `=`.
    pub fn environment_pairs(&self) -> Result<Option<Vec<(String, String)>>> {
        let Some(entries) = &self.environment else {
            return Ok(None);
        };

        entries
            .iter()
            .map(|entry| match entry.split_once('=') {
                Some((name, value)) if !name.is_empty() => {
                    Ok((name.to_string(), value.to_string()))
                }
                _ => Err(LaunchError::MalformedEnvironment(entry.clone())),
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_program_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.program_directory = Some(dir.into());
        self
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.arguments.push(arg.into());
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments.extend(args.into_iter().map(Into::into));
        self
    }

    /// Replace the child's environment with raw `NAME=VALUE` entries.
    pub fn with_environment<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.environment = Some(entries.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the child's environment from a name/value map.
    pub fn with_environment_map(mut self, vars: &BTreeMap<String, String>) -> Self {
        self.environment = Some(
            vars.iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect(),
        );
        self
    }

    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    pub fn with_capture_output(mut self, capture: bool) -> Self {
        self.capture_output = capture;
        self
    }

    pub fn with_output_sink(mut self, sink: SharedSink) -> Self {
        self.output_sink = Some(sink);
        self
    }

    pub fn with_output_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_directory = Some(dir.into());
        self
    }

    pub fn with_output_file(mut self, file: impl Into<String>) -> Self {
        self.output_file = Some(file.into());
        self
    }

    pub fn with_backup_output_file(mut self, backup: bool) -> Self {
        self.backup_output_file = backup;
        self
    }

    pub fn with_input(mut self, dir: impl Into<PathBuf>, file: impl Into<String>) -> Self {
        self.input_directory = Some(dir.into());
        self.input_file = Some(file.into());
        self
    }

    pub fn with_wait_for_exit_ms(mut self, ms: i64) -> Self {
        self.wait_for_exit_ms = ms;
        self
    }

    pub fn with_kill_on_timeout(mut self, kill: bool) -> Self {
        self.kill_on_timeout = kill;
        self
    }

    pub fn with_check_executable_exists(mut self, check: bool) -> Self {
        self.check_executable_exists = check;
        self
    }
}

/// On-disk form of a launch, as read from a TOML file.
///
/// ```toml
/// title = "nightly purge"
/// executable = "purge.sh"
/// program_directory = "/opt/jobs"
/// arguments = ["--all"]
/// capture_output = true
/// output_file = "purge.out"
/// backup_output_file = true
/// wait_for_exit_ms = 60000
/// kill_on_timeout = true
/// ```
///
/// There is no TOML counterpart for `output_sink`; sinks are attached in
/// code. Converted into a [`LaunchConfig`] through `TryFrom`, which runs the
/// static checks.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawLaunchConfig {
    #[serde(default)]
    pub title: Option<String>,

    pub executable: String,

    #[serde(default)]
    pub program_directory: Option<PathBuf>,

    #[serde(default)]
    pub arguments: Vec<String>,

    #[serde(default)]
    pub environment: Option<Vec<String>>,

    #[serde(default)]
    pub working_directory: Option<PathBuf>,

    #[serde(default)]
    pub capture_output: bool,

    #[serde(default)]
    pub output_directory: Option<PathBuf>,

    #[serde(default)]
    pub output_file: Option<String>,

    #[serde(default)]
    pub backup_output_file: bool,

    #[serde(default)]
    pub input_directory: Option<PathBuf>,

    #[serde(default)]
    pub input_file: Option<String>,

    #[serde(default)]
    pub wait_for_exit_ms: i64,

    #[serde(default)]
    pub kill_on_timeout: bool,

    #[serde(default = "default_check_executable_exists")]
    pub check_executable_exists: bool,
}

fn default_check_executable_exists() -> bool {
    true
}

impl RawLaunchConfig {
    /// Build the launch contract without running any checks.
    pub(crate) fn into_unchecked(self) -> LaunchConfig {
        LaunchConfig {
            title: self.title,
            executable: self.executable,
            program_directory: self.program_directory,
            arguments: self.arguments,
            environment: self.environment,
            working_directory: self.working_directory,
            capture_output: self.capture_output,
            output_sink: None,
            output_directory: self.output_directory,
            output_file: self.output_file,
            backup_output_file: self.backup_output_file,
            input_directory: self.input_directory,
            input_file: self.input_file,
            wait_for_exit_ms: self.wait_for_exit_ms,
            kill_on_timeout: self.kill_on_timeout,
            check_executable_exists: self.check_executable_exists,
        }
    }
}
