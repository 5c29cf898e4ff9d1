// src/exec/command.rs

//! Resolving phase: turn a [`LaunchConfig`] into a concrete command line.
//!
//! Nothing here spawns a process, so `--dry-run` uses it directly.

use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;

use crate::config::LaunchConfig;
use crate::errors::{LaunchError, Result};

/// A fully resolved, ready-to-spawn command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    pub title: String,
    pub program: PathBuf,
    pub args: Vec<String>,
    /// `None` inherits the parent environment.
    pub env: Option<Vec<(String, String)>>,
    pub working_dir: Option<PathBuf>,
}

impl ResolvedCommand {
    pub fn resolve(config: &LaunchConfig) -> Result<Self> {
        config.validate()?;

        let program = resolve_executable(config)?;
        let working_dir = resolve_working_dir(config)?;
        let env = config.environment_pairs()?;

        Ok(Self {
            title: config.title().to_string(),
            program,
            args: config.arguments.clone(),
            env,
            working_dir,
        })
    }

    /// `[program] + args`, as handed to the OS.
    pub fn command_line(&self) -> Vec<String> {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect()
    }

    /// Build the Tokio command with piped output.
    ///
    /// The child is not killed when its handle is dropped: a launch that does
    /// not wait leaves the process running on purpose.
    pub fn to_command(&self, pipe_stdin: bool) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(env) = &self.env {
            cmd.env_clear();
            cmd.envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }

        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        cmd.stdin(if pipe_stdin {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(false);

        cmd
    }
}

impl fmt::Display for ResolvedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command_line().join(" "))
    }
}

fn resolve_executable(config: &LaunchConfig) -> Result<PathBuf> {
    let path = config.executable_path();

    if !config.check_executable_exists {
        return Ok(path);
    }

    if !path.exists() {
        return Err(LaunchError::ExecutableNotFound(path));
    }

    // Absolute, but symlinks are kept: multi-call binaries dispatch on argv[0].
    std::path::absolute(&path).map_err(LaunchError::from)
}

fn resolve_working_dir(config: &LaunchConfig) -> Result<Option<PathBuf>> {
    match &config.working_directory {
        None => Ok(None),
        Some(dir) if !dir.exists() => Err(LaunchError::WorkingDirNotFound(dir.clone())),
        Some(dir) if !dir.is_dir() => Err(LaunchError::WorkingDirInvalid(dir.clone())),
        Some(dir) => Ok(Some(dir.clone())),
    }
}
