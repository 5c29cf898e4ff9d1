// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::parse_size;

/// Command-line arguments for `proclaunch`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "proclaunch",
    version,
    about = "Launch a process, capture its output and wait for it under a deadline.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to a launch file (TOML).
    ///
    /// Mutually exclusive with a trailing `-- EXECUTABLE [ARGS...]`.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Milliseconds to wait for the process to exit (<= 0: don't wait).
    #[arg(long, value_name = "MS", allow_negative_numbers = true)]
    pub wait_ms: Option<i64>,

    /// Kill the process if it is still running when the wait times out.
    #[arg(long)]
    pub kill_on_timeout: bool,

    /// Working directory for the process.
    #[arg(long, value_name = "DIR")]
    pub workdir: Option<PathBuf>,

    /// Let the OS resolve the executable instead of checking it up front.
    #[arg(long)]
    pub no_check_executable: bool,

    /// Capture stdout+stderr in memory and print them once the run is over.
    ///
    /// Requires a positive wait (`--wait-ms` or `wait_for_exit_ms`).
    #[arg(long)]
    pub print_output: bool,

    /// Capture limit for `--print-output` (e.g. `65536`, `512k`, `2MiB`).
    ///
    /// Defaults to `PROCLAUNCH_CAPTURE_LIMIT`, or 2 MiB.
    #[arg(long, value_name = "BYTES", value_parser = parse_capture_limit)]
    pub capture_limit: Option<usize>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PROCLAUNCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the command line, but don't start anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Executable and arguments, after `--`.
    #[arg(last = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn parse_capture_limit(s: &str) -> Result<usize, String> {
    parse_size(s).ok_or_else(|| format!("invalid size '{s}' (expected e.g. 4096, 512k, 2MiB)"))
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
