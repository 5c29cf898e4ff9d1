// src/lib.rs

//! Launch an external process, capture or discard its output, and optionally
//! wait for it under a deadline.
//!
//! No sandboxing or privilege checks are performed: whatever the
//! configuration names is executed.

pub mod capture;
pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::capture::BoundedCaptureSink;
use crate::cli::CliArgs;
use crate::config::{CaptureSettings, LaunchConfig, load_and_validate};
use crate::exec::{ExecutionResult, LaunchOutcome, ProcessLauncher, ResolvedCommand};

pub use crate::errors::{ErrorKind, LaunchError};
pub use crate::exec::launch;

/// Exit status reported when the wait deadline elapsed.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// How long `--print-output` waits for the pumps after the child is gone.
const OUTPUT_DRAIN_GRACE: Duration = Duration::from_secs(5);

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - capture settings from the environment
/// - launch config from a file or the trailing command
/// - the launcher
/// - optional in-memory capture for `--print-output`
///
/// Returns the exit status the binary should exit with.
pub async fn run(args: CliArgs) -> Result<i32> {
    let settings = CaptureSettings::from_env();
    let mut config = build_config(&args)?;

    if args.dry_run {
        print_dry_run(&config)?;
        return Ok(0);
    }

    let capture = if args.print_output {
        let sink = Arc::new(match args.capture_limit {
            Some(limit) => BoundedCaptureSink::new(limit),
            None => BoundedCaptureSink::from_settings(&settings),
        });
        config.capture_output = true;
        config.output_sink = Some(sink.clone());
        Some(sink)
    } else {
        None
    };

    let mut result = ProcessLauncher::new().launch(&config).await;

    if let Some(err) = result.launch_error() {
        bail!("{}: {err}", result.title());
    }

    info!("{result}");

    if let Some(sink) = capture {
        if matches!(result.outcome(), LaunchOutcome::Exited | LaunchOutcome::Killed) {
            if tokio::time::timeout(OUTPUT_DRAIN_GRACE, result.join_output())
                .await
                .is_err()
            {
                warn!("output still draining; printing what was captured so far");
            }
        }
        print!("{}", sink.to_string_lossy());
        if sink.is_full() {
            warn!(
                limit = sink.capacity(),
                "captured output hit the capture limit and was truncated"
            );
        }
    }

    Ok(exit_status_for(&result))
}

/// Build the launch config from `--config` or the trailing command, then
/// apply command-line overrides.
pub fn build_config(args: &CliArgs) -> Result<LaunchConfig> {
    let mut config = match (&args.config, args.command.split_first()) {
        (Some(path), None) => {
            load_and_validate(path).with_context(|| format!("loading launch file {path}"))?
        }
        (None, Some((executable, rest))) => {
            // Bare names are left to PATH lookup; anything path-like is checked.
            let path_like = std::path::Path::new(executable).components().count() > 1;
            LaunchConfig::new(executable.clone())
                .with_args(rest.iter().cloned())
                .with_check_executable_exists(path_like)
        }
        (Some(_), Some(_)) => bail!("use either --config or a trailing command, not both"),
        (None, None) => bail!("nothing to launch: pass --config PATH or -- EXECUTABLE [ARGS...]"),
    };

    if let Some(ms) = args.wait_ms {
        config.wait_for_exit_ms = ms;
    }
    if args.kill_on_timeout {
        config.kill_on_timeout = true;
    }
    if let Some(dir) = &args.workdir {
        config.working_directory = Some(dir.clone());
    }
    if args.no_check_executable {
        config.check_executable_exists = false;
    }

    // Without a wait there is no point at which the capture is complete.
    if args.print_output && config.wait_deadline().is_none() {
        bail!("--print-output needs a positive --wait-ms (or wait_for_exit_ms in the launch file)");
    }

    Ok(config)
}

/// Map a launch result to the binary's exit status.
pub fn exit_status_for(result: &ExecutionResult) -> i32 {
    match result.outcome() {
        LaunchOutcome::Exited => result.exit_code().unwrap_or(0),
        LaunchOutcome::Detached => 0,
        LaunchOutcome::TimedOut | LaunchOutcome::Killed => TIMEOUT_EXIT_CODE,
        LaunchOutcome::LaunchFailed => 1,
    }
}

/// Simple dry-run output: resolve the command line without spawning.
fn print_dry_run(config: &LaunchConfig) -> Result<()> {
    let command = ResolvedCommand::resolve(config)
        .with_context(|| format!("resolving launch '{}'", config.title()))?;

    println!("proclaunch dry-run");
    println!("  title: {}", command.title);
    println!("  command: {command}");
    match &command.working_dir {
        Some(dir) => println!("  working_directory: {}", dir.display()),
        None => println!("  working_directory: (inherited)"),
    }
    match &command.env {
        Some(env) => println!("  environment: {} variable(s), parent not inherited", env.len()),
        None => println!("  environment: (inherited)"),
    }
    match config.wait_deadline() {
        Some(deadline) => println!(
            "  wait: {} ms (kill_on_timeout = {})",
            deadline.as_millis(),
            config.kill_on_timeout
        ),
        None => println!("  wait: no"),
    }
    println!("  capture_output: {}", config.capture_output);

    Ok(())
}
