// src/logging.rs

//! Logging setup for `proclaunch` using `tracing` + `tracing-subscriber`.
//!
//! The filter is picked in this order:
//! 1. `--log-level` on the command line, applied to every target.
//! 2. `PROCLAUNCH_LOG`, a full `EnvFilter` directive string such as
//!    `debug` or `proclaunch=debug,proclaunch::capture=off`.
//! 3. `info`.
//!
//! Everything goes to stderr; stdout is reserved for `--print-output`.
//! Mirrored child output is logged on the `proclaunch::capture` target, so it
//! can be switched off on its own.

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "PROCLAUNCH_LOG";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_value = std::env::var(LOG_ENV).ok();
    let filter = build_filter(cli_level, env_value.as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("initialising logging: {e}"))?;

    Ok(())
}

/// Resolve the filter from the CLI flag and the raw `PROCLAUNCH_LOG` value.
///
/// An unparsable `PROCLAUNCH_LOG` falls back to `info` with a note on
/// stderr, since no subscriber exists yet to report it.
pub fn build_filter(cli_level: Option<LogLevel>, env_value: Option<&str>) -> EnvFilter {
    if let Some(level) = cli_level {
        return level_filter(LevelFilter::from(level));
    }

    match env_value.map(str::trim).filter(|s| !s.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives).unwrap_or_else(|e| {
            eprintln!("proclaunch: ignoring {LOG_ENV}={directives:?}: {e}");
            level_filter(LevelFilter::INFO)
        }),
        None => level_filter(LevelFilter::INFO),
    }
}

fn level_filter(level: LevelFilter) -> EnvFilter {
    EnvFilter::default().add_directive(level.into())
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}
