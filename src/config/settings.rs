// src/config/settings.rs

//! Process-wide capture defaults.
//!
//! The default capture limit is read from `PROCLAUNCH_CAPTURE_LIMIT` once, at
//! startup, and then passed explicitly to whoever builds a
//! [`BoundedCaptureSink`](crate::capture::BoundedCaptureSink). Nothing reads
//! the variable lazily.

use tracing::{debug, warn};

/// 2 MiB.
pub const DEFAULT_CAPTURE_LIMIT: usize = 2 * 1024 * 1024;

/// Name of the environment variable holding the default capture limit.
pub const CAPTURE_LIMIT_ENV: &str = "PROCLAUNCH_CAPTURE_LIMIT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureSettings {
    /// Capacity, in bytes, of capture sinks built without an explicit limit.
    pub default_limit: usize,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_CAPTURE_LIMIT,
        }
    }
}

impl CaptureSettings {
    /// Resolve settings from the process environment.
    ///
    /// An unset variable gives the default; an unparsable one is logged and
    /// also gives the default.
    pub fn from_env() -> Self {
        Self::from_value(std::env::var(CAPTURE_LIMIT_ENV).ok().as_deref())
    }

    /// Resolve settings from an optional raw value of the limit variable.
    pub fn from_value(value: Option<&str>) -> Self {
        let Some(raw) = value else {
            return Self::default();
        };

        match parse_size(raw) {
            Some(limit) => {
                debug!(limit, "capture limit taken from {}", CAPTURE_LIMIT_ENV);
                Self {
                    default_limit: limit,
                }
            }
            None => {
                warn!(
                    value = %raw,
                    default = DEFAULT_CAPTURE_LIMIT,
                    "invalid {}; using default capture limit",
                    CAPTURE_LIMIT_ENV
                );
                Self::default()
            }
        }
    }
}

/// Parse a byte size like `4096`, `512k`, `2MiB` or `1 mb`.
///
/// Suffixes are case-insensitive and binary (`k` = 1024).
pub fn parse_size(s: &str) -> Option<usize> {
    let s = s.trim().to_lowercase();
    let digits_end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());

    let (number, unit) = s.split_at(digits_end);
    let number: usize = number.parse().ok()?;

    let multiplier = match unit.trim() {
        "" | "b" => 1,
        "k" | "kb" | "kib" => 1024,
        "m" | "mb" | "mib" => 1024 * 1024,
        _ => return None,
    };

    number.checked_mul(multiplier)
}
