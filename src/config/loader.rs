// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::model::{LaunchConfig, RawLaunchConfig};
use crate::errors::{LaunchError, Result};

/// Read a launch file and deserialize it, without running the static checks.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawLaunchConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| LaunchError::ConfigRead {
        path: path.to_path_buf(),
        source,
    })?;

    debug!(path = %path.display(), "loaded launch file");
    parse_str(&contents)
}

/// Deserialize launch TOML held in memory.
pub fn parse_str(contents: &str) -> Result<RawLaunchConfig> {
    Ok(toml::from_str(contents)?)
}

/// Load a launch file and run the static checks on it.
///
/// Serde fills in defaults for absent keys. The checks cover a non-empty
/// executable, well-formed `NAME=VALUE` environment entries and the
/// `input_directory` / `input_file` pairing.
///
/// Filesystem checks (does the executable exist, is the working directory a
/// directory) wait until launch time, since the filesystem may change between
/// loading and launching.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<LaunchConfig> {
    LaunchConfig::try_from(load_from_path(path)?)
}
