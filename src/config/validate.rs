// src/config/validate.rs

use crate::config::model::{LaunchConfig, RawLaunchConfig};
use crate::errors::{LaunchError, Result};

impl TryFrom<RawLaunchConfig> for LaunchConfig {
    type Error = LaunchError;

    fn try_from(raw: RawLaunchConfig) -> std::result::Result<Self, Self::Error> {
        let config = raw.into_unchecked();
        validate_config(&config)?;
        Ok(config)
    }
}

impl LaunchConfig {
    /// Static checks that need no filesystem access.
    ///
    /// The launcher runs these before spawning anything; the file loader runs
    /// them at load time so a bad launch file fails early.
    pub fn validate(&self) -> Result<()> {
        validate_config(self)
    }
}

/// Run every static check against a launch configuration.
pub fn validate_config(cfg: &LaunchConfig) -> Result<()> {
    ensure_has_executable(cfg)?;
    validate_title(cfg)?;
    validate_environment(cfg)?;
    validate_input_pairing(cfg)?;
    Ok(())
}

fn ensure_has_executable(cfg: &LaunchConfig) -> Result<()> {
    if cfg.executable.trim().is_empty() {
        return Err(LaunchError::InvalidConfig(
            "executable must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_title(cfg: &LaunchConfig) -> Result<()> {
    if let Some(title) = &cfg.title {
        if title.trim().is_empty() {
            return Err(LaunchError::InvalidConfig(
                "title must not be blank when set".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_environment(cfg: &LaunchConfig) -> Result<()> {
    cfg.environment_pairs().map(|_| ())
}

/// `input_directory` and `input_file` are both present or both absent.
pub fn validate_input_pairing(cfg: &LaunchConfig) -> Result<()> {
    match (&cfg.input_directory, &cfg.input_file) {
        (Some(_), Some(_)) | (None, None) => Ok(()),
        (directory, file) => Err(LaunchError::InputParamsInvalid {
            directory: directory.clone(),
            file: file.clone(),
        }),
    }
}
