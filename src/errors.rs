// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Every failure the launcher can report before the child is handed over to
//! its pumps ends up as a [`LaunchError`] inside
//! [`ExecutionResult::launch_error`](crate::exec::ExecutionResult::launch_error).
//! Variants are grouped into coarse [`ErrorKind`]s so callers can branch
//! without matching every case.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of a [`LaunchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Inconsistent or malformed configuration.
    Configuration,
    /// A path does not exist or is not the expected kind of entry.
    PathNotFound,
    /// The output path is a directory where a file was expected.
    PathConflict,
    /// Filesystem or stream I/O failed.
    Io,
    /// The OS refused or failed to create the process.
    LaunchFailure,
}

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    #[error("Malformed environment entry '{0}' (expected NAME=VALUE)")]
    MalformedEnvironment(String),

    #[error(
        "Input directory and input file must be set together (directory: {directory:?}, file: {file:?})"
    )]
    InputParamsInvalid {
        directory: Option<PathBuf>,
        file: Option<String>,
    },

    #[error("TOML parsing error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to read launch file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Executable not found: {0}")]
    ExecutableNotFound(PathBuf),

    #[error("Working directory does not exist: {0}")]
    WorkingDirNotFound(PathBuf),

    #[error("Working directory is not a directory: {0}")]
    WorkingDirInvalid(PathBuf),

    #[error("Output directory does not exist: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Output directory is not a directory: {0}")]
    InvalidDirectory(PathBuf),

    #[error("Input directory does not exist: {0}")]
    InputDirDoesNotExist(PathBuf),

    #[error("Input directory is not a directory: {0}")]
    InputDirInvalid(PathBuf),

    #[error("Input file does not exist: {0}")]
    InputFileDoesNotExist(PathBuf),

    #[error("Input file is a directory: {0}")]
    InputFileIsDirectory(PathBuf),

    #[error("Output file is a directory: {0}")]
    OutputFileIsDirectory(PathBuf),

    #[error("Failed to create output file {path}: {source}")]
    OutputFileCreationFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to back up {from} to {to}: {source}")]
    BackupFailed {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to remove existing output file {path}: {source}")]
    StaleOutputRemoval {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Input file is not readable {path}: {source}")]
    InputFileUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to feed input file {path} to stdin: {source}")]
    StdinFeed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Child {0} pipe was not available")]
    StreamUnavailable(&'static str),

    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl LaunchError {
    pub fn kind(&self) -> ErrorKind {
        use LaunchError::*;

        match self {
            InvalidConfig(_) | MalformedEnvironment(_) | InputParamsInvalid { .. } | ConfigParse(_) => {
                ErrorKind::Configuration
            }
            ExecutableNotFound(_)
            | WorkingDirNotFound(_)
            | WorkingDirInvalid(_)
            | DirectoryNotFound(_)
            | InvalidDirectory(_)
            | InputDirDoesNotExist(_)
            | InputDirInvalid(_)
            | InputFileDoesNotExist(_)
            | InputFileIsDirectory(_) => ErrorKind::PathNotFound,
            OutputFileIsDirectory(_) => ErrorKind::PathConflict,
            ConfigRead { .. }
            | OutputFileCreationFailure { .. }
            | BackupFailed { .. }
            | StaleOutputRemoval { .. }
            | InputFileUnreadable { .. }
            | StdinFeed { .. }
            | StreamUnavailable(_)
            | Io(_) => ErrorKind::Io,
            Spawn { .. } => ErrorKind::LaunchFailure,
        }
    }
}

pub type Result<T> = std::result::Result<T, LaunchError>;
