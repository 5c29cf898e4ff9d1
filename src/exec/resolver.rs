// src/exec/resolver.rs

//! Where a launch's output goes and where its stdin comes from.
//!
//! Output, in order of precedence:
//! 1. `capture_output = false`: nowhere, the pumps just drain.
//! 2. a caller-supplied sink: used as is.
//! 3. a file under `output_directory` (or the temp dir), either named by
//!    `output_file` or generated. An existing file is backed up or replaced.
//!
//! Input: the file `input_directory/input_file`, when both are set.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use tracing::{debug, info};

use crate::config::LaunchConfig;
use crate::config::validate::validate_input_pairing;
use crate::errors::{LaunchError, Result};
use crate::exec::sink::{FileSink, SharedSink};

/// Format of the suffix appended to a backed-up output file.
pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y-%m-%d--%H-%M-%S";

/// Resolved destination for both output pumps.
#[derive(Debug, Clone)]
pub enum OutputDestination {
    Discard,
    Sink(SharedSink),
    File { path: PathBuf, sink: SharedSink },
}

impl OutputDestination {
    /// The sink to hand to the pumps, if any.
    pub fn sink(&self) -> Option<SharedSink> {
        match self {
            OutputDestination::Discard => None,
            OutputDestination::Sink(sink) | OutputDestination::File { sink, .. } => {
                Some(Arc::clone(sink))
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            OutputDestination::File { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Readable file feeding the child's stdin.
#[derive(Debug)]
pub struct InputSource {
    pub path: PathBuf,
    pub file: File,
}

pub fn resolve_output(config: &LaunchConfig) -> Result<OutputDestination> {
    if !config.capture_output {
        return Ok(OutputDestination::Discard);
    }

    if let Some(sink) = &config.output_sink {
        return Ok(OutputDestination::Sink(Arc::clone(sink)));
    }

    let dir = resolve_output_directory(config.output_directory.as_deref())?;

    let (path, file) = match &config.output_file {
        Some(name) => {
            let path = dir.join(name);
            let file = prepare_named_output(&path, config.backup_output_file)?;
            (path, file)
        }
        None => create_generated_output(&dir, config.title())?,
    };

    info!(title = %config.title(), path = %path.display(), "capturing output to file");

    let sink: SharedSink = Arc::new(FileSink::new(&path, file));
    Ok(OutputDestination::File { path, sink })
}

fn resolve_output_directory(dir: Option<&Path>) -> Result<PathBuf> {
    match dir {
        Some(dir) if !dir.exists() => Err(LaunchError::DirectoryNotFound(dir.to_path_buf())),
        Some(dir) if !dir.is_dir() => Err(LaunchError::InvalidDirectory(dir.to_path_buf())),
        Some(dir) => Ok(dir.to_path_buf()),
        None => Ok(std::env::temp_dir()),
    }
}

/// Back up or delete whatever sits at `path`, then create it empty.
fn prepare_named_output(path: &Path, backup: bool) -> Result<File> {
    if path.is_dir() {
        return Err(LaunchError::OutputFileIsDirectory(path.to_path_buf()));
    }

    if path.exists() {
        if backup {
            let timestamp = Local::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
            let backup_path = backup_path_for(path, &timestamp);
            fs::rename(path, &backup_path).map_err(|source| LaunchError::BackupFailed {
                from: path.to_path_buf(),
                to: backup_path.clone(),
                source,
            })?;
            info!(
                from = %path.display(),
                to = %backup_path.display(),
                "backed up previous output file"
            );
        } else {
            fs::remove_file(path).map_err(|source| LaunchError::StaleOutputRemoval {
                path: path.to_path_buf(),
                source,
            })?;
            debug!(path = %path.display(), "removed previous output file");
        }
    }

    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|source| LaunchError::OutputFileCreationFailure {
            path: path.to_path_buf(),
            source,
        })
}

/// `<path>-<timestamp>`, or `<path>-<timestamp>-<n>` when that name is taken.
pub fn backup_path_for(path: &Path, timestamp: &str) -> PathBuf {
    let base = format!("{}-{}", path.display(), timestamp);
    let mut candidate = PathBuf::from(&base);
    let mut n = 1;
    while candidate.exists() {
        candidate = PathBuf::from(format!("{base}-{n}"));
        n += 1;
    }
    candidate
}

fn create_generated_output(dir: &Path, title: &str) -> Result<(PathBuf, File)> {
    let prefix = output_file_prefix(title);
    let named = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".out")
        .tempfile_in(dir)
        .map_err(|source| LaunchError::OutputFileCreationFailure {
            path: dir.join(format!("{prefix}*.out")),
            source,
        })?;

    let (file, path) = named.keep().map_err(|e| LaunchError::OutputFileCreationFailure {
        path: e.file.path().to_path_buf(),
        source: e.error,
    })?;

    Ok((path, file))
}

/// File-name prefix derived from a launch title.
///
/// Only the last path component of the title is used, characters outside
/// `[A-Za-z0-9._-]` become `_`, and the result is padded to three characters.
pub fn output_file_prefix(title: &str) -> String {
    let name = Path::new(title)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(title);

    let mut prefix: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    while prefix.len() < 3 {
        prefix.push('_');
    }
    prefix.push('-');
    prefix
}

pub fn resolve_input(config: &LaunchConfig) -> Result<Option<InputSource>> {
    validate_input_pairing(config)?;

    let Some((dir, name)) = config.input_paths() else {
        return Ok(None);
    };

    if !dir.exists() {
        return Err(LaunchError::InputDirDoesNotExist(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(LaunchError::InputDirInvalid(dir.to_path_buf()));
    }

    let path = dir.join(name);
    if !path.exists() {
        return Err(LaunchError::InputFileDoesNotExist(path));
    }
    if path.is_dir() {
        return Err(LaunchError::InputFileIsDirectory(path));
    }

    let file = File::open(&path).map_err(|source| LaunchError::InputFileUnreadable {
        path: path.clone(),
        source,
    })?;

    debug!(path = %path.display(), "resolved stdin input file");
    Ok(Some(InputSource { path, file }))
}
