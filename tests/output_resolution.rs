// tests/output_resolution.rs
mod common;
use crate::common::builders::SH;
use crate::common::fake_streams::RecordingSink;
use crate::common::{TestResult, init_tracing};

use std::fs;
use std::path::Path;
use std::sync::Arc;

use proclaunch::config::LaunchConfig;
use proclaunch::exec::resolver::{backup_path_for, output_file_prefix};
use proclaunch::exec::{OutputDestination, SharedSink, resolve_input, resolve_output};
use proclaunch::{ErrorKind, LaunchError};
use tempfile::tempdir;

fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn capture_off_discards_even_with_a_sink() -> TestResult {
    init_tracing();

    let sink: SharedSink = Arc::new(RecordingSink::new());
    let config = LaunchConfig::new(SH).with_output_sink(sink);

    let destination = resolve_output(&config)?;
    assert!(matches!(destination, OutputDestination::Discard));
    assert!(destination.sink().is_none());
    assert!(destination.path().is_none());
    Ok(())
}

#[test]
fn supplied_sink_wins_over_file_settings() -> TestResult {
    init_tracing();
    let dir = tempdir()?;

    let sink: SharedSink = Arc::new(RecordingSink::new());
    let config = LaunchConfig::new(SH)
        .with_capture_output(true)
        .with_output_sink(sink.clone())
        .with_output_directory(dir.path())
        .with_output_file("ignored.log");

    let destination = resolve_output(&config)?;
    let resolved = destination.sink().expect("sink destination");

    assert!(Arc::ptr_eq(&resolved, &sink));
    assert!(destination.path().is_none());
    assert!(entries(dir.path()).is_empty(), "no file may be created");
    Ok(())
}

#[test]
fn named_output_file_is_created_empty() -> TestResult {
    init_tracing();
    let dir = tempdir()?;

    let config = LaunchConfig::new(SH)
        .with_capture_output(true)
        .with_output_directory(dir.path())
        .with_output_file("run.log");

    let destination = resolve_output(&config)?;
    let path = destination.path().expect("file destination");

    assert_eq!(path, dir.path().join("run.log"));
    assert_eq!(fs::metadata(path)?.len(), 0);
    Ok(())
}

#[test]
fn existing_output_is_backed_up_when_requested() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    fs::write(dir.path().join("run.log"), "previous run")?;

    let config = LaunchConfig::new(SH)
        .with_capture_output(true)
        .with_output_directory(dir.path())
        .with_output_file("run.log")
        .with_backup_output_file(true);

    resolve_output(&config)?;

    let names = entries(dir.path());
    assert_eq!(names.len(), 2, "got {names:?}");
    assert_eq!(names[0], "run.log");
    assert!(names[1].starts_with("run.log-"));

    assert_eq!(fs::read_to_string(dir.path().join(&names[1]))?, "previous run");
    assert_eq!(fs::read_to_string(dir.path().join("run.log"))?, "");
    Ok(())
}

#[test]
fn existing_output_is_replaced_without_backup() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    fs::write(dir.path().join("run.log"), "previous run")?;

    let config = LaunchConfig::new(SH)
        .with_capture_output(true)
        .with_output_directory(dir.path())
        .with_output_file("run.log");

    resolve_output(&config)?;

    assert_eq!(entries(dir.path()), vec!["run.log".to_string()]);
    assert_eq!(fs::read_to_string(dir.path().join("run.log"))?, "");
    Ok(())
}

#[test]
fn output_file_that_is_a_directory_is_rejected() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    fs::create_dir(dir.path().join("taken"))?;

    let config = LaunchConfig::new(SH)
        .with_capture_output(true)
        .with_output_directory(dir.path())
        .with_output_file("taken")
        .with_backup_output_file(true);

    let err = resolve_output(&config).unwrap_err();
    assert!(matches!(err, LaunchError::OutputFileIsDirectory(_)));
    assert_eq!(err.kind(), ErrorKind::PathConflict);
    assert!(dir.path().join("taken").is_dir());
    Ok(())
}

#[test]
fn bad_output_directory_is_rejected() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let file = dir.path().join("plain-file");
    fs::write(&file, "x")?;

    let missing = LaunchConfig::new(SH)
        .with_capture_output(true)
        .with_output_directory(dir.path().join("nope"));
    let err = resolve_output(&missing).unwrap_err();
    assert!(matches!(err, LaunchError::DirectoryNotFound(_)));
    assert_eq!(err.kind(), ErrorKind::PathNotFound);

    let not_a_dir = LaunchConfig::new(SH)
        .with_capture_output(true)
        .with_output_directory(&file);
    let err = resolve_output(&not_a_dir).unwrap_err();
    assert!(matches!(err, LaunchError::InvalidDirectory(_)));
    assert_eq!(err.kind(), ErrorKind::PathNotFound);
    Ok(())
}

#[test]
fn generated_output_name_uses_the_title() -> TestResult {
    init_tracing();
    let dir = tempdir()?;

    let config = LaunchConfig::new(SH)
        .with_title("nightly backup")
        .with_capture_output(true)
        .with_output_directory(dir.path());

    let destination = resolve_output(&config)?;
    let path = destination.path().expect("file destination");
    let name = path.file_name().unwrap().to_string_lossy().into_owned();

    assert_eq!(path.parent(), Some(dir.path()));
    assert!(name.starts_with("nightly_backup-"), "got {name}");
    assert!(name.ends_with(".out"), "got {name}");
    assert!(path.is_file());
    Ok(())
}

#[test]
fn generated_names_do_not_collide() -> TestResult {
    init_tracing();
    let dir = tempdir()?;

    let config = LaunchConfig::new(SH)
        .with_capture_output(true)
        .with_output_directory(dir.path());

    let first = resolve_output(&config)?;
    let second = resolve_output(&config)?;

    assert_ne!(first.path(), second.path());
    assert_eq!(entries(dir.path()).len(), 2);
    Ok(())
}

#[test]
fn output_prefix_is_sanitised_and_padded() {
    assert_eq!(output_file_prefix("/usr/bin/rsync"), "rsync-");
    assert_eq!(output_file_prefix("ls"), "ls_-");
    assert_eq!(output_file_prefix("a b:c"), "a_b_c-");
    assert_eq!(output_file_prefix("my-tool.v2"), "my-tool.v2-");
}

#[test]
fn backup_path_skips_names_already_taken() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("run.log");
    let stamp = "2026-01-02--03-04-05";

    let first = backup_path_for(&path, stamp);
    assert_eq!(first, dir.path().join("run.log-2026-01-02--03-04-05"));

    fs::write(&first, "")?;
    let second = backup_path_for(&path, stamp);
    assert_eq!(second, dir.path().join("run.log-2026-01-02--03-04-05-1"));
    Ok(())
}

#[test]
fn no_input_configured_resolves_to_none() -> TestResult {
    let config = LaunchConfig::new(SH);
    assert!(resolve_input(&config)?.is_none());
    Ok(())
}

#[test]
fn input_file_is_opened_for_reading() -> TestResult {
    let dir = tempdir()?;
    fs::write(dir.path().join("stdin.txt"), "payload")?;

    let config = LaunchConfig::new(SH).with_input(dir.path(), "stdin.txt");
    let input = resolve_input(&config)?.expect("input source");

    assert_eq!(input.path, dir.path().join("stdin.txt"));
    Ok(())
}

#[test]
fn input_paths_are_checked_before_opening() -> TestResult {
    let dir = tempdir()?;
    fs::create_dir(dir.path().join("subdir"))?;
    fs::write(dir.path().join("file.txt"), "x")?;

    let missing_dir = LaunchConfig::new(SH).with_input(dir.path().join("missing"), "a.txt");
    let err = resolve_input(&missing_dir).unwrap_err();
    assert!(matches!(err, LaunchError::InputDirDoesNotExist(_)));

    let file_as_dir = LaunchConfig::new(SH).with_input(dir.path().join("file.txt"), "a.txt");
    let err = resolve_input(&file_as_dir).unwrap_err();
    assert!(matches!(err, LaunchError::InputDirInvalid(_)));

    let missing_file = LaunchConfig::new(SH).with_input(dir.path(), "missing.txt");
    let err = resolve_input(&missing_file).unwrap_err();
    assert!(matches!(err, LaunchError::InputFileDoesNotExist(_)));

    let dir_as_file = LaunchConfig::new(SH).with_input(dir.path(), "subdir");
    let err = resolve_input(&dir_as_file).unwrap_err();
    assert!(matches!(err, LaunchError::InputFileIsDirectory(_)));

    // A path of the wrong kind counts as not found, same as a missing one.
    for config in [missing_dir, file_as_dir, missing_file, dir_as_file] {
        let err = resolve_input(&config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PathNotFound, "unexpected kind for {err}");
    }
    Ok(())
}

#[test]
fn half_configured_input_is_a_configuration_error() {
    let mut config = LaunchConfig::new(SH);
    config.input_file = Some("stdin.txt".to_string());

    let err = resolve_input(&config).unwrap_err();
    assert!(matches!(err, LaunchError::InputParamsInvalid { .. }));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}
