// tests/config_loading.rs
mod common;
use crate::common::builders::RawLaunchConfigBuilder;
use crate::common::{TestResult, init_tracing};

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use proclaunch::config::{LaunchConfig, load_and_validate, load_from_path, parse_str};
use proclaunch::{ErrorKind, LaunchError};
use tempfile::NamedTempFile;

fn write_launch_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp launch file");
    file.write_all(contents.as_bytes()).expect("write launch file");
    file
}

#[test]
fn full_launch_file_is_loaded() -> TestResult {
    init_tracing();

    let file = write_launch_file(
        r#"
title = "nightly purge"
executable = "purge.sh"
program_directory = "/opt/jobs"
arguments = ["--all", "--verbose"]
environment = ["HOME=/root", "OPTS=a=b"]
working_directory = "/tmp"
capture_output = true
output_directory = "/var/log/jobs"
output_file = "purge.out"
backup_output_file = true
input_directory = "/etc/jobs"
input_file = "purge.in"
wait_for_exit_ms = 60000
kill_on_timeout = true
check_executable_exists = false
"#,
    );

    let config = load_and_validate(file.path())?;

    assert_eq!(config.title(), "nightly purge");
    assert_eq!(config.executable_path(), PathBuf::from("/opt/jobs/purge.sh"));
    assert_eq!(config.arguments, vec!["--all", "--verbose"]);
    assert_eq!(config.working_directory, Some(PathBuf::from("/tmp")));
    assert!(config.capture_output);
    assert!(config.output_sink.is_none());
    assert_eq!(config.output_file.as_deref(), Some("purge.out"));
    assert!(config.backup_output_file);
    assert_eq!(config.wait_deadline(), Some(Duration::from_secs(60)));
    assert!(config.kill_on_timeout);
    assert!(!config.check_executable_exists);

    let env = config.environment_pairs()?.expect("explicit environment");
    assert_eq!(
        env,
        vec![
            ("HOME".to_string(), "/root".to_string()),
            ("OPTS".to_string(), "a=b".to_string()),
        ]
    );
    Ok(())
}

#[test]
fn minimal_launch_file_gets_defaults() -> TestResult {
    let file = write_launch_file(r#"executable = "/bin/true""#);

    let config = load_and_validate(file.path())?;

    assert_eq!(config.title(), "/bin/true");
    assert!(config.arguments.is_empty());
    assert!(config.environment.is_none());
    assert!(!config.capture_output);
    assert_eq!(config.wait_for_exit_ms, 0);
    assert_eq!(config.wait_deadline(), None);
    assert!(config.check_executable_exists);
    assert!(config.input_paths().is_none());
    Ok(())
}

#[test]
fn unknown_keys_are_rejected() {
    let file = write_launch_file(
        r#"
executable = "/bin/true"
wait_for_exit = 10
"#,
    );

    let err = load_from_path(file.path()).unwrap_err();
    assert!(matches!(err, LaunchError::ConfigParse(_)));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn missing_launch_file_is_an_io_error() {
    let err = load_and_validate("/definitely/not/here/launch.toml").unwrap_err();
    assert!(matches!(
        err,
        LaunchError::ConfigRead { ref path, .. } if path.ends_with("launch.toml")
    ));
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn launch_toml_can_be_parsed_from_memory() -> TestResult {
    let raw = parse_str(
        r#"
executable = "/bin/echo"
arguments = ["a", "b"]
"#,
    )?;
    assert_eq!(raw.arguments, vec!["a", "b"]);
    assert!(raw.check_executable_exists);

    let err = parse_str("executable = 42").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    Ok(())
}

#[test]
fn malformed_environment_fails_validation() {
    let file = write_launch_file(
        r#"
executable = "/bin/true"
environment = ["GOOD=1", "BROKEN"]
"#,
    );

    let err = load_and_validate(file.path()).unwrap_err();
    assert!(matches!(err, LaunchError::MalformedEnvironment(ref entry) if entry == "BROKEN"));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn environment_name_must_not_be_empty() {
    let raw = RawLaunchConfigBuilder::new("/bin/true").env("=value").build();
    let err = LaunchConfig::try_from(raw).unwrap_err();
    assert!(matches!(err, LaunchError::MalformedEnvironment(_)));
}

#[test]
fn empty_values_and_empty_environment_are_allowed() -> TestResult {
    let raw = RawLaunchConfigBuilder::new("/bin/true").env("EMPTY=").build();
    let config = LaunchConfig::try_from(raw)?;
    assert_eq!(
        config.environment_pairs()?,
        Some(vec![("EMPTY".to_string(), String::new())])
    );

    let cleared = LaunchConfig::new("/bin/true").with_environment(Vec::<String>::new());
    assert_eq!(cleared.environment_pairs()?, Some(Vec::new()));
    Ok(())
}

#[test]
fn environment_map_is_rendered_in_key_order() -> TestResult {
    let mut vars = BTreeMap::new();
    vars.insert("B".to_string(), "2".to_string());
    vars.insert("A".to_string(), "1".to_string());

    let config = LaunchConfig::new("/bin/true").with_environment_map(&vars);
    assert_eq!(
        config.environment,
        Some(vec!["A=1".to_string(), "B=2".to_string()])
    );
    Ok(())
}

#[test]
fn blank_executable_or_title_is_rejected() {
    let err = LaunchConfig::try_from(RawLaunchConfigBuilder::new("  ").build()).unwrap_err();
    assert!(matches!(err, LaunchError::InvalidConfig(_)));

    let err = LaunchConfig::try_from(RawLaunchConfigBuilder::new("/bin/true").title(" ").build())
        .unwrap_err();
    assert!(matches!(err, LaunchError::InvalidConfig(_)));
}

#[test]
fn half_configured_input_fails_at_load_time() {
    let only_dir = RawLaunchConfigBuilder::new("/bin/cat")
        .input_directory("/tmp")
        .build();
    let err = LaunchConfig::try_from(only_dir).unwrap_err();
    assert!(matches!(
        err,
        LaunchError::InputParamsInvalid {
            directory: Some(_),
            file: None
        }
    ));

    let only_file = RawLaunchConfigBuilder::new("/bin/cat")
        .input_file("in.txt")
        .build();
    let err = LaunchConfig::try_from(only_file).unwrap_err();
    assert!(matches!(
        err,
        LaunchError::InputParamsInvalid {
            directory: None,
            file: Some(_)
        }
    ));
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[test]
fn non_positive_wait_means_no_wait() {
    for ms in [0, -1, i64::MIN] {
        let config = LaunchConfig::new("/bin/true").with_wait_for_exit_ms(ms);
        assert_eq!(config.wait_deadline(), None, "wait_for_exit_ms = {ms}");
    }
    let config = LaunchConfig::new("/bin/true").with_wait_for_exit_ms(1);
    assert_eq!(config.wait_deadline(), Some(Duration::from_millis(1)));
}
