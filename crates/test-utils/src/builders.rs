#![allow(dead_code)]

use std::path::PathBuf;

use proclaunch::config::{LaunchConfig, RawLaunchConfig};

/// Path of the POSIX shell used by launch tests.
pub const SH: &str = "/bin/sh";

/// A launch of `/bin/sh -c <script>`.
pub fn shell(script: &str) -> LaunchConfig {
    LaunchConfig::new(SH)
        .with_title("sh")
        .with_args(["-c", script])
}

/// Builder for `RawLaunchConfig` to simplify validation tests.
pub struct RawLaunchConfigBuilder {
    config: RawLaunchConfig,
}

impl RawLaunchConfigBuilder {
    pub fn new(executable: &str) -> Self {
        Self {
            config: RawLaunchConfig {
                title: None,
                executable: executable.to_string(),
                program_directory: None,
                arguments: vec![],
                environment: None,
                working_directory: None,
                capture_output: false,
                output_directory: None,
                output_file: None,
                backup_output_file: false,
                input_directory: None,
                input_file: None,
                wait_for_exit_ms: 0,
                kill_on_timeout: false,
                check_executable_exists: true,
            },
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.config.title = Some(title.to_string());
        self
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.config.arguments.push(arg.to_string());
        self
    }

    pub fn env(mut self, entry: &str) -> Self {
        self.config
            .environment
            .get_or_insert_with(Vec::new)
            .push(entry.to_string());
        self
    }

    pub fn input_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.input_directory = Some(dir.into());
        self
    }

    pub fn input_file(mut self, file: &str) -> Self {
        self.config.input_file = Some(file.to_string());
        self
    }

    pub fn wait_for_exit_ms(mut self, ms: i64) -> Self {
        self.config.wait_for_exit_ms = ms;
        self
    }

    pub fn build(self) -> RawLaunchConfig {
        self.config
    }
}
