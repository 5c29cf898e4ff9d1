// tests/property_input_pairing.rs
use std::path::PathBuf;

use proclaunch::config::LaunchConfig;
use proclaunch::exec::{LaunchOutcome, ProcessLauncher};
use proclaunch::ErrorKind;
use proptest::prelude::*;

// Exactly one of (input_directory, input_file), with arbitrary contents.
fn half_input_strategy() -> impl Strategy<Value = (Option<PathBuf>, Option<String>)> {
    let name = "[a-zA-Z0-9_./-]{0,24}";
    prop_oneof![
        name.prop_map(|dir| (Some(PathBuf::from(dir)), None)),
        name.prop_map(|file| (None, Some(file))),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn half_configured_input_never_validates((dir, file) in half_input_strategy()) {
        let mut config = LaunchConfig::new("/bin/cat");
        config.input_directory = dir;
        config.input_file = file;

        let err = config.validate().unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn half_configured_input_never_spawns((dir, file) in half_input_strategy()) {
        let mut config = LaunchConfig::new("/bin/cat").with_wait_for_exit_ms(1_000);
        config.input_directory = dir;
        config.input_file = file;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let result = runtime.block_on(ProcessLauncher::new().launch(&config));

        prop_assert_eq!(result.outcome(), LaunchOutcome::LaunchFailed);
        prop_assert!(result.pid().is_none());
        prop_assert_eq!(
            result.launch_error().map(|e| e.kind()),
            Some(ErrorKind::Configuration)
        );
    }

    #[test]
    fn wait_deadline_is_set_only_for_positive_values(ms in any::<i64>()) {
        let config = LaunchConfig::new("/bin/true").with_wait_for_exit_ms(ms);
        prop_assert_eq!(config.wait_deadline().is_some(), ms > 0);
    }
}
