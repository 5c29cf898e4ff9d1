#![allow(dead_code)]

pub use proclaunch_test_utils::builders;
pub use proclaunch_test_utils::fake_streams;
pub use proclaunch_test_utils::process;
pub use proclaunch_test_utils::{init_tracing, with_timeout, with_timeout_of};

use std::error::Error;

pub type TestResult = Result<(), Box<dyn Error>>;
