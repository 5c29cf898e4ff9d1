//! Shared helpers for `proclaunch` integration tests.
//!
//! - [`builders`]: launch configs for `/bin/sh` and a `RawLaunchConfig` builder.
//! - [`fake_streams`]: scripted pipe sources, recording and failing sinks.
//! - [`process`]: liveness checks for spawned children.

pub mod builders;
pub mod fake_streams;
pub mod process;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

/// Upper bound for any single awaited step in a test.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

static INIT: Once = Once::new();

/// Install a test subscriber once per test binary.
///
/// Output goes through `with_test_writer()`, so it only shows up for failing
/// tests. The filter comes from `PROCLAUNCH_LOG`, then `RUST_LOG`, else
/// `info`; `proclaunch::capture=info` shows mirrored child output.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("PROCLAUNCH_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await `f`, failing the test after [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    with_timeout_of(TEST_TIMEOUT, f).await
}

/// Await `f`, failing the test after `limit`.
pub async fn with_timeout_of<F, T>(limit: Duration, f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(limit, f).await {
        Ok(value) => value,
        Err(_) => panic!("test step did not finish within {limit:?}"),
    }
}
