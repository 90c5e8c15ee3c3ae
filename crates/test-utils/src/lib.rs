//! Shared helpers for the `taskweave` test suites: plan-file builders, a
//! recording task action, tracing setup and timeouts.

pub mod builders;
pub mod recording_action;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

/// Upper bound for any single scheduler run in tests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

static INIT: Once = Once::new();

/// Route scheduler logs into the test harness.
///
/// Output is captured per test and shown for failures only. `RUST_LOG`
/// overrides the default, which keeps `taskweave` at `debug` so compile
/// decisions and task start/finish show up next to a failing assertion.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,taskweave=debug"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await `f`, failing the test if it takes longer than [`DEFAULT_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    with_timeout_of(DEFAULT_TIMEOUT, f).await
}

/// Await `f` with an explicit limit.
pub async fn with_timeout_of<F, T>(limit: Duration, f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(limit, f)
        .await
        .unwrap_or_else(|_| panic!("scheduler future did not finish within {limit:?}"))
}
