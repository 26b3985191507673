// crates/test-utils/src/lib.rs

//! Shared helpers for `kabedon-kokoro` integration tests.

pub mod builders;
pub mod fake_launcher;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use kabedon_kokoro::logging::LOG_ENV;
use tracing_subscriber::EnvFilter;

/// Upper bound for any single awaited step in a test.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

static INIT: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// Honours the same `KABEDON_LOG` directives as the binary, defaulting to
/// `warn` so passing runs stay quiet. Output is only shown for failing tests
/// unless run with `--nocapture`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

        // A subscriber installed elsewhere in the binary is fine to keep.
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Await `f`, failing the test if it takes longer than [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(TEST_TIMEOUT, f).await {
        Ok(v) => v,
        Err(_) => panic!("test step timed out after {TEST_TIMEOUT:?}"),
    }
}

/// Poll `cond` every 10ms until it holds, failing the test after
/// [`TEST_TIMEOUT`]. `what` names the awaited condition in the panic.
pub async fn eventually<C>(mut cond: C, what: &str)
where
    C: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + TEST_TIMEOUT;
    while !cond() {
        if tokio::time::Instant::now() >= deadline {
            panic!("timed out waiting for {what}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
