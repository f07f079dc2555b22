//! Shared helpers for procmux's integration tests.

pub mod builders;
pub mod fake_launcher;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

/// Upper bound for any single supervisor run in tests.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(10);

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
///
/// Runner and capturer diagnostics then show up next to a failing test's
/// output. Filter with `PROCMUX_LOG` (e.g. `PROCMUX_LOG=procmux=debug`);
/// defaults to `info`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_env("PROCMUX_LOG")
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Await `fut`, failing the test if it takes longer than [`TEST_TIMEOUT`].
///
/// A hung supervisor (a missing `End`, an unjoined task) then fails instead of
/// stalling the suite.
pub async fn with_timeout<F: Future>(fut: F) -> F::Output {
    match tokio::time::timeout(TEST_TIMEOUT, fut).await {
        Ok(out) => out,
        Err(_) => panic!("supervisor run did not finish within {TEST_TIMEOUT:?}"),
    }
}
