//! Logging bootstrap for unit tests.

use tracing_subscriber::EnvFilter;

/// Initialize a test-friendly subscriber once per process. Safe to
/// call repeatedly; later calls are no-ops.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}
