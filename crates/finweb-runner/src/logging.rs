//! Tracing setup for a test run

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise everything at `info` and up.
/// Calling this twice is a no-op rather than a panic, since some runner
/// adapters invoke the run-level hooks once per suite.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init();
}
