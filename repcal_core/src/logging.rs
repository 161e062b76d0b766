//! Tracing setup for the `repcal` binary and the core unit tests.
//!
//! Everything is written to stderr so that checklists, calendars and stats
//! on stdout can be piped or captured by tests without log noise.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the subscriber used by `repcal`
///
/// Only warnings show by default, which covers degraded loads and
/// suspicious routine data. `RUST_LOG=repcal_core=debug` shows every toggle
/// and store write.
pub fn init() {
    init_with_level("warn")
}

/// Install a compact stderr subscriber with `default_level` as the filter
///
/// `RUST_LOG` takes precedence when set. Panics if a global subscriber is
/// already installed, so call it once at startup.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Route debug output through the test harness; safe to call from every test
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
