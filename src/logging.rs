//! Logging setup
//!
//! `tracing` events go to stderr so stdout stays clean for reports and JSON.
//! `RUST_LOG` wins when set; otherwise the level comes from `--verbose`.

use tracing_subscriber::{fmt, EnvFilter};

/// Default filter when RUST_LOG is unset
pub const DEFAULT_FILTER: &str = "warn";

/// Filter used by `--verbose`
pub const VERBOSE_FILTER: &str = "holiday_sync=debug,info";

/// Install the global subscriber
pub fn init(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Debug-level subscriber that writes through the test harness
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
