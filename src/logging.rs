//! Logging initialization on top of `tracing`
//!
//! The embedding application decides when (and whether) to install a
//! subscriber; nothing in the crate logs through anything but the `tracing`
//! macros.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Install the process-wide subscriber.
///
/// RUST_LOG takes precedence over the configured level, so operators can
/// raise verbosity without touching configuration files.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("libris={}", config.level)));

    let builder = fmt().with_env_filter(filter).with_target(true);

    match config.format.as_str() {
        "json" => builder.json().init(),
        _ => builder.init(),
    }
}

/// Subscriber for tests: captured output, tolerant of repeated calls.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
