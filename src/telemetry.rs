//! Tracing subscriber setup.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs a global tracing subscriber with env-filter support.
///
/// Filtering follows `RUST_LOG`, defaulting to `info`. Calling this more
/// than once is a no-op, which keeps it safe in tests and embedders that
/// install their own subscriber.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init();
}
