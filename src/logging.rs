//! Logging setup
//!
//! Logs go to stderr so stdout carries only the JSON result. `RUST_LOG`
//! overrides the default `warn` level.

use tracing_subscriber::EnvFilter;

pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
