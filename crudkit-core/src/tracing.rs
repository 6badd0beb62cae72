//! Tracing bootstrap.
//!
//! Call once at process start; repeated calls are no-ops so tests can call
//! this freely.

use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber from `RUST_LOG`, defaulting to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
