//! Diagnostic logging setup
//!
//! Stdout belongs to the wire, so every diagnostic goes to stderr. Filtering
//! follows `RUST_LOG` when set and defaults to info for the sluice crates.

use tracing_subscriber::EnvFilter;

/// Initialize logging for a command binary. Safe to call more than once;
/// later calls are no-ops.
pub fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sluice=info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
