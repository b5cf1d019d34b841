// packages/core/src/observability/mod.rs
//! Logging setup
//!
//! Two entry points:
//!
//! - [`init_diagnostics`] for the preload library. Plain lines on stderr, no
//!   timestamps or targets, fixed `INFO` level, ANSI always off. No filter
//!   variable is consulted; the `fmt` builder still peeks at `NO_COLOR`
//!   while constructing its default layer, but `with_ansi(false)` overrides
//!   whatever it finds, so the output never depends on it.
//! - [`init_tracing`] for the `tcpapp` binary, filtered through `RUST_LOG`.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Install the shim's diagnostic subscriber
///
/// Safe to call more than once; only the first call installs anything.
pub fn init_diagnostics() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_ansi(false)
        .without_time()
        .try_init();
}

/// Initialize tracing for the demo application
pub fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    Ok(())
}
