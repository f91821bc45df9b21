//! Optional tracing subscriber setup.
//!
//! The driver only emits `tracing` events; nothing here is required for it to work.
//! Applications that do not install their own subscriber can call [`init_tracing`].

use tracing_subscriber::EnvFilter;

/// Install a formatted subscriber filtered at `level`.
///
/// `RUST_LOG`, when set, takes precedence over `level`. Returns `false` if a global
/// subscriber was already installed, in which case nothing changes.
pub fn init_tracing(level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
