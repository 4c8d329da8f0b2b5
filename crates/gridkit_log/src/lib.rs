//! `gridkit_log` v1:
//! Process-wide `tracing` subscriber setup for binaries and tests.

use tracing_subscriber::EnvFilter;

/// Default directive when neither `RUST_LOG` nor a caller level is usable.
pub const C_LEVEL_DEFAULT: &str = "info";

/// Build the filter: `RUST_LOG` when set and valid, else `level`.
pub fn derive_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new(C_LEVEL_DEFAULT))
}

/// Install a stderr fmt subscriber.
///
/// Returns `false` when a global subscriber is already installed; the existing
/// one is kept.
pub fn init_logging(level: &str) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(derive_env_filter(level))
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok()
}
