//! `axiomkit_log`: process-wide `tracing` subscriber setup for axiomkit binaries and bridges.

use tracing_subscriber::EnvFilter;

/// Default filter when neither `RUST_LOG` nor a caller level is usable.
pub const C_LOG_LEVEL_DEFAULT: &str = "info";

/// Build the filter: `RUST_LOG` wins, then `level`, then [`C_LOG_LEVEL_DEFAULT`].
pub fn derive_env_filter(level: Option<&str>) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    level
        .and_then(|val| EnvFilter::try_new(val).ok())
        .unwrap_or_else(|| EnvFilter::new(C_LOG_LEVEL_DEFAULT))
}

/// Install a stderr `fmt` subscriber.
///
/// Returns `false` when a global subscriber was already installed; the existing
/// one is kept.
pub fn init_logging(level: Option<&str>) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(derive_env_filter(level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}
