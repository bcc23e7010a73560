//! Logging configuration
//!
//! Initializes tracing for tools built on the DSL.

use super::Config;

/// Installs a fmt subscriber filtered by `RUST_LOG`, or by the configured level.
///
/// Returns false if a global subscriber was already installed.
pub fn init_logging(config: &Config) -> bool {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_line_number(true)
        .try_init()
        .is_ok()
}
