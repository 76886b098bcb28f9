//! Tracing setup.
//!
//! Diagnostics go to stderr; stdout is reserved for reports.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `AVS_LOG=debug`).
pub const LOG_ENV: &str = "AVS_LOG";

/// Initialize the global subscriber. Defaults to `warn` when `AVS_LOG` is unset.
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
