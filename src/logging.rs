//! Tracing setup for applications embedding the panel.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "MDPANEL_LOG";

const DEFAULT_FILTER: &str = "mdpanel=info";

/// Install a fmt subscriber filtered by `MDPANEL_LOG` (default `mdpanel=info`).
/// Returns false when a global subscriber was already installed.
pub fn init_tracing() -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
