//! Logging setup for check_memory
//!
//! Log events go to stderr; stdout is reserved for the single status line
//! the supervisor parses.

use memprobe_common::Verbosity;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding the verbosity-derived filter
pub const LOG_ENV: &str = "MEMPROBE_LOG";

/// Filter from `MEMPROBE_LOG` if set and valid, else from verbosity
pub fn build_filter(verbosity: Verbosity, env_value: Option<&str>) -> EnvFilter {
    env_value
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(verbosity.log_directive()))
}

/// Install the global subscriber. Safe to call more than once.
pub fn init(verbosity: Verbosity) {
    let env_value = std::env::var(LOG_ENV).ok();
    let filter = build_filter(verbosity, env_value.as_deref());

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .compact()
        .try_init();
}
