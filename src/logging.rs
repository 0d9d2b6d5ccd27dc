//! Process-wide logging setup

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber. `level` is an `EnvFilter`
/// directive such as `info` or `modex=debug`; an invalid directive falls back
/// to `info`. Calling this more than once is a no-op.
pub fn init(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init();
}
