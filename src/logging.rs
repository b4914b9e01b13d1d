//! Console logging setup.

use tracing_subscriber::EnvFilter;

/// Filter used when neither `--log-level` nor `RUST_LOG` is given.
pub const DEFAULT_FILTER: &str = "info";

/// Install the global `tracing` subscriber, writing to stderr.
///
/// `level` takes precedence over `RUST_LOG`. An unparsable filter falls
/// back to [`DEFAULT_FILTER`]. Calling this more than once is harmless.
pub fn init(level: Option<&str>) {
    let filter = match level {
        Some(directives) => EnvFilter::try_new(directives).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
