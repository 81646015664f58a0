use tracing_subscriber::{fmt, EnvFilter};

/// Install the tracing subscriber used by both binaries.
/// - Respects `RUST_LOG` if set, otherwise `default_filter`
/// - Writes to stderr so CLI output on stdout stays clean
/// - Safe to call twice (second call is ignored)
pub fn init_logging(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .try_init();
}
