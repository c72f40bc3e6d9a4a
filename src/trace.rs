use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable that overrides the default `info` log level, using
/// the usual env-filter directive syntax.
pub const LOG_ENV: &str = "FLOWTAG_LOG";

/// Installs the global tracing subscriber.
///
/// Called once at program start rather than at module load. Logs go to
/// stderr; the report file is the only other output channel.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
