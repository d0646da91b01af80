use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `MEND_LOG=debug`.
pub const LOG_ENV: &str = "MEND_LOG";

/// Route tracing logs to stderr so stdout stays reserved for the JSON result.
pub fn setup_stderr_logger(verbose: bool) {
    let fallback = if verbose { "mend=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .without_time()
        .with_file(false)
        .with_line_number(false)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
