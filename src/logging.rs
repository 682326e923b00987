use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive, e.g. `fuelbook=debug`.
pub const LOG_ENV: &str = "FUELBOOK_LOG";

const DEFAULT_FILTER: &str = "fuelbook=info";

/// Install the global subscriber. Logs go to stderr so stdout stays parseable.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    // try_init: a subscriber may already be installed (tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
