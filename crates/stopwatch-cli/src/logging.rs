//! Logging setup using `tracing-subscriber`.
//!
//! Logs go to stderr so stdout stays clean for JSON output. `STOPWATCH_LOG`
//! takes an `EnvFilter` directive and overrides the `-v`/`-q` flags.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "STOPWATCH_LOG";

fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

pub fn init_logging(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    // A second init (e.g. in tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .without_time()
        .try_init();
}
