//! Diagnostic output on stderr.
//!
//! Library crates log through the `log` facade; the subscriber installed
//! here picks those records up alongside the CLI's own `tracing` events.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive, e.g.
/// `SKUCALC_LOG=skucalc_io=debug`.
pub const LOG_ENV: &str = "SKUCALC_LOG";

/// `-q` and `-v` win over the environment; otherwise `SKUCALC_LOG`, then `warn`.
pub fn filter_directive(verbose: bool, quiet: bool) -> Option<&'static str> {
    if quiet {
        Some("error")
    } else if verbose {
        Some("debug")
    } else {
        None
    }
}

pub fn init(verbose: bool, quiet: bool) {
    let filter = match filter_directive(verbose, quiet) {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    // A second init (tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
