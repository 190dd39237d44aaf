//! Browser console logging for the hooks and the fetcher underneath them.

use tracing_subscriber::{EnvFilter, prelude::*};
use tracing_web::MakeWebConsoleWriter;

const DEFAULT_DIRECTIVES: &str = "error,ui=debug,fetcher=debug";

/// Route `tracing` output to the javascript console.
pub fn init_logging() {
    init_logging_with(DEFAULT_DIRECTIVES);
}

/// Same as [`init_logging`] with explicit filter directives. Only the first
/// call installs a subscriber, so every component root may call it.
pub fn init_logging_with(directives: &str) {
    let console = tracing_subscriber::fmt::layer()
        .with_line_number(true)
        .with_ansi(false) // Only partially supported across browsers
        .without_time() // std::time is not available in browsers
        .with_writer(MakeWebConsoleWriter::new().with_pretty_level())
        .with_level(false);

    let installed = tracing_subscriber::registry()
        .with(EnvFilter::new(directives))
        .with(console)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(directives, "Initialized console logging");
    }
}
