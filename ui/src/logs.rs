//! Logging to the javascript console.

use tracing_subscriber::{EnvFilter, prelude::*};
use tracing_web::MakeWebConsoleWriter;

const FILTER: &str = "error,ui=debug,client_state=debug,payloads=info";

/// Install the console subscriber. Safe to call more than once; only the
/// first call has any effect.
pub fn init_logging() {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_line_number(true)
        .with_ansi(false) // Only partially supported across browsers
        .without_time() // std::time is not available in browsers
        .with_writer(MakeWebConsoleWriter::new().with_pretty_level())
        .with_level(false);

    let installed = tracing_subscriber::registry()
        .with(EnvFilter::new(FILTER))
        .with(fmt_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("Initialized logs");
    }
}
