//! Tracing setup shared by the binaries.
//!
//! Output goes to stderr: `slidecast compose` and `render` print documents
//! and JSON outcomes on stdout.

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Targets that log at the configured level. Everything else (tokio,
/// dependencies) stays at `warn`.
const SLIDECAST_TARGETS: &[&str] = &[
    "slidecast",
    "slidecast_common",
    "slidecast_slide_model",
    "slidecast_timeline",
    "slidecast_capture_engine",
];

/// Filter directives for `level`, e.g. `warn,slidecast=debug,...`.
pub fn filter_directives(level: &str) -> String {
    let mut directives = String::from("warn");
    for target in SLIDECAST_TARGETS {
        directives.push_str(&format!(",{target}={level}"));
    }
    directives
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// configured level. Calling this twice leaves the first subscriber in place.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directives(&config.level)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

/// Initialize logging with defaults (useful for tests and quick scripts).
pub fn init_default_logging() {
    init_logging(&LoggingConfig::default());
}
