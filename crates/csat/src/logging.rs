#![forbid(unsafe_code)]

//! Subscriber setup for the binary. Libraries only emit events.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

use crate::config::LogConfig;

/// Filter from `env` when present and non-empty, else from the config.
pub fn build_filter(config: &LogConfig, env: Option<&str>) -> Result<EnvFilter, ParseError> {
    match env.map(str::trim).filter(|directives| !directives.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives),
        None => EnvFilter::try_new(&config.filter),
    }
}

/// Install the global subscriber, writing to stderr.
///
/// A second call is a no-op; the first subscriber stays in place.
pub fn init(config: &LogConfig) -> Result<(), ParseError> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(config, env.as_deref())?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}
