use anyhow::{anyhow, Context, Result};
use cinerank_core::config::{LogFormat, LoggingConfig};
use tracing::Level;

/// Installs the global subscriber. Events go to stderr so stdout carries only
/// the command payload.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = config
        .level
        .parse::<Level>()
        .with_context(|| format!("invalid log level `{}`", config.level))?;

    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr);

    match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
    .map_err(|error| anyhow!(error))
    .context("failed to install tracing subscriber")
}
