//! Diagnostic logging setup for the binary.
//!
//! Diagnostics go to stderr through `tracing-subscriber`; stdout is reserved
//! for decoded records. `RUST_LOG` wins over the configured level. Colour is
//! only used when stderr is a terminal.

use std::io::{self, IsTerminal};

use anyhow::{Context, Result, anyhow};
use tracing::Subscriber;
use tracing_subscriber::{EnvFilter, fmt::MakeWriter, util::SubscriberInitExt};

/// Build the event filter from `RUST_LOG`, falling back to `default_level`.
///
/// # Errors
/// Returns an error when neither `RUST_LOG` nor `default_level` is a valid
/// filter directive.
pub fn filter(default_level: &str) -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .with_context(|| format!("invalid log level {default_level:?}"))
}

/// Build the fmt subscriber used by the binary.
///
/// `ansi` controls colour escapes and should reflect whether the sink is a
/// terminal.
///
/// # Errors
/// Returns an error when the level filter is invalid.
pub fn subscriber<W>(
    default_level: &str,
    writer: W,
    ansi: bool,
) -> Result<impl Subscriber + Send + Sync + 'static>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    Ok(tracing_subscriber::fmt()
        .with_env_filter(filter(default_level)?)
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(false)
        .finish())
}

/// Install the global subscriber on stderr.
///
/// # Errors
/// Returns an error if the filter is invalid or a global subscriber is
/// already installed.
pub fn init(default_level: &str) -> Result<()> {
    subscriber(default_level, io::stderr, io::stderr().is_terminal())?
        .try_init()
        .map_err(|err| anyhow!(err))
        .context("failed to install log subscriber")
}
