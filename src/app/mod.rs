//! Command-line application wiring.
//!
//! Binary crates stay thin wrappers that only call [`run`]; everything else
//! (configuration layering, logging setup and the two subcommands) lives
//! here so tests and alternative front ends can reuse it.

pub mod config;
pub mod listen;
pub mod logging;
pub mod render;
pub mod simulate;

use std::{
    process,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use anyhow::{Context, Result};
use clap::Parser;
pub use cli_defs::{Cli, Commands, OutputFormat};
pub use config::{AppConfig, ConfigError};
use tokio::runtime::Builder;
use tracing::{info, warn};

/// Exit status used when a second interrupt forces the process down.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Parse CLI arguments and execute the requested subcommand.
///
/// # Errors
/// Returns any error raised while resolving configuration or running the
/// subcommand.
pub fn run() -> Result<()> { run_with_cli(&Cli::parse()) }

/// Execute the application using an already parsed [`Cli`].
///
/// # Errors
/// Propagates configuration, logging and subcommand failures.
pub fn run_with_cli(cli: &Cli) -> Result<()> {
    let config = AppConfig::load(cli).context("failed to resolve configuration")?;
    logging::init(&config.log_level)?;
    match &cli.command {
        None | Some(Commands::Listen) => listen::run(&config),
        Some(Commands::Simulate(_)) => simulate::run(&config),
    }
}

/// Return a flag that is raised when the process receives Ctrl-C.
///
/// The signal is awaited on a dedicated thread with its own single-threaded
/// runtime; loops poll the flag between cycles. A second Ctrl-C exits the
/// process immediately with status 130.
///
/// # Errors
/// Returns an error if the signal runtime or thread cannot be started.
pub fn shutdown_flag() -> Result<Arc<AtomicBool>> {
    let flag = Arc::new(AtomicBool::new(false));
    let raised = Arc::clone(&flag);
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start signal runtime")?;
    thread::Builder::new()
        .name("shutdown-signal".into())
        .spawn(move || {
            runtime.block_on(async {
                if let Err(err) = tokio::signal::ctrl_c().await {
                    warn!(error = %err, "cannot listen for interrupts");
                    return;
                }
                info!("interrupt received; stopping after the current cycle");
                raised.store(true, Ordering::SeqCst);
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("second interrupt received; exiting");
                    process::exit(INTERRUPTED_EXIT_CODE);
                }
            });
        })
        .context("failed to spawn signal thread")?;
    Ok(flag)
}
