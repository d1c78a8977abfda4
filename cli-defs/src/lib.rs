//! Shared CLI type definitions for wifi-telemetry build and runtime.
//!
//! This crate provides CLI argument types used by both the `build.rs` script
//! (for man page generation) and the runtime binary. Every flag is optional:
//! values the user did not pass are skipped during serialisation so they do
//! not mask configuration files or environment variables when the runtime
//! layers its configuration sources.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

/// Default serial device the receiver listens on.
pub const DEFAULT_PORT: &str = "/dev/serial0";
/// Default line speed recorded for the serial device.
pub const DEFAULT_BAUD_RATE: u32 = 9600;
/// Default per-read timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;
/// Default period between simulated packets in milliseconds.
pub const DEFAULT_INTERVAL_MS: u64 = 1000;
/// Default log filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Rendering used for decoded records on stdout.
#[derive(ValueEnum, Serialize, Deserialize, Default, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Multi-line human readable block per record.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Configuration flags shared by every subcommand.
#[derive(Args, Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct AppConfigArgs {
    /// Serial device or file to read from (or write to when simulating).
    #[arg(long, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    /// Line speed of the serial device.
    #[arg(long, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baud_rate: Option<u32>,
    /// Per-read timeout in milliseconds.
    #[arg(long, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Output format for decoded records.
    #[arg(long, global = true, value_enum)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,
    /// Log filter used when `RUST_LOG` is unset (for example `debug`).
    #[arg(long, global = true)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

/// Arguments for the `simulate` subcommand.
#[derive(Args, Serialize, Deserialize, Default, Debug, Clone, PartialEq, Eq)]
pub struct SimulateArgs {
    /// Milliseconds between generated packets.
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_ms: Option<u64>,
    /// Number of packets to send before exiting (0 sends forever).
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

/// CLI subcommands exposed by `wifi-telemetry`.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Receive, validate and print packets (the default).
    Listen,
    /// Emit randomly generated packets to the configured port.
    Simulate(SimulateArgs),
}

/// Top-level CLI entry point consumed by binaries.
#[derive(Parser, Debug, Clone)]
#[command(name = "wifi-telemetry", author, version, about)]
pub struct Cli {
    /// Configuration file (TOML). Defaults to `.wifi-telemetry.toml` when present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// CLI configuration overrides (merged with files and environment at runtime).
    #[command(flatten)]
    pub args: AppConfigArgs,
    /// Optional subcommand; `listen` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}
