//! Binary entry point for `wifi-telemetry`.
//!
//! Argument parsing and dispatch live in `wifi_telemetry::app`; this binary
//! only delegates to it.

use anyhow::Result;

fn main() -> Result<()> { wifi_telemetry::app::run() }
