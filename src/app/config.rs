//! Layered runtime configuration.
//!
//! Sources are merged lowest to highest: compiled defaults, a TOML file,
//! `WIFI_TELEMETRY_*` environment variables and finally command-line flags.
//! Flags the user did not pass never mask lower layers because
//! [`cli_defs`] skips unset options when serialising.

use std::{path::Path, time::Duration};

use cli_defs::{
    Cli,
    Commands,
    DEFAULT_BAUD_RATE,
    DEFAULT_INTERVAL_MS,
    DEFAULT_LOG_LEVEL,
    DEFAULT_PORT,
    DEFAULT_TIMEOUT_MS,
    OutputFormat,
};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::source::{DeviceConfig, DeviceError};

/// Configuration file picked up from the working directory when present.
pub const CONFIG_FILE: &str = ".wifi-telemetry.toml";
/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "WIFI_TELEMETRY_";
/// Port value that selects stdin (listen) or stdout (simulate).
pub const STDIO_PORT: &str = "-";

/// Errors raised while resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested configuration file does not exist.
    #[error("configuration file {0} not found")]
    MissingFile(String),
    /// A layer could not be parsed or holds a value of the wrong type.
    #[error("invalid configuration: {0}")]
    Load(#[from] Box<figment::Error>),
    /// The simulator interval is zero.
    #[error("interval_ms must be greater than zero")]
    ZeroInterval,
    /// The device settings are invalid.
    #[error(transparent)]
    Device(#[from] DeviceError),
}

/// Fully resolved settings for every subcommand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Serial device or file (`-` for stdio).
    pub port: String,
    /// Line speed recorded for the device.
    pub baud_rate: u32,
    /// Per-read timeout in milliseconds.
    pub timeout_ms: u64,
    /// Output format for decoded records.
    pub format: OutputFormat,
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Milliseconds between simulated packets.
    pub interval_ms: u64,
    /// Simulated packets to send (0 for unlimited).
    pub count: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_owned(),
            baud_rate: DEFAULT_BAUD_RATE,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            format: OutputFormat::default(),
            log_level: DEFAULT_LOG_LEVEL.to_owned(),
            interval_ms: DEFAULT_INTERVAL_MS,
            count: 0,
        }
    }
}

impl AppConfig {
    /// Resolve configuration for a parsed command line.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingFile`] when `--config` names a missing
    /// file, [`ConfigError::Load`] when a layer fails to parse and
    /// [`ConfigError::ZeroInterval`] when `simulate` runs with a zero interval.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) if !path.exists() => {
                return Err(ConfigError::MissingFile(path.display().to_string()));
            }
            Some(path) => path.as_path(),
            None => Path::new(CONFIG_FILE),
        };

        let mut figment = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(&cli.args));
        let simulating = matches!(cli.command, Some(Commands::Simulate(_)));
        if let Some(Commands::Simulate(args)) = &cli.command {
            figment = figment.merge(Serialized::defaults(args));
        }

        let config: Self = figment.extract().map_err(Box::new)?;
        if simulating && config.interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(config)
    }

    /// Per-read timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration { Duration::from_millis(self.timeout_ms) }

    /// Period between simulated packets as a [`Duration`].
    #[must_use]
    pub const fn interval(&self) -> Duration { Duration::from_millis(self.interval_ms) }

    /// Returns `true` when the port selects stdin/stdout.
    #[must_use]
    pub fn uses_stdio(&self) -> bool { self.port == STDIO_PORT }

    /// Build the device configuration for [`DeviceSource`](crate::source::DeviceSource).
    ///
    /// # Errors
    /// Returns [`ConfigError::Device`] for an empty port or zero timeout.
    pub fn device_config(&self) -> Result<DeviceConfig, ConfigError> {
        Ok(DeviceConfig::new(
            self.port.as_str(),
            self.baud_rate,
            self.timeout(),
        )?)
    }
}
