//! Configuration System using Figment
//!
//! Configuration is loaded from:
//! 1. a TOML file (default `config/ssg3021x.toml`)
//! 2. environment variables prefixed with `SSG_`, nested keys separated by `__`
//!
//! ```text
//! SSG_CONNECTION__HOST=192.168.1.50
//! SSG_CONNECTION__PORT=5025
//! SSG_CONNECTION__READ_TIMEOUT_MS=2000
//! SSG_LOGGING__LEVEL=debug
//! ```
//!
//! The file layout mirrors [`Ssg3021xConfig`]:
//!
//! ```toml
//! [connection]
//! host = "192.168.1.50"
//! port = 5025
//! connect_timeout_ms = 5000
//! read_timeout_ms = 5000
//!
//! [logging]
//! level = "info"
//! ```
//!
//! # Example
//!
//! ```no_run
//! use ssg3021x::config::Ssg3021xConfig;
//!
//! # fn main() -> ssg3021x::AppResult<()> {
//! let config = Ssg3021xConfig::load_from("config/ssg3021x.toml")?;
//! let settings = config.connection_settings()?;
//! println!("Instrument at {}:{}", settings.host, settings.port);
//! # Ok(())
//! # }
//! ```

use crate::error::{AppResult, SsgError};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Raw SCPI socket port of the SSG3021X.
pub const DEFAULT_PORT: u16 = 5025;

/// Top-level configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ssg3021xConfig {
    /// Where the instrument lives and how long to wait for it
    pub connection: ConnectionConfig,
    /// Diagnostic output
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[connection]` section as written in the file.
///
/// The port is kept wide here so that a value such as `70000` is reported as a
/// validation error instead of a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Host name or IP address of the instrument
    pub host: String,
    /// TCP port
    #[serde(default = "default_port")]
    pub port: i64,
    /// Connect timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Reply timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub read_timeout_ms: u64,
}

/// `[logging]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_port() -> i64 {
    i64::from(DEFAULT_PORT)
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Ssg3021xConfig {
    /// Load configuration from `config/ssg3021x.toml` and the environment.
    pub fn load() -> AppResult<Self> {
        Self::load_from("config/ssg3021x.toml")
    }

    /// Load configuration from a specific file path, merged with `SSG_` environment
    /// overrides, and validate it.
    ///
    /// A missing file is not an error on its own; the environment may provide
    /// every required key.
    pub fn load_from<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let config: Self = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("SSG_").split("__"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    ///
    /// Checks:
    /// - host is not empty
    /// - port is within 1-65535
    /// - both timeouts are non-zero
    /// - log level is one of trace, debug, info, warn, error
    pub fn validate(&self) -> AppResult<()> {
        self.connection_settings()?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(SsgError::Validation(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_levels.join(", ")
            )));
        }

        Ok(())
    }

    /// Build the runtime connection settings from the `[connection]` section.
    pub fn connection_settings(&self) -> AppResult<ConnectionSettings> {
        let c = &self.connection;
        let port = u16::try_from(c.port)
            .ok()
            .filter(|p| *p != 0)
            .ok_or_else(|| SsgError::Validation(format!("Port {} is invalid", c.port)))?;

        let settings = ConnectionSettings::new(c.host.clone(), port)
            .with_connect_timeout(Duration::from_millis(c.connect_timeout_ms))
            .with_read_timeout(Duration::from_millis(c.read_timeout_ms));
        settings.validate()?;
        Ok(settings)
    }
}

/// Validated address and timeouts used by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Host name or IP address
    pub host: String,
    /// TCP port (1-65535)
    pub port: u16,
    /// Upper bound on establishing the socket
    pub connect_timeout: Duration,
    /// Upper bound on receiving one complete reply
    pub read_timeout: Duration,
}

impl ConnectionSettings {
    /// Settings for `host:port` with 5 s connect and read timeouts.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            connect_timeout: Duration::from_millis(default_timeout_ms()),
            read_timeout: Duration::from_millis(default_timeout_ms()),
        }
    }

    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the reply timeout
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Reject an empty host, port 0 and zero timeouts.
    pub fn validate(&self) -> AppResult<()> {
        validate_address(&self.host, self.port)?;
        if self.connect_timeout.is_zero() || self.read_timeout.is_zero() {
            return Err(SsgError::Validation(
                "Timeouts must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Checks shared by configuration loading and `connect_to`.
pub(crate) fn validate_address(host: &str, port: u16) -> AppResult<()> {
    if host.trim().is_empty() {
        return Err(SsgError::Validation(format!("Address '{host}' is invalid")));
    }
    if port == 0 {
        return Err(SsgError::Validation(format!("Port {port} is invalid")));
    }
    Ok(())
}
