//! Siglent SSG3021X RF signal generator driver
//!
//! Speaks the instrument's SCPI dialect over a [`Transport`] (raw TCP on port 5025
//! by default). Every getter re-queries the instrument and every setter is a
//! write without read-back; nothing is cached besides the identity read at connect.
//!
//! ## Commands
//!
//! | Operation           | Command                               | Reply         |
//! |---------------------|---------------------------------------|---------------|
//! | identity            | `*IDN?`                               | 4 fields      |
//! | set / get frequency | `FREQ <hz>` / `FREQ?`                 | Hz as float   |
//! | set / get power     | `POW <dbm>` / `POW?`                  | dBm as float  |
//! | set / get RF output | `:OUTP ON`, `:OUTP OFF` / `:OUTP?`    | `1` when on   |
//!
//! ## Example
//!
//! ```no_run
//! use ssg3021x::prelude::*;
//!
//! # async fn example() -> ssg3021x::AppResult<()> {
//! let mut ssg = Ssg3021x::new(ConnectionSettings::new("192.168.1.50", 5025))?;
//! ssg.connect().await?;
//! ssg.set_frequency(1.0e9).await?;
//! ssg.set_amplitude(-10.0).await?;
//! ssg.set_output_enabled(true).await?;
//! let hz = ssg.get_frequency().await?;
//! println!("Serial {:?} at {hz} Hz", ssg.serial_number());
//! ssg.disconnect().await?;
//! # Ok(())
//! # }
//! ```

use super::capabilities::{DeviceCapabilities, FunctionGeneratorDevice, Waveform};
use super::identity::Identity;
use crate::adapters::{TcpTransport, Transport};
use crate::config::{validate_address, ConnectionSettings, Ssg3021xConfig};
use crate::error::{AppResult, SsgError};
use crate::session::Session;
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// SSG3021X instrument implementation
pub struct Ssg3021x<T = TcpTransport> {
    settings: ConnectionSettings,
    transport: T,
    capabilities: DeviceCapabilities,
    identity: Option<Identity>,
}

impl Ssg3021x<TcpTransport> {
    /// Driver for the instrument at `settings.host:settings.port` over TCP.
    pub fn new(settings: ConnectionSettings) -> AppResult<Self> {
        let transport = TcpTransport::from_settings(&settings);
        Self::with_transport(settings, transport)
    }

    /// Driver built from a loaded configuration file.
    pub fn from_config(config: &Ssg3021xConfig) -> AppResult<Self> {
        Self::new(config.connection_settings()?)
    }
}

impl<T: Transport> Ssg3021x<T> {
    /// Driver over an arbitrary transport (e.g. [`MockTransport`] in tests).
    ///
    /// [`MockTransport`]: crate::adapters::MockTransport
    pub fn with_transport(settings: ConnectionSettings, transport: T) -> AppResult<Self> {
        Self::with_capabilities(settings, transport, DeviceCapabilities::ssg3021x())
    }

    /// Driver declaring `capabilities` to the [`FunctionGenerator`] front-end.
    ///
    /// Use this to narrow the usable range, e.g. to protect a device under test.
    ///
    /// [`FunctionGenerator`]: crate::instrument::FunctionGenerator
    pub fn with_capabilities(
        settings: ConnectionSettings,
        transport: T,
        capabilities: DeviceCapabilities,
    ) -> AppResult<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            transport,
            capabilities,
            identity: None,
        })
    }

    /// Address and timeouts used by [`connect`](FunctionGeneratorDevice::connect).
    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Identity read during connect, `None` while disconnected.
    ///
    /// The transport may drop a broken link on its own, so this also checks the
    /// live connection state.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity
            .as_ref()
            .filter(|_| self.transport.is_connected())
    }

    /// Serial number reported by the connected instrument.
    pub fn serial_number(&self) -> Option<&str> {
        self.identity().map(|id| id.serial.as_str())
    }

    /// Firmware version `[major, minor, patch, revision]` of the connected instrument.
    pub fn firmware_version(&self) -> Option<&[String; 4]> {
        self.identity().map(|id| &id.version)
    }

    /// Replace the stored address, then connect.
    ///
    /// Ignored when already connected, like [`connect`](FunctionGeneratorDevice::connect).
    pub async fn connect_to(&mut self, host: &str, port: u16) -> AppResult<()> {
        if self.transport.is_connected() {
            debug!(host, port, "already connected, keeping current address");
            return Ok(());
        }
        validate_address(host, port)?;
        self.settings.host = host.to_string();
        self.settings.port = port;
        self.open().await
    }

    /// Query `*IDN?` and validate the reply.
    pub async fn identity_query(&mut self) -> AppResult<Identity> {
        let reply = self.transport.query("*IDN?").await?;
        Identity::parse(&reply)
    }

    /// Connect and wrap the driver in a [`Session`] that closes it on every exit path.
    ///
    /// Fails with [`SsgError::Validation`] when the driver is already connected:
    /// a scoped session must own the connection it closes.
    pub async fn open_session(mut self) -> AppResult<Session<T>> {
        if self.transport.is_connected() {
            return Err(SsgError::Validation(
                "Cannot open a scoped session on an already connected device".to_string(),
            ));
        }
        self.open().await?;
        Ok(Session::new(self))
    }

    /// Synchronous teardown for automatic cleanup paths.
    pub(crate) fn close_now(&mut self) {
        self.transport.close_now();
        self.identity = None;
    }

    async fn open(&mut self) -> AppResult<()> {
        self.transport
            .connect(&self.settings.host, self.settings.port)
            .await?;

        match self.identity_query().await {
            Ok(identity) => {
                info!(
                    serial = %identity.serial,
                    firmware = %identity.version_string(),
                    info = %self.transport.info(),
                    "SSG3021X connected"
                );
                self.identity = Some(identity);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "identity check failed, closing connection");
                if let Err(close_err) = self.transport.disconnect().await {
                    warn!(error = %close_err, "failed to close unverified connection");
                }
                Err(e)
            }
        }
    }

    fn ensure_connected(&self) -> AppResult<()> {
        if self.transport.is_connected() {
            Ok(())
        } else {
            Err(SsgError::NotConnected)
        }
    }

    async fn query_f64(&mut self, command: &str) -> AppResult<f64> {
        self.ensure_connected()?;
        let reply = self.transport.query(command).await?;
        reply
            .parse::<f64>()
            .map_err(|e| SsgError::Parse(format!("'{reply}' from {command}: {e}")))
    }
}

/// Range limits are enforced by the front-end; the driver only refuses values that
/// cannot be rendered as a number on the wire.
fn ensure_finite(what: &str, value: f64) -> AppResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SsgError::Validation(format!("{what} {value} is not a finite number")))
    }
}

#[async_trait]
impl<T: Transport> FunctionGeneratorDevice for Ssg3021x<T> {
    fn capabilities(&self) -> &DeviceCapabilities {
        &self.capabilities
    }

    async fn connect(&mut self) -> AppResult<()> {
        if self.transport.is_connected() {
            return Ok(());
        }
        self.open().await
    }

    async fn disconnect(&mut self) -> AppResult<()> {
        self.identity = None;
        self.transport.disconnect().await
    }

    fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    async fn get_frequency(&mut self) -> AppResult<f64> {
        self.query_f64("FREQ?").await
    }

    async fn set_frequency(&mut self, hz: f64) -> AppResult<()> {
        self.ensure_connected()?;
        ensure_finite("Frequency", hz)?;
        self.transport.send_command(&format!("FREQ {hz}")).await
    }

    async fn get_amplitude(&mut self) -> AppResult<f64> {
        self.query_f64("POW?").await
    }

    async fn set_amplitude(&mut self, dbm: f64) -> AppResult<()> {
        self.ensure_connected()?;
        ensure_finite("Amplitude", dbm)?;
        self.transport.send_command(&format!("POW {dbm}")).await
    }

    async fn is_output_enabled(&mut self) -> AppResult<bool> {
        self.ensure_connected()?;
        let reply = self.transport.query(":OUTP?").await?;
        let state: i64 = reply
            .parse()
            .map_err(|e| SsgError::Parse(format!("'{reply}' from :OUTP?: {e}")))?;
        Ok(state == 1)
    }

    async fn set_output_enabled(&mut self, enabled: bool) -> AppResult<()> {
        self.ensure_connected()?;
        let command = if enabled { ":OUTP ON" } else { ":OUTP OFF" };
        self.transport.send_command(command).await
    }

    async fn get_waveform(&mut self) -> AppResult<Waveform> {
        self.ensure_connected()?;
        Ok(Waveform::Sine)
    }

    async fn set_waveform(&mut self, _waveform: Waveform) -> AppResult<()> {
        // Sine only; the front-end filters everything else.
        self.ensure_connected()
    }
}
