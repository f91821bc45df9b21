//! Mock transport for testing
//!
//! Simulates an SSG3021X in-process so the driver can be exercised without
//! hardware. It provides:
//! - Stored instrument state (frequency, power, output) updated by set commands
//!   and replayed by queries
//! - Canned replies for arbitrary commands (malformed identities, bad numbers)
//! - Controllable failure injection
//! - Call logging for test verification
//!
//! Clones share state, so a test can keep a handle after moving the transport into
//! a driver.

use super::close_once::CloseOnce;
use super::Transport;
use crate::error::{AppResult, SsgError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Identity reply of a healthy simulated instrument.
pub const MOCK_IDENTITY: &str = "Siglent Technologies,SSG3021X,SSG3XBAQ000001,2.2.1R5";

#[derive(Debug)]
struct SimulatedInstrument {
    identity: String,
    frequency_hz: f64,
    amplitude_dbm: f64,
    output_enabled: bool,
    canned: HashMap<String, String>,
}

impl Default for SimulatedInstrument {
    fn default() -> Self {
        Self {
            identity: MOCK_IDENTITY.to_string(),
            frequency_hz: 1.0e9,
            amplitude_dbm: -20.0,
            output_enabled: false,
            canned: HashMap::new(),
        }
    }
}

impl SimulatedInstrument {
    fn apply(&mut self, command: &str) {
        let (header, argument) = match command.split_once(' ') {
            Some((h, a)) => (h, a.trim()),
            None => (command, ""),
        };

        match header {
            "FREQ" => {
                if let Ok(hz) = argument.parse() {
                    self.frequency_hz = hz;
                }
            }
            "POW" => {
                if let Ok(dbm) = argument.parse() {
                    self.amplitude_dbm = dbm;
                }
            }
            ":OUTP" => match argument {
                "ON" => self.output_enabled = true,
                "OFF" => self.output_enabled = false,
                _ => {}
            },
            _ => {}
        }
    }

    fn reply(&self, command: &str) -> String {
        if let Some(reply) = self.canned.get(command) {
            return reply.clone();
        }

        match command {
            "*IDN?" => self.identity.clone(),
            "FREQ?" => self.frequency_hz.to_string(),
            "POW?" => self.amplitude_dbm.to_string(),
            ":OUTP?" => u8::from(self.output_enabled).to_string(),
            _ => String::new(),
        }
    }
}

/// Mock transport for testing
///
/// # Example
///
/// ```
/// use ssg3021x::adapters::{MockTransport, Transport};
///
/// # tokio_test::block_on(async {
/// let mut transport = MockTransport::new();
/// transport.connect("mock", 5025).await.unwrap();
/// transport.send_command("FREQ 2000000").await.unwrap();
/// assert_eq!(transport.query("FREQ?").await.unwrap(), "2000000");
/// # });
/// ```
#[derive(Clone, Default)]
pub struct MockTransport {
    connection: Arc<CloseOnce>,
    instrument: Arc<Mutex<SimulatedInstrument>>,
    should_fail_next: Arc<Mutex<Option<SsgErrorKind>>>,
    call_log: Arc<Mutex<Vec<String>>>,
}

/// Error kinds that can be injected into the next operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SsgErrorKind {
    /// Next operation fails with [`SsgError::Connection`]
    Connection,
    /// Next operation fails with [`SsgError::Timeout`]
    Timeout,
    /// Next operation fails with [`SsgError::ConnectionClosed`]
    ConnectionClosed,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockTransport {
    /// A disconnected simulated instrument with the default identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the reply to `*IDN?`.
    pub fn with_identity(self, identity: impl Into<String>) -> Self {
        lock(&self.instrument).identity = identity.into();
        self
    }

    /// Always answer `command` with `reply`, overriding the simulated state.
    pub fn with_reply(self, command: impl Into<String>, reply: impl Into<String>) -> Self {
        lock(&self.instrument)
            .canned
            .insert(command.into(), reply.into());
        self
    }

    /// Inject a failure for the next operation
    pub fn inject_next_failure(&self, kind: SsgErrorKind) {
        *lock(&self.should_fail_next) = Some(kind);
    }

    fn check_failure(&self) -> AppResult<()> {
        match lock(&self.should_fail_next).take() {
            None => Ok(()),
            Some(SsgErrorKind::Connection) => {
                Err(SsgError::Connection("Injected failure".to_string()))
            }
            Some(SsgErrorKind::Timeout) => Err(SsgError::Timeout("Injected failure".to_string())),
            Some(SsgErrorKind::ConnectionClosed) => Err(SsgError::ConnectionClosed),
        }
    }

    /// Like a real link, a timed out or hung up exchange leaves the connection closed.
    fn check_exchange_failure(&self) -> AppResult<()> {
        let result = self.check_failure();
        if matches!(result, Err(SsgError::Timeout(_) | SsgError::ConnectionClosed))
            && self.connection.fire()
        {
            self.log_call("close".to_string());
        }
        result
    }

    /// Get the call log
    pub fn call_log(&self) -> Vec<String> {
        lock(&self.call_log).clone()
    }

    /// Clear the call log
    pub fn clear_log(&self) {
        lock(&self.call_log).clear();
    }

    fn log_call(&self, call: String) {
        lock(&self.call_log).push(call);
    }

    /// Simulated frequency in Hz
    pub fn frequency_hz(&self) -> f64 {
        lock(&self.instrument).frequency_hz
    }

    /// Simulated power in dBm
    pub fn amplitude_dbm(&self) -> f64 {
        lock(&self.instrument).amplitude_dbm
    }

    /// Simulated RF output state
    pub fn output_enabled(&self) -> bool {
        lock(&self.instrument).output_enabled
    }

    fn ensure_connected(&self) -> AppResult<()> {
        if self.connection.is_armed() {
            Ok(())
        } else {
            Err(SsgError::NotConnected)
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&mut self, host: &str, port: u16) -> AppResult<()> {
        self.log_call(format!("connect: {host}:{port}"));
        if self.connection.is_armed() {
            return Ok(());
        }
        self.check_failure()?;
        self.connection.arm();
        Ok(())
    }

    async fn disconnect(&mut self) -> AppResult<()> {
        if self.connection.fire() {
            self.log_call("disconnect".to_string());
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connection.is_armed()
    }

    async fn send_command(&mut self, command: &str) -> AppResult<()> {
        self.ensure_connected()?;
        self.log_call(format!("write: {command}"));
        self.check_exchange_failure()?;
        lock(&self.instrument).apply(command);
        Ok(())
    }

    async fn query(&mut self, command: &str) -> AppResult<String> {
        self.ensure_connected()?;
        self.log_call(format!("query: {command}"));
        self.check_exchange_failure()?;
        Ok(lock(&self.instrument).reply(command).trim().to_string())
    }

    fn close_now(&mut self) {
        if self.connection.fire() {
            self.log_call("close".to_string());
        }
    }

    fn info(&self) -> String {
        "MockTransport(simulated SSG3021X)".to_string()
    }
}
