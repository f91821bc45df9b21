//! Raw TCP socket transport (SCPI over port 5025).
//!
//! Provides the [`Transport`] implementation used against real hardware. The
//! socket is owned exclusively by one `TcpTransport`; exchanges are strictly
//! sequential because every operation takes `&mut self`.

use super::close_once::CloseOnce;
use super::scpi_link::ScpiLink;
use super::Transport;
use crate::config::{validate_address, ConnectionSettings};
use crate::error::{AppResult, SsgError};
use async_trait::async_trait;
use std::net::Shutdown;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{debug, info, warn};

/// TCP transport for line-oriented SCPI instruments
pub struct TcpTransport {
    /// Upper bound on establishing the socket
    pub(crate) connect_timeout: Duration,

    /// Upper bound on receiving one complete reply
    pub(crate) read_timeout: Duration,

    /// `host:port` of the open connection, for diagnostics
    peer: Option<String>,

    link: Option<ScpiLink<TcpStream>>,
    close_once: CloseOnce,
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl TcpTransport {
    /// Create a disconnected transport with 5 s connect and read timeouts.
    pub fn new() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(5),
            peer: None,
            link: None,
            close_once: CloseOnce::new(),
        }
    }

    /// Create a disconnected transport using the timeouts from `settings`.
    pub fn from_settings(settings: &ConnectionSettings) -> Self {
        Self::new()
            .with_connect_timeout(settings.connect_timeout)
            .with_read_timeout(settings.read_timeout)
    }

    /// Set connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set reply timeout. Takes effect on the next connect.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    fn link_mut(&mut self) -> AppResult<&mut ScpiLink<TcpStream>> {
        self.link.as_mut().ok_or(SsgError::NotConnected)
    }

    /// Drop the link after a timeout, hang-up or socket error.
    ///
    /// The stream position is unknown at that point (a late reply may still arrive),
    /// so the link cannot be reused for the next exchange.
    fn discard_if_broken<R>(&mut self, result: AppResult<R>) -> AppResult<R> {
        if let Err(e) = &result {
            if matches!(
                e,
                SsgError::Timeout(_) | SsgError::ConnectionClosed | SsgError::Io(_)
            ) && self.close_once.fire()
            {
                self.link = None;
                warn!(peer = ?self.peer.take(), error = %e, "TCP connection dropped");
            }
        }
        result
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn connect(&mut self, host: &str, port: u16) -> AppResult<()> {
        if self.link.is_some() {
            debug!(host, port, "already connected, ignoring connect");
            return Ok(());
        }
        validate_address(host, port)?;

        let stream = match tokio::time::timeout(self.connect_timeout, TcpStream::connect((host, port)))
            .await
        {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(SsgError::Connection(format!(
                    "failed to connect to {host}:{port}: {e}"
                )))
            }
            Err(_) => {
                return Err(SsgError::Timeout(format!(
                    "connecting to {host}:{port} took longer than {:?}",
                    self.connect_timeout
                )))
            }
        };
        stream.set_nodelay(true)?;

        self.link = Some(ScpiLink::new(stream, self.read_timeout));
        self.peer = Some(format!("{host}:{port}"));
        self.close_once.arm();
        info!(host, port, "TCP connection opened");
        Ok(())
    }

    async fn disconnect(&mut self) -> AppResult<()> {
        if !self.close_once.fire() {
            return Ok(());
        }

        if let Some(mut link) = self.link.take() {
            // The peer may already be gone; the socket is released either way.
            if let Err(e) = link.shutdown().await {
                debug!(error = %e, "shutdown on close failed");
            }
        }
        info!(peer = ?self.peer.take(), "TCP connection closed");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.link.is_some()
    }

    async fn send_command(&mut self, command: &str) -> AppResult<()> {
        let result = self.link_mut()?.send(command).await;
        self.discard_if_broken(result)
    }

    async fn query(&mut self, command: &str) -> AppResult<String> {
        let result = self.link_mut()?.query(command).await;
        self.discard_if_broken(result)
    }

    fn close_now(&mut self) {
        if !self.close_once.fire() {
            return;
        }

        if let Some(link) = self.link.take() {
            if let Ok(stream) = link.into_inner().into_std() {
                let _ = stream.shutdown(Shutdown::Both);
            }
            warn!(peer = ?self.peer.take(), "TCP connection closed without explicit disconnect");
        }
    }

    fn info(&self) -> String {
        format!(
            "TcpTransport({} @ {}ms timeout)",
            self.peer.as_deref().unwrap_or("disconnected"),
            self.read_timeout.as_millis()
        )
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.close_now();
    }
}
