//! Transport implementations
//!
//! This module contains the [`Transport`] trait and its implementations, which
//! provide the low-level I/O between the driver and the instrument:
//!
//! - [`TcpTransport`]: raw TCP socket, used against real hardware
//! - [`MockTransport`]: in-process simulated SSG3021X for tests
//!
//! Framing lives in [`ScpiLink`] and is shared by any byte-stream transport.

pub mod close_once;
pub mod mock_adapter;
pub mod scpi_link;
pub mod tcp_adapter;

pub use close_once::CloseOnce;
pub use mock_adapter::MockTransport;
pub use scpi_link::ScpiLink;
pub use tcp_adapter::TcpTransport;

use crate::error::AppResult;
use async_trait::async_trait;

/// Connection-owning link to one instrument.
///
/// Every exchange takes `&mut self`, so at most one command is in flight. An
/// exchange that fails with a timeout, hang-up or socket error leaves the
/// transport disconnected.
#[async_trait]
pub trait Transport: Send {
    /// Open the connection. No-op when already connected.
    async fn connect(&mut self, host: &str, port: u16) -> AppResult<()>;

    /// Gracefully close the connection. No-op when already disconnected.
    async fn disconnect(&mut self) -> AppResult<()>;

    /// Current connection state; performs no I/O.
    fn is_connected(&self) -> bool;

    /// Send one command without waiting for a reply.
    async fn send_command(&mut self, command: &str) -> AppResult<()>;

    /// Send one command and return its stripped reply.
    async fn query(&mut self, command: &str) -> AppResult<String>;

    /// Synchronous close used by automatic cleanup (`Drop`).
    ///
    /// Shares the one-shot guard with [`Transport::disconnect`], so a connection is
    /// torn down at most once whichever path runs first.
    fn close_now(&mut self);

    /// Human readable description for logs
    fn info(&self) -> String;
}
