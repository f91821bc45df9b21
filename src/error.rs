//! Custom error types for the driver.
//!
//! This module defines the primary error type, `SsgError`, for the whole crate.
//! Using the `thiserror` crate, it provides a single place to describe everything
//! that can go wrong between opening a socket and parsing an instrument reply.
//!
//! ## Error Hierarchy
//!
//! - **`NotConnected`**: an operation needed an open session but the transport is
//!   disconnected. Nothing was sent.
//! - **`Connection`** / **`ConnectionClosed`**: the TCP socket could not be opened, or
//!   the instrument closed it in the middle of a reply.
//! - **`ProtocolViolation`**: the instrument answered, but not with what a SSG3021X
//!   is supposed to say (wrong identity, wrong field layout, invalid UTF-8).
//! - **`Timeout`**: connecting or waiting for a reply took longer than configured.
//! - **`Validation`**: a caller-supplied value (host, port, frequency, channel...) was
//!   rejected before any I/O happened.
//! - **`Unsupported`**: the request is well formed but the device does not have the
//!   capability (offsets, arbitrary waveforms, frequency counter).
//! - **`Parse`**: a numeric reply could not be parsed.
//! - **`Io`** / **`Config`**: wrapped `std::io::Error` and `figment::Error`.
//!
//! No variant is ever retried automatically; the caller decides.

use thiserror::Error;

/// Convenience alias for results using the crate error type.
pub type AppResult<T> = std::result::Result<T, SsgError>;

/// Every failure the driver can report.
#[derive(Error, Debug)]
pub enum SsgError {
    #[error("Device is not connected")]
    NotConnected,

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Connection closed by instrument before the reply was complete")]
    ConnectionClosed,

    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Failed to parse reply: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] figment::Error),
}
