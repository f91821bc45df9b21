//! Newline framing for SCPI over a byte stream.
//!
//! [`ScpiLink`] owns one stream and performs the two primitive exchanges:
//! a command without reply and a command followed by one `\n` terminated reply.
//! It is generic over the stream so the framing can be exercised against
//! in-memory mocks as well as a real `TcpStream`.

use crate::error::{AppResult, SsgError};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Maximum number of bytes requested from the stream per read.
pub const READ_CHUNK: usize = 4096 * 10;

/// Line terminator appended to every command.
pub const LINE_TERMINATOR: char = '\n';

/// A framed SCPI connection over `S`.
#[derive(Debug)]
pub struct ScpiLink<S> {
    stream: S,
    read_timeout: Duration,
}

impl<S> ScpiLink<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap a connected stream. `read_timeout` bounds each complete reply.
    pub fn new(stream: S, read_timeout: Duration) -> Self {
        Self {
            stream,
            read_timeout,
        }
    }

    /// Current reply timeout
    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Write `command` followed by the line terminator.
    pub async fn send(&mut self, command: &str) -> AppResult<()> {
        let mut line = String::with_capacity(command.len() + 1);
        line.push_str(command);
        line.push(LINE_TERMINATOR);

        self.stream.write_all(line.as_bytes()).await?;
        self.stream.flush().await?;
        debug!(command, "SCPI write");
        Ok(())
    }

    /// Write `command`, then read until a chunk ends with `\n`.
    ///
    /// The reply is returned with surrounding whitespace stripped. A zero-length
    /// read means the peer closed the stream and yields
    /// [`SsgError::ConnectionClosed`]; the whole reply must arrive within the read
    /// timeout or [`SsgError::Timeout`] is returned.
    pub async fn query(&mut self, command: &str) -> AppResult<String> {
        self.send(command).await?;

        let timeout = self.read_timeout;
        let reply = tokio::time::timeout(timeout, self.read_reply())
            .await
            .map_err(|_| {
                SsgError::Timeout(format!("no reply to '{command}' within {timeout:?}"))
            })??;

        debug!(command, reply = %reply, "SCPI query");
        Ok(reply)
    }

    async fn read_reply(&mut self) -> AppResult<String> {
        let mut reply: Vec<u8> = Vec::new();
        let mut chunk = vec![0u8; READ_CHUNK];

        loop {
            let n = self.stream.read(&mut chunk).await?;
            if n == 0 {
                return Err(SsgError::ConnectionClosed);
            }

            let block = &chunk[..n];
            reply.extend_from_slice(block);
            if block.last() == Some(&b'\n') {
                break;
            }
        }

        // Decode once at the end so multi-byte characters may straddle reads.
        let text = String::from_utf8(reply).map_err(|e| {
            SsgError::ProtocolViolation(format!("reply is not valid UTF-8: {e}"))
        })?;
        Ok(text.trim().to_string())
    }

    /// Gracefully shut down the write half of the stream.
    pub async fn shutdown(&mut self) -> AppResult<()> {
        self.stream.shutdown().await?;
        Ok(())
    }

    /// Give back the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    fn link(mock: tokio_test::io::Mock) -> ScpiLink<tokio_test::io::Mock> {
        ScpiLink::new(mock, Duration::from_secs(1))
    }

    #[tokio::test]
    async fn test_send_appends_newline() {
        let mock = Builder::new().write(b"FREQ 2400000000\n").build();
        let mut link = link(mock);
        link.send("FREQ 2400000000").await.unwrap();
    }

    #[tokio::test]
    async fn test_query_single_chunk() {
        let mock = Builder::new()
            .write(b"FREQ?\n")
            .read(b"1000000.0\n")
            .build();
        let mut link = link(mock);
        assert_eq!(link.query("FREQ?").await.unwrap(), "1000000.0");
    }

    #[tokio::test]
    async fn test_query_accumulates_chunks() {
        let mock = Builder::new()
            .write(b"*IDN?\n")
            .read(b"Siglent Tech")
            .read(b"nologies,SSG3021X,")
            .read(b"SN123,1.2.3R4\r\n")
            .build();
        let mut link = link(mock);
        assert_eq!(
            link.query("*IDN?").await.unwrap(),
            "Siglent Technologies,SSG3021X,SN123,1.2.3R4"
        );
    }

    #[tokio::test]
    async fn test_query_newline_inside_chunk_keeps_reading() {
        // Only a chunk that *ends* with a newline terminates the reply.
        let mock = Builder::new()
            .write(b"POW?\n")
            .read(b"-10\n5")
            .read(b"\n")
            .build();
        let mut link = link(mock);
        assert_eq!(link.query("POW?").await.unwrap(), "-10\n5");
    }

    #[tokio::test]
    async fn test_query_multibyte_split_across_reads() {
        let snowman = "\u{2603}".as_bytes();
        let mock = Builder::new()
            .write(b"X?\n")
            .read(&snowman[..1])
            .read(&snowman[1..])
            .read(b"\n")
            .build();
        let mut link = link(mock);
        assert_eq!(link.query("X?").await.unwrap(), "\u{2603}");
    }

    #[tokio::test]
    async fn test_query_zero_length_read_does_not_panic() {
        let mock = Builder::new().write(b"FREQ?\n").build();
        let mut link = link(mock);
        let err = link.query("FREQ?").await.unwrap_err();
        assert!(matches!(err, SsgError::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_query_partial_reply_then_eof() {
        let mock = Builder::new().write(b"FREQ?\n").read(b"1000").build();
        let mut link = link(mock);
        let err = link.query("FREQ?").await.unwrap_err();
        assert!(matches!(err, SsgError::ConnectionClosed));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_protocol_violation() {
        let mock = Builder::new().write(b"X?\n").read(b"\xff\xfe\n").build();
        let mut link = link(mock);
        let err = link.query("X?").await.unwrap_err();
        assert!(matches!(err, SsgError::ProtocolViolation(_)));
    }

    #[tokio::test]
    async fn test_read_error_propagates_as_io() {
        let mock = Builder::new()
            .write(b"FREQ?\n")
            .read_error(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "reset",
            ))
            .build();
        let mut link = link(mock);
        let err = link.query("FREQ?").await.unwrap_err();
        assert!(matches!(err, SsgError::Io(_)));
    }
}
