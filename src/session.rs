//! Scoped instrument sessions.
//!
//! A [`Session`] owns a connected [`Ssg3021x`] and guarantees the connection is
//! closed when the session ends: explicitly through [`Session::close`], or
//! implicitly when it is dropped on an early return, `?` propagation or panic.
//! Both paths end in the transport's one-shot close, so teardown runs once.
//!
//! ```no_run
//! use ssg3021x::prelude::*;
//!
//! # async fn example() -> ssg3021x::AppResult<()> {
//! let ssg = Ssg3021x::new(ConnectionSettings::new("192.168.1.50", 5025))?;
//! let mut session = ssg.open_session().await?;
//! session.set_frequency(433.92e6).await?;
//! session.set_output_enabled(true).await?;
//! // Hand the disconnected driver back for reuse.
//! let _ssg = session.close().await?;
//! # Ok(())
//! # }
//! ```

use crate::adapters::Transport;
use crate::error::AppResult;
use crate::instrument::{FunctionGeneratorDevice, Ssg3021x};
use std::ops::{Deref, DerefMut};
use tracing::warn;

/// Connected driver that closes itself when the scope ends.
pub struct Session<T: Transport> {
    device: Option<Ssg3021x<T>>,
}

impl<T: Transport> Session<T> {
    pub(crate) fn new(device: Ssg3021x<T>) -> Self {
        Self {
            device: Some(device),
        }
    }

    /// Gracefully disconnect and return the driver.
    pub async fn close(mut self) -> AppResult<Ssg3021x<T>> {
        let mut device = self.take();
        device.disconnect().await?;
        Ok(device)
    }

    fn take(&mut self) -> Ssg3021x<T> {
        self.device
            .take()
            .unwrap_or_else(|| unreachable!("session device is only taken by close"))
    }
}

impl<T: Transport> Deref for Session<T> {
    type Target = Ssg3021x<T>;

    fn deref(&self) -> &Self::Target {
        self.device
            .as_ref()
            .unwrap_or_else(|| unreachable!("session device is only taken by close"))
    }
}

impl<T: Transport> DerefMut for Session<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.device
            .as_mut()
            .unwrap_or_else(|| unreachable!("session device is only taken by close"))
    }
}

impl<T: Transport> Drop for Session<T> {
    fn drop(&mut self) {
        if let Some(device) = self.device.as_mut() {
            if device.is_connected() {
                warn!(info = %device.transport().info(), "session dropped without close");
            }
            device.close_now();
        }
    }
}
