//! Capability-checked front-end over a [`FunctionGeneratorDevice`].
//!
//! Callers address outputs by channel index. Every request is checked against the
//! device's [`DeviceCapabilities`] first, so devices only ever see operations they
//! declared support for.

use super::capabilities::{DeviceCapabilities, FunctionGeneratorDevice, Waveform};
use crate::error::AppResult;

/// Multi-channel function generator API backed by a single device.
pub struct FunctionGenerator<D> {
    device: D,
}

impl<D: FunctionGeneratorDevice> FunctionGenerator<D> {
    /// Wrap `device`.
    pub fn new(device: D) -> Self {
        Self { device }
    }

    /// Declared capabilities of the wrapped device
    pub fn capabilities(&self) -> &DeviceCapabilities {
        self.device.capabilities()
    }

    /// Wrapped device
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Wrapped device, mutably
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Unwrap the device
    pub fn into_inner(self) -> D {
        self.device
    }

    /// Connect the device
    pub async fn connect(&mut self) -> AppResult<()> {
        self.device.connect().await
    }

    /// Disconnect the device
    pub async fn disconnect(&mut self) -> AppResult<()> {
        self.device.disconnect().await
    }

    /// Device connection state
    pub fn is_connected(&self) -> bool {
        self.device.is_connected()
    }

    /// Set the output frequency of `channel` in Hz.
    pub async fn set_channel_frequency(&mut self, channel: usize, hz: f64) -> AppResult<()> {
        let caps = self.device.capabilities();
        caps.check_channel(channel)?;
        caps.check_frequency(hz)?;
        self.device.set_frequency(hz).await
    }

    /// Output frequency of `channel` in Hz
    pub async fn get_channel_frequency(&mut self, channel: usize) -> AppResult<f64> {
        self.device.capabilities().check_channel(channel)?;
        self.device.get_frequency().await
    }

    /// Set the output amplitude of `channel` (dBm on RF sources).
    pub async fn set_channel_amplitude(&mut self, channel: usize, amplitude: f64) -> AppResult<()> {
        let caps = self.device.capabilities();
        caps.check_channel(channel)?;
        caps.check_amplitude(amplitude)?;
        self.device.set_amplitude(amplitude).await
    }

    /// Output amplitude of `channel`
    pub async fn get_channel_amplitude(&mut self, channel: usize) -> AppResult<f64> {
        self.device.capabilities().check_channel(channel)?;
        self.device.get_amplitude().await
    }

    /// Offsets are not adjustable on the devices this crate drives; only the fixed
    /// value of the declared offset range is accepted, and nothing is sent.
    pub fn set_channel_offset(&mut self, channel: usize, offset: f64) -> AppResult<()> {
        let caps = self.device.capabilities();
        caps.check_channel(channel)?;
        caps.check_offset(offset)?;
        Ok(())
    }

    /// The fixed offset of the channel
    pub fn get_channel_offset(&self, channel: usize) -> AppResult<f64> {
        let caps = self.device.capabilities();
        caps.check_channel(channel)?;
        Ok(caps.offset_range.min)
    }

    /// Select the waveform of `channel`.
    pub async fn set_channel_waveform(&mut self, channel: usize, waveform: Waveform) -> AppResult<()> {
        let caps = self.device.capabilities();
        caps.check_channel(channel)?;
        caps.check_waveform(waveform)?;
        self.device.set_waveform(waveform).await
    }

    /// Waveform of `channel`
    pub async fn get_channel_waveform(&mut self, channel: usize) -> AppResult<Waveform> {
        self.device.capabilities().check_channel(channel)?;
        self.device.get_waveform().await
    }

    /// Switch the output of `channel` on or off.
    pub async fn set_channel_enabled(&mut self, channel: usize, enabled: bool) -> AppResult<()> {
        self.device.capabilities().check_channel(channel)?;
        self.device.set_output_enabled(enabled).await
    }

    /// Whether the output of `channel` is on
    pub async fn is_channel_enabled(&mut self, channel: usize) -> AppResult<bool> {
        self.device.capabilities().check_channel(channel)?;
        self.device.is_output_enabled().await
    }
}
