//! Capability descriptions for function-generator devices.
//!
//! [`DeviceCapabilities`] states what a device supports and the
//! [`FunctionGeneratorDevice`] trait is the operation set a driver implements.
//! The `check_*` helpers turn a capability mismatch into
//! [`SsgError::Validation`] or [`SsgError::Unsupported`].

use crate::error::{AppResult, SsgError};
use async_trait::async_trait;
use std::fmt;

/// Output waveforms known to the function-generator family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Waveform {
    /// Sine wave
    Sine,
    /// Square wave
    Square,
    /// Symmetric triangle
    Triangle,
    /// Rising sawtooth
    RampUp,
    /// Falling sawtooth
    RampDown,
    /// Pulse train
    Pulse,
    /// Noise
    Noise,
    /// Constant level
    Dc,
    /// User-uploaded waveform
    Arbitrary,
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Triangle => "triangle",
            Waveform::RampUp => "ramp-up",
            Waveform::RampDown => "ramp-down",
            Waveform::Pulse => "pulse",
            Waveform::Noise => "noise",
            Waveform::Dc => "dc",
            Waveform::Arbitrary => "arbitrary",
        };
        f.write_str(name)
    }
}

/// Closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    /// Lower bound (inclusive)
    pub min: f64,
    /// Upper bound (inclusive)
    pub max: f64,
}

impl ValueRange {
    /// Interval from `min` to `max`.
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `true` for finite values within the bounds.
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }

    /// A range that only admits a single value, i.e. the setting cannot be changed.
    pub fn is_fixed(&self) -> bool {
        self.min == self.max
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// What a function-generator device can do.
///
/// Passed to a device at construction; the [`FunctionGenerator`] front-end uses it
/// to reject requests before they reach the device.
///
/// [`FunctionGenerator`]: super::FunctionGenerator
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceCapabilities {
    /// Number of independent outputs
    pub channels: usize,
    /// Output frequency in Hz
    pub frequency_range: ValueRange,
    /// Output amplitude (dBm for RF sources)
    pub amplitude_range: ValueRange,
    /// DC offset; fixed at zero when offsets are unsupported
    pub offset_range: ValueRange,
    /// Whether arbitrary waveforms can be uploaded
    pub arbitrary_waveforms: bool,
    /// Allowed arbitrary waveform length in samples
    pub arbitrary_waveform_length: (usize, usize),
    /// Allowed arbitrary waveform sample values
    pub arbitrary_waveform_min_max: ValueRange,
    /// Whether the device has a frequency counter input
    pub has_frequency_counter: bool,
    /// Waveforms the device can produce
    pub supported_waveforms: Vec<Waveform>,
}

impl DeviceCapabilities {
    /// Siglent SSG3021X: one sine output, 9 kHz to 2.1 GHz, -90 to +20 dBm.
    pub fn ssg3021x() -> Self {
        Self {
            channels: 1,
            frequency_range: ValueRange::new(9e3, 2.1e9),
            amplitude_range: ValueRange::new(-90.0, 20.0),
            offset_range: ValueRange::new(0.0, 0.0),
            arbitrary_waveforms: false,
            arbitrary_waveform_length: (0, 0),
            arbitrary_waveform_min_max: ValueRange::new(0.0, 0.0),
            has_frequency_counter: false,
            supported_waveforms: vec![Waveform::Sine],
        }
    }

    /// Reject a channel index outside `0..channels`.
    pub fn check_channel(&self, channel: usize) -> AppResult<()> {
        if channel >= self.channels {
            return Err(SsgError::Validation(format!(
                "Channel {channel} out of range, device has {} channel(s)",
                self.channels
            )));
        }
        Ok(())
    }

    /// Reject a frequency outside the declared range.
    pub fn check_frequency(&self, hz: f64) -> AppResult<()> {
        if !self.frequency_range.contains(hz) {
            return Err(SsgError::Validation(format!(
                "Frequency {hz} Hz outside {} Hz",
                self.frequency_range
            )));
        }
        Ok(())
    }

    /// Reject an amplitude outside the declared range.
    pub fn check_amplitude(&self, amplitude: f64) -> AppResult<()> {
        if !self.amplitude_range.contains(amplitude) {
            return Err(SsgError::Validation(format!(
                "Amplitude {amplitude} outside {}",
                self.amplitude_range
            )));
        }
        Ok(())
    }

    /// Reject an offset the device cannot produce.
    pub fn check_offset(&self, offset: f64) -> AppResult<()> {
        if self.offset_range.contains(offset) {
            return Ok(());
        }
        if self.offset_range.is_fixed() {
            return Err(SsgError::Unsupported(format!(
                "Offset is fixed at {}",
                self.offset_range.min
            )));
        }
        Err(SsgError::Validation(format!(
            "Offset {offset} outside {}",
            self.offset_range
        )))
    }

    /// Reject a waveform the device cannot produce.
    pub fn check_waveform(&self, waveform: Waveform) -> AppResult<()> {
        if waveform == Waveform::Arbitrary && !self.arbitrary_waveforms {
            return Err(SsgError::Unsupported(
                "Arbitrary waveforms are not supported".to_string(),
            ));
        }
        if !self.supported_waveforms.contains(&waveform) {
            return Err(SsgError::Unsupported(format!(
                "Waveform {waveform} is not supported"
            )));
        }
        Ok(())
    }
}

/// Operations every function-generator device provides.
///
/// Single-channel semantics: channel selection and capability checks belong to the
/// [`FunctionGenerator`](super::FunctionGenerator) front-end.
#[async_trait]
pub trait FunctionGeneratorDevice: Send {
    /// Declared capabilities
    fn capabilities(&self) -> &DeviceCapabilities;

    /// Open and verify the connection. No-op when already connected.
    async fn connect(&mut self) -> AppResult<()>;

    /// Close the connection. No-op when already disconnected.
    async fn disconnect(&mut self) -> AppResult<()>;

    /// Connection state, without I/O
    fn is_connected(&self) -> bool;

    /// Output frequency in Hz, read from the device
    async fn get_frequency(&mut self) -> AppResult<f64>;

    /// Set the output frequency in Hz
    async fn set_frequency(&mut self, hz: f64) -> AppResult<()>;

    /// Output amplitude, read from the device
    async fn get_amplitude(&mut self) -> AppResult<f64>;

    /// Set the output amplitude
    async fn set_amplitude(&mut self, amplitude: f64) -> AppResult<()>;

    /// Whether the output is enabled, read from the device
    async fn is_output_enabled(&mut self) -> AppResult<bool>;

    /// Enable or disable the output
    async fn set_output_enabled(&mut self, enabled: bool) -> AppResult<()>;

    /// Current waveform
    async fn get_waveform(&mut self) -> AppResult<Waveform>;

    /// Select a waveform
    async fn set_waveform(&mut self, waveform: Waveform) -> AppResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ssg3021x_capabilities() {
        let caps = DeviceCapabilities::ssg3021x();
        assert_eq!(caps.channels, 1);
        assert_eq!(caps.supported_waveforms, vec![Waveform::Sine]);
        assert!(!caps.arbitrary_waveforms);
        assert!(!caps.has_frequency_counter);
    }

    #[test]
    fn test_range_checks() {
        let caps = DeviceCapabilities::ssg3021x();
        assert!(caps.check_frequency(9e3).is_ok());
        assert!(caps.check_frequency(2.1e9).is_ok());
        assert!(caps.check_frequency(2.4e9).is_err());
        assert!(caps.check_frequency(f64::NAN).is_err());
        assert!(caps.check_amplitude(-90.0).is_ok());
        assert!(caps.check_amplitude(20.5).is_err());
    }

    #[test]
    fn test_channel_check() {
        let caps = DeviceCapabilities::ssg3021x();
        assert!(caps.check_channel(0).is_ok());
        assert!(matches!(caps.check_channel(1), Err(SsgError::Validation(_))));
    }

    #[test]
    fn test_offset_fixed_at_zero() {
        let caps = DeviceCapabilities::ssg3021x();
        assert!(caps.check_offset(0.0).is_ok());
        assert!(matches!(caps.check_offset(0.5), Err(SsgError::Unsupported(_))));
    }

    #[test]
    fn test_waveform_check() {
        let caps = DeviceCapabilities::ssg3021x();
        assert!(caps.check_waveform(Waveform::Sine).is_ok());
        assert!(matches!(
            caps.check_waveform(Waveform::Square),
            Err(SsgError::Unsupported(_))
        ));
        let err = caps.check_waveform(Waveform::Arbitrary).unwrap_err();
        assert!(err.to_string().contains("Arbitrary"));
    }
}
