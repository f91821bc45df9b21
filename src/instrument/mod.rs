//! Instrument drivers and the function-generator capability model.
//!
//! - [`capabilities`]: the [`FunctionGeneratorDevice`] trait, [`DeviceCapabilities`]
//!   and [`Waveform`]
//! - [`function_generator`]: channel-addressed front-end that enforces capabilities
//! - [`identity`]: `*IDN?` parsing and validation
//! - [`ssg3021x`]: the Siglent SSG3021X driver

pub mod capabilities;
pub mod function_generator;
pub mod identity;
pub mod ssg3021x;

pub use capabilities::{DeviceCapabilities, FunctionGeneratorDevice, ValueRange, Waveform};
pub use function_generator::FunctionGenerator;
pub use identity::{Identity, EXPECTED_MANUFACTURER, EXPECTED_MODEL};
pub use ssg3021x::Ssg3021x;
