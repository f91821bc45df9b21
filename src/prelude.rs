//! Prelude module for convenient imports
//!
//! ```rust,ignore
//! use ssg3021x::prelude::*;
//! ```

// =============================================================================
// Errors & Configuration
// =============================================================================

pub use crate::config::{ConnectionSettings, Ssg3021xConfig};
pub use crate::error::{AppResult, SsgError};

// =============================================================================
// Transports
// =============================================================================

pub use crate::adapters::{MockTransport, TcpTransport, Transport};

// =============================================================================
// Instruments
// =============================================================================

pub use crate::instrument::{
    DeviceCapabilities, FunctionGenerator, FunctionGeneratorDevice, Identity, Ssg3021x, Waveform,
};
pub use crate::session::Session;
