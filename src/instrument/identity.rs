//! `*IDN?` reply parsing.
//!
//! The SSG3021X answers `*IDN?` with four comma separated fields:
//!
//! ```text
//! Siglent Technologies,SSG3021X,SSG3XBAQ000001,2.2.1R5
//! <manufacturer>      ,<model>  ,<serial>      ,<major>.<minor>.<patch>R<revision>
//! ```

use crate::error::{AppResult, SsgError};
use std::fmt;
use std::str::FromStr;

/// Manufacturer field the instrument must report.
pub const EXPECTED_MANUFACTURER: &str = "Siglent Technologies";

/// Model field the instrument must report.
pub const EXPECTED_MODEL: &str = "SSG3021X";

/// Parsed and validated identity of a connected instrument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Always [`EXPECTED_MANUFACTURER`]
    pub manufacturer: String,
    /// Always [`EXPECTED_MODEL`]
    pub model: String,
    /// Serial number
    pub serial: String,
    /// Firmware version as `[major, minor, patch, revision]`
    pub version: [String; 4],
}

impl Identity {
    /// Parse an identity reply and check it names a Siglent SSG3021X.
    pub fn parse(reply: &str) -> AppResult<Self> {
        let fields: Vec<&str> = reply.split(',').collect();
        let [manufacturer, model, serial, version] = fields[..] else {
            return Err(SsgError::ProtocolViolation(format!(
                "IDN string does not follow Siglent layout: '{reply}'"
            )));
        };

        if manufacturer != EXPECTED_MANUFACTURER {
            return Err(SsgError::ProtocolViolation(format!(
                "IDN returned manufacturer {manufacturer}"
            )));
        }
        if model != EXPECTED_MODEL {
            return Err(SsgError::ProtocolViolation(format!(
                "IDN does not identify {EXPECTED_MODEL} (got {model})"
            )));
        }

        Ok(Self {
            manufacturer: manufacturer.to_string(),
            model: model.to_string(),
            serial: serial.to_string(),
            version: parse_version(version)?,
        })
    }

    /// Firmware version in the instrument's own notation, e.g. `2.2.1R5`.
    pub fn version_string(&self) -> String {
        let [major, minor, patch, revision] = &self.version;
        format!("{major}.{minor}.{patch}R{revision}")
    }
}

/// `<major>.<minor>.<patch>R<revision>` into its four components.
fn parse_version(raw: &str) -> AppResult<[String; 4]> {
    let malformed =
        || SsgError::ProtocolViolation(format!("malformed firmware version '{raw}'"));

    let parts: Vec<&str> = raw.split('.').collect();
    let [major, minor, tail] = parts[..] else {
        return Err(malformed());
    };

    let tail_parts: Vec<&str> = tail.split('R').collect();
    let [patch, revision] = tail_parts[..] else {
        return Err(malformed());
    };

    Ok([
        major.to_string(),
        minor.to_string(),
        patch.to_string(),
        revision.to_string(),
    ])
}

impl FromStr for Identity {
    type Err = SsgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.manufacturer,
            self.model,
            self.serial,
            self.version_string()
        )
    }
}
