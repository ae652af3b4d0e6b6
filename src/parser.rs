//! Parsing of the device reply line.
//!
//! The sensor answers a single command with one line of whitespace-separated
//! fields: `<cmd> <pressure> <temperature> <x> <y> <air_value> [<air_status>]`.
//! Parsing is pure and total: malformed input is reported as a
//! [`ParseRejected`] value, never a panic.

use thiserror::Error;

/// One validated sample from a single device reply.
///
/// Immutable once constructed; the insertion timestamp is assigned by the
/// sinks at write time, not by the device.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    /// Echoed command identifier from the device.
    pub command: String,
    pub pressure: f64,
    pub temperature: f64,
    pub x: f64,
    pub y: f64,
    pub air_value: f64,
    /// Trailing status token, empty when the device omits it.
    pub air_status: String,
}

/// Why a reply line could not be turned into a [`SensorReading`].
///
/// A rejection is an expected, recoverable outcome (empty read, line noise,
/// partial reply), not a fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseRejected {
    /// Fewer than the six required tokens were present.
    #[error("expected at least 6 fields, got {0}")]
    TooFewFields(usize),

    /// One of the five numeric fields failed conversion.
    #[error("field '{field}' is not numeric: {token:?}")]
    NonNumericField { field: &'static str, token: String },
}

/// Field names in wire order, used for rejection diagnostics.
const NUMERIC_FIELDS: [&str; 5] = ["pressure", "temperature", "x", "y", "air_value"];

/// Parse one reply line into a [`SensorReading`].
///
/// Splits on runs of whitespace. Requires at least six tokens with tokens
/// 1..=5 parseable as floats; the seventh token, when present, becomes
/// `air_status`.
pub fn parse(line: &str) -> Result<SensorReading, ParseRejected> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 6 {
        return Err(ParseRejected::TooFewFields(tokens.len()));
    }

    let mut values = [0f64; 5];
    for (i, value) in values.iter_mut().enumerate() {
        let token = tokens[i + 1];
        *value = token
            .parse()
            .map_err(|_| ParseRejected::NonNumericField {
                field: NUMERIC_FIELDS[i],
                token: token.to_string(),
            })?;
    }

    Ok(SensorReading {
        command: tokens[0].to_string(),
        pressure: values[0],
        temperature: values[1],
        x: values[2],
        y: values[3],
        air_value: values[4],
        air_status: tokens.get(6).copied().unwrap_or_default().to_string(),
    })
}
