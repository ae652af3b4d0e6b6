//! The line-oriented transport seam.
//!
//! Defines the `LineTransport` trait so the acquisition loop can run against
//! real hardware or a scripted mock interchangeably.

use super::error::TransportError;
use std::time::Duration;

/// Framing parameters for the serial channel.
#[derive(Debug, Clone)]
pub struct SerialSettings {
    /// System path of the port ("/dev/ttyUSB0", "COM3").
    pub port: String,
    /// Baud rate (bits per second).
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub parity: Parity,
    pub stop_bits: StopBits,
    /// Bound on how long one read waits for the reply line.
    pub read_timeout: Duration,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: 19_200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            read_timeout: Duration::from_secs(1),
        }
    }
}

/// Number of data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

impl From<DataBits> for serialport::DataBits {
    fn from(bits: DataBits) -> Self {
        match bits {
            DataBits::Five => serialport::DataBits::Five,
            DataBits::Six => serialport::DataBits::Six,
            DataBits::Seven => serialport::DataBits::Seven,
            DataBits::Eight => serialport::DataBits::Eight,
        }
    }
}

impl TryFrom<u8> for DataBits {
    type Error = TransportError;

    fn try_from(value: u8) -> Result<Self, TransportError> {
        match value {
            5 => Ok(Self::Five),
            6 => Ok(Self::Six),
            7 => Ok(Self::Seven),
            8 => Ok(Self::Eight),
            other => Err(TransportError::config(format!(
                "unsupported byte size: {other}"
            ))),
        }
    }
}

/// Parity checking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Odd,
    Even,
}

impl From<Parity> for serialport::Parity {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => serialport::Parity::None,
            Parity::Odd => serialport::Parity::Odd,
            Parity::Even => serialport::Parity::Even,
        }
    }
}

impl std::str::FromStr for Parity {
    type Err = TransportError;

    /// Accepts the single-letter codes the device vendor documents.
    fn from_str(s: &str) -> Result<Self, TransportError> {
        match s {
            "N" | "n" => Ok(Self::None),
            "O" | "o" => Ok(Self::Odd),
            "E" | "e" => Ok(Self::Even),
            other => Err(TransportError::config(format!(
                "unsupported parity: {other:?}"
            ))),
        }
    }
}

/// Number of stop bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

impl From<StopBits> for serialport::StopBits {
    fn from(bits: StopBits) -> Self {
        match bits {
            StopBits::One => serialport::StopBits::One,
            StopBits::Two => serialport::StopBits::Two,
        }
    }
}

impl TryFrom<u8> for StopBits {
    type Error = TransportError;

    fn try_from(value: u8) -> Result<Self, TransportError> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(TransportError::config(format!(
                "unsupported stop bits: {other}"
            ))),
        }
    }
}

/// A duplex channel that carries one command out and one reply line back.
///
/// Implemented by [`SerialChannel`](super::SerialChannel) for hardware and
/// [`MockChannel`](super::MockChannel) for tests.
pub trait LineTransport: Send + std::fmt::Debug {
    /// Transmit a command, framed with a trailing carriage return.
    fn send_command(&mut self, command: &str) -> Result<(), TransportError>;

    /// Read one newline-terminated reply line within the configured bound.
    ///
    /// A timeout with nothing received yields `Ok` with an empty string; the
    /// parser rejects it downstream. Anything accumulated before the bound
    /// expires is returned as-is.
    fn read_line(&mut self) -> Result<String, TransportError>;

    /// Name of the channel endpoint, for diagnostics.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_match_device_documentation() {
        let settings = SerialSettings::default();
        assert_eq!(settings.baud_rate, 19_200);
        assert_eq!(settings.data_bits, DataBits::Eight);
        assert_eq!(settings.parity, Parity::None);
        assert_eq!(settings.stop_bits, StopBits::One);
        assert_eq!(settings.read_timeout, Duration::from_secs(1));
    }

    #[test]
    fn data_bits_from_config_value() {
        assert_eq!(DataBits::try_from(8).unwrap(), DataBits::Eight);
        assert_eq!(DataBits::try_from(7).unwrap(), DataBits::Seven);
        assert!(DataBits::try_from(9).is_err());
    }

    #[test]
    fn parity_from_letter_code() {
        assert_eq!("N".parse::<Parity>().unwrap(), Parity::None);
        assert_eq!("e".parse::<Parity>().unwrap(), Parity::Even);
        assert!("M".parse::<Parity>().is_err());
    }

    #[test]
    fn stop_bits_from_config_value() {
        assert_eq!(StopBits::try_from(1).unwrap(), StopBits::One);
        assert_eq!(StopBits::try_from(2).unwrap(), StopBits::Two);
        assert!(StopBits::try_from(3).is_err());
    }

    #[test]
    fn conversions_to_serialport_types() {
        let bits: serialport::DataBits = DataBits::Eight.into();
        assert_eq!(bits, serialport::DataBits::Eight);
        let parity: serialport::Parity = Parity::Even.into();
        assert_eq!(parity, serialport::Parity::Even);
        let stop: serialport::StopBits = StopBits::Two.into();
        assert_eq!(stop, serialport::StopBits::Two);
    }
}
