//! Configuration schema definitions.
//!
//! The file format is fully enumerated: every recognized field appears here
//! with a default matching the device vendor's documented settings. The raw
//! `Config` is validated once into a [`RunConfiguration`] before a run
//! starts; nothing reads configuration ad hoc during the loop.

use super::error::{ConfigError, ConfigResult};
use crate::transport::{DataBits, Parity, SerialSettings, StopBits};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serial channel parameters
    pub serial: SerialSection,
    /// Device identification and polling
    pub device: DeviceSection,
    /// Durable-store connection parameters
    pub database: DatabaseSection,
    /// Logging configuration
    pub logging: LoggingSection,
}

/// Serial channel configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialSection {
    /// Port path ("/dev/ttyUSB0", "COM3")
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Byte size (5-8)
    pub byte_size: u8,
    /// Parity letter code: "N", "E" or "O"
    pub parity: String,
    /// Stop bits (1 or 2)
    pub stop_bits: u8,
    /// Bound on one reply read, in milliseconds
    pub read_timeout_ms: u64,
    /// Coarser spelling of the read bound, in whole seconds; wins over
    /// `read_timeout_ms` when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_timeout_seconds: Option<u64>,
    /// Settle delay between command write and reply read, in milliseconds.
    /// Covers the device's response latency; a design parameter, not a
    /// protocol guarantee.
    pub settle_delay_ms: u64,
}

impl Default for SerialSection {
    fn default() -> Self {
        Self {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 19_200,
            byte_size: 8,
            parity: "N".to_string(),
            stop_bits: 1,
            read_timeout_ms: 1000,
            read_timeout_seconds: None,
            settle_delay_ms: 100,
        }
    }
}

impl SerialSection {
    /// Validate this section into transport settings.
    pub fn settings(&self) -> ConfigResult<SerialSettings> {
        let data_bits = DataBits::try_from(self.byte_size)
            .map_err(|e| ConfigError::validation("serial.byte_size", e.to_string()))?;
        let parity: Parity = self
            .parity
            .parse()
            .map_err(|e: crate::transport::TransportError| {
                ConfigError::validation("serial.parity", e.to_string())
            })?;
        let stop_bits = StopBits::try_from(self.stop_bits)
            .map_err(|e| ConfigError::validation("serial.stop_bits", e.to_string()))?;

        Ok(SerialSettings {
            port: self.port.clone(),
            baud_rate: self.baud_rate,
            data_bits,
            parity,
            stop_bits,
            read_timeout: match self.read_timeout_seconds {
                Some(secs) => Duration::from_secs(secs),
                None => Duration::from_millis(self.read_timeout_ms),
            },
        })
    }
}

/// Device identification and polling section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceSection {
    /// Reactor the sensor is mounted on; part of the target name
    pub reactor_id: String,
    /// Sensor designation; part of the target name
    pub sensor_name: String,
    /// Polling command, sent with a trailing carriage return
    pub command: String,
    /// Seconds between polls
    #[serde(alias = "poll_interval_seconds")]
    pub poll_interval_secs: u64,
}

impl Default for DeviceSection {
    fn default() -> Self {
        Self {
            reactor_id: String::new(),
            sensor_name: String::new(),
            command: "A".to_string(),
            poll_interval_secs: 5,
        }
    }
}

/// Durable-store connection section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            name: "sensor_data".to_string(),
            user: "sensor_user".to_string(),
            password: String::new(),
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level filter: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Directory the append-log CSV files are written to
    pub data_dir: PathBuf,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            data_dir: PathBuf::from("."),
        }
    }
}

/// Everything one run needs, validated once at start and immutable for the
/// run's lifetime.
#[derive(Debug, Clone)]
pub struct RunConfiguration {
    pub serial: SerialSettings,
    pub command: String,
    pub settle_delay: Duration,
    pub poll_interval: Duration,
    pub reactor_id: String,
    pub sensor_name: String,
    pub database: DatabaseSection,
    pub data_dir: PathBuf,
}

impl Config {
    /// Validate the raw file schema into a [`RunConfiguration`].
    pub fn run_configuration(&self) -> ConfigResult<RunConfiguration> {
        Ok(RunConfiguration {
            serial: self.serial.settings()?,
            command: self.device.command.clone(),
            settle_delay: Duration::from_millis(self.serial.settle_delay_ms),
            poll_interval: Duration::from_secs(self.device.poll_interval_secs),
            reactor_id: self.device.reactor_id.clone(),
            sensor_name: self.device.sensor_name.clone(),
            database: self.database.clone(),
            data_dir: self.logging.data_dir.clone(),
        })
    }
}
