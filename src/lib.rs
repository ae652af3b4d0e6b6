//! Sensor Logger Library
//!
//! Core functionality for the serial sensor acquisition daemon: the polling
//! loop, reply parsing, and dual-sink recording to PostgreSQL with a CSV
//! backup.
//!
//! # Modules
//!
//! - `config`: Configuration management with TOML support
//! - `parser`: Device reply parsing into [`SensorReading`] values
//! - `target`: Sanitized dataset naming shared by both sinks
//! - `transport`: Serial channel abstraction with a mock for tests
//! - `sink`: Durable-store and append-log record sinks
//! - `acquisition`: The run lifecycle and the polling loop itself
//! - `error`: Start-time error taxonomy

pub mod acquisition;
pub mod config;
pub mod error;
pub mod parser;
pub mod sink;
pub mod target;
pub mod transport;

// Re-export commonly used types for convenience
pub use acquisition::{Acquisition, Schedule};
pub use config::{Config, ConfigError, ConfigLoader, ConfigResult, RunConfiguration};
pub use error::StartError;
pub use parser::{parse, ParseRejected, SensorReading};
pub use sink::{AppendLog, DurableStore, RecordSink, SinkError};
pub use target::{InvalidTargetName, TargetName};
pub use transport::{
    DataBits, LineTransport, MockChannel, MockReply, Parity, SerialChannel, SerialSettings,
    StopBits, TransportError,
};
