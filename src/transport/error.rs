//! Transport-specific error types.
//!
//! Kept separate from application-level errors so the acquisition loop can
//! distinguish a bounded-wait expiry (recoverable) from a channel fault
//! (fatal) at the type level.

use thiserror::Error;

/// Errors that can occur on the serial channel.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The named serial port does not exist on this system.
    #[error("serial port not found: {0}")]
    NotFound(String),

    /// The channel could not be configured as requested.
    #[error("channel configuration error: {0}")]
    Config(String),

    /// No reply arrived within the bounded wait.
    #[error("no reply within {0:?}")]
    Timeout(std::time::Duration),

    /// An I/O fault on the open channel.
    #[error("channel I/O fault: {0}")]
    Io(#[from] std::io::Error),

    /// A serialport-layer fault.
    #[error("serial fault: {0}")]
    Serial(#[from] serialport::Error),
}

impl TransportError {
    pub fn not_found(port: impl Into<String>) -> Self {
        Self::NotFound(port.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether this error is a bounded-wait expiry rather than a fault.
    ///
    /// Timeouts skip an iteration; everything else terminates the run.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
            ),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn display_messages() {
        let err = TransportError::not_found("/dev/ttyUSB0");
        assert_eq!(err.to_string(), "serial port not found: /dev/ttyUSB0");

        let err = TransportError::config("bad parity");
        assert_eq!(err.to_string(), "channel configuration error: bad parity");
    }

    #[test]
    fn timeout_classification() {
        assert!(TransportError::Timeout(Duration::from_secs(1)).is_timeout());
        assert!(TransportError::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "t"
        ))
        .is_timeout());
        assert!(!TransportError::Io(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "gone"
        ))
        .is_timeout());
        assert!(!TransportError::not_found("COM3").is_timeout());
    }
}
