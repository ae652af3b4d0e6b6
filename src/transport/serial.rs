//! Hardware serial channel.
//!
//! Wraps the `serialport` crate behind the [`LineTransport`] seam. Commands
//! are framed with a carriage return; replies are accumulated byte-wise until
//! a newline or the bounded wait expires.

use super::error::TransportError;
use super::traits::{LineTransport, SerialSettings};
use std::io::{Read, Write};
use std::time::{Duration, Instant};

/// Granularity of the inner read loop; keeps the deadline check responsive
/// without busy-waiting on a quiet line.
const POLL_SLICE: Duration = Duration::from_millis(50);

/// A serial channel owned exclusively by one acquisition run.
pub struct SerialChannel {
    port: Box<dyn serialport::SerialPort>,
    name: String,
    read_timeout: Duration,
}

impl SerialChannel {
    /// Open the channel with the given framing parameters.
    ///
    /// Failure to open is fatal to the run: the caller surfaces it and the
    /// loop never starts.
    pub fn open(settings: &SerialSettings) -> Result<Self, TransportError> {
        let port = serialport::new(&settings.port, settings.baud_rate)
            .data_bits(settings.data_bits.into())
            .parity(settings.parity.into())
            .stop_bits(settings.stop_bits.into())
            .flow_control(serialport::FlowControl::None)
            .timeout(POLL_SLICE.min(settings.read_timeout))
            .open()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::NoDevice => TransportError::not_found(&settings.port),
                serialport::ErrorKind::InvalidInput => TransportError::config(e.to_string()),
                _ => TransportError::Serial(e),
            })?;

        Ok(Self {
            port,
            name: settings.port.clone(),
            read_timeout: settings.read_timeout,
        })
    }
}

impl LineTransport for SerialChannel {
    fn send_command(&mut self, command: &str) -> Result<(), TransportError> {
        let mut frame = command.as_bytes().to_vec();
        frame.push(b'\r');
        self.port.write_all(&frame)?;
        self.port.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String, TransportError> {
        let deadline = Instant::now() + self.read_timeout;
        let mut line: Vec<u8> = Vec::new();
        let mut byte = [0u8; 1];

        loop {
            match self.port.read(&mut byte) {
                Ok(0) => {}
                Ok(_) => {
                    if byte[0] == b'\n' {
                        break;
                    }
                    line.push(byte[0]);
                }
                Err(e)
                    if matches!(
                        e.kind(),
                        std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
                    ) => {}
                Err(e) => return Err(TransportError::Io(e)),
            }

            if Instant::now() >= deadline {
                if line.is_empty() {
                    return Err(TransportError::Timeout(self.read_timeout));
                }
                // A partial line still goes to the parser; truncation is its
                // call to make, not a channel fault.
                break;
            }
        }

        Ok(String::from_utf8_lossy(&line).trim().to_string())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Debug for SerialChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialChannel")
            .field("name", &self.name)
            .field("baud_rate", &self.port.baud_rate().ok())
            .finish()
    }
}
