//! Scripted channel for tests.
//!
//! Simulates the device without hardware: replies are queued ahead of time,
//! every transmitted command is logged, and timeouts or faults can be
//! injected at any point in the script.

use super::error::TransportError;
use super::traits::LineTransport;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted outcome for a `read_line` call.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// The device answers with this line.
    Line(String),
    /// Nothing arrives within the bound; `read_line` times out.
    Silence,
    /// The channel faults mid-run.
    Fault,
}

#[derive(Debug, Default)]
struct MockState {
    script: VecDeque<MockReply>,
    commands: Vec<String>,
    fail_next_write: bool,
}

/// Mock implementation of [`LineTransport`].
///
/// Clones share state, so a test can keep one handle for inspection while the
/// acquisition worker owns another.
#[derive(Debug, Clone)]
pub struct MockChannel {
    name: String,
    state: Arc<Mutex<MockState>>,
}

impl MockChannel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Queue the next reply the device will give.
    pub fn push_reply(&self, reply: MockReply) {
        self.state.lock().unwrap().script.push_back(reply);
    }

    /// Queue a plain reply line.
    pub fn push_line(&self, line: &str) {
        self.push_reply(MockReply::Line(line.to_string()));
    }

    /// Make the next `send_command` fail with an I/O fault.
    pub fn fail_next_write(&self) {
        self.state.lock().unwrap().fail_next_write = true;
    }

    /// Every command transmitted so far, in order, without framing.
    pub fn sent_commands(&self) -> Vec<String> {
        self.state.lock().unwrap().commands.clone()
    }
}

impl LineTransport for MockChannel {
    fn send_command(&mut self, command: &str) -> Result<(), TransportError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_next_write {
            state.fail_next_write = false;
            return Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "channel gone",
            )));
        }
        state.commands.push(command.to_string());
        Ok(())
    }

    fn read_line(&mut self) -> Result<String, TransportError> {
        let mut state = self.state.lock().unwrap();
        match state.script.pop_front() {
            Some(MockReply::Line(line)) => Ok(line),
            // An exhausted script behaves like a quiet device.
            Some(MockReply::Silence) | None => {
                Err(TransportError::Timeout(Duration::from_secs(1)))
            }
            Some(MockReply::Fault) => Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "scripted fault",
            ))),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_replies_come_back_in_order() {
        let mut channel = MockChannel::new("MOCK0");
        channel.push_line("first");
        channel.push_line("second");

        assert_eq!(channel.read_line().unwrap(), "first");
        assert_eq!(channel.read_line().unwrap(), "second");
    }

    #[test]
    fn silence_and_exhaustion_time_out() {
        let mut channel = MockChannel::new("MOCK0");
        channel.push_reply(MockReply::Silence);

        assert!(channel.read_line().unwrap_err().is_timeout());
        assert!(channel.read_line().unwrap_err().is_timeout());
    }

    #[test]
    fn commands_are_logged() {
        let mut channel = MockChannel::new("MOCK0");
        channel.send_command("A").unwrap();
        channel.send_command("B").unwrap();
        assert_eq!(channel.sent_commands(), vec!["A", "B"]);
    }

    #[test]
    fn injected_write_fault_fires_once() {
        let mut channel = MockChannel::new("MOCK0");
        channel.fail_next_write();
        assert!(channel.send_command("A").is_err());
        assert!(channel.send_command("A").is_ok());
    }

    #[test]
    fn scripted_fault_is_not_a_timeout() {
        let mut channel = MockChannel::new("MOCK0");
        channel.push_reply(MockReply::Fault);
        let err = channel.read_line().unwrap_err();
        assert!(!err.is_timeout());
    }
}
