//! Application-level error types.
//!
//! Start-time failures are surfaced synchronously to the caller and keep the
//! state machine in `Idle`. In-loop conditions never appear here: recoverable
//! ones (timeouts, rejections, sink write failures) are reported and
//! swallowed inside the loop, fatal channel faults terminate the run on
//! their own.

use crate::sink::SinkError;
use crate::transport::TransportError;
use thiserror::Error;

/// Why a start request was rejected.
#[derive(Debug, Error)]
pub enum StartError {
    /// Missing or unusable identification/configuration fields.
    #[error("invalid run configuration: {0}")]
    Config(String),

    /// The serial channel could not be opened.
    #[error("cannot open serial channel: {0}")]
    Connection(#[from] TransportError),

    /// Schema or header provisioning failed.
    #[error("sink provisioning failed: {0}")]
    Provision(#[from] SinkError),

    /// A run is already active; stop it first.
    #[error("an acquisition run is already active")]
    AlreadyRunning,
}
