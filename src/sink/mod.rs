//! Record sinks.
//!
//! Each parsed reading fans out to every sink independently: the relational
//! store is primary but non-blocking on failure, the append log is the
//! guaranteed-retention backup. Sink failures are recoverable by contract;
//! they are reported to the orchestrator and never abort the other sink or
//! the run.

mod append;
mod durable;

pub use append::AppendLog;
pub use durable::DurableStore;

use crate::parser::SensorReading;
use async_trait::async_trait;
use thiserror::Error;

/// A write failure in one sink. Always recoverable for the run.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("append log I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A destination for readings.
///
/// `write` records exactly one reading, stamping it with the local time at
/// the moment of the write.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Short sink label for diagnostics ("durable", "append").
    fn kind(&self) -> &'static str;

    async fn write(&self, reading: &SensorReading) -> Result<(), SinkError>;
}
