//! Append-only CSV backup.
//!
//! One file per target, created with a fixed header the first time a run
//! starts against that target, then appended to one line per reading. This
//! file is the ground truth whenever the relational store is unavailable.

use super::{RecordSink, SinkError};
use crate::parser::SensorReading;
use crate::target::TargetName;
use async_trait::async_trait;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Column header, fixed; the write path appends fields in exactly this order.
const HEADER: &str = "Timestamp,Command,Pressure,Temperature,X,Y,Air_Value,Air_Status";

/// Timestamp layout for the first column.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The flat-file sink for one target.
#[derive(Debug, Clone)]
pub struct AppendLog {
    path: PathBuf,
}

impl AppendLog {
    /// Sink writing to `<dir>/<target>.csv`.
    pub fn new(dir: impl AsRef<Path>, target: &TargetName) -> Self {
        Self {
            path: dir.as_ref().join(target.csv_file_name()),
        }
    }

    /// Create the file with its header, only if it does not already exist.
    ///
    /// Safe to call at every run start; an existing file (and its data) is
    /// left untouched.
    pub fn ensure_header(&self) -> Result<(), SinkError> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, format!("{HEADER}\n"))?;
        Ok(())
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append_line(&self, reading: &SensorReading) -> Result<(), SinkError> {
        let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(
            file,
            "{},{},{},{},{},{},{},{}",
            timestamp,
            reading.command,
            reading.pressure,
            reading.temperature,
            reading.x,
            reading.y,
            reading.air_value,
            reading.air_status
        )?;
        Ok(())
    }
}

#[async_trait]
impl RecordSink for AppendLog {
    fn kind(&self) -> &'static str {
        "append"
    }

    async fn write(&self, reading: &SensorReading) -> Result<(), SinkError> {
        self.append_line(reading)
    }
}
