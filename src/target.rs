//! Target naming.
//!
//! One physical device maps to one logical dataset. Both sinks derive their
//! name from the same [`TargetName`], so the table and the backup file always
//! refer to the same data.

use std::fmt;
use thiserror::Error;

/// The raw name produced no usable identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("target name {0:?} is empty after sanitization")]
pub struct InvalidTargetName(pub String);

/// A sanitized identifier, safe to interpolate into DDL/DML statements and
/// file names.
///
/// Only constructible through [`TargetName::sanitize`] or
/// [`TargetName::for_device`], which retain `[A-Za-z0-9_]`, lower-case the
/// result and reject names that sanitize to nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetName(String);

impl TargetName {
    /// Sanitize a raw name into a valid identifier.
    pub fn sanitize(raw: &str) -> Result<Self, InvalidTargetName> {
        let cleaned: String = raw
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .flat_map(char::to_lowercase)
            .collect();

        if cleaned.is_empty() {
            Err(InvalidTargetName(raw.to_string()))
        } else {
            Ok(Self(cleaned))
        }
    }

    /// Derive the dataset name for one device:
    /// `r<reactor>_<sensor>_sensor_data`, sanitized as a whole.
    pub fn for_device(reactor_id: &str, sensor_name: &str) -> Result<Self, InvalidTargetName> {
        Self::sanitize(&format!("r{reactor_id}_{sensor_name}_sensor_data"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the backup log for this target.
    pub fn csv_file_name(&self) -> String {
        format!("{}.csv", self.0)
    }
}

impl fmt::Display for TargetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
