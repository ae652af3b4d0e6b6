//! Configuration management.
//!
//! A fully-enumerated TOML schema with env-var overrides, validated once into
//! a [`RunConfiguration`] before a run starts.

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{resolve_config_path, ConfigLoader};
pub use schema::{
    Config, DatabaseSection, DeviceSection, LoggingSection, RunConfiguration, SerialSection,
};
