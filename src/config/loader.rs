//! Configuration loader with file resolution and environment override support.

use super::error::{ConfigError, ConfigResult};
use super::schema::Config;
use std::path::{Path, PathBuf};

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "SENSOR_LOGGER";

/// Config file name
const CONFIG_FILE_NAME: &str = "sensor-logger.toml";

/// Environment variable for an explicit config path
const CONFIG_PATH_ENV: &str = "SENSOR_LOGGER_CONFIG";

/// Configuration loader with resolution and override logic.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Resolved config file path (if any)
    pub config_path: Option<PathBuf>,
    /// The loaded configuration
    pub config: Config,
}

impl ConfigLoader {
    /// Load configuration using standard resolution order.
    ///
    /// Resolution priority (highest to lowest):
    /// 1. `SENSOR_LOGGER_CONFIG` environment variable (explicit path)
    /// 2. `./sensor-logger.toml` (current directory)
    /// 3. `~/.config/sensor-logger/sensor-logger.toml` (XDG) or
    ///    `%APPDATA%\sensor-logger\sensor-logger.toml` (Windows)
    /// 4. Built-in defaults (no file required)
    ///
    /// Environment variables can override any loaded value; database
    /// credentials in particular are usually supplied this way rather than
    /// written into the file.
    pub fn load() -> ConfigResult<Self> {
        let config_path = resolve_config_path();

        let mut config = if let Some(ref path) = config_path {
            load_from_file(path)?
        } else {
            Config::default()
        };

        apply_env_overrides(&mut config)?;

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut config = load_from_file(&path)?;
        apply_env_overrides(&mut config)?;

        Ok(Self {
            config_path: Some(path),
            config,
        })
    }

    /// Create a loader with default configuration (no file).
    pub fn with_defaults() -> Self {
        let mut config = Config::default();
        let _ = apply_env_overrides(&mut config);

        Self {
            config_path: None,
            config,
        }
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get a mutable reference to the configuration.
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }
}

/// Resolve the configuration file path using standard locations.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let cwd_config = PathBuf::from(CONFIG_FILE_NAME);
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    if let Some(config_dir) = get_config_dir() {
        let app_config = config_dir.join("sensor-logger").join(CONFIG_FILE_NAME);
        if app_config.exists() {
            return Some(app_config);
        }
    }

    None
}

/// Get the platform-specific config directory.
fn get_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA").ok().map(PathBuf::from)
    }

    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
    }
}

/// Load configuration from a file.
fn load_from_file(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(ConfigError::ParseError)
}

/// Apply environment variable overrides to the configuration.
///
/// Variables follow the pattern `SENSOR_LOGGER_<SECTION>_<KEY>`:
/// - `SENSOR_LOGGER_SERIAL_PORT=/dev/ttyUSB1`
/// - `SENSOR_LOGGER_DEVICE_COMMAND=B`
/// - `SENSOR_LOGGER_DB_PASSWORD=...`
fn apply_env_overrides(config: &mut Config) -> ConfigResult<()> {
    // Serial overrides
    if let Ok(val) = std::env::var(format!("{ENV_PREFIX}_SERIAL_PORT")) {
        config.serial.port = val;
    }
    if let Ok(val) = std::env::var(format!("{ENV_PREFIX}_SERIAL_BAUD_RATE")) {
        config.serial.baud_rate = val.parse().map_err(|_| {
            ConfigError::env_parse(format!("{ENV_PREFIX}_SERIAL_BAUD_RATE"), "invalid baud rate")
        })?;
    }
    if let Ok(val) = std::env::var(format!("{ENV_PREFIX}_SERIAL_READ_TIMEOUT_MS")) {
        config.serial.read_timeout_ms = val.parse().map_err(|_| {
            ConfigError::env_parse(
                format!("{ENV_PREFIX}_SERIAL_READ_TIMEOUT_MS"),
                "invalid timeout",
            )
        })?;
    }

    // Device overrides
    if let Ok(val) = std::env::var(format!("{ENV_PREFIX}_DEVICE_REACTOR_ID")) {
        config.device.reactor_id = val;
    }
    if let Ok(val) = std::env::var(format!("{ENV_PREFIX}_DEVICE_SENSOR_NAME")) {
        config.device.sensor_name = val;
    }
    if let Ok(val) = std::env::var(format!("{ENV_PREFIX}_DEVICE_COMMAND")) {
        config.device.command = val;
    }
    if let Ok(val) = std::env::var(format!("{ENV_PREFIX}_DEVICE_POLL_INTERVAL_SECS")) {
        config.device.poll_interval_secs = val.parse().map_err(|_| {
            ConfigError::env_parse(
                format!("{ENV_PREFIX}_DEVICE_POLL_INTERVAL_SECS"),
                "invalid interval",
            )
        })?;
    }

    // Database overrides (legacy unprefixed names accepted for credentials,
    // matching the .env convention the lab already uses)
    if let Ok(val) =
        std::env::var(format!("{ENV_PREFIX}_DB_HOST")).or_else(|_| std::env::var("DB_HOST"))
    {
        config.database.host = val;
    }
    if let Ok(val) =
        std::env::var(format!("{ENV_PREFIX}_DB_PORT")).or_else(|_| std::env::var("DB_PORT"))
    {
        config.database.port = val.parse().map_err(|_| {
            ConfigError::env_parse(format!("{ENV_PREFIX}_DB_PORT or DB_PORT"), "invalid port")
        })?;
    }
    if let Ok(val) =
        std::env::var(format!("{ENV_PREFIX}_DB_NAME")).or_else(|_| std::env::var("DB_NAME"))
    {
        config.database.name = val;
    }
    if let Ok(val) =
        std::env::var(format!("{ENV_PREFIX}_DB_USER")).or_else(|_| std::env::var("DB_USER"))
    {
        config.database.user = val;
    }
    if let Ok(val) = std::env::var(format!("{ENV_PREFIX}_DB_PASSWORD"))
        .or_else(|_| std::env::var("DB_PASSWORD"))
    {
        config.database.password = val;
    }

    // Logging overrides
    if let Ok(val) = std::env::var(format!("{ENV_PREFIX}_LOG_LEVEL")) {
        config.logging.level = val;
    }
    if let Ok(val) = std::env::var(format!("{ENV_PREFIX}_DATA_DIR")) {
        config.logging.data_dir = PathBuf::from(val);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn default_loader() {
        let loader = ConfigLoader::with_defaults();
        assert_eq!(loader.config().serial.baud_rate, 19_200);
    }

    #[test]
    fn env_override_wins() {
        env::set_var("SENSOR_LOGGER_SERIAL_BAUD_RATE", "9600");

        let loader = ConfigLoader::with_defaults();
        assert_eq!(loader.config().serial.baud_rate, 9600);

        env::remove_var("SENSOR_LOGGER_SERIAL_BAUD_RATE");
    }

    #[test]
    fn legacy_db_credential_env() {
        env::set_var("DB_USER", "lab_writer");
        env::set_var("DB_PASSWORD", "hunter2");

        let loader = ConfigLoader::with_defaults();
        assert_eq!(loader.config().database.user, "lab_writer");
        assert_eq!(loader.config().database.password, "hunter2");

        env::remove_var("DB_USER");
        env::remove_var("DB_PASSWORD");
    }

    #[test]
    fn load_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sensor-logger.toml");
        std::fs::write(
            &path,
            "[device]\nreactor_id = \"5\"\nsensor_name = \"ph_probe\"\n",
        )
        .unwrap();

        let loader = ConfigLoader::load_from(&path).unwrap();
        assert_eq!(loader.config().device.reactor_id, "5");
        assert_eq!(loader.config().device.sensor_name, "ph_probe");
    }
}
