//! Application settings loading from config.toml
//!
//! Every field has a default, so the file itself is optional. A missing file yields the
//! defaults; a file that exists but cannot be parsed is an error. `DATABASE_URL` in the
//! environment (or `.env`) always wins over the file.

use crate::{
    config::database::DEFAULT_DATABASE_URL,
    errors::{Error, Result},
};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "LEDGER_CONFIG";

/// Environment variable overriding the configured database.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Config file used when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Connection string for the ledger database
    pub database_url: String,
    /// Local hour (0-23) at which the daily materialization run fires
    pub daily_run_hour: u32,
    /// Materialize due templates once at startup
    pub run_on_startup: bool,
    /// Keep running and materialize once per day
    pub run_daily: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            daily_run_hour: 6,
            run_on_startup: true,
            run_daily: true,
        }
    }
}

impl AppConfig {
    /// Rejects values the scheduler cannot act on.
    pub fn validate(&self) -> Result<()> {
        if self.daily_run_hour > 23 {
            return Err(Error::Config {
                message: format!(
                    "daily_run_hour must be between 0 and 23, got {}",
                    self.daily_run_hour
                ),
            });
        }
        if self.database_url.trim().is_empty() {
            return Err(Error::Config {
                message: "database_url cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - A field has the wrong type
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Builds the effective configuration from an optional file and an optional
/// database URL override, then validates it.
pub fn resolve_configuration<P: AsRef<Path>>(
    path: P,
    database_url_override: Option<String>,
) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    let mut config = if path_ref.exists() {
        load_config(path_ref)?
    } else {
        warn!(
            "Config file {} not found, using defaults",
            path_ref.display()
        );
        AppConfig::default()
    };

    if let Some(url) = database_url_override.filter(|u| !u.trim().is_empty()) {
        debug!("DATABASE_URL overrides configured database");
        config.database_url = url;
    }

    config.validate()?;
    Ok(config)
}

/// Loads the application configuration from the process environment.
///
/// The file is `$LEDGER_CONFIG` or `./config.toml`; `$DATABASE_URL` overrides the
/// database it names.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = resolve_configuration(&path, std::env::var(DATABASE_URL_ENV).ok())?;
    info!(
        "Configuration loaded: daily run at {:02}:00, startup run {}, daily run {}",
        config.daily_run_hour, config.run_on_startup, config.run_daily
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use std::path::PathBuf;

    fn write_temp_config(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "recurring-ledger-{}-{name}.toml",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_parse_partial_config_uses_defaults() {
        let config: AppConfig = toml::from_str("daily_run_hour = 9").unwrap();
        assert_eq!(config.daily_run_hour, 9);
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert!(config.run_on_startup);
        assert!(config.run_daily);
    }

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
            database_url = "sqlite::memory:"
            daily_run_hour = 0
            run_on_startup = false
            run_daily = false
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.daily_run_hour, 0);
        assert!(!config.run_on_startup);
        assert!(!config.run_daily);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = resolve_configuration("definitely/not/here.toml", None).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_database_url_override() {
        let path = write_temp_config("override", r#"database_url = "sqlite://file.db""#);
        let config =
            resolve_configuration(&path, Some("sqlite://other.db".to_string())).unwrap();
        assert_eq!(config.database_url, "sqlite://other.db");

        let config = resolve_configuration(&path, Some("  ".to_string())).unwrap();
        assert_eq!(config.database_url, "sqlite://file.db");

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_invalid_hour_is_rejected() {
        let path = write_temp_config("bad-hour", "daily_run_hour = 24");
        let result = resolve_configuration(&path, None);
        assert!(matches!(result, Err(Error::Config { .. })));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let path = write_temp_config("malformed", "daily_run_hour = \"six\"");
        let result = resolve_configuration(&path, None);
        assert!(matches!(result, Err(Error::Config { .. })));
        std::fs::remove_file(path).ok();
    }
}
