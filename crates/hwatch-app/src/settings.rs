//! Application settings
//!
//! Loaded from `<config dir>/homewatch/config.toml`, with environment
//! variables taking precedence (`HWATCH_API_URL`, `HWATCH_SOCKET_URL`).
//! A missing file yields defaults; a missing base URL is reported through
//! [`crate::diagnostics`], never a panic.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use hwatch_core::prelude::*;

use crate::notifications::DEFAULT_RETENTION_CAP;

const CONFIG_FILENAME: &str = "config.toml";
const CONFIG_DIR: &str = "homewatch";

/// Environment override for the REST base URL
pub const API_URL_ENV: &str = "HWATCH_API_URL";
/// Environment override for the real-time base URL
pub const SOCKET_URL_ENV: &str = "HWATCH_SOCKET_URL";

/// Push-messaging configuration block
///
/// Delivered as static configuration for the external push service; none
/// of it is business logic.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PushConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
}

/// Global application settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Settings {
    /// REST API base URL (e.g. `https://api.example.com/v1`)
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Real-time channel base URL (e.g. `wss://rt.example.com`)
    #[serde(default)]
    pub socket_base_url: Option<String>,

    /// Per-category notification retention cap
    #[serde(default = "default_retention_cap")]
    pub retention_cap: usize,

    #[serde(default)]
    pub push: PushConfig,
}

fn default_retention_cap() -> usize {
    DEFAULT_RETENTION_CAP
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: None,
            socket_base_url: None,
            retention_cap: DEFAULT_RETENTION_CAP,
            push: PushConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings from the given file (or the default location), then
    /// apply environment overrides
    ///
    /// A missing file is not an error -- defaults apply and the diagnostics
    /// pass reports anything required that is still absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path(),
        };

        let mut settings = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            toml::from_str(&raw).map_err(|e| {
                Error::config(format!("invalid config file {}: {e}", path.display()))
            })?
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            Settings::default()
        };

        settings.apply_env_overrides();
        Ok(settings)
    }

    /// Default config file location
    pub fn default_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join(CONFIG_DIR).join(CONFIG_FILENAME)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var(API_URL_ENV) {
            if !value.is_empty() {
                self.api_base_url = Some(value);
            }
        }
        if let Ok(value) = std::env::var(SOCKET_URL_ENV) {
            if !value.is_empty() {
                self.socket_base_url = Some(value);
            }
        }
    }

    /// Parsed REST base URL, if configured and well-formed
    pub fn api_url(&self) -> Option<Url> {
        self.api_base_url
            .as_deref()
            .and_then(|raw| Url::parse(raw).ok())
    }

    /// Parsed real-time base URL, if configured and well-formed
    pub fn socket_url(&self) -> Option<Url> {
        self.socket_base_url
            .as_deref()
            .and_then(|raw| Url::parse(raw).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_missing_file_yields_defaults() {
        std::env::remove_var(API_URL_ENV);
        std::env::remove_var(SOCKET_URL_ENV);

        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(Some(&dir.path().join("nope.toml"))).unwrap();
        assert!(settings.api_base_url.is_none());
        assert_eq!(settings.retention_cap, DEFAULT_RETENTION_CAP);
    }

    #[test]
    #[serial]
    fn test_file_values_are_read() {
        std::env::remove_var(API_URL_ENV);
        std::env::remove_var(SOCKET_URL_ENV);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
api_base_url = "https://api.example.com/v1"
socket_base_url = "wss://rt.example.com"
retention_cap = 25

[push]
sender_id = "1234"
"#,
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.retention_cap, 25);
        assert_eq!(settings.push.sender_id.as_deref(), Some("1234"));
        assert_eq!(
            settings.api_url().unwrap().as_str(),
            "https://api.example.com/v1"
        );
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, r#"api_base_url = "https://file.example.com""#).unwrap();

        std::env::set_var(API_URL_ENV, "https://env.example.com");
        std::env::remove_var(SOCKET_URL_ENV);
        let settings = Settings::load(Some(&path)).unwrap();
        std::env::remove_var(API_URL_ENV);

        assert_eq!(
            settings.api_base_url.as_deref(),
            Some("https://env.example.com")
        );
    }

    #[test]
    #[serial]
    fn test_invalid_toml_is_a_config_error() {
        std::env::remove_var(API_URL_ENV);
        std::env::remove_var(SOCKET_URL_ENV);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_base_url = [broken").unwrap();

        let err = Settings::load(Some(&path)).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_unparseable_url_reads_as_none() {
        let settings = Settings {
            api_base_url: Some("not a url".into()),
            ..Settings::default()
        };
        assert!(settings.api_url().is_none());
    }
}
