//! Application settings loaded from `config.toml`.
//!
//! All sections are optional. A missing file yields the built-in defaults so the
//! binary works against a local backend out of the box.

use crate::config::policy::AttachmentPolicy;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default API base URL when neither `config.toml` nor `API_BASE_URL` set one
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Backend connection
    pub api: ApiSettings,
    /// Display preferences
    pub display: DisplaySettings,
    /// Document limits
    pub attachments: AttachmentPolicy,
}

/// `[api]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL every REST path is appended to
    pub base_url: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// `[display]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// ISO currency code used when a record does not carry its own
    pub currency: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            currency: "USD".to_string(),
        }
    }
}

/// Loads settings from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load settings from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {path_ref:?}: {e}"),
    })?;

    parse_settings(&contents)
}

/// Parses settings from TOML text.
pub fn parse_settings(contents: &str) -> Result<Settings> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads `./config.toml` if present, otherwise the defaults, then applies the
/// `API_BASE_URL` environment override.
pub fn load_default_settings() -> Result<Settings> {
    let path = Path::new("config.toml");
    let mut settings = if path.exists() {
        load_settings(path)?
    } else {
        tracing::info!("No config.toml found, using built-in defaults");
        Settings::default()
    };

    if let Ok(base_url) = std::env::var("API_BASE_URL") {
        settings.api.base_url = base_url;
    }
    settings.api.base_url = settings.api.base_url.trim_end_matches('/').to_string();
    Ok(settings)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_full_settings() {
        let toml_str = r#"
            [api]
            base_url = "https://procure.example.com/api"

            [display]
            currency = "INR"

            [attachments]
            max_files = 3
            max_file_bytes = 1048576
            allowed_mime_types = ["application/pdf"]
        "#;

        let settings = parse_settings(toml_str).unwrap();
        assert_eq!(settings.api.base_url, "https://procure.example.com/api");
        assert_eq!(settings.display.currency, "INR");
        assert_eq!(settings.attachments.max_files, 3);
        assert_eq!(settings.attachments.max_file_bytes, 1_048_576);
        assert_eq!(settings.attachments.allowed_mime_types, vec!["application/pdf"]);
    }

    #[test]
    fn test_parse_empty_settings_uses_defaults() {
        let settings = parse_settings("").unwrap();
        assert_eq!(settings.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.display.currency, "USD");
        assert_eq!(settings.attachments, AttachmentPolicy::default());
    }

    #[test]
    fn test_parse_invalid_settings() {
        let result = parse_settings("[api]\nbase_url = 5");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
