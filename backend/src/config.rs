//! Server settings, read from the environment after an optional `.env` file is loaded.

use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_JSON_LIMIT: usize = 10 * 1024 * 1024; // 10 MB

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub database: PathBuf,
    pub templates_dir: PathBuf,
    pub fonts_dir: PathBuf,
    /// LibreOffice binary used for PDF conversion, when installed.
    pub soffice: Option<PathBuf>,
    pub open_browser: bool,
    pub json_limit: usize,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the settings from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let data_dir = PathBuf::from(get("DOCGEN_DATA_DIR").unwrap_or_else(|| ".".to_string()));
        let path_or = |key: &str, default: &str| {
            get(key)
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join(default))
        };

        Ok(Settings {
            host: get("DOCGEN_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or("DOCGEN_PORT", get("DOCGEN_PORT"), DEFAULT_PORT)?,
            database: path_or("DOCGEN_DATABASE", "docgen.sqlite"),
            templates_dir: path_or("DOCGEN_TEMPLATES_DIR", "templates"),
            fonts_dir: path_or("DOCGEN_FONTS_DIR", "fonts"),
            soffice: get("DOCGEN_SOFFICE").map(PathBuf::from),
            open_browser: parse_bool("DOCGEN_OPEN_BROWSER", get("DOCGEN_OPEN_BROWSER"), true)?,
            json_limit: parse_or("DOCGEN_JSON_LIMIT", get("DOCGEN_JSON_LIMIT"), DEFAULT_JSON_LIMIT)?,
            data_dir,
        })
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, SettingsError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| SettingsError::InvalidValue { key, value }),
    }
}

fn parse_bool(key: &'static str, raw: Option<String>, default: bool) -> Result<bool, SettingsError> {
    match raw.as_deref().map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) if matches!(v.as_str(), "1" | "true" | "yes" | "on") => Ok(true),
        Some(v) if matches!(v.as_str(), "0" | "false" | "no" | "off") => Ok(false),
        Some(_) => Err(SettingsError::InvalidValue {
            key,
            value: raw.unwrap_or_default(),
        }),
    }
}
