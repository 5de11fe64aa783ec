//! Process settings read from the environment (and `.env`) at startup.

use std::env;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("{name} must be a valid port number, got {value:?}")]
    InvalidPort { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub store_path: PathBuf,
    pub typst_bin: String,
    pub ui_origin: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            store_path: PathBuf::from("./data/store.json"),
            typst_bin: "typst".to_string(),
            ui_origin: "http://localhost:5173".to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build settings from any variable source, falling back to defaults
    /// for unset or blank values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port = match var("VOUCHER_PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|_| SettingsError::InvalidPort {
                    name: "VOUCHER_PORT",
                    value,
                })?,
            None => defaults.port,
        };

        Ok(Self {
            host: var("VOUCHER_HOST").unwrap_or(defaults.host),
            port,
            store_path: var("VOUCHER_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            typst_bin: var("TYPST_BIN").unwrap_or(defaults.typst_bin),
            ui_origin: var("VOUCHER_UI_ORIGIN").unwrap_or(defaults.ui_origin),
        })
    }
}
