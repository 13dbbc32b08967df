use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::place::LatLng;
use crate::submit::DEFAULT_BACKEND_URL;

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "stopover";

const BACKEND_URL_ENV: &str = "STOPOVER_BACKEND_URL";
const GOOGLE_API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";

const VALID_KEYS: &str = "backend.url, google.api_key, home";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<BackendConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google: Option<GoogleConfig>,

    /// Position used as the current location when none is given on the
    /// command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<LatLng>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// API key. If not set, falls back to the GOOGLE_MAPS_API_KEY environment
    /// variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    /// Load the config at `path`, or defaults when there is no file yet.
    ///
    /// Unreadable or malformed files are errors, so callers that write the
    /// config back never replace a file they could not parse.
    pub fn load_existing_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!("Failed to read config: {e}")),
        }
    }

    pub fn load_or_default() -> Self {
        match Self::path().and_then(|path| Self::load_existing_from(&path)) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring configuration: {e:#}");
                Self::default()
            }
        }
    }

    fn parse(contents: &str, path: &Path) -> Result<Self> {
        serde_yaml::from_str(contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# Stopover configuration\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Backend base URL: config, then STOPOVER_BACKEND_URL, then localhost.
    pub fn backend_url(&self) -> String {
        self.resolve_backend_url(std::env::var(BACKEND_URL_ENV).ok())
    }

    fn resolve_backend_url(&self, from_env: Option<String>) -> String {
        self.backend
            .as_ref()
            .and_then(|b| b.url.clone())
            .filter(|url| !url.is_empty())
            .or(from_env.filter(|url| !url.is_empty()))
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
    }

    /// Resolve the Google API key from config or environment variable.
    pub fn google_api_key(&self) -> Option<String> {
        self.resolve_google_api_key(std::env::var(GOOGLE_API_KEY_ENV).ok())
    }

    fn resolve_google_api_key(&self, from_env: Option<String>) -> Option<String> {
        self.google
            .as_ref()
            .and_then(|g| g.api_key.clone())
            .filter(|key| !key.is_empty())
            .or(from_env.filter(|key| !key.is_empty()))
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "backend.url" => {
                if !(value.starts_with("http://") || value.starts_with("https://")) {
                    anyhow::bail!(
                        "Invalid backend URL: {value}. Must start with 'http://' or 'https://'."
                    );
                }
                self.backend.get_or_insert_with(BackendConfig::default).url =
                    Some(value.trim_end_matches('/').to_string());
            }
            "google.api_key" => {
                if value.trim().is_empty() {
                    anyhow::bail!("Invalid API key: must not be empty.");
                }
                self.google.get_or_insert_with(GoogleConfig::default).api_key =
                    Some(value.trim().to_string());
            }
            "home" => {
                let at: LatLng = value
                    .parse()
                    .map_err(|e| anyhow::anyhow!("Invalid home: {e}"))?;
                self.home = Some(at);
            }
            _ => anyhow::bail!("Unknown config key: {key}. Valid keys: {VALID_KEYS}"),
        }
        Ok(())
    }
}
