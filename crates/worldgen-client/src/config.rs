//! Layered configuration
//!
//! Settings are loaded with two file layers (global `~/.worldgen/config.toml`,
//! then project-local `.worldgen/config.toml`, the latter winning), with CLI
//! flags applied on top by the caller. The API key is deliberately not a file
//! setting: it is read exactly once from the `WLT_API_KEY` environment
//! variable, and its absence is a fatal error reported before any network
//! call is made.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use worldgen_core::{Result, WorldgenError};

/// Environment variable holding the service API key.
pub const API_KEY_ENV: &str = "WLT_API_KEY";

pub const DEFAULT_MODEL: &str = "Marble 0.1-plus";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const DEFAULT_TIMEOUT_SECS: u64 = 900;

/// On-disk config file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub poll_interval_secs: Option<u64>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Resolved configuration for one invocation.
#[derive(Debug, Clone)]
pub struct WorldgenConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl WorldgenConfig {
    /// Load config with layered precedence: global file < project file,
    /// then require the API key from the environment.
    pub fn load() -> Result<Self> {
        let mut file = ConfigFile::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                merge_into(&mut file, load_file(&global_path)?);
            }
        }

        let local_path = PathBuf::from(".worldgen/config.toml");
        if local_path.exists() {
            merge_into(&mut file, load_file(&local_path)?);
        }

        let api_key = read_api_key()?;
        Ok(Self::resolve(file, api_key))
    }

    /// Build a config from a parsed file and an explicit key (for testing).
    pub fn from_file(file: ConfigFile, api_key: String) -> Self {
        Self::resolve(file, api_key)
    }

    fn resolve(file: ConfigFile, api_key: String) -> Self {
        let service = file.service;
        WorldgenConfig {
            api_key,
            base_url: service
                .base_url
                .unwrap_or_else(|| crate::http::DEFAULT_BASE_URL.to_string()),
            model: service.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            poll_interval: Duration::from_secs(
                service.poll_interval_secs.unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
            ),
            timeout: Duration::from_secs(service.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        }
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".worldgen").join("config.toml"))
    }
}

/// Read the API key from the environment.
fn read_api_key() -> Result<String> {
    api_key_from(std::env::var(API_KEY_ENV).ok())
}

/// Validate an API key value. Absent, empty, and whitespace-only all count
/// as missing; the error names the variable the user has to set.
fn api_key_from(value: Option<String>) -> Result<String> {
    match value {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(WorldgenError::Auth(format!(
            "Missing {} environment variable. Example:\n  export {}='...'",
            API_KEY_ENV, API_KEY_ENV
        ))),
    }
}

fn load_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| {
        WorldgenError::Config(format!("Failed to parse config {}: {}", path.display(), e))
    })
}

fn merge_into(base: &mut ConfigFile, overlay: ConfigFile) {
    if overlay.service.base_url.is_some() {
        base.service.base_url = overlay.service.base_url;
    }
    if overlay.service.model.is_some() {
        base.service.model = overlay.service.model;
    }
    if overlay.service.poll_interval_secs.is_some() {
        base.service.poll_interval_secs = overlay.service.poll_interval_secs;
    }
    if overlay.service.timeout_secs.is_some() {
        base.service.timeout_secs = overlay.service.timeout_secs;
    }
}
