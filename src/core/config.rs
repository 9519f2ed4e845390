//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.askterm/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::banner::DEFAULT_BANNER_TIMEOUT;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct AskConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub base_url: Option<String>,
    pub endpoint: Option<String>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UiConfig {
    pub banner_timeout_secs: Option<u64>,
    pub examples: Option<Vec<String>>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_ENDPOINT: &str = "/ask";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub endpoint: String,
    /// `None` means wait forever; a hung request keeps the input disabled.
    pub request_timeout: Option<Duration>,
    pub banner_timeout: Duration,
    pub examples: Vec<String>,
}

impl ResolvedConfig {
    /// Full URL the query is posted to.
    ///
    /// An `endpoint` that is already an absolute http(s) URL wins over
    /// `base_url`; a path is joined onto it.
    pub fn endpoint_url(&self) -> String {
        if let Ok(url) = reqwest::Url::parse(&self.endpoint)
            && matches!(url.scheme(), "http" | "https")
        {
            return self.endpoint.clone();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.endpoint.trim_start_matches('/')
        )
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.askterm/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".askterm").join("config.toml"))
}

/// Load config from `~/.askterm/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `AskConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<AskConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(AskConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<AskConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(AskConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: AskConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

fn generate_default_config(path: &Path) {
    let default_content = r#"# askterm configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [server]
# base_url = "http://localhost:5000"   # Or set ASKTERM_SERVER_URL
# endpoint = "/ask"                    # Or set ASKTERM_ENDPOINT
# request_timeout_secs = 120           # Unset = wait indefinitely

# [ui]
# banner_timeout_secs = 5
# examples = [
#     "Recommend three albums for a rainy afternoon",
#     "Explain the difference between TCP and UDP",
# ]
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// CLI overrides; `None` means the flag was not given.
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub server: Option<String>,
    pub endpoint: Option<String>,
}

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &AskConfig, cli: &CliOverrides) -> ResolvedConfig {
    // Server: CLI → env → config → default
    let base_url = cli
        .server
        .clone()
        .or_else(|| std::env::var("ASKTERM_SERVER_URL").ok())
        .or_else(|| config.server.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let endpoint = cli
        .endpoint
        .clone()
        .or_else(|| std::env::var("ASKTERM_ENDPOINT").ok())
        .or_else(|| config.server.endpoint.clone())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    let banner_timeout = config
        .ui
        .banner_timeout_secs
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_BANNER_TIMEOUT);

    ResolvedConfig {
        base_url,
        endpoint,
        request_timeout: config.server.request_timeout_secs.map(Duration::from_secs),
        banner_timeout,
        examples: config.ui.examples.clone().unwrap_or_default(),
    }
}
