//! Client configuration loading
//!
//! Resolution priority for the backend URL:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`PATRIMONI_API_URL`)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Every other setting comes from the TOML file when present, else from the
//! compiled defaults. A missing config file is not an error.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use url::Url;

use crate::{Error, Result};

/// Environment variable overriding the backend URL
pub const API_URL_ENV: &str = "PATRIMONI_API_URL";

/// Backend used when nothing else is configured
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

/// Largest image accepted for upload (2 MiB)
pub const DEFAULT_MAX_IMAGE_BYTES: u64 = 2 * 1024 * 1024;

/// Default page size of list views
pub const DEFAULT_PAGE_LIMIT: u32 = 10;

/// Buffered session events per subscriber
pub const DEFAULT_EVENT_CAPACITY: usize = 16;

/// Host and ports an embedded map iframe may point to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedOrigin {
    pub host: String,
    pub ports: Vec<u16>,
}

impl AllowedOrigin {
    pub fn new(host: impl Into<String>, ports: &[u16]) -> Self {
        Self {
            host: host.into(),
            ports: ports.to_vec(),
        }
    }

    /// Whether `host:port` is covered by this entry
    pub fn allows(&self, host: &str, port: Option<u16>) -> bool {
        self.host.eq_ignore_ascii_case(host) && port.is_some_and(|p| self.ports.contains(&p))
    }
}

/// Development whitelist: localhost on the dev-server, preview and API ports
pub fn default_iframe_whitelist() -> Vec<AllowedOrigin> {
    vec![AllowedOrigin::new("localhost", &[3000, 5173, 4173, 8000])]
}

/// Resolved client configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Backend base URL, without trailing slash
    pub api_base: String,
    pub iframe_whitelist: Vec<AllowedOrigin>,
    pub max_image_bytes: u64,
    pub default_page_limit: u32,
    /// No timeout unless set; a hung request stays pending
    pub request_timeout_secs: Option<u64>,
    pub event_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            iframe_whitelist: default_iframe_whitelist(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            default_page_limit: DEFAULT_PAGE_LIMIT,
            request_timeout_secs: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl ClientConfig {
    /// Defaults pointed at another backend
    pub fn with_api_base(api_base: &str) -> Result<Self> {
        Ok(Self {
            api_base: normalize_api_base(api_base)?,
            ..Self::default()
        })
    }
}

/// Validate an http(s) base URL and strip trailing slashes
pub fn normalize_api_base(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed =
        Url::parse(trimmed).map_err(|e| Error::Config(format!("Invalid API URL {raw:?}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "API URL must use http or https: {raw:?}"
        )));
    }
    Ok(trimmed.to_string())
}

/// On-disk configuration file; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub api_url: Option<String>,
    pub iframe_whitelist: Option<Vec<AllowedOrigin>>,
    pub max_image_bytes: Option<u64>,
    pub default_page_limit: Option<u32>,
    pub request_timeout_secs: Option<u64>,
    pub event_capacity: Option<usize>,
}

impl TomlConfig {
    /// Parse TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config file: {e}")))
    }

    /// Read and parse a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }
}

/// Default config file location (`~/.config/patrimoni/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("patrimoni").join("config.toml"))
}

/// Applies the priority order above
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    cli_api_url: Option<String>,
    config_path: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend URL given on the command line
    pub fn with_cli_api_url(mut self, url: Option<String>) -> Self {
        self.cli_api_url = url;
        self
    }

    /// Explicit config file; must exist when given
    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    fn load_toml(&self) -> Result<Option<TomlConfig>> {
        if let Some(path) = &self.config_path {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            return TomlConfig::load(path).map(Some);
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                debug!("Loading config from {}", path.display());
                TomlConfig::load(&path).map(Some)
            }
            Some(path) => {
                warn!("No config file at {}, using defaults", path.display());
                Ok(None)
            }
            None => {
                warn!("Could not determine config directory, using defaults");
                Ok(None)
            }
        }
    }

    /// Resolve the final configuration
    pub fn resolve(&self) -> Result<ClientConfig> {
        let file = self.load_toml()?.unwrap_or_default();
        let defaults = ClientConfig::default();

        // Priority 1 -> 4
        let api_base = self
            .cli_api_url
            .clone()
            .or_else(|| std::env::var(API_URL_ENV).ok().filter(|v| !v.trim().is_empty()))
            .or(file.api_url)
            .unwrap_or(defaults.api_base);

        let default_page_limit = file
            .default_page_limit
            .unwrap_or(defaults.default_page_limit);
        if default_page_limit == 0 {
            return Err(Error::Config("default_page_limit must be at least 1".to_string()));
        }

        let event_capacity = file.event_capacity.unwrap_or(defaults.event_capacity);
        if event_capacity == 0 {
            return Err(Error::Config("event_capacity must be at least 1".to_string()));
        }

        Ok(ClientConfig {
            api_base: normalize_api_base(&api_base)?,
            iframe_whitelist: file.iframe_whitelist.unwrap_or(defaults.iframe_whitelist),
            max_image_bytes: file.max_image_bytes.unwrap_or(defaults.max_image_bytes),
            default_page_limit,
            request_timeout_secs: file.request_timeout_secs.filter(|s| *s > 0),
            event_capacity,
        })
    }
}
