//! Configuration for the regional API client
//!
//! [`ClientConfig`] carries every constant the client needs (URL templates,
//! file locations, freshness window, timeouts) and is built once at startup.
//! [`Credentials`] are read from the JSON configuration file it points at.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::store::{self, StoreError};

/// Placeholder substituted with the region code in host templates
pub const REGION_PLACEHOLDER: &str = "{region}";

/// Freshness window for cached character profiles
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(86400);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("Missing required field '{field}' in {}", .path.display())]
    MissingField { field: &'static str, path: PathBuf },

    #[error("No regions defined in {}", .path.display())]
    EmptyRegionSet { path: PathBuf },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ConfigError {
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    pub fn missing_field(field: &'static str, path: impl Into<PathBuf>) -> Self {
        Self::MissingField {
            field,
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// JSON file holding the API key or OAuth client credentials
    pub config_file: PathBuf,

    /// JSON file holding the region set, rewritten on realm refresh
    pub regions_file: PathBuf,

    /// Root directory for cached character profiles
    pub characters_dir: PathBuf,

    /// Root directory for downloaded icons
    pub icons_dir: PathBuf,

    /// API host template, `{region}` is replaced with the region code
    pub api_host: String,

    /// OAuth token host template
    pub token_host: String,

    /// Icon render CDN host template
    pub icon_host: String,

    /// Locale passed with every API request
    pub locale: String,

    /// How long a cached character profile stays fresh
    pub cache_ttl: Duration,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// Request timeout
    pub request_timeout: Duration,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            config_file: PathBuf::from("config/config.json"),
            regions_file: PathBuf::from("config/regions.json"),
            characters_dir: PathBuf::from("cache/characters"),
            icons_dir: PathBuf::from("cache/icons"),
            api_host: "https://{region}.api.blizzard.com".to_string(),
            token_host: "https://{region}.battle.net".to_string(),
            icon_host: "https://render-{region}.worldofwarcraft.com".to_string(),
            locale: "en_US".to_string(),
            cache_ttl: DEFAULT_CACHE_TTL,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("armory-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    /// Create configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            config_file: env_path("ARMORY_CONFIG_FILE").unwrap_or(defaults.config_file),
            regions_file: env_path("ARMORY_REGIONS_FILE").unwrap_or(defaults.regions_file),
            characters_dir: env_path("ARMORY_CHARACTERS_DIR").unwrap_or(defaults.characters_dir),
            icons_dir: env_path("ARMORY_ICONS_DIR").unwrap_or(defaults.icons_dir),
            api_host: std::env::var("ARMORY_API_HOST").unwrap_or(defaults.api_host),
            token_host: std::env::var("ARMORY_TOKEN_HOST").unwrap_or(defaults.token_host),
            icon_host: std::env::var("ARMORY_ICON_HOST").unwrap_or(defaults.icon_host),
            locale: std::env::var("ARMORY_LOCALE").unwrap_or(defaults.locale),
            cache_ttl: env_secs("ARMORY_CACHE_TTL").unwrap_or(defaults.cache_ttl),
            connect_timeout: env_secs("ARMORY_CONNECT_TIMEOUT")
                .unwrap_or(defaults.connect_timeout),
            request_timeout: env_secs("ARMORY_REQUEST_TIMEOUT")
                .unwrap_or(defaults.request_timeout),
            user_agent: defaults.user_agent,
        }
    }

    /// Read credentials from [`Self::config_file`]
    pub async fn load_credentials(&self) -> Result<Credentials, ConfigError> {
        Credentials::load(&self.config_file).await
    }
}

fn env_path(name: &str) -> Option<PathBuf> {
    std::env::var_os(name).map(PathBuf::from)
}

fn env_secs(name: &str) -> Option<Duration> {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
}

/// Substitute the region code into a host template
pub fn region_host(template: &str, region: &str) -> String {
    template.replace(REGION_PLACEHOLDER, region)
}

/// API credentials, one mode per deployment
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Static API key embedded in every request URL
    ApiKey(String),
    /// OAuth client-credentials pair exchanged for a bearer token per request
    ClientCredentials {
        client_key: String,
        client_secret: String,
    },
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
            Self::ClientCredentials { client_key, .. } => f
                .debug_struct("ClientCredentials")
                .field("client_key", client_key)
                .field("client_secret", &"<redacted>")
                .finish(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CredentialsFile {
    key: Option<String>,
    client_key: Option<String>,
    client_secret: Option<String>,
}

impl Credentials {
    /// Load credentials from a JSON configuration file
    ///
    /// The presence of `clientKey` or `clientSecret` selects OAuth mode, in
    /// which both are required. Otherwise `key` is required.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file: CredentialsFile = store::read_json(path)
            .await?
            .ok_or_else(|| ConfigError::file_not_found(path))?;
        Self::from_file(file, path)
    }

    fn from_file(file: CredentialsFile, path: &Path) -> Result<Self, ConfigError> {
        let present = |v: Option<String>| v.filter(|s| !s.is_empty());
        let client_key = present(file.client_key);
        let client_secret = present(file.client_secret);

        if client_key.is_some() || client_secret.is_some() {
            let client_key =
                client_key.ok_or_else(|| ConfigError::missing_field("clientKey", path))?;
            let client_secret =
                client_secret.ok_or_else(|| ConfigError::missing_field("clientSecret", path))?;
            return Ok(Self::ClientCredentials {
                client_key,
                client_secret,
            });
        }

        present(file.key)
            .map(Self::ApiKey)
            .ok_or_else(|| ConfigError::missing_field("key", path))
    }

    /// Whether requests need a bearer token
    pub fn is_oauth(&self) -> bool {
        matches!(self, Self::ClientCredentials { .. })
    }
}
