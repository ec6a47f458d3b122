//! Regional API client
//!
//! [`RegionalApiClient`] owns the region table, the credentials and the HTTP
//! client. Every operation runs its steps strictly in sequence:
//!
//! ```text
//! select_region ─► base URL template ─► [token POST] ─► GET ─► JSON
//!                                                            │
//!                            realms(true) ─► regions file ◄──┤
//!                            character    ─► character cache ◄┘
//! ```
//!
//! Mutating operations take `&mut self`; share a client between tasks only
//! behind a mutex.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

use crate::auth::fetch_access_token;
use crate::cache::{CachedCharacter, CharacterCache, is_truthy};
use crate::clock::{Clock, SystemClock};
use crate::config::{ClientConfig, ConfigError, Credentials};
use crate::endpoint::{
    CHARACTER_FIELDS, Endpoint, UrlTemplate, encode_component, icon_url, token_url,
};
use crate::error::{ArmoryError, Result};
use crate::region::{RealmMap, RegionInfo, RegionSet};
use crate::store;
use crate::transport::build_http_client;

/// Default icon edge length in pixels
pub const DEFAULT_ICON_SIZE: u32 = 36;

/// Character names are 2 to 24 characters long
const CHARACTER_NAME_LEN: std::ops::RangeInclusive<usize> = 2..=24;

/// Options for [`RegionalApiClient::icon_image_path`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconOptions {
    /// Icon edge length, also the name of the size directory
    pub size: u32,
    /// Fetch the icon from the CDN when it is not on disk
    pub download: bool,
    /// Icon root overriding [`ClientConfig::icons_dir`]
    pub dir: Option<PathBuf>,
}

impl Default for IconOptions {
    fn default() -> Self {
        Self {
            size: DEFAULT_ICON_SIZE,
            download: false,
            dir: None,
        }
    }
}

impl IconOptions {
    #[must_use]
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn with_download(mut self, download: bool) -> Self {
        self.download = download;
        self
    }

    #[must_use]
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }
}

/// Currently active region
#[derive(Debug, Clone)]
struct SelectedRegion {
    id: String,
    /// Position in the region table, `None` if the id is not a known region
    index: Option<usize>,
    base_url: UrlTemplate,
    /// Only set in OAuth mode
    token_url: Option<String>,
}

impl SelectedRegion {
    fn new(
        config: &ClientConfig,
        regions: &RegionSet,
        credentials: &Credentials,
        id: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            index: regions.index_of(id),
            base_url: UrlTemplate::for_region(config, id, credentials),
            token_url: credentials.is_oauth().then(|| token_url(config, id)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RealmStatus {
    realms: Vec<RealmEntry>,
}

#[derive(Debug, Deserialize)]
struct RealmEntry {
    slug: String,
    name: String,
}

/// Client for the regional game-data API
pub struct RegionalApiClient {
    config: ClientConfig,
    credentials: Credentials,
    regions: RegionSet,
    selected: SelectedRegion,
    http: Client,
    characters: CharacterCache,
    clock: Arc<dyn Clock>,
}

impl RegionalApiClient {
    /// Load credentials and region data and select the first region
    pub async fn new(config: ClientConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock)).await
    }

    /// Same as [`Self::new`] with a custom time source
    pub async fn with_clock(config: ClientConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let credentials = config.load_credentials().await?;
        let regions = RegionSet::load(&config.regions_file).await?;
        let first = regions
            .first_id()
            .ok_or_else(|| ConfigError::EmptyRegionSet {
                path: config.regions_file.clone(),
            })?
            .to_string();

        let http = build_http_client(&config)?;
        let selected = SelectedRegion::new(&config, &regions, &credentials, &first);
        let characters = CharacterCache::new(&config.characters_dir);

        info!(
            "Initialized client with {} regions, default region {first} ({})",
            regions.len(),
            if credentials.is_oauth() { "oauth" } else { "api key" }
        );

        Ok(Self {
            config,
            credentials,
            regions,
            selected,
            http,
            characters,
            clock,
        })
    }

    /// Make `region_id` the active region
    ///
    /// The id is not checked against the region table; use
    /// [`Self::is_valid_region`] first. An unknown id makes later operations
    /// fail with [`ArmoryError::UnknownRegion`].
    pub fn select_region(&mut self, region_id: &str) {
        debug!("Selecting region {region_id}");
        self.selected =
            SelectedRegion::new(&self.config, &self.regions, &self.credentials, region_id);
    }

    /// Code of the active region
    pub fn selected_region(&self) -> &str {
        &self.selected.id
    }

    /// Every known region
    pub fn regions(&self) -> &RegionSet {
        &self.regions
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn selected_index(&self) -> Result<usize> {
        self.selected
            .index
            .ok_or_else(|| ArmoryError::UnknownRegion(self.selected.id.clone()))
    }

    fn selected_info(&self) -> Result<&RegionInfo> {
        let index = self.selected_index()?;
        self.regions
            .get_index(index)
            .map(|(_, info)| info)
            .ok_or_else(|| ArmoryError::UnknownRegion(self.selected.id.clone()))
    }

    /// Realms of the active region, refreshed from the API first if `update_cache`
    ///
    /// A refresh replaces the realm map and rewrites the region file. If the
    /// request, its payload or the file write fails, neither the map nor the
    /// file is touched.
    pub async fn realms(&mut self, update_cache: bool) -> Result<&RealmMap> {
        if update_cache {
            let index = self.selected_index()?;
            let realms = self.fetch_realms().await?;
            let count = realms.len();

            // memory is only updated once the file is written
            let mut updated = self.regions.clone();
            if let Some(info) = updated.get_index_mut(index) {
                info.realms = realms;
            }
            updated.save(&self.config.regions_file).await?;
            self.regions = updated;
            info!("Refreshed {count} realms for region {}", self.selected.id);
        }
        self.cached_realms()
    }

    /// Realms of the active region as currently known, without a refresh
    pub fn cached_realms(&self) -> Result<&RealmMap> {
        self.selected_info().map(|info| &info.realms)
    }

    async fn fetch_realms(&self) -> Result<RealmMap> {
        let endpoint = Endpoint::RealmStatus;
        let value = self.get_json(&endpoint, &[]).await?;
        let status: RealmStatus = serde_json::from_value(value)
            .map_err(|e| ArmoryError::unexpected_response(endpoint.path(), e.to_string()))?;

        Ok(status
            .realms
            .into_iter()
            .map(|realm| (realm.slug, realm.name))
            .collect())
    }

    /// Character profile with professions and reputation
    ///
    /// Served from the character cache while it is fresh. Otherwise fetched
    /// and, unless the response is empty, written to the cache.
    pub async fn character(&self, name: &str, realm: &str) -> Result<Value> {
        self.selected_index()?;
        let region = self.selected.id.as_str();
        let now = self.clock.now();

        if let Some(data) = self
            .characters
            .read_fresh(region, realm, name, now, self.config.cache_ttl)
            .await
        {
            return Ok(data);
        }

        store::ensure_dir(self.characters.realm_dir(region, realm)).await?;

        let data = self
            .get_json(
                &Endpoint::Character { realm, name },
                &[("fields", CHARACTER_FIELDS)],
            )
            .await?;

        if !is_truthy(&data) {
            debug!("Empty profile for {name} on {region}-{realm}, not caching");
            return Ok(data);
        }

        let entry = CachedCharacter::new(now, data);
        self.characters.write(region, realm, name, &entry).await?;
        Ok(entry.data)
    }

    /// Spell data, always fetched live
    pub async fn spell(&self, spell_id: u64) -> Result<Value> {
        self.get_json(&Endpoint::Spell(spell_id), &[]).await
    }

    /// Local path of an icon, downloading it first if requested
    ///
    /// Returns `None` when the icon is not on disk and `download` is off.
    pub async fn icon_image_path(
        &self,
        icon_id: &str,
        options: &IconOptions,
    ) -> Result<Option<PathBuf>> {
        let root = options.dir.as_deref().unwrap_or(&self.config.icons_dir);
        let dir = root.join(options.size.to_string());
        store::ensure_dir(&dir).await?;

        let path = dir.join(format!("{}.jpg", encode_component(icon_id)));
        if store::exists(&path).await {
            return Ok(Some(path));
        }
        if !options.download {
            return Ok(None);
        }

        self.selected_index()?;
        let url = icon_url(&self.config, &self.selected.id, options.size, icon_id);
        debug!("Downloading icon {icon_id} ({}px)", options.size);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ArmoryError::http_status(format!("icons/{icon_id}"), status));
        }

        let bytes = response.bytes().await?;
        store::write_bytes(&path, &bytes).await?;
        Ok(Some(path))
    }

    /// Whether a character name has an acceptable length
    pub fn is_valid_character_name(name: &str) -> bool {
        CHARACTER_NAME_LEN.contains(&name.chars().count())
    }

    /// Whether `tag` is a known region code
    pub fn is_valid_region(&self, tag: &str) -> bool {
        self.regions.contains(tag)
    }

    /// Whether `realm` is a known realm slug of the active region
    pub fn is_valid_realm(&self, realm: &str) -> bool {
        self.cached_realms()
            .is_ok_and(|realms| realms.contains_key(realm))
    }

    /// Authenticated GET returning parsed JSON
    ///
    /// An empty body is returned as `null`.
    async fn get_json(&self, endpoint: &Endpoint<'_>, params: &[(&str, &str)]) -> Result<Value> {
        self.selected_index()?;

        let token = match (&self.credentials, &self.selected.token_url) {
            (
                Credentials::ClientCredentials {
                    client_key,
                    client_secret,
                },
                Some(token_url),
            ) => Some(fetch_access_token(&self.http, token_url, client_key, client_secret).await?),
            _ => None,
        };

        let url = self
            .selected
            .base_url
            .format(endpoint, token.as_deref(), params.iter().copied());
        debug!("GET {endpoint} in region {}", self.selected.id);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ArmoryError::http_status(endpoint.path(), status));
        }

        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        serde_json::from_slice(&body)
            .map_err(|e| ArmoryError::unexpected_response(endpoint.path(), e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_name_length() {
        assert!(!RegionalApiClient::is_valid_character_name(""));
        assert!(!RegionalApiClient::is_valid_character_name("a"));
        assert!(RegionalApiClient::is_valid_character_name("ab"));
        assert!(RegionalApiClient::is_valid_character_name(&"x".repeat(24)));
        assert!(!RegionalApiClient::is_valid_character_name(&"x".repeat(25)));
    }

    #[test]
    fn test_character_name_counts_characters_not_bytes() {
        // 12 two-byte characters
        assert!(RegionalApiClient::is_valid_character_name(&"é".repeat(12)));
        assert!(RegionalApiClient::is_valid_character_name("Æl"));
    }

    #[test]
    fn test_icon_options_default() {
        let options = IconOptions::default();
        assert_eq!(options.size, 36);
        assert!(!options.download);
        assert!(options.dir.is_none());

        let options = IconOptions::default().with_size(56).with_download(true);
        assert_eq!(options.size, 56);
        assert!(options.download);
    }
}
