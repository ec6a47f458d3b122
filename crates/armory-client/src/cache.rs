//! On-disk character profile cache
//!
//! Layout: `<root>/<region>-<realm>/<character>.json`, each file holding
//! `{ "cacheTime": <unix secs>, "data": <profile> }`. Region, realm and
//! character are percent-encoded, so every entry stays below `<root>`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

use crate::endpoint::encode_component;
use crate::store::{self, StoreResult};

/// A cached character profile and the time it was fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedCharacter {
    pub cache_time: u64,
    pub data: Value,
}

impl CachedCharacter {
    pub fn new(cache_time: u64, data: Value) -> Self {
        Self { cache_time, data }
    }

    /// Whether the entry is younger than `ttl` at `now`
    pub fn is_fresh(&self, now: u64, ttl: Duration) -> bool {
        now.saturating_sub(self.cache_time) < ttl.as_secs()
    }
}

/// Whether a response payload is worth caching
///
/// `null`, `false`, zero and the empty string are not.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Character cache rooted at a directory
#[derive(Debug, Clone)]
pub struct CharacterCache {
    root: PathBuf,
}

impl CharacterCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding every cached character of a realm
    pub fn realm_dir(&self, region: &str, realm: &str) -> PathBuf {
        self.root.join(format!(
            "{}-{}",
            encode_component(region),
            encode_component(realm)
        ))
    }

    /// Cache file for a character
    pub fn path(&self, region: &str, realm: &str, name: &str) -> PathBuf {
        self.realm_dir(region, realm)
            .join(format!("{}.json", encode_component(name)))
    }

    /// Read a cached profile if it exists and is still fresh
    ///
    /// Unreadable or corrupt files count as misses.
    pub async fn read_fresh(
        &self,
        region: &str,
        realm: &str,
        name: &str,
        now: u64,
        ttl: Duration,
    ) -> Option<Value> {
        let path = self.path(region, realm, name);
        let entry = match store::read_json::<CachedCharacter>(&path).await {
            Ok(entry) => entry?,
            Err(e) => {
                warn!("Ignoring unreadable character cache: {e}");
                return None;
            }
        };

        if entry.is_fresh(now, ttl) {
            debug!("Character cache hit for {name} on {region}-{realm}");
            Some(entry.data)
        } else {
            debug!(
                "Character cache for {name} on {region}-{realm} expired ({}s old)",
                now.saturating_sub(entry.cache_time)
            );
            None
        }
    }

    /// Store a freshly fetched profile
    pub async fn write(
        &self,
        region: &str,
        realm: &str,
        name: &str,
        entry: &CachedCharacter,
    ) -> StoreResult<()> {
        store::write_json(self.path(region, realm, name), entry).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    const DAY: Duration = Duration::from_secs(86400);

    #[test]
    fn test_freshness_window() {
        let entry = CachedCharacter::new(1_000, json!({}));
        assert!(entry.is_fresh(1_000, DAY));
        assert!(entry.is_fresh(1_000 + 3_600, DAY));
        assert!(entry.is_fresh(1_000 + 86_399, DAY));
        assert!(!entry.is_fresh(1_000 + 86_400, DAY));
        assert!(!entry.is_fresh(1_000 + 90_000, DAY));
    }

    #[test]
    fn test_is_truthy() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!({"name": "Thrall"})));
        assert!(is_truthy(&json!(1.5)));
    }

    #[test]
    fn test_cache_layout() {
        let cache = CharacterCache::new("/var/cache/characters");
        assert_eq!(
            cache.path("eu", "argent-dawn", "Ærendil"),
            PathBuf::from("/var/cache/characters/eu-argent-dawn/%C3%86rendil.json")
        );
    }

    #[test]
    fn test_serialized_field_names() {
        let value = serde_json::to_value(CachedCharacter::new(42, json!({"level": 70}))).unwrap();
        assert_eq!(value, json!({"cacheTime": 42, "data": {"level": 70}}));
    }

    #[test]
    fn test_realm_dir_stays_below_root() {
        let cache = CharacterCache::new("/var/cache/characters");
        let dir = cache.realm_dir("eu", "x/../../escaped");
        assert_eq!(
            dir,
            PathBuf::from("/var/cache/characters/eu-x%2F..%2F..%2Fescaped")
        );
        assert_eq!(dir.parent(), Some(cache.root.as_path()));

        let dir = cache.realm_dir("..", "..\\up");
        assert_eq!(dir.parent(), Some(cache.root.as_path()));
    }

    #[tokio::test]
    async fn test_read_fresh_round_trip_and_expiry() {
        let dir = TempDir::new().unwrap();
        let cache = CharacterCache::new(dir.path());
        let entry = CachedCharacter::new(5_000, json!({"name": "Thrall"}));

        cache.write("us", "area-52", "Thrall", &entry).await.unwrap();

        let hit = cache.read_fresh("us", "area-52", "Thrall", 5_100, DAY).await;
        assert_eq!(hit, Some(json!({"name": "Thrall"})));

        let miss = cache.read_fresh("us", "area-52", "Thrall", 5_000 + 90_000, DAY).await;
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = CharacterCache::new(dir.path());
        let path = cache.path("us", "area-52", "Thrall");
        store::ensure_dir(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(&path, b"{\"cacheTime\":").await.unwrap();

        assert!(cache.read_fresh("us", "area-52", "Thrall", 0, DAY).await.is_none());
    }
}
