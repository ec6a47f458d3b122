//! Region data loaded from and persisted to the region file
//!
//! The region file is a JSON object mapping region codes to
//! `{ "name": ..., "realms": { slug: name } }`. Entry order is preserved
//! because the first region in the file is the default selection.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::debug;

use crate::config::ConfigError;
use crate::store::{self, StoreResult};

/// Realm slug to display name
pub type RealmMap = BTreeMap<String, String>;

/// Display name and known realms of a single region
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionInfo {
    pub name: String,
    #[serde(default, deserialize_with = "nullable_realms")]
    pub realms: RealmMap,
}

fn nullable_realms<'de, D>(deserializer: D) -> Result<RealmMap, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RealmMap>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl RegionInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            realms: RealmMap::new(),
        }
    }
}

/// Ordered mapping from region code to [`RegionInfo`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionSet {
    entries: Vec<(String, RegionInfo)>,
}

impl RegionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the region file, requiring at least one region
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let regions: Self = store::read_json(path)
            .await?
            .ok_or_else(|| ConfigError::file_not_found(path))?;

        if regions.is_empty() {
            return Err(ConfigError::EmptyRegionSet {
                path: path.to_path_buf(),
            });
        }

        debug!("Loaded {} regions from {}", regions.len(), path.display());
        Ok(regions)
    }

    /// Persist the full region set
    pub async fn save(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        store::write_json(path, self).await
    }

    /// Insert or replace a region, keeping its position if it already exists
    pub fn insert(&mut self, id: impl Into<String>, info: RegionInfo) {
        let id = id.into();
        match self.index_of(&id) {
            Some(index) => self.entries[index].1 = info,
            None => self.entries.push((id, info)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_of(id).is_some()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|(key, _)| key == id)
    }

    pub fn get(&self, id: &str) -> Option<&RegionInfo> {
        self.index_of(id).map(|index| &self.entries[index].1)
    }

    pub fn get_index(&self, index: usize) -> Option<(&str, &RegionInfo)> {
        self.entries
            .get(index)
            .map(|(id, info)| (id.as_str(), info))
    }

    pub fn get_index_mut(&mut self, index: usize) -> Option<&mut RegionInfo> {
        self.entries.get_mut(index).map(|(_, info)| info)
    }

    /// Code of the first region in file order
    pub fn first_id(&self) -> Option<&str> {
        self.entries.first().map(|(id, _)| id.as_str())
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RegionInfo)> {
        self.entries.iter().map(|(id, info)| (id.as_str(), info))
    }
}

impl Serialize for RegionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, info) in &self.entries {
            map.serialize_entry(id, info)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RegionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RegionSetVisitor;

        impl<'de> Visitor<'de> for RegionSetVisitor {
            type Value = RegionSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of region codes to region info")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RegionSet, A::Error> {
                let mut regions = RegionSet::new();
                while let Some((id, info)) = access.next_entry::<String, RegionInfo>()? {
                    regions.insert(id, info);
                }
                Ok(regions)
            }
        }

        deserializer.deserialize_map(RegionSetVisitor)
    }
}
