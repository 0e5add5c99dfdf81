//! Export document: auction history plus the lookup tables needed to read it.

use crate::directory::Directory;
use crate::normalizer::{Normalizer, RawMercato, RawStats, StatsPool};
use mercato_core::{ItemId, ParticipantId, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

/// Deserialize a list, skipping entries that do not match `T`.
fn lenient_list<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Vec::<Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match T::deserialize(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(index, error = %e, "Skipping malformed export entry");
                None
            }
        })
        .collect())
}

/// Deserialize a string-keyed map, skipping values that do not match `T`.
fn lenient_map<'de, D, T>(deserializer: D) -> std::result::Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(key, value)| match T::deserialize(value) {
            Ok(entry) => Some((key, entry)),
            Err(e) => {
                warn!(key = %key, error = %e, "Skipping malformed export entry");
                None
            }
        })
        .collect())
}

/// A participant entry from the teams listing.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamEntry {
    pub id: ParticipantId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub abbreviation: Option<String>,
}

impl TeamEntry {
    /// Best available display name: full name, then abbreviation.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .or(self.abbreviation.as_deref())
            .filter(|name| !name.is_empty())
    }
}

/// Everything captured from one league, as read from disk.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarketExport {
    /// Auction history: day -> item id -> raw item payload.
    #[serde(default)]
    pub mercato: RawMercato,
    /// Participant listing. Malformed entries are skipped.
    #[serde(default, deserialize_with = "lenient_list")]
    pub teams: Vec<TeamEntry>,
    /// Owning-group names keyed by group id. Non-string names are skipped.
    #[serde(default, deserialize_with = "lenient_map")]
    pub groups: BTreeMap<String, String>,
    /// Item performance stats keyed by item id. Malformed entries are skipped.
    #[serde(default, deserialize_with = "lenient_map")]
    pub stats: BTreeMap<ItemId, RawStats>,
}

impl MarketExport {
    /// Parse an export document.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Read and parse an export document from a file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Name directory built from the teams listing and group names.
    pub fn directory(&self) -> Directory {
        let mut directory = Directory::new();
        for team in &self.teams {
            if let Some(name) = team.display_name() {
                directory.insert_participant(team.id.clone(), name);
            }
        }
        for (id, name) in &self.groups {
            directory.insert_group(id.clone(), name.clone());
        }
        directory
    }

    /// Stats pool built from the stats listing.
    pub fn stats_pool(&self) -> StatsPool {
        self.stats
            .iter()
            .map(|(id, raw)| (id.clone(), raw.clone().into_stats()))
            .collect()
    }

    /// A normalizer wired with this export's directory and stats pool.
    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.directory()).with_stats_pool(self.stats_pool())
    }
}
